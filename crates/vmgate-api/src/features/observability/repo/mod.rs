use prometheus::{
    opts, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Registry, TextEncoder,
};

pub struct ObservabilityRepository {
    registry: Registry,
    instance_count: Gauge,
    api_request_total: CounterVec,
    api_request_latency_seconds: HistogramVec,
    instance_action_total: CounterVec,
}

impl ObservabilityRepository {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();

        let instance_count =
            Gauge::with_opts(opts!("vmgate_instance_count", "Cloud instances known to the API"))
                .map_err(|e| e.to_string())?;
        let api_request_total = CounterVec::new(
            opts!("vmgate_api_request_total", "API request total"),
            &["endpoint", "status"],
        )
        .map_err(|e| e.to_string())?;
        let api_request_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "vmgate_api_request_latency_seconds",
                "API request latency (seconds)",
            ),
            &["endpoint"],
        )
        .map_err(|e| e.to_string())?;
        let instance_action_total = CounterVec::new(
            opts!(
                "vmgate_instance_action_total",
                "Instance actions by action and outcome"
            ),
            &["action", "outcome"],
        )
        .map_err(|e| e.to_string())?;

        registry
            .register(Box::new(instance_count.clone()))
            .map_err(|e| e.to_string())?;
        registry
            .register(Box::new(api_request_total.clone()))
            .map_err(|e| e.to_string())?;
        registry
            .register(Box::new(api_request_latency_seconds.clone()))
            .map_err(|e| e.to_string())?;
        registry
            .register(Box::new(instance_action_total.clone()))
            .map_err(|e| e.to_string())?;

        Ok(Self {
            registry,
            instance_count,
            api_request_total,
            api_request_latency_seconds,
            instance_action_total,
        })
    }

    pub fn set_instance_count(&self, count: f64) {
        self.instance_count.set(count);
    }

    pub fn observe_api_request(&self, endpoint: &str, status: &str, seconds: f64) {
        self.api_request_total
            .with_label_values(&[endpoint, status])
            .inc();
        self.api_request_latency_seconds
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    pub fn inc_instance_action(&self, action: &str, outcome: &str) {
        self.instance_action_total
            .with_label_values(&[action, outcome])
            .inc();
    }

    pub fn render_metrics(&self) -> Result<String, String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }
}
