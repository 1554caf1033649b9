use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vmgate_api::config::Config;
use vmgate_api::features::instance_actions::backend::SimulatedPowerBackend;
use vmgate_api::features::instance_actions::worker::PowerWorker;
use vmgate_api::features::observability::controller::global_observability_controller;
use vmgate_api::features::tasks::service::TaskService;
use vmgate_api::seed::SeedData;
use vmgate_api::server::{build_routes, AppState, Stores};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vmgate_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vmgate API");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!(?config, "Configuration loaded");

    let stores = Stores::in_memory();
    let seed = match (&config.seed_file, &config.admin_password) {
        (Some(path), _) => Some(SeedData::from_path(path)?),
        (None, Some(password)) => Some(SeedData::admin(password)),
        (None, None) => {
            warn!("No VMGATE_SEED_FILE or VMGATE_ADMIN_PASSWORD set; every request will be rejected");
            None
        }
    };
    if let Some(seed) = seed {
        seed.apply(&stores).await?;
    }

    let observability = global_observability_controller()?;
    let task_service = Arc::new(TaskService::new(stores.tasks.clone()));
    let (backend, commands) = SimulatedPowerBackend::channel();

    let cancel_token = CancellationToken::new();
    let worker = PowerWorker::new(
        stores.instances.clone(),
        task_service.clone(),
        config.backend_delay(),
    );
    let worker_handle = tokio::spawn(worker.run(commands, cancel_token.clone()));

    let state = Arc::new(AppState::new(
        &stores,
        task_service,
        Arc::new(backend),
        observability.clone(),
        &config.base_url,
    ));
    let cloud_instances = state.instances.cloud_instance_count().await?;
    observability.set_instance_count(cloud_instances);

    let app = build_routes(state, config.request_timeout());

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    info!(%addr, cloud_instances, "vmgate API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    if let Err(e) = worker_handle.await {
        error!(error = %e, "Power worker task panicked");
    }

    info!("vmgate API shutdown complete");
    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
