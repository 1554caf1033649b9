//! In-process harness: builds the router over fresh in-memory stores and
//! drives it with `oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use vmgate_api::features::authorization::repo::{hash_password, Role, UserRecord};
use vmgate_api::features::instance_actions::backend::{PowerCommand, SimulatedPowerBackend};
use vmgate_api::features::instance_actions::worker::PowerWorker;
use vmgate_api::features::observability::controller::ObservabilityController;
use vmgate_api::features::tasks::service::TaskService;
use vmgate_api::server::{build_routes, AppState, Stores};
use vmgate_core::{
    CustomAttribute, Instance, InstanceKind, LoadBalancer, LoadBalancerListener, LoadBalancerPool,
    LoadBalancerPoolMember,
};

pub const BASE_URL: &str = "http://localhost:3000";
const PASSWORD: &str = "smartvm";

pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    /// Held so the simulated backend accepts submissions without a worker.
    _commands: Option<UnboundedReceiver<PowerCommand>>,
    cancel_token: CancellationToken,
    next_user: AtomicU64,
}

impl TestApp {
    /// App whose backend accepts commands but never applies them.
    pub fn spawn() -> Self {
        Self::build(false)
    }

    /// App with a running power worker and no transition delay.
    pub fn spawn_with_worker() -> Self {
        Self::build(true)
    }

    fn build(with_worker: bool) -> Self {
        let stores = Stores::in_memory();
        let tasks = Arc::new(TaskService::new(stores.tasks.clone()));
        let (backend, commands) = SimulatedPowerBackend::channel();
        let cancel_token = CancellationToken::new();

        let commands = if with_worker {
            let worker = PowerWorker::new(stores.instances.clone(), tasks.clone(), Duration::ZERO);
            tokio::spawn(worker.run(commands, cancel_token.clone()));
            None
        } else {
            Some(commands)
        };

        let observability =
            Arc::new(ObservabilityController::isolated().expect("metrics registry"));
        let state = Arc::new(AppState::new(
            &stores,
            tasks,
            Arc::new(backend),
            observability,
            BASE_URL,
        ));

        Self {
            router: build_routes(state, Duration::from_secs(30)),
            stores,
            _commands: commands,
            cancel_token,
            next_user: AtomicU64::new(1),
        }
    }

    /// Create a user whose role holds `privileges`; returns its Authorization header.
    pub async fn authorize(&self, privileges: &[&str]) -> String {
        let n = self.next_user.fetch_add(1, Ordering::SeqCst);
        let userid = format!("api_user_{}", n);
        let role = format!("role_{}", n);

        self.stores
            .identities
            .upsert_role(Role::new(role.clone(), privileges.iter().copied()))
            .await
            .unwrap();
        self.stores
            .identities
            .upsert_user(UserRecord {
                userid: userid.clone(),
                password_sha256: hash_password(PASSWORD),
                role,
            })
            .await
            .unwrap();

        basic_auth(&userid, PASSWORD)
    }

    pub async fn add_instance(&self, id: u64, name: &str, raw_power_state: &str) -> Instance {
        let instance = Instance::new(id, name).with_raw_power_state(raw_power_state);
        self.stores.instances.upsert(instance.clone()).await.unwrap();
        instance
    }

    pub async fn add_infra_vm(&self, id: u64, name: &str) {
        self.stores
            .instances
            .upsert(Instance::new(id, name).with_kind(InstanceKind::Infra))
            .await
            .unwrap();
    }

    pub async fn add_custom_attribute(&self, instance_id: u64, id: u64, name: &str, value: &str) {
        self.stores
            .custom_attributes
            .restore(CustomAttribute::new(id, instance_id, name, value))
            .await
            .unwrap();
    }

    /// Link a load balancer to an instance through one listener, pool and member.
    pub async fn link_load_balancer(&self, instance_id: u64, lb_id: u64, name: &str) {
        let link_id = lb_id * 100 + instance_id;
        let repo = &self.stores.load_balancers;
        repo.upsert_load_balancer(LoadBalancer {
            id: lb_id,
            name: name.to_string(),
            ems_ref: None,
        })
        .await
        .unwrap();
        repo.upsert_member(LoadBalancerPoolMember {
            id: link_id,
            instance_id,
        })
        .await
        .unwrap();
        repo.upsert_pool(LoadBalancerPool {
            id: link_id,
            name: format!("pool-{}", link_id),
            member_ids: vec![link_id],
        })
        .await
        .unwrap();
        repo.upsert_listener(LoadBalancerListener {
            id: link_id,
            name: format!("listener-{}", link_id),
            load_balancer_id: lb_id,
            pool_ids: vec![link_id],
        })
        .await
        .unwrap();
    }

    pub async fn power_state_of(&self, id: u64) -> String {
        self.stores
            .instances
            .get(id)
            .await
            .unwrap()
            .unwrap()
            .raw_power_state
    }

    pub async fn get(&self, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, auth, None).await
    }

    pub async fn post(&self, uri: &str, auth: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, auth, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, auth, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, auth, body).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

pub fn basic_auth(userid: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", userid, password)))
}

pub fn instance_url(id: u64) -> String {
    format!("{}/api/instances/{}", BASE_URL, id)
}

/// Path-only form of an href, as sent to the router.
pub fn path(href: &str) -> String {
    href.trim_start_matches(BASE_URL).to_string()
}

pub fn action_identifier(action: &str) -> String {
    format!("instance_{}", action)
}
