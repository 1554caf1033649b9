//! HTTP server wiring.
//!
//! Builds the axum router and the application state shared by handlers.

use crate::features::authorization::repo::{IdentityRepository, InMemoryIdentityRepository};
use crate::features::authorization::service::{AuthenticationService, Authorizer, RoleAuthorizer};
use crate::features::custom_attributes::controller::CustomAttributeController;
use crate::features::custom_attributes::repo::{
    CustomAttributeRepository, InMemoryCustomAttributeRepository,
};
use crate::features::custom_attributes::service::CustomAttributeService;
use crate::features::instance_actions::backend::PowerBackend;
use crate::features::instance_actions::service::ActionDispatcher;
use crate::features::instance_management::controller::InstanceController;
use crate::features::instance_management::repo::{
    InMemoryInstanceRepository, InstanceRepository,
};
use crate::features::instance_management::service::InstanceService;
use crate::features::load_balancers::controller::LoadBalancerController;
use crate::features::load_balancers::repo::{
    InMemoryLoadBalancerRepository, LoadBalancerRepository,
};
use crate::features::load_balancers::service::LoadBalancerService;
use crate::features::observability::controller::ObservabilityController;
use crate::features::tasks::controller::TaskController;
use crate::features::tasks::repo::{InMemoryTaskRepository, TaskRepository};
use crate::features::tasks::service::TaskService;
use crate::handlers;
use crate::middleware;
use crate::shared::href::Hrefs;
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Repositories behind every feature.
#[derive(Clone)]
pub struct Stores {
    pub instances: Arc<dyn InstanceRepository>,
    pub custom_attributes: Arc<dyn CustomAttributeRepository>,
    pub load_balancers: Arc<dyn LoadBalancerRepository>,
    pub identities: Arc<dyn IdentityRepository>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            instances: Arc::new(InMemoryInstanceRepository::new()),
            custom_attributes: Arc::new(InMemoryCustomAttributeRepository::new()),
            load_balancers: Arc::new(InMemoryLoadBalancerRepository::new()),
            identities: Arc::new(InMemoryIdentityRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
        }
    }
}

/// Application state shared across all handlers.
pub struct AppState {
    pub instances: InstanceController,
    pub custom_attributes: CustomAttributeController,
    pub load_balancers: LoadBalancerController,
    pub tasks: TaskController,
    pub authentication: AuthenticationService,
    pub observability: Arc<ObservabilityController>,
}

impl AppState {
    /// Wire controllers over `stores`. `task_service` must be the one the
    /// power worker completes tasks through.
    pub fn new(
        stores: &Stores,
        task_service: Arc<TaskService>,
        backend: Arc<dyn PowerBackend>,
        observability: Arc<ObservabilityController>,
        base_url: &str,
    ) -> Self {
        let hrefs = Hrefs::new(base_url);
        let authorizer: Arc<dyn Authorizer> = Arc::new(RoleAuthorizer);

        let instance_service = Arc::new(InstanceService::new(
            stores.instances.clone(),
            stores.custom_attributes.clone(),
            hrefs.clone(),
        ));
        let dispatcher = Arc::new(ActionDispatcher::new(
            backend,
            task_service.clone(),
            observability.clone(),
            hrefs.clone(),
        ));

        Self {
            instances: InstanceController::new(
                instance_service.clone(),
                dispatcher,
                authorizer.clone(),
            ),
            custom_attributes: CustomAttributeController::new(
                Arc::new(CustomAttributeService::new(
                    stores.custom_attributes.clone(),
                    hrefs.clone(),
                )),
                instance_service.clone(),
                authorizer.clone(),
            ),
            load_balancers: LoadBalancerController::new(
                Arc::new(LoadBalancerService::new(
                    stores.load_balancers.clone(),
                    hrefs.clone(),
                )),
                instance_service,
                authorizer,
            ),
            tasks: TaskController::new(task_service, hrefs),
            authentication: AuthenticationService::new(stores.identities.clone()),
            observability,
        }
    }
}

/// Build the application routes.
///
/// - `/api/...` - instance collection, actions and subcollections (Basic auth)
/// - `/metrics` - Prometheus scrape endpoint (public)
/// - TraceLayer for request logging
/// - request timeout from configuration
pub fn build_routes(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/instances",
            get(handlers::instances::list_instances).post(handlers::instances::act_on_instances),
        )
        .route(
            "/api/instances/:id",
            get(handlers::instances::show_instance).post(handlers::instances::act_on_instance),
        )
        .route(
            "/api/instances/:id/custom_attributes",
            get(handlers::custom_attributes::list_custom_attributes)
                .post(handlers::custom_attributes::act_on_custom_attributes),
        )
        .route(
            "/api/instances/:id/custom_attributes/:ca_id",
            get(handlers::custom_attributes::show_custom_attribute)
                .delete(handlers::custom_attributes::delete_custom_attribute),
        )
        .route(
            "/api/instances/:id/load_balancers",
            get(handlers::load_balancers::list_load_balancers),
        )
        .route(
            "/api/instances/:id/load_balancers/:lb_id",
            get(handlers::load_balancers::show_load_balancer),
        )
        .route("/api/tasks/:id", get(handlers::tasks::show_task))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let public_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_handler));

    // Layer order (bottom-to-top execution):
    // 1. track_requests - sees the matched route and final status
    // 2. TimeoutLayer
    // 3. TraceLayer
    api_routes
        .merge(public_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
