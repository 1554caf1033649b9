//! HTTP handlers.
//!
//! Handlers extract path, query and body, then delegate to the feature
//! controllers held in [`AppState`](crate::server::AppState).

pub mod custom_attributes;
pub mod instances;
pub mod load_balancers;
pub mod metrics;
pub mod tasks;
