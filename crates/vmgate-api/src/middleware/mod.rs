//! HTTP middleware layers.
//!
//! - `auth` - HTTP Basic authentication for `/api` routes
//! - `metrics` - request counters and latency per matched route

pub mod auth;
pub mod metrics;

pub use auth::require_auth;
pub use metrics::track_requests;
