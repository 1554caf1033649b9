pub mod config;
pub mod features;
pub mod handlers;
pub mod middleware;
pub mod seed;
pub mod server;
pub mod shared;
