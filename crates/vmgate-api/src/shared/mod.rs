pub mod error;
pub mod href;
pub mod types;
