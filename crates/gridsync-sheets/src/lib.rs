pub mod client;
pub mod config;
pub mod wire;

pub use client::{ClientError, SheetsClient};
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, SheetsClientConfig};
