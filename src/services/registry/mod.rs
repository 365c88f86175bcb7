pub mod manager;
mod poller;
pub mod types;

pub use manager::{EndpointRegistry, RegistryOptions, DEFAULT_STREAM_CAPACITY};
pub use types::{validate_endpoint_url, MonitorEndpoint, RegistryError};
