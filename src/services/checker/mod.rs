pub mod http;
pub mod types;

pub use http::HttpChecker;
pub use types::{average_response_time, CheckResult};
