pub mod federal_register;
pub mod narrative;
pub mod timeline;

use crate::error::{EoError, EoResult};
use std::time::Duration;

/// Build the shared HTTP client. Every outbound request gets the same timeout so a
/// hung remote cannot stall a code path forever.
pub fn build_client(user_agent: &str, timeout: Duration) -> EoResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| EoError::network("client builder", e))
}
