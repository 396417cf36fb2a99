//! Response types for the proxy API.

use serde::Serialize;

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pinning_api: String,
    pub uptime_secs: u64,
    pub requests: u64,
    pub max_file_bytes: usize,
}
