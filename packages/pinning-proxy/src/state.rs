//! Application state shared across handlers.

use crate::config::Config;
use crate::upstream::PinataClient;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub pinata: PinataClient,
    pub upload_dir: PathBuf,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        if config.pinata_jwt.is_empty() {
            warn!("Pinning credential not set; upstream will reject every pin");
        }
        if config.max_file_bytes == 0 {
            return Err(crate::Error::Config("max_file_bytes must be positive".into()));
        }

        let pinata = PinataClient::new(
            &config.pinata_api_url,
            &config.pinata_jwt,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        let upload_dir = PathBuf::from(&config.upload_dir);
        info!(upload_dir = %upload_dir.display(), max_file_bytes = config.max_file_bytes, "Upload staging configured");

        Ok(Self {
            pinata,
            upload_dir,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }
}
