//! Proxy configuration.

use serde::Deserialize;

/// Configuration for the pinning proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::pinata_api_url")]
    pub pinata_api_url: String,

    /// Bearer credential for the pinning API. Server-side only.
    #[serde(default = "defaults::pinata_jwt")]
    pub pinata_jwt: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    #[serde(default = "defaults::max_file_bytes")]
    pub max_file_bytes: usize,

    /// Where multipart uploads are staged before forwarding.
    #[serde(default = "defaults::upload_dir")]
    pub upload_dir: String,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pinata_api_url: defaults::pinata_api_url(),
            pinata_jwt: defaults::pinata_jwt(),
            bind_address: defaults::bind_address(),
            max_file_bytes: defaults::max_file_bytes(),
            upload_dir: defaults::upload_dir(),
            request_timeout_secs: defaults::request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load from optional `pinning-proxy.toml`, then `PINNING_*` env vars.
    /// A missing source falls back to defaults; a malformed one is an error.
    pub fn load() -> Result<Self, crate::Error> {
        config::Config::builder()
            .add_source(config::File::with_name("pinning-proxy").required(false))
            .add_source(config::Environment::with_prefix("PINNING"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Body limit for the multipart route: file ceiling plus form overhead.
    pub fn body_limit(&self) -> usize {
        self.max_file_bytes + 64 * 1024
    }
}

mod defaults {
    pub fn pinata_api_url() -> String {
        "https://api.pinata.cloud".into()
    }

    pub fn pinata_jwt() -> String {
        std::env::var("PINATA_JWT").unwrap_or_default()
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn max_file_bytes() -> usize {
        minter_types::MAX_IMAGE_BYTES
    }

    pub fn upload_dir() -> String {
        std::env::temp_dir().to_string_lossy().into_owned()
    }

    pub fn request_timeout_secs() -> u64 {
        60
    }
}
