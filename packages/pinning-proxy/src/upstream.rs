//! Pinata pinning API client.

use crate::metrics::METRICS;
use crate::upload::TempUpload;
use minter_types::upstream_error_message;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";
const AUTH_CHECK_PATH: &str = "/data/testAuthentication";

/// Thin client over the two pinning endpoints. Responses are returned as raw
/// JSON so the proxy can relay them verbatim.
pub struct PinataClient {
    http: reqwest::Client,
    base_url: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(base_url: &str, jwt: &str, timeout: Duration) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Config(format!("HTTP client build failed: {e}")))?;

        info!(base_url, "Pinning client initialized");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            jwt: jwt.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a staged file to `pinFileToIPFS`.
    pub async fn pin_file(&self, upload: &TempUpload, name: &str) -> Result<Value, crate::Error> {
        let part = Part::stream_with_length(upload.body().await?, upload.size as u64)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|_| {
                crate::Error::BadRequest(format!("Invalid content type: {}", upload.content_type))
            })?;

        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", json!({ "name": name }).to_string());

        let request = self
            .http
            .post(format!("{}{PIN_FILE_PATH}", self.base_url))
            .bearer_auth(&self.jwt)
            .multipart(form);

        let pinned = self.forward(request).await?;
        METRICS
            .bytes_forwarded
            .fetch_add(upload.size as u64, Ordering::Relaxed);
        Ok(pinned)
    }

    /// Forward a JSON document to `pinJSONToIPFS`.
    pub async fn pin_json(&self, content: Value, name: Option<&str>) -> Result<Value, crate::Error> {
        let mut body = json!({ "pinataContent": content });
        if let Some(name) = name {
            body["pinataMetadata"] = json!({ "name": name });
        }

        let request = self
            .http
            .post(format!("{}{PIN_JSON_PATH}", self.base_url))
            .bearer_auth(&self.jwt)
            .json(&body);

        self.forward(request).await
    }

    /// Verify the credential. Returns "ok" or "unavailable".
    pub async fn health_check(&self) -> &'static str {
        let result = self
            .http
            .get(format!("{}{AUTH_CHECK_PATH}", self.base_url))
            .bearer_auth(&self.jwt)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => "ok",
            Ok(resp) => {
                warn!(status = %resp.status(), "Pinning service rejected credential");
                "unavailable"
            }
            Err(e) => {
                warn!(error = %e, "Pinning service unreachable");
                "unavailable"
            }
        }
    }

    async fn forward(&self, request: reqwest::RequestBuilder) -> Result<Value, crate::Error> {
        let start = Instant::now();
        let result = request.send().await;
        METRICS.record_upstream_duration(start);

        let resp = result.map_err(|e| crate::Error::Upstream(format!("Pinning service unreachable: {e}")))?;
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = upstream_error_message(&text);
            warn!(status = %status, error = %message, "Pinning service returned an error");
            return Err(crate::Error::Upstream(message));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| crate::Error::Upstream(format!("Invalid response from pinning service: {e}")))
    }
}
