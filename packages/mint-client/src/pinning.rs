//! Client for the pinning proxy.

use crate::PinError;
use minter_types::{upstream_error_message, ContentId, ImageFile, PinResponse, TokenMetadata, MAX_IMAGE_BYTES};
use reqwest::multipart::{Form, Part};
use std::future::Future;
use tracing::{debug, warn};

/// The two pinning operations the mint pipeline needs.
pub trait PinningApi: Send + Sync {
    /// Pin an image; returns its content identifier.
    fn pin_file(&self, image: &ImageFile)
        -> impl Future<Output = Result<ContentId, PinError>> + Send;

    /// Pin a metadata document; returns its content identifier.
    fn pin_json(
        &self,
        metadata: &TokenMetadata,
    ) -> impl Future<Output = Result<ContentId, PinError>> + Send;
}

/// Talks to the proxy's `/api/pin/file` and `/api/pin/json` routes.
pub struct HttpPinningClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPinningClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn read_pin(resp: reqwest::Response) -> Result<ContentId, PinError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| PinError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = upstream_error_message(&text);
            warn!(status = %status, error = %message, "Pinning proxy returned an error");
            return Err(PinError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let pinned: PinResponse =
            serde_json::from_str(&text).map_err(|e| PinError::InvalidResponse(e.to_string()))?;
        debug!(cid = %pinned.ipfs_hash, size = pinned.pin_size, "Pinned");
        Ok(pinned.ipfs_hash)
    }
}

impl PinningApi for HttpPinningClient {
    async fn pin_file(&self, image: &ImageFile) -> Result<ContentId, PinError> {
        if image.size() > MAX_IMAGE_BYTES {
            return Err(PinError::FileTooLarge {
                size: image.size(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        let part = match part.mime_str(&image.content_type) {
            Ok(part) => part,
            Err(_) => Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
        };
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(format!("{}/api/pin/file", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::Transport(e.to_string()))?;

        Self::read_pin(resp).await
    }

    async fn pin_json(&self, metadata: &TokenMetadata) -> Result<ContentId, PinError> {
        let resp = self
            .http
            .post(format!("{}/api/pin/json", self.base_url))
            .json(metadata)
            .send()
            .await
            .map_err(|e| PinError::Transport(e.to_string()))?;

        Self::read_pin(resp).await
    }
}
