//! EIP-1193 provider abstraction and a JSON-RPC over HTTP implementation.

use crate::ProviderError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// The `request({ method, params })` surface every injected wallet exposes.
pub trait Eip1193: Send + Sync {
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}

impl<P: Eip1193> Eip1193 for Arc<P> {
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send {
        (**self).request(method, params)
    }
}

/// Provider backed by a JSON-RPC endpoint that manages the account itself
/// (a wallet bridge or a dev node with unlocked accounts).
pub struct HttpProvider {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Eip1193 for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(id, method, url = %self.url, "JSON-RPC request");

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::internal(format!("{method} failed: {e}")))?;

        let status = resp.status();
        let parsed: RpcResponse = resp.json().await.map_err(|e| {
            ProviderError::internal(format!("{method}: invalid JSON-RPC response ({status}): {e}"))
        })?;

        if let Some(err) = parsed.error {
            return Err(ProviderError::new(err.code, err.message));
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }
}
