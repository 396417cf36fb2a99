//! Pinning service wire types, shared by the proxy and its client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ContentId;

/// Successful pin, as returned by the pinning API and relayed verbatim by
/// the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: ContentId,
    #[serde(rename = "PinSize", default)]
    pub pin_size: u64,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "isDuplicate", default, skip_serializing_if = "Option::is_none")]
    pub is_duplicate: Option<bool>,
}

/// Failure body returned by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Extract a human-readable message from an upstream error body.
///
/// Handles `{"error": "..."}`, `{"error": {"reason", "details"}}`,
/// `{"message": "..."}` and falls back to the raw text.
pub fn upstream_error_message(body: &str) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "empty response from pinning service".to_string()
        } else {
            trimmed.to_string()
        }
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    match value.get("error") {
        Some(Value::String(msg)) => return msg.clone(),
        Some(Value::Object(obj)) => {
            for key in ["details", "reason", "message"] {
                if let Some(msg) = obj.get(key).and_then(Value::as_str) {
                    return msg.to_string();
                }
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(fallback)
}
