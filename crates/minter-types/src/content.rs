//! Content identifiers returned by the pinning service.

use serde::{Deserialize, Serialize};

use crate::FormError;

/// Hash-derived reference to pinned content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    pub fn new(cid: impl Into<String>) -> Result<Self, FormError> {
        let cid = cid.into();
        if cid.is_empty() || cid.chars().any(char::is_whitespace) {
            return Err(FormError::InvalidContentId(cid));
        }
        Ok(Self(cid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content-addressed reference, e.g. `ipfs://bafy...`.
    pub fn ipfs_uri(&self) -> String {
        format!("ipfs://{}", self.0)
    }

    /// HTTP link through a gateway. Trailing slashes on `base` are ignored.
    pub fn gateway_url(&self, base: &str) -> String {
        format!("{}/ipfs/{}", base.trim_end_matches('/'), self.0)
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ContentId {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = FormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentId> for String {
    fn from(cid: ContentId) -> Self {
        cid.0
    }
}
