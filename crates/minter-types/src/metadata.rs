//! ERC-721 token metadata document.

use serde::{Deserialize, Serialize};

use crate::{Attribute, ContentId, MintForm};

/// The JSON document a token reference resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl TokenMetadata {
    /// Build the metadata for `form`, pointing at the already-pinned image.
    pub fn from_form(form: &MintForm, image: &ContentId) -> Self {
        Self {
            name: form.name.trim().to_string(),
            description: form.description.trim().to_string(),
            image: image.ipfs_uri(),
            attributes: form.attributes(),
        }
    }
}
