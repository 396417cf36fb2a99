//! The mint form: user input collected before a mint attempt.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::FormError;

/// Client-side ceiling for a selected image (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A single ERC-721 metadata trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// An image picked by the user, held in memory until upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Inline preview, suitable for an `<img src>`.
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, B64.encode(&self.bytes))
    }
}

// Avoid dumping megabytes of image bytes into logs.
impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Mutable form state. Created empty, edited field by field, reset after a
/// successful mint and left intact after a failed one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintForm {
    pub name: String,
    pub description: String,
    pub attribute: Option<Attribute>,
    image: Option<ImageFile>,
}

impl MintForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Set the optional trait. A blank trait name clears it.
    pub fn set_attribute(&mut self, trait_type: impl Into<String>, value: impl Into<String>) {
        let trait_type = trait_type.into();
        self.attribute = if trait_type.trim().is_empty() {
            None
        } else {
            Some(Attribute {
                trait_type,
                value: value.into(),
            })
        };
    }

    /// Replace the selected image. Oversize images are rejected and the
    /// previous selection is kept.
    pub fn select_image(&mut self, image: ImageFile) -> Result<(), FormError> {
        if image.size() > MAX_IMAGE_BYTES {
            return Err(FormError::ImageTooLarge {
                size: image.size(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        self.image = Some(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.attribute.iter().cloned().collect()
    }

    /// Check every field a mint needs. Returns the selected image on success.
    pub fn validate(&self) -> Result<&ImageFile, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if self.description.trim().is_empty() {
            return Err(FormError::MissingDescription);
        }
        let image = self.image.as_ref().ok_or(FormError::MissingImage)?;
        if image.size() > MAX_IMAGE_BYTES {
            return Err(FormError::ImageTooLarge {
                size: image.size(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        Ok(image)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
