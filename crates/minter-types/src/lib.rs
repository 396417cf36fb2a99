//! Shared types and pure-logic utilities for the NFT minter.
//! No network or filesystem access; usable by the proxy and the client alike.

mod content;
mod error;
mod form;
mod metadata;
mod pinning;

pub use content::ContentId;
pub use error::FormError;
pub use form::{Attribute, ImageFile, MintForm, MAX_IMAGE_BYTES};
pub use metadata::TokenMetadata;
pub use pinning::{ErrorBody, PinResponse, upstream_error_message};
