//! # Mint Client
//!
//! Client-side half of the NFT minter: wallet discovery and connection, the
//! pinning proxy client, and the upload-then-mint pipeline.
//!
//! Browser-specific seams are traits so the pipeline runs (and is tested)
//! without a browser:
//! - [`Eip1193`]: the injected provider's `request` function
//! - [`ProviderDiscovery`]: reading injected wallet globals
//! - [`PinningApi`]: the two pinning proxy endpoints

pub mod config;
pub mod contract;
mod error;
pub mod orchestrator;
pub mod pinning;
pub mod provider;
pub mod wallet;

pub use crate::config::ClientConfig;
pub use contract::NftContract;
pub use error::{MintError, MintStep, PinError, ProviderError, WalletError};
pub use orchestrator::{MintEvent, MintOrchestrator, MintReceipt};
pub use pinning::{HttpPinningClient, PinningApi};
pub use provider::{Eip1193, HttpProvider};
pub use wallet::{
    InjectedDiscovery, InjectedProvider, NamedProvider, ProviderDiscovery, Selection, Signer,
    TxReceipt, Vendor, VendorFlags, WalletConnector, WalletSession,
};
