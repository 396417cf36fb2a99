//! Client configuration.

use crate::wallet::{ProviderDiscovery, WalletConnector};
use crate::{HttpPinningClient, MintOrchestrator, NftContract};
use alloy_primitives::Address;
use serde::Deserialize;
use std::time::Duration;

/// Deployment the client mints against.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the pinning proxy.
    #[serde(default = "defaults::proxy_url")]
    pub proxy_url: String,

    #[serde(default)]
    pub contract_address: Address,

    /// Network the wallet must be on.
    #[serde(default = "defaults::chain_id")]
    pub chain_id: u64,

    /// Block explorer used for transaction links.
    #[serde(default = "defaults::explorer_url")]
    pub explorer_url: String,

    /// IPFS gateway used for content links.
    #[serde(default = "defaults::gateway_url")]
    pub gateway_url: String,

    #[serde(default = "defaults::receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: defaults::proxy_url(),
            contract_address: Address::ZERO,
            chain_id: defaults::chain_id(),
            explorer_url: defaults::explorer_url(),
            gateway_url: defaults::gateway_url(),
            receipt_poll_ms: defaults::receipt_poll_ms(),
        }
    }
}

impl ClientConfig {
    /// Load from optional `minter.toml`, then `MINTER_*` env vars.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("minter").required(false))
            .add_source(config::Environment::with_prefix("MINTER"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.contract_address == Address::ZERO {
            return Err(config::ConfigError::Message(
                "contract_address is not set".into(),
            ));
        }
        Ok(())
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn contract(&self) -> NftContract {
        NftContract::new(self.contract_address)
    }

    /// Orchestrator talking to the configured proxy and contract.
    pub fn orchestrator(&self) -> MintOrchestrator<HttpPinningClient> {
        MintOrchestrator::new(HttpPinningClient::new(&self.proxy_url), self.contract())
    }

    /// Connector pinned to the configured network.
    pub fn connector<D: ProviderDiscovery>(&self, discovery: D) -> WalletConnector<D> {
        WalletConnector::new(discovery)
            .with_chain_id(self.chain_id)
            .with_poll_interval(self.receipt_poll_interval())
    }
}

mod defaults {
    pub fn proxy_url() -> String {
        "http://localhost:3050".into()
    }

    /// Sepolia.
    pub fn chain_id() -> u64 {
        11155111
    }

    pub fn explorer_url() -> String {
        "https://sepolia.etherscan.io".into()
    }

    pub fn gateway_url() -> String {
        "https://gateway.pinata.cloud".into()
    }

    pub fn receipt_poll_ms() -> u64 {
        2000
    }
}
