//! Wallet discovery, selection, connection, and transaction signing.
//!
//! Discovery never talks to a provider; connection happens only after the
//! caller has settled on exactly one.

use crate::{Eip1193, WalletError};
use alloy_primitives::{Address, B256, U256};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Receipt poll interval when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Vendor flags set on an injected provider object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VendorFlags {
    pub is_meta_mask: bool,
    pub is_coinbase_wallet: bool,
    pub is_brave_wallet: bool,
    pub is_rabby: bool,
    pub is_trust: bool,
    pub is_phantom: bool,
}

/// A known wallet vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    MetaMask,
    CoinbaseWallet,
    BraveWallet,
    Rabby,
    TrustWallet,
    Phantom,
    /// Injected provider with no recognised flag.
    Injected,
}

impl Vendor {
    /// Classify an injected provider. Several wallets also set `isMetaMask`
    /// for compatibility, so their own flag is checked first.
    pub fn from_flags(flags: &VendorFlags) -> Self {
        if flags.is_brave_wallet {
            Self::BraveWallet
        } else if flags.is_rabby {
            Self::Rabby
        } else if flags.is_phantom {
            Self::Phantom
        } else if flags.is_trust {
            Self::TrustWallet
        } else if flags.is_coinbase_wallet {
            Self::CoinbaseWallet
        } else if flags.is_meta_mask {
            Self::MetaMask
        } else {
            Self::Injected
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MetaMask => "MetaMask",
            Self::CoinbaseWallet => "Coinbase Wallet",
            Self::BraveWallet => "Brave Wallet",
            Self::Rabby => "Rabby",
            Self::TrustWallet => "Trust Wallet",
            Self::Phantom => "Phantom",
            Self::Injected => "Browser Wallet",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A provider handle tagged with the wallet it belongs to.
#[derive(Debug, Clone)]
pub struct NamedProvider<P> {
    pub vendor: Vendor,
    pub provider: P,
}

impl<P> NamedProvider<P> {
    pub fn name(&self) -> &'static str {
        self.vendor.name()
    }
}

/// Source of available wallet providers.
pub trait ProviderDiscovery {
    type Provider: Eip1193 + Clone;

    /// Distinct providers, in discovery order.
    fn discover(&self) -> Vec<NamedProvider<Self::Provider>>;
}

/// An injected provider object together with its vendor flags.
#[derive(Debug, Clone)]
pub struct InjectedProvider<P> {
    pub flags: VendorFlags,
    pub provider: P,
}

/// Snapshot of the page's injected wallet globals: the primary
/// `window.ethereum` object and, when several extensions compete for it,
/// its `providers` list.
#[derive(Debug, Clone)]
pub struct InjectedDiscovery<P> {
    pub ethereum: Option<InjectedProvider<P>>,
    pub providers: Vec<InjectedProvider<P>>,
}

impl<P> InjectedDiscovery<P> {
    /// No wallet extension installed.
    pub fn empty() -> Self {
        Self {
            ethereum: None,
            providers: Vec::new(),
        }
    }

    pub fn single(flags: VendorFlags, provider: P) -> Self {
        Self {
            ethereum: Some(InjectedProvider { flags, provider }),
            providers: Vec::new(),
        }
    }

    /// Several extensions installed. The first one owns `window.ethereum`.
    pub fn multiple(providers: Vec<InjectedProvider<P>>) -> Self
    where
        P: Clone,
    {
        Self {
            ethereum: providers.first().cloned(),
            providers,
        }
    }
}

impl<P: Eip1193 + Clone> ProviderDiscovery for InjectedDiscovery<P> {
    type Provider = P;

    fn discover(&self) -> Vec<NamedProvider<P>> {
        let candidates: Vec<&InjectedProvider<P>> = if self.providers.is_empty() {
            self.ethereum.iter().collect()
        } else {
            self.providers.iter().collect()
        };

        let mut found: Vec<NamedProvider<P>> = Vec::with_capacity(candidates.len());
        for injected in candidates {
            let vendor = Vendor::from_flags(&injected.flags);
            if found.iter().any(|p| p.vendor == vendor) {
                debug!(wallet = vendor.name(), "Skipping duplicate provider");
                continue;
            }
            found.push(NamedProvider {
                vendor,
                provider: injected.provider.clone(),
            });
        }
        found
    }
}

/// Outcome of provider selection.
#[derive(Debug, Clone)]
pub enum Selection<P> {
    /// Exactly one provider; connect to it directly.
    Single(NamedProvider<P>),
    /// The user must choose before any connection is attempted.
    Choose(Vec<NamedProvider<P>>),
}

impl<P> Selection<P> {
    /// Names to list in the selection prompt.
    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Self::Single(p) => vec![p.name()],
            Self::Choose(ps) => ps.iter().map(NamedProvider::name).collect(),
        }
    }
}

/// Discovers providers and opens wallet sessions.
pub struct WalletConnector<D> {
    discovery: D,
    chain_id: Option<u64>,
    poll_interval: Duration,
}

impl<D: ProviderDiscovery> WalletConnector<D> {
    pub fn new(discovery: D) -> Self {
        Self {
            discovery,
            chain_id: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Require the wallet to be on `chain_id`, switching it if needed.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn discover(&self) -> Vec<NamedProvider<D::Provider>> {
        self.discovery.discover()
    }

    /// Decide whether a prompt is needed. No provider is contacted.
    pub fn select(&self) -> Result<Selection<D::Provider>, WalletError> {
        let mut found = self.discover();
        match found.len() {
            0 => {
                warn!("No wallet provider found");
                Err(WalletError::NoWalletFound)
            }
            1 => Ok(Selection::Single(found.remove(0))),
            n => {
                info!(count = n, "Multiple wallet providers found, selection required");
                Ok(Selection::Choose(found))
            }
        }
    }

    /// Resolve the user's choice from a selection prompt.
    pub fn pick(&self, name: &str) -> Result<NamedProvider<D::Provider>, WalletError> {
        self.discover()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| WalletError::UnknownProvider(name.to_string()))
    }

    /// Request account access and open a session.
    pub async fn connect(
        &self,
        wallet: NamedProvider<D::Provider>,
    ) -> Result<WalletSession<D::Provider>, WalletError> {
        info!(wallet = wallet.name(), "Requesting account access");

        let accounts = wallet
            .provider
            .request("eth_requestAccounts", json!([]))
            .await?;
        let address = accounts
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .ok_or_else(|| WalletError::Rejected("no account authorized".into()))?;
        let address: Address = address
            .parse()
            .map_err(|e| WalletError::InvalidResponse(format!("account {address:?}: {e}")))?;

        let mut chain_id = parse_u64(&wallet.provider.request("eth_chainId", json!([])).await?)?;

        if let Some(expected) = self.chain_id {
            if chain_id != expected {
                info!(actual = chain_id, expected, "Switching wallet network");
                let switch = wallet
                    .provider
                    .request(
                        "wallet_switchEthereumChain",
                        json!([{ "chainId": format!("{expected:#x}") }]),
                    )
                    .await;
                if let Err(e) = switch {
                    warn!(error = %e, "Network switch failed");
                    return Err(WalletError::WrongNetwork {
                        expected,
                        actual: chain_id,
                    });
                }
                chain_id = expected;
            }
        }

        let balance = fetch_balance(&wallet.provider, &address).await?;

        info!(
            wallet = wallet.name(),
            address = %address,
            chain_id,
            balance = %format_ether(balance),
            "Wallet connected"
        );

        Ok(WalletSession {
            wallet,
            address,
            balance,
            chain_id,
            poll_interval: self.poll_interval,
        })
    }
}

/// An active wallet connection.
#[derive(Debug, Clone)]
pub struct WalletSession<P> {
    wallet: NamedProvider<P>,
    address: Address,
    balance: U256,
    chain_id: u64,
    poll_interval: Duration,
}

impl<P: Eip1193> WalletSession<P> {
    pub fn address(&self) -> Address {
        self.address
    }

    /// Balance in wei, as of connect or the last refresh.
    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn wallet_name(&self) -> &'static str {
        self.wallet.name()
    }

    pub async fn refresh_balance(&mut self) -> Result<U256, WalletError> {
        self.balance = fetch_balance(&self.wallet.provider, &self.address).await?;
        Ok(self.balance)
    }

    /// Handle for signing and sending through the connected provider.
    pub fn signer(&self) -> Signer<'_, P> {
        Signer {
            provider: &self.wallet.provider,
            from: self.address,
            poll_interval: self.poll_interval,
        }
    }
}

/// Sends transactions from the session's account.
pub struct Signer<'a, P> {
    provider: &'a P,
    from: Address,
    poll_interval: Duration,
}

impl<P: Eip1193> Signer<'_, P> {
    pub fn address(&self) -> Address {
        self.from
    }

    /// `eth_sendTransaction`; the wallet signs. Returns the transaction hash.
    pub async fn send_transaction(&self, to: Address, data: &[u8]) -> Result<String, WalletError> {
        let tx = json!({
            "from": format!("{:#x}", self.from),
            "to": format!("{to:#x}"),
            "data": format!("0x{}", hex::encode(data)),
        });

        let hash = self.provider.request("eth_sendTransaction", json!([tx])).await?;
        hash.as_str()
            .map(str::to_string)
            .ok_or_else(|| WalletError::InvalidResponse(format!("transaction hash: {hash}")))
    }

    /// Poll until the transaction is included. There is no deadline.
    pub async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, WalletError> {
        loop {
            let receipt = self
                .provider
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !receipt.is_null() {
                return serde_json::from_value(receipt)
                    .map_err(|e| WalletError::InvalidResponse(format!("receipt: {e}")));
            }
            debug!(tx_hash, "Receipt not available yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Log entry of a mined transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TxLog {
    pub address: Address,
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: String,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<TxLog>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|b| u64::from_str_radix(b.trim_start_matches("0x"), 16).ok())
    }
}

async fn fetch_balance<P: Eip1193>(provider: &P, address: &Address) -> Result<U256, WalletError> {
    let balance = provider
        .request("eth_getBalance", json!([format!("{address:#x}"), "latest"]))
        .await?;
    let hex = balance
        .as_str()
        .ok_or_else(|| WalletError::InvalidResponse(format!("balance: {balance}")))?;
    U256::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|e| WalletError::InvalidResponse(format!("balance {hex:?}: {e}")))
}

fn parse_u64(value: &Value) -> Result<u64, WalletError> {
    match value {
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse(),
            };
            parsed.map_err(|e| WalletError::InvalidResponse(format!("quantity {s:?}: {e}")))
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| WalletError::InvalidResponse(format!("quantity {n}"))),
        other => Err(WalletError::InvalidResponse(format!("quantity {other}"))),
    }
}

/// Wei to a decimal ether string, trailing zeros trimmed.
pub fn format_ether(wei: U256) -> String {
    let ether = alloy_primitives::utils::format_ether(wei);
    ether.trim_end_matches('0').trim_end_matches('.').to_string()
}
