//! Binding to the deployed ERC-721 contract.
//!
//! Only the `mint` entry point and the standard `Transfer` event are used;
//! the contract's storage layout is irrelevant here.

use crate::wallet::{Signer, TxReceipt};
use crate::{Eip1193, WalletError};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use tracing::info;

sol! {
    function mint(address to, string uri) external returns (uint256);

    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

/// The NFT contract at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftContract {
    pub address: Address,
}

impl NftContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// ABI-encoded `mint(to, uri)` call.
    pub fn mint_calldata(to: Address, uri: &str) -> Vec<u8> {
        mintCall {
            to,
            uri: uri.to_string(),
        }
        .abi_encode()
    }

    /// Submit `mint(to, uri)` through `signer`. Returns the transaction hash.
    pub async fn mint<P: Eip1193>(
        &self,
        signer: &Signer<'_, P>,
        to: Address,
        uri: &str,
    ) -> Result<String, WalletError> {
        let tx_hash = signer
            .send_transaction(self.address, &Self::mint_calldata(to, uri))
            .await?;
        info!(contract = %self.address, to = %to, uri, tx_hash = %tx_hash, "Mint submitted");
        Ok(tx_hash)
    }

    /// Token id of the first token this contract minted in `receipt`.
    pub fn token_id_from_receipt(&self, receipt: &TxReceipt) -> Option<U256> {
        receipt
            .logs
            .iter()
            .filter(|log| log.address == self.address)
            .find(|log| {
                log.topics.len() == 4
                    && log.topics[0] == Transfer::SIGNATURE_HASH
                    && log.topics[1] == B256::ZERO
            })
            .map(|log| U256::from_be_slice(log.topics[3].as_slice()))
    }
}
