//! Upload-then-mint pipeline.
//!
//! Steps run strictly in order and stop at the first failure: pin the image,
//! pin the metadata document that references it, then call `mint` with the
//! metadata's `ipfs://` reference. Nothing is retried or rolled back; content
//! pinned before a later failure stays pinned.

use crate::contract::NftContract;
use crate::wallet::WalletSession;
use crate::{ClientConfig, Eip1193, MintError, MintStep, PinningApi};
use alloy_primitives::{Address, U256};
use minter_types::{ContentId, MintForm, TokenMetadata};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Progress reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintEvent {
    ImageUploading,
    ImagePinned { cid: ContentId },
    MetadataUploading,
    MetadataPinned { cid: ContentId },
    /// Waiting for the user to approve the transaction in the wallet.
    AwaitingSignature,
    Submitted { tx_hash: String },
    Confirmed(MintReceipt),
    /// Shown as a blocking notification.
    Failed { step: MintStep, message: String },
}

/// Result of a confirmed mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: String,
    pub owner: Address,
    /// Taken from the contract's `Transfer` log, when present.
    pub token_id: Option<U256>,
    pub image_cid: ContentId,
    pub metadata_cid: ContentId,
    pub block_number: Option<u64>,
}

impl MintReceipt {
    /// Token reference stored on-chain.
    pub fn token_uri(&self) -> String {
        self.metadata_cid.ipfs_uri()
    }

    /// Block explorer link for the transaction.
    pub fn transaction_url(&self, config: &ClientConfig) -> String {
        format!(
            "{}/tx/{}",
            config.explorer_url.trim_end_matches('/'),
            self.tx_hash
        )
    }

    /// Gateway link for the pinned image.
    pub fn image_url(&self, config: &ClientConfig) -> String {
        self.image_cid.gateway_url(&config.gateway_url)
    }

    /// Gateway link for the pinned metadata document.
    pub fn metadata_url(&self, config: &ClientConfig) -> String {
        self.metadata_cid.gateway_url(&config.gateway_url)
    }
}

/// Clears the in-progress flag when the pipeline ends, however it ends.
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs mints against one contract through one pinning backend.
pub struct MintOrchestrator<C> {
    pinning: C,
    contract: NftContract,
    in_progress: AtomicBool,
    events: Option<mpsc::UnboundedSender<MintEvent>>,
}

impl<C: PinningApi> MintOrchestrator<C> {
    pub fn new(pinning: C, contract: NftContract) -> Self {
        Self {
            pinning,
            contract,
            in_progress: AtomicBool::new(false),
            events: None,
        }
    }

    /// Start reporting progress. Replaces any previous subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<MintEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn contract(&self) -> &NftContract {
        &self.contract
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Mint the form's contents to the session's account.
    ///
    /// A submission while another is in flight returns [`MintError::Busy`]
    /// and does nothing else. Validation failures make no network call and
    /// emit no event. The form is reset only after a confirmed mint.
    pub async fn submit<P: Eip1193>(
        &self,
        form: &mut MintForm,
        session: Option<&WalletSession<P>>,
    ) -> Result<MintReceipt, MintError> {
        let Some(_guard) = InProgress::acquire(&self.in_progress) else {
            return Err(MintError::Busy);
        };

        form.validate().map_err(MintError::Invalid)?;
        let session = session.ok_or(MintError::NoSession)?;

        match self.run(form, session).await {
            Ok(receipt) => {
                form.reset();
                self.emit(MintEvent::Confirmed(receipt.clone()));
                Ok(receipt)
            }
            Err(e) => {
                warn!(step = %e.step(), error = %e, "Mint failed");
                self.emit(MintEvent::Failed {
                    step: e.step(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run<P: Eip1193>(
        &self,
        form: &MintForm,
        session: &WalletSession<P>,
    ) -> Result<MintReceipt, MintError> {
        let image = form.validate().map_err(MintError::Invalid)?;

        self.emit(MintEvent::ImageUploading);
        let image_cid = self
            .pinning
            .pin_file(image)
            .await
            .map_err(MintError::ImageUpload)?;
        info!(cid = %image_cid, file = %image.file_name, "Image pinned");
        self.emit(MintEvent::ImagePinned {
            cid: image_cid.clone(),
        });

        let metadata = TokenMetadata::from_form(form, &image_cid);
        self.emit(MintEvent::MetadataUploading);
        let metadata_cid = self
            .pinning
            .pin_json(&metadata)
            .await
            .map_err(MintError::MetadataUpload)?;
        info!(cid = %metadata_cid, "Metadata pinned");
        self.emit(MintEvent::MetadataPinned {
            cid: metadata_cid.clone(),
        });

        let owner = session.address();
        let signer = session.signer();
        self.emit(MintEvent::AwaitingSignature);
        let tx_hash = self
            .contract
            .mint(&signer, owner, &metadata_cid.ipfs_uri())
            .await
            .map_err(MintError::Transaction)?;
        self.emit(MintEvent::Submitted {
            tx_hash: tx_hash.clone(),
        });

        let receipt = signer
            .wait_for_receipt(&tx_hash)
            .await
            .map_err(MintError::Transaction)?;
        if !receipt.succeeded() {
            return Err(MintError::Reverted { tx_hash });
        }

        let token_id = self.contract.token_id_from_receipt(&receipt);
        info!(
            tx_hash = %tx_hash,
            token_id = ?token_id,
            block = ?receipt.block_number(),
            "Mint confirmed"
        );

        Ok(MintReceipt {
            tx_hash,
            owner,
            token_id,
            image_cid,
            metadata_cid,
            block_number: receipt.block_number(),
        })
    }

    fn emit(&self, event: MintEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }
}
