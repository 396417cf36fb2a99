//! Error types for the mint client.

use minter_types::FormError;
use std::fmt;

/// A pinning proxy call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// Rejected client-side, no request sent.
    FileTooLarge { size: usize, limit: usize },
    /// The proxy could not be reached.
    Transport(String),
    /// The proxy answered with an error body. `message` is shown to the user.
    Upstream { status: u16, message: String },
    /// The proxy answered 2xx with something that is not a pin result.
    InvalidResponse(String),
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { size, limit } => {
                write!(f, "file is {size} bytes, limit is {limit} bytes")
            }
            Self::Transport(msg) => write!(f, "pinning proxy unreachable: {msg}"),
            Self::Upstream { message, .. } => write!(f, "{message}"),
            Self::InvalidResponse(msg) => write!(f, "invalid pinning response: {msg}"),
        }
    }
}

impl std::error::Error for PinError {}

/// EIP-1193 provider error (`{ code, message }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested account or method is not authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The chain has not been added to the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// JSON-RPC internal error, also used for transport failures.
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderError {}

/// Wallet discovery, connection, or signing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    NoWalletFound,
    UnknownProvider(String),
    /// The user declined in the wallet UI.
    Rejected(String),
    /// The wallet has not granted this site access to the account.
    Unauthorized(String),
    WrongNetwork { expected: u64, actual: u64 },
    Provider(ProviderError),
    InvalidResponse(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWalletFound => {
                write!(f, "No wallet found. Please install a browser wallet extension.")
            }
            Self::UnknownProvider(name) => write!(f, "wallet {name:?} is not available"),
            Self::Rejected(msg) => write!(f, "request rejected: {msg}"),
            Self::Unauthorized(msg) => write!(f, "wallet access not authorized: {msg}"),
            Self::WrongNetwork { expected, actual } => {
                write!(f, "wallet is on chain {actual}, expected chain {expected}")
            }
            Self::Provider(e) => write!(f, "{e}"),
            Self::InvalidResponse(msg) => write!(f, "invalid wallet response: {msg}"),
        }
    }
}

impl std::error::Error for WalletError {}

impl From<ProviderError> for WalletError {
    fn from(e: ProviderError) -> Self {
        match e.code {
            ProviderError::USER_REJECTED => Self::Rejected(e.message),
            ProviderError::UNAUTHORIZED => Self::Unauthorized(e.message),
            _ => Self::Provider(e),
        }
    }
}

/// Pipeline step, reported with failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStep {
    Validate,
    UploadImage,
    UploadMetadata,
    Mint,
}

impl fmt::Display for MintStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validate => "validate",
            Self::UploadImage => "upload image",
            Self::UploadMetadata => "upload metadata",
            Self::Mint => "mint",
        })
    }
}

/// Why a mint attempt stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    /// Another mint is in flight; this submission was ignored.
    Busy,
    Invalid(FormError),
    NoSession,
    ImageUpload(PinError),
    /// The image is already pinned and stays orphaned.
    MetadataUpload(PinError),
    Transaction(WalletError),
    Reverted { tx_hash: String },
}

impl MintError {
    pub fn step(&self) -> MintStep {
        match self {
            Self::Busy | Self::Invalid(_) | Self::NoSession => MintStep::Validate,
            Self::ImageUpload(_) => MintStep::UploadImage,
            Self::MetadataUpload(_) => MintStep::UploadMetadata,
            Self::Transaction(_) | Self::Reverted { .. } => MintStep::Mint,
        }
    }

    /// Validation blocks are not reported to the user.
    pub fn is_silent(&self) -> bool {
        self.step() == MintStep::Validate
    }
}

impl fmt::Display for MintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "a mint is already in progress"),
            Self::Invalid(e) => write!(f, "{e}"),
            Self::NoSession => write!(f, "connect a wallet first"),
            Self::ImageUpload(e) => write!(f, "Image upload failed: {e}"),
            Self::MetadataUpload(e) => write!(f, "Metadata upload failed: {e}"),
            Self::Transaction(e) => write!(f, "Minting failed: {e}"),
            Self::Reverted { tx_hash } => write!(f, "Transaction {tx_hash} reverted"),
        }
    }
}

impl std::error::Error for MintError {}
