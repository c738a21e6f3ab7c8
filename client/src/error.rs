use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

/// Outcome of a failed claim step.
///
/// Batch claims record one of these per epoch and keep going; single claims
/// return it directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("wallet not connected or unable to sign transactions")]
    WalletUnavailable,

    #[error("wallet mismatch: entitlement belongs to {expected}, connected wallet is {connected}")]
    WalletMismatch { expected: Pubkey, connected: Pubkey },

    #[error("malformed proof element #{position}: {reason}")]
    MalformedProof { position: usize, reason: String },

    #[error("signature request rejected by the user")]
    UserRejected,

    #[error("merkle proof for epoch {epoch} rejected on-chain; refetch the entitlement")]
    BadProof { epoch: u64 },

    #[error("transaction not confirmed: {reason}")]
    ConfirmationFailed {
        signature: Option<Signature>,
        reason: String,
    },

    #[error("epoch {epoch} already claimed")]
    AlreadyClaimed { epoch: u64 },

    #[error("nothing to claim: {reason}")]
    NotClaimable { reason: String },

    #[error("invalid claim payload: {0}")]
    InvalidPayload(String),

    #[error("entitlement provider: {0}")]
    Provider(String),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("rpc: {0}")]
    Rpc(String),
}

impl ClaimError {
    /// Retrying the same entitlement may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConfirmationFailed { .. } | Self::Rpc(_))
    }

    /// The entitlement is stale and should be fetched again before any retry.
    pub fn should_refetch(&self) -> bool {
        matches!(self, Self::BadProof { .. } | Self::AlreadyClaimed { .. })
    }
}

/// Failures reported by a [`crate::wallet::ClaimWallet`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet unavailable")]
    Unavailable,

    #[error("user rejected the request")]
    Rejected,

    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<WalletError> for ClaimError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Unavailable => ClaimError::WalletUnavailable,
            WalletError::Rejected => ClaimError::UserRejected,
            WalletError::Signing(reason) => ClaimError::Transaction(reason),
        }
    }
}

/// Failures reported by a [`crate::chain::ClaimChain`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("program rejected the merkle proof")]
    BadProof,

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Failures reported by a [`crate::provider::EntitlementProvider`].
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("server refused: {0}")]
    Refused(String),
}

impl From<ProviderError> for ClaimError {
    fn from(err: ProviderError) -> Self {
        ClaimError::Provider(err.to_string())
    }
}
