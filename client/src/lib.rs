//! Off-chain side of xess-claim: fetches merkle entitlements from the rewards
//! API and turns them into confirmed claim transactions, one epoch at a time.

pub mod amount;
pub mod chain;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod instructions;
pub mod logging;
pub mod provider;
pub mod reconciler;
pub mod wallet;

pub use amount::format_xess;
pub use chain::{ClaimChain, RpcChain};
pub use entitlement::{ClaimAccounts, Entitlement, LeafVersion};
pub use error::{ChainError, ClaimError, ProviderError, WalletError};
pub use provider::{EntitlementProvider, HttpEntitlementProvider};
pub use reconciler::{
    BatchResult, ClaimAttempt, ClaimReconciler, ClaimStatus, ReconcilerConfig, ServerAck, TxResult,
};
pub use wallet::{ClaimWallet, KeypairWallet};
