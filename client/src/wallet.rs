use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use crate::error::WalletError;

/// Anything that can sign a Solana transaction for one account.
#[async_trait]
pub trait ClaimWallet: Send + Sync {
    /// The connected account, or `None` when no wallet is connected.
    fn pubkey(&self) -> Option<Pubkey>;

    /// Signs `tx` with the connected account. A user declining the prompt is
    /// reported as [`WalletError::Rejected`].
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, WalletError>;
}

/// Wallet backed by a local keypair file.
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl ClaimWallet for KeypairWallet {
    fn pubkey(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx)
    }
}
