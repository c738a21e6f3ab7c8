use std::time::Duration;

use async_trait::async_trait;
use solana_client::{
    client_error::ClientError, nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use tracing::debug;

use crate::error::ChainError;

/// Read/write access to the cluster, as far as claiming needs it.
#[async_trait]
pub trait ClaimChain: Send + Sync {
    /// Owner program of `address`, or `None` if the account does not exist.
    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>, ChainError>;

    async fn latest_blockhash(&self) -> Result<Hash, ChainError>;

    /// Broadcasts a signed transaction and resolves once it is confirmed.
    ///
    /// Callers bound this with their own timeout; implementations may poll
    /// for as long as they are awaited.
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, ChainError>;
}

/// [`ClaimChain`] over the Solana JSON-RPC API.
pub struct RpcChain {
    client: RpcClient,
    commitment: CommitmentConfig,
    poll_interval: Duration,
}

impl RpcChain {
    pub fn new(http_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(http_url, commitment),
            commitment,
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Parses the commitment names used in config files; unknown names fall back
/// to `confirmed`.
pub fn commitment_from_str(commitment: &str) -> CommitmentConfig {
    match commitment {
        "finalized" => CommitmentConfig::finalized(),
        "processed" => CommitmentConfig::processed(),
        _ => CommitmentConfig::confirmed(),
    }
}

fn bad_proof_code() -> u32 {
    anchor_lang::error::ERROR_CODE_OFFSET + xess_claim::error::ErrorCode::BadProof as u32
}

fn map_transaction_error(err: TransactionError) -> ChainError {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code))
            if code == bad_proof_code() =>
        {
            ChainError::BadProof
        }
        other => ChainError::Transaction(other.to_string()),
    }
}

fn map_client_error(err: ClientError) -> ChainError {
    match err.get_transaction_error() {
        Some(tx_err) => map_transaction_error(tx_err),
        None => ChainError::Rpc(err.to_string()),
    }
}

#[async_trait]
impl ClaimChain for RpcChain {
    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>, ChainError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(map_client_error)?;
        Ok(response.value.map(|account| account.owner))
    }

    async fn latest_blockhash(&self) -> Result<Hash, ChainError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(map_client_error)
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, ChainError> {
        let signature = self
            .client
            .send_transaction_with_config(
                tx,
                RpcSendTransactionConfig {
                    skip_preflight: false,
                    preflight_commitment: Some(self.commitment.commitment),
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await
            .map_err(map_client_error)?;
        debug!(%signature, "transaction sent, awaiting confirmation");

        // An expired blockhash leaves the status empty forever; the caller's
        // timeout ends the loop.
        loop {
            match self
                .client
                .get_signature_status_with_commitment(&signature, self.commitment)
                .await
                .map_err(map_client_error)?
            {
                Some(Ok(())) => return Ok(signature),
                Some(Err(err)) => return Err(map_transaction_error(err)),
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_proof_custom_error_is_recognised() {
        let err = TransactionError::InstructionError(1, InstructionError::Custom(6002));
        assert_eq!(map_transaction_error(err), ChainError::BadProof);
    }

    #[test]
    fn other_program_errors_stay_generic() {
        let err = TransactionError::InstructionError(1, InstructionError::Custom(6001));
        assert!(matches!(
            map_transaction_error(err),
            ChainError::Transaction(_)
        ));
        assert!(matches!(
            map_transaction_error(TransactionError::BlockhashNotFound),
            ChainError::Transaction(_)
        ));
    }

    #[test]
    fn commitment_names() {
        assert_eq!(commitment_from_str("finalized"), CommitmentConfig::finalized());
        assert_eq!(commitment_from_str("processed"), CommitmentConfig::processed());
        assert_eq!(commitment_from_str("whatever"), CommitmentConfig::confirmed());
    }
}
