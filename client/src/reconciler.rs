//! Claiming weekly reward epochs against the xess-claim program.
//!
//! The receipt PDA is the only source of truth for "already paid". Server
//! state is advisory: it is consulted for proofs and told about payouts, but
//! a failed acknowledgement never turns a confirmed claim into a failure.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};
use tracing::{debug, info, warn};

use crate::amount::format_xess;
use crate::chain::ClaimChain;
use crate::entitlement::{
    decode_hex32, decode_proof, ClaimConfirmation, Entitlement, LeafVersion, ListedEntitlement,
};
use crate::error::{ChainError, ClaimError};
use crate::instructions::claim_instructions::{claim_instr, claim_v2_instr, create_user_ata_instr};
use crate::instructions::utils::{get_receipt_address, get_receipt_v2_address, get_user_ata_address};
use crate::provider::EntitlementProvider;
use crate::wallet::ClaimWallet;

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Program used for status lookups; claims use the program named by
    /// each entitlement.
    pub program_id: Pubkey,
    /// Upper bound on broadcast + confirmation of one claim transaction.
    pub confirm_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            program_id: xess_claim::ID,
            confirm_timeout: Duration::from_secs(60),
        }
    }
}

/// Whether the server recorded a confirmed claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAck {
    Acknowledged,
    /// The claim is final on-chain; the server record can be reconciled later.
    Failed(String),
}

/// A confirmed claim transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    pub epoch: u64,
    pub signature: Signature,
    pub amount_atomic: u64,
    /// The transaction also created the claimer's reward ATA.
    pub created_ata: bool,
    pub server_ack: ServerAck,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAttempt {
    pub epoch: u64,
    pub week_key: Option<String>,
    pub outcome: Result<TxResult, ClaimError>,
}

impl ClaimAttempt {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate of a batch claim. `success_count < total_epochs` means partial
/// success; the per-epoch details are in `attempts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub success_count: usize,
    pub total_epochs: usize,
    /// Sum of the amounts of successful claims, in atomic units.
    pub claimed_amount_atomic: u128,
    pub tx_signatures: Vec<Signature>,
    pub attempts: Vec<ClaimAttempt>,
}

impl BatchResult {
    /// One-line report, e.g. `Claimed 3.5 XESS (2/2 weeks)`.
    pub fn summary(&self) -> String {
        format!(
            "Claimed {} XESS ({}/{} weeks)",
            format_xess(self.claimed_amount_atomic, 2),
            self.success_count,
            self.total_epochs
        )
    }

    pub fn failures(&self) -> impl Iterator<Item = &ClaimAttempt> {
        self.attempts.iter().filter(|a| !a.succeeded())
    }
}

/// On-chain claim state of one epoch for the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimStatus {
    pub epoch: u64,
    pub receipt: Pubkey,
    pub receipt_v2: Pubkey,
    /// Leaf version of the receipt found, if any.
    pub claimed_version: Option<u8>,
}

impl ClaimStatus {
    pub fn claimed(&self) -> bool {
        self.claimed_version.is_some()
    }
}

/// What the batch knows about the claimer's reward ATA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtaState {
    Unknown,
    Present,
}

/// Fold state of a batch claim.
struct BatchAccumulator {
    ata: AtaState,
    last_epoch: Option<u64>,
    result: BatchResult,
}

impl BatchAccumulator {
    fn new(total_epochs: usize) -> Self {
        Self {
            ata: AtaState::Unknown,
            last_epoch: None,
            result: BatchResult {
                total_epochs,
                ..BatchResult::default()
            },
        }
    }

    fn record(
        &mut self,
        epoch: u64,
        week_key: Option<String>,
        outcome: Result<TxResult, ClaimError>,
    ) {
        if let Ok(tx) = &outcome {
            self.result.success_count += 1;
            self.result.claimed_amount_atomic = self
                .result
                .claimed_amount_atomic
                .saturating_add(u128::from(tx.amount_atomic));
            self.result.tx_signatures.push(tx.signature);
        }
        self.last_epoch = Some(epoch);
        self.result.attempts.push(ClaimAttempt {
            epoch,
            week_key,
            outcome,
        });
    }
}

/// Claims reward epochs for one wallet, one transaction at a time.
pub struct ClaimReconciler<P, W, C> {
    provider: P,
    wallet: W,
    chain: C,
    config: ReconcilerConfig,
}

impl<P, W, C> ClaimReconciler<P, W, C>
where
    P: EntitlementProvider,
    W: ClaimWallet,
    C: ClaimChain,
{
    pub fn new(provider: P, wallet: W, chain: C, config: ReconcilerConfig) -> Self {
        Self {
            provider,
            wallet,
            chain,
            config,
        }
    }

    /// Fetches the latest epoch's entitlement for the signed-in user.
    ///
    /// Returns `AlreadyClaimed` if the server says so or if the connected
    /// wallet's receipt already exists on-chain, `NotClaimable` if there is
    /// no allocation, `WalletMismatch` if the server prepared the claim for
    /// another wallet.
    pub async fn prepare_single_claim(&self) -> Result<Entitlement, ClaimError> {
        let entitlement = self.provider.prepare_latest().await?.into_entitlement()?;
        let wallet = self.wallet.pubkey().ok_or(ClaimError::WalletUnavailable)?;
        if entitlement.claimer != wallet {
            return Err(ClaimError::WalletMismatch {
                expected: entitlement.claimer,
                connected: wallet,
            });
        }
        // The receipt was re-derived from the claimer, which is now the wallet.
        if self.receipt_exists(&entitlement).await? {
            info!(epoch = entitlement.epoch, "receipt already on-chain");
            return Err(ClaimError::AlreadyClaimed {
                epoch: entitlement.epoch,
            });
        }
        Ok(entitlement)
    }

    /// Claims one entitlement, creating the reward ATA if it is missing.
    pub async fn claim_single(&self, entitlement: &Entitlement) -> Result<TxResult, ClaimError> {
        let mut ata = AtaState::Unknown;
        let outcome = self.claim_with(entitlement, &mut ata).await;
        log_outcome(entitlement, &outcome);
        outcome
    }

    /// Claims every entitlement in the order given, never two at once.
    ///
    /// A failure is recorded and the batch moves on: epochs are independent
    /// on-chain, so one bad proof says nothing about the next.
    pub async fn claim_all(&self, entitlements: Vec<Entitlement>) -> BatchResult {
        self.claim_listed(entitlements.into_iter().map(Ok).collect())
            .await
    }

    /// Fetches the outstanding epochs from the provider and claims them all.
    ///
    /// Epochs that fail validation count as failed attempts of the batch.
    pub async fn claim_all_outstanding(&self) -> Result<BatchResult, ClaimError> {
        let listed = self.provider.outstanding().await?.into_entitlements()?;
        if listed.is_empty() {
            info!("no epochs ready to claim");
        }
        Ok(self.claim_listed(listed).await)
    }

    async fn claim_listed(&self, listed: Vec<ListedEntitlement>) -> BatchResult {
        let total = listed.len();
        info!(total, "claiming outstanding epochs");

        let accumulator = stream::iter(listed.into_iter().enumerate())
            .fold(BatchAccumulator::new(total), |mut acc, (i, item)| async move {
                match item {
                    Ok(entitlement) => {
                        if acc.last_epoch.is_some_and(|last| entitlement.epoch <= last) {
                            warn!(
                                epoch = entitlement.epoch,
                                previous = acc.last_epoch,
                                "epochs not in ascending order; claiming in server order"
                            );
                        }
                        info!("claiming {}/{} ({})", i + 1, total, entitlement.label());
                        let outcome = self.claim_with(&entitlement, &mut acc.ata).await;
                        log_outcome(&entitlement, &outcome);
                        acc.record(entitlement.epoch, entitlement.week_key, outcome);
                    }
                    Err(rejected) => {
                        // 0 stands in for an epoch the server sent unreadable.
                        let epoch = rejected.epoch.unwrap_or_default();
                        warn!(
                            epoch,
                            error = %rejected.error,
                            "skipping {}/{}: invalid entitlement",
                            i + 1,
                            total
                        );
                        acc.record(epoch, rejected.week_key, Err(rejected.error));
                    }
                }
                acc
            })
            .await;

        let result = accumulator.result;
        info!(
            claimed = result.success_count,
            total = result.total_epochs,
            amount_atomic = %result.claimed_amount_atomic,
            "batch claim finished"
        );
        result
    }

    /// Looks up both receipt PDAs of `epoch` for the connected wallet.
    pub async fn claim_status(&self, epoch: u64) -> Result<ClaimStatus, ClaimError> {
        let wallet = self.wallet.pubkey().ok_or(ClaimError::WalletUnavailable)?;
        let program_id = self.config.program_id;
        let receipt = get_receipt_address(&program_id, epoch, &wallet);
        let receipt_v2 = get_receipt_v2_address(&program_id, epoch, &wallet);

        let claimed_version = if self.is_program_account(&receipt, &program_id).await? {
            Some(1)
        } else if self.is_program_account(&receipt_v2, &program_id).await? {
            Some(2)
        } else {
            None
        };
        Ok(ClaimStatus {
            epoch,
            receipt,
            receipt_v2,
            claimed_version,
        })
    }

    async fn claim_with(
        &self,
        entitlement: &Entitlement,
        ata: &mut AtaState,
    ) -> Result<TxResult, ClaimError> {
        // Local checks first: nothing below touches the network until the
        // wallet matches and the proof decodes.
        let wallet = self.wallet.pubkey().ok_or(ClaimError::WalletUnavailable)?;
        if entitlement.claimer != wallet {
            return Err(ClaimError::WalletMismatch {
                expected: entitlement.claimer,
                connected: wallet,
            });
        }
        let proof = decode_proof(&entitlement.proof_hex)?;
        let salt = match &entitlement.version {
            LeafVersion::V1 => None,
            LeafVersion::V2 { salt_hex } => Some(decode_hex32(salt_hex).map_err(|reason| {
                ClaimError::InvalidPayload(format!("claim salt: {reason}"))
            })?),
        };

        if self.receipt_exists(entitlement).await? {
            return Err(ClaimError::AlreadyClaimed {
                epoch: entitlement.epoch,
            });
        }

        let accounts = &entitlement.accounts;
        let user_ata = get_user_ata_address(&wallet, &accounts.mint);
        let create_ata = match *ata {
            AtaState::Present => false,
            AtaState::Unknown => self.chain.account_owner(&user_ata).await.map_err(rpc)?.is_none(),
        };
        if !create_ata {
            *ata = AtaState::Present;
        }

        let mut instructions = Vec::with_capacity(2);
        if create_ata {
            debug!(%user_ata, "reward ATA missing, creating it in this transaction");
            instructions.push(create_user_ata_instr(&wallet, &accounts.mint));
        }
        instructions.push(match salt {
            None => claim_instr(
                accounts,
                wallet,
                user_ata,
                entitlement.epoch,
                entitlement.amount_atomic,
                entitlement.index,
                proof,
            ),
            Some(salt) => claim_v2_instr(
                accounts,
                wallet,
                user_ata,
                entitlement.epoch,
                entitlement.amount_atomic,
                entitlement.index,
                salt,
                proof,
            ),
        });

        let blockhash = self.chain.latest_blockhash().await.map_err(rpc)?;
        let mut tx = Transaction::new_with_payer(&instructions, Some(&wallet));
        tx.message.recent_blockhash = blockhash;
        let signed = self.wallet.sign_transaction(tx).await?;
        let sent_signature = signed.signatures.first().copied();

        let signature = match tokio::time::timeout(
            self.config.confirm_timeout,
            self.chain.send_and_confirm(&signed),
        )
        .await
        {
            Ok(Ok(signature)) => signature,
            Ok(Err(ChainError::BadProof)) => {
                return Err(ClaimError::BadProof {
                    epoch: entitlement.epoch,
                })
            }
            Ok(Err(err)) => return Err(self.reconcile_failure(entitlement, err).await),
            Err(_elapsed) => {
                self.reconcile_timeout(entitlement, sent_signature)
                    .await?
            }
        };

        *ata = AtaState::Present;
        let server_ack = self.acknowledge(entitlement, &signature).await;
        Ok(TxResult {
            epoch: entitlement.epoch,
            signature,
            amount_atomic: entitlement.amount_atomic,
            created_ata: create_ata,
            server_ack,
        })
    }

    /// A confirmation timeout is only a failure if the receipt did not land.
    async fn reconcile_timeout(
        &self,
        entitlement: &Entitlement,
        signature: Option<Signature>,
    ) -> Result<Signature, ClaimError> {
        let reason = format!(
            "no confirmation within {}s",
            self.config.confirm_timeout.as_secs_f32()
        );
        match (self.receipt_exists(entitlement).await, signature) {
            (Ok(true), Some(signature)) => {
                info!(epoch = entitlement.epoch, %signature, "confirmation timed out but receipt exists");
                Ok(signature)
            }
            _ => Err(ClaimError::ConfirmationFailed { signature, reason }),
        }
    }

    /// Any other send failure: if the receipt exists the epoch was paid,
    /// by this or an earlier transaction.
    async fn reconcile_failure(&self, entitlement: &Entitlement, err: ChainError) -> ClaimError {
        if let Ok(true) = self.receipt_exists(entitlement).await {
            return ClaimError::AlreadyClaimed {
                epoch: entitlement.epoch,
            };
        }
        match err {
            ChainError::BadProof => ClaimError::BadProof {
                epoch: entitlement.epoch,
            },
            ChainError::Transaction(reason) => ClaimError::Transaction(reason),
            ChainError::Rpc(reason) => ClaimError::Rpc(reason),
        }
    }

    async fn acknowledge(&self, entitlement: &Entitlement, signature: &Signature) -> ServerAck {
        let confirmation = ClaimConfirmation::new(entitlement, signature);
        match self.provider.confirm_claim(&confirmation).await {
            Ok(()) => ServerAck::Acknowledged,
            Err(err) => {
                warn!(
                    epoch = entitlement.epoch,
                    %signature,
                    error = %err,
                    "claim confirmed on-chain but server acknowledgement failed"
                );
                ServerAck::Failed(err.to_string())
            }
        }
    }

    async fn receipt_exists(&self, entitlement: &Entitlement) -> Result<bool, ClaimError> {
        self.is_program_account(&entitlement.accounts.receipt, &entitlement.accounts.program_id)
            .await
    }

    async fn is_program_account(
        &self,
        address: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<bool, ClaimError> {
        let owner = self.chain.account_owner(address).await.map_err(rpc)?;
        Ok(owner.as_ref() == Some(program_id))
    }
}

fn rpc(err: ChainError) -> ClaimError {
    match err {
        ChainError::Rpc(reason) | ChainError::Transaction(reason) => ClaimError::Rpc(reason),
        ChainError::BadProof => ClaimError::Rpc("unexpected program error on a read".to_string()),
    }
}

fn log_outcome(entitlement: &Entitlement, outcome: &Result<TxResult, ClaimError>) {
    match outcome {
        Ok(tx) => info!(
            epoch = tx.epoch,
            signature = %tx.signature,
            amount_atomic = tx.amount_atomic,
            "claimed"
        ),
        Err(ClaimError::UserRejected) => info!(epoch = entitlement.epoch, "claim cancelled by user"),
        Err(err) => warn!(epoch = entitlement.epoch, error = %err, "claim failed"),
    }
}
