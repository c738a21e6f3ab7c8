//! In-memory collaborators for driving `ClaimReconciler` without a cluster
//! or a rewards server.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

use xess_client::entitlement::{
    ClaimAccounts, ClaimAllResponse, ClaimConfirmation, Entitlement, LeafVersion,
    PrepareClaimResponse,
};
use xess_client::instructions::utils::{
    get_config_address, get_epoch_root_address, get_receipt_address, get_receipt_v2_address,
    get_user_ata_address, get_vault_authority_address,
};
use xess_client::{ChainError, ClaimChain, ClaimWallet, EntitlementProvider, ProviderError, WalletError};

pub const RECEIPT_ACCOUNT_INDEX: usize = 3;
pub const ATA_ACCOUNT_INDEX: usize = 1;

/// What the next `send_and_confirm` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStep {
    Confirm,
    BadProof,
    Fail,
    /// Never resolves; nothing lands.
    Hang,
    /// The transaction lands but the confirmation never arrives.
    LandThenHang,
}

#[derive(Default)]
struct ChainState {
    owners: HashMap<Pubkey, Pubkey>,
    sent: Vec<Transaction>,
    calls: usize,
    script: VecDeque<SendStep>,
}

/// Shared handle: clone one into the reconciler and keep one for asserts.
#[derive(Clone, Default)]
pub struct FakeChain {
    state: Arc<Mutex<ChainState>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, steps: &[SendStep]) {
        self.state.lock().unwrap().script.extend(steps.iter().copied());
    }

    pub fn set_owner(&self, address: Pubkey, owner: Pubkey) {
        self.state.lock().unwrap().owners.insert(address, owner);
    }

    pub fn owner(&self, address: &Pubkey) -> Option<Pubkey> {
        self.state.lock().unwrap().owners.get(address).copied()
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Applies the account creations a successful claim transaction makes.
    fn land(state: &mut ChainState, tx: &Transaction) {
        let keys = &tx.message.account_keys;
        for ix in &tx.message.instructions {
            let program = keys[ix.program_id_index as usize];
            if program == xess_claim::ID {
                let receipt = keys[ix.accounts[RECEIPT_ACCOUNT_INDEX] as usize];
                state.owners.insert(receipt, xess_claim::ID);
            } else if program == spl_associated_token_account::id() {
                let ata = keys[ix.accounts[ATA_ACCOUNT_INDEX] as usize];
                state.owners.insert(ata, spl_token::id());
            }
        }
    }
}

/// Program ids of each instruction in a sent transaction.
pub fn instruction_programs(tx: &Transaction) -> Vec<Pubkey> {
    tx.message
        .instructions
        .iter()
        .map(|ix| tx.message.account_keys[ix.program_id_index as usize])
        .collect()
}

/// Receipt account addressed by the claim instruction of `tx`.
pub fn claimed_receipt(tx: &Transaction) -> Pubkey {
    let keys = &tx.message.account_keys;
    let ix = tx
        .message
        .instructions
        .iter()
        .find(|ix| keys[ix.program_id_index as usize] == xess_claim::ID)
        .expect("claim instruction");
    keys[ix.accounts[RECEIPT_ACCOUNT_INDEX] as usize]
}

#[async_trait]
impl ClaimChain for FakeChain {
    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.owners.get(address).copied())
    }

    async fn latest_blockhash(&self) -> Result<Hash, ChainError> {
        self.state.lock().unwrap().calls += 1;
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, ChainError> {
        let step = {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.sent.push(tx.clone());
            let step = state.script.pop_front().unwrap_or(SendStep::Confirm);
            if matches!(step, SendStep::Confirm | SendStep::LandThenHang) {
                Self::land(&mut state, tx);
            }
            step
        };
        match step {
            SendStep::Confirm => Ok(tx.signatures[0]),
            SendStep::BadProof => Err(ChainError::BadProof),
            SendStep::Fail => Err(ChainError::Transaction("Blockhash not found".to_string())),
            SendStep::Hang | SendStep::LandThenHang => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletMode {
    Sign,
    Reject,
    Disconnected,
}

pub struct FakeWallet {
    keypair: Keypair,
    mode: WalletMode,
}

impl FakeWallet {
    pub fn new(mode: WalletMode) -> Self {
        Self {
            keypair: Keypair::new(),
            mode,
        }
    }

    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl ClaimWallet for FakeWallet {
    fn pubkey(&self) -> Option<Pubkey> {
        match self.mode {
            WalletMode::Disconnected => None,
            _ => Some(self.keypair.pubkey()),
        }
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, WalletError> {
        match self.mode {
            WalletMode::Sign => {
                let blockhash = tx.message.recent_blockhash;
                tx.try_sign(&[&self.keypair], blockhash)
                    .map_err(|e| WalletError::Signing(e.to_string()))?;
                Ok(tx)
            }
            WalletMode::Reject => Err(WalletError::Rejected),
            WalletMode::Disconnected => Err(WalletError::Unavailable),
        }
    }
}

#[derive(Default)]
struct ProviderState {
    prepare: Value,
    outstanding: Value,
    reject_acks: bool,
    acks: Vec<ClaimConfirmation>,
}

#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.set_outstanding(json!({ "ok": true, "claimableEpochs": [] }));
        provider
    }

    pub fn set_prepare(&self, body: Value) {
        self.state.lock().unwrap().prepare = body;
    }

    pub fn set_outstanding(&self, body: Value) {
        self.state.lock().unwrap().outstanding = body;
    }

    pub fn reject_acks(&self) {
        self.state.lock().unwrap().reject_acks = true;
    }

    pub fn acks(&self) -> Vec<ClaimConfirmation> {
        self.state.lock().unwrap().acks.clone()
    }
}

#[async_trait]
impl EntitlementProvider for FakeProvider {
    async fn prepare_latest(&self) -> Result<PrepareClaimResponse, ProviderError> {
        let body = self.state.lock().unwrap().prepare.clone();
        serde_json::from_value(body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn outstanding(&self) -> Result<ClaimAllResponse, ProviderError> {
        let body = self.state.lock().unwrap().outstanding.clone();
        serde_json::from_value(body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn confirm_claim(&self, confirmation: &ClaimConfirmation) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        if state.reject_acks {
            return Err(ProviderError::Status {
                status: 500,
                message: "database unavailable".to_string(),
            });
        }
        state.acks.push(confirmation.clone());
        Ok(())
    }
}

/// Mint and vault shared by every entitlement in a test.
#[derive(Debug, Clone, Copy)]
pub struct Deployment {
    pub mint: Pubkey,
    pub vault_ata: Pubkey,
}

impl Deployment {
    pub fn new() -> Self {
        Self {
            mint: Pubkey::new_unique(),
            vault_ata: Pubkey::new_unique(),
        }
    }

    pub fn user_ata(&self, wallet: &Pubkey) -> Pubkey {
        get_user_ata_address(wallet, &self.mint)
    }

    pub fn entitlement(&self, claimer: Pubkey, epoch: u64, amount_atomic: u64) -> Entitlement {
        let program_id = xess_claim::ID;
        Entitlement {
            epoch,
            week_key: Some(format!("2026-W{epoch:02}")),
            amount_atomic,
            index: 0,
            proof_hex: vec!["ab".repeat(32), "cd".repeat(32)],
            claimer,
            version: LeafVersion::V1,
            accounts: ClaimAccounts {
                program_id,
                mint: self.mint,
                vault_ata: self.vault_ata,
                config: get_config_address(&program_id),
                vault_authority: get_vault_authority_address(&program_id),
                epoch_root: get_epoch_root_address(&program_id, epoch),
                receipt: get_receipt_address(&program_id, epoch, &claimer),
            },
        }
    }

    pub fn entitlement_v2(&self, claimer: Pubkey, epoch: u64, amount_atomic: u64) -> Entitlement {
        let mut entitlement = self.entitlement(claimer, epoch, amount_atomic);
        entitlement.version = LeafVersion::V2 {
            salt_hex: "5a".repeat(32),
        };
        entitlement.accounts.receipt = get_receipt_v2_address(&xess_claim::ID, epoch, &claimer);
        entitlement
    }

    /// `POST /api/rewards/claim/prepare` body for a claimable epoch.
    pub fn prepare_body(&self, claimer: Pubkey, epoch: u64, amount_atomic: u64) -> Value {
        json!({
            "ok": true,
            "claimable": true,
            "epoch": epoch.to_string(),
            "weekKey": format!("2026-W{epoch:02}"),
            "amountAtomic": amount_atomic.to_string(),
            "index": 0,
            "proof": ["ab".repeat(32)],
            "programId": xess_claim::ID.to_string(),
            "xessMint": self.mint.to_string(),
            "vaultAta": self.vault_ata.to_string(),
            "claimer": claimer.to_string(),
        })
    }

    /// `GET /api/rewards/claim/all` body listing `(epoch, amount)` pairs.
    pub fn claim_all_body(&self, claimer: Pubkey, epochs: &[(u64, u64)]) -> Value {
        let claimable: Vec<Value> = epochs
            .iter()
            .map(|(epoch, amount)| {
                json!({
                    "epoch": epoch.to_string(),
                    "amountAtomic": amount.to_string(),
                    "index": 1,
                    "proof": ["01".repeat(32)],
                })
            })
            .collect();
        json!({
            "ok": true,
            "claimableEpochs": claimable,
            "programId": xess_claim::ID.to_string(),
            "xessMint": self.mint.to_string(),
            "vaultAta": self.vault_ata.to_string(),
            "claimer": claimer.to_string(),
        })
    }
}
