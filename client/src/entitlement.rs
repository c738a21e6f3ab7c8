//! Claim payloads exchanged with the rewards API.
//!
//! `Wire*` types mirror the JSON the server sends (camelCase, amounts as
//! decimal strings). They are validated into [`Entitlement`] before the
//! reconciler touches them: pubkeys parsed, amounts parsed as integers, the
//! receipt PDA re-derived and compared. Proof elements stay hex until claim
//! time so a bad element fails that one claim and nothing else.

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::str::FromStr;

use crate::error::ClaimError;
use crate::instructions::utils::{
    get_config_address, get_epoch_root_address, get_receipt_address, get_receipt_v2_address,
    get_vault_authority_address,
};

/// Integer fields arrive as JSON numbers or as decimal strings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum WireU64 {
    Number(u64),
    Text(String),
}

impl WireU64 {
    fn parse(&self, field: &str) -> Result<u64, ClaimError> {
        match self {
            WireU64::Number(n) => Ok(*n),
            WireU64::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|e| ClaimError::InvalidPayload(format!("{field} {s:?}: {e}"))),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WirePdas {
    pub config: Option<String>,
    pub vault_authority: Option<String>,
    pub epoch_root: Option<String>,
    pub receipt: Option<String>,
    pub receipt_v2: Option<String>,
}

/// One epoch inside `GET /api/rewards/claim/all`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireEntitlement {
    pub epoch: WireU64,
    #[serde(default)]
    pub week_key: Option<String>,
    pub amount_atomic: WireU64,
    pub index: u32,
    #[serde(default)]
    pub proof: Vec<String>,
    #[serde(default)]
    pub pdas: WirePdas,
    #[serde(default)]
    pub version: Option<u8>,
    #[serde(default)]
    pub claim_salt_hex: Option<String>,
    #[serde(default)]
    pub claimer: Option<String>,
}

/// Body of `POST /api/rewards/claim/prepare` (latest epoch only).
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrepareClaimResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub claimable: bool,
    pub reason: Option<String>,
    pub error: Option<String>,
    pub epoch: Option<WireU64>,
    pub week_key: Option<String>,
    pub amount_atomic: Option<WireU64>,
    pub index: Option<u32>,
    #[serde(default)]
    pub proof: Vec<String>,
    #[serde(default)]
    pub pdas: WirePdas,
    pub version: Option<u8>,
    pub claim_salt_hex: Option<String>,
    pub program_id: Option<String>,
    pub xess_mint: Option<String>,
    pub vault_ata: Option<String>,
    pub claimer: Option<String>,
}

/// Body of `GET /api/rewards/claim/all`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAllResponse {
    #[serde(default)]
    pub ok: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub claimable_epochs: Vec<WireEntitlement>,
    pub total_claimable_atomic: Option<String>,
    pub program_id: Option<String>,
    pub xess_mint: Option<String>,
    pub vault_ata: Option<String>,
    pub claimer: Option<String>,
}

/// Body of `POST /api/rewards/claim/confirm`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimConfirmation {
    pub signature: String,
    pub epoch: String,
    pub version: u8,
    pub claimer: String,
}

impl ClaimConfirmation {
    pub fn new(entitlement: &Entitlement, signature: &Signature) -> Self {
        Self {
            signature: signature.to_string(),
            epoch: entitlement.epoch.to_string(),
            version: entitlement.version.number(),
            claimer: entitlement.claimer.to_string(),
        }
    }
}

/// Which leaf layout (and receipt PDA) an entitlement uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafVersion {
    /// `claim`: leaf binds claimer, epoch, amount, index.
    V1,
    /// `claim_v2`: leaf also binds a per-epoch secret salt (hex).
    V2 { salt_hex: String },
}

impl LeafVersion {
    pub fn number(&self) -> u8 {
        match self {
            LeafVersion::V1 => 1,
            LeafVersion::V2 { .. } => 2,
        }
    }
}

/// Accounts the claim instruction is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAccounts {
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub vault_ata: Pubkey,
    pub config: Pubkey,
    pub vault_authority: Pubkey,
    pub epoch_root: Pubkey,
    pub receipt: Pubkey,
}

/// A validated right to claim `amount_atomic` for `epoch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    pub epoch: u64,
    pub week_key: Option<String>,
    pub amount_atomic: u64,
    pub index: u32,
    /// Sibling hashes, hex encoded; decoded with [`decode_proof`] at claim time.
    pub proof_hex: Vec<String>,
    pub claimer: Pubkey,
    pub version: LeafVersion,
    pub accounts: ClaimAccounts,
}

impl Entitlement {
    pub fn label(&self) -> String {
        match &self.week_key {
            Some(week) => format!("epoch {} ({})", self.epoch, week),
            None => format!("epoch {}", self.epoch),
        }
    }
}

/// Program/mint/vault triple shared by every entitlement of one response.
#[derive(Debug, Clone, Copy)]
struct Deployment {
    program_id: Pubkey,
    mint: Pubkey,
    vault_ata: Pubkey,
}

impl Deployment {
    fn parse(
        program_id: Option<&str>,
        mint: Option<&str>,
        vault_ata: Option<&str>,
    ) -> Result<Self, ClaimError> {
        Ok(Self {
            program_id: parse_pubkey("programId", program_id)?,
            mint: parse_pubkey("xessMint", mint)?,
            vault_ata: parse_pubkey("vaultAta", vault_ata)?,
        })
    }
}

fn parse_pubkey(field: &str, value: Option<&str>) -> Result<Pubkey, ClaimError> {
    let value = value.ok_or_else(|| ClaimError::InvalidPayload(format!("missing {field}")))?;
    Pubkey::from_str(value.trim())
        .map_err(|e| ClaimError::InvalidPayload(format!("{field} {value:?}: {e}")))
}

fn parse_or_derive(
    field: &str,
    value: Option<&str>,
    derive: impl FnOnce() -> Pubkey,
) -> Result<Pubkey, ClaimError> {
    match value {
        Some(_) => parse_pubkey(field, value),
        None => Ok(derive()),
    }
}

impl WireEntitlement {
    fn validate(
        self,
        deployment: &Deployment,
        default_claimer: Option<&str>,
    ) -> Result<Entitlement, ClaimError> {
        let epoch = self.epoch.parse("epoch")?;
        let amount_atomic = self.amount_atomic.parse("amountAtomic")?;
        let claimer = parse_pubkey("claimer", self.claimer.as_deref().or(default_claimer))?;

        let version = match self.version.unwrap_or(1) {
            1 => LeafVersion::V1,
            2 => LeafVersion::V2 {
                salt_hex: self.claim_salt_hex.ok_or_else(|| {
                    ClaimError::InvalidPayload(format!("epoch {epoch}: version 2 without claimSaltHex"))
                })?,
            },
            other => {
                return Err(ClaimError::InvalidPayload(format!(
                    "epoch {epoch}: unsupported claim version {other}"
                )))
            }
        };

        let program_id = deployment.program_id;
        let (expected_receipt, served_receipt) = match version {
            LeafVersion::V1 => (
                get_receipt_address(&program_id, epoch, &claimer),
                self.pdas.receipt.as_deref(),
            ),
            LeafVersion::V2 { .. } => (
                get_receipt_v2_address(&program_id, epoch, &claimer),
                self.pdas.receipt_v2.as_deref(),
            ),
        };
        let receipt = parse_or_derive("pdas.receipt", served_receipt, || expected_receipt)?;
        if receipt != expected_receipt {
            return Err(ClaimError::InvalidPayload(format!(
                "epoch {epoch}: receipt {receipt} is not the PDA of claimer {claimer}"
            )));
        }

        let accounts = ClaimAccounts {
            program_id,
            mint: deployment.mint,
            vault_ata: deployment.vault_ata,
            config: parse_or_derive("pdas.config", self.pdas.config.as_deref(), || {
                get_config_address(&program_id)
            })?,
            vault_authority: parse_or_derive(
                "pdas.vaultAuthority",
                self.pdas.vault_authority.as_deref(),
                || get_vault_authority_address(&program_id),
            )?,
            epoch_root: parse_or_derive("pdas.epochRoot", self.pdas.epoch_root.as_deref(), || {
                get_epoch_root_address(&program_id, epoch)
            })?,
            receipt,
        };

        Ok(Entitlement {
            epoch,
            week_key: self.week_key,
            amount_atomic,
            index: self.index,
            proof_hex: self.proof,
            claimer,
            version,
            accounts,
        })
    }
}

impl PrepareClaimResponse {
    /// Validates the single-epoch payload.
    ///
    /// `already_claimed` maps to [`ClaimError::AlreadyClaimed`]; any other
    /// non-claimable reason (`no_epoch`, `no_allocation`, ...) to
    /// [`ClaimError::NotClaimable`].
    pub fn into_entitlement(self) -> Result<Entitlement, ClaimError> {
        if !self.ok {
            return Err(ClaimError::Provider(
                self.error.unwrap_or_else(|| "prepare claim failed".to_string()),
            ));
        }
        if !self.claimable {
            let reason = self.reason.unwrap_or_else(|| "not_claimable".to_string());
            return match reason.as_str() {
                "already_claimed" => Err(ClaimError::AlreadyClaimed {
                    epoch: self
                        .epoch
                        .and_then(|e| e.parse("epoch").ok())
                        .unwrap_or_default(),
                }),
                _ => Err(ClaimError::NotClaimable { reason }),
            };
        }

        let deployment = Deployment::parse(
            self.program_id.as_deref(),
            self.xess_mint.as_deref(),
            self.vault_ata.as_deref(),
        )?;
        let wire = WireEntitlement {
            epoch: self
                .epoch
                .ok_or_else(|| ClaimError::InvalidPayload("missing epoch".to_string()))?,
            week_key: self.week_key,
            amount_atomic: self
                .amount_atomic
                .ok_or_else(|| ClaimError::InvalidPayload("missing amountAtomic".to_string()))?,
            index: self
                .index
                .ok_or_else(|| ClaimError::InvalidPayload("missing index".to_string()))?,
            proof: self.proof,
            pdas: self.pdas,
            version: self.version,
            claim_salt_hex: self.claim_salt_hex,
            claimer: None,
        };
        wire.validate(&deployment, self.claimer.as_deref())
    }
}

/// A listed epoch that failed validation. It is reported as a failed
/// attempt of its batch; the other epochs are still claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntitlement {
    /// `None` when the epoch field itself is unreadable.
    pub epoch: Option<u64>,
    pub week_key: Option<String>,
    pub error: ClaimError,
}

pub type ListedEntitlement = Result<Entitlement, RejectedEntitlement>;

impl ClaimAllResponse {
    /// Validates each outstanding epoch on its own, keeping the server's
    /// order. Only response-level problems (`ok: false`, unreadable
    /// program/mint/vault) fail the whole listing.
    pub fn into_entitlements(self) -> Result<Vec<ListedEntitlement>, ClaimError> {
        if !self.ok {
            return Err(ClaimError::Provider(
                self.error.unwrap_or_else(|| "listing claimable epochs failed".to_string()),
            ));
        }
        if self.claimable_epochs.is_empty() {
            return Ok(Vec::new());
        }
        let deployment = Deployment::parse(
            self.program_id.as_deref(),
            self.xess_mint.as_deref(),
            self.vault_ata.as_deref(),
        )?;
        let claimer = self.claimer.as_deref();
        Ok(self
            .claimable_epochs
            .into_iter()
            .map(|wire| {
                let epoch = wire.epoch.parse("epoch").ok();
                let week_key = wire.week_key.clone();
                wire.validate(&deployment, claimer)
                    .map_err(|error| RejectedEntitlement {
                        epoch,
                        week_key,
                        error,
                    })
            })
            .collect())
    }
}

/// Decodes one 32-byte hex value; `0x` prefix and surrounding whitespace are
/// tolerated, any other length is not.
pub fn decode_hex32(raw: &str) -> Result<[u8; 32], String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if digits.len() != 64 {
        return Err(format!("expected 64 hex chars, got {}", digits.len()));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(digits, &mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

pub fn decode_proof(proof_hex: &[String]) -> Result<Vec<[u8; 32]>, ClaimError> {
    proof_hex
        .iter()
        .enumerate()
        .map(|(position, raw)| {
            decode_hex32(raw).map_err(|reason| ClaimError::MalformedProof { position, reason })
        })
        .collect()
}
