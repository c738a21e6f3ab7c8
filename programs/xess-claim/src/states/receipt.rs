use anchor_lang::prelude::*;

/// PDA seed for wallet-keyed receipts: `seed + epoch_le + claimer`.
pub const RECEIPT_SEED: &str = "receipt";
/// PDA seed for salted (version 2) receipts: `seed + epoch_le + claimer`.
pub const RECEIPT_V2_SEED: &str = "receipt_v2";

//
// ──────────────────────────────────────────────────────────────────────────────
// Claim receipts
// ──────────────────────────────────────────────────────────────────────────────
//

/// Proof that `claimer` was paid for `epoch`.
///
/// The account is created with `init` inside `claim`, so its existence alone
/// blocks a second claim of the same `(epoch, claimer)` pair.
#[account]
#[derive(Default, Debug)]
pub struct Receipt {
    pub epoch: u64,
    pub claimer: Pubkey,
    pub amount: u64,
    pub index: u32,
    pub bump: u8,
}

impl Receipt {
    pub const LEN: usize = 8 + 8 + 32 + 8 + 4 + 1;
}

/// Receipt written by `claim_v2`, whose leaves carry a per-epoch salt.
#[account]
#[derive(Default, Debug)]
pub struct ReceiptV2 {
    pub epoch: u64,
    /// Identity the leaf was issued to (the claimer's pubkey bytes).
    pub user_key: [u8; 32],
    /// Wallet that received the tokens.
    pub claimed_to: Pubkey,
    pub amount: u64,
    pub index: u32,
    pub bump: u8,
}

impl ReceiptV2 {
    pub const LEN: usize = 8 + 8 + 32 + 32 + 8 + 4 + 1;
}
