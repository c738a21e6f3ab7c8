use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Claim Configuration Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the claim configuration account.
pub const CONFIG_SEED: &str = "config";

/// Program-wide settings for the reward distributor.
///
/// Created once by `initialize`. The vault authority PDA
/// (`VAULT_AUTHORITY_SEED + config`) owns the vault ATA that pays out claims.
#[account]
#[derive(Default, Debug)]
pub struct Config {
    /// Signer allowed to publish epoch roots and rotate admin/mint.
    pub admin: Pubkey,

    /// Mint of the reward token paid out by `claim`.
    pub xess_mint: Pubkey,

    /// Bump of the vault authority PDA, reused for CPI signing.
    pub vault_authority_bump: u8,
}

impl Config {
    /// Serialized size including the 8-byte discriminator.
    pub const LEN: usize = 8 + 32 + 32 + 1;
}
