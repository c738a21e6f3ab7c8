use anchor_lang::prelude::*;

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

declare_id!("AKRLZssgxwQwC2gGgUtYtcU7JrhDyEfk1FHqQkZnFUax");

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name: "xess-claim",
    project_url: "https://xessex.me",
    contacts: "email:security@xessex.me",
    policy: "https://xessex.me/security"
}

pub const VAULT_AUTHORITY_SEED: &str = "vault_authority";
/// Number of decimals of the XESS mint; one display unit is `10^9` atomic units.
pub const XESS_DECIMALS: u8 = 9;

pub mod error;
pub mod instructions;
pub mod merkle;
pub mod states;
pub mod utils;

use instructions::*;

#[program]
pub mod xess_claim {

    use super::*;

    pub fn initialize(ctx: Context<Initialize>, admin: Pubkey) -> Result<()> {
        instructions::initialize(ctx, admin)
    }

    pub fn set_epoch_root(ctx: Context<SetEpochRoot>, epoch: u64, root: [u8; 32]) -> Result<()> {
        instructions::set_epoch_root(ctx, epoch, root)
    }

    pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
        instructions::set_admin(ctx, new_admin)
    }

    pub fn set_mint(ctx: Context<SetMint>, new_mint: Pubkey) -> Result<()> {
        instructions::set_mint(ctx, new_mint)
    }

    pub fn claim(
        ctx: Context<Claim>,
        epoch: u64,
        amount: u64,
        index: u32,
        proof: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::claim(ctx, epoch, amount, index, proof)
    }

    pub fn claim_v2(
        ctx: Context<ClaimV2>,
        epoch: u64,
        amount: u64,
        index: u32,
        salt: [u8; 32],
        proof: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::claim_v2(ctx, epoch, amount, index, salt, proof)
    }
}
