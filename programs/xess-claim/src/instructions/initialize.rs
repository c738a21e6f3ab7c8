use crate::states::{Config, CONFIG_SEED};
use crate::VAULT_AUTHORITY_SEED;
use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

/// Accounts for the one-time `initialize` instruction.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Claim configuration PDA, created here.
    #[account(
        init,
        payer = payer,
        space = Config::LEN,
        seeds = [CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Vault authority PDA; owns the vault ATA that pays claims.
    ///
    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [VAULT_AUTHORITY_SEED.as_bytes(), config.key().as_ref()],
        bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Reward mint paid out by claims.
    pub xess_mint: Account<'info, Mint>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Records the admin, the reward mint and the vault authority bump.
pub fn initialize(ctx: Context<Initialize>, admin: Pubkey) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.admin = admin;
    config.xess_mint = ctx.accounts.xess_mint.key();
    config.vault_authority_bump = ctx.bumps.vault_authority;

    msg!(
        "xess-claim initialized: admin={} mint={}",
        config.admin,
        config.xess_mint
    );
    Ok(())
}
