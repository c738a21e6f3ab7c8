use crate::error::ErrorCode;
use crate::states::{Config, CONFIG_SEED};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct SetMint<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED.as_bytes()],
        bump,
        constraint = config.admin == admin.key() @ ErrorCode::NotAdmin,
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

/// Points claims at a different reward mint. Vault and user ATAs are checked
/// against this mint on every claim.
pub fn set_mint(ctx: Context<SetMint>, new_mint: Pubkey) -> Result<()> {
    ctx.accounts.config.xess_mint = new_mint;
    msg!("reward mint set to {}", new_mint);
    Ok(())
}
