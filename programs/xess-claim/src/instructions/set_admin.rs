use crate::error::ErrorCode;
use crate::states::{Config, CONFIG_SEED};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct SetAdmin<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED.as_bytes()],
        bump,
        constraint = config.admin == admin.key() @ ErrorCode::NotAdmin,
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

/// Hands admin rights to `new_admin`. The default pubkey is rejected since
/// nobody could sign for it afterwards.
pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
    require_keys_neq!(new_admin, Pubkey::default());
    ctx.accounts.config.admin = new_admin;
    msg!("admin set to {}", new_admin);
    Ok(())
}
