use crate::error::ErrorCode;
use crate::states::{Config, EpochRoot, EpochRootSet, CONFIG_SEED, EPOCH_ROOT_SEED};
use anchor_lang::prelude::*;

/// Accounts for publishing an epoch's merkle root.
///
/// The epoch root PDA is created with `init`, so every epoch can be published
/// exactly once.
#[derive(Accounts)]
#[instruction(epoch: u64)]
pub struct SetEpochRoot<'info> {
    #[account(
        seeds = [CONFIG_SEED.as_bytes()],
        bump,
        constraint = config.admin == admin.key() @ ErrorCode::NotAdmin,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = payer,
        space = EpochRoot::LEN,
        seeds = [EPOCH_ROOT_SEED.as_bytes(), epoch.to_le_bytes().as_ref()],
        bump,
    )]
    pub epoch_root: Account<'info, EpochRoot>,

    pub admin: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn set_epoch_root(ctx: Context<SetEpochRoot>, epoch: u64, root: [u8; 32]) -> Result<()> {
    require!(root != [0u8; 32], ErrorCode::ZeroRoot);

    let epoch_root = &mut ctx.accounts.epoch_root;
    epoch_root.epoch = epoch;
    epoch_root.root = root;
    epoch_root.bump = ctx.bumps.epoch_root;

    emit!(EpochRootSet { epoch, root });
    Ok(())
}
