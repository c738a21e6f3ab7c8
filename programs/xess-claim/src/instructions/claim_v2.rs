use crate::error::ErrorCode;
use crate::merkle::{leaf_hash_v2, verify_proof, MAX_PROOF_LEN};
use crate::states::{
    Config, EpochRoot, ReceiptV2, RewardClaimed, CONFIG_SEED, EPOCH_ROOT_SEED, RECEIPT_V2_SEED,
};
use crate::utils::transfer_from_vault_to_user;
use crate::VAULT_AUTHORITY_SEED;
use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

/// Accounts for claiming with a salted leaf.
///
/// Same layout as [`crate::instructions::Claim`] except the receipt lives
/// under `RECEIPT_V2_SEED`, and both ATAs have their owners pinned.
#[derive(Accounts)]
#[instruction(epoch: u64)]
pub struct ClaimV2<'info> {
    #[account(seeds = [CONFIG_SEED.as_bytes()], bump)]
    pub config: Account<'info, Config>,

    /// CHECK: PDA signer for the vault transfer.
    #[account(
        seeds = [VAULT_AUTHORITY_SEED.as_bytes(), config.key().as_ref()],
        bump = config.vault_authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        seeds = [EPOCH_ROOT_SEED.as_bytes(), epoch.to_le_bytes().as_ref()],
        bump = epoch_root.bump,
    )]
    pub epoch_root: Account<'info, EpochRoot>,

    #[account(
        init,
        payer = claimer,
        space = ReceiptV2::LEN,
        seeds = [RECEIPT_V2_SEED.as_bytes(), epoch.to_le_bytes().as_ref(), claimer.key().as_ref()],
        bump,
    )]
    pub receipt_v2: Account<'info, ReceiptV2>,

    #[account(mut)]
    pub claimer: Signer<'info>,

    #[account(
        mut,
        constraint = vault_ata.mint == config.xess_mint @ ErrorCode::BadMint,
        constraint = vault_ata.owner == vault_authority.key() @ ErrorCode::BadOwner,
    )]
    pub vault_ata: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_ata.mint == config.xess_mint @ ErrorCode::BadMint,
        constraint = user_ata.owner == claimer.key() @ ErrorCode::BadOwner,
    )]
    pub user_ata: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

pub fn claim_v2(
    ctx: Context<ClaimV2>,
    epoch: u64,
    amount: u64,
    index: u32,
    salt: [u8; 32],
    proof: Vec<[u8; 32]>,
) -> Result<()> {
    require_eq!(ctx.accounts.epoch_root.epoch, epoch, ErrorCode::BadEpoch);
    require!(proof.len() <= MAX_PROOF_LEN, ErrorCode::ProofTooLong);

    let claimer = ctx.accounts.claimer.key();
    let leaf = leaf_hash_v2(&claimer, epoch, amount, index, &salt);
    require!(
        verify_proof(leaf, &proof, &ctx.accounts.epoch_root.root, index),
        ErrorCode::BadProof
    );

    let receipt = &mut ctx.accounts.receipt_v2;
    receipt.epoch = epoch;
    receipt.user_key = claimer.to_bytes();
    receipt.claimed_to = claimer;
    receipt.amount = amount;
    receipt.index = index;
    receipt.bump = ctx.bumps.receipt_v2;

    let config_key = ctx.accounts.config.key();
    transfer_from_vault_to_user(
        ctx.accounts.vault_authority.to_account_info(),
        ctx.accounts.vault_ata.to_account_info(),
        ctx.accounts.user_ata.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        &[&[
            VAULT_AUTHORITY_SEED.as_bytes(),
            config_key.as_ref(),
            &[ctx.accounts.config.vault_authority_bump],
        ]],
    )?;

    emit!(RewardClaimed {
        claimer,
        epoch,
        amount,
        index,
        version: 2,
    });
    Ok(())
}
