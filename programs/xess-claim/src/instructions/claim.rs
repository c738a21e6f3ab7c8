use crate::error::ErrorCode;
use crate::merkle::{leaf_hash, verify_proof, MAX_PROOF_LEN};
use crate::states::{
    Config, EpochRoot, Receipt, RewardClaimed, CONFIG_SEED, EPOCH_ROOT_SEED, RECEIPT_SEED,
};
use crate::utils::transfer_from_vault_to_user;
use crate::VAULT_AUTHORITY_SEED;
use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

/// Accounts for claiming one epoch's reward with a wallet-keyed leaf.
///
/// The receipt PDA (`RECEIPT_SEED + epoch_le + claimer`) is created with
/// `init`; a second claim for the same pair fails while allocating it.
#[derive(Accounts)]
#[instruction(epoch: u64)]
pub struct Claim<'info> {
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
        space = Receipt::LEN,
        seeds = [RECEIPT_SEED.as_bytes(), epoch.to_le_bytes().as_ref(), claimer.key().as_ref()],
        bump,
    )]
    pub receipt: Account<'info, Receipt>,

    #[account(mut)]
    pub claimer: Signer<'info>,

    #[account(
        mut,
        constraint = vault_ata.mint == config.xess_mint @ ErrorCode::BadMint,
    )]
    pub vault_ata: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_ata.mint == config.xess_mint @ ErrorCode::BadMint,
    )]
    pub user_ata: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

/// Verifies the claimer's leaf against the epoch root, writes the receipt
/// and pays `amount` from the vault.
pub fn claim(
    ctx: Context<Claim>,
    epoch: u64,
    amount: u64,
    index: u32,
    proof: Vec<[u8; 32]>,
) -> Result<()> {
    require_eq!(ctx.accounts.epoch_root.epoch, epoch, ErrorCode::BadEpoch);
    require!(proof.len() <= MAX_PROOF_LEN, ErrorCode::ProofTooLong);

    let claimer = ctx.accounts.claimer.key();
    let leaf = leaf_hash(&claimer, epoch, amount, index);
    require!(
        verify_proof(leaf, &proof, &ctx.accounts.epoch_root.root, index),
        ErrorCode::BadProof
    );

    let receipt = &mut ctx.accounts.receipt;
    receipt.epoch = epoch;
    receipt.claimer = claimer;
    receipt.amount = amount;
    receipt.index = index;
    receipt.bump = ctx.bumps.receipt;

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
        version: 1,
    });
    Ok(())
}
