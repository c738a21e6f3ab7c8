use anchor_lang::{InstructionData, ToAccountMetas};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program};
use spl_associated_token_account::instruction::create_associated_token_account;

use xess_claim::accounts as xess_claim_accounts;
use xess_claim::instruction as xess_claim_instructions;

use crate::entitlement::ClaimAccounts;

/// Creates the claimer's reward ATA, paid for by the claimer.
pub fn create_user_ata_instr(wallet: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account(wallet, wallet, mint, &spl_token::id())
}

pub fn claim_instr(
    accounts: &ClaimAccounts,
    claimer: Pubkey,
    user_ata: Pubkey,
    epoch: u64,
    amount: u64,
    index: u32,
    proof: Vec<[u8; 32]>,
) -> Instruction {
    Instruction {
        program_id: accounts.program_id,
        accounts: xess_claim_accounts::Claim {
            config: accounts.config,
            vault_authority: accounts.vault_authority,
            epoch_root: accounts.epoch_root,
            receipt: accounts.receipt,
            claimer,
            vault_ata: accounts.vault_ata,
            user_ata,
            token_program: spl_token::id(),
            system_program: system_program::id(),
        }
        .to_account_metas(None),
        data: xess_claim_instructions::Claim {
            epoch,
            amount,
            index,
            proof,
        }
        .data(),
    }
}

pub fn claim_v2_instr(
    accounts: &ClaimAccounts,
    claimer: Pubkey,
    user_ata: Pubkey,
    epoch: u64,
    amount: u64,
    index: u32,
    salt: [u8; 32],
    proof: Vec<[u8; 32]>,
) -> Instruction {
    Instruction {
        program_id: accounts.program_id,
        accounts: xess_claim_accounts::ClaimV2 {
            config: accounts.config,
            vault_authority: accounts.vault_authority,
            epoch_root: accounts.epoch_root,
            receipt_v2: accounts.receipt,
            claimer,
            vault_ata: accounts.vault_ata,
            user_ata,
            token_program: spl_token::id(),
            system_program: system_program::id(),
        }
        .to_account_metas(None),
        data: xess_claim_instructions::ClaimV2 {
            epoch,
            amount,
            index,
            salt,
            proof,
        }
        .data(),
    }
}
