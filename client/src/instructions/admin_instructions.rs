use anchor_lang::{InstructionData, ToAccountMetas};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program};

use xess_claim::accounts as xess_claim_accounts;
use xess_claim::instruction as xess_claim_instructions;

use super::utils::{get_config_address, get_epoch_root_address, get_vault_authority_address};

pub fn initialize_instr(
    program_id: &Pubkey,
    payer: Pubkey,
    admin: Pubkey,
    xess_mint: Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: xess_claim_accounts::Initialize {
            config: get_config_address(program_id),
            vault_authority: get_vault_authority_address(program_id),
            xess_mint,
            payer,
            system_program: system_program::id(),
        }
        .to_account_metas(None),
        data: xess_claim_instructions::Initialize { admin }.data(),
    }
}

pub fn set_epoch_root_instr(
    program_id: &Pubkey,
    admin: Pubkey,
    payer: Pubkey,
    epoch: u64,
    root: [u8; 32],
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: xess_claim_accounts::SetEpochRoot {
            config: get_config_address(program_id),
            epoch_root: get_epoch_root_address(program_id, epoch),
            admin,
            payer,
            system_program: system_program::id(),
        }
        .to_account_metas(None),
        data: xess_claim_instructions::SetEpochRoot { epoch, root }.data(),
    }
}

pub fn set_admin_instr(program_id: &Pubkey, admin: Pubkey, new_admin: Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: xess_claim_accounts::SetAdmin {
            config: get_config_address(program_id),
            admin,
        }
        .to_account_metas(None),
        data: xess_claim_instructions::SetAdmin { new_admin }.data(),
    }
}

pub fn set_mint_instr(program_id: &Pubkey, admin: Pubkey, new_mint: Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: xess_claim_accounts::SetMint {
            config: get_config_address(program_id),
            admin,
        }
        .to_account_metas(None),
        data: xess_claim_instructions::SetMint { new_mint }.data(),
    }
}
