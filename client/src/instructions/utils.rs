use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use xess_claim::{
    states::{CONFIG_SEED, EPOCH_ROOT_SEED, RECEIPT_SEED, RECEIPT_V2_SEED},
    VAULT_AUTHORITY_SEED,
};

pub fn get_config_address(program_id: &Pubkey) -> Pubkey {
    let (config, _bump) = Pubkey::find_program_address(&[CONFIG_SEED.as_bytes()], program_id);
    config
}

pub fn get_vault_authority_address(program_id: &Pubkey) -> Pubkey {
    let config = get_config_address(program_id);
    let (vault_authority, _bump) = Pubkey::find_program_address(
        &[VAULT_AUTHORITY_SEED.as_bytes(), config.as_ref()],
        program_id,
    );
    vault_authority
}

pub fn get_epoch_root_address(program_id: &Pubkey, epoch: u64) -> Pubkey {
    let (epoch_root, _bump) = Pubkey::find_program_address(
        &[EPOCH_ROOT_SEED.as_bytes(), &epoch.to_le_bytes()],
        program_id,
    );
    epoch_root
}

pub fn get_receipt_address(program_id: &Pubkey, epoch: u64, claimer: &Pubkey) -> Pubkey {
    let (receipt, _bump) = Pubkey::find_program_address(
        &[RECEIPT_SEED.as_bytes(), &epoch.to_le_bytes(), claimer.as_ref()],
        program_id,
    );
    receipt
}

pub fn get_receipt_v2_address(program_id: &Pubkey, epoch: u64, claimer: &Pubkey) -> Pubkey {
    let (receipt, _bump) = Pubkey::find_program_address(
        &[RECEIPT_V2_SEED.as_bytes(), &epoch.to_le_bytes(), claimer.as_ref()],
        program_id,
    );
    receipt
}

pub fn get_user_ata_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, mint)
}
