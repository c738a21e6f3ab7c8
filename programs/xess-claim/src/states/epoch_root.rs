use anchor_lang::prelude::*;

/// PDA seed string used to derive an epoch root account (`seed + epoch_le`).
pub const EPOCH_ROOT_SEED: &str = "epoch_root";

/// Merkle root published for one weekly reward epoch.
///
/// Immutable once created: `set_epoch_root` uses `init`, so a second publish
/// for the same epoch fails.
#[account]
#[derive(Default, Debug)]
pub struct EpochRoot {
    pub epoch: u64,
    pub root: [u8; 32],
    pub bump: u8,
}

impl EpochRoot {
    pub const LEN: usize = 8 + 8 + 32 + 1;
}
