use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track claim activity
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted when the admin publishes the merkle root of a reward epoch.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EpochRootSet {
    pub epoch: u64,
    pub root: [u8; 32],
}

/// Emitted after a successful claim transfer.
///
/// `version` is 1 for wallet-keyed leaves and 2 for salted leaves.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardClaimed {
    pub claimer: Pubkey,
    pub epoch: u64,
    /// XESS paid out (atomic units).
    pub amount: u64,
    pub index: u32,
    pub version: u8,
}
