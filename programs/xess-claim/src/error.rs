use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Signer is not the configured admin")]
    NotAdmin,

    #[msg("Epoch argument does not match the epoch root account")]
    BadEpoch,

    #[msg("Merkle proof does not resolve to the epoch root")]
    BadProof,

    #[msg("Token account mint is not the configured XESS mint")]
    BadMint,

    #[msg("Token account owner is not the expected authority")]
    BadOwner,

    #[msg("Refusing to publish an all-zero merkle root")]
    ZeroRoot,

    #[msg("Merkle proof is deeper than any supported tree")]
    ProofTooLong,
}
