use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

/// Moves `amount` from a program vault to a user token account, signing as the
/// vault authority PDA.
pub fn transfer_from_vault_to_user<'a>(
    authority: AccountInfo<'a>,
    from_vault: AccountInfo<'a>,
    to: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token::transfer(
        CpiContext::new_with_signer(
            token_program,
            Transfer {
                from: from_vault,
                to,
                authority,
            },
            signer_seeds,
        ),
        amount,
    )
}
