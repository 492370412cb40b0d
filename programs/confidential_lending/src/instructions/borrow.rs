use anchor_lang::prelude::*;

use super::user_operation::UserOperation;
use crate::events;
use crate::fhe::{Coprocessor, EncryptedAmount, ExternalEuint64};
use crate::lending::{self, LendingContext};
use crate::settlement::settle;

/// Borrow an encrypted amount against the designated collateral
pub fn borrow_handler(
    ctx: Context<UserOperation>,
    asset: Pubkey,
    amount: ExternalEuint64,
    proof: Vec<u8>,
) -> Result<()> {
    let accounts = ctx.accounts;
    accounts.bind(asset, &ctx.bumps);
    let user = accounts.user.key();

    let mut fhe = Coprocessor::new(crate::ID).with_input_verifier(&accounts.input_verifier);
    let outcome = lending::borrow(
        &mut LendingContext {
            fhe: &mut fhe,
            protocol: &accounts.pool,
            pool: accounts.pool.key(),
            caller: user,
        },
        &mut accounts.reserve,
        &mut accounts.position,
        &mut accounts.balance,
        &asset,
        EncryptedAmount::new(amount, &proof),
    )?;

    accounts.commit()?;
    emit!(fhe.into_event());
    emit!(events::Borrow {
        user,
        asset,
        timestamp: Clock::get()?.unix_timestamp,
    });

    settle(&accounts.settlement_accounts(), &outcome.settlement)?;

    msg!("Borrow: user {} asset {}", user, asset);
    Ok(())
}
