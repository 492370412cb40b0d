use anchor_lang::prelude::*;

use super::user_operation::UserOperation;
use crate::events;
use crate::fhe::{Coprocessor, EncryptedAmount, ExternalEuint64};
use crate::lending::{self, LendingContext};
use crate::settlement::settle;

/// Deposit an encrypted amount into a reserve
pub fn supply_handler(
    ctx: Context<UserOperation>,
    asset: Pubkey,
    amount: ExternalEuint64,
    proof: Vec<u8>,
) -> Result<()> {
    let accounts = ctx.accounts;
    accounts.bind(asset, &ctx.bumps);
    let user = accounts.user.key();

    let mut fhe = Coprocessor::new(crate::ID).with_input_verifier(&accounts.input_verifier);
    let outcome = lending::supply(
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
    emit!(events::Supply {
        user,
        asset,
        timestamp: Clock::get()?.unix_timestamp,
    });

    settle(&accounts.settlement_accounts(), &outcome.settlement)?;

    msg!("Supply: user {} asset {}", user, asset);
    Ok(())
}
