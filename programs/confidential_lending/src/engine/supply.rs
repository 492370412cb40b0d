//! Supply/Withdraw engine

use anchor_lang::prelude::*;

use super::{publish, require_operable, EngineResult};
use crate::fhe::{EncryptedAmount, Euint64, FheBackend, SafeOps};
use crate::state::{Reserve, UserBalance, UserPosition};

/// Credit `amount` to the user's supplied balance, clamped to supply cap headroom
#[allow(clippy::too_many_arguments)]
pub fn execute_supply<F: FheBackend + ?Sized>(
    fhe: &mut F,
    reserve: &mut Reserve,
    balance: &mut UserBalance,
    position: &mut UserPosition,
    asset: &Pubkey,
    amount: EncryptedAmount,
    user: &Pubkey,
    pool: &Pubkey,
) -> Result<EngineResult> {
    require_operable(reserve, asset)?;
    let requested = amount.decode(fhe, user)?;

    let supplied = fhe.or_zero(balance.supplied);
    let total_supplied = fhe.or_zero(reserve.total_supplied);
    let liquidity = fhe.or_zero(reserve.available_liquidity);

    let capped = fhe.cap_to_ceiling(requested, reserve.supply_cap, total_supplied);

    balance.supplied = fhe.safe_add(supplied, capped);
    reserve.total_supplied = fhe.safe_add(total_supplied, capped);
    reserve.available_liquidity = fhe.safe_add(liquidity, capped);
    position.touch(*user);

    let result = EngineResult {
        balance: balance.supplied,
        moved: capped,
    };
    publish(
        fhe,
        user,
        pool,
        &result,
        &[reserve.total_supplied, reserve.available_liquidity],
    );
    Ok(result)
}

/// Debit up to `amount` from the user's supplied balance
pub fn execute_withdraw<F: FheBackend + ?Sized>(
    fhe: &mut F,
    reserve: &mut Reserve,
    balance: &mut UserBalance,
    asset: &Pubkey,
    amount: EncryptedAmount,
    user: &Pubkey,
    pool: &Pubkey,
) -> Result<EngineResult> {
    execute_withdraw_guarded(fhe, reserve, balance, asset, amount, user, pool, |_, _, capped| {
        capped
    })
}

/// Withdraw with an extra encrypted gate on the balance-capped amount
///
/// `gate` receives the current supplied balance and the amount already
/// capped to it, and returns the amount to actually withdraw. It must only
/// shrink the amount (the solvency gate resolves it to zero or leaves it).
#[allow(clippy::too_many_arguments)]
pub fn execute_withdraw_guarded<F, G>(
    fhe: &mut F,
    reserve: &mut Reserve,
    balance: &mut UserBalance,
    asset: &Pubkey,
    amount: EncryptedAmount,
    user: &Pubkey,
    pool: &Pubkey,
    gate: G,
) -> Result<EngineResult>
where
    F: FheBackend + ?Sized,
    G: FnOnce(&mut F, Euint64, Euint64) -> Euint64,
{
    require_operable(reserve, asset)?;
    let requested = amount.decode(fhe, user)?;

    let supplied = fhe.or_zero(balance.supplied);
    let total_supplied = fhe.or_zero(reserve.total_supplied);
    let liquidity = fhe.or_zero(reserve.available_liquidity);

    let capped = fhe.cap(requested, supplied);
    let capped = gate(fhe, supplied, capped);

    balance.supplied = fhe.safe_sub(supplied, capped);
    reserve.total_supplied = fhe.safe_sub(total_supplied, capped);
    reserve.available_liquidity = fhe.safe_sub(liquidity, capped);

    let result = EngineResult {
        balance: balance.supplied,
        moved: capped,
    };
    publish(
        fhe,
        user,
        pool,
        &result,
        &[reserve.total_supplied, reserve.available_liquidity],
    );
    Ok(result)
}
