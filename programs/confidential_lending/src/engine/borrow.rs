//! Borrow/Repay engine

use anchor_lang::prelude::*;

use super::{publish, require_listed, require_operable, EngineResult};
use crate::error::LendingError;
use crate::fhe::{EncryptedAmount, Euint64, FheBackend, SafeOps};
use crate::state::{Reserve, UserBalance, UserPosition};

/// Add up to `amount` to the borrower's debt
///
/// Liquidity is applied before the borrow cap: it is the physical ceiling,
/// the cap is a policy ceiling on top of it.
#[allow(clippy::too_many_arguments)]
pub fn execute_borrow<F: FheBackend + ?Sized>(
    fhe: &mut F,
    reserve: &mut Reserve,
    balance: &mut UserBalance,
    position: &mut UserPosition,
    asset: &Pubkey,
    amount: EncryptedAmount,
    borrower: &Pubkey,
    pool: &Pubkey,
) -> Result<EngineResult> {
    require_listed(reserve, asset)?;
    require!(reserve.borrowing_enabled, LendingError::BorrowingNotEnabled);
    require_operable(reserve, asset)?;
    let requested = amount.decode(fhe, borrower)?;

    let borrowed = fhe.or_zero(balance.borrowed);
    let total_borrowed = fhe.or_zero(reserve.total_borrowed);
    let liquidity = fhe.or_zero(reserve.available_liquidity);

    let within_liquidity = fhe.cap(requested, liquidity);
    let capped = fhe.cap_to_ceiling(within_liquidity, reserve.borrow_cap, total_borrowed);

    balance.borrowed = fhe.safe_add(borrowed, capped);
    reserve.total_borrowed = fhe.safe_add(total_borrowed, capped);
    reserve.available_liquidity = fhe.safe_sub(liquidity, capped);
    position.touch(*borrower);

    let result = EngineResult {
        balance: balance.borrowed,
        moved: capped,
    };
    publish(
        fhe,
        borrower,
        pool,
        &result,
        &[reserve.total_borrowed, reserve.available_liquidity],
    );
    Ok(result)
}

/// Subtract `amount` from the payer's debt, flooring at zero
///
/// Only checks that the reserve is listed and active; borrowing and pause
/// flags never block repayment here. Any pre-capping of `amount` is the
/// caller's job: liquidity is credited with `amount` as given.
pub fn execute_repay<F: FheBackend + ?Sized>(
    fhe: &mut F,
    reserve: &mut Reserve,
    balance: &mut UserBalance,
    asset: &Pubkey,
    amount: Euint64,
    payer: &Pubkey,
    pool: &Pubkey,
) -> Result<EngineResult> {
    require_listed(reserve, asset)?;

    let borrowed = fhe.or_zero(balance.borrowed);
    let total_borrowed = fhe.or_zero(reserve.total_borrowed);
    let liquidity = fhe.or_zero(reserve.available_liquidity);

    balance.borrowed = fhe.safe_sub(borrowed, amount);
    reserve.total_borrowed = fhe.safe_sub(total_borrowed, amount);
    reserve.available_liquidity = fhe.safe_add(liquidity, amount);

    let result = EngineResult {
        balance: balance.borrowed,
        moved: amount,
    };
    publish(
        fhe,
        payer,
        pool,
        &result,
        &[reserve.total_borrowed, reserve.available_liquidity],
    );
    Ok(result)
}
