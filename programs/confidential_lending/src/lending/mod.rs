//! Lending orchestrator
//!
//! Sequences every user operation the same way:
//! 1. global pause and plaintext structural checks (revert)
//! 2. input decoding and encrypted clamping (never reverts on value)
//! 3. plaintext position bookkeeping
//! 4. a settlement intent for the caller to execute after state is committed
//!
//! Nothing here performs I/O; instruction handlers load and store accounts
//! and issue the settlement CPI.

use anchor_lang::prelude::*;

use crate::engine::{self, EngineResult};
use crate::error::LendingError;
use crate::fhe::{EncryptedAmount, Euint64, FheBackend, SafeOps};
use crate::oracle::PriceOracle;
use crate::settlement::{SettlementDirection, SettlementIntent};
use crate::state::{LendingPool, Reserve, UserBalance, UserPosition};

pub mod admin;
pub mod config;
pub mod solvency;
#[cfg(test)]
mod tests;

pub use admin::*;
pub use config::*;
pub use solvency::*;

/// Everything a user operation needs besides the accounts it mutates
pub struct LendingContext<'a, F: FheBackend + ?Sized> {
    pub fhe: &'a mut F,
    pub protocol: &'a LendingPool,
    /// Lending pool PDA, co-owner of every encrypted value
    pub pool: Pubkey,
    /// Authenticated signer the operation acts for
    pub caller: Pubkey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationOutcome {
    /// Caller's updated encrypted balance for the operation's side
    pub balance: Euint64,
    pub settlement: SettlementIntent,
}

impl<F: FheBackend + ?Sized> LendingContext<'_, F> {
    /// Turn an engine result into a settlement the token program may execute
    fn settle(
        &mut self,
        reserve: &Reserve,
        asset: &Pubkey,
        result: EngineResult,
        direction: SettlementDirection,
    ) -> OperationOutcome {
        self.fhe.allow_transient(result.moved, &reserve.token_program);
        OperationOutcome {
            balance: result.balance,
            settlement: SettlementIntent {
                direction,
                user: self.caller,
                asset: *asset,
                amount: result.moved,
            },
        }
    }
}

pub fn supply<F: FheBackend + ?Sized>(
    ctx: &mut LendingContext<F>,
    reserve: &mut Reserve,
    position: &mut UserPosition,
    balance: &mut UserBalance,
    asset: &Pubkey,
    amount: EncryptedAmount,
) -> Result<OperationOutcome> {
    ctx.protocol.require_not_paused()?;

    let result = engine::execute_supply(
        ctx.fhe,
        reserve,
        balance,
        position,
        asset,
        amount,
        &ctx.caller,
        &ctx.pool,
    )?;

    Ok(ctx.settle(reserve, asset, result, SettlementDirection::In))
}

/// Withdraw supplied funds
///
/// When the designated collateral backs outstanding debt, `debt` must
/// describe that debt and the withdrawal passes the solvency gate: it goes
/// through whole or resolves to zero.
#[allow(clippy::too_many_arguments)]
pub fn withdraw<F, O>(
    ctx: &mut LendingContext<F>,
    oracle: &O,
    reserve: &mut Reserve,
    position: &UserPosition,
    balance: &mut UserBalance,
    debt: Option<DebtSnapshot>,
    asset: &Pubkey,
    amount: EncryptedAmount,
) -> Result<OperationOutcome>
where
    F: FheBackend + ?Sized,
    O: PriceOracle + ?Sized,
{
    ctx.protocol.require_not_paused()?;

    let backs_debt = ctx.protocol.designated_collateral() == Some(*asset)
        && position.collateral_enabled
        && position.debt_asset().is_some();

    let requirement = if backs_debt {
        let debt = debt
            .filter(|debt| position.debt_asset() == Some(debt.asset))
            .ok_or_else(|| error!(LendingError::InvalidDebtAccount))?;
        engine::require_listed(reserve, asset)?;
        Some(solvency::requirement(oracle, reserve, &debt)?)
    } else {
        None
    };

    let result = engine::execute_withdraw_guarded(
        ctx.fhe,
        reserve,
        balance,
        asset,
        amount,
        &ctx.caller,
        &ctx.pool,
        |fhe, supplied, capped| match &requirement {
            Some(requirement) => requirement.apply(fhe, supplied, capped),
            None => capped,
        },
    )?;

    Ok(ctx.settle(reserve, asset, result, SettlementDirection::Out))
}

pub fn borrow<F: FheBackend + ?Sized>(
    ctx: &mut LendingContext<F>,
    reserve: &mut Reserve,
    position: &mut UserPosition,
    balance: &mut UserBalance,
    asset: &Pubkey,
    amount: EncryptedAmount,
) -> Result<OperationOutcome> {
    ctx.protocol.require_not_paused()?;
    require!(position.collateral_enabled, LendingError::NoCollateralEnabled);
    if let Some(current) = position.debt_asset() {
        require_keys_eq!(current, *asset, LendingError::MultipleDebtsNotAllowed);
    }

    let result = engine::execute_borrow(
        ctx.fhe,
        reserve,
        balance,
        position,
        asset,
        amount,
        &ctx.caller,
        &ctx.pool,
    )?;
    position.current_debt_asset = *asset;

    Ok(ctx.settle(reserve, asset, result, SettlementDirection::Out))
}

/// Repay debt
///
/// The requested amount is first clamped to the outstanding debt, so the
/// reserve is only credited with what the debt absorbs. `repaying_all`
/// clears the plaintext debt asset whatever the encrypted outcome.
#[allow(clippy::too_many_arguments)]
pub fn repay<F: FheBackend + ?Sized>(
    ctx: &mut LendingContext<F>,
    reserve: &mut Reserve,
    position: &mut UserPosition,
    balance: &mut UserBalance,
    asset: &Pubkey,
    amount: EncryptedAmount,
    repaying_all: bool,
) -> Result<OperationOutcome> {
    ctx.protocol.require_not_paused()?;
    engine::require_listed(reserve, asset)?;
    if let Some(current) = position.debt_asset() {
        require_keys_eq!(current, *asset, LendingError::InvalidDebtRepayment);
    }

    let requested = amount.decode(ctx.fhe, &ctx.caller)?;
    let outstanding = ctx.fhe.or_zero(balance.borrowed);
    let repayable = ctx.fhe.cap(requested, outstanding);

    let result = engine::execute_repay(
        ctx.fhe,
        reserve,
        balance,
        asset,
        repayable,
        &ctx.caller,
        &ctx.pool,
    )?;
    position.touch(ctx.caller);
    if repaying_all {
        position.current_debt_asset = Pubkey::default();
    }

    Ok(ctx.settle(reserve, asset, result, SettlementDirection::In))
}

/// Toggle whether the designated collateral asset backs the user's borrows
pub fn set_user_use_reserve_as_collateral(
    protocol: &LendingPool,
    position: &mut UserPosition,
    user: &Pubkey,
    asset: &Pubkey,
    enabled: bool,
) -> Result<()> {
    protocol.require_not_paused()?;
    require_keys_neq!(*asset, Pubkey::default(), LendingError::ZeroAddress);
    require!(
        protocol.designated_collateral() == Some(*asset),
        LendingError::NotTheDesignatedCollateral
    );
    if !enabled {
        require!(position.debt_asset().is_none(), LendingError::CollateralInUse);
    }

    position.touch(*user);
    position.collateral_enabled = enabled;
    Ok(())
}
