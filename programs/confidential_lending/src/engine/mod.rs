//! Encrypted accounting engines
//!
//! The engines own every mutation of encrypted balances and reserve totals.
//! Plaintext preconditions revert before anything is touched; value limits
//! (caps, liquidity, balance) are applied by clamping and never revert.

use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::fhe::{Euint64, FheBackend};
use crate::state::Reserve;

pub mod borrow;
pub mod supply;

pub use borrow::*;
pub use supply::*;

/// Outcome of an engine call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineResult {
    /// The user's updated encrypted balance (supplied or borrowed)
    pub balance: Euint64,
    /// The encrypted amount actually moved, after clamping
    pub moved: Euint64,
}

/// Reserve checks shared by every engine entry point
pub(crate) fn require_listed(reserve: &Reserve, asset: &Pubkey) -> Result<()> {
    require_keys_neq!(*asset, Pubkey::default(), LendingError::ZeroAddress);
    require!(
        reserve.is_initialized() && reserve.asset == *asset,
        LendingError::ReserveNotInitialized
    );
    require!(reserve.active, LendingError::ReserveNotActive);
    Ok(())
}

fn require_operable(reserve: &Reserve, asset: &Pubkey) -> Result<()> {
    require_listed(reserve, asset)?;
    require!(!reserve.paused, LendingError::ReservePaused);
    Ok(())
}

/// Grant read access on the updated values and publish the reserve totals
///
/// The user and the pool can both decrypt the user's balance and the moved
/// amount. Reserve totals are aggregates and are made publicly decryptable.
fn publish<F: FheBackend + ?Sized>(
    fhe: &mut F,
    user: &Pubkey,
    pool: &Pubkey,
    result: &EngineResult,
    totals: &[Euint64],
) {
    for handle in [result.balance, result.moved] {
        fhe.allow(handle, user);
        fhe.allow(handle, pool);
    }
    for &total in totals {
        fhe.allow(total, user);
        fhe.allow(total, pool);
        fhe.make_publicly_decryptable(total);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::fhe::mock::MockFhe;
    use crate::state::{ReserveConfig, UserBalance};

    pub fn reserve(fhe: &mut MockFhe, asset: Pubkey, config: ReserveConfig) -> Reserve {
        let mut reserve = Reserve {
            asset,
            decimals: 6,
            ..Default::default()
        };
        reserve.apply_config(&config);
        reserve.total_supplied = fhe.trivial_encrypt(0);
        reserve.total_borrowed = fhe.trivial_encrypt(0);
        reserve.available_liquidity = fhe.trivial_encrypt(0);
        reserve
    }

    pub fn open_config() -> ReserveConfig {
        ReserveConfig {
            active: true,
            borrowing_enabled: true,
            is_collateral: true,
            paused: false,
            collateral_factor_bps: 7_500,
            supply_cap: 0,
            borrow_cap: 0,
        }
    }

    pub fn balance(owner: Pubkey, asset: Pubkey) -> UserBalance {
        let mut balance = UserBalance::default();
        balance.bind(owner, asset, 255);
        balance
    }
}
