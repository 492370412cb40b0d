//! Withdrawal solvency gate
//!
//! A withdrawal of the designated collateral is allowed iff, after it,
//!
//! ```text
//! debt * price_d * 10_000 * 10^dec_c <= remaining * price_c * cf_bps * 10^dec_d
//! ```
//!
//! Both sides of the inequality are one encrypted quantity times a plaintext
//! scalar. The scalars are built in u128, reduced by their gcd and scaled
//! into 64 bits, rounding the debt side up and the collateral side down.

use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::fhe::{Euint64, FheBackend, SafeOps};
use crate::oracle::PriceOracle;
use crate::state::{Reserve, BPS_DENOMINATOR};

/// The debt side of a position, read from the debt asset's reserve and balance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebtSnapshot {
    pub asset: Pubkey,
    pub borrowed: Euint64,
    pub decimals: u8,
}

/// Plaintext-prepared bound, applied to encrypted values by [`Self::apply`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolvencyRequirement {
    pub debt_borrowed: Euint64,
    pub collateral_scalar: u64,
    pub debt_scalar: u64,
}

/// Prepare the gate; fails before any encrypted work if a price is missing
pub fn requirement<O: PriceOracle + ?Sized>(
    oracle: &O,
    collateral: &Reserve,
    debt: &DebtSnapshot,
) -> Result<SolvencyRequirement> {
    let collateral_price = oracle.price(&collateral.asset);
    let debt_price = oracle.price(&debt.asset);
    require!(
        collateral_price > 0 && debt_price > 0,
        LendingError::OraclePriceZero
    );

    let (collateral_scalar, debt_scalar) = value_scalars(
        collateral_price,
        collateral.collateral_factor_bps,
        collateral.decimals,
        debt_price,
        debt.decimals,
    );

    Ok(SolvencyRequirement {
        debt_borrowed: debt.borrowed,
        collateral_scalar,
        debt_scalar,
    })
}

/// Scalars `(k_c, k_d)` such that solvency is `debt * k_d <= remaining * k_c`
pub fn value_scalars(
    collateral_price: u64,
    collateral_factor_bps: u16,
    collateral_decimals: u8,
    debt_price: u64,
    debt_decimals: u8,
) -> (u64, u64) {
    let mut collateral_side = collateral_price as u128 * collateral_factor_bps as u128;
    let mut debt_side = debt_price as u128 * BPS_DENOMINATOR as u128;

    // Only the decimal difference matters
    if collateral_decimals > debt_decimals {
        debt_side = debt_side.saturating_mul(pow10(collateral_decimals - debt_decimals));
    } else {
        collateral_side =
            collateral_side.saturating_mul(pow10(debt_decimals - collateral_decimals));
    }

    let divisor = gcd(collateral_side, debt_side).max(1);
    collateral_side /= divisor;
    debt_side /= divisor;

    let widest = collateral_side.max(debt_side);
    let mut shift = (128 - widest.leading_zeros()).saturating_sub(64);
    // Rounding up can carry the debt side to exactly 2^64
    if shift > 0 && shift_right_ceil(debt_side, shift) > u64::MAX as u128 {
        shift += 1;
    }
    if shift > 0 {
        collateral_side >>= shift;
        debt_side = shift_right_ceil(debt_side, shift);
    }

    (
        u64::try_from(collateral_side).unwrap_or(u64::MAX),
        u64::try_from(debt_side).unwrap_or(u64::MAX),
    )
}

impl SolvencyRequirement {
    /// Resolve the withdrawal to `capped` if the position stays solvent, else zero
    pub fn apply<F: FheBackend + ?Sized>(
        &self,
        fhe: &mut F,
        supplied: Euint64,
        capped: Euint64,
    ) -> Euint64 {
        let remaining = fhe.safe_sub(supplied, capped);
        let borrowed = fhe.or_zero(self.debt_borrowed);

        let (collateral_value, _) =
            fhe.saturating_mul_scalar(remaining, self.collateral_scalar);
        let (debt_value, debt_overflow) =
            fhe.saturating_mul_scalar(borrowed, self.debt_scalar);

        // A saturated debt value is out of range and counts as insolvent
        let covered = fhe.le(debt_value, collateral_value);
        let in_range = fhe.not(debt_overflow);
        let solvent = fhe.and(covered, in_range);

        let zero = fhe.trivial_encrypt(0);
        fhe.select(solvent, capped, zero)
    }
}

fn pow10(exponent: u8) -> u128 {
    10u128.checked_pow(exponent as u32).unwrap_or(u128::MAX)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn shift_right_ceil(value: u128, shift: u32) -> u128 {
    let mask = (1u128 << shift) - 1;
    (value >> shift) + u128::from(value & mask != 0)
}
