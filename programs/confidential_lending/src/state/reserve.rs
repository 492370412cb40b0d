use anchor_lang::prelude::*;

use crate::fhe::Euint64;

/// Basis-point denominator for collateral factors
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Plaintext reserve configuration
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ReserveConfig {
    pub active: bool,
    pub borrowing_enabled: bool,
    pub is_collateral: bool,
    pub paused: bool,
    /// Share of collateral value that may be borrowed against, in bps
    pub collateral_factor_bps: u16,
    /// 0 = unlimited
    pub supply_cap: u64,
    /// 0 = unlimited
    pub borrow_cap: u64,
}

impl ReserveConfig {
    pub fn validate_collateral_factor(bps: u16) -> bool {
        bps <= BPS_DENOMINATOR
    }
}

/// One listed asset: configuration plus encrypted aggregate accounting
#[account]
#[derive(Default)]
pub struct Reserve {
    /// Token mint of the listed asset (default = not initialized)
    pub asset: Pubkey,
    /// Mint decimals, used by the solvency gate
    pub decimals: u8,
    /// Pyth price account for this asset
    pub price_feed: Pubkey,
    /// Confidential token account holding the reserve's liquidity
    pub vault: Pubkey,
    /// Confidential token program that settles transfers
    pub token_program: Pubkey,

    pub active: bool,
    pub borrowing_enabled: bool,
    pub is_collateral: bool,
    pub paused: bool,
    pub collateral_factor_bps: u16,
    pub supply_cap: u64,
    pub borrow_cap: u64,

    /// Encrypted sum of all supplied balances
    pub total_supplied: Euint64,
    /// Encrypted sum of all outstanding debt
    pub total_borrowed: Euint64,
    /// Encrypted liquidity, maintained incrementally
    pub available_liquidity: Euint64,

    /// PDA bump seed
    pub bump: u8,
}

impl Reserve {
    pub const SIZE: usize = 8 + // discriminator
        32 + // asset
        1 +  // decimals
        32 + // price_feed
        32 + // vault
        32 + // token_program
        4 +  // active, borrowing_enabled, is_collateral, paused
        2 +  // collateral_factor_bps
        8 +  // supply_cap
        8 +  // borrow_cap
        32 + // total_supplied
        32 + // total_borrowed
        32 + // available_liquidity
        1;   // bump
    // Total: 256 bytes

    pub const SEED: &'static [u8] = b"reserve";

    pub fn is_initialized(&self) -> bool {
        self.asset != Pubkey::default()
    }

    pub fn config(&self) -> ReserveConfig {
        ReserveConfig {
            active: self.active,
            borrowing_enabled: self.borrowing_enabled,
            is_collateral: self.is_collateral,
            paused: self.paused,
            collateral_factor_bps: self.collateral_factor_bps,
            supply_cap: self.supply_cap,
            borrow_cap: self.borrow_cap,
        }
    }

    pub fn apply_config(&mut self, config: &ReserveConfig) {
        self.active = config.active;
        self.borrowing_enabled = config.borrowing_enabled;
        self.is_collateral = config.is_collateral;
        self.paused = config.paused;
        self.collateral_factor_bps = config.collateral_factor_bps;
        self.supply_cap = config.supply_cap;
        self.borrow_cap = config.borrow_cap;
    }

    pub fn data(&self) -> ReserveData {
        ReserveData {
            asset: self.asset,
            decimals: self.decimals,
            price_feed: self.price_feed,
            vault: self.vault,
            config: self.config(),
            total_supplied: self.total_supplied,
            total_borrowed: self.total_borrowed,
            available_liquidity: self.available_liquidity,
        }
    }
}

/// View of a reserve returned to clients; totals stay encrypted
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReserveData {
    pub asset: Pubkey,
    pub decimals: u8,
    pub price_feed: Pubkey,
    pub vault: Pubkey,
    pub config: ReserveConfig,
    pub total_supplied: Euint64,
    pub total_borrowed: Euint64,
    pub available_liquidity: Euint64,
}
