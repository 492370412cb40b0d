use anchor_lang::prelude::*;

use crate::error::LendingError;

/// Maximum number of listed reserves
pub const MAX_RESERVES: usize = 32;

/// Global lending pool state
#[account]
#[derive(Default)]
pub struct LendingPool {
    /// Only key allowed to list and configure reserves
    pub configurator: Pubkey,

    /// Program that owns accepted price feed accounts
    pub price_oracle: Pubkey,

    /// Program that verifies encrypted input proofs
    pub input_verifier: Pubkey,

    /// The single asset users may enable as collateral (default = none)
    pub collateral_asset: Pubkey,

    /// Global pause flag, blocks every user operation
    pub paused: bool,

    /// Listed reserve assets, in listing order
    pub reserves: Vec<Pubkey>,

    /// PDA bump seed
    pub bump: u8,
}

impl LendingPool {
    pub const SIZE: usize = 8 + // discriminator
        32 + // configurator
        32 + // price_oracle
        32 + // input_verifier
        32 + // collateral_asset
        1 +  // paused
        4 + 32 * MAX_RESERVES + // reserves
        1;   // bump
    // Total: 1166 bytes

    pub const SEED: &'static [u8] = b"lending_pool";

    pub fn designated_collateral(&self) -> Option<Pubkey> {
        (self.collateral_asset != Pubkey::default()).then_some(self.collateral_asset)
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, LendingError::ProtocolPaused);
        Ok(())
    }

    pub fn list_reserve(&mut self, asset: Pubkey) -> Result<()> {
        require!(!self.reserves.contains(&asset), LendingError::ReserveAlreadyInitialized);
        require!(self.reserves.len() < MAX_RESERVES, LendingError::TooManyReserves);
        self.reserves.push(asset);
        Ok(())
    }
}
