use anchor_lang::prelude::*;

use crate::fhe::Euint64;

/// Encrypted per-user, per-asset balances
///
/// Written only by the supply/withdraw and borrow/repay engines.
#[account]
#[derive(Default)]
pub struct UserBalance {
    /// Owner of this balance
    pub owner: Pubkey,
    /// Reserve asset (mint) this balance is for
    pub asset: Pubkey,
    /// Encrypted supplied amount
    pub supplied: Euint64,
    /// Encrypted outstanding debt
    pub borrowed: Euint64,
    /// PDA bump
    pub bump: u8,
}

impl UserBalance {
    pub const SIZE: usize = 8 +  // discriminator
        32 + // owner
        32 + // asset
        32 + // supplied
        32 + // borrowed
        1;   // bump
    // Total: 137 bytes

    pub const SEED: &'static [u8] = b"balance";

    /// Bind a freshly created account to its (user, asset) key
    pub fn bind(&mut self, owner: Pubkey, asset: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.owner = owner;
            self.asset = asset;
            self.bump = bump;
        }
    }
}
