use anchor_lang::prelude::*;

/// Plaintext per-user position flags
#[account]
#[derive(Default)]
pub struct UserPosition {
    /// Owner of this position
    pub owner: Pubkey,
    /// Set on first interaction, never cleared
    pub initialized: bool,
    /// Whether the designated collateral asset counts as collateral
    pub collateral_enabled: bool,
    /// The single asset this user owes (default = none)
    pub current_debt_asset: Pubkey,
    /// PDA bump
    pub bump: u8,
}

impl UserPosition {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        1 +  // initialized
        1 +  // collateral_enabled
        32 + // current_debt_asset
        1;   // bump
    // Total: 75 bytes

    pub const SEED: &'static [u8] = b"position";

    pub fn debt_asset(&self) -> Option<Pubkey> {
        (self.current_debt_asset != Pubkey::default()).then_some(self.current_debt_asset)
    }

    /// Bind a freshly created account to its user
    pub fn bind(&mut self, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.owner = owner;
            self.bump = bump;
        }
    }

    /// Mark the position as touched by `owner` (idempotent)
    pub fn touch(&mut self, owner: Pubkey) {
        if !self.initialized {
            self.owner = owner;
            self.initialized = true;
        }
    }

    pub fn data(&self) -> UserPositionData {
        UserPositionData {
            initialized: self.initialized,
            collateral_enabled: self.collateral_enabled,
            current_debt_asset: self.current_debt_asset,
        }
    }
}

/// View of a position returned to clients
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct UserPositionData {
    pub initialized: bool,
    pub collateral_enabled: bool,
    pub current_debt_asset: Pubkey,
}
