use anchor_lang::prelude::*;

use crate::fhe::Euint64;

/// Direction of a token movement, seen from the reserve vault
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SettlementDirection {
    /// User -> vault (supply, repay)
    In,
    /// Vault -> user (withdraw, borrow)
    Out,
}

/// Token movement produced by a lending operation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct SettlementIntent {
    pub direction: SettlementDirection,
    pub user: Pubkey,
    pub asset: Pubkey,
    /// Encrypted amount, transiently allowed to the token program
    pub amount: Euint64,
}
