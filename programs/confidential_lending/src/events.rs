//! Program events
//!
//! Plaintext metadata only. No event carries an amount or a balance handle.

use anchor_lang::prelude::*;

use crate::state::ReserveConfig;

#[event]
pub struct Supply {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Withdraw {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Borrow {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Repay {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub repaying_all: bool,
    pub timestamp: i64,
}

#[event]
pub struct UserCollateralChanged {
    pub user: Pubkey,
    pub asset: Pubkey,
    pub enabled: bool,
}

#[event]
pub struct ProtocolPaused {
    pub by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ProtocolUnpaused {
    pub by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct CollateralAssetSet {
    pub asset: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ReserveInitialized {
    pub asset: Pubkey,
    pub decimals: u8,
    pub config: ReserveConfig,
    pub timestamp: i64,
}

#[event]
pub struct ReserveConfigUpdated {
    pub asset: Pubkey,
    pub config: ReserveConfig,
    pub timestamp: i64,
}
