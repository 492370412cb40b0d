//! Reserve listing and configuration, restricted to the pool configurator

use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::fhe::FheBackend;
use crate::state::{LendingPool, Reserve, ReserveConfig};

/// Everything needed to list a new reserve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewReserve {
    pub asset: Pubkey,
    pub decimals: u8,
    pub price_feed: Pubkey,
    pub vault: Pubkey,
    pub token_program: Pubkey,
    pub config: ReserveConfig,
}

fn require_configurator(protocol: &LendingPool, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(*caller, protocol.configurator, LendingError::OnlyPoolConfigurator);
    Ok(())
}

fn require_valid(config: &ReserveConfig) -> Result<()> {
    require!(
        ReserveConfig::validate_collateral_factor(config.collateral_factor_bps),
        LendingError::InvalidCollateralFactor
    );
    Ok(())
}

/// List a reserve with encrypted-zero totals
pub fn init_reserve<F: FheBackend + ?Sized>(
    fhe: &mut F,
    protocol: &mut LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    params: &NewReserve,
    pool: &Pubkey,
) -> Result<()> {
    require_configurator(protocol, caller)?;
    require_keys_neq!(params.asset, Pubkey::default(), LendingError::ZeroAddress);
    require!(!reserve.is_initialized(), LendingError::ReserveAlreadyInitialized);
    require_valid(&params.config)?;
    protocol.list_reserve(params.asset)?;

    reserve.asset = params.asset;
    reserve.decimals = params.decimals;
    reserve.price_feed = params.price_feed;
    reserve.vault = params.vault;
    reserve.token_program = params.token_program;
    reserve.apply_config(&params.config);

    let zero = fhe.trivial_encrypt(0);
    fhe.allow(zero, pool);
    fhe.make_publicly_decryptable(zero);
    reserve.total_supplied = zero;
    reserve.total_borrowed = zero;
    reserve.available_liquidity = zero;
    Ok(())
}

/// Apply `update` to a listed reserve's configuration
pub fn configure(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    update: impl FnOnce(&mut ReserveConfig),
) -> Result<ReserveConfig> {
    require_configurator(protocol, caller)?;
    require_keys_neq!(*asset, Pubkey::default(), LendingError::ZeroAddress);
    require!(
        reserve.is_initialized() && reserve.asset == *asset,
        LendingError::ReserveNotInitialized
    );

    let mut config = reserve.config();
    update(&mut config);
    require_valid(&config)?;
    reserve.apply_config(&config);
    Ok(config)
}

pub fn set_reserve_active(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    active: bool,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| c.active = active)
}

pub fn set_reserve_paused(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    paused: bool,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| c.paused = paused)
}

pub fn set_reserve_borrowing_enabled(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    enabled: bool,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| c.borrowing_enabled = enabled)
}

pub fn set_reserve_collateral_factor(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    collateral_factor_bps: u16,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| {
        c.collateral_factor_bps = collateral_factor_bps
    })
}

pub fn set_reserve_supply_cap(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    supply_cap: u64,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| c.supply_cap = supply_cap)
}

pub fn set_reserve_borrow_cap(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    borrow_cap: u64,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| c.borrow_cap = borrow_cap)
}

pub fn update_reserve_config(
    protocol: &LendingPool,
    caller: &Pubkey,
    reserve: &mut Reserve,
    asset: &Pubkey,
    config: ReserveConfig,
) -> Result<ReserveConfig> {
    configure(protocol, caller, reserve, asset, |c| *c = config)
}
