use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::error::LendingError;
use crate::events::{ReserveConfigUpdated, ReserveInitialized};
use crate::fhe::Coprocessor;
use crate::lending::{self, NewReserve};
use crate::state::{LendingPool, Reserve, ReserveConfig};

// ============================================================================
// Reserve listing
// ============================================================================

#[derive(Accounts)]
pub struct InitReserve<'info> {
    #[account(
        mut,
        seeds = [LendingPool::SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, LendingPool>,

    pub asset_mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = configurator,
        space = Reserve::SIZE,
        seeds = [Reserve::SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub reserve: Account<'info, Reserve>,

    /// CHECK: Pyth price account, must be owned by the configured oracle program
    #[account(owner = pool.price_oracle @ LendingError::InvalidPriceFeed)]
    pub price_feed: UncheckedAccount<'info>,

    /// CHECK: Confidential token account owned by the pool PDA
    pub vault: UncheckedAccount<'info>,

    /// CHECK: Confidential token program that settles this reserve
    #[account(executable)]
    pub token_program: UncheckedAccount<'info>,

    #[account(mut)]
    pub configurator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn init_reserve_handler(ctx: Context<InitReserve>, config: ReserveConfig) -> Result<()> {
    let accounts = ctx.accounts;
    let params = NewReserve {
        asset: accounts.asset_mint.key(),
        decimals: accounts.asset_mint.decimals,
        price_feed: accounts.price_feed.key(),
        vault: accounts.vault.key(),
        token_program: accounts.token_program.key(),
        config,
    };
    let pool_key = accounts.pool.key();

    let mut fhe = Coprocessor::new(crate::ID);
    lending::init_reserve(
        &mut fhe,
        &mut accounts.pool,
        &accounts.configurator.key(),
        &mut accounts.reserve,
        &params,
        &pool_key,
    )?;
    accounts.reserve.bump = ctx.bumps.reserve;

    emit!(fhe.into_event());
    emit!(ReserveInitialized {
        asset: params.asset,
        decimals: params.decimals,
        config,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Reserve initialized for {}", params.asset);
    msg!(
        "Decimals: {}, collateral factor: {} bps",
        params.decimals,
        config.collateral_factor_bps
    );
    Ok(())
}

// ============================================================================
// Reserve configuration
// ============================================================================

#[derive(Accounts)]
#[instruction(asset: Pubkey)]
pub struct ConfigureReserve<'info> {
    #[account(
        seeds = [LendingPool::SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, LendingPool>,

    #[account(
        mut,
        seeds = [Reserve::SEED, asset.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Account<'info, Reserve>,

    pub configurator: Signer<'info>,
}

fn configure_reserve<U>(ctx: Context<ConfigureReserve>, asset: Pubkey, update: U) -> Result<()>
where
    U: FnOnce(&LendingPool, &Pubkey, &mut Reserve, &Pubkey) -> Result<ReserveConfig>,
{
    let accounts = ctx.accounts;
    let config = update(
        &accounts.pool,
        &accounts.configurator.key(),
        &mut accounts.reserve,
        &asset,
    )?;

    emit!(ReserveConfigUpdated {
        asset,
        config,
        timestamp: Clock::get()?.unix_timestamp,
    });

    #[cfg(feature = "debug")]
    msg!("Reserve {} config: {:?}", asset, config);
    #[cfg(not(feature = "debug"))]
    msg!("Reserve {} config updated", asset);
    Ok(())
}

pub fn set_reserve_active_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    active: bool,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| lending::set_reserve_active(p, c, r, a, active),
    )
}

pub fn set_reserve_paused_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    paused: bool,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| lending::set_reserve_paused(p, c, r, a, paused),
    )
}

pub fn set_reserve_borrowing_enabled_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    enabled: bool,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| lending::set_reserve_borrowing_enabled(p, c, r, a, enabled),
    )
}

pub fn set_reserve_collateral_factor_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    collateral_factor_bps: u16,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| {
            lending::set_reserve_collateral_factor(p, c, r, a, collateral_factor_bps)
        },
    )
}

pub fn set_reserve_supply_cap_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    supply_cap: u64,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| lending::set_reserve_supply_cap(p, c, r, a, supply_cap),
    )
}

pub fn set_reserve_borrow_cap_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    borrow_cap: u64,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| lending::set_reserve_borrow_cap(p, c, r, a, borrow_cap),
    )
}

pub fn update_reserve_config_handler(
    ctx: Context<ConfigureReserve>,
    asset: Pubkey,
    config: ReserveConfig,
) -> Result<()> {
    configure_reserve(
        ctx,
        asset,
        move |p, c, r, a| lending::update_reserve_config(p, c, r, a, config),
    )
}
