use anchor_lang::prelude::*;

use crate::events::UserCollateralChanged;
use crate::lending;
use crate::state::{LendingPool, UserPosition};

#[derive(Accounts)]
pub struct SetUserCollateral<'info> {
    #[account(
        seeds = [LendingPool::SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, LendingPool>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::SIZE,
        seeds = [UserPosition::SEED, user.key().as_ref()],
        bump
    )]
    pub position: Account<'info, UserPosition>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Enable or disable the designated collateral asset for the caller
pub fn set_user_use_reserve_as_collateral_handler(
    ctx: Context<SetUserCollateral>,
    asset: Pubkey,
    enabled: bool,
) -> Result<()> {
    let user = ctx.accounts.user.key();
    let position = &mut ctx.accounts.position;
    position.bind(user, ctx.bumps.position);

    lending::set_user_use_reserve_as_collateral(
        &ctx.accounts.pool,
        position,
        &user,
        &asset,
        enabled,
    )?;

    emit!(UserCollateralChanged {
        user,
        asset,
        enabled,
    });

    msg!("Collateral {} for user {}", if enabled { "enabled" } else { "disabled" }, user);
    Ok(())
}
