use anchor_lang::prelude::*;

use crate::lending::{self, PoolSettings};
use crate::state::{AccessControl, LendingPool};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = owner,
        space = LendingPool::SIZE,
        seeds = [LendingPool::SEED],
        bump
    )]
    pub pool: Account<'info, LendingPool>,

    #[account(
        init,
        payer = owner,
        space = AccessControl::SIZE,
        seeds = [AccessControl::SEED],
        bump
    )]
    pub access_control: Account<'info, AccessControl>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_handler(ctx: Context<Initialize>, settings: PoolSettings) -> Result<()> {
    let pool = &mut ctx.accounts.pool;
    let roles = &mut ctx.accounts.access_control;

    lending::initialize(pool, roles, ctx.accounts.owner.key(), &settings)?;
    pool.bump = ctx.bumps.pool;
    roles.bump = ctx.bumps.access_control;

    msg!("Lending pool initialized, owner {}", roles.owner);
    msg!(
        "Collaborators: configurator={}, oracle={}, verifier={}",
        pool.configurator,
        pool.price_oracle,
        pool.input_verifier
    );
    Ok(())
}
