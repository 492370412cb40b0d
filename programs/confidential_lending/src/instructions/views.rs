//! Read-only queries
//!
//! Accounts that were never created read as their defaults, so clients can
//! query any (user, asset) pair without checking for existence first.

use anchor_lang::prelude::*;

use crate::fhe::Euint64;
use crate::state::{
    LendingPool, Reserve, ReserveData, UserBalance, UserPosition, UserPositionData,
};

fn load_or_default<T>(info: &AccountInfo) -> Result<T>
where
    T: AccountDeserialize + Owner + Default,
{
    if info.data_is_empty() {
        return Ok(T::default());
    }
    if *info.owner != T::owner() {
        return Err(anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram.into());
    }
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

#[derive(Accounts)]
#[instruction(asset: Pubkey)]
pub struct GetReserveData<'info> {
    /// CHECK: Reserve PDA, may not exist yet
    #[account(seeds = [Reserve::SEED, asset.as_ref()], bump)]
    pub reserve: UncheckedAccount<'info>,
}

pub fn get_reserve_data_handler(
    ctx: Context<GetReserveData>,
    _asset: Pubkey,
) -> Result<ReserveData> {
    let reserve: Reserve = load_or_default(&ctx.accounts.reserve)?;
    Ok(reserve.data())
}

#[derive(Accounts)]
pub struct GetReserveList<'info> {
    #[account(seeds = [LendingPool::SEED], bump = pool.bump)]
    pub pool: Account<'info, LendingPool>,
}

pub fn get_reserve_list_handler(ctx: Context<GetReserveList>) -> Result<Vec<Pubkey>> {
    Ok(ctx.accounts.pool.reserves.clone())
}

#[derive(Accounts)]
#[instruction(user: Pubkey)]
pub struct GetUserPosition<'info> {
    /// CHECK: Position PDA, may not exist yet
    #[account(seeds = [UserPosition::SEED, user.as_ref()], bump)]
    pub position: UncheckedAccount<'info>,
}

pub fn get_user_position_handler(
    ctx: Context<GetUserPosition>,
    _user: Pubkey,
) -> Result<UserPositionData> {
    let position: UserPosition = load_or_default(&ctx.accounts.position)?;
    Ok(position.data())
}

#[derive(Accounts)]
#[instruction(user: Pubkey, asset: Pubkey)]
pub struct GetUserBalance<'info> {
    /// CHECK: Balance PDA, may not exist yet
    #[account(seeds = [UserBalance::SEED, user.as_ref(), asset.as_ref()], bump)]
    pub balance: UncheckedAccount<'info>,
}

/// Encrypted supplied balance; the uninitialized handle if never supplied
pub fn get_user_supplied_balance_handler(
    ctx: Context<GetUserBalance>,
    _user: Pubkey,
    _asset: Pubkey,
) -> Result<Euint64> {
    let balance: UserBalance = load_or_default(&ctx.accounts.balance)?;
    Ok(balance.supplied)
}

/// Encrypted outstanding debt; the uninitialized handle if never borrowed
pub fn get_user_borrowed_balance_handler(
    ctx: Context<GetUserBalance>,
    _user: Pubkey,
    _asset: Pubkey,
) -> Result<Euint64> {
    let balance: UserBalance = load_or_default(&ctx.accounts.balance)?;
    Ok(balance.borrowed)
}
