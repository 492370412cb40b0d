use anchor_lang::prelude::*;

use crate::events::{CollateralAssetSet, ProtocolPaused, ProtocolUnpaused};
use crate::lending::{self, AuthorizationContext};
use crate::state::{AccessControl, LendingPool, Reserve, Role};

// ============================================================================
// Role management
// ============================================================================

#[derive(Accounts)]
pub struct ManageRoles<'info> {
    #[account(
        mut,
        seeds = [AccessControl::SEED],
        bump = access_control.bump
    )]
    pub access_control: Account<'info, AccessControl>,

    pub owner: Signer<'info>,
}

pub fn grant_role_handler(ctx: Context<ManageRoles>, role: Role, account: Pubkey) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    if lending::grant_role(&owner, &mut ctx.accounts.access_control, role, account)? {
        msg!("Granted {:?} to {}", role, account);
    }
    Ok(())
}

pub fn revoke_role_handler(ctx: Context<ManageRoles>, role: Role, account: Pubkey) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    if lending::revoke_role(&owner, &mut ctx.accounts.access_control, role, &account)? {
        msg!("Revoked {:?} from {}", role, account);
    }
    Ok(())
}

// ============================================================================
// Protocol administration
// ============================================================================

#[derive(Accounts)]
pub struct ProtocolAdmin<'info> {
    #[account(
        mut,
        seeds = [LendingPool::SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, LendingPool>,

    #[account(
        seeds = [AccessControl::SEED],
        bump = access_control.bump
    )]
    pub access_control: Account<'info, AccessControl>,

    pub authority: Signer<'info>,
}

impl ProtocolAdmin<'_> {
    fn split(&mut self) -> (AuthorizationContext<'_>, &mut LendingPool) {
        let auth = AuthorizationContext {
            caller: self.authority.key(),
            roles: &self.access_control,
        };
        (auth, &mut self.pool)
    }
}

pub fn pause_handler(ctx: Context<ProtocolAdmin>) -> Result<()> {
    let (auth, pool) = ctx.accounts.split();
    lending::pause(&auth, pool)?;

    emit!(ProtocolPaused {
        by: auth.caller,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Protocol paused by {}", auth.caller);
    Ok(())
}

pub fn unpause_handler(ctx: Context<ProtocolAdmin>) -> Result<()> {
    let (auth, pool) = ctx.accounts.split();
    lending::unpause(&auth, pool)?;

    emit!(ProtocolUnpaused {
        by: auth.caller,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Protocol unpaused by {}", auth.caller);
    Ok(())
}

pub fn set_configurator_handler(ctx: Context<ProtocolAdmin>, configurator: Pubkey) -> Result<()> {
    let (auth, pool) = ctx.accounts.split();
    lending::set_configurator(&auth, pool, configurator)?;
    msg!("Configurator set to {}", configurator);
    Ok(())
}

pub fn set_price_oracle_handler(ctx: Context<ProtocolAdmin>, price_oracle: Pubkey) -> Result<()> {
    let (auth, pool) = ctx.accounts.split();
    lending::set_price_oracle(&auth, pool, price_oracle)?;
    msg!("Price oracle set to {}", price_oracle);
    Ok(())
}

pub fn set_input_verifier_handler(
    ctx: Context<ProtocolAdmin>,
    input_verifier: Pubkey,
) -> Result<()> {
    let (auth, pool) = ctx.accounts.split();
    lending::set_input_verifier(&auth, pool, input_verifier)?;
    msg!("Input verifier set to {}", input_verifier);
    Ok(())
}

// ============================================================================
// Designated collateral
// ============================================================================

#[derive(Accounts)]
#[instruction(asset: Pubkey)]
pub struct SetCollateralAsset<'info> {
    #[account(
        mut,
        seeds = [LendingPool::SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, LendingPool>,

    #[account(
        seeds = [AccessControl::SEED],
        bump = access_control.bump
    )]
    pub access_control: Account<'info, AccessControl>,

    #[account(
        seeds = [Reserve::SEED, asset.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Account<'info, Reserve>,

    pub authority: Signer<'info>,
}

pub fn set_collateral_asset_handler(ctx: Context<SetCollateralAsset>, asset: Pubkey) -> Result<()> {
    let accounts = ctx.accounts;
    let auth = AuthorizationContext {
        caller: accounts.authority.key(),
        roles: &accounts.access_control,
    };
    lending::set_collateral_asset(&auth, &mut accounts.pool, &accounts.reserve, asset)?;

    emit!(CollateralAssetSet {
        asset,
        timestamp: Clock::get()?.unix_timestamp,
    });
    msg!("Designated collateral asset set to {}", asset);
    Ok(())
}
