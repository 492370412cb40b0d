//! Role-gated protocol administration

use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::state::{AccessControl, LendingPool, Reserve, Role};

/// Who is calling, and the role store to check them against
pub struct AuthorizationContext<'a> {
    pub caller: Pubkey,
    pub roles: &'a AccessControl,
}

impl AuthorizationContext<'_> {
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.roles.has_role(role, &self.caller) {
            return Ok(());
        }
        match role {
            Role::PoolAdmin => err!(LendingError::OnlyPoolAdmin),
            Role::EmergencyAdmin => err!(LendingError::OnlyEmergencyAdmin),
        }
    }
}

/// Initial configuration of a new deployment
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    pub configurator: Pubkey,
    pub price_oracle: Pubkey,
    pub input_verifier: Pubkey,
}

/// Set up the pool and role store; `owner` starts with both admin roles
pub fn initialize(
    protocol: &mut LendingPool,
    roles: &mut AccessControl,
    owner: Pubkey,
    settings: &PoolSettings,
) -> Result<()> {
    require_keys_neq!(settings.configurator, Pubkey::default(), LendingError::ZeroAddress);
    require_keys_neq!(settings.price_oracle, Pubkey::default(), LendingError::ZeroAddress);
    require_keys_neq!(settings.input_verifier, Pubkey::default(), LendingError::ZeroAddress);

    protocol.configurator = settings.configurator;
    protocol.price_oracle = settings.price_oracle;
    protocol.input_verifier = settings.input_verifier;
    protocol.collateral_asset = Pubkey::default();
    protocol.paused = false;
    protocol.reserves = Vec::new();

    roles.owner = owner;
    roles.grant_role(Role::PoolAdmin, owner)?;
    roles.grant_role(Role::EmergencyAdmin, owner)?;
    Ok(())
}

pub fn grant_role(
    caller: &Pubkey,
    roles: &mut AccessControl,
    role: Role,
    account: Pubkey,
) -> Result<bool> {
    require_keys_eq!(*caller, roles.owner, LendingError::Unauthorized);
    roles.grant_role(role, account)
}

pub fn revoke_role(
    caller: &Pubkey,
    roles: &mut AccessControl,
    role: Role,
    account: &Pubkey,
) -> Result<bool> {
    require_keys_eq!(*caller, roles.owner, LendingError::Unauthorized);
    Ok(roles.revoke_role(role, account))
}

// ============================================================================
// Pause
// ============================================================================

pub fn pause(auth: &AuthorizationContext, protocol: &mut LendingPool) -> Result<()> {
    auth.require_role(Role::EmergencyAdmin)?;
    require!(!protocol.paused, LendingError::ProtocolAlreadyPaused);
    protocol.paused = true;
    Ok(())
}

pub fn unpause(auth: &AuthorizationContext, protocol: &mut LendingPool) -> Result<()> {
    auth.require_role(Role::EmergencyAdmin)?;
    require!(protocol.paused, LendingError::ProtocolNotPaused);
    protocol.paused = false;
    Ok(())
}

// ============================================================================
// Collaborator addresses
// ============================================================================

pub fn set_configurator(
    auth: &AuthorizationContext,
    protocol: &mut LendingPool,
    configurator: Pubkey,
) -> Result<()> {
    auth.require_role(Role::PoolAdmin)?;
    require_keys_neq!(configurator, Pubkey::default(), LendingError::ZeroAddress);
    protocol.configurator = configurator;
    Ok(())
}

pub fn set_price_oracle(
    auth: &AuthorizationContext,
    protocol: &mut LendingPool,
    price_oracle: Pubkey,
) -> Result<()> {
    auth.require_role(Role::PoolAdmin)?;
    require_keys_neq!(price_oracle, Pubkey::default(), LendingError::ZeroAddress);
    protocol.price_oracle = price_oracle;
    Ok(())
}

pub fn set_input_verifier(
    auth: &AuthorizationContext,
    protocol: &mut LendingPool,
    input_verifier: Pubkey,
) -> Result<()> {
    auth.require_role(Role::PoolAdmin)?;
    require_keys_neq!(input_verifier, Pubkey::default(), LendingError::ZeroAddress);
    protocol.input_verifier = input_verifier;
    Ok(())
}

// ============================================================================
// Designated collateral
// ============================================================================

/// Make `asset` the single asset users may enable as collateral
pub fn set_collateral_asset(
    auth: &AuthorizationContext,
    protocol: &mut LendingPool,
    reserve: &Reserve,
    asset: Pubkey,
) -> Result<()> {
    auth.require_role(Role::PoolAdmin)?;
    require_keys_neq!(asset, Pubkey::default(), LendingError::ZeroAddress);
    require!(
        reserve.is_initialized() && reserve.asset == asset,
        LendingError::ReserveNotInitialized
    );
    require!(reserve.is_collateral, LendingError::ReserveNotCollateral);
    protocol.collateral_asset = asset;
    Ok(())
}
