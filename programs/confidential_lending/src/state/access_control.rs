use anchor_lang::prelude::*;

use crate::error::LendingError;

/// Maximum members per role
pub const MAX_ROLE_MEMBERS: usize = 8;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    /// Swaps configurator/oracle/verifier and designates the collateral asset
    PoolAdmin,
    /// Pauses and unpauses the protocol
    EmergencyAdmin,
}

/// Role store for the lending pool
#[account]
#[derive(Default)]
pub struct AccessControl {
    /// Grants and revokes roles
    pub owner: Pubkey,

    pub pool_admins: Vec<Pubkey>,

    pub emergency_admins: Vec<Pubkey>,

    /// PDA bump seed
    pub bump: u8,
}

impl AccessControl {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        4 + 32 * MAX_ROLE_MEMBERS + // pool_admins
        4 + 32 * MAX_ROLE_MEMBERS + // emergency_admins
        1; // bump
    // Total: 561 bytes

    pub const SEED: &'static [u8] = b"access_control";

    fn members(&self, role: Role) -> &Vec<Pubkey> {
        match role {
            Role::PoolAdmin => &self.pool_admins,
            Role::EmergencyAdmin => &self.emergency_admins,
        }
    }

    fn members_mut(&mut self, role: Role) -> &mut Vec<Pubkey> {
        match role {
            Role::PoolAdmin => &mut self.pool_admins,
            Role::EmergencyAdmin => &mut self.emergency_admins,
        }
    }

    pub fn has_role(&self, role: Role, account: &Pubkey) -> bool {
        self.members(role).contains(account)
    }

    /// Returns false if the account already held the role
    pub fn grant_role(&mut self, role: Role, account: Pubkey) -> Result<bool> {
        require_keys_neq!(account, Pubkey::default(), LendingError::ZeroAddress);
        if self.has_role(role, &account) {
            return Ok(false);
        }
        let members = self.members_mut(role);
        require!(members.len() < MAX_ROLE_MEMBERS, LendingError::RoleListFull);
        members.push(account);
        Ok(true)
    }

    /// Returns false if the account did not hold the role
    pub fn revoke_role(&mut self, role: Role, account: &Pubkey) -> bool {
        let members = self.members_mut(role);
        let before = members.len();
        members.retain(|member| member != account);
        members.len() != before
    }
}
