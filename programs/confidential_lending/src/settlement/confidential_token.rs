//! Confidential token CPI
//!
//! The token program moves encrypted balances between token accounts. It
//! checks the transient ACL grant on the amount handle, so every transfer
//! must carry a handle allowed to it within the same instruction.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{invoke, invoke_signed};

use super::types::{SettlementDirection, SettlementIntent};
use crate::state::LendingPool;

/// confidential_transfer: sha256("global:confidential_transfer")[0..8]
pub const CONFIDENTIAL_TRANSFER_DISCRIMINATOR: [u8; 8] =
    [0x61, 0x4f, 0x80, 0x3a, 0x86, 0xde, 0x49, 0x8f];

pub struct SettlementAccounts<'a, 'info> {
    pub token_program: &'a AccountInfo<'info>,
    /// User's confidential token account for the asset
    pub user_token_account: &'a AccountInfo<'info>,
    /// Signs inbound transfers
    pub user: &'a AccountInfo<'info>,
    /// Reserve vault
    pub vault: &'a AccountInfo<'info>,
    /// Lending pool PDA, vault authority; signs outbound transfers
    pub pool: &'a AccountInfo<'info>,
    pub pool_bump: u8,
}

pub fn transfer_instruction(
    token_program: &Pubkey,
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: &[u8; 32],
) -> Instruction {
    let mut data = Vec::with_capacity(8 + 32);
    data.extend_from_slice(&CONFIDENTIAL_TRANSFER_DISCRIMINATOR);
    data.extend_from_slice(amount);

    Instruction {
        program_id: *token_program,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}

/// User -> vault, authorised by the user's signature
pub fn transfer_in(accounts: &SettlementAccounts, intent: &SettlementIntent) -> Result<()> {
    let ix = transfer_instruction(
        accounts.token_program.key,
        accounts.user_token_account.key,
        accounts.vault.key,
        accounts.user.key,
        &intent.amount.0,
    );
    invoke(
        &ix,
        &[
            accounts.user_token_account.clone(),
            accounts.vault.clone(),
            accounts.user.clone(),
            accounts.token_program.clone(),
        ],
    )?;
    Ok(())
}

/// Vault -> user, authorised by the pool PDA
pub fn transfer_out(accounts: &SettlementAccounts, intent: &SettlementIntent) -> Result<()> {
    let ix = transfer_instruction(
        accounts.token_program.key,
        accounts.vault.key,
        accounts.user_token_account.key,
        accounts.pool.key,
        &intent.amount.0,
    );
    let bump = [accounts.pool_bump];
    let signer_seeds: &[&[u8]] = &[LendingPool::SEED, &bump];
    invoke_signed(
        &ix,
        &[
            accounts.vault.clone(),
            accounts.user_token_account.clone(),
            accounts.pool.clone(),
            accounts.token_program.clone(),
        ],
        &[signer_seeds],
    )?;
    Ok(())
}

pub fn settle(accounts: &SettlementAccounts, intent: &SettlementIntent) -> Result<()> {
    match intent.direction {
        SettlementDirection::In => transfer_in(accounts, intent),
        SettlementDirection::Out => transfer_out(accounts, intent),
    }
}
