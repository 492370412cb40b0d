use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::settlement::SettlementAccounts;
use crate::state::{LendingPool, Reserve, UserBalance, UserPosition};

/// Accounts shared by supply, borrow and repay
#[derive(Accounts)]
#[instruction(asset: Pubkey)]
pub struct UserOperation<'info> {
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

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::SIZE,
        seeds = [UserPosition::SEED, user.key().as_ref()],
        bump
    )]
    pub position: Account<'info, UserPosition>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserBalance::SIZE,
        seeds = [UserBalance::SEED, user.key().as_ref(), asset.as_ref()],
        bump
    )]
    pub balance: Account<'info, UserBalance>,

    /// CHECK: Input proof verifier program configured on the pool
    #[account(address = pool.input_verifier @ LendingError::InvalidInputProof)]
    pub input_verifier: UncheckedAccount<'info>,

    /// CHECK: Confidential token program recorded on the reserve
    #[account(address = reserve.token_program @ LendingError::InvalidTokenAccount)]
    pub token_program: UncheckedAccount<'info>,

    /// CHECK: User's confidential token account, authority checked by the token program
    #[account(mut)]
    pub user_token_account: UncheckedAccount<'info>,

    /// CHECK: Reserve vault recorded on the reserve
    #[account(mut, address = reserve.vault @ LendingError::InvalidTokenAccount)]
    pub vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> UserOperation<'info> {
    pub fn bind(&mut self, asset: Pubkey, bumps: &UserOperationBumps) {
        let user = self.user.key();
        self.position.bind(user, bumps.position);
        self.balance.bind(user, asset, bumps.balance);
    }

    /// Persist every mutated account before the settlement CPI
    pub fn commit(&self) -> Result<()> {
        self.reserve.exit(&crate::ID)?;
        self.position.exit(&crate::ID)?;
        self.balance.exit(&crate::ID)?;
        Ok(())
    }

    pub fn settlement_accounts(&self) -> SettlementAccounts<'_, 'info> {
        SettlementAccounts {
            token_program: &self.token_program,
            user_token_account: &self.user_token_account,
            user: &self.user,
            vault: &self.vault,
            pool: self.pool.as_ref(),
            pool_bump: self.pool.bump,
        }
    }
}
