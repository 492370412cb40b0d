use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::events;
use crate::fhe::{Coprocessor, EncryptedAmount, ExternalEuint64};
use crate::lending::{self, DebtSnapshot, LendingContext};
use crate::oracle::PythPriceOracle;
use crate::settlement::{settle, SettlementAccounts};
use crate::state::{LendingPool, Reserve, UserBalance, UserPosition};

/// Withdraw accounts
///
/// The optional accounts are required when the withdrawn asset is the
/// designated collateral backing outstanding debt: the debt reserve and the
/// user's balance in it, plus both Pyth price feeds.
#[derive(Accounts)]
#[instruction(asset: Pubkey)]
pub struct WithdrawOperation<'info> {
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

    /// Reserve of the position's debt asset
    pub debt_reserve: Option<Account<'info, Reserve>>,

    /// User's balance in the debt asset
    pub debt_balance: Option<Account<'info, UserBalance>>,

    /// CHECK: Pyth price account of the withdrawn asset, validated in handler
    pub price_feed: Option<UncheckedAccount<'info>>,

    /// CHECK: Pyth price account of the debt asset, validated in handler
    pub debt_price_feed: Option<UncheckedAccount<'info>>,

    /// CHECK: Input proof verifier program configured on the pool
    #[account(address = pool.input_verifier @ LendingError::InvalidInputProof)]
    pub input_verifier: UncheckedAccount<'info>,

    /// CHECK: Confidential token program recorded on the reserve
    #[account(address = reserve.token_program @ LendingError::InvalidTokenAccount)]
    pub token_program: UncheckedAccount<'info>,

    /// CHECK: User's confidential token account, receives the withdrawal
    #[account(mut)]
    pub user_token_account: UncheckedAccount<'info>,

    /// CHECK: Reserve vault recorded on the reserve
    #[account(mut, address = reserve.vault @ LendingError::InvalidTokenAccount)]
    pub vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> WithdrawOperation<'info> {
    /// Snapshot of the position's debt, if the debt accounts were supplied
    fn debt_snapshot(&self) -> Result<Option<DebtSnapshot>> {
        let Some(debt_asset) = self.position.debt_asset() else {
            return Ok(None);
        };
        let (Some(debt_reserve), Some(debt_balance)) = (&self.debt_reserve, &self.debt_balance)
        else {
            return Ok(None);
        };

        require_keys_eq!(debt_reserve.asset, debt_asset, LendingError::InvalidDebtAccount);
        require_keys_eq!(debt_balance.asset, debt_asset, LendingError::InvalidDebtAccount);
        require_keys_eq!(
            debt_balance.owner,
            self.user.key(),
            LendingError::InvalidDebtAccount
        );

        Ok(Some(DebtSnapshot {
            asset: debt_asset,
            borrowed: debt_balance.borrowed,
            decimals: debt_reserve.decimals,
        }))
    }

    fn commit(&self) -> Result<()> {
        self.reserve.exit(&crate::ID)?;
        self.position.exit(&crate::ID)?;
        self.balance.exit(&crate::ID)?;
        Ok(())
    }

    fn settlement_accounts(&self) -> SettlementAccounts<'_, 'info> {
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

/// Price feeds supplied with the instruction, checked against their reserves
fn price_oracle<'a, 'info>(
    pool: &LendingPool,
    reserve: &Reserve,
    price_feed: &'a Option<UncheckedAccount<'info>>,
    debt_reserve: &Option<Account<'info, Reserve>>,
    debt_price_feed: &'a Option<UncheckedAccount<'info>>,
    now: i64,
) -> Result<PythPriceOracle<'a, 'info>> {
    let mut oracle = PythPriceOracle::new(now);

    if let Some(feed) = price_feed {
        validate_feed(pool, reserve, feed)?;
        oracle = oracle.with_feed(reserve.asset, feed);
    }
    if let (Some(feed), Some(debt_reserve)) = (debt_price_feed, debt_reserve) {
        validate_feed(pool, debt_reserve, feed)?;
        oracle = oracle.with_feed(debt_reserve.asset, feed);
    }
    Ok(oracle)
}

fn validate_feed(pool: &LendingPool, reserve: &Reserve, feed: &AccountInfo) -> Result<()> {
    require_keys_eq!(feed.key(), reserve.price_feed, LendingError::InvalidPriceFeed);
    require_keys_eq!(*feed.owner, pool.price_oracle, LendingError::InvalidPriceFeed);
    Ok(())
}

/// Withdraw up to an encrypted amount of supplied funds
pub fn withdraw_handler(
    ctx: Context<WithdrawOperation>,
    asset: Pubkey,
    amount: ExternalEuint64,
    proof: Vec<u8>,
) -> Result<()> {
    let accounts = ctx.accounts;
    let user = accounts.user.key();
    accounts.position.bind(user, ctx.bumps.position);
    accounts.balance.bind(user, asset, ctx.bumps.balance);

    let debt = accounts.debt_snapshot()?;
    let now = Clock::get()?.unix_timestamp;

    let oracle = price_oracle(
        &accounts.pool,
        &accounts.reserve,
        &accounts.price_feed,
        &accounts.debt_reserve,
        &accounts.debt_price_feed,
        now,
    )?;

    let mut fhe = Coprocessor::new(crate::ID).with_input_verifier(&accounts.input_verifier);
    let outcome = lending::withdraw(
        &mut LendingContext {
            fhe: &mut fhe,
            protocol: &accounts.pool,
            pool: accounts.pool.key(),
            caller: user,
        },
        &oracle,
        &mut accounts.reserve,
        &accounts.position,
        &mut accounts.balance,
        debt,
        &asset,
        EncryptedAmount::new(amount, &proof),
    )?;

    accounts.commit()?;
    emit!(fhe.into_event());
    emit!(events::Withdraw {
        user,
        asset,
        timestamp: now,
    });

    settle(&accounts.settlement_accounts(), &outcome.settlement)?;

    msg!("Withdraw: user {} asset {}", user, asset);
    Ok(())
}
