//! End-to-end scenarios for the orchestrator, run against the plaintext evaluator

use std::collections::{BTreeMap, HashMap};

use anchor_lang::prelude::*;

use super::*;
use crate::engine::fixtures;
use crate::fhe::mock::MockFhe;
use crate::state::{AccessControl, ReserveConfig};

const PRICE_ONE_DOLLAR: u64 = 1_000_000;

struct Harness {
    fhe: MockFhe,
    protocol: LendingPool,
    roles: AccessControl,
    admin: Pubkey,
    configurator: Pubkey,
    pool: Pubkey,
    reserves: HashMap<Pubkey, Reserve>,
    positions: HashMap<Pubkey, UserPosition>,
    balances: HashMap<(Pubkey, Pubkey), UserBalance>,
    prices: BTreeMap<Pubkey, u64>,
    collateral: Pubkey,
    debt: Pubkey,
}

impl Harness {
    /// Two reserves: a collateral asset and a borrowable asset, both $1
    fn new() -> Self {
        let admin = Pubkey::new_unique();
        let configurator = Pubkey::new_unique();
        let mut h = Harness {
            fhe: MockFhe::new(),
            protocol: LendingPool::default(),
            roles: AccessControl::default(),
            admin,
            configurator,
            pool: Pubkey::new_unique(),
            reserves: HashMap::new(),
            positions: HashMap::new(),
            balances: HashMap::new(),
            prices: BTreeMap::new(),
            collateral: Pubkey::new_unique(),
            debt: Pubkey::new_unique(),
        };
        let settings = PoolSettings {
            configurator,
            price_oracle: Pubkey::new_unique(),
            input_verifier: Pubkey::new_unique(),
        };
        initialize(&mut h.protocol, &mut h.roles, admin, &settings).unwrap();

        let collateral_config = ReserveConfig {
            is_collateral: true,
            borrowing_enabled: false,
            ..fixtures::open_config()
        };
        h.list(h.collateral, collateral_config);
        h.list(h.debt, fixtures::open_config());

        let auth = AuthorizationContext { caller: admin, roles: &h.roles };
        let reserve = &h.reserves[&h.collateral];
        set_collateral_asset(&auth, &mut h.protocol, reserve, h.collateral).unwrap();
        h
    }

    fn list(&mut self, asset: Pubkey, config: ReserveConfig) {
        let mut reserve = Reserve::default();
        let params = NewReserve {
            asset,
            decimals: 6,
            price_feed: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            token_program: Pubkey::new_unique(),
            config,
        };
        init_reserve(
            &mut self.fhe,
            &mut self.protocol,
            &self.configurator,
            &mut reserve,
            &params,
            &self.pool,
        )
        .unwrap();
        self.reserves.insert(asset, reserve);
        self.prices.insert(asset, PRICE_ONE_DOLLAR);
    }

    fn supply(&mut self, user: Pubkey, asset: Pubkey, value: u64) -> Result<u64> {
        let (handle, proof) = self.fhe.encrypt_input(value, &user);
        let reserve = self.reserves.entry(asset).or_default();
        let position = self.positions.entry(user).or_default();
        let balance = self
            .balances
            .entry((user, asset))
            .or_insert_with(|| fixtures::balance(user, asset));
        let mut ctx = LendingContext {
            fhe: &mut self.fhe,
            protocol: &self.protocol,
            pool: self.pool,
            caller: user,
        };
        let amount = EncryptedAmount::new(handle, &proof);
        let outcome = supply(&mut ctx, reserve, position, balance, &asset, amount)?;
        assert_eq!(outcome.settlement.direction, SettlementDirection::In);
        Ok(self.fhe.decrypt(outcome.settlement.amount))
    }

    fn debt_snapshot(&self, user: Pubkey) -> Option<DebtSnapshot> {
        let asset = self.positions.get(&user)?.debt_asset()?;
        let borrowed = self
            .balances
            .get(&(user, asset))
            .map(|b| b.borrowed)
            .unwrap_or_default();
        Some(DebtSnapshot {
            asset,
            borrowed,
            decimals: self.reserves.get(&asset)?.decimals,
        })
    }

    fn withdraw_with(
        &mut self,
        user: Pubkey,
        asset: Pubkey,
        value: u64,
        debt: Option<DebtSnapshot>,
    ) -> Result<u64> {
        let (handle, proof) = self.fhe.encrypt_input(value, &user);
        let reserve = self.reserves.entry(asset).or_default();
        let position = self.positions.entry(user).or_default();
        let balance = self
            .balances
            .entry((user, asset))
            .or_insert_with(|| fixtures::balance(user, asset));
        let mut ctx = LendingContext {
            fhe: &mut self.fhe,
            protocol: &self.protocol,
            pool: self.pool,
            caller: user,
        };
        let outcome = withdraw(
            &mut ctx,
            &self.prices,
            reserve,
            position,
            balance,
            debt,
            &asset,
            EncryptedAmount::new(handle, &proof),
        )?;
        assert_eq!(outcome.settlement.direction, SettlementDirection::Out);
        Ok(self.fhe.decrypt(outcome.settlement.amount))
    }

    fn withdraw(&mut self, user: Pubkey, asset: Pubkey, value: u64) -> Result<u64> {
        let debt = self.debt_snapshot(user);
        self.withdraw_with(user, asset, value, debt)
    }

    fn borrow(&mut self, user: Pubkey, asset: Pubkey, value: u64) -> Result<u64> {
        let (handle, proof) = self.fhe.encrypt_input(value, &user);
        let reserve = self.reserves.entry(asset).or_default();
        let position = self.positions.entry(user).or_default();
        let balance = self
            .balances
            .entry((user, asset))
            .or_insert_with(|| fixtures::balance(user, asset));
        let mut ctx = LendingContext {
            fhe: &mut self.fhe,
            protocol: &self.protocol,
            pool: self.pool,
            caller: user,
        };
        let amount = EncryptedAmount::new(handle, &proof);
        let outcome = borrow(&mut ctx, reserve, position, balance, &asset, amount)?;
        Ok(self.fhe.decrypt(outcome.settlement.amount))
    }

    fn repay(&mut self, user: Pubkey, asset: Pubkey, value: u64, all: bool) -> Result<u64> {
        let (handle, proof) = self.fhe.encrypt_input(value, &user);
        let reserve = self.reserves.entry(asset).or_default();
        let position = self.positions.entry(user).or_default();
        let balance = self
            .balances
            .entry((user, asset))
            .or_insert_with(|| fixtures::balance(user, asset));
        let mut ctx = LendingContext {
            fhe: &mut self.fhe,
            protocol: &self.protocol,
            pool: self.pool,
            caller: user,
        };
        let outcome = repay(
            &mut ctx,
            reserve,
            position,
            balance,
            &asset,
            EncryptedAmount::new(handle, &proof),
            all,
        )?;
        Ok(self.fhe.decrypt(outcome.settlement.amount))
    }

    fn toggle_collateral(&mut self, user: Pubkey, asset: Pubkey, enabled: bool) -> Result<()> {
        let position = self.positions.entry(user).or_default();
        set_user_use_reserve_as_collateral(&self.protocol, position, &user, &asset, enabled)
    }

    fn supplied(&self, user: Pubkey, asset: Pubkey) -> u64 {
        self.balances
            .get(&(user, asset))
            .map(|b| self.fhe.decrypt(b.supplied))
            .unwrap_or(0)
    }

    fn borrowed(&self, user: Pubkey, asset: Pubkey) -> u64 {
        self.balances
            .get(&(user, asset))
            .map(|b| self.fhe.decrypt(b.borrowed))
            .unwrap_or(0)
    }

    fn liquidity(&self, asset: Pubkey) -> u64 {
        self.fhe.decrypt(self.reserves[&asset].available_liquidity)
    }

    fn total_supplied(&self, asset: Pubkey) -> u64 {
        self.fhe.decrypt(self.reserves[&asset].total_supplied)
    }

    fn configure(&mut self, asset: Pubkey, update: impl FnOnce(&mut ReserveConfig)) {
        let reserve = self.reserves.get_mut(&asset).unwrap();
        configure(&self.protocol, &self.configurator, reserve, &asset, update).unwrap();
    }

    /// A user with `collateral` supplied and enabled, borrowing `debt` of the debt asset
    fn borrower(&mut self, collateral: u64, debt: u64) -> Pubkey {
        let user = Pubkey::new_unique();
        self.supply(user, self.collateral, collateral).unwrap();
        self.toggle_collateral(user, self.collateral, true).unwrap();
        if debt > 0 {
            assert_eq!(self.borrow(user, self.debt, debt).unwrap(), debt);
        }
        user
    }

    fn seed_liquidity(&mut self, asset: Pubkey, value: u64) {
        let lender = Pubkey::new_unique();
        self.supply(lender, asset, value).unwrap();
    }
}

fn assert_error(result: Result<impl std::fmt::Debug>, expected: LendingError) {
    assert_eq!(result.unwrap_err(), expected.into());
}

// ============================================================================
// Supply / Withdraw
// ============================================================================

#[test]
fn two_users_supply_independently() {
    let mut h = Harness::new();
    let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());

    h.supply(alice, h.debt, 1_000).unwrap();
    h.supply(bob, h.debt, 1_000).unwrap();

    assert_eq!(h.total_supplied(h.debt), 2_000);
    assert_eq!(h.supplied(alice, h.debt), 1_000);
    assert_eq!(h.supplied(bob, h.debt), 1_000);
    assert!(h.positions[&alice].initialized);
}

#[test]
fn supply_then_withdraw_is_net_neutral() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    h.seed_liquidity(h.debt, 5_000);

    h.supply(user, h.debt, 700).unwrap();
    assert_eq!(h.withdraw(user, h.debt, 700).unwrap(), 700);

    assert_eq!(h.supplied(user, h.debt), 0);
    assert_eq!(h.total_supplied(h.debt), 5_000);
    assert_eq!(h.liquidity(h.debt), 5_000);
}

#[test]
fn unknown_reserve_is_rejected() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    assert_error(h.supply(user, Pubkey::new_unique(), 1), LendingError::ReserveNotInitialized);
    assert_error(h.supply(user, Pubkey::default(), 1), LendingError::ZeroAddress);
}

#[test]
fn settlement_amount_is_transiently_allowed_to_token_program() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let (handle, proof) = h.fhe.encrypt_input(10, &user);
    let reserve = h.reserves.get_mut(&h.debt).unwrap();
    let token_program = reserve.token_program;
    let mut position = UserPosition::default();
    let mut balance = fixtures::balance(user, h.debt);
    let mut ctx = LendingContext {
        fhe: &mut h.fhe,
        protocol: &h.protocol,
        pool: h.pool,
        caller: user,
    };

    let outcome = supply(
        &mut ctx,
        reserve,
        &mut position,
        &mut balance,
        &h.debt,
        EncryptedAmount::new(handle, &proof),
    )
    .unwrap();

    assert_eq!(outcome.settlement.user, user);
    assert_eq!(outcome.settlement.asset, h.debt);
    assert!(h.fhe.is_transiently_allowed(outcome.settlement.amount, &token_program));
    assert!(!h.fhe.is_allowed(outcome.settlement.amount, &token_program));
}

// ============================================================================
// Borrow / Repay
// ============================================================================

#[test]
fn liquidity_wins_over_higher_borrow_cap() {
    let mut h = Harness::new();
    h.configure(h.debt, |c| c.borrow_cap = 50_000);
    h.seed_liquidity(h.debt, 50);
    let user = h.borrower(10_000, 0);

    assert_eq!(h.borrow(user, h.debt, 500).unwrap(), 50);
    assert_eq!(h.liquidity(h.debt), 0);
}

#[test]
fn borrow_cap_wins_over_higher_liquidity() {
    let mut h = Harness::new();
    h.configure(h.debt, |c| c.borrow_cap = 50);
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(10_000, 0);

    assert_eq!(h.borrow(user, h.debt, 500).unwrap(), 50);
    assert_eq!(h.liquidity(h.debt), 950);
}

#[test]
fn exhausted_borrow_cap_yields_zero() {
    let mut h = Harness::new();
    h.configure(h.debt, |c| c.borrow_cap = 50);
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(10_000, 50);

    assert_eq!(h.borrow(user, h.debt, 1).unwrap(), 0);
    assert_eq!(h.borrow(user, h.debt, 1_000).unwrap(), 0);
    assert_eq!(h.borrowed(user, h.debt), 50);
}

#[test]
fn full_repay_restores_state() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(10_000, 400);
    assert_eq!(h.positions[&user].debt_asset(), Some(h.debt));

    assert_eq!(h.repay(user, h.debt, 400, true).unwrap(), 400);

    assert_eq!(h.borrowed(user, h.debt), 0);
    assert_eq!(h.liquidity(h.debt), 1_000);
    assert_eq!(h.positions[&user].debt_asset(), None);
}

#[test]
fn repay_without_debt_is_a_no_op() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = Pubkey::new_unique();

    assert_eq!(h.repay(user, h.debt, 300, false).unwrap(), 0);
    assert_eq!(h.borrowed(user, h.debt), 0);
    assert_eq!(h.liquidity(h.debt), 1_000);
}

#[test]
fn overpayment_only_credits_absorbed_debt() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(10_000, 100);

    assert_eq!(h.repay(user, h.debt, 250, true).unwrap(), 100);
    assert_eq!(h.borrowed(user, h.debt), 0);
    assert_eq!(h.liquidity(h.debt), 1_000);
}

#[test]
fn partial_repay_keeps_debt_asset() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(10_000, 100);

    h.repay(user, h.debt, 40, false).unwrap();
    assert_eq!(h.borrowed(user, h.debt), 60);
    assert_eq!(h.positions[&user].debt_asset(), Some(h.debt));
}

#[test]
fn borrow_requires_enabled_collateral() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = Pubkey::new_unique();
    h.supply(user, h.collateral, 1_000).unwrap();

    assert_error(h.borrow(user, h.debt, 10), LendingError::NoCollateralEnabled);
}

#[test]
fn single_debt_asset_per_position() {
    let mut h = Harness::new();
    let other = Pubkey::new_unique();
    h.list(other, fixtures::open_config());
    h.seed_liquidity(h.debt, 1_000);
    h.seed_liquidity(other, 1_000);
    let user = h.borrower(10_000, 100);

    assert_error(h.borrow(user, other, 10), LendingError::MultipleDebtsNotAllowed);
    assert_error(h.repay(user, other, 10, true), LendingError::InvalidDebtRepayment);
    assert_eq!(h.positions[&user].debt_asset(), Some(h.debt));

    h.repay(user, h.debt, 100, true).unwrap();
    assert_eq!(h.borrow(user, other, 10).unwrap(), 10);
    assert_eq!(h.positions[&user].debt_asset(), Some(other));
}

#[test]
fn borrowing_disabled_reserve_rejects_borrow() {
    let mut h = Harness::new();
    h.seed_liquidity(h.collateral, 1_000);
    let user = h.borrower(1_000, 0);
    assert_error(h.borrow(user, h.collateral, 10), LendingError::BorrowingNotEnabled);
}

#[test]
fn reserve_pause_blocks_borrow_but_not_repay() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(10_000, 100);
    h.configure(h.debt, |c| c.paused = true);

    assert_error(h.borrow(user, h.debt, 10), LendingError::ReservePaused);
    assert_error(h.supply(user, h.debt, 10), LendingError::ReservePaused);
    assert_eq!(h.repay(user, h.debt, 100, true).unwrap(), 100);
}

// ============================================================================
// Collateral
// ============================================================================

#[test]
fn only_designated_collateral_can_be_toggled() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();

    // The debt reserve is not collateral; a second collateral-flagged reserve
    // is still not the designated one
    let flagged = Pubkey::new_unique();
    h.list(flagged, ReserveConfig { is_collateral: true, ..fixtures::open_config() });

    for asset in [h.debt, flagged] {
        for enabled in [true, false] {
            assert_error(
                h.toggle_collateral(user, asset, enabled),
                LendingError::NotTheDesignatedCollateral,
            );
        }
    }

    h.toggle_collateral(user, h.collateral, true).unwrap();
    assert!(h.positions[&user].collateral_enabled);
    assert!(h.positions[&user].initialized);
}

#[test]
fn collateral_cannot_be_disabled_under_debt() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 100);

    assert_error(h.toggle_collateral(user, h.collateral, false), LendingError::CollateralInUse);

    h.repay(user, h.debt, 100, true).unwrap();
    h.toggle_collateral(user, h.collateral, false).unwrap();
    assert!(!h.positions[&user].collateral_enabled);
}

// ============================================================================
// Solvency gate
// ============================================================================

#[test]
fn unsafe_collateral_withdrawal_is_rejected_whole() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    // 75% factor: 1000 collateral supports 750 of debt
    let user = h.borrower(1_000, 700);

    assert_eq!(h.withdraw(user, h.collateral, 1_000).unwrap(), 0);
    assert_eq!(h.supplied(user, h.collateral), 1_000);

    // Trimming to a safe 50 is not attempted: 100 is all-or-nothing
    assert_eq!(h.withdraw(user, h.collateral, 100).unwrap(), 0);
    assert_eq!(h.supplied(user, h.collateral), 1_000);
}

#[test]
fn safe_collateral_withdrawal_goes_through() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 700);

    assert_eq!(h.withdraw(user, h.collateral, 50).unwrap(), 50);
    assert_eq!(h.supplied(user, h.collateral), 950);
}

#[test]
fn gate_follows_prices() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 700);

    // Collateral doubles in value: 500 remaining * 2 * 0.75 = 750 >= 700
    h.prices.insert(h.collateral, 2 * PRICE_ONE_DOLLAR);
    assert_eq!(h.withdraw(user, h.collateral, 500).unwrap(), 500);
}

#[test]
fn zero_price_is_rejected_before_encrypted_work() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 100);

    h.prices.insert(h.debt, 0);
    assert_error(h.withdraw(user, h.collateral, 10), LendingError::OraclePriceZero);
    assert_eq!(h.supplied(user, h.collateral), 1_000);
}

#[test]
fn gate_requires_matching_debt_snapshot() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 100);

    assert_error(
        h.withdraw_with(user, h.collateral, 10, None),
        LendingError::InvalidDebtAccount,
    );
    let wrong = DebtSnapshot {
        asset: h.collateral,
        borrowed: Euint64::UNINITIALIZED,
        decimals: 6,
    };
    assert_error(
        h.withdraw_with(user, h.collateral, 10, Some(wrong)),
        LendingError::InvalidDebtAccount,
    );
}

#[test]
fn non_collateral_withdrawals_skip_the_gate() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 700);
    h.supply(user, h.debt, 300).unwrap();

    h.prices.insert(h.collateral, 0);
    assert_eq!(h.withdraw(user, h.debt, 300).unwrap(), 300);
}

// ============================================================================
// Pause
// ============================================================================

#[test]
fn pause_blocks_every_user_operation_and_unpause_restores() {
    let mut h = Harness::new();
    h.seed_liquidity(h.debt, 1_000);
    let user = h.borrower(1_000, 100);

    let auth = AuthorizationContext { caller: h.admin, roles: &h.roles };
    pause(&auth, &mut h.protocol).unwrap();

    assert_error(h.supply(user, h.debt, 10), LendingError::ProtocolPaused);
    assert_error(h.withdraw(user, h.debt, 10), LendingError::ProtocolPaused);
    assert_error(h.borrow(user, h.debt, 10), LendingError::ProtocolPaused);
    assert_error(h.repay(user, h.debt, 10, false), LendingError::ProtocolPaused);
    assert_error(h.toggle_collateral(user, h.collateral, true), LendingError::ProtocolPaused);

    let auth = AuthorizationContext { caller: h.admin, roles: &h.roles };
    unpause(&auth, &mut h.protocol).unwrap();

    assert_eq!(h.supply(user, h.debt, 10).unwrap(), 10);
    assert_eq!(h.withdraw(user, h.debt, 10).unwrap(), 10);
    assert_eq!(h.borrow(user, h.debt, 10).unwrap(), 10);
    assert_eq!(h.repay(user, h.debt, 10, false).unwrap(), 10);
    h.toggle_collateral(user, h.collateral, true).unwrap();
}

#[test]
fn pause_checked_before_reserve_checks() {
    let mut h = Harness::new();
    let auth = AuthorizationContext { caller: h.admin, roles: &h.roles };
    pause(&auth, &mut h.protocol).unwrap();

    assert_error(
        h.supply(Pubkey::new_unique(), Pubkey::new_unique(), 1),
        LendingError::ProtocolPaused,
    );
}
