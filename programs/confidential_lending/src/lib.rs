use anchor_lang::prelude::*;

pub mod engine;
pub mod error;
pub mod events;
pub mod fhe;
pub mod instructions;
pub mod lending;
pub mod oracle;
pub mod settlement;
pub mod state;

use instructions::*;

declare_id!("FUyKXK5UdB1ZK4YF6tETfNKwDn8X9h51V6U6dqVhBeVT");

#[program]
pub mod confidential_lending {
    use super::*;

    /// Create the lending pool and role store; the signer becomes owner
    pub fn initialize(ctx: Context<Initialize>, settings: lending::PoolSettings) -> Result<()> {
        instructions::initialize::initialize_handler(ctx, settings)
    }

    // ========================================================================
    // Roles and protocol administration
    // ========================================================================

    pub fn grant_role(ctx: Context<ManageRoles>, role: state::Role, account: Pubkey) -> Result<()> {
        instructions::admin::grant_role_handler(ctx, role, account)
    }

    pub fn revoke_role(
        ctx: Context<ManageRoles>,
        role: state::Role,
        account: Pubkey,
    ) -> Result<()> {
        instructions::admin::revoke_role_handler(ctx, role, account)
    }

    /// Halt every user operation (emergency admin)
    pub fn pause(ctx: Context<ProtocolAdmin>) -> Result<()> {
        instructions::admin::pause_handler(ctx)
    }

    /// Resume user operations (emergency admin)
    pub fn unpause(ctx: Context<ProtocolAdmin>) -> Result<()> {
        instructions::admin::unpause_handler(ctx)
    }

    pub fn set_configurator(ctx: Context<ProtocolAdmin>, configurator: Pubkey) -> Result<()> {
        instructions::admin::set_configurator_handler(ctx, configurator)
    }

    pub fn set_price_oracle(ctx: Context<ProtocolAdmin>, price_oracle: Pubkey) -> Result<()> {
        instructions::admin::set_price_oracle_handler(ctx, price_oracle)
    }

    pub fn set_input_verifier(ctx: Context<ProtocolAdmin>, input_verifier: Pubkey) -> Result<()> {
        instructions::admin::set_input_verifier_handler(ctx, input_verifier)
    }

    /// Designate the single asset users may enable as collateral
    pub fn set_collateral_asset(ctx: Context<SetCollateralAsset>, asset: Pubkey) -> Result<()> {
        instructions::admin::set_collateral_asset_handler(ctx, asset)
    }

    // ========================================================================
    // Reserve configuration (pool configurator)
    // ========================================================================

    /// List a new reserve with encrypted-zero totals
    pub fn init_reserve(ctx: Context<InitReserve>, config: state::ReserveConfig) -> Result<()> {
        instructions::configurator::init_reserve_handler(ctx, config)
    }

    pub fn set_reserve_active(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        active: bool,
    ) -> Result<()> {
        instructions::configurator::set_reserve_active_handler(ctx, asset, active)
    }

    pub fn set_reserve_paused(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        paused: bool,
    ) -> Result<()> {
        instructions::configurator::set_reserve_paused_handler(ctx, asset, paused)
    }

    pub fn set_reserve_borrowing_enabled(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        enabled: bool,
    ) -> Result<()> {
        instructions::configurator::set_reserve_borrowing_enabled_handler(ctx, asset, enabled)
    }

    pub fn set_reserve_collateral_factor(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        collateral_factor_bps: u16,
    ) -> Result<()> {
        instructions::configurator::set_reserve_collateral_factor_handler(
            ctx,
            asset,
            collateral_factor_bps,
        )
    }

    pub fn set_reserve_supply_cap(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        supply_cap: u64,
    ) -> Result<()> {
        instructions::configurator::set_reserve_supply_cap_handler(ctx, asset, supply_cap)
    }

    pub fn set_reserve_borrow_cap(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        borrow_cap: u64,
    ) -> Result<()> {
        instructions::configurator::set_reserve_borrow_cap_handler(ctx, asset, borrow_cap)
    }

    /// Replace a reserve's whole configuration at once
    pub fn update_reserve_config(
        ctx: Context<ConfigureReserve>,
        asset: Pubkey,
        config: state::ReserveConfig,
    ) -> Result<()> {
        instructions::configurator::update_reserve_config_handler(ctx, asset, config)
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Deposit an encrypted amount into a reserve
    pub fn supply(
        ctx: Context<UserOperation>,
        asset: Pubkey,
        amount: fhe::ExternalEuint64,
        proof: Vec<u8>,
    ) -> Result<()> {
        instructions::supply::supply_handler(ctx, asset, amount, proof)
    }

    /// Withdraw up to the encrypted amount; gated by solvency while in debt
    pub fn withdraw(
        ctx: Context<WithdrawOperation>,
        asset: Pubkey,
        amount: fhe::ExternalEuint64,
        proof: Vec<u8>,
    ) -> Result<()> {
        instructions::withdraw::withdraw_handler(ctx, asset, amount, proof)
    }

    /// Borrow against the designated collateral
    pub fn borrow(
        ctx: Context<UserOperation>,
        asset: Pubkey,
        amount: fhe::ExternalEuint64,
        proof: Vec<u8>,
    ) -> Result<()> {
        instructions::borrow::borrow_handler(ctx, asset, amount, proof)
    }

    /// Repay debt; `repaying_all` clears the position's debt asset
    pub fn repay(
        ctx: Context<UserOperation>,
        asset: Pubkey,
        amount: fhe::ExternalEuint64,
        proof: Vec<u8>,
        repaying_all: bool,
    ) -> Result<()> {
        instructions::repay::repay_handler(ctx, asset, amount, proof, repaying_all)
    }

    pub fn set_user_use_reserve_as_collateral(
        ctx: Context<SetUserCollateral>,
        asset: Pubkey,
        enabled: bool,
    ) -> Result<()> {
        instructions::collateral::set_user_use_reserve_as_collateral_handler(ctx, asset, enabled)
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn get_reserve_data(
        ctx: Context<GetReserveData>,
        asset: Pubkey,
    ) -> Result<state::ReserveData> {
        instructions::views::get_reserve_data_handler(ctx, asset)
    }

    pub fn get_reserve_list(ctx: Context<GetReserveList>) -> Result<Vec<Pubkey>> {
        instructions::views::get_reserve_list_handler(ctx)
    }

    pub fn get_user_position(
        ctx: Context<GetUserPosition>,
        user: Pubkey,
    ) -> Result<state::UserPositionData> {
        instructions::views::get_user_position_handler(ctx, user)
    }

    pub fn get_user_supplied_balance(
        ctx: Context<GetUserBalance>,
        user: Pubkey,
        asset: Pubkey,
    ) -> Result<fhe::Euint64> {
        instructions::views::get_user_supplied_balance_handler(ctx, user, asset)
    }

    pub fn get_user_borrowed_balance(
        ctx: Context<GetUserBalance>,
        user: Pubkey,
        asset: Pubkey,
    ) -> Result<fhe::Euint64> {
        instructions::views::get_user_borrowed_balance_handler(ctx, user, asset)
    }
}
