use anchor_lang::prelude::*;

#[error_code]
pub enum LendingError {
    #[msg("Address must not be zero")]
    ZeroAddress,

    #[msg("Reserve is not active")]
    ReserveNotActive,

    #[msg("Reserve is not initialized")]
    ReserveNotInitialized,

    #[msg("Reserve is already initialized")]
    ReserveAlreadyInitialized,

    #[msg("Reserve is paused")]
    ReservePaused,

    #[msg("Borrowing is not enabled on this reserve")]
    BorrowingNotEnabled,

    #[msg("Protocol is paused")]
    ProtocolPaused,

    #[msg("Protocol is already paused")]
    ProtocolAlreadyPaused,

    #[msg("Protocol is not paused")]
    ProtocolNotPaused,

    #[msg("Caller is not a pool admin")]
    OnlyPoolAdmin,

    #[msg("Caller is not an emergency admin")]
    OnlyEmergencyAdmin,

    #[msg("Caller is not the pool configurator")]
    OnlyPoolConfigurator,

    #[msg("No collateral enabled for this position")]
    NoCollateralEnabled,

    #[msg("Oracle price is zero or unavailable")]
    OraclePriceZero,

    #[msg("Position already carries debt in another asset")]
    MultipleDebtsNotAllowed,

    #[msg("Asset is not the designated collateral asset")]
    NotTheDesignatedCollateral,

    #[msg("Reserve is not usable as collateral")]
    ReserveNotCollateral,

    #[msg("Repayment does not match the position's debt asset")]
    InvalidDebtRepayment,

    #[msg("Collateral cannot be disabled while debt is outstanding")]
    CollateralInUse,

    #[msg("Invalid collateral factor (must be <= 10000 bps)")]
    InvalidCollateralFactor,

    #[msg("Reserve list is full")]
    TooManyReserves,

    #[msg("Encrypted input proof verification failed")]
    InvalidInputProof,

    #[msg("Price feed account does not match reserve")]
    InvalidPriceFeed,

    #[msg("Debt accounts missing or do not match the position")]
    InvalidDebtAccount,

    #[msg("Token account does not match reserve")]
    InvalidTokenAccount,

    #[msg("Role list is full")]
    RoleListFull,

    #[msg("Unauthorized access")]
    Unauthorized,
}
