pub mod admin;
pub mod borrow;
pub mod collateral;
pub mod configurator;
pub mod initialize;
pub mod repay;
pub mod supply;
pub mod user_operation;
pub mod views;
pub mod withdraw;

pub use admin::*;
pub use borrow::*;
pub use collateral::*;
pub use configurator::*;
pub use initialize::*;
pub use repay::*;
pub use supply::*;
pub use user_operation::*;
pub use views::*;
pub use withdraw::*;
