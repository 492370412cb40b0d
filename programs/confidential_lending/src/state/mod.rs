pub mod access_control;
pub mod pool;
pub mod position;
pub mod reserve;
pub mod user_balance;

pub use access_control::*;
pub use pool::*;
pub use position::*;
pub use reserve::*;
pub use user_balance::*;
