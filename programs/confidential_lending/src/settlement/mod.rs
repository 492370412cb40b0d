//! Settlement of encrypted amounts through the confidential token program
//!
//! State is committed before any of these CPIs is issued.

pub mod confidential_token;
pub mod types;

pub use confidential_token::*;
pub use types::*;
