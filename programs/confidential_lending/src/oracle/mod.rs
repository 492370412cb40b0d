//! Price oracle
//!
//! Prices are plaintext and normalised to 6 decimals. A price of zero means
//! "unavailable"; the lending logic rejects it before any encrypted work.
//!
//! Reference: https://docs.pyth.network/price-feeds/solana

use anchor_lang::prelude::*;
use pyth_sdk_solana::state::SolanaPriceAccount;

/// Maximum age for price data
#[cfg(feature = "devnet")]
pub const MAX_PRICE_AGE_SECS: u64 = 3600; // 1 hour for devnet

#[cfg(not(feature = "devnet"))]
pub const MAX_PRICE_AGE_SECS: u64 = 120; // 2 minutes for mainnet

/// Internal price precision
pub const INTERNAL_PRICE_DECIMALS: u32 = 6;

pub trait PriceOracle {
    /// Price of `asset` in 6 decimals, or 0 if unavailable
    fn price(&self, asset: &Pubkey) -> u64;
}

/// Pyth price accounts supplied with the instruction, keyed by reserve asset
pub struct PythPriceOracle<'a, 'info> {
    feeds: Vec<(Pubkey, &'a AccountInfo<'info>)>,
    now: i64,
}

impl<'a, 'info> PythPriceOracle<'a, 'info> {
    pub fn new(now: i64) -> Self {
        Self {
            feeds: Vec::new(),
            now,
        }
    }

    pub fn with_feed(mut self, asset: Pubkey, feed: &'a AccountInfo<'info>) -> Self {
        self.feeds.push((asset, feed));
        self
    }
}

impl PriceOracle for PythPriceOracle<'_, '_> {
    fn price(&self, asset: &Pubkey) -> u64 {
        self.feeds
            .iter()
            .find(|(feed_asset, _)| feed_asset == asset)
            .and_then(|(_, feed)| read_pyth_price(feed, self.now, MAX_PRICE_AGE_SECS))
            .unwrap_or(0)
    }
}

/// Read a Pyth price account, None if unparsable, stale or non-positive
pub fn read_pyth_price(price_feed: &AccountInfo, now: i64, max_age: u64) -> Option<u64> {
    let feed = SolanaPriceAccount::account_info_to_feed(price_feed).ok()?;
    let price = feed.get_price_no_older_than(now, max_age)?;
    let normalized = normalize_price(price.price, price.expo);

    #[cfg(feature = "debug")]
    msg!("Pyth price {}: {} (6 decimals)", price_feed.key(), normalized);

    (normalized > 0).then_some(normalized)
}

/// Convert a Pyth `(price, expo)` pair to 6 decimals
///
/// Non-positive prices map to 0. Scaling up saturates.
pub fn normalize_price(price: i64, expo: i32) -> u64 {
    if price <= 0 {
        return 0;
    }
    let price = price as u64;
    // Decimal places carried by the feed (expo is usually negative)
    let decimals = -(expo as i64);
    let target = INTERNAL_PRICE_DECIMALS as i64;

    if decimals > target {
        match 10u64.checked_pow((decimals - target) as u32) {
            Some(divisor) => price / divisor,
            None => 0,
        }
    } else {
        match 10u64.checked_pow((target - decimals) as u32) {
            Some(multiplier) => price.saturating_mul(multiplier),
            None => u64::MAX,
        }
    }
}

#[cfg(test)]
impl PriceOracle for std::collections::BTreeMap<Pubkey, u64> {
    fn price(&self, asset: &Pubkey) -> u64 {
        self.get(asset).copied().unwrap_or(0)
    }
}
