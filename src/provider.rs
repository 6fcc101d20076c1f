//! Market Data Provider
//!
//! Trait boundary for the external market data feed. The engine calls it
//! only during explicit refresh tasks; everything else runs against the
//! in-memory store. Implementations wrap broker/exchange REST clients and
//! live outside this crate.

use crate::error::Result;
use crate::types::{Greeks, OptionKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A single row of an option chain.
#[derive(Debug, Clone)]
pub struct OptionQuote {
    pub symbol: String,
    pub strike_price: f64,
    pub expiry_date: DateTime<Utc>,
    pub kind: OptionKind,
    pub last_price: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
    pub greeks: Greeks,
}

/// External source of prices and option analytics.
///
/// `current_price` and `greeks` back the refresh tasks; the remaining
/// lookups are exposed for callers building richer analytics on top.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest traded price for a symbol on an exchange.
    async fn current_price(&self, symbol: &str, exchange: &str) -> Result<f64>;

    /// Current Greeks for a specific option contract.
    async fn greeks(
        &self,
        symbol: &str,
        exchange: &str,
        strike_price: f64,
        expiry_date: DateTime<Utc>,
        kind: OptionKind,
    ) -> Result<Greeks>;

    /// Historical close prices over a date range at the given interval
    /// (e.g. "1d", "1h").
    async fn historical_prices(
        &self,
        symbol: &str,
        exchange: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &str,
    ) -> Result<Vec<(DateTime<Utc>, f64)>>;

    /// Full option chain for an underlying at an expiry.
    async fn option_chain(
        &self,
        symbol: &str,
        exchange: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<Vec<OptionQuote>>;

    /// Current values of the major market indices.
    async fn market_indices(&self) -> Result<HashMap<String, f64>>;

    /// Current volatility index value for an underlying.
    async fn volatility_index(&self, symbol: &str) -> Result<f64>;
}
