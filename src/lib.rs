//! Vantage - In-memory portfolio analytics engine
//!
//! Stores trading portfolios and positions, computes performance and risk
//! metrics on demand with TTL caching, and runs a bounded-queue worker pool
//! for asynchronous metric and market-data refresh tasks.

pub mod config;
pub mod error;
pub mod provider;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{AnalyticsError, Result};
pub use provider::{MarketDataProvider, OptionQuote};
pub use services::{AnalyticsEngine, PortfolioStore};
pub use types::*;
