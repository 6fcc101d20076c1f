//! Metric Types
//!
//! Derived performance and risk snapshots. A number of fields are declared
//! but not yet populated by the calculator (marked "not yet computed"); they
//! are kept so stored/serialized snapshots have a stable shape once the
//! richer models land.

use crate::types::OptionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Asset class bucket used for exposure aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Options,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Equity => write!(f, "equity"),
            AssetClass::Options => write!(f, "options"),
        }
    }
}

/// Point-in-time performance snapshot for a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Realized + unrealized, always.
    pub total_pnl: f64,
    /// PnL from closed positions.
    pub realized_pnl: f64,
    /// PnL from open positions at current price.
    pub unrealized_pnl: f64,
    /// Total PnL over total invested capital, in percent.
    pub pnl_percentage: f64,
    /// Winning closed trades over all closed trades, in percent.
    pub win_rate: f64,
    /// Gross wins over gross losses. 0 when there are no losing trades,
    /// which makes an all-wins portfolio indistinguishable from an empty
    /// one; kept until product intent says otherwise.
    pub profit_factor: f64,
    pub average_win: f64,
    pub average_loss: f64,
    /// Mirrors `pnl_percentage` until capital tracking is separated out.
    pub return_on_capital: f64,
    // Not yet computed: require a historical return series.
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub expectancy_ratio: f64,
    #[serde(default)]
    pub daily_pnl: HashMap<String, f64>,
    #[serde(default)]
    pub cumulative_pnl: HashMap<String, f64>,
    #[serde(default)]
    pub rolling_performance: HashMap<String, f64>,
    #[serde(default)]
    pub performance_by_symbol: HashMap<String, f64>,
    /// Computation time; drives cache freshness.
    pub updated_at: DateTime<Utc>,
}

impl PerformanceMetrics {
    /// An all-zero snapshot stamped now.
    pub fn empty() -> Self {
        Self {
            total_pnl: 0.0,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            pnl_percentage: 0.0,
            win_rate: 0.0,
            profit_factor: 0.0,
            average_win: 0.0,
            average_loss: 0.0,
            return_on_capital: 0.0,
            cagr: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            max_drawdown: 0.0,
            expectancy_ratio: 0.0,
            daily_pnl: HashMap::new(),
            cumulative_pnl: HashMap::new(),
            rolling_performance: HashMap::new(),
            performance_by_symbol: HashMap::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Point-in-time risk snapshot for a portfolio. Only open positions
/// contribute; Greek exposures only accumulate for option positions whose
/// Greeks have been refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub delta_exposure: f64,
    pub gamma_exposure: f64,
    pub theta_exposure: f64,
    pub vega_exposure: f64,
    pub rho_exposure: f64,
    /// Value by asset class (equity vs options).
    #[serde(default)]
    pub asset_class_exposure: HashMap<AssetClass, f64>,
    /// Value by option kind (CE/PE).
    #[serde(default)]
    pub option_exposure: HashMap<OptionKind, f64>,
    /// Always keyed "Unknown" — no sector reference data is wired in yet.
    #[serde(default)]
    pub sector_exposure: HashMap<String, f64>,
    // Not yet computed: require return history and market reference data.
    pub value_at_risk: f64,
    pub conditional_var: f64,
    pub beta_to_market: f64,
    pub portfolio_volatility: f64,
    pub concentration_risk: f64,
    pub liquidity_risk: f64,
    #[serde(default)]
    pub correlation_matrix: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub stress_test_results: HashMap<String, f64>,
    /// Computation time; drives cache freshness.
    pub updated_at: DateTime<Utc>,
}

impl RiskMetrics {
    /// An all-zero snapshot stamped now.
    pub fn empty() -> Self {
        Self {
            delta_exposure: 0.0,
            gamma_exposure: 0.0,
            theta_exposure: 0.0,
            vega_exposure: 0.0,
            rho_exposure: 0.0,
            asset_class_exposure: HashMap::new(),
            option_exposure: HashMap::new(),
            sector_exposure: HashMap::new(),
            value_at_risk: 0.0,
            conditional_var: 0.0,
            beta_to_market: 0.0,
            portfolio_volatility: 0.0,
            concentration_risk: 0.0,
            liquidity_risk: 0.0,
            correlation_matrix: HashMap::new(),
            stress_test_results: HashMap::new(),
            updated_at: Utc::now(),
        }
    }
}
