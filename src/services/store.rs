//! Portfolio Store
//!
//! In-memory store of portfolios and their positions, plus the per-portfolio
//! metric caches. Handles:
//! - Portfolio CRUD (add, get, update, delete with cascade)
//! - Position CRUD within a portfolio, including closing a position
//! - Cached performance/risk metrics with TTL freshness
//! - Cache invalidation on every position mutation
//!
//! The portfolio map sits behind one reader/writer lock; the metric caches
//! are `DashMap`s with their own synchronization, so a cache fill on a read
//! path never mutates state guarded by the read lock.

use crate::error::{AnalyticsError, Result};
use crate::services::calculator;
use crate::types::{Greeks, PerformanceMetrics, Portfolio, Position, RiskMetrics};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;

/// Thread-safe store of portfolios with cached derived metrics.
pub struct PortfolioStore {
    /// Portfolios keyed by ID. Positions live inside their portfolio.
    portfolios: RwLock<HashMap<String, Portfolio>>,
    /// Cached performance snapshots keyed by portfolio ID.
    performance_cache: DashMap<String, PerformanceMetrics>,
    /// Cached risk snapshots keyed by portfolio ID.
    risk_cache: DashMap<String, RiskMetrics>,
    /// Freshness window for cached snapshots.
    cache_ttl: chrono::Duration,
}

impl PortfolioStore {
    /// Create a store whose cached metrics stay fresh for `cache_ttl`.
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            portfolios: RwLock::new(HashMap::new()),
            performance_cache: DashMap::new(),
            risk_cache: DashMap::new(),
            cache_ttl: chrono::Duration::from_std(cache_ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
        }
    }

    fn is_fresh(&self, updated_at: DateTime<Utc>) -> bool {
        updated_at > Utc::now() - self.cache_ttl
    }

    // ==========================================================================
    // Portfolio operations
    // ==========================================================================

    /// Add a new portfolio. Positions it carries are indexed with it.
    pub fn add_portfolio(&self, mut portfolio: Portfolio) -> Result<()> {
        if portfolio.id.is_empty() {
            return Err(AnalyticsError::InvalidArgument(
                "portfolio ID cannot be empty".to_string(),
            ));
        }

        let mut portfolios = self.portfolios.write().unwrap();
        if portfolios.contains_key(&portfolio.id) {
            return Err(AnalyticsError::AlreadyExists(portfolio.id));
        }

        for position in &mut portfolio.positions {
            position.portfolio_id = portfolio.id.clone();
        }

        debug!(portfolio_id = %portfolio.id, "adding portfolio");
        portfolios.insert(portfolio.id.clone(), portfolio);
        Ok(())
    }

    /// Get a snapshot of a portfolio by ID.
    pub fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        let portfolios = self.portfolios.read().unwrap();
        portfolios
            .get(portfolio_id)
            .cloned()
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))
    }

    /// List snapshots of all portfolios belonging to a user.
    pub fn list_portfolios(&self, user_id: &str) -> Vec<Portfolio> {
        let portfolios = self.portfolios.read().unwrap();
        portfolios
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Replace an existing portfolio wholesale.
    pub fn update_portfolio(&self, mut portfolio: Portfolio) -> Result<()> {
        if portfolio.id.is_empty() {
            return Err(AnalyticsError::InvalidArgument(
                "portfolio ID cannot be empty".to_string(),
            ));
        }

        let mut portfolios = self.portfolios.write().unwrap();
        if !portfolios.contains_key(&portfolio.id) {
            return Err(AnalyticsError::PortfolioNotFound(portfolio.id));
        }

        for position in &mut portfolio.positions {
            position.portfolio_id = portfolio.id.clone();
        }

        portfolios.insert(portfolio.id.clone(), portfolio);
        Ok(())
    }

    /// Delete a portfolio. Cascades: its positions and any cached metrics
    /// go with it, irreversibly.
    pub fn delete_portfolio(&self, portfolio_id: &str) -> Result<()> {
        let mut portfolios = self.portfolios.write().unwrap();
        if portfolios.remove(portfolio_id).is_none() {
            return Err(AnalyticsError::PortfolioNotFound(portfolio_id.to_string()));
        }
        drop(portfolios);

        debug!(portfolio_id, "deleted portfolio");
        self.invalidate(portfolio_id);
        Ok(())
    }

    // ==========================================================================
    // Position operations
    // ==========================================================================

    /// Append a position to a portfolio. The position's `portfolio_id` is
    /// stamped by the store.
    pub fn add_position(&self, portfolio_id: &str, mut position: Position) -> Result<()> {
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;

        position.portfolio_id = portfolio_id.to_string();
        debug!(portfolio_id, position_id = %position.id, symbol = %position.symbol, "adding position");
        portfolio.positions.push(position);
        drop(portfolios);

        self.invalidate(portfolio_id);
        Ok(())
    }

    /// Replace a position in place, located via its own `portfolio_id`.
    pub fn update_position(&self, position: Position) -> Result<()> {
        let portfolio_id = position.portfolio_id.clone();
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(&portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.clone()))?;

        let slot = portfolio
            .positions
            .iter_mut()
            .find(|p| p.id == position.id)
            .ok_or_else(|| AnalyticsError::PositionNotFound {
                portfolio_id: portfolio_id.clone(),
                position_id: position.id.clone(),
            })?;
        *slot = position;
        drop(portfolios);

        self.invalidate(&portfolio_id);
        Ok(())
    }

    /// Remove a position from a portfolio.
    pub fn delete_position(&self, portfolio_id: &str, position_id: &str) -> Result<()> {
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;

        let before = portfolio.positions.len();
        portfolio.positions.retain(|p| p.id != position_id);
        if portfolio.positions.len() == before {
            return Err(AnalyticsError::PositionNotFound {
                portfolio_id: portfolio_id.to_string(),
                position_id: position_id.to_string(),
            });
        }
        drop(portfolios);

        debug!(portfolio_id, position_id, "deleted position");
        self.invalidate(portfolio_id);
        Ok(())
    }

    /// Close an open position, setting its exit price and time together.
    pub fn close_position(
        &self,
        portfolio_id: &str,
        position_id: &str,
        exit_price: f64,
        exit_time: DateTime<Utc>,
    ) -> Result<()> {
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;

        let position = portfolio
            .positions
            .iter_mut()
            .find(|p| p.id == position_id)
            .ok_or_else(|| AnalyticsError::PositionNotFound {
                portfolio_id: portfolio_id.to_string(),
                position_id: position_id.to_string(),
            })?;
        position.close(exit_price, exit_time);
        drop(portfolios);

        debug!(portfolio_id, position_id, exit_price, "closed position");
        self.invalidate(portfolio_id);
        Ok(())
    }

    /// Snapshots of a portfolio's open positions, for refresh passes.
    pub fn open_positions(&self, portfolio_id: &str) -> Result<Vec<Position>> {
        let portfolios = self.portfolios.read().unwrap();
        let portfolio = portfolios
            .get(portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;
        Ok(portfolio
            .positions
            .iter()
            .filter(|p| !p.is_closed())
            .cloned()
            .collect())
    }

    /// Write refreshed prices into a portfolio's positions and evict both
    /// metric caches. Positions deleted since the snapshot are skipped.
    pub fn apply_prices(&self, portfolio_id: &str, updates: &[(String, f64)]) -> Result<()> {
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;

        for (position_id, price) in updates {
            if let Some(position) = portfolio.positions.iter_mut().find(|p| &p.id == position_id) {
                position.current_price = *price;
            }
        }
        drop(portfolios);

        self.invalidate(portfolio_id);
        Ok(())
    }

    /// Write refreshed Greeks into a portfolio's positions and evict the
    /// risk cache. Performance metrics do not depend on Greeks, so the
    /// performance cache is left alone.
    pub fn apply_greeks(&self, portfolio_id: &str, updates: &[(String, Greeks)]) -> Result<()> {
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;

        for (position_id, greeks) in updates {
            if let Some(position) = portfolio.positions.iter_mut().find(|p| &p.id == position_id) {
                position.greeks = Some(*greeks);
            }
        }
        drop(portfolios);

        self.invalidate_risk(portfolio_id);
        Ok(())
    }

    // ==========================================================================
    // Metrics
    // ==========================================================================

    /// Performance metrics for a portfolio, served from cache while fresh.
    pub fn performance_metrics(&self, portfolio_id: &str) -> Result<PerformanceMetrics> {
        if let Some(cached) = self.performance_cache.get(portfolio_id) {
            if self.is_fresh(cached.updated_at) {
                debug!(portfolio_id, "performance cache hit");
                return Ok(cached.clone());
            }
        }

        let metrics = {
            let portfolios = self.portfolios.read().unwrap();
            let portfolio = portfolios
                .get(portfolio_id)
                .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;
            calculator::performance(&portfolio.positions)
        };

        self.performance_cache
            .insert(portfolio_id.to_string(), metrics.clone());
        Ok(metrics)
    }

    /// Risk metrics for a portfolio, served from cache while fresh.
    pub fn risk_metrics(&self, portfolio_id: &str) -> Result<RiskMetrics> {
        if let Some(cached) = self.risk_cache.get(portfolio_id) {
            if self.is_fresh(cached.updated_at) {
                debug!(portfolio_id, "risk cache hit");
                return Ok(cached.clone());
            }
        }

        let metrics = {
            let portfolios = self.portfolios.read().unwrap();
            let portfolio = portfolios
                .get(portfolio_id)
                .ok_or_else(|| AnalyticsError::PortfolioNotFound(portfolio_id.to_string()))?;
            calculator::risk(&portfolio.positions)
        };

        self.risk_cache
            .insert(portfolio_id.to_string(), metrics.clone());
        Ok(metrics)
    }

    /// Evict both cached snapshots for a portfolio.
    pub fn invalidate(&self, portfolio_id: &str) {
        self.performance_cache.remove(portfolio_id);
        self.risk_cache.remove(portfolio_id);
    }

    /// Evict only the cached risk snapshot for a portfolio.
    pub fn invalidate_risk(&self, portfolio_id: &str) {
        self.risk_cache.remove(portfolio_id);
    }
}
