//! Unit tests for the portfolio store: CRUD semantics, cache freshness,
//! and invalidation on mutation.

use chrono::Utc;
use std::time::Duration;
use vantage::{AnalyticsError, Portfolio, PortfolioStore, Position, TransactionType};

fn store() -> PortfolioStore {
    PortfolioStore::new(Duration::from_secs(3600))
}

fn portfolio(id: &str) -> Portfolio {
    let mut p = Portfolio::new("user-1", "Test Portfolio");
    p.id = id.to_string();
    p
}

fn open_position(symbol: &str, qty: f64, entry: f64, current: f64) -> Position {
    let mut pos = Position::new(symbol, "NSE", TransactionType::Buy, qty, entry);
    pos.current_price = current;
    pos
}

fn closed_position(symbol: &str, qty: f64, entry: f64, exit: f64) -> Position {
    let mut pos = Position::new(symbol, "NSE", TransactionType::Buy, qty, entry);
    pos.close(exit, Utc::now());
    pos
}

// =============================================================================
// Portfolio CRUD
// =============================================================================

#[test]
fn test_add_portfolio_rejects_empty_id() {
    let store = store();
    let err = store.add_portfolio(portfolio("")).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidArgument(_)));
}

#[test]
fn test_add_portfolio_rejects_duplicate_id() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();

    let mut second = portfolio("p1");
    second.name = "Imposter".to_string();
    let err = store.add_portfolio(second).unwrap_err();
    assert!(matches!(err, AnalyticsError::AlreadyExists(_)));

    // First portfolio untouched.
    assert_eq!(store.get_portfolio("p1").unwrap().name, "Test Portfolio");
}

#[test]
fn test_add_portfolio_stamps_initial_positions() {
    let store = store();
    let mut p = portfolio("p1");
    p.positions.push(open_position("RELIANCE", 10.0, 100.0, 100.0));
    store.add_portfolio(p).unwrap();

    let fetched = store.get_portfolio("p1").unwrap();
    assert_eq!(fetched.positions[0].portfolio_id, "p1");
}

#[test]
fn test_get_portfolio_missing() {
    let err = store().get_portfolio("nope").unwrap_err();
    assert!(matches!(err, AnalyticsError::PortfolioNotFound(_)));
}

#[test]
fn test_update_portfolio_missing() {
    let err = store().update_portfolio(portfolio("nope")).unwrap_err();
    assert!(matches!(err, AnalyticsError::PortfolioNotFound(_)));
}

#[test]
fn test_update_portfolio_replaces() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();

    let mut updated = portfolio("p1");
    updated.name = "Renamed".to_string();
    store.update_portfolio(updated).unwrap();

    assert_eq!(store.get_portfolio("p1").unwrap().name, "Renamed");
}

#[test]
fn test_delete_portfolio_cascades() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    store
        .add_position("p1", closed_position("INFY", 10.0, 100.0, 110.0))
        .unwrap();

    // Warm both caches, then delete.
    store.performance_metrics("p1").unwrap();
    store.risk_metrics("p1").unwrap();
    store.delete_portfolio("p1").unwrap();

    assert!(matches!(
        store.get_portfolio("p1").unwrap_err(),
        AnalyticsError::PortfolioNotFound(_)
    ));
    assert!(matches!(
        store.performance_metrics("p1").unwrap_err(),
        AnalyticsError::PortfolioNotFound(_)
    ));
    assert!(matches!(
        store.risk_metrics("p1").unwrap_err(),
        AnalyticsError::PortfolioNotFound(_)
    ));
}

#[test]
fn test_delete_portfolio_missing() {
    let err = store().delete_portfolio("nope").unwrap_err();
    assert!(matches!(err, AnalyticsError::PortfolioNotFound(_)));
}

#[test]
fn test_list_portfolios_filters_by_user() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    store.add_portfolio(portfolio("p2")).unwrap();

    let mut other = Portfolio::new("user-2", "Other");
    other.id = "p3".to_string();
    store.add_portfolio(other).unwrap();

    assert_eq!(store.list_portfolios("user-1").len(), 2);
    assert_eq!(store.list_portfolios("user-2").len(), 1);
    assert!(store.list_portfolios("user-3").is_empty());
}

// =============================================================================
// Position CRUD
// =============================================================================

#[test]
fn test_add_position_missing_portfolio() {
    let err = store()
        .add_position("nope", open_position("INFY", 1.0, 1.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::PortfolioNotFound(_)));
}

#[test]
fn test_add_position_stamps_portfolio_id() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    store
        .add_position("p1", open_position("INFY", 1.0, 1.0, 1.0))
        .unwrap();

    let fetched = store.get_portfolio("p1").unwrap();
    assert_eq!(fetched.positions.len(), 1);
    assert_eq!(fetched.positions[0].portfolio_id, "p1");
}

#[test]
fn test_update_position_replaces_in_place() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    let pos = open_position("INFY", 1.0, 100.0, 100.0);
    let pos_id = pos.id.clone();
    store.add_position("p1", pos).unwrap();

    let mut updated = store.get_portfolio("p1").unwrap().positions[0].clone();
    updated.current_price = 123.0;
    store.update_position(updated).unwrap();

    let fetched = store.get_portfolio("p1").unwrap();
    assert_eq!(fetched.positions[0].id, pos_id);
    assert_eq!(fetched.positions[0].current_price, 123.0);
}

#[test]
fn test_update_position_missing() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();

    let mut stray = open_position("INFY", 1.0, 1.0, 1.0);
    stray.portfolio_id = "p1".to_string();
    assert!(matches!(
        store.update_position(stray).unwrap_err(),
        AnalyticsError::PositionNotFound { .. }
    ));

    let mut orphan = open_position("INFY", 1.0, 1.0, 1.0);
    orphan.portfolio_id = "nope".to_string();
    assert!(matches!(
        store.update_position(orphan).unwrap_err(),
        AnalyticsError::PortfolioNotFound(_)
    ));
}

#[test]
fn test_delete_position() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    let pos = open_position("INFY", 1.0, 1.0, 1.0);
    let pos_id = pos.id.clone();
    store.add_position("p1", pos).unwrap();

    store.delete_position("p1", &pos_id).unwrap();
    assert!(store.get_portfolio("p1").unwrap().positions.is_empty());

    assert!(matches!(
        store.delete_position("p1", &pos_id).unwrap_err(),
        AnalyticsError::PositionNotFound { .. }
    ));
}

#[test]
fn test_close_position_sets_exit_pair() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    let pos = open_position("INFY", 10.0, 100.0, 100.0);
    let pos_id = pos.id.clone();
    store.add_position("p1", pos).unwrap();

    store.close_position("p1", &pos_id, 110.0, Utc::now()).unwrap();

    let fetched = store.get_portfolio("p1").unwrap();
    assert!(fetched.positions[0].is_closed());
    assert_eq!(fetched.positions[0].exit_price, Some(110.0));

    // Now realized rather than unrealized.
    let metrics = store.performance_metrics("p1").unwrap();
    assert_eq!(metrics.realized_pnl, 100.0);
    assert_eq!(metrics.unrealized_pnl, 0.0);
}

#[test]
fn test_close_position_missing() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    assert!(matches!(
        store.close_position("p1", "nope", 1.0, Utc::now()).unwrap_err(),
        AnalyticsError::PositionNotFound { .. }
    ));
}

// =============================================================================
// Metric caching
// =============================================================================

#[test]
fn test_empty_portfolio_metrics_all_zero() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();

    let metrics = store.performance_metrics("p1").unwrap();
    assert_eq!(metrics.total_pnl, 0.0);
    assert_eq!(metrics.win_rate, 0.0);
    assert_eq!(metrics.profit_factor, 0.0);
}

#[test]
fn test_cache_hit_preserves_updated_at() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    store
        .add_position("p1", open_position("INFY", 5.0, 50.0, 60.0))
        .unwrap();

    let first = store.performance_metrics("p1").unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let second = store.performance_metrics("p1").unwrap();

    assert_eq!(first.updated_at, second.updated_at);

    let first_risk = store.risk_metrics("p1").unwrap();
    let second_risk = store.risk_metrics("p1").unwrap();
    assert_eq!(first_risk.updated_at, second_risk.updated_at);
}

#[test]
fn test_cache_expires_after_ttl() {
    let store = PortfolioStore::new(Duration::from_millis(10));
    store.add_portfolio(portfolio("p1")).unwrap();

    let first = store.performance_metrics("p1").unwrap();
    std::thread::sleep(Duration::from_millis(20));
    let second = store.performance_metrics("p1").unwrap();

    assert!(second.updated_at > first.updated_at);
}

#[test]
fn test_position_mutation_invalidates_cache() {
    let store = store();
    store.add_portfolio(portfolio("p1")).unwrap();
    store
        .add_position("p1", closed_position("INFY", 10.0, 100.0, 110.0))
        .unwrap();

    let before = store.performance_metrics("p1").unwrap();
    assert_eq!(before.realized_pnl, 100.0);

    std::thread::sleep(Duration::from_millis(5));
    store
        .add_position("p1", closed_position("TCS", 10.0, 100.0, 95.0))
        .unwrap();

    let after = store.performance_metrics("p1").unwrap();
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.realized_pnl, 50.0);
    assert_eq!(after.profit_factor, 2.0);
}
