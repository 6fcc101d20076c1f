//! Metrics Calculator
//!
//! Pure computation of performance and risk snapshots from a slice of
//! positions. No locking, no I/O; the store decides when to call this and
//! what to do with the result.

use crate::types::{AssetClass, PerformanceMetrics, Position, RiskMetrics, TransactionType};
use chrono::Utc;

/// Signed PnL for one position against a reference price (exit price for
/// closed positions, current price for open ones).
fn position_pnl(position: &Position, reference_price: f64) -> f64 {
    let pnl = position.quantity * (reference_price - position.entry_price);
    match position.transaction_type {
        TransactionType::Buy => pnl,
        TransactionType::Sell => -pnl,
    }
}

/// Compute a performance snapshot over a set of positions.
///
/// Closed positions contribute to realized PnL and to the win/loss
/// statistics; open positions contribute to unrealized PnL only. A closed
/// trade with exactly zero PnL counts as a loss of magnitude zero.
pub fn performance(positions: &[Position]) -> PerformanceMetrics {
    if positions.is_empty() {
        return PerformanceMetrics::empty();
    }

    let mut realized_pnl = 0.0;
    let mut unrealized_pnl = 0.0;
    let mut total_investment = 0.0;
    let mut win_count = 0u32;
    let mut loss_count = 0u32;
    let mut total_win = 0.0;
    let mut total_loss = 0.0;

    for position in positions {
        total_investment += position.quantity * position.entry_price;

        match position.exit_price {
            Some(exit_price) if position.is_closed() => {
                let pnl = position_pnl(position, exit_price);
                realized_pnl += pnl;

                if pnl > 0.0 {
                    win_count += 1;
                    total_win += pnl;
                } else {
                    loss_count += 1;
                    total_loss += pnl.abs();
                }
            }
            _ => {
                unrealized_pnl += position_pnl(position, position.current_price);
            }
        }
    }

    let total_pnl = realized_pnl + unrealized_pnl;
    let pnl_percentage = if total_investment > 0.0 {
        total_pnl / total_investment * 100.0
    } else {
        0.0
    };

    let closed_trades = win_count + loss_count;
    let win_rate = if closed_trades > 0 {
        f64::from(win_count) / f64::from(closed_trades) * 100.0
    } else {
        0.0
    };

    let average_win = if win_count > 0 {
        total_win / f64::from(win_count)
    } else {
        0.0
    };
    let average_loss = if loss_count > 0 {
        total_loss / f64::from(loss_count)
    } else {
        0.0
    };

    // 0 rather than infinity when there are no losing trades.
    let profit_factor = if total_loss > 0.0 {
        total_win / total_loss
    } else {
        0.0
    };

    PerformanceMetrics {
        total_pnl,
        realized_pnl,
        unrealized_pnl,
        pnl_percentage,
        win_rate,
        profit_factor,
        average_win,
        average_loss,
        return_on_capital: pnl_percentage,
        updated_at: Utc::now(),
        ..PerformanceMetrics::empty()
    }
}

/// Compute a risk snapshot over a set of positions.
///
/// Closed positions are skipped entirely. Each open position contributes
/// its notional value to the asset class and sector maps; option positions
/// additionally contribute value-weighted Greek exposures when their
/// Greeks have been refreshed.
pub fn risk(positions: &[Position]) -> RiskMetrics {
    let mut metrics = RiskMetrics::empty();

    for position in positions {
        if position.is_closed() {
            continue;
        }

        let value = position.quantity * position.current_price;

        let asset_class = match position.option_kind {
            Some(kind) => {
                *metrics.option_exposure.entry(kind).or_insert(0.0) += value;

                if let Some(greeks) = &position.greeks {
                    metrics.delta_exposure += greeks.delta * value;
                    metrics.gamma_exposure += greeks.gamma * value;
                    metrics.theta_exposure += greeks.theta * value;
                    metrics.vega_exposure += greeks.vega * value;
                    metrics.rho_exposure += greeks.rho * value;
                }

                AssetClass::Options
            }
            None => AssetClass::Equity,
        };
        *metrics.asset_class_exposure.entry(asset_class).or_insert(0.0) += value;

        // No sector reference data wired in yet.
        *metrics.sector_exposure.entry("Unknown".to_string()).or_insert(0.0) += value;
    }

    metrics.updated_at = Utc::now();
    metrics
}
