//! Analytics Task Types
//!
//! Units of work queued on the analytics engine and the shapes their
//! results are delivered in.

use crate::error::AnalyticsError;
use crate::types::{PerformanceMetrics, RiskMetrics};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of work an analytics task performs.
///
/// Closed set: the worker dispatch is an exhaustive match, so a task kind
/// that reaches the queue always runs something. Unknown wire names are
/// rejected at parse time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Compute (or serve cached) performance metrics.
    Performance,
    /// Compute (or serve cached) risk metrics.
    Risk,
    /// Pull current prices from the provider into open positions.
    UpdatePrices,
    /// Pull Greeks from the provider into open option positions.
    UpdateGreeks,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Performance => write!(f, "performance"),
            TaskKind::Risk => write!(f, "risk"),
            TaskKind::UpdatePrices => write!(f, "update_prices"),
            TaskKind::UpdateGreeks => write!(f, "update_greeks"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "performance" => Ok(TaskKind::Performance),
            "risk" => Ok(TaskKind::Risk),
            "update_prices" => Ok(TaskKind::UpdatePrices),
            "update_greeks" => Ok(TaskKind::UpdateGreeks),
            other => Err(AnalyticsError::UnknownTaskKind(other.to_string())),
        }
    }
}

/// Successful result of an analytics task.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Performance(PerformanceMetrics),
    Risk(RiskMetrics),
    /// Prices were written into the portfolio's open positions.
    PricesRefreshed,
    /// Greeks were written into the portfolio's open option positions.
    GreeksRefreshed,
}

/// Completion callback for a queued task. Invoked exactly once by the
/// worker that ran the task, with either the output or the task's error.
pub type TaskCallback = Box<dyn FnOnce(Result<TaskOutput, AnalyticsError>) + Send + 'static>;

/// A queued unit of analytics work. Transient: created on enqueue, dropped
/// as soon as its callback returns. Never persisted or retried.
pub struct AnalyticsTask {
    pub kind: TaskKind,
    pub portfolio_id: String,
    pub callback: TaskCallback,
}

impl std::fmt::Debug for AnalyticsTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsTask")
            .field("kind", &self.kind)
            .field("portfolio_id", &self.portfolio_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_round_trip() {
        for kind in [
            TaskKind::Performance,
            TaskKind::Risk,
            TaskKind::UpdatePrices,
            TaskKind::UpdateGreeks,
        ] {
            assert_eq!(kind.to_string().parse::<TaskKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_task_kind_unknown() {
        let err = "backfill".parse::<TaskKind>().unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownTaskKind(s) if s == "backfill"));
    }
}
