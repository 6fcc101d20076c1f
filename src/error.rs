use thiserror::Error;

/// Errors produced by the portfolio store and analytics engine.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Portfolio already exists: {0}")]
    AlreadyExists(String),

    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    #[error("Position {position_id} not found in portfolio {portfolio_id}")]
    PositionNotFound {
        portfolio_id: String,
        position_id: String,
    },

    #[error("Analytics engine is already running")]
    AlreadyRunning,

    #[error("Analytics engine is not running")]
    NotRunning,

    #[error("Calculation queue is full")]
    QueueFull,

    #[error("Unknown task kind: {0}")]
    UnknownTaskKind(String),

    #[error("Market data provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
