//! Portfolio Types
//!
//! Types for portfolio tracking: portfolios, positions, and option Greeks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Direction of a position (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "buy"),
            TransactionType::Sell => write!(f, "sell"),
        }
    }
}

/// Option contract kind. Wire names follow exchange convention (CE/PE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Call => write!(f, "CE"),
            OptionKind::Put => write!(f, "PE"),
        }
    }
}

// =============================================================================
// Structs
// =============================================================================

/// Option price sensitivities, as supplied by the market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
    pub updated_at: DateTime<Utc>,
}

/// A single trading position inside a portfolio.
///
/// A position is *closed* when both `exit_time` and `exit_price` are set —
/// the two are only ever set together. A position carrying all three option
/// descriptors (`strike_price`, `expiry_date`, `option_kind`) is an option
/// position and the only kind eligible for Greeks-based exposure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub exchange: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub entry_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    pub transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_kind: Option<OptionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<Greeks>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Position {
    /// Create a new open position. The portfolio ID is stamped by the store
    /// when the position is added.
    pub fn new(
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        transaction_type: TransactionType,
        quantity: f64,
        entry_price: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: String::new(),
            symbol: symbol.into(),
            exchange: exchange.into(),
            quantity,
            entry_price,
            current_price: entry_price,
            entry_time: Utc::now(),
            exit_time: None,
            exit_price: None,
            transaction_type,
            strike_price: None,
            expiry_date: None,
            option_kind: None,
            greeks: None,
            tags: Vec::new(),
        }
    }

    /// Whether this position has been closed (exit time and price both set).
    pub fn is_closed(&self) -> bool {
        self.exit_time.is_some() && self.exit_price.is_some()
    }

    /// Whether this position is an option contract (all descriptors set).
    pub fn is_option(&self) -> bool {
        self.strike_price.is_some() && self.expiry_date.is_some() && self.option_kind.is_some()
    }

    /// Mark the position closed. Sets the exit pair together so the
    /// closed/open invariant cannot be half-applied.
    pub fn close(&mut self, exit_price: f64, exit_time: DateTime<Utc>) {
        self.exit_price = Some(exit_price);
        self.exit_time = Some(exit_time);
    }
}

/// A named collection of positions owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// Create a new empty portfolio with a generated ID.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            user_id: user_id.into(),
            strategy_id: None,
            positions: Vec::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
