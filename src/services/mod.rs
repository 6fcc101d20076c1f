pub mod calculator;
mod engine;
mod store;

pub use engine::AnalyticsEngine;
pub use store::PortfolioStore;
