pub mod metrics;
pub mod portfolio;
pub mod task;

pub use metrics::*;
pub use portfolio::*;
pub use task::*;
