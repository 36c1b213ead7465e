//! Utility modules: error types, logging, and metric accumulators.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{ImagefoldError, Result};
pub use logging::{init_logging, LogConfig, LogLevel, TrainingLogger};
pub use metrics::PhaseMetrics;
