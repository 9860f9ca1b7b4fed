//! # sampool telemetry
//!
//! Logging setup and Prometheus metrics for sample pools.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::PoolLogger;
pub use metrics::PoolMetrics;
