//! ## sampool-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Nothing here is called from the pool's acquire/release paths; those may run
//! inside signal handlers, where formatting and I/O are not allowed.

use sampool_core::StatsSnapshot;
use tracing::info_span;
use tracing_subscriber::{fmt, EnvFilter};

use crate::TelemetryError;

#[derive(Clone)]
pub struct PoolLogger;

impl PoolLogger {
    /// Installs the global subscriber. `RUST_LOG` takes precedence over
    /// `default_level`.
    pub fn init(default_level: &str) -> Result<(), TelemetryError> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(default_level)?,
        };

        fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .try_init()
            .map_err(|e| TelemetryError::Subscriber(e.to_string()))
    }

    /// Emits one structured event describing a pool's state.
    pub fn log_snapshot(pool: &str, snapshot: &StatsSnapshot, pooled: usize, capacity: usize) {
        let span = info_span!("sample_pool", pool = pool);
        let _entered = span.enter();

        tracing::info!(
            pooled,
            capacity,
            acquire_hits = snapshot.acquire_hits,
            acquire_misses = snapshot.acquire_misses,
            release_pooled = snapshot.release_pooled,
            release_rejected = snapshot.release_rejected,
            hit_ratio = snapshot.hit_ratio(),
            "Sample pool snapshot"
        );
    }
}
