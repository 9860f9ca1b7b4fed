//! ## sampool-telemetry::metrics
//! **Prometheus exporter for pool statistics**
//!
//! The pool keeps its own relaxed counters; [`PoolMetrics::observe`] copies a
//! snapshot of them into a registry so that scraping never touches the pool's
//! hot path.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use sampool_core::{SamplePool, StatsSnapshot};

use crate::TelemetryError;

#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub registry: Registry,
    pub acquire_hits: IntCounter,
    pub acquire_misses: IntCounter,
    pub release_pooled: IntCounter,
    pub release_rejected: IntCounter,
    pub pooled_records: IntGauge,
    pub capacity: IntGauge,
}

impl PoolMetrics {
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let acquire_hits = IntCounter::new(
            "sampool_acquire_hits_total",
            "Acquires served from the pool",
        )?;
        let acquire_misses = IntCounter::new(
            "sampool_acquire_misses_total",
            "Acquires that found the pool empty",
        )?;
        let release_pooled = IntCounter::new(
            "sampool_release_pooled_total",
            "Releases the pool retained",
        )?;
        let release_rejected = IntCounter::new(
            "sampool_release_rejected_total",
            "Releases rejected because the pool was full",
        )?;
        let pooled_records =
            IntGauge::new("sampool_pooled_records", "Records currently pooled")?;
        let capacity = IntGauge::new("sampool_capacity", "Configured pool capacity")?;

        registry.register(Box::new(acquire_hits.clone()))?;
        registry.register(Box::new(acquire_misses.clone()))?;
        registry.register(Box::new(release_pooled.clone()))?;
        registry.register(Box::new(release_rejected.clone()))?;
        registry.register(Box::new(pooled_records.clone()))?;
        registry.register(Box::new(capacity.clone()))?;

        Ok(Self {
            registry,
            acquire_hits,
            acquire_misses,
            release_pooled,
            release_rejected,
            pooled_records,
            capacity,
        })
    }

    /// Records the current state of `pool`.
    pub fn observe<T>(&self, pool: &SamplePool<T>) {
        self.record(&pool.stats().snapshot(), pool.len(), pool.capacity());
    }

    /// Advances the counters to `snapshot` and sets the gauges. Counters never
    /// move backwards; an older snapshot leaves them unchanged.
    pub fn record(&self, snapshot: &StatsSnapshot, pooled: usize, capacity: usize) {
        advance(&self.acquire_hits, snapshot.acquire_hits);
        advance(&self.acquire_misses, snapshot.acquire_misses);
        advance(&self.release_pooled, snapshot.release_pooled);
        advance(&self.release_rejected, snapshot.release_rejected);
        self.pooled_records.set(saturating_i64(pooled));
        self.capacity.set(saturating_i64(capacity));
    }

    pub fn gather_metrics(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn advance(counter: &IntCounter, total: u64) {
    counter.inc_by(total.saturating_sub(counter.get()));
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_exports_pool_state() {
        let pool = SamplePool::new(2);
        let _ = pool.release(Box::new(1u8));
        let _ = pool.release(Box::new(2u8));
        let _ = pool.release(Box::new(3u8));
        let _ = pool.acquire();

        let metrics = PoolMetrics::new().unwrap();
        metrics.observe(&pool);

        assert_eq!(metrics.acquire_hits.get(), 1);
        assert_eq!(metrics.release_pooled.get(), 2);
        assert_eq!(metrics.release_rejected.get(), 1);
        assert_eq!(metrics.pooled_records.get(), 1);
        assert_eq!(metrics.capacity.get(), 2);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("sampool_release_rejected_total 1"));
        assert!(text.contains("sampool_capacity 2"));
    }

    #[test]
    fn repeated_snapshots_do_not_double_count() {
        let metrics = PoolMetrics::new().unwrap();
        let mut snapshot = StatsSnapshot {
            acquire_misses: 4,
            ..StatsSnapshot::default()
        };
        metrics.record(&snapshot, 0, 8);
        metrics.record(&snapshot, 0, 8);
        assert_eq!(metrics.acquire_misses.get(), 4);

        snapshot.acquire_misses = 10;
        metrics.record(&snapshot, 0, 8);
        assert_eq!(metrics.acquire_misses.get(), 10);

        snapshot.acquire_misses = 3;
        metrics.record(&snapshot, 0, 8);
        assert_eq!(metrics.acquire_misses.get(), 10);
    }
}
