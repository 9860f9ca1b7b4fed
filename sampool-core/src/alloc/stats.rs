//! ## sampool-core::alloc::stats
//! **Pool usage statistics**
//!
//! Counters are updated with relaxed atomics on the acquire/release paths, so
//! recording never blocks and never allocates. Each counter sits on its own
//! cache line; acquiring and releasing threads would otherwise contend on the
//! same line.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;
use serde::Serialize;

/// Live counters owned by a [`SamplePool`](crate::SamplePool).
#[derive(Debug, Default)]
pub struct PoolStats {
    acquire_hits: CachePadded<AtomicU64>,
    acquire_misses: CachePadded<AtomicU64>,
    release_pooled: CachePadded<AtomicU64>,
    release_rejected: CachePadded<AtomicU64>,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_acquire(&self, hit: bool) {
        let counter = if hit {
            &self.acquire_hits
        } else {
            &self.acquire_misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_release(&self, pooled: bool) {
        let counter = if pooled {
            &self.release_pooled
        } else {
            &self.release_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Acquires that returned a pooled record.
    pub fn acquire_hits(&self) -> u64 {
        self.acquire_hits.load(Ordering::Relaxed)
    }

    /// Acquires that found the pool empty.
    pub fn acquire_misses(&self) -> u64 {
        self.acquire_misses.load(Ordering::Relaxed)
    }

    /// Releases the pool retained.
    pub fn release_pooled(&self) -> u64 {
        self.release_pooled.load(Ordering::Relaxed)
    }

    /// Releases handed back to the caller because the pool was full.
    pub fn release_rejected(&self) -> u64 {
        self.release_rejected.load(Ordering::Relaxed)
    }

    /// Copies the counters out. Under concurrent use the fields are read one
    /// at a time and need not describe a single instant.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            acquire_hits: self.acquire_hits(),
            acquire_misses: self.acquire_misses(),
            release_pooled: self.release_pooled(),
            release_rejected: self.release_rejected(),
        }
    }
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub acquire_hits: u64,
    pub acquire_misses: u64,
    pub release_pooled: u64,
    pub release_rejected: u64,
}

impl StatsSnapshot {
    pub fn acquires(&self) -> u64 {
        self.acquire_hits + self.acquire_misses
    }

    pub fn releases(&self) -> u64 {
        self.release_pooled + self.release_rejected
    }

    /// Fraction of acquires served from the pool; 0.0 before the first acquire.
    pub fn hit_ratio(&self) -> f64 {
        match self.acquires() {
            0 => 0.0,
            total => self.acquire_hits as f64 / total as f64,
        }
    }
}
