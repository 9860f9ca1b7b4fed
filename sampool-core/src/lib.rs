//! # sampool-core
//!
//! Bounded, lock-free recycling of heap-allocated sample records.
//!
//! A sampling path (a profiler tick, a signal handler) takes a record with
//! [`SamplePool::acquire`] and hands it back with [`SamplePool::release`]
//! instead of going through the allocator on every sample.
//!
//! ### Expectations (Production):
//! - No locks and no blocking on acquire/release
//! - No heap allocation by the pool after construction
//! - Memory bounded by the capacity fixed at construction
//!
//! ### Key Submodules:
//! - `alloc::pool`: `SamplePool` and the `Release` handoff result
//! - `alloc::checkout`: RAII guard that releases on drop
//! - `alloc::stats`: relaxed hit/miss/reject counters

pub mod alloc;

pub mod prelude {
    pub use crate::alloc::*;
}

pub use alloc::{Checkout, PoolStats, Release, SamplePool, StatsSnapshot};
