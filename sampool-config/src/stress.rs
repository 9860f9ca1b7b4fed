//! Concurrency soak parameters.
//!
//! Drives `sampool stress`: worker threads hammer a shared pool with random
//! acquire/release traffic.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct StressConfig {
    /// Number of worker threads.
    #[serde(default = "default_threads")]
    #[validate(range(min = 1, max = 256))]
    pub threads: usize,

    /// Operations per worker.
    #[serde(default = "default_iterations")]
    #[validate(range(min = 1))]
    pub iterations: u64,

    /// Probability that a worker acquires rather than releases.
    #[serde(default = "default_acquire_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub acquire_ratio: f64,

    /// Base seed; worker `n` uses `seed + n`.
    #[serde(default)]
    pub seed: u64,
}

fn default_threads() -> usize {
    num_cpus::get().min(256)
}

fn default_iterations() -> u64 {
    100_000
}

fn default_acquire_ratio() -> f64 {
    0.5
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            iterations: default_iterations(),
            acquire_ratio: default_acquire_ratio(),
            seed: 0,
        }
    }
}
