//! Sample pool sizing.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ConfigError;

/// Sizing of the record pool.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of pooled records. Zero disables recycling.
    #[serde(default = "default_capacity")]
    #[validate(range(max = 1048576))]
    pub capacity: usize,

    /// Records allocated into the pool at startup.
    #[serde(default)]
    pub prefill: usize,
}

fn default_capacity() -> usize {
    1024
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            prefill: 0,
        }
    }
}

impl PoolConfig {
    /// Cross-field checks that `validator` attributes can't express.
    pub fn check_consistency(&self) -> Result<(), ConfigError> {
        if self.prefill > self.capacity {
            return Err(ConfigError::Inconsistent(format!(
                "pool.prefill ({}) exceeds pool.capacity ({})",
                self.prefill, self.capacity
            )));
        }
        Ok(())
    }
}
