//! # sampool configuration
//!
//! Layered configuration for the sample pool and its tooling.
//!
//! ## Hierarchy
//! 1. Built-in defaults
//! 2. `config/sampool.yaml`
//! 3. `config/<SAMPOOL_ENV>.yaml` (default environment: `production`)
//! 4. `SAMPOOL_*` environment variables, `__` between nesting levels
//!    (`SAMPOOL_POOL__CAPACITY=4096`)

#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

mod error;
mod pool;
mod stress;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use pool::PoolConfig;
pub use stress::StressConfig;
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/sampool.yaml";
const ENV_PREFIX: &str = "SAMPOOL_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct SampoolConfig {
    /// Record pool sizing.
    #[serde(default)]
    #[validate(nested)]
    pub pool: PoolConfig,

    /// Logging and metrics.
    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,

    /// Concurrency soak parameters.
    #[serde(default)]
    #[validate(nested)]
    pub stress: StressConfig,
}

impl SampoolConfig {
    /// Load configuration from the default files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(SampoolConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            debug!("{} not found, using default configuration", BASE_FILE);
        }

        let env = std::env::var("SAMPOOL_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from one YAML file plus the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(SampoolConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Field validation followed by cross-field checks.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        self.pool.check_consistency()
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.check()?;
        Ok(config)
    }
}
