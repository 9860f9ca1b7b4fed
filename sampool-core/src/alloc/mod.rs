//! ## sampool-core::alloc
//! **Record recycling for high-frequency sampling paths**
//!
//! ### Key Submodules:
//! - `pool/`: the bounded concurrent pool of record handles
//! - `checkout/`: scoped ownership of a pooled record
//! - `stats/`: pool usage tracking and statistics

pub mod checkout;
pub mod pool;
pub mod stats;

pub use checkout::Checkout;
pub use pool::{Release, SamplePool};
pub use stats::{PoolStats, StatsSnapshot};
