//! Concurrency soak for [`SamplePool`].
//!
//! Worker threads share one pool. On every step a worker either acquires a
//! record (allocating one on a miss) or releases one it holds, chosen at random
//! from a per-worker seeded RNG. Records carry an id and a seal; a reacquired
//! record with a broken seal means the pool handed out memory someone else was
//! still writing. After the workers finish, the driver drains the pool and
//! checks that every allocated record is either pooled or was discarded, and
//! that no record was pooled twice.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sampool_config::{PoolConfig, StressConfig};
use sampool_core::{Release, SamplePool, StatsSnapshot};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

const SEAL_KEY: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Error)]
pub enum StressError {
    #[error("record {0} was corrupted while pooled")]
    Corrupted(u64),

    #[error("record {0} was pooled more than once")]
    Duplicated(u64),

    #[error("{allocated} records allocated but {accounted} accounted for")]
    Lost { allocated: u64, accounted: u64 },

    #[error("stress worker panicked")]
    WorkerPanicked,
}

/// Record type cycled through the pool during a soak.
#[derive(Debug)]
pub struct StressRecord {
    id: u64,
    seal: u64,
    payload: [u64; 8],
}

impl StressRecord {
    fn new(id: u64) -> Self {
        Self {
            id,
            seal: id ^ SEAL_KEY,
            payload: [id; 8],
        }
    }

    fn check(&self) -> Result<(), StressError> {
        if self.seal != self.id ^ SEAL_KEY || self.payload.iter().any(|&word| word != self.id) {
            return Err(StressError::Corrupted(self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTally {
    allocated: u64,
    discarded: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub threads: usize,
    pub iterations: u64,
    pub capacity: usize,
    pub allocated: u64,
    pub discarded: u64,
    pub pooled_at_end: usize,
    pub max_observed_len: usize,
    pub overshoot: usize,
    pub stats: StatsSnapshot,
}

/// Runs the soak and verifies record conservation. The pool is returned
/// drained so callers can export its statistics.
pub fn run(
    pool_config: &PoolConfig,
    stress: &StressConfig,
) -> Result<(StressReport, SamplePool<StressRecord>), StressError> {
    let pool = SamplePool::new(pool_config.capacity);
    let next_id = AtomicU64::new(0);
    let prefilled = pool.prefill(pool_config.prefill, || {
        StressRecord::new(next_id.fetch_add(1, Ordering::Relaxed))
    });
    let max_len = AtomicUsize::new(pool.len());

    info!(
        threads = stress.threads,
        iterations = stress.iterations,
        capacity = pool.capacity(),
        prefilled,
        "starting pool stress run"
    );

    let tallies = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = (0..stress.threads)
            .map(|worker| {
                let rng = SmallRng::seed_from_u64(stress.seed.wrapping_add(worker as u64));
                let (pool, next_id, max_len) = (&pool, &next_id, &max_len);
                scope.spawn(move |_| {
                    run_worker(pool, next_id, max_len, rng, stress.iterations, stress.acquire_ratio)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(StressError::WorkerPanicked)))
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| StressError::WorkerPanicked)??;

    let stats = pool.stats().snapshot();
    let allocated = next_id.load(Ordering::Relaxed);
    let discarded: u64 = tallies.iter().map(|t| t.discarded).sum();
    let pooled_at_end = drain_unique(&pool)?;

    let accounted = pooled_at_end as u64 + discarded;
    if accounted != allocated {
        return Err(StressError::Lost {
            allocated,
            accounted,
        });
    }
    debug!(
        worker_allocations = tallies.iter().map(|t| t.allocated).sum::<u64>(),
        prefilled, "allocation breakdown"
    );

    let max_observed_len = max_len.load(Ordering::Relaxed);
    let report = StressReport {
        threads: stress.threads,
        iterations: stress.iterations,
        capacity: pool.capacity(),
        allocated,
        discarded,
        pooled_at_end,
        max_observed_len,
        overshoot: max_observed_len.saturating_sub(pool.capacity()),
        stats,
    };
    info!(
        allocated,
        discarded,
        pooled_at_end,
        overshoot = report.overshoot,
        "pool stress run finished"
    );
    Ok((report, pool))
}

fn run_worker(
    pool: &SamplePool<StressRecord>,
    next_id: &AtomicU64,
    max_len: &AtomicUsize,
    mut rng: SmallRng,
    iterations: u64,
    acquire_ratio: f64,
) -> Result<WorkerTally, StressError> {
    let mut tally = WorkerTally::default();
    let mut held: Vec<Box<StressRecord>> = Vec::new();

    for _ in 0..iterations {
        if held.is_empty() || rng.random_bool(acquire_ratio) {
            let record = match pool.acquire() {
                Some(record) => {
                    record.check()?;
                    record
                }
                None => {
                    tally.allocated += 1;
                    Box::new(StressRecord::new(next_id.fetch_add(1, Ordering::Relaxed)))
                }
            };
            held.push(record);
        } else {
            let record = held.swap_remove(rng.random_range(0..held.len()));
            give_back(pool, record, max_len, &mut tally);
        }
    }

    for record in held {
        give_back(pool, record, max_len, &mut tally);
    }
    Ok(tally)
}

fn give_back(
    pool: &SamplePool<StressRecord>,
    record: Box<StressRecord>,
    max_len: &AtomicUsize,
    tally: &mut WorkerTally,
) {
    match pool.release(record) {
        Release::Pooled => {
            max_len.fetch_max(pool.len(), Ordering::Relaxed);
        }
        Release::Rejected(_) => tally.discarded += 1,
    }
}

fn drain_unique(pool: &SamplePool<StressRecord>) -> Result<usize, StressError> {
    let mut seen = HashSet::new();
    while let Some(record) = pool.acquire() {
        record.check()?;
        if !seen.insert(record.id) {
            return Err(StressError::Duplicated(record.id));
        }
    }
    Ok(seen.len())
}
