//! ## sampool-core::alloc::pool
//! **Bounded concurrent pool of sample records**
//!
//! A [`SamplePool`] holds boxed records between a `release` and the next
//! `acquire`. It never creates or destroys records on its own: a miss tells
//! the caller to allocate, a rejected release hands the record back for the
//! caller to drop.
//!
//! ## Capacity
//! `release` compares the approximate queue length against the capacity before
//! enqueueing. The check and the enqueue are separate steps; two releases can
//! both see room. The backing queue is bounded to the same capacity, so such a
//! race ends in a rejection rather than unbounded growth, and the pool's storage
//! is allocated once, at construction.
//!
//! ## Ownership
//! Handles are `Box<T>` moved by value. Releasing a record gives it up, so a
//! double release or a use after release cannot be written in safe code. A
//! record aliased through `unsafe` and released twice is undefined behavior;
//! the pool does not look for it.

use concurrent_queue::ConcurrentQueue;
use tracing::debug;

use super::checkout::Checkout;
use super::stats::PoolStats;

/// Outcome of [`SamplePool::release`].
#[derive(Debug)]
#[must_use = "a rejected record is handed back and must be disposed of by the caller"]
pub enum Release<T> {
    /// The pool took the record.
    Pooled,
    /// The pool was full; the record is returned unchanged.
    Rejected(Box<T>),
}

impl<T> Release<T> {
    pub fn is_pooled(&self) -> bool {
        matches!(self, Release::Pooled)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Release::Rejected(_))
    }

    /// The rejected record, if any.
    pub fn into_rejected(self) -> Option<Box<T>> {
        match self {
            Release::Pooled => None,
            Release::Rejected(record) => Some(record),
        }
    }
}

/// Lock-free, bounded recycler for boxed records.
///
/// Share it by reference (or `Arc`) between sampling threads; every method
/// takes `&self`.
///
/// # Example
/// ```
/// use sampool_core::SamplePool;
///
/// let pool: SamplePool<[u64; 8]> = SamplePool::new(2);
/// let record = pool.acquire().unwrap_or_else(|| Box::new([0; 8]));
/// assert!(pool.release(record).is_pooled());
/// assert!(pool.acquire().is_some());
/// ```
#[derive(Debug)]
pub struct SamplePool<T> {
    queue: ConcurrentQueue<Box<T>>,
    capacity: usize,
    stats: PoolStats,
}

impl<T> SamplePool<T> {
    /// Creates a pool that keeps at most `capacity` records.
    ///
    /// A capacity of zero is valid: every release is rejected and every
    /// acquire misses.
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "creating sample pool");
        Self {
            // concurrent-queue refuses a zero bound; the length check in
            // `offer` keeps a zero-capacity pool empty.
            queue: ConcurrentQueue::bounded(capacity.max(1)),
            capacity,
            stats: PoolStats::new(),
        }
    }

    /// Takes a pooled record, or `None` when the pool is empty.
    ///
    /// Never blocks and never allocates. `None` is the signal to allocate a
    /// fresh record.
    #[inline]
    pub fn acquire(&self) -> Option<Box<T>> {
        let record = self.queue.pop().ok();
        self.stats.record_acquire(record.is_some());
        record
    }

    /// Takes a pooled record, or boxes `init()` on a miss.
    #[inline]
    pub fn acquire_or_else<F>(&self, init: F) -> Box<T>
    where
        F: FnOnce() -> T,
    {
        self.acquire().unwrap_or_else(|| Box::new(init()))
    }

    /// Hands a record back.
    ///
    /// Returns [`Release::Pooled`] if the pool kept it, or
    /// [`Release::Rejected`] with the same record if the pool is full.
    /// Never blocks and never allocates.
    #[inline]
    pub fn release(&self, record: Box<T>) -> Release<T> {
        let outcome = self.offer(record);
        self.stats.record_release(outcome.is_pooled());
        outcome
    }

    /// Wraps a pooled or freshly built record in a guard that releases it on
    /// drop.
    pub fn checkout<F>(&self, init: F) -> Checkout<'_, T>
    where
        F: FnOnce() -> T,
    {
        Checkout::new(self, self.acquire_or_else(init))
    }

    /// Pools up to `count` fresh records so the first samples don't allocate.
    ///
    /// Stops at the first rejection and returns how many records were pooled.
    /// Prefilled records are not counted in [`PoolStats`].
    pub fn prefill<F>(&self, count: usize, mut init: F) -> usize
    where
        F: FnMut() -> T,
    {
        let mut pooled = 0;
        while pooled < count {
            if self.offer(Box::new(init())).is_rejected() {
                break;
            }
            pooled += 1;
        }
        debug!(requested = count, pooled, "prefilled sample pool");
        pooled
    }

    /// The capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Approximate number of pooled records.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    #[inline]
    fn offer(&self, record: Box<T>) -> Release<T> {
        if self.queue.len() >= self.capacity {
            return Release::Rejected(record);
        }
        // The queue is never closed, so a push error means a concurrent release
        // took the last slot.
        match self.queue.push(record) {
            Ok(()) => Release::Pooled,
            Err(error) => Release::Rejected(error.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32) -> Box<u32> {
        Box::new(id)
    }

    #[test]
    fn fresh_pool_always_misses() {
        let pool: SamplePool<u32> = SamplePool::new(8);
        for _ in 0..16 {
            assert!(pool.acquire().is_none());
        }
        assert_eq!(pool.stats().acquire_misses(), 16);
        assert!(pool.is_empty());
    }

    #[test]
    fn capacity_two_walkthrough() {
        let pool = SamplePool::new(2);

        assert!(pool.release(record(1)).is_pooled());
        assert!(pool.release(record(2)).is_pooled());
        match pool.release(record(3)) {
            Release::Rejected(rejected) => assert_eq!(*rejected, 3),
            Release::Pooled => panic!("third record should not fit"),
        }

        assert_eq!(pool.acquire().as_deref(), Some(&1));
        assert_eq!(pool.acquire().as_deref(), Some(&2));
        assert!(pool.acquire().is_none());
    }

    #[test]
    fn rejection_returns_the_same_allocation() {
        let pool = SamplePool::new(1);
        assert!(pool.release(record(1)).is_pooled());

        let extra = record(2);
        let address = &*extra as *const u32;
        let rejected = pool.release(extra).into_rejected().unwrap();
        assert_eq!(&*rejected as *const u32, address);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let pool = SamplePool::new(0);
        for id in 0..4 {
            assert!(pool.release(record(id)).is_rejected());
            assert!(pool.acquire().is_none());
        }
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.prefill(10, || 0), 0);
    }

    #[test]
    fn full_pool_does_not_grow() {
        let pool = SamplePool::new(3);
        for id in 0..10 {
            let _ = pool.release(record(id));
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.stats().release_pooled(), 3);
        assert_eq!(pool.stats().release_rejected(), 7);
    }

    #[test]
    fn records_are_reused_in_release_order() {
        let pool = SamplePool::new(4);
        for id in [10, 20, 30] {
            assert!(pool.release(record(id)).is_pooled());
        }
        let reacquired: Vec<u32> = std::iter::from_fn(|| pool.acquire()).map(|r| *r).collect();
        assert_eq!(reacquired, vec![10, 20, 30]);
    }

    #[test]
    fn acquire_or_else_prefers_pooled_records() {
        let pool = SamplePool::new(2);
        assert_eq!(*pool.acquire_or_else(|| 7), 7);

        let _ = pool.release(record(42));
        assert_eq!(*pool.acquire_or_else(|| 7), 42);
        assert_eq!(pool.stats().acquire_hits(), 1);
        assert_eq!(pool.stats().acquire_misses(), 1);
    }

    #[test]
    fn prefill_stops_at_capacity_and_skips_stats() {
        let pool = SamplePool::new(4);
        let mut next = 0;
        let pooled = pool.prefill(10, || {
            next += 1;
            next
        });

        assert_eq!(pooled, 4);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.stats().snapshot().releases(), 0);
        assert_eq!(pool.acquire().as_deref(), Some(&1));
    }

    #[test]
    fn pooled_records_are_dropped_with_the_pool() {
        use std::sync::Arc;

        let marker = Arc::new(());
        let pool = SamplePool::new(4);
        for _ in 0..3 {
            let _ = pool.release(Box::new(Arc::clone(&marker)));
        }
        assert_eq!(Arc::strong_count(&marker), 4);

        drop(pool);
        assert_eq!(Arc::strong_count(&marker), 1);
    }
}

#[cfg(test)]
mod proptests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Acquire,
        ReleaseFresh,
        ReleaseHeld(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Acquire),
            Just(Op::ReleaseFresh),
            any::<usize>().prop_map(Op::ReleaseHeld),
        ]
    }

    proptest! {
        #[test]
        fn sequential_use_matches_fifo_model(
            capacity in 0usize..8,
            ops in prop::collection::vec(op(), 0..128),
        ) {
            let pool = SamplePool::new(capacity);
            let mut model: VecDeque<u64> = VecDeque::new();
            let mut held: Vec<Box<u64>> = Vec::new();
            let mut discarded = 0u64;
            let mut created = 0u64;

            for op in ops {
                match op {
                    Op::Acquire => {
                        let got = pool.acquire();
                        prop_assert_eq!(got.as_deref().copied(), model.pop_front());
                        held.extend(got);
                    }
                    Op::ReleaseFresh | Op::ReleaseHeld(_) => {
                        let record = match op {
                            Op::ReleaseHeld(pick) if !held.is_empty() => {
                                held.swap_remove(pick % held.len())
                            }
                            _ => {
                                created += 1;
                                Box::new(created)
                            }
                        };
                        let id = *record;
                        match pool.release(record) {
                            Release::Pooled => {
                                prop_assert!(model.len() < capacity);
                                model.push_back(id);
                            }
                            Release::Rejected(back) => {
                                prop_assert!(model.len() >= capacity);
                                prop_assert_eq!(*back, id);
                                discarded += 1;
                            }
                        }
                    }
                }
                prop_assert_eq!(pool.len(), model.len());
                prop_assert!(pool.len() <= capacity);
            }

            prop_assert_eq!(created, held.len() as u64 + model.len() as u64 + discarded);
        }
    }
}
