//! ## sampool-core::alloc::checkout
//! **Scoped ownership of a pooled record**
//!
//! A [`Checkout`] releases its record back to the pool when dropped. If the
//! pool is full at that point the record is freed.

use std::ops::{Deref, DerefMut};

use super::pool::SamplePool;

/// A record borrowed from a [`SamplePool`].
pub struct Checkout<'pool, T> {
    pool: &'pool SamplePool<T>,
    // Always `Some` until `detach` or drop.
    record: Option<Box<T>>,
}

impl<'pool, T> Checkout<'pool, T> {
    #[inline]
    pub(crate) fn new(pool: &'pool SamplePool<T>, record: Box<T>) -> Self {
        Self {
            pool,
            record: Some(record),
        }
    }

    /// Takes the record out without releasing it to the pool.
    pub fn detach(mut self) -> Box<T> {
        match self.record.take() {
            Some(record) => record,
            None => unreachable!("checkout record taken before detach"),
        }
    }
}

impl<T> Deref for Checkout<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        match &self.record {
            Some(record) => &**record,
            None => unreachable!("checkout record taken before deref"),
        }
    }
}

impl<T> DerefMut for Checkout<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.record {
            Some(record) => &mut **record,
            None => unreachable!("checkout record taken before deref"),
        }
    }
}

impl<T> Drop for Checkout<'_, T> {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            // A rejected record drops here.
            let _ = self.pool.release(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_returns_record_to_pool() {
        let pool = SamplePool::new(2);
        {
            let mut sample = pool.checkout(|| 0u64);
            *sample += 5;
            assert_eq!(*sample, 5);
        }
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.acquire().as_deref(), Some(&5));
    }

    #[test]
    fn checkout_reuses_pooled_record() {
        let pool = SamplePool::new(2);
        let _ = pool.release(Box::new(9u64));

        let sample = pool.checkout(|| 0);
        assert_eq!(*sample, 9);
        assert_eq!(pool.stats().acquire_hits(), 1);
    }

    #[test]
    fn detach_keeps_record_out_of_pool() {
        let pool = SamplePool::new(2);
        let sample = pool.checkout(|| String::from("kept"));
        let owned = sample.detach();

        assert_eq!(*owned, "kept");
        assert!(pool.is_empty());
        assert_eq!(pool.stats().snapshot().releases(), 0);
    }

    #[test]
    fn drop_into_full_pool_frees_record() {
        let pool = SamplePool::new(1);
        let first = pool.checkout(|| 1u8);
        let second = pool.checkout(|| 2u8);
        drop(first);
        drop(second);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats().release_rejected(), 1);
        assert_eq!(pool.acquire().as_deref(), Some(&1));
    }
}
