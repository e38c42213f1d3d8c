//! Run-wide aggregate of bucketed records
//!
//! Scan workers merge their per-account partial results here while the
//! orchestrator polls `quota_satisfied`. Both go through one mutex, so a
//! reader never sees a merge half-applied across the three buckets.
//! The lock is never held across an `.await`.

use super::types::{AggregateResult, Bucket};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct Accumulator {
    inner: Mutex<AggregateResult>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AggregateResult> {
        // Appends cannot leave the vectors inconsistent, so a poisoned
        // lock still guards valid data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a partial result; returns per-bucket counts after the merge
    pub fn merge(&self, partial: AggregateResult) -> [usize; 3] {
        let mut aggregate = self.lock();
        aggregate.append(partial);
        aggregate.counts()
    }

    /// True iff every bucket holds at least `target` records
    pub fn quota_satisfied(&self, target: usize) -> bool {
        let counts = self.counts();
        counts.iter().all(|&n| n >= target)
    }

    /// Consistent per-bucket snapshot in `Bucket::ALL` order
    pub fn counts(&self) -> [usize; 3] {
        self.lock().counts()
    }

    pub fn len_of(&self, bucket: Bucket) -> usize {
        self.lock().len_of(bucket)
    }

    /// Copy of the current aggregate
    pub fn snapshot(&self) -> AggregateResult {
        self.lock().clone()
    }

    /// Consume the accumulator, yielding the final aggregate
    pub fn into_result(self) -> AggregateResult {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::types::Record;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn partial(likes: usize, dislikes: usize, both: usize) -> AggregateResult {
        let record = |id: usize| Record {
            id: id as u64,
            likes: 5,
            dislikes: 5,
            user_vote: 0,
            status: "visible".to_string(),
            banned: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            locator: String::new(),
        };
        let mut result = AggregateResult::new();
        (0..likes).for_each(|i| result.push(Bucket::OnlyLikes, record(i)));
        (0..dislikes).for_each(|i| result.push(Bucket::OnlyDislikes, record(i)));
        (0..both).for_each(|i| result.push(Bucket::Both, record(i)));
        result
    }

    #[test]
    fn test_quota_requires_every_bucket() {
        let acc = Accumulator::new();
        assert!(acc.quota_satisfied(0));
        assert!(!acc.quota_satisfied(1));

        acc.merge(partial(3, 3, 0));
        assert!(!acc.quota_satisfied(2));

        acc.merge(partial(0, 0, 2));
        assert!(acc.quota_satisfied(2));
        assert!(!acc.quota_satisfied(3));
    }

    #[test]
    fn test_quota_is_monotonic() {
        let acc = Accumulator::new();
        acc.merge(partial(2, 2, 2));
        assert!(acc.quota_satisfied(2));

        acc.merge(AggregateResult::new());
        acc.merge(partial(1, 0, 0));
        assert!(acc.quota_satisfied(2));
    }

    #[test]
    fn test_merge_returns_counts() {
        let acc = Accumulator::new();
        assert_eq!(acc.merge(partial(1, 2, 3)), [1, 2, 3]);
        assert_eq!(acc.merge(partial(1, 0, 0)), [2, 2, 3]);
        assert_eq!(acc.len_of(Bucket::Both), 3);
    }

    #[test]
    fn test_concurrent_merges_lose_nothing() {
        let acc = Arc::new(Accumulator::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let acc = acc.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        acc.merge(partial(i % 3, 1, 2));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected_likes: usize = (0..8).map(|i| (i % 3) * 50).sum();
        assert_eq!(acc.counts(), [expected_likes, 8 * 50, 8 * 100]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_see_whole_merges() {
        let acc = Arc::new(Accumulator::new());
        let writer = {
            let acc = acc.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    acc.merge(partial(1, 1, 1));
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..200 {
            let [a, b, c] = acc.counts();
            assert!(a == b && b == c, "torn snapshot: {} {} {}", a, b, c);
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        let acc = Arc::try_unwrap(acc).unwrap();
        assert_eq!(acc.into_result().counts(), [200, 200, 200]);
    }
}
