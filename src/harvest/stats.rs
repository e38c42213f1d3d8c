//! Final per-bucket statistics for the operator

use super::types::{AggregateResult, Bucket};

#[derive(Debug, Clone, PartialEq)]
pub struct BucketStats {
    pub bucket: Bucket,
    pub count: usize,
    pub total_likes: u64,
    pub total_dislikes: u64,
    pub avg_likes: f64,
    pub avg_dislikes: f64,
}

/// Statistics for every non-empty bucket, in export order
pub fn bucket_stats(result: &AggregateResult) -> Vec<BucketStats> {
    Bucket::ALL
        .into_iter()
        .filter_map(|bucket| {
            let records = result.get(bucket);
            if records.is_empty() {
                return None;
            }
            let count = records.len();
            let total_likes = records.iter().fold(0u64, |acc, r| acc.saturating_add(r.likes));
            let total_dislikes = records
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.dislikes));
            Some(BucketStats {
                bucket,
                count,
                total_likes,
                total_dislikes,
                avg_likes: total_likes as f64 / count as f64,
                avg_dislikes: total_dislikes as f64 / count as f64,
            })
        })
        .collect()
}

pub fn log_bucket_stats(result: &AggregateResult) {
    log::info!("📊 Final statistics:");
    for stats in bucket_stats(result) {
        log::info!("   {}:", stats.bucket.as_str().to_uppercase());
        log::info!("   ├─ Comments: {}", stats.count);
        log::info!("   ├─ Avg likes: {:.2}", stats.avg_likes);
        log::info!("   ├─ Avg dislikes: {:.2}", stats.avg_dislikes);
        log::info!("   ├─ Total likes: {}", stats.total_likes);
        log::info!("   └─ Total dislikes: {}", stats.total_dislikes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::types::Record;
    use chrono::Utc;

    fn record(likes: u64, dislikes: u64) -> Record {
        Record {
            id: 1,
            likes,
            dislikes,
            user_vote: 0,
            status: "visible".to_string(),
            banned: false,
            created_at: Utc::now(),
            locator: String::new(),
        }
    }

    #[test]
    fn test_stats_skip_empty_buckets() {
        let mut result = AggregateResult::new();
        result.push(Bucket::Both, record(2, 4));
        result.push(Bucket::Both, record(6, 1));

        let stats = bucket_stats(&result);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].bucket, Bucket::Both);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].total_likes, 8);
        assert_eq!(stats[0].total_dislikes, 5);
        assert!((stats[0].avg_likes - 4.0).abs() < f64::EPSILON);
        assert!((stats[0].avg_dislikes - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_totals_saturate() {
        let mut result = AggregateResult::new();
        result.push(Bucket::OnlyLikes, record(u64::MAX, 0));
        result.push(Bucket::OnlyLikes, record(10, 0));

        let stats = bucket_stats(&result);
        assert_eq!(stats[0].total_likes, u64::MAX);
        assert_eq!(stats[0].total_dislikes, 0);
    }

    #[test]
    fn test_stats_empty_aggregate() {
        assert!(bucket_stats(&AggregateResult::new()).is_empty());
    }
}
