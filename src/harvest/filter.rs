//! Record filtering and bucket classification
//!
//! Pure functions, no state and no I/O.

use super::types::Bucket;
use chrono::{DateTime, Utc};

/// Minimum combined likes + dislikes for a record to be considered
pub const ENGAGEMENT_FLOOR: u64 = 5;

/// Default recency window (days before scan start)
pub const DEFAULT_RECENCY_DAYS: i64 = 365;

pub fn passes_engagement_floor(likes: u64, dislikes: u64) -> bool {
    likes.saturating_add(dislikes) >= ENGAGEMENT_FLOOR
}

pub fn passes_recency(created_at: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    created_at >= cutoff
}

/// Assign a bucket from the engagement signature
///
/// Only meaningful for records that pass the engagement floor, which
/// guarantees at least one side is non-zero.
pub fn classify(likes: u64, dislikes: u64) -> Bucket {
    debug_assert!(likes > 0 || dislikes > 0, "classify called on zero engagement");
    match (likes > 0, dislikes > 0) {
        (true, true) => Bucket::Both,
        (true, false) => Bucket::OnlyLikes,
        _ => Bucket::OnlyDislikes,
    }
}

/// Parse the API's `date_added` (ISO-8601, `Z`-suffixed UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
