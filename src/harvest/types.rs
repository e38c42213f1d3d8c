//! Core data types for the harvesting pipeline
//!
//! - `Record` - one qualifying comment (immutable once built)
//! - `Bucket` - the three disjoint engagement categories
//! - `AggregateResult` - bucket -> records, in discovery order
//! - `ExportRow` - flat row handed to the export sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement category of a qualifying record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    OnlyLikes,
    OnlyDislikes,
    Both,
}

impl Bucket {
    /// Export order: likes-only, dislikes-only, then mixed
    pub const ALL: [Bucket; 3] = [Bucket::OnlyLikes, Bucket::OnlyDislikes, Bucket::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::OnlyLikes => "only_likes",
            Bucket::OnlyDislikes => "only_dislikes",
            Bucket::Both => "both",
        }
    }

    fn index(self) -> usize {
        match self {
            Bucket::OnlyLikes => 0,
            Bucket::OnlyDislikes => 1,
            Bucket::Both => 2,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comment that passed the engagement floor and the recency cutoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub user_vote: i64,
    pub status: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
    /// `{site}/{article_path}/#c{id}`
    pub locator: String,
}

/// Records grouped by bucket
///
/// Used both for one account's partial result and for the run-wide
/// aggregate held by the `Accumulator`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    buckets: [Vec<Record>; 3],
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bucket: Bucket, record: Record) {
        self.buckets[bucket.index()].push(record);
    }

    pub fn get(&self, bucket: Bucket) -> &[Record] {
        &self.buckets[bucket.index()]
    }

    pub fn len_of(&self, bucket: Bucket) -> usize {
        self.buckets[bucket.index()].len()
    }

    /// Per-bucket lengths in `Bucket::ALL` order
    pub fn counts(&self) -> [usize; 3] {
        [
            self.buckets[0].len(),
            self.buckets[1].len(),
            self.buckets[2].len(),
        ]
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Append every bucket of `other` onto `self`
    pub fn append(&mut self, other: AggregateResult) {
        for (dst, src) in self.buckets.iter_mut().zip(other.buckets) {
            dst.extend(src);
        }
    }

    /// Iterate `(bucket, record)` bucket-major, discovery order within a bucket
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &Record)> {
        Bucket::ALL
            .into_iter()
            .flat_map(move |bucket| self.get(bucket).iter().map(move |r| (bucket, r)))
    }

    /// Flatten into export rows
    pub fn rows(&self) -> Vec<ExportRow> {
        self.iter()
            .map(|(bucket, record)| ExportRow::from_record(bucket, record))
            .collect()
    }
}

/// Flat export row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub id: u64,
    pub bucket: Bucket,
    pub likes: u64,
    pub dislikes: u64,
    pub user_vote: i64,
    pub status: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
    pub locator: String,
}

impl ExportRow {
    pub fn from_record(bucket: Bucket, record: &Record) -> Self {
        Self {
            id: record.id,
            bucket,
            likes: record.likes,
            dislikes: record.dislikes,
            user_vote: record.user_vote,
            status: record.status.clone(),
            banned: record.banned,
            created_at: record.created_at,
            locator: record.locator.clone(),
        }
    }
}
