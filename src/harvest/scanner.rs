//! Per-account pagination state machine
//!
//! ```text
//! Fetching -> Filtering -> Continue       -> (delay) -> Fetching
//!                       -> Exhausted      (empty or short page)
//!                       -> Cutoff         (first record older than the cutoff)
//!                       -> Failed         (transport / HTTP error)
//! ```
//!
//! Pages are assumed to arrive newest-first, so the first record older than
//! the cutoff ends the scan for that account: the remainder of that page is
//! discarded and no further page is requested. Pages that are not strictly
//! ordered make this stop early and under-collect; nothing fails.
//!
//! Errors never leave the scanner. A failed page ends the account's scan
//! and whatever was collected so far is returned.

use super::fetcher::{PageFetcher, RawPage, RawRecord, RawStamp};
use super::filter::{classify, parse_timestamp, passes_engagement_floor, passes_recency};
use super::types::{AggregateResult, Record};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Scanner tuning
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Page size requested from the API
    pub limit: u32,
    /// Pause between two pages of the same account
    pub page_delay: Duration,
    /// Records older than `now - recency` are excluded
    pub recency: chrono::Duration,
    /// Base for record locators
    pub site_url: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            limit: 100,
            page_delay: Duration::from_millis(500),
            recency: chrono::Duration::days(super::filter::DEFAULT_RECENCY_DAYS),
            site_url: "https://t-j.ru".to_string(),
        }
    }
}

/// Why an account's scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Empty or short page: nothing left to read
    Exhausted,
    /// Hit a record older than the cutoff
    Cutoff,
    /// A page request failed
    Failed,
}

/// Result of scanning one account
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub account_id: u64,
    pub result: AggregateResult,
    pub stop: StopReason,
    /// Total reported on the first page, if any page was received
    pub total_count: Option<u64>,
    /// Raw records received across all pages
    pub records_seen: usize,
}

struct ScanCursor {
    account_id: u64,
    offset: u64,
    limit: u32,
    cutoff: DateTime<Utc>,
    total_count: Option<u64>,
    records_seen: usize,
}

enum PageOutcome {
    Continue,
    Cutoff,
}

pub struct AccountScanner {
    fetcher: Arc<dyn PageFetcher>,
    settings: ScanSettings,
    site_url: String,

    /// Clock (for testing with mock time)
    now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl AccountScanner {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: ScanSettings) -> Self {
        Self::with_now_fn(fetcher, settings, Box::new(Utc::now))
    }

    pub fn with_now_fn(
        fetcher: Arc<dyn PageFetcher>,
        settings: ScanSettings,
        now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    ) -> Self {
        let site_url = settings.site_url.trim_end_matches('/').to_string();
        Self {
            fetcher,
            settings,
            site_url,
            now_fn,
        }
    }

    /// Scan one account until exhausted, cut off, or failed
    pub async fn scan(&self, account_id: u64) -> ScanReport {
        let mut cursor = ScanCursor {
            account_id,
            offset: 0,
            limit: self.settings.limit.max(1),
            cutoff: (self.now_fn)() - self.settings.recency,
            total_count: None,
            records_seen: 0,
        };
        let mut result = AggregateResult::new();

        let stop = loop {
            let page = match self
                .fetcher
                .fetch_page(cursor.account_id, cursor.limit, cursor.offset)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    log::warn!(
                        "⚠️  Account {}: page at offset {} failed: {}",
                        cursor.account_id,
                        cursor.offset,
                        e
                    );
                    break StopReason::Failed;
                }
            };

            if cursor.total_count.is_none() {
                cursor.total_count = Some(page.count);
            }

            if page.data.is_empty() {
                break StopReason::Exhausted;
            }

            cursor.records_seen += page.data.len();
            let outcome = self.filter_page(&page, cursor.cutoff, &mut result);
            log_progress(&cursor, &result);

            if let PageOutcome::Cutoff = outcome {
                break StopReason::Cutoff;
            }

            if page.data.len() < cursor.limit as usize {
                break StopReason::Exhausted;
            }

            cursor.offset += u64::from(cursor.limit);

            if !self.settings.page_delay.is_zero() {
                tokio::time::sleep(self.settings.page_delay).await;
            }
        };

        log::debug!(
            "Account {} finished ({:?}): seen {}, kept {}",
            account_id,
            stop,
            cursor.records_seen,
            result.total()
        );

        ScanReport {
            account_id,
            result,
            stop,
            total_count: cursor.total_count,
            records_seen: cursor.records_seen,
        }
    }

    /// Apply filters to one page in server order, appending qualifying records
    fn filter_page(
        &self,
        page: &RawPage,
        cutoff: DateTime<Utc>,
        result: &mut AggregateResult,
    ) -> PageOutcome {
        for value in &page.data {
            // Stop decision needs only rating and date
            let stamp = match RawStamp::decode(value) {
                Ok(stamp) => stamp,
                Err(e) => {
                    log::debug!("Skipping malformed comment: {}", e);
                    continue;
                }
            };

            let (likes, dislikes) = (stamp.rating.likes, stamp.rating.dislikes);
            if !passes_engagement_floor(likes, dislikes) {
                continue;
            }

            let Some(created_at) = parse_timestamp(&stamp.date_added) else {
                log::debug!("Skipping comment: bad date_added {:?}", stamp.date_added);
                continue;
            };

            if !passes_recency(created_at, cutoff) {
                return PageOutcome::Cutoff;
            }

            let raw = match RawRecord::decode(value) {
                Ok(raw) => raw,
                Err(e) => {
                    log::debug!("Skipping malformed comment: {}", e);
                    continue;
                }
            };

            let bucket = classify(likes, dislikes);
            result.push(bucket, self.build_record(raw, created_at));
        }

        PageOutcome::Continue
    }

    fn build_record(&self, raw: RawRecord, created_at: DateTime<Utc>) -> Record {
        let locator = format!(
            "{}/{}/#c{}",
            self.site_url,
            raw.article_path.trim_matches('/'),
            raw.id
        );

        Record {
            id: raw.id,
            likes: raw.rating.likes,
            dislikes: raw.rating.dislikes,
            user_vote: raw.rating.user_vote,
            status: raw.status,
            banned: raw.ban.unwrap_or(false),
            created_at,
            locator,
        }
    }
}

fn log_progress(cursor: &ScanCursor, result: &AggregateResult) {
    let total = cursor.total_count.unwrap_or(0);
    let pct = if total > 0 {
        cursor.records_seen as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    log::debug!(
        "Account {}: fetched {}/{} ({:.1}%), kept {}",
        cursor.account_id,
        cursor.records_seen,
        total,
        pct,
        result.total()
    );
}
