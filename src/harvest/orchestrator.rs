//! Multi-account orchestration
//!
//! Pulls account ids from an `AccountSource`, runs an `AccountScanner` per
//! account, and merges each partial result into the shared `Accumulator`
//! until every bucket reaches the quota or the source runs dry.
//!
//! Pooled schedule (sampled ids):
//! 1. Check the quota; stop if met
//! 2. Spawn the whole batch on a `JoinSet`, `workers` semaphore permits
//! 3. Each task scans its account to completion and merges on its own
//! 4. Drain every task of the batch, logging running totals
//!
//! In-flight accounts are never cancelled: a batch that crosses the quota
//! still runs to the end.
//!
//! Sequential schedule (listed ids): one account at a time, quota checked
//! before each one.

use super::accumulator::Accumulator;
use super::scanner::{AccountScanner, ScanReport, StopReason};
use super::source::{AccountSource, Schedule};
use super::types::Bucket;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Counters for one orchestrator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accounts_scanned: usize,
    pub batches: usize,
    /// Accounts whose scan ended on a failed request (or panicked)
    pub accounts_failed: usize,
    /// Accounts that contributed at least one record
    pub accounts_with_records: usize,
    pub records_seen: usize,
    pub quota_met: bool,
}

impl RunSummary {
    fn record(&mut self, report: &ScanReport, kept: usize) {
        self.accounts_scanned += 1;
        self.records_seen += report.records_seen;
        if report.stop == StopReason::Failed {
            self.accounts_failed += 1;
        }
        if kept > 0 {
            self.accounts_with_records += 1;
        }
    }
}

pub struct Orchestrator {
    scanner: Arc<AccountScanner>,
    accumulator: Arc<Accumulator>,
    target: usize,
    workers: usize,
}

impl Orchestrator {
    pub fn new(
        scanner: Arc<AccountScanner>,
        accumulator: Arc<Accumulator>,
        target: usize,
        workers: usize,
    ) -> Self {
        Self {
            scanner,
            accumulator,
            target,
            workers: workers.max(1),
        }
    }

    pub fn accumulator(&self) -> &Arc<Accumulator> {
        &self.accumulator
    }

    /// Drive the source until the quota is met or it is exhausted
    pub async fn run(&self, source: &mut dyn AccountSource) -> RunSummary {
        log::info!("🚀 Starting harvest: source = {}", source.describe());
        log::info!("   ├─ Quota: {} per bucket", self.target);
        log::info!(
            "   └─ Workers: {}",
            match source.schedule() {
                Schedule::Pooled => self.workers,
                Schedule::Sequential => 1,
            }
        );

        let summary = match source.schedule() {
            Schedule::Pooled => self.run_pooled(source).await,
            Schedule::Sequential => self.run_sequential(source).await,
        };

        log::info!(
            "✅ Harvest finished: {} accounts in {} batches ({} failed), quota {}",
            summary.accounts_scanned,
            summary.batches,
            summary.accounts_failed,
            if summary.quota_met { "met" } else { "not met" }
        );
        summary
    }

    async fn run_pooled(&self, source: &mut dyn AccountSource) -> RunSummary {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut summary = RunSummary::default();

        loop {
            if self.accumulator.quota_satisfied(self.target) {
                summary.quota_met = true;
                break;
            }

            let Some(batch) = source.next_batch() else {
                break;
            };
            summary.batches += 1;
            log::info!("📦 Batch #{}: {} accounts", summary.batches, batch.len());

            let mut tasks = JoinSet::new();
            for account_id in batch {
                let scanner = self.scanner.clone();
                let accumulator = self.accumulator.clone();
                let semaphore = semaphore.clone();

                tasks.spawn(async move {
                    // Semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    log::debug!("Scanning account {}", account_id);
                    let mut report = scanner.scan(account_id).await;
                    let partial = std::mem::take(&mut report.result);
                    let kept = partial.total();
                    let counts = accumulator.merge(partial);
                    (report, kept, counts)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((report, kept, counts)) => {
                        summary.record(&report, kept);
                        self.log_merge(&report, kept, counts);
                    }
                    Err(e) => {
                        log::error!("❌ Scan task failed: {}", e);
                        summary.accounts_scanned += 1;
                        summary.accounts_failed += 1;
                    }
                }
            }
        }

        summary
    }

    async fn run_sequential(&self, source: &mut dyn AccountSource) -> RunSummary {
        let mut summary = RunSummary::default();

        'source: while let Some(batch) = source.next_batch() {
            summary.batches += 1;

            for account_id in batch {
                if self.accumulator.quota_satisfied(self.target) {
                    break 'source;
                }

                let mut report = self.scanner.scan(account_id).await;
                let partial = std::mem::take(&mut report.result);
                let kept = partial.total();
                let counts = self.accumulator.merge(partial);

                summary.record(&report, kept);
                self.log_merge(&report, kept, counts);
            }
        }

        summary.quota_met = self.accumulator.quota_satisfied(self.target);
        summary
    }

    fn log_merge(&self, report: &ScanReport, kept: usize, counts: [usize; 3]) {
        log::info!(
            "👤 Account {}: kept {} of {} seen ({:?})",
            report.account_id,
            kept,
            report.records_seen,
            report.stop
        );
        for (i, (bucket, count)) in Bucket::ALL.iter().zip(counts).enumerate() {
            let branch = if i + 1 == Bucket::ALL.len() { "└─" } else { "├─" };
            log::info!("   {} {}: {}/{}", branch, bucket, count, self.target);
        }
    }
}
