//! Harvesting and accumulation core
//!
//! ```text
//! Orchestrator ── account id ──▶ AccountScanner ── page request ──▶ PageFetcher
//!      ▲                              │
//!      │                      filter + classify
//!      │                              ▼
//!      └──── quota check ──── Accumulator ◀── merge(partial)
//! ```
//!
//! ## Module Organization
//!
//! - `types` - Record, Bucket, AggregateResult, ExportRow
//! - `filter` - engagement floor, recency cutoff, classification
//! - `fetcher` - PageFetcher trait and the HTTP implementation
//! - `scanner` - per-account pagination state machine
//! - `accumulator` - thread-safe run-wide aggregate
//! - `source` - sampled and listed account ids
//! - `orchestrator` - worker pool and stopping rule
//! - `stats` - final per-bucket statistics

pub mod accumulator;
pub mod fetcher;
pub mod filter;
pub mod orchestrator;
pub mod scanner;
pub mod source;
pub mod stats;
pub mod types;

pub use accumulator::Accumulator;
pub use fetcher::{FetchError, HttpPageFetcher, HttpSettings, PageFetcher, RawPage, RawRecord};
pub use orchestrator::{Orchestrator, RunSummary};
pub use scanner::{AccountScanner, ScanReport, ScanSettings, StopReason};
pub use source::{AccountSource, ListSource, SampledSource, Schedule};
pub use types::{AggregateResult, Bucket, ExportRow, Record};
