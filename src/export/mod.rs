//! Export sink for the final aggregate
//!
//! Rows are written bucket-major (only_likes, only_dislikes, both) in
//! discovery order. The export always runs, an empty aggregate still
//! produces a valid file.
//!
//! ## Backends
//!
//! - `csv` - `comments_{ts}.csv`, header row + RFC 4180 quoting (default)
//! - `jsonl` - `comments_{ts}.jsonl`, one object per row
//! - `sqlite` - `comments_{ts}.db`, table `comments`

pub mod csv_writer;
pub mod jsonl_writer;
pub mod sqlite_writer;
pub mod writer;
pub mod writer_backend;

pub use writer::ExportWriter;
pub use writer_backend::{ExportBackend, ExportError};

use crate::harvest::types::AggregateResult;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Csv,
    Jsonl,
    Sqlite,
}

impl BackendType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "csv" => Some(BackendType::Csv),
            "jsonl" => Some(BackendType::Jsonl),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            BackendType::Csv => "csv",
            BackendType::Jsonl => "jsonl",
            BackendType::Sqlite => "db",
        }
    }
}

/// `{dir}/comments_{YYYYmmdd_HHMMSS}.{ext}`
pub fn output_path(dir: &Path, backend: BackendType, at: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "comments_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        backend.extension()
    ))
}

/// Export `result` to `path`; returns rows written
pub async fn export_result(
    backend: BackendType,
    path: &Path,
    result: &AggregateResult,
) -> Result<usize, ExportError> {
    let mut writer = ExportWriter::new(backend, path)?;
    log::info!(
        "💾 Saving {} comments via {} to {}",
        result.total(),
        writer.backend_type(),
        path.display()
    );
    writer.write_result(result).await
}
