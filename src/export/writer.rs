//! Unified export writer
//!
//! Routes rows to the CSV, JSONL or SQLite backend based on configuration.

use super::csv_writer::CsvWriter;
use super::jsonl_writer::JsonlWriter;
use super::sqlite_writer::SqliteWriter;
use super::writer_backend::{ExportBackend, ExportError};
use super::BackendType;
use crate::harvest::types::AggregateResult;
use std::path::Path;

pub enum ExportWriter {
    Csv(CsvWriter),
    Jsonl(JsonlWriter),
    Sqlite(SqliteWriter),
}

impl ExportWriter {
    /// Create a new export writer based on backend type
    pub fn new(backend: BackendType, path: impl AsRef<Path>) -> Result<Self, ExportError> {
        match backend {
            BackendType::Csv => Ok(ExportWriter::Csv(CsvWriter::new(path)?)),
            BackendType::Jsonl => Ok(ExportWriter::Jsonl(JsonlWriter::new(path)?)),
            BackendType::Sqlite => Ok(ExportWriter::Sqlite(SqliteWriter::new(path)?)),
        }
    }

    fn backend(&mut self) -> &mut dyn ExportBackend {
        match self {
            ExportWriter::Csv(w) => w,
            ExportWriter::Jsonl(w) => w,
            ExportWriter::Sqlite(w) => w,
        }
    }

    /// Write every row of `result` (bucket-major) and flush; returns rows written
    pub async fn write_result(&mut self, result: &AggregateResult) -> Result<usize, ExportError> {
        let backend = self.backend();
        let rows = result.rows();

        for row in &rows {
            backend.write(row).await?;
        }
        backend.flush().await?;

        log::debug!("✅ Exported {} rows via {}", rows.len(), backend.backend_type());
        Ok(rows.len())
    }

    /// Get backend type for logging
    pub fn backend_type(&self) -> &'static str {
        match self {
            ExportWriter::Csv(_) => "CSV",
            ExportWriter::Jsonl(_) => "JSONL",
            ExportWriter::Sqlite(_) => "SQLite",
        }
    }
}
