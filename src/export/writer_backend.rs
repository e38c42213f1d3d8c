//! Writer backend trait for export rows
//!
//! Defines the interface for persisting the final aggregate to different backends.

use crate::harvest::types::ExportRow;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{field} = {value} does not fit an INTEGER column")]
    OutOfRange { field: &'static str, value: u64 },
}

#[async_trait]
pub trait ExportBackend: Send {
    /// Write a single export row
    async fn write(&mut self, row: &ExportRow) -> Result<(), ExportError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), ExportError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
