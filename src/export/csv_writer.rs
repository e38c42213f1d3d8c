//! Delimited-text export (RFC 4180 quoting)

use super::writer_backend::{ExportBackend, ExportError};
use crate::harvest::types::ExportRow;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: [&str; 9] = [
    "id",
    "bucket",
    "likes",
    "dislikes",
    "user_vote",
    "status",
    "banned",
    "created_at",
    "locator",
];

pub struct CsvWriter {
    file: BufWriter<File>,
    rows_written: u64,
}

impl CsvWriter {
    /// Create (truncate) `path` and write the header row
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = Self {
            file: BufWriter::new(file),
            rows_written: 0,
        };
        writer.write_line(CSV_HEADER.iter().map(|s| s.to_string()))?;

        Ok(writer)
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.write_line([
            row.id.to_string(),
            row.bucket.as_str().to_string(),
            row.likes.to_string(),
            row.dislikes.to_string(),
            row.user_vote.to_string(),
            row.status.clone(),
            row.banned.to_string(),
            row.created_at.to_rfc3339(),
            row.locator.clone(),
        ])?;
        self.rows_written += 1;
        Ok(())
    }

    fn write_line(&mut self, fields: impl IntoIterator<Item = String>) -> Result<(), ExportError> {
        let line = fields
            .into_iter()
            .map(|f| escape_field(&f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.file, "{}", line)?;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[async_trait]
impl ExportBackend for CsvWriter {
    async fn write(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.write_row(row)
    }

    async fn flush(&mut self) -> Result<(), ExportError> {
        self.file.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::types::Bucket;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn row(status: &str) -> ExportRow {
        ExportRow {
            id: 9,
            bucket: Bucket::OnlyDislikes,
            likes: 0,
            dislikes: 8,
            user_vote: -1,
            status: status.to_string(),
            banned: true,
            created_at: Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap(),
            locator: "https://t-j.ru/a/#c9".to_string(),
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[tokio::test]
    async fn test_csv_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = CsvWriter::new(&path).unwrap();
        writer.write(&row("visible")).await.unwrap();
        writer.write(&row("moderated, hidden")).await.unwrap();
        writer.flush().await.unwrap();
        assert_eq!(writer.rows_written(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,bucket,likes,dislikes,user_vote,status,banned,created_at,locator");
        assert_eq!(
            lines[1],
            "9,only_dislikes,0,8,-1,visible,true,2026-02-03T04:05:06+00:00,https://t-j.ru/a/#c9"
        );
        assert!(lines[2].contains("\"moderated, hidden\""));
    }

    #[tokio::test]
    async fn test_empty_export_is_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("empty.csv");

        let mut writer = CsvWriter::new(&path).unwrap();
        writer.flush().await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
