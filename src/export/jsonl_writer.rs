use super::writer_backend::{ExportBackend, ExportError};
use crate::harvest::types::ExportRow;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One JSON object per export row
pub struct JsonlWriter {
    file: BufWriter<File>,
    current_size: u64,
}

impl JsonlWriter {
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

        Ok(Self {
            file: BufWriter::new(file),
            current_size: 0,
        })
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        let json = serde_json::to_string(row)?;
        writeln!(self.file, "{}", json)?;
        self.current_size += (json.len() + 1) as u64;
        Ok(())
    }

    /// Bytes written so far
    pub fn size(&self) -> u64 {
        self.current_size
    }
}

#[async_trait]
impl ExportBackend for JsonlWriter {
    async fn write(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.write_row(row)
    }

    async fn flush(&mut self) -> Result<(), ExportError> {
        self.file.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::types::Bucket;
    use chrono::Utc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_jsonl_rows_parse_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let row = ExportRow {
            id: 3,
            bucket: Bucket::Both,
            likes: 4,
            dislikes: 2,
            user_vote: 1,
            status: "visible".to_string(),
            banned: false,
            created_at: Utc::now(),
            locator: "https://t-j.ru/x/#c3".to_string(),
        };

        let mut writer = JsonlWriter::new(&path).unwrap();
        writer.write(&row).await.unwrap();
        writer.flush().await.unwrap();
        assert!(writer.size() > 0);

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(value["bucket"], "both");
        assert_eq!(value["id"], 3);
        assert_eq!(value["locator"], "https://t-j.ru/x/#c3");
    }
}
