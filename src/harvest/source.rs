//! Account identifier sources
//!
//! - `SampledSource` - endless random batches over `[1, N]`
//! - `ListSource` - a finite list read from a line-delimited file
//!
//! Only the orchestrator's coordinating loop advances a source; workers
//! receive plain ids.

use crate::config::ConfigError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// How the orchestrator should drive a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Whole batches on the worker pool, quota checked between batches
    Pooled,
    /// One account at a time, quota checked after every account
    Sequential,
}

pub trait AccountSource: Send {
    /// Next batch of account ids, `None` once the source is exhausted
    fn next_batch(&mut self) -> Option<Vec<u64>>;

    fn schedule(&self) -> Schedule;

    /// Short label for logging
    fn describe(&self) -> String;
}

/// Random ids from `[1, id_space]`, no repeats within a batch
///
/// Batches are independent, so an id may come back in a later batch.
/// Rescanning an account only appends duplicates of its records.
pub struct SampledSource<R: Rng + Send = StdRng> {
    rng: R,
    id_space: u64,
    batch_size: usize,
}

impl SampledSource<StdRng> {
    pub fn new(id_space: u64, batch_size: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), id_space, batch_size)
    }
}

impl<R: Rng + Send> SampledSource<R> {
    pub fn with_rng(rng: R, id_space: u64, batch_size: usize) -> Self {
        Self {
            rng,
            id_space: id_space.max(1),
            batch_size: batch_size.max(1),
        }
    }
}

impl<R: Rng + Send> AccountSource for SampledSource<R> {
    fn next_batch(&mut self) -> Option<Vec<u64>> {
        let space = usize::try_from(self.id_space).unwrap_or(usize::MAX);
        let amount = self.batch_size.min(space);
        let ids = rand::seq::index::sample(&mut self.rng, space, amount)
            .into_iter()
            .map(|i| i as u64 + 1)
            .collect();
        Some(ids)
    }

    fn schedule(&self) -> Schedule {
        Schedule::Pooled
    }

    fn describe(&self) -> String {
        format!(
            "sampled (batches of {} from [1, {}])",
            self.batch_size, self.id_space
        )
    }
}

/// Pre-supplied ids, consumed once in order
pub struct ListSource {
    ids: Option<Vec<u64>>,
    len: usize,
}

impl ListSource {
    pub fn new(ids: Vec<u64>) -> Self {
        let len = ids.len();
        Self {
            ids: Some(ids),
            len,
        }
    }

    /// Read ids from a file, one per non-blank line
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::IdsFile(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text).map_err(|msg| ConfigError::IdsFile(format!("{}: {}", path.display(), msg)))
    }

    fn parse(text: &str) -> Result<Self, String> {
        let mut ids = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let id = line
                .parse::<u64>()
                .map_err(|_| format!("line {}: {:?} is not an account id", index + 1, line))?;
            ids.push(id);
        }
        Ok(Self::new(ids))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AccountSource for ListSource {
    fn next_batch(&mut self) -> Option<Vec<u64>> {
        self.ids.take().filter(|ids| !ids.is_empty())
    }

    fn schedule(&self) -> Schedule {
        Schedule::Sequential
    }

    fn describe(&self) -> String {
        format!("list ({} accounts)", self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn test_sampled_batch_is_distinct_and_in_range() {
        let mut source = SampledSource::with_rng(StdRng::seed_from_u64(7), 1_000, 100);

        for _ in 0..5 {
            let batch = source.next_batch().unwrap();
            assert_eq!(batch.len(), 100);
            let unique: HashSet<u64> = batch.iter().copied().collect();
            assert_eq!(unique.len(), 100);
            assert!(batch.iter().all(|&id| (1..=1_000).contains(&id)));
        }
    }

    #[test]
    fn test_sampled_batch_clamped_to_space() {
        let mut source = SampledSource::with_rng(StdRng::seed_from_u64(1), 5, 100);
        let mut batch = source.next_batch().unwrap();
        batch.sort_unstable();
        assert_eq!(batch, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_list_parse_skips_blank_lines() {
        let mut source = ListSource::parse("12\n\n  34 \n\t\n56\n").unwrap();
        assert_eq!(source.len(), 3);
        assert_eq!(source.next_batch(), Some(vec![12, 34, 56]));
        assert_eq!(source.next_batch(), None);
    }

    #[test]
    fn test_list_parse_rejects_garbage() {
        let err = ListSource::parse("1\nabc\n3").err().unwrap();
        assert!(err.contains("line 2"));
        assert!(ListSource::parse("-4").is_err());
    }

    #[test]
    fn test_empty_list_yields_nothing() {
        let mut source = ListSource::new(Vec::new());
        assert!(source.is_empty());
        assert_eq!(source.next_batch(), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "100").unwrap();
        writeln!(file, "200").unwrap();

        let mut source = ListSource::from_file(file.path()).unwrap();
        assert_eq!(source.schedule(), Schedule::Sequential);
        assert_eq!(source.next_batch(), Some(vec![100, 200]));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ListSource::from_file("/nonexistent/ids.txt").err().unwrap();
        assert!(matches!(err, ConfigError::IdsFile(_)));
    }
}
