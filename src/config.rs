//! Harvester configuration from environment variables
//!
//! Loaded once at startup. Anything invalid here is fatal: the run aborts
//! before the first account is scanned.

use crate::export::BackendType;
use crate::harvest::fetcher::HttpSettings;
use crate::harvest::scanner::ScanSettings;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("account id list: {0}")]
    IdsFile(String),
}

/// Configuration for a harvest run
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// API base, e.g. `https://api.t-j.ru/ipa-gateway/api/v1`
    pub api_base: String,

    /// Site root: warm-up target and locator base
    pub site_url: String,

    /// Comments per page
    pub page_limit: u32,

    /// Pause between pages of one account in milliseconds
    pub page_delay_ms: u64,

    /// Records older than this many days are excluded
    pub recency_days: i64,

    /// Per-bucket quota
    pub target: usize,

    /// Worker pool size in sampled mode
    pub workers: usize,

    /// Accounts per sampled batch
    pub batch_size: usize,

    /// Sampled ids come from `[1, id_space]`
    pub id_space: u64,

    /// Enumerated mode when set
    pub ids_file: Option<PathBuf>,

    pub output_dir: PathBuf,

    pub backend: BackendType,

    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.t-j.ru/ipa-gateway/api/v1".to_string(),
            site_url: "https://t-j.ru".to_string(),
            page_limit: 100,
            page_delay_ms: 500,
            recency_days: 365,
            target: 2_000,
            workers: 2,
            batch_size: 100,
            id_space: 10_000_000,
            ids_file: None,
            output_dir: PathBuf::from("."),
            backend: BackendType::Csv,
            http_timeout_secs: 30,
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{}={:?} cannot be parsed", name, raw))),
        Err(_) => Ok(default),
    }
}

impl HarvestConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `HARVEST_API_BASE` (default: https://api.t-j.ru/ipa-gateway/api/v1)
    /// - `HARVEST_SITE_URL` (default: https://t-j.ru)
    /// - `HARVEST_PAGE_LIMIT` (default: 100)
    /// - `HARVEST_PAGE_DELAY_MS` (default: 500)
    /// - `HARVEST_RECENCY_DAYS` (default: 365)
    /// - `HARVEST_TARGET` (default: 2000)
    /// - `HARVEST_WORKERS` (default: 2)
    /// - `HARVEST_BATCH_SIZE` (default: 100)
    /// - `HARVEST_ID_SPACE` (default: 10000000)
    /// - `HARVEST_IDS_FILE` (default: unset, sampled mode)
    /// - `HARVEST_OUTPUT_DIR` (default: .)
    /// - `HARVEST_BACKEND` (default: csv)
    /// - `HARVEST_HTTP_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend = match env::var("HARVEST_BACKEND") {
            Ok(raw) => BackendType::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "HARVEST_BACKEND={:?} (expected csv, jsonl or sqlite)",
                    raw
                ))
            })?,
            Err(_) => defaults.backend,
        };

        let config = Self {
            api_base: env::var("HARVEST_API_BASE").unwrap_or(defaults.api_base),
            site_url: env::var("HARVEST_SITE_URL").unwrap_or(defaults.site_url),
            page_limit: parsed("HARVEST_PAGE_LIMIT", defaults.page_limit)?,
            page_delay_ms: parsed("HARVEST_PAGE_DELAY_MS", defaults.page_delay_ms)?,
            recency_days: parsed("HARVEST_RECENCY_DAYS", defaults.recency_days)?,
            target: parsed("HARVEST_TARGET", defaults.target)?,
            workers: parsed("HARVEST_WORKERS", defaults.workers)?,
            batch_size: parsed("HARVEST_BATCH_SIZE", defaults.batch_size)?,
            id_space: parsed("HARVEST_ID_SPACE", defaults.id_space)?,
            ids_file: env::var("HARVEST_IDS_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            output_dir: env::var("HARVEST_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            backend,
            http_timeout_secs: parsed("HARVEST_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply `--backend <kind>` and `--ids <path>` command-line overrides
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        if let Some(idx) = args.iter().position(|a| a == "--backend") {
            let raw = args.get(idx + 1).map(String::as_str).unwrap_or("");
            self.backend = BackendType::parse(raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!("--backend {:?} (expected csv, jsonl or sqlite)", raw))
            })?;
        }

        if let Some(idx) = args.iter().position(|a| a == "--ids") {
            let path = args
                .get(idx + 1)
                .ok_or_else(|| ConfigError::InvalidValue("--ids requires a path".to_string()))?;
            self.ids_file = Some(PathBuf::from(path));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [("HARVEST_API_BASE", &self.api_base), ("HARVEST_SITE_URL", &self.site_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }

        let positive = [
            ("HARVEST_PAGE_LIMIT", self.page_limit as u64),
            ("HARVEST_WORKERS", self.workers as u64),
            ("HARVEST_BATCH_SIZE", self.batch_size as u64),
            ("HARVEST_ID_SPACE", self.id_space),
            ("HARVEST_HTTP_TIMEOUT_SECS", self.http_timeout_secs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue(format!("{} must be greater than 0", name)));
            }
        }

        if self.recency_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "HARVEST_RECENCY_DAYS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            limit: self.page_limit,
            page_delay: Duration::from_millis(self.page_delay_ms),
            recency: chrono::Duration::days(self.recency_days),
            site_url: self.site_url.clone(),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            api_base: self.api_base.clone(),
            site_url: self.site_url.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}
