//! Comment harvester
//!
//! Scans public comment histories of many accounts, keeps recent comments
//! with enough votes, sorts them into like-only, dislike-only and mixed
//! buckets, and stops once every bucket holds the requested quota.

pub mod config;
pub mod export;
pub mod harvest;

pub use config::{ConfigError, HarvestConfig};
