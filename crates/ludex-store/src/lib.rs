//! Persisted-record storage for the Ludex catalog engine.
//!
//! The catalog core never parses gamelist XML itself; whatever format the
//! frontend persists, the core consumes and produces the structured records
//! defined here. This crate also holds the small on-disk weight store used
//! to schedule system population.

mod record;
mod weights;

pub use record::{GameRecord, GamelistProvider, JsonGamelist, MemoryGamelist, Rotation};
pub use weights::WeightStore;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record file not found: {0}")]
    NotFound(PathBuf),

    #[error("Malformed record file: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
