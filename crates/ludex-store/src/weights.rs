//! Load-weight persistence
//!
//! Game counts from the previous run, used to schedule heavier systems
//! first during parallel population. Counts are refreshed after every
//! full load.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WeightFile {
    #[serde(default)]
    counts: HashMap<String, u64>,
}

/// On-disk system-name → game-count store.
#[derive(Debug, Clone, Default)]
pub struct WeightStore {
    path: Option<PathBuf>,
    counts: HashMap<String, u64>,
}

impl WeightStore {
    /// Load from a TOML file; a missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let counts = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let file: WeightFile = toml::from_str(&contents)?;
            file.counts
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: Some(path),
            counts,
        })
    }

    /// Store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, system: &str) -> u64 {
        self.counts.get(system).copied().unwrap_or(0)
    }

    pub fn set(&mut self, system: &str, count: u64) {
        self.counts.insert(system.to_string(), count);
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = WeightFile {
            counts: self.counts.clone(),
        };
        std::fs::write(path, toml::to_string_pretty(&file)?)?;
        tracing::debug!("Saved {} weights to {}", self.counts.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = WeightStore::load(dir.path().join("weights.toml")).unwrap();
        assert_eq!(store.get("nes"), 0);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("weights.toml");

        let mut store = WeightStore::load(&path).unwrap();
        store.set("snes", 412);
        store.set("nes", 97);
        store.save().unwrap();

        let reloaded = WeightStore::load(&path).unwrap();
        assert_eq!(reloaded.get("snes"), 412);
        assert_eq!(reloaded.get("nes"), 97);
        assert_eq!(reloaded.get("gba"), 0);
    }
}
