//! Gamelist record types and providers

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Screen rotation requested by a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    None,
    Left,
    Upside,
    Right,
}

impl Rotation {
    /// True for vertical (tate) orientations.
    pub fn is_tate(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }
}

/// One persisted metadata record, keyed by absolute rom path.
///
/// Mirrors what the external gamelist store keeps per game. The catalog
/// writes back only records whose in-memory metadata carries the dirty bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub path: PathBuf,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub rating: Option<f32>,

    #[serde(default)]
    pub favorite: bool,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub adult: bool,

    #[serde(default)]
    pub play_count: u32,

    /// Unix epoch of the last session, 0 when never played.
    #[serde(default)]
    pub last_played: u64,

    #[serde(default)]
    pub rotation: Rotation,

    #[serde(default)]
    pub genre_id: Option<u32>,

    #[serde(default)]
    pub players_min: Option<u32>,

    #[serde(default)]
    pub players_max: Option<u32>,

    #[serde(default)]
    pub developer: Option<String>,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(default)]
    pub release_date: Option<String>,

    /// Emulator override for this one game.
    #[serde(default)]
    pub emulator: Option<String>,

    /// Core override for this one game.
    #[serde(default)]
    pub core: Option<String>,

    /// Display ratio override ("4/3", "16/9", ...).
    #[serde(default)]
    pub ratio: Option<String>,

    #[serde(default = "default_true")]
    pub latest_version: bool,

    /// CRC32 of the rom image, as scraped.
    #[serde(default)]
    pub rom_crc32: Option<String>,
}

fn default_true() -> bool {
    true
}

impl GameRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
            description: None,
            rating: None,
            favorite: false,
            hidden: false,
            adult: false,
            play_count: 0,
            last_played: 0,
            rotation: Rotation::None,
            genre_id: None,
            players_min: None,
            players_max: None,
            developer: None,
            publisher: None,
            release_date: None,
            emulator: None,
            core: None,
            ratio: None,
            latest_version: true,
            rom_crc32: None,
        }
    }
}

/// External gamelist store, one record set per rom root.
pub trait GamelistProvider {
    /// Records persisted for games under the given rom root.
    fn records_for(&self, rom_root: &Path) -> Result<Vec<GameRecord>, StoreError>;

    /// Write back records for games under the given rom root, replacing any
    /// previous record with the same path.
    fn write_back(&mut self, rom_root: &Path, records: &[GameRecord]) -> Result<(), StoreError>;
}

/// In-memory provider, used by tests and by frontends that keep their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryGamelist {
    roots: HashMap<PathBuf, Vec<GameRecord>>,
}

impl MemoryGamelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one record under a rom root.
    pub fn insert(&mut self, rom_root: impl Into<PathBuf>, record: GameRecord) {
        self.roots.entry(rom_root.into()).or_default().push(record);
    }

    pub fn record_count(&self) -> usize {
        self.roots.values().map(Vec::len).sum()
    }
}

impl GamelistProvider for MemoryGamelist {
    fn records_for(&self, rom_root: &Path) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.roots.get(rom_root).cloned().unwrap_or_default())
    }

    fn write_back(&mut self, rom_root: &Path, records: &[GameRecord]) -> Result<(), StoreError> {
        let stored = self.roots.entry(rom_root.to_path_buf()).or_default();
        for record in records {
            match stored.iter_mut().find(|r| r.path == record.path) {
                Some(existing) => *existing = record.clone(),
                None => stored.push(record.clone()),
            }
        }
        Ok(())
    }
}

/// File-backed provider keeping one `gamelist.json` per rom root.
#[derive(Debug, Default)]
pub struct JsonGamelist {
    file_name: String,
}

impl JsonGamelist {
    pub fn new() -> Self {
        Self {
            file_name: "gamelist.json".to_string(),
        }
    }

    fn file_for(&self, rom_root: &Path) -> PathBuf {
        rom_root.join(&self.file_name)
    }
}

impl GamelistProvider for JsonGamelist {
    fn records_for(&self, rom_root: &Path) -> Result<Vec<GameRecord>, StoreError> {
        let file = self.file_for(rom_root);
        if !file.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&file)?;
        let records: Vec<GameRecord> = serde_json::from_str(&contents)?;
        Ok(records)
    }

    fn write_back(&mut self, rom_root: &Path, records: &[GameRecord]) -> Result<(), StoreError> {
        let mut merged = self.records_for(rom_root)?;
        for record in records {
            match merged.iter_mut().find(|r| r.path == record.path) {
                Some(existing) => *existing = record.clone(),
                None => merged.push(record.clone()),
            }
        }

        let file = self.file_for(rom_root);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file, serde_json::to_string_pretty(&merged)?)?;
        tracing::debug!("Wrote {} records to {}", merged.len(), file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_write_back_replaces_by_path() {
        let mut store = MemoryGamelist::new();
        let root = PathBuf::from("/roms/nes");

        let mut record = GameRecord::new("/roms/nes/mario.nes");
        record.name = Some("Mario".to_string());
        store.insert(&root, record.clone());

        record.favorite = true;
        store.write_back(&root, &[record]).unwrap();

        let records = store.records_for(&root).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].favorite);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = JsonGamelist::new();

        let mut record = GameRecord::new(dir.path().join("zelda.sfc"));
        record.rating = Some(0.9);
        record.rotation = Rotation::Left;
        store.write_back(dir.path(), std::slice::from_ref(&record)).unwrap();

        let records = store.records_for(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rating, Some(0.9));
        assert!(records[0].rotation.is_tate());
        assert!(records[0].latest_version);
    }

    #[test]
    fn test_missing_gamelist_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonGamelist::new();
        assert!(store.records_for(dir.path()).unwrap().is_empty());
    }
}
