//! Per-game mutable metadata
//!
//! Every mutation goes through a setter that raises the dirty bit and
//! reports which field changed; the changed-field mask drives both the
//! gamelist write-back and the incremental virtual-system updates.

use bitflags::bitflags;
use ludex_store::{GameRecord, Rotation};
use std::path::Path;

bitflags! {
    /// One bit per persisted metadata field.
    ///
    /// Doubles as the per-system sensitivity mask: a virtual system
    /// re-evaluates a game's membership only when the changed mask
    /// intersects its sensitivity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MetadataField: u32 {
        const NAME           = 1 << 0;
        const DESCRIPTION    = 1 << 1;
        const RATING         = 1 << 2;
        const FAVORITE       = 1 << 3;
        const HIDDEN         = 1 << 4;
        const ADULT          = 1 << 5;
        const PLAY_COUNT     = 1 << 6;
        const LAST_PLAYED    = 1 << 7;
        const ROTATION       = 1 << 8;
        const GENRE          = 1 << 9;
        const PLAYERS        = 1 << 10;
        const DEVELOPER      = 1 << 11;
        const PUBLISHER      = 1 << 12;
        const EMULATOR       = 1 << 13;
        const RATIO          = 1 << 14;
        const LATEST_VERSION = 1 << 15;
    }
}

impl MetadataField {
    /// Fields indexed by the fast-search series.
    pub fn searchable() -> Self {
        Self::NAME | Self::DESCRIPTION | Self::DEVELOPER | Self::PUBLISHER
    }
}

/// Mutable metadata bag attached to every game entry.
#[derive(Debug, Clone, Default)]
pub struct GameMetadata {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) rating: Option<f32>,
    pub(crate) favorite: bool,
    pub(crate) hidden: bool,
    pub(crate) adult: bool,
    pub(crate) play_count: u32,
    pub(crate) last_played: u64,
    pub(crate) rotation: Rotation,
    pub(crate) genre_id: Option<u32>,
    pub(crate) players_min: Option<u32>,
    pub(crate) players_max: Option<u32>,
    pub(crate) developer: Option<String>,
    pub(crate) publisher: Option<String>,
    pub(crate) release_date: Option<String>,
    pub(crate) emulator: Option<String>,
    pub(crate) core: Option<String>,
    pub(crate) ratio: Option<String>,
    pub(crate) latest_version: bool,
    pub(crate) rom_crc32: Option<String>,
    dirty: bool,
}

impl GameMetadata {
    pub fn new() -> Self {
        Self {
            latest_version: true,
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rating(&self) -> Option<f32> {
        self.rating
    }

    pub fn favorite(&self) -> bool {
        self.favorite
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn adult(&self) -> bool {
        self.adult
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    pub fn last_played(&self) -> u64 {
        self.last_played
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn genre_id(&self) -> Option<u32> {
        self.genre_id
    }

    pub fn players_min(&self) -> Option<u32> {
        self.players_min
    }

    pub fn players_max(&self) -> Option<u32> {
        self.players_max
    }

    pub fn developer(&self) -> Option<&str> {
        self.developer.as_deref()
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn release_date(&self) -> Option<&str> {
        self.release_date.as_deref()
    }

    pub fn emulator(&self) -> Option<&str> {
        self.emulator.as_deref()
    }

    pub fn core(&self) -> Option<&str> {
        self.core.as_deref()
    }

    pub fn ratio(&self) -> Option<&str> {
        self.ratio.as_deref()
    }

    pub fn latest_version(&self) -> bool {
        self.latest_version
    }

    pub fn rom_crc32(&self) -> Option<&str> {
        self.rom_crc32.as_deref()
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    fn change(&mut self, field: MetadataField) -> MetadataField {
        self.dirty = true;
        field
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> MetadataField {
        let name = name.into();
        if self.name.as_deref() == Some(name.as_str()) {
            return MetadataField::empty();
        }
        self.name = Some(name);
        self.change(MetadataField::NAME)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> MetadataField {
        let description = description.into();
        if self.description.as_deref() == Some(description.as_str()) {
            return MetadataField::empty();
        }
        self.description = Some(description);
        self.change(MetadataField::DESCRIPTION)
    }

    pub fn set_rating(&mut self, rating: f32) -> MetadataField {
        if self.rating == Some(rating) {
            return MetadataField::empty();
        }
        self.rating = Some(rating);
        self.change(MetadataField::RATING)
    }

    pub fn set_favorite(&mut self, favorite: bool) -> MetadataField {
        if self.favorite == favorite {
            return MetadataField::empty();
        }
        self.favorite = favorite;
        self.change(MetadataField::FAVORITE)
    }

    pub fn set_hidden(&mut self, hidden: bool) -> MetadataField {
        if self.hidden == hidden {
            return MetadataField::empty();
        }
        self.hidden = hidden;
        self.change(MetadataField::HIDDEN)
    }

    pub fn set_adult(&mut self, adult: bool) -> MetadataField {
        if self.adult == adult {
            return MetadataField::empty();
        }
        self.adult = adult;
        self.change(MetadataField::ADULT)
    }

    /// Record one play session: bump the counter and stamp the epoch.
    pub fn record_play(&mut self, epoch: u64) -> MetadataField {
        self.play_count += 1;
        self.last_played = epoch;
        self.change(MetadataField::PLAY_COUNT | MetadataField::LAST_PLAYED)
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> MetadataField {
        if self.rotation == rotation {
            return MetadataField::empty();
        }
        self.rotation = rotation;
        self.change(MetadataField::ROTATION)
    }

    pub fn set_genre_id(&mut self, genre_id: Option<u32>) -> MetadataField {
        if self.genre_id == genre_id {
            return MetadataField::empty();
        }
        self.genre_id = genre_id;
        self.change(MetadataField::GENRE)
    }

    pub fn set_players(&mut self, min: Option<u32>, max: Option<u32>) -> MetadataField {
        if self.players_min == min && self.players_max == max {
            return MetadataField::empty();
        }
        self.players_min = min;
        self.players_max = max;
        self.change(MetadataField::PLAYERS)
    }

    pub fn set_developer(&mut self, developer: impl Into<String>) -> MetadataField {
        let developer = developer.into();
        if self.developer.as_deref() == Some(developer.as_str()) {
            return MetadataField::empty();
        }
        self.developer = Some(developer);
        self.change(MetadataField::DEVELOPER)
    }

    pub fn set_publisher(&mut self, publisher: impl Into<String>) -> MetadataField {
        let publisher = publisher.into();
        if self.publisher.as_deref() == Some(publisher.as_str()) {
            return MetadataField::empty();
        }
        self.publisher = Some(publisher);
        self.change(MetadataField::PUBLISHER)
    }

    pub fn set_emulator(&mut self, emulator: Option<String>, core: Option<String>) -> MetadataField {
        if self.emulator == emulator && self.core == core {
            return MetadataField::empty();
        }
        self.emulator = emulator;
        self.core = core;
        self.change(MetadataField::EMULATOR)
    }

    pub fn set_ratio(&mut self, ratio: Option<String>) -> MetadataField {
        if self.ratio == ratio {
            return MetadataField::empty();
        }
        self.ratio = ratio;
        self.change(MetadataField::RATIO)
    }

    pub fn set_latest_version(&mut self, latest: bool) -> MetadataField {
        if self.latest_version == latest {
            return MetadataField::empty();
        }
        self.latest_version = latest;
        self.change(MetadataField::LATEST_VERSION)
    }

    /// Import a persisted record without raising the dirty bit.
    pub fn apply_record(&mut self, record: &GameRecord) {
        self.name = record.name.clone();
        self.description = record.description.clone();
        self.rating = record.rating;
        self.favorite = record.favorite;
        self.hidden = record.hidden;
        self.adult = record.adult;
        self.play_count = record.play_count;
        self.last_played = record.last_played;
        self.rotation = record.rotation;
        self.genre_id = record.genre_id;
        self.players_min = record.players_min;
        self.players_max = record.players_max;
        self.developer = record.developer.clone();
        self.publisher = record.publisher.clone();
        self.release_date = record.release_date.clone();
        self.emulator = record.emulator.clone();
        self.core = record.core.clone();
        self.ratio = record.ratio.clone();
        self.latest_version = record.latest_version;
        self.rom_crc32 = record.rom_crc32.clone();
    }

    /// Export to a persisted record and clear the dirty bit.
    pub fn take_record(&mut self, path: &Path) -> GameRecord {
        self.dirty = false;
        GameRecord {
            path: path.to_path_buf(),
            name: self.name.clone(),
            description: self.description.clone(),
            rating: self.rating,
            favorite: self.favorite,
            hidden: self.hidden,
            adult: self.adult,
            play_count: self.play_count,
            last_played: self.last_played,
            rotation: self.rotation,
            genre_id: self.genre_id,
            players_min: self.players_min,
            players_max: self.players_max,
            developer: self.developer.clone(),
            publisher: self.publisher.clone(),
            release_date: self.release_date.clone(),
            emulator: self.emulator.clone(),
            core: self.core.clone(),
            ratio: self.ratio.clone(),
            latest_version: self.latest_version,
            rom_crc32: self.rom_crc32.clone(),
        }
    }
}
