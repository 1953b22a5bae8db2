//! System binding
//!
//! Binds a static descriptor to one or more populated roots, carries the
//! property flags and the metadata-sensitivity mask, and answers the
//! aggregate queries the frontend asks per system.

use crate::descriptor::SystemDescriptor;
use crate::entry::{EntryArena, EntryId};
use crate::metadata::MetadataField;
use bitflags::bitflags;
use std::path::Path;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemProperties: u32 {
        const FAVORITE    = 1 << 0;
        const VIRTUAL     = 1 << 1;
        const PORTS       = 1 << 2;
        const FIXED_SORT  = 1 << 3;
        const ALWAYS_FLAT = 1 << 4;
        const SEARCHABLE  = 1 << 5;
    }
}

/// Which virtual aggregation a system is, `None` for regular systems.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VirtualKind {
    None,
    Favorites,
    LastPlayed,
    Multiplayers,
    AllGames,
    Lightgun,
    Tate,
    Ports,
    Arcade,
    Genre(u32),
    ArcadeManufacturer(String),
}

impl VirtualKind {
    /// Metadata fields whose change can move a game in or out of this
    /// virtual system.
    pub fn sensitivity(&self) -> MetadataField {
        match self {
            VirtualKind::Favorites => MetadataField::FAVORITE,
            VirtualKind::LastPlayed => MetadataField::LAST_PLAYED,
            VirtualKind::Multiplayers => MetadataField::PLAYERS,
            VirtualKind::Tate => MetadataField::ROTATION,
            VirtualKind::Genre(_) => MetadataField::GENRE,
            VirtualKind::Lightgun => MetadataField::NAME,
            VirtualKind::None
            | VirtualKind::AllGames
            | VirtualKind::Ports
            | VirtualKind::Arcade
            | VirtualKind::ArcadeManufacturer(_) => MetadataField::empty(),
        }
    }
}

/// Population state of a (virtual) system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Uninitialized,
    Populated { has_game: bool },
    Initialized,
}

/// A descriptor bound to its populated roots.
#[derive(Debug)]
pub struct SystemData {
    pub descriptor: SystemDescriptor,
    /// Master root set: one per physical base for regular systems, one
    /// synthetic root for populated virtual systems.
    pub roots: Vec<EntryId>,
    pub properties: SystemProperties,
    pub virtual_kind: VirtualKind,
    pub sensitivity: MetadataField,
    pub state: SystemState,
}

impl SystemData {
    pub fn new_regular(descriptor: SystemDescriptor, roots: Vec<EntryId>) -> Self {
        let state = if roots.is_empty() {
            SystemState::Uninitialized
        } else {
            SystemState::Initialized
        };
        let mut properties = SystemProperties::SEARCHABLE;
        if descriptor.name == "ports" {
            properties |= SystemProperties::PORTS;
        }
        Self {
            descriptor,
            roots,
            properties,
            virtual_kind: VirtualKind::None,
            sensitivity: MetadataField::empty(),
            state,
        }
    }

    pub fn new_virtual(
        descriptor: SystemDescriptor,
        kind: VirtualKind,
        extra_properties: SystemProperties,
    ) -> Self {
        let sensitivity = kind.sensitivity();
        Self {
            descriptor,
            roots: Vec::new(),
            properties: SystemProperties::VIRTUAL | extra_properties,
            virtual_kind: kind,
            sensitivity,
            state: SystemState::Uninitialized,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.properties.contains(SystemProperties::VIRTUAL)
    }

    pub fn is_searchable(&self) -> bool {
        self.properties.contains(SystemProperties::SEARCHABLE)
    }

    pub fn has_fixed_sort(&self) -> bool {
        self.properties.contains(SystemProperties::FIXED_SORT)
    }

    /// First root of the master root set.
    pub fn master_root(&self) -> Option<EntryId> {
        self.roots.first().copied()
    }

    pub fn count_all(&self, arena: &EntryArena) -> usize {
        self.roots.iter().map(|&root| arena.game_count(root)).sum()
    }

    pub fn count_favorites(&self, arena: &EntryArena) -> usize {
        self.count_where(arena, |arena, id| arena.entry(id).metadata.favorite())
    }

    pub fn count_hidden(&self, arena: &EntryArena) -> usize {
        self.count_where(arena, |arena, id| arena.entry(id).metadata.hidden())
    }

    fn count_where(
        &self,
        arena: &EntryArena,
        predicate: impl Fn(&EntryArena, EntryId) -> bool + Copy,
    ) -> usize {
        self.roots
            .iter()
            .map(|&root| {
                arena
                    .filtered_items_recursively(root, &crate::filter::GameFilter::All)
                    .into_iter()
                    .filter(|&id| predicate(arena, id))
                    .count()
            })
            .sum()
    }

    pub fn has_game(&self, arena: &EntryArena) -> bool {
        self.roots.iter().any(|&root| arena.has_game(root))
    }

    pub fn has_visible_game(&self, arena: &EntryArena) -> bool {
        self.roots.iter().any(|&root| arena.has_visible_game(root))
    }

    pub fn lookup_game(&self, arena: &EntryArena, path: &Path) -> Option<EntryId> {
        self.roots
            .iter()
            .find_map(|&root| arena.lookup_game_by_path(root, path))
    }

    /// Whether this system's trees contain the given entry.
    pub fn contains(&self, arena: &EntryArena, id: EntryId) -> bool {
        let path = &arena.entry(id).rom_path;
        self.roots.iter().any(|&root| {
            if self.is_virtual() {
                arena.entry(root).children.contains(&id)
            } else {
                arena.lookup_game_by_path(root, path) == Some(id)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ChildMode;
    use crate::metadata::GameMetadata;

    fn descriptor(name: &str) -> SystemDescriptor {
        SystemDescriptor {
            guid: format!("{name}-guid"),
            name: name.to_string(),
            full_name: name.to_uppercase(),
            rom_path: format!("%ROOT%/{name}"),
            extensions: ".bin".to_string(),
            theme_folder: String::new(),
            command: String::new(),
            icon: String::new(),
            scraper_id: 0,
            release_date: String::new(),
            manufacturer: String::new(),
            devices: Default::default(),
            emulators: vec![],
            ignored_files: vec![],
        }
    }

    #[test]
    fn test_counts() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        let a = arena.new_game(root, "/roms/nes/a.nes", GameMetadata::new());
        arena.new_game(root, "/roms/nes/b.nes", GameMetadata::new());
        arena.entry_mut(a).metadata.set_favorite(true);

        let system = SystemData::new_regular(descriptor("nes"), vec![root]);
        assert_eq!(system.count_all(&arena), 2);
        assert_eq!(system.count_favorites(&arena), 1);
        assert_eq!(system.count_hidden(&arena), 0);
        assert!(system.has_visible_game(&arena));
    }

    #[test]
    fn test_virtual_sensitivity() {
        let favorites = SystemData::new_virtual(
            descriptor("favorites"),
            VirtualKind::Favorites,
            SystemProperties::FAVORITE,
        );
        assert!(favorites.is_virtual());
        assert_eq!(favorites.sensitivity, MetadataField::FAVORITE);
        assert_eq!(favorites.state, SystemState::Uninitialized);

        assert_eq!(
            VirtualKind::AllGames.sensitivity(),
            MetadataField::empty()
        );
        assert_eq!(VirtualKind::Tate.sensitivity(), MetadataField::ROTATION);
    }
}
