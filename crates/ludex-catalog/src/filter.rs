//! Derived item traits and the closed filter variant
//!
//! Each item folds its metadata and provenance into one trait mask; a
//! listing passes an item iff the mask intersects the requested includes
//! and avoids the requested excludes.

use crate::entry::{EntryArena, EntryId};
use crate::providers::LightgunDatabase;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ItemTraits: u8 {
        /// Every item carries this bit, so an includes mask of `ALL`
        /// selects everything.
        const ALL           = 1 << 0;
        const FAVORITE      = 1 << 1;
        const HIDDEN        = 1 << 2;
        const ADULT         = 1 << 3;
        const NOT_LATEST    = 1 << 4;
        const PRE_INSTALLED = 1 << 5;
        /// Folders with no game anywhere beneath them.
        const NO_GAME       = 1 << 6;
    }
}

impl ItemTraits {
    /// Compute the derived mask for one item.
    pub fn of(arena: &EntryArena, id: EntryId) -> Self {
        let entry = arena.entry(id);
        let mut traits = Self::ALL;

        if entry.metadata.favorite() {
            traits |= Self::FAVORITE;
        }
        if entry.metadata.hidden() {
            traits |= Self::HIDDEN;
        }
        if entry.metadata.adult() {
            traits |= Self::ADULT;
        }
        if !entry.metadata.latest_version() {
            traits |= Self::NOT_LATEST;
        }
        if arena.entry(entry.top_ancestor).read_only {
            traits |= Self::PRE_INSTALLED;
        }
        if entry.is_folder() && !arena.has_game(id) {
            traits |= Self::NO_GAME;
        }

        traits
    }

    /// The standard pass rule: at least one included trait, no excluded one.
    pub fn passes(self, includes: Self, excludes: Self) -> bool {
        self.intersects(includes) && !self.intersects(excludes)
    }
}

/// Predicate over single games, one variant per filter kind. One exhaustive
/// match instead of virtual dispatch.
pub enum GameFilter<'a> {
    All,
    Favorites,
    LastPlayed,
    Multiplayer,
    Tate,
    Lightgun(&'a dyn LightgunDatabase),
    Genre(u32),
    Traits {
        includes: ItemTraits,
        excludes: ItemTraits,
    },
}

impl GameFilter<'_> {
    /// Whether the game passes the filter. Folders never pass.
    pub fn matches(&self, arena: &EntryArena, id: EntryId) -> bool {
        let entry = arena.entry(id);
        if !entry.is_game() {
            return false;
        }
        match self {
            GameFilter::All => true,
            GameFilter::Favorites => entry.metadata.favorite(),
            GameFilter::LastPlayed => entry.metadata.last_played() != 0,
            GameFilter::Multiplayer => entry.metadata.players_min().unwrap_or(1) > 1,
            GameFilter::Tate => entry.metadata.rotation().is_tate(),
            GameFilter::Lightgun(db) => db.matches(entry.name()),
            GameFilter::Genre(id) => entry.metadata.genre_id() == Some(*id),
            GameFilter::Traits { includes, excludes } => {
                ItemTraits::of(arena, id).passes(*includes, *excludes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ChildMode;
    use crate::metadata::GameMetadata;
    use ludex_store::Rotation;

    #[test]
    fn test_trait_derivation() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/recalbox/share_init/roms/nes", ChildMode::Owns, true, false);
        let game = arena.new_game(root, "/recalbox/share_init/roms/nes/mario.nes", GameMetadata::new());
        arena.entry_mut(game).metadata.set_favorite(true);

        let traits = ItemTraits::of(&arena, game);
        assert!(traits.contains(ItemTraits::ALL));
        assert!(traits.contains(ItemTraits::FAVORITE));
        assert!(traits.contains(ItemTraits::PRE_INSTALLED));
        assert!(!traits.contains(ItemTraits::HIDDEN));
    }

    #[test]
    fn test_empty_folder_has_no_game_trait() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        let folder = arena.new_folder(root, "/roms/nes/empty");

        assert!(ItemTraits::of(&arena, folder).contains(ItemTraits::NO_GAME));
        assert!(ItemTraits::of(&arena, root).contains(ItemTraits::NO_GAME));

        arena.new_game(folder, "/roms/nes/empty/game.nes", GameMetadata::new());
        assert!(!ItemTraits::of(&arena, folder).contains(ItemTraits::NO_GAME));
    }

    #[test]
    fn test_pass_rule() {
        let traits = ItemTraits::ALL | ItemTraits::FAVORITE;
        assert!(traits.passes(ItemTraits::ALL, ItemTraits::HIDDEN));
        assert!(traits.passes(ItemTraits::FAVORITE, ItemTraits::empty()));
        assert!(!traits.passes(ItemTraits::HIDDEN, ItemTraits::empty()));
        assert!(!traits.passes(ItemTraits::ALL, ItemTraits::FAVORITE));
    }

    #[test]
    fn test_game_filter_variants() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/arcade", ChildMode::Owns, false, false);
        let game = arena.new_game(root, "/roms/arcade/dino.zip", GameMetadata::new());

        assert!(GameFilter::All.matches(&arena, game));
        assert!(!GameFilter::Favorites.matches(&arena, game));
        assert!(!GameFilter::All.matches(&arena, root));

        arena.entry_mut(game).metadata.set_rotation(Rotation::Right);
        arena.entry_mut(game).metadata.set_players(Some(2), Some(4));
        arena.entry_mut(game).metadata.set_genre_id(Some(7));
        assert!(GameFilter::Tate.matches(&arena, game));
        assert!(GameFilter::Multiplayer.matches(&arena, game));
        assert!(GameFilter::Genre(7).matches(&arena, game));
        assert!(!GameFilter::Genre(8).matches(&arena, game));
    }
}
