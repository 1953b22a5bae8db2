//! Recursive tree queries
//!
//! Listing, counting, lookup and boolean reductions over a folder's
//! subtree, including the isolated-chain collapsing used by non-recursive
//! listings.

use crate::entry::{ChildMode, EntryArena, EntryId};
use crate::filter::{GameFilter, ItemTraits};
use std::path::Path;

impl EntryArena {
    /// Unlink `child` from `parent`; when the parent owns its children the
    /// whole child subtree is freed.
    pub fn remove_child(&mut self, parent: EntryId, child: EntryId) {
        let mode = self.entry(parent).child_mode;
        self.entry_mut(parent).children.retain(|&c| c != child);
        if mode == ChildMode::Owns {
            self.free_subtree(child);
        }
    }

    /// Remove `target` wherever it sits beneath `top`. Returns false when
    /// the target is not in the subtree.
    pub fn remove_child_recursively(&mut self, top: EntryId, target: EntryId) -> bool {
        let Some(parent) = self.find_parent_in(top, target) else {
            return false;
        };
        self.remove_child(parent, target);
        true
    }

    fn find_parent_in(&self, top: EntryId, target: EntryId) -> Option<EntryId> {
        for &child in &self.entry(top).children {
            if child == target {
                return Some(top);
            }
            if self.entry(child).is_folder()
                && let Some(found) = self.find_parent_in(child, target)
            {
                return Some(found);
            }
        }
        None
    }

    /// Non-recursive listing of a folder's contents.
    ///
    /// A folder whose entire subtree is a chain of single-child folders
    /// ending in exactly one game collapses into that game, provided the
    /// game passes the filter; when it does not, the branch contributes
    /// nothing. Other folders appear as folders when `include_folders` is
    /// set (and they contain at least one passing game), or are flattened
    /// into their passing games otherwise.
    pub fn items_in(
        &self,
        folder: EntryId,
        includes: ItemTraits,
        excludes: ItemTraits,
        include_folders: bool,
    ) -> Vec<EntryId> {
        let mut items = Vec::new();
        self.list_level(folder, includes, excludes, include_folders, &mut items);
        items
    }

    fn list_level(
        &self,
        folder: EntryId,
        includes: ItemTraits,
        excludes: ItemTraits,
        include_folders: bool,
        items: &mut Vec<EntryId>,
    ) {
        for &child in &self.entry(folder).children {
            if self.entry(child).is_game() {
                if ItemTraits::of(self, child).passes(includes, excludes) {
                    items.push(child);
                }
            } else if let Some(leaf) = self.isolated_chain_leaf(child) {
                if ItemTraits::of(self, leaf).passes(includes, excludes) {
                    items.push(leaf);
                }
            } else if include_folders {
                if self.has_passing_game(child, includes, excludes) {
                    items.push(child);
                }
            } else {
                self.list_level(child, includes, excludes, include_folders, items);
            }
        }
    }

    /// The single game ending a chain of single-child folders, when the
    /// whole subtree under `folder` is such a chain. Empty folders and
    /// branches with more than one child never collapse.
    pub fn isolated_chain_leaf(&self, folder: EntryId) -> Option<EntryId> {
        let mut node = folder;
        loop {
            let entry = self.entry(node);
            if entry.children.len() != 1 {
                return None;
            }
            let only = entry.children[0];
            if self.entry(only).is_game() {
                return Some(only);
            }
            node = only;
        }
    }

    /// All passing games beneath `folder`, plus passing folders when
    /// `include_folders` is set.
    pub fn items_recursively(
        &self,
        folder: EntryId,
        includes: ItemTraits,
        excludes: ItemTraits,
        include_folders: bool,
    ) -> Vec<EntryId> {
        let mut items = Vec::new();
        self.collect_recursively(folder, includes, excludes, include_folders, &mut items);
        items
    }

    fn collect_recursively(
        &self,
        folder: EntryId,
        includes: ItemTraits,
        excludes: ItemTraits,
        include_folders: bool,
        items: &mut Vec<EntryId>,
    ) {
        for &child in &self.entry(folder).children {
            if self.entry(child).is_game() {
                if ItemTraits::of(self, child).passes(includes, excludes) {
                    items.push(child);
                }
            } else {
                if include_folders && ItemTraits::of(self, child).passes(includes, excludes) {
                    items.push(child);
                }
                self.collect_recursively(child, includes, excludes, include_folders, items);
            }
        }
    }

    /// Count of what `items_recursively` would return, without allocating.
    pub fn count_recursively(
        &self,
        folder: EntryId,
        includes: ItemTraits,
        excludes: ItemTraits,
        include_folders: bool,
    ) -> usize {
        let mut count = 0;
        for &child in &self.entry(folder).children {
            if self.entry(child).is_game() {
                if ItemTraits::of(self, child).passes(includes, excludes) {
                    count += 1;
                }
            } else {
                if include_folders && ItemTraits::of(self, child).passes(includes, excludes) {
                    count += 1;
                }
                count += self.count_recursively(child, includes, excludes, include_folders);
            }
        }
        count
    }

    /// All games beneath `folder` passing a predicate filter.
    pub fn filtered_items_recursively(
        &self,
        folder: EntryId,
        filter: &GameFilter<'_>,
    ) -> Vec<EntryId> {
        let mut items = Vec::new();
        self.collect_filtered(folder, filter, &mut items);
        items
    }

    fn collect_filtered(&self, folder: EntryId, filter: &GameFilter<'_>, items: &mut Vec<EntryId>) {
        for &child in &self.entry(folder).children {
            if self.entry(child).is_game() {
                if filter.matches(self, child) {
                    items.push(child);
                }
            } else {
                self.collect_filtered(child, filter, items);
            }
        }
    }

    /// Total games beneath `folder`.
    pub fn game_count(&self, folder: EntryId) -> usize {
        self.entry(folder)
            .children
            .iter()
            .map(|&child| {
                if self.entry(child).is_game() {
                    1
                } else {
                    self.game_count(child)
                }
            })
            .sum()
    }

    pub fn has_game(&self, folder: EntryId) -> bool {
        self.entry(folder).children.iter().any(|&child| {
            self.entry(child).is_game() || self.has_game(child)
        })
    }

    pub fn has_visible_game(&self, folder: EntryId) -> bool {
        self.entry(folder).children.iter().any(|&child| {
            let entry = self.entry(child);
            if entry.is_game() {
                !entry.metadata.hidden()
            } else {
                self.has_visible_game(child)
            }
        })
    }

    /// Whether any game beneath still lacks scraped data.
    pub fn has_scrapable_game(&self, folder: EntryId) -> bool {
        self.entry(folder).children.iter().any(|&child| {
            let entry = self.entry(child);
            if entry.is_game() {
                entry.metadata.description().is_none()
            } else {
                self.has_scrapable_game(child)
            }
        })
    }

    fn has_passing_game(&self, folder: EntryId, includes: ItemTraits, excludes: ItemTraits) -> bool {
        self.entry(folder).children.iter().any(|&child| {
            let entry = self.entry(child);
            if entry.is_game() {
                ItemTraits::of(self, child).passes(includes, excludes)
            } else {
                self.has_passing_game(child, includes, excludes)
            }
        })
    }

    /// Find a game by absolute rom path.
    pub fn lookup_game_by_path(&self, folder: EntryId, path: &Path) -> Option<EntryId> {
        for &child in &self.entry(folder).children {
            let entry = self.entry(child);
            if entry.is_game() {
                if entry.rom_path == path {
                    return Some(child);
                }
            } else if let Some(found) = self.lookup_game_by_path(child, path) {
                return Some(found);
            }
        }
        None
    }

    /// Find a game by file name, with or without extension.
    pub fn lookup_game_by_name(
        &self,
        folder: EntryId,
        name: &str,
        with_extension: bool,
    ) -> Option<EntryId> {
        for &child in &self.entry(folder).children {
            let entry = self.entry(child);
            if entry.is_game() {
                let candidate = if with_extension {
                    entry.file_name()
                } else {
                    entry
                        .rom_path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("")
                };
                if candidate == name {
                    return Some(child);
                }
            } else if let Some(found) = self.lookup_game_by_name(child, name, with_extension) {
                return Some(found);
            }
        }
        None
    }

    /// Find a game by its scraped rom CRC32.
    pub fn lookup_game_by_crc32(&self, folder: EntryId, crc32: &str) -> Option<EntryId> {
        for &child in &self.entry(folder).children {
            let entry = self.entry(child);
            if entry.is_game() {
                if entry.metadata.rom_crc32() == Some(crc32) {
                    return Some(child);
                }
            } else if let Some(found) = self.lookup_game_by_crc32(child, crc32) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ChildMode;
    use crate::metadata::GameMetadata;

    fn all() -> ItemTraits {
        ItemTraits::ALL
    }

    fn none() -> ItemTraits {
        ItemTraits::empty()
    }

    /// roms/
    ///   a.nes
    ///   chain/inner/only.nes          (collapsible)
    ///   wide/{b.nes, c.nes}           (not collapsible)
    ///   empty/                        (not collapsible)
    fn sample(arena: &mut EntryArena) -> EntryId {
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        arena.new_game(root, "/roms/nes/a.nes", GameMetadata::new());

        let chain = arena.new_folder(root, "/roms/nes/chain");
        let inner = arena.new_folder(chain, "/roms/nes/chain/inner");
        arena.new_game(inner, "/roms/nes/chain/inner/only.nes", GameMetadata::new());

        let wide = arena.new_folder(root, "/roms/nes/wide");
        arena.new_game(wide, "/roms/nes/wide/b.nes", GameMetadata::new());
        arena.new_game(wide, "/roms/nes/wide/c.nes", GameMetadata::new());

        arena.new_folder(root, "/roms/nes/empty");
        root
    }

    #[test]
    fn test_isolated_chain_collapses_to_game() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        let items = arena.items_in(root, all(), none(), true);
        let names: Vec<&str> = items.iter().map(|&i| arena.entry(i).name()).collect();

        // a.nes listed, chain collapsed to only.nes, wide kept as folder,
        // empty omitted.
        assert_eq!(names, vec!["a", "only", "wide"]);
    }

    #[test]
    fn test_multi_child_and_empty_never_collapse() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        let wide = arena.entry(root).children[2];
        let empty = arena.entry(root).children[3];
        assert!(arena.isolated_chain_leaf(wide).is_none());
        assert!(arena.isolated_chain_leaf(empty).is_none());
    }

    #[test]
    fn test_collapsed_leaf_failing_filter_drops_branch() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        let chain = arena.entry(root).children[1];
        let leaf = arena.isolated_chain_leaf(chain).unwrap();
        arena.entry_mut(leaf).metadata.set_hidden(true);

        let items = arena.items_in(root, all(), ItemTraits::HIDDEN, true);
        let names: Vec<&str> = items.iter().map(|&i| arena.entry(i).name()).collect();
        assert_eq!(names, vec!["a", "wide"]);
    }

    #[test]
    fn test_flatten_without_folders() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        let items = arena.items_in(root, all(), none(), false);
        let names: Vec<&str> = items.iter().map(|&i| arena.entry(i).name()).collect();
        assert_eq!(names, vec!["a", "only", "b", "c"]);
    }

    #[test]
    fn test_count_matches_listing() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);
        arena
            .entry_mut(arena.lookup_game_by_name(root, "b", false).unwrap())
            .metadata
            .set_hidden(true);

        for include_folders in [false, true] {
            for excludes in [none(), ItemTraits::HIDDEN, ItemTraits::NO_GAME] {
                let listed = arena.items_recursively(root, all(), excludes, include_folders);
                let counted = arena.count_recursively(root, all(), excludes, include_folders);
                assert_eq!(listed.len(), counted);
            }
        }
    }

    #[test]
    fn test_boolean_reductions() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        assert!(arena.has_game(root));
        assert!(arena.has_visible_game(root));
        assert!(arena.has_scrapable_game(root));

        let items = arena.items_recursively(root, all(), none(), false);
        for &game in &items {
            arena.entry_mut(game).metadata.set_hidden(true);
        }
        assert!(arena.has_game(root));
        assert!(!arena.has_visible_game(root));
    }

    #[test]
    fn test_lookups() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        let by_path = arena.lookup_game_by_path(root, Path::new("/roms/nes/wide/c.nes"));
        assert!(by_path.is_some());

        assert!(arena.lookup_game_by_name(root, "only.nes", true).is_some());
        assert!(arena.lookup_game_by_name(root, "only", false).is_some());
        assert!(arena.lookup_game_by_name(root, "missing", false).is_none());

        let game = by_path.unwrap();
        arena.entry_mut(game).metadata.apply_record(&{
            let mut r = ludex_store::GameRecord::new("/roms/nes/wide/c.nes");
            r.rom_crc32 = Some("1A2B3C4D".to_string());
            r
        });
        assert_eq!(arena.lookup_game_by_crc32(root, "1A2B3C4D"), Some(game));
    }

    #[test]
    fn test_remove_child_recursively() {
        let mut arena = EntryArena::new();
        let root = sample(&mut arena);

        let target = arena
            .lookup_game_by_path(root, Path::new("/roms/nes/chain/inner/only.nes"))
            .unwrap();
        assert!(arena.remove_child_recursively(root, target));
        assert!(arena.get(target).is_none());
        assert!(!arena.remove_child_recursively(root, target));
    }
}
