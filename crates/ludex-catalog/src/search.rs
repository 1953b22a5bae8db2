//! Fast fuzzy search index
//!
//! One interned table of normalized strings shared by all fields; per field
//! a forward-chained series mapping string index → owning games. The index
//! is built once and reused until the set of searchable systems changes.

use crate::entry::{EntryArena, EntryId};
use crate::filter::ItemTraits;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Searchable fields, in chain-walk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Path = 0,
    Name = 1,
    Description = 2,
    Developer = 3,
    Publisher = 4,
}

const FIELD_COUNT: usize = 5;

/// What a search request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchContext {
    Path,
    Name,
    Description,
    Developer,
    Publisher,
    All,
}

impl SearchContext {
    fn fields(self) -> &'static [SearchField] {
        match self {
            SearchContext::Path => &[SearchField::Path],
            SearchContext::Name => &[SearchField::Name],
            SearchContext::Description => &[SearchField::Description],
            SearchContext::Developer => &[SearchField::Developer],
            SearchContext::Publisher => &[SearchField::Publisher],
            SearchContext::All => &[
                SearchField::Name,
                SearchField::Path,
                SearchField::Description,
                SearchField::Developer,
                SearchField::Publisher,
            ],
        }
    }
}

/// Interned normalized (lower-cased) strings.
#[derive(Debug, Default)]
struct Interner {
    strings: Vec<String>,
    indices: HashMap<String, u32>,
}

impl Interner {
    fn intern(&mut self, raw: &str) -> u32 {
        let normalized = raw.to_lowercase();
        if let Some(&index) = self.indices.get(&normalized) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(normalized.clone());
        self.indices.insert(normalized, index);
        index
    }

    fn len(&self) -> usize {
        self.strings.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    item: EntryId,
    next: i32,
}

/// Per-field chained index: `heads[i]` points into `cells` for normalized
/// string `i`; additional items sharing the string chain through `next`.
#[derive(Debug, Default)]
struct Series {
    heads: Vec<i32>,
    cells: Vec<Cell>,
}

impl Series {
    fn grow(&mut self, len: usize) {
        if self.heads.len() < len {
            self.heads.resize(len, -1);
        }
    }

    fn insert(&mut self, string_index: u32, item: EntryId) {
        let pos = self.cells.len() as i32;
        let head = &mut self.heads[string_index as usize];
        self.cells.push(Cell { item, next: *head });
        *head = pos;
    }

    fn walk(&self, string_index: u32, mut visit: impl FnMut(EntryId) -> bool) {
        let Some(&head) = self.heads.get(string_index as usize) else {
            return;
        };
        let mut cursor = head;
        while cursor >= 0 {
            let cell = self.cells[cursor as usize];
            if !visit(cell.item) {
                return;
            }
            cursor = cell.next;
        }
    }
}

/// Cached fuzzy search over all searchable systems.
///
/// The cache is keyed by the identity of the searchable-system set (a hash
/// of their full names); any visibility change invalidates it.
#[derive(Debug, Default)]
pub struct FastSearcher {
    interner: Interner,
    series: [Series; FIELD_COUNT],
    identity: u64,
    built: bool,
}

impl FastSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a rebuild on the next query.
    pub fn invalidate(&mut self) {
        self.built = false;
    }

    fn identity_of<'a>(full_names: impl Iterator<Item = &'a str>) -> u64 {
        let mut hasher = DefaultHasher::new();
        for name in full_names {
            name.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Rebuild the series when the searchable-system set changed since the
    /// last build. `roots` carries `(system full name, root id)` pairs for
    /// every currently searchable system.
    pub fn ensure_built(&mut self, arena: &EntryArena, roots: &[(&str, EntryId)]) {
        let identity = Self::identity_of(roots.iter().map(|(name, _)| *name));
        if self.built && identity == self.identity {
            return;
        }

        tracing::debug!("Rebuilding search index over {} roots", roots.len());
        self.interner = Interner::default();
        self.series = Default::default();

        let mut games = Vec::new();
        for &(_, root) in roots {
            games.extend(arena.items_recursively(
                root,
                ItemTraits::ALL,
                ItemTraits::HIDDEN,
                false,
            ));
        }

        for game in games {
            let entry = arena.entry(game);
            let path = entry.rom_path.to_string_lossy();
            self.index_value(SearchField::Path, &path, game);
            self.index_value(SearchField::Name, entry.name(), game);
            if let Some(description) = entry.metadata.description() {
                self.index_value(SearchField::Description, description, game);
            }
            if let Some(developer) = entry.metadata.developer() {
                self.index_value(SearchField::Developer, developer, game);
            }
            if let Some(publisher) = entry.metadata.publisher() {
                self.index_value(SearchField::Publisher, publisher, game);
            }
        }

        self.identity = identity;
        self.built = true;
    }

    fn index_value(&mut self, field: SearchField, value: &str, item: EntryId) {
        if value.is_empty() {
            return;
        }
        let index = self.interner.intern(value);
        let series = &mut self.series[field as usize];
        series.grow(self.interner.len());
        series.insert(index, item);
    }

    /// Fuzzy query: collect `(string index, distance)` hits over the
    /// interned table, order them by distance, then walk the requested
    /// fields' chains until `max_results` games are collected.
    pub fn search(
        &self,
        context: SearchContext,
        text: &str,
        max_results: usize,
    ) -> Vec<EntryId> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() || !self.built {
            return Vec::new();
        }

        let mut hits: Vec<(u32, u32)> = Vec::new();
        for (index, candidate) in self.interner.strings.iter().enumerate() {
            if let Some(distance) = fuzzy_distance(&needle, candidate) {
                hits.push((index as u32, distance));
            }
        }

        // Index order first so equal-index hits collapse to the lowest
        // distance, then distance order for the walk.
        hits.sort_unstable();
        hits.dedup_by(|later, first| {
            if later.0 == first.0 {
                first.1 = first.1.min(later.1);
                true
            } else {
                false
            }
        });
        hits.sort_unstable_by_key(|&(index, distance)| (distance, index));

        let mut results = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for &(index, _) in &hits {
            for &field in context.fields() {
                self.series[field as usize].walk(index, |item| {
                    if seen.insert(item) {
                        results.push(item);
                    }
                    results.len() < max_results
                });
                if results.len() >= max_results {
                    return results;
                }
            }
        }
        results
    }
}

/// In-order fuzzy match of `needle` inside `haystack` (both normalized).
///
/// Returns the match distance: the offset of the first matched character
/// plus twice the sum of the gaps between subsequent matches. A contiguous
/// prefix match scores 0.
pub fn fuzzy_distance(needle: &str, haystack: &str) -> Option<u32> {
    let hay: Vec<char> = haystack.chars().collect();
    let mut position = 0usize;
    let mut first_offset = 0u32;
    let mut gaps = 0u32;
    let mut matched_any = false;

    for wanted in needle.chars() {
        let found = hay[position..].iter().position(|&c| c == wanted)?;
        if matched_any {
            gaps += found as u32;
        } else {
            first_offset = found as u32;
            matched_any = true;
        }
        position += found + 1;
    }

    matched_any.then_some(first_offset + 2 * gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ChildMode;
    use crate::metadata::GameMetadata;

    fn build_index(arena: &EntryArena, roots: &[(&str, EntryId)]) -> FastSearcher {
        let mut searcher = FastSearcher::new();
        searcher.ensure_built(arena, roots);
        searcher
    }

    fn sample_arena() -> (EntryArena, EntryId) {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        for name in ["mario.nes", "metroid.nes", "zelda.nes"] {
            arena.new_game(root, format!("/roms/nes/{name}"), GameMetadata::new());
        }
        (arena, root)
    }

    #[test]
    fn test_exact_prefix_scores_zero() {
        assert_eq!(fuzzy_distance("mario", "mario.nes"), Some(0));
        assert_eq!(fuzzy_distance("ario", "mario.nes"), Some(1));
        assert!(fuzzy_distance("mario", "metroid.nes").is_none());
        // Scattered in-order match costs more than a contiguous one.
        assert!(fuzzy_distance("mro", "mario.nes").unwrap() > 0);
    }

    #[test]
    fn test_search_by_name() {
        let (arena, root) = sample_arena();
        let searcher = build_index(&arena, &[("Nintendo Entertainment System", root)]);

        let results = searcher.search(SearchContext::Name, "mario", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(arena.entry(results[0]).name(), "mario");
    }

    #[test]
    fn test_closer_matches_rank_first() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        let far = arena.new_game(root, "/roms/nes/super mega metro.nes", GameMetadata::new());
        let near = arena.new_game(root, "/roms/nes/metro.nes", GameMetadata::new());

        let searcher = build_index(&arena, &[("nes", root)]);
        let results = searcher.search(SearchContext::Name, "metro", 10);
        assert_eq!(results, vec![near, far]);
    }

    #[test]
    fn test_max_results_cutoff() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        for i in 0..20 {
            arena.new_game(root, format!("/roms/nes/game{i:02}.nes"), GameMetadata::new());
        }

        let searcher = build_index(&arena, &[("nes", root)]);
        let results = searcher.search(SearchContext::Name, "game", 5);
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_hidden_games_not_indexed() {
        let (mut arena, root) = sample_arena();
        let zelda = arena.lookup_game_by_name(root, "zelda", false).unwrap();
        arena.entry_mut(zelda).metadata.set_hidden(true);

        let searcher = build_index(&arena, &[("nes", root)]);
        assert!(searcher.search(SearchContext::Name, "zelda", 10).is_empty());
    }

    #[test]
    fn test_identity_change_triggers_rebuild() {
        let (mut arena, root) = sample_arena();
        let mut searcher = FastSearcher::new();
        searcher.ensure_built(&arena, &[("nes", root)]);

        let snes = arena.new_root("/roms/snes", ChildMode::Owns, false, false);
        arena.new_game(snes, "/roms/snes/chrono.sfc", GameMetadata::new());

        // Same set: cache kept, new system unknown.
        searcher.ensure_built(&arena, &[("nes", root)]);
        assert!(searcher.search(SearchContext::Name, "chrono", 10).is_empty());

        // Set changed: rebuilt, new system searchable.
        searcher.ensure_built(&arena, &[("nes", root), ("snes", snes)]);
        assert_eq!(searcher.search(SearchContext::Name, "chrono", 10).len(), 1);
    }

    #[test]
    fn test_duplicate_field_values_chain() {
        let mut arena = EntryArena::new();
        let root = arena.new_root("/roms/nes", ChildMode::Owns, false, false);
        let a = arena.new_game(root, "/roms/nes/a.nes", GameMetadata::new());
        let b = arena.new_game(root, "/roms/nes/b.nes", GameMetadata::new());
        arena.entry_mut(a).metadata.set_developer("Capcom");
        arena.entry_mut(b).metadata.set_developer("Capcom");

        let searcher = build_index(&arena, &[("nes", root)]);
        let results = searcher.search(SearchContext::Developer, "capcom", 10);
        assert_eq!(results.len(), 2);
    }
}
