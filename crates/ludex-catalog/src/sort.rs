//! Sort engine
//!
//! Composable comparators over entry ids plus an in-place quicksort.
//! Folders always precede games whatever the key or direction; ties on the
//! primary key fall back to case-insensitive name comparison.

use crate::entry::{EntryArena, EntryId};
use crate::providers::ArcadeDatabase;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Rating,
    PlayCount,
    LastPlayed,
    Players,
    Developer,
    Publisher,
    ReleaseDate,
}

/// Explicit sort context passed to every comparison, replacing any global
/// comparator table.
pub struct SortContext<'a> {
    pub key: SortKey,
    pub ascending: bool,
    /// When set, raw rom names are substituted with database display names
    /// before comparison (arcade systems).
    pub arcade: Option<&'a dyn ArcadeDatabase>,
}

impl<'a> SortContext<'a> {
    pub fn new(key: SortKey, ascending: bool) -> Self {
        Self {
            key,
            ascending,
            arcade: None,
        }
    }

    pub fn with_arcade(mut self, arcade: &'a dyn ArcadeDatabase) -> Self {
        self.arcade = Some(arcade);
        self
    }

    fn display_name(&self, arena: &EntryArena, id: EntryId) -> String {
        let entry = arena.entry(id);
        if let Some(db) = self.arcade
            && entry.is_game()
            && let Some(resolved) = db.display_name(entry.name())
        {
            return resolved.to_lowercase();
        }
        entry.name().to_lowercase()
    }

    pub fn compare(&self, arena: &EntryArena, a: EntryId, b: EntryId) -> Ordering {
        let ea = arena.entry(a);
        let eb = arena.entry(b);

        // Folder-vs-game resolves first, independent of key and direction.
        match (ea.is_folder(), eb.is_folder()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }

        let mut ordering = self.key_compare(arena, a, b);
        if !self.ascending {
            ordering = ordering.reverse();
        }
        if ordering == Ordering::Equal {
            ordering = self
                .display_name(arena, a)
                .cmp(&self.display_name(arena, b));
        }
        ordering
    }

    fn key_compare(&self, arena: &EntryArena, a: EntryId, b: EntryId) -> Ordering {
        let ma = &arena.entry(a).metadata;
        let mb = &arena.entry(b).metadata;
        match self.key {
            SortKey::Name => self
                .display_name(arena, a)
                .cmp(&self.display_name(arena, b)),
            SortKey::Rating => ma
                .rating()
                .unwrap_or(0.0)
                .total_cmp(&mb.rating().unwrap_or(0.0)),
            SortKey::PlayCount => ma.play_count().cmp(&mb.play_count()),
            SortKey::LastPlayed => ma.last_played().cmp(&mb.last_played()),
            SortKey::Players => ma
                .players_max()
                .unwrap_or(1)
                .cmp(&mb.players_max().unwrap_or(1)),
            SortKey::Developer => cmp_opt_ci(ma.developer(), mb.developer()),
            SortKey::Publisher => cmp_opt_ci(ma.publisher(), mb.publisher()),
            SortKey::ReleaseDate => cmp_opt_ci(ma.release_date(), mb.release_date()),
        }
    }
}

/// Case-insensitive option compare; unset values sort last.
fn cmp_opt_ci(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// In-place quicksort over entry ids: middle-element pivot, Hoare-style
/// partition with `<=` boundary scanning, tolerant of duplicate keys.
pub fn sort_items(arena: &EntryArena, items: &mut [EntryId], ctx: &SortContext<'_>) {
    if items.len() > 1 {
        quick_sort(arena, items, ctx, 0, (items.len() - 1) as isize);
    }
}

fn quick_sort(
    arena: &EntryArena,
    items: &mut [EntryId],
    ctx: &SortContext<'_>,
    low: isize,
    high: isize,
) {
    let pivot = items[((low + high) / 2) as usize];
    let mut i = low;
    let mut j = high;

    while i <= j {
        while ctx.compare(arena, items[i as usize], pivot) == Ordering::Less {
            i += 1;
        }
        while ctx.compare(arena, items[j as usize], pivot) == Ordering::Greater {
            j -= 1;
        }
        if i <= j {
            items.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
        }
    }

    if low < j {
        quick_sort(arena, items, ctx, low, j);
    }
    if i < high {
        quick_sort(arena, items, ctx, i, high);
    }
}
