//! Virtual system composition
//!
//! Each virtual kind is a pure membership predicate over the union of all
//! regular systems' games. Full builds collect members into a synthetic
//! aliasing root; single-game metadata changes move exactly one entry in
//! or out, never triggering a rebuild.

use crate::entry::{ChildMode, EntryArena, EntryId};
use crate::populate::DoppelgangerMap;
use crate::providers::{ArcadeDatabase, LightgunDatabase};
use crate::system::{SystemData, SystemState, VirtualKind};
use std::collections::hash_map::Entry as MapEntry;
use tracing::debug;

/// External databases some predicates consult.
#[derive(Clone, Copy, Default)]
pub(crate) struct Providers<'a> {
    pub arcade: Option<&'a dyn ArcadeDatabase>,
    pub lightgun: Option<&'a dyn LightgunDatabase>,
}

/// Whether `game`, owned by regular system `owner`, belongs in a virtual
/// system of the given kind.
///
/// Panics on `VirtualKind::None`: a regular system reaching the virtual
/// dispatcher is a programming-invariant violation, not a data problem.
pub(crate) fn is_member(
    arena: &EntryArena,
    kind: &VirtualKind,
    owner: &SystemData,
    game: EntryId,
    providers: &Providers<'_>,
) -> bool {
    let entry = arena.entry(game);
    match kind {
        VirtualKind::None => {
            panic!("regular system reached the virtual population dispatcher")
        }
        VirtualKind::Favorites => entry.metadata.favorite(),
        VirtualKind::LastPlayed => entry.metadata.last_played() != 0,
        VirtualKind::Multiplayers => entry.metadata.players_min().unwrap_or(1) > 1,
        VirtualKind::AllGames => true,
        VirtualKind::Lightgun => providers
            .lightgun
            .is_some_and(|db| db.matches(entry.name())),
        VirtualKind::Tate => entry.metadata.rotation().is_tate(),
        VirtualKind::Ports => owner.properties.contains(crate::system::SystemProperties::PORTS),
        VirtualKind::Arcade => providers
            .arcade
            .is_some_and(|db| db.is_arcade_system(&owner.descriptor)),
        VirtualKind::Genre(id) => entry.metadata.genre_id() == Some(*id),
        VirtualKind::ArcadeManufacturer(manufacturer) => providers.arcade.is_some_and(|db| {
            db.is_arcade_system(&owner.descriptor)
                && db.manufacturer(entry.name()).as_deref() == Some(manufacturer.as_str())
        }),
    }
}

/// Collect every matching game over the regular systems. Ports collects
/// top-level entries only; every other kind walks the trees recursively.
pub(crate) fn collect_members(
    arena: &EntryArena,
    kind: &VirtualKind,
    regulars: &[&SystemData],
    providers: &Providers<'_>,
) -> Vec<EntryId> {
    let mut members = Vec::new();
    for system in regulars {
        for &root in &system.roots {
            if *kind == VirtualKind::Ports {
                for &child in &arena.entry(root).children {
                    if arena.entry(child).is_game()
                        && is_member(arena, kind, system, child, providers)
                    {
                        members.push(child);
                    }
                }
            } else {
                for game in arena.filtered_items_recursively(root, &crate::filter::GameFilter::All)
                {
                    if is_member(arena, kind, system, game, providers) {
                        members.push(game);
                    }
                }
            }
        }
    }
    members
}

/// Full build: one synthetic non-owning root, members re-homed through a
/// fresh doppelganger map so overlapping source systems never duplicate an
/// entry. Systems with no matching game are left uninitialized, eligible
/// for a later retry.
pub(crate) fn populate_virtual(
    arena: &mut EntryArena,
    system: &mut SystemData,
    members: &[EntryId],
) -> usize {
    system.state = SystemState::Populated {
        has_game: !members.is_empty(),
    };
    if members.is_empty() {
        return 0;
    }

    let root = arena.new_root(
        format!("virtual://{}", system.descriptor.name),
        ChildMode::Aliases,
        false,
        true,
    );

    let mut doppelganger = DoppelgangerMap::new();
    let mut added = 0;
    for &game in members {
        let path = arena.entry(game).rom_path.clone();
        if let MapEntry::Vacant(slot) = doppelganger.entry(path) {
            slot.insert(game);
            arena.alias_into(root, game);
            added += 1;
        }
    }

    system.roots = vec![root];
    system.state = SystemState::Initialized;
    debug!("Virtual system '{}' populated with {added} games", system.descriptor.name);
    added
}

/// Tear a virtual system's synthetic tree down, leaving the aliased games
/// alive in their owning trees.
pub(crate) fn delete_virtual_subtree(arena: &mut EntryArena, system: &mut SystemData) {
    for root in system.roots.drain(..) {
        arena.free_subtree(root);
    }
    system.state = SystemState::Uninitialized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MembershipChange {
    Added,
    Removed,
}

/// Incremental update: exactly one insert or remove on a membership
/// transition, nothing otherwise.
pub(crate) fn update_membership(
    arena: &mut EntryArena,
    system: &mut SystemData,
    game: EntryId,
    should_be_in: bool,
) -> Option<MembershipChange> {
    let root = system.master_root();
    let is_already_in =
        root.is_some_and(|root| arena.entry(root).children.contains(&game));

    match (is_already_in, should_be_in) {
        (false, true) => {
            let root = match root {
                Some(root) => root,
                None => {
                    let root = arena.new_root(
                        format!("virtual://{}", system.descriptor.name),
                        ChildMode::Aliases,
                        false,
                        true,
                    );
                    system.roots = vec![root];
                    system.state = SystemState::Initialized;
                    root
                }
            };
            arena.alias_into(root, game);
            Some(MembershipChange::Added)
        }
        (true, false) => {
            if let Some(root) = root {
                arena.unalias(root, game);
            }
            Some(MembershipChange::Removed)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SystemDescriptor;
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

    fn regular_with_games(
        arena: &mut EntryArena,
        name: &str,
        games: &[&str],
    ) -> (SystemData, Vec<EntryId>) {
        let root = arena.new_root(format!("/roms/{name}"), ChildMode::Owns, false, false);
        let ids: Vec<EntryId> = games
            .iter()
            .map(|game| arena.new_game(root, format!("/roms/{name}/{game}"), GameMetadata::new()))
            .collect();
        (SystemData::new_regular(descriptor(name), vec![root]), ids)
    }

    #[test]
    fn test_favorites_full_build() {
        let mut arena = EntryArena::new();
        let (nes, games) = regular_with_games(&mut arena, "nes", &["a.nes", "b.nes"]);
        arena.entry_mut(games[0]).metadata.set_favorite(true);

        let mut favorites =
            SystemData::new_virtual(descriptor("favorites"), VirtualKind::Favorites, crate::system::SystemProperties::empty());

        let providers = Providers::default();
        let members = collect_members(&arena, &VirtualKind::Favorites, &[&nes], &providers);
        assert_eq!(members, vec![games[0]]);

        let added = populate_virtual(&mut arena, &mut favorites, &members);
        assert_eq!(added, 1);
        assert_eq!(favorites.state, SystemState::Initialized);
        assert!(favorites.has_game(&arena));

        // The aliased game still belongs to its owning tree.
        assert_eq!(arena.entry(games[0]).top_ancestor, nes.roots[0]);
    }

    #[test]
    fn test_empty_virtual_left_uninitialized() {
        let mut arena = EntryArena::new();
        let (nes, _) = regular_with_games(&mut arena, "nes", &["a.nes"]);

        let mut tate =
            SystemData::new_virtual(descriptor("tate"), VirtualKind::Tate, crate::system::SystemProperties::empty());
        let providers = Providers::default();
        let members = collect_members(&arena, &VirtualKind::Tate, &[&nes], &providers);
        populate_virtual(&mut arena, &mut tate, &members);

        assert_eq!(tate.state, SystemState::Populated { has_game: false });
        assert!(tate.roots.is_empty());
    }

    #[test]
    fn test_doppelganger_prevents_duplicates() {
        let mut arena = EntryArena::new();
        let (_, games) = regular_with_games(&mut arena, "nes", &["a.nes"]);

        let mut all =
            SystemData::new_virtual(descriptor("allgames"), VirtualKind::AllGames, crate::system::SystemProperties::empty());
        // Same game contributed twice (overlapping sources).
        let added = populate_virtual(&mut arena, &mut all, &[games[0], games[0]]);
        assert_eq!(added, 1);
        assert_eq!(arena.entry(all.roots[0]).children.len(), 1);
    }

    #[test]
    fn test_incremental_toggle_round_trip() {
        let mut arena = EntryArena::new();
        let (nes, games) = regular_with_games(&mut arena, "nes", &["a.nes", "b.nes"]);
        arena.entry_mut(games[0]).metadata.set_favorite(true);

        let mut favorites =
            SystemData::new_virtual(descriptor("favorites"), VirtualKind::Favorites, crate::system::SystemProperties::empty());
        let providers = Providers::default();
        let members = collect_members(&arena, &VirtualKind::Favorites, &[&nes], &providers);
        populate_virtual(&mut arena, &mut favorites, &members);
        let before: Vec<EntryId> = arena.entry(favorites.roots[0]).children.clone();

        // b joins, then leaves again.
        arena.entry_mut(games[1]).metadata.set_favorite(true);
        assert_eq!(
            update_membership(&mut arena, &mut favorites, games[1], true),
            Some(MembershipChange::Added)
        );
        arena.entry_mut(games[1]).metadata.set_favorite(false);
        assert_eq!(
            update_membership(&mut arena, &mut favorites, games[1], false),
            Some(MembershipChange::Removed)
        );

        // No transition, no change.
        assert_eq!(update_membership(&mut arena, &mut favorites, games[1], false), None);
        assert_eq!(arena.entry(favorites.roots[0]).children, before);
    }

    #[test]
    fn test_delete_virtual_subtree_spares_games() {
        let mut arena = EntryArena::new();
        let (nes, games) = regular_with_games(&mut arena, "nes", &["a.nes"]);

        let mut all =
            SystemData::new_virtual(descriptor("allgames"), VirtualKind::AllGames, crate::system::SystemProperties::empty());
        let providers = Providers::default();
        let members = collect_members(&arena, &VirtualKind::AllGames, &[&nes], &providers);
        populate_virtual(&mut arena, &mut all, &members);

        delete_virtual_subtree(&mut arena, &mut all);
        assert_eq!(all.state, SystemState::Uninitialized);
        assert!(all.roots.is_empty());
        assert!(arena.get(games[0]).is_some());
    }

    #[test]
    #[should_panic(expected = "virtual population dispatcher")]
    fn test_regular_kind_aborts_dispatch() {
        let mut arena = EntryArena::new();
        let (nes, games) = regular_with_games(&mut arena, "nes", &["a.nes"]);
        let providers = Providers::default();
        is_member(&arena, &VirtualKind::None, &nes, games[0], &providers);
    }

    #[test]
    fn test_ports_collects_top_level_only() {
        let mut arena = EntryArena::new();
        let (mut ports, _) = regular_with_games(&mut arena, "ports", &["doom.bin"]);
        ports.properties |= crate::system::SystemProperties::PORTS;
        let sub = arena.new_folder(ports.roots[0], "/roms/ports/sub");
        arena.new_game(sub, "/roms/ports/sub/nested.bin", GameMetadata::new());

        let providers = Providers::default();
        let members = collect_members(&arena, &VirtualKind::Ports, &[&ports], &providers);
        assert_eq!(members.len(), 1);
        assert_eq!(arena.entry(members[0]).name(), "doom");
    }
}
