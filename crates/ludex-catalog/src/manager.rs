//! Catalog orchestrator
//!
//! Drives the two-phase parallel load, owns `AllSystems` and the
//! order-preserving `VisibleSystems` subsequence, applies incremental
//! metadata updates to the virtual systems, and fronts the fast search.

use crate::CatalogError;
use crate::descriptor::SystemDescriptor;
use crate::entry::{ChildMode, EntryArena, EntryId};
use crate::filter::GameFilter;
use crate::metadata::{GameMetadata, MetadataField};
use crate::populate::{DoppelgangerMap, RootPopulator};
use crate::providers::{ArcadeDatabase, LightgunDatabase};
use crate::search::{FastSearcher, SearchContext};
use crate::system::{SystemData, SystemProperties, VirtualKind};
use crate::virtuals::{self, Providers};
use ludex_store::{GameRecord, GamelistProvider, WeightStore};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One physical base directory under which systems keep their rom folders.
#[derive(Debug, Clone)]
pub struct RootSpec {
    pub base: PathBuf,
    /// Share-init template bases are read-only; their games carry the
    /// pre-installed trait.
    pub read_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Scan the filesystem in addition to the gamelist records. Worker
    /// jobs only ever read this flag.
    pub from_disk: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { from_disk: true }
    }
}

/// Visibility and content deltas, indexed into `AllSystems`. Callers get
/// these instead of raw booleans so the UI can update incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemDelta {
    Shown(usize),
    Hidden(usize),
    Updated(usize),
}

/// Frontend callbacks driven by the deltas.
pub trait CatalogObserver {
    fn show_system(&mut self, _index: usize, _system: &SystemData) {}
    fn hide_system(&mut self, _index: usize, _system: &SystemData) {}
    fn update_system(&mut self, _index: usize, _system: &SystemData) {}
    fn select_system(&mut self, _index: usize, _system: &SystemData) {}
}

/// Result of one phase-1 worker job, built on a private arena and merged
/// single-threaded after the pool joins.
struct PopulatedSystem {
    descriptor: SystemDescriptor,
    arena: EntryArena,
    roots: Vec<EntryId>,
}

pub struct SystemManager {
    arena: EntryArena,
    systems: Vec<SystemData>,
    /// Indices into `systems`; always an order-preserving subsequence.
    visible: Vec<usize>,
    searcher: FastSearcher,
    weights: WeightStore,
    gamelist: Box<dyn GamelistProvider + Send + Sync>,
    arcade: Option<Box<dyn ArcadeDatabase>>,
    lightgun: Option<Box<dyn LightgunDatabase>>,
    roots: Vec<RootSpec>,
    /// The all-games aggregation is opt-in, like the other collection
    /// toggles the frontend exposes.
    show_all_games: bool,
}

impl SystemManager {
    pub fn new(
        roots: Vec<RootSpec>,
        weights: WeightStore,
        gamelist: Box<dyn GamelistProvider + Send + Sync>,
    ) -> Self {
        Self {
            arena: EntryArena::new(),
            systems: Vec::new(),
            visible: Vec::new(),
            searcher: FastSearcher::new(),
            weights,
            gamelist,
            arcade: None,
            lightgun: None,
            roots,
            show_all_games: false,
        }
    }

    pub fn with_all_games(mut self, enabled: bool) -> Self {
        self.show_all_games = enabled;
        self
    }

    pub fn with_arcade(mut self, db: Box<dyn ArcadeDatabase>) -> Self {
        self.arcade = Some(db);
        self
    }

    pub fn with_lightgun(mut self, db: Box<dyn LightgunDatabase>) -> Self {
        self.lightgun = Some(db);
        self
    }

    pub fn arena(&self) -> &EntryArena {
        &self.arena
    }

    pub fn systems(&self) -> &[SystemData] {
        &self.systems
    }

    pub fn visible_systems(&self) -> impl Iterator<Item = &SystemData> {
        self.visible.iter().map(|&index| &self.systems[index])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn system_index_by_name(&self, name: &str) -> Option<usize> {
        self.systems
            .iter()
            .position(|system| system.descriptor.name == name)
    }

    pub fn system_by_name(&self, name: &str) -> Option<&SystemData> {
        self.system_index_by_name(name)
            .map(|index| &self.systems[index])
    }

    /// Full load: regular systems in parallel (phase 1), virtual systems
    /// in parallel (phase 2), then visibility assembly. The calling thread
    /// blocks until both pools join. Final order is deterministic:
    /// descriptor order for regular systems, priority order for virtual
    /// ones, independent of job-completion order.
    pub fn load_all(
        &mut self,
        descriptors: &[SystemDescriptor],
        options: &LoadOptions,
    ) -> Result<Vec<SystemDelta>, CatalogError> {
        self.arena = EntryArena::new();
        self.systems.clear();
        self.visible.clear();
        self.searcher.invalidate();

        self.load_regular_systems(descriptors, options);
        self.load_virtual_systems();

        let deltas = self.rebuild_visible();
        self.refresh_weights();

        if self.visible.is_empty() {
            return Err(CatalogError::NoVisibleSystems);
        }
        info!(
            "Loaded {} systems, {} visible",
            self.systems.len(),
            self.visible.len()
        );
        Ok(deltas)
    }

    fn load_regular_systems(&mut self, descriptors: &[SystemDescriptor], options: &LoadOptions) {
        let valid: Vec<&SystemDescriptor> = descriptors
            .iter()
            .filter(|descriptor| match descriptor.validate() {
                Ok(()) => true,
                Err(reason) => {
                    warn!("Skipping malformed descriptor '{}': {reason}", descriptor.name);
                    false
                }
            })
            .collect();

        // Heavier systems first, by previously persisted game counts.
        let mut order: Vec<usize> = (0..valid.len()).collect();
        order.sort_by_key(|&index| Reverse(self.weights.get(&valid[index].name)));

        let bases = self.roots.clone();
        let gamelist = self.gamelist.as_ref();
        let from_disk = options.from_disk;

        let results: Vec<(usize, Option<PopulatedSystem>)> = order
            .par_iter()
            .map(|&index| {
                let descriptor = valid[index];
                match build_regular_system(descriptor, &bases, gamelist, from_disk) {
                    Ok(populated) => (index, Some(populated)),
                    Err(err) => {
                        // Job-boundary failure isolation: this system is
                        // omitted, the load continues.
                        warn!("System '{}' failed to load: {err}", descriptor.name);
                        (index, None)
                    }
                }
            })
            .collect();

        // Each job's result lands in its original index's slot.
        let mut slots: Vec<Option<PopulatedSystem>> = Vec::with_capacity(valid.len());
        slots.resize_with(valid.len(), || None);
        for (index, populated) in results {
            slots[index] = populated;
        }

        for populated in slots.into_iter().flatten() {
            let base = self.arena.absorb(populated.arena);
            let roots = populated
                .roots
                .into_iter()
                .map(|root| EntryId(root.0 + base))
                .collect();
            self.systems
                .push(SystemData::new_regular(populated.descriptor, roots));
        }
    }

    fn load_virtual_systems(&mut self) {
        let planned = self.plan_virtual_systems();

        let blueprints: Vec<(u32, VirtualKind, SystemProperties, Vec<EntryId>)> = {
            let arena = &self.arena;
            let regulars: Vec<&SystemData> = self.systems.iter().collect();
            let providers = Providers {
                arcade: self.arcade.as_deref(),
                lightgun: self.lightgun.as_deref(),
            };
            let mut blueprints: Vec<_> = planned
                .par_iter()
                .map(|(priority, kind, properties)| {
                    let members = virtuals::collect_members(arena, kind, &regulars, &providers);
                    (*priority, kind.clone(), *properties, members)
                })
                .collect();
            // Deterministic order by manually assigned priority index,
            // whatever the completion order was.
            blueprints.sort_by_key(|blueprint| blueprint.0);
            blueprints
        };

        for (_, kind, properties, members) in blueprints {
            let descriptor = virtual_descriptor(&kind);
            let mut system = SystemData::new_virtual(descriptor, kind, properties);
            virtuals::populate_virtual(&mut self.arena, &mut system, &members);
            self.systems.push(system);
        }
    }

    /// The virtual systems this catalog composes, with their priority
    /// indices.
    fn plan_virtual_systems(&self) -> Vec<(u32, VirtualKind, SystemProperties)> {
        let mut planned = vec![
            (0, VirtualKind::Favorites, SystemProperties::FAVORITE),
            (1, VirtualKind::LastPlayed, SystemProperties::FIXED_SORT),
            (2, VirtualKind::Multiplayers, SystemProperties::empty()),
            (4, VirtualKind::Tate, SystemProperties::empty()),
            (5, VirtualKind::Ports, SystemProperties::ALWAYS_FLAT),
        ];
        if self.show_all_games {
            planned.push((3, VirtualKind::AllGames, SystemProperties::empty()));
        }
        if self.lightgun.is_some() {
            planned.push((6, VirtualKind::Lightgun, SystemProperties::empty()));
        }
        if self.arcade.is_some() {
            planned.push((7, VirtualKind::Arcade, SystemProperties::empty()));
        }

        let mut genres = BTreeSet::new();
        for system in &self.systems {
            for &root in &system.roots {
                for game in self.arena.filtered_items_recursively(root, &GameFilter::All) {
                    if let Some(genre) = self.arena.entry(game).metadata.genre_id() {
                        genres.insert(genre);
                    }
                }
            }
        }
        for (offset, genre) in genres.into_iter().enumerate() {
            planned.push((100 + offset as u32, VirtualKind::Genre(genre), SystemProperties::empty()));
        }

        if let Some(db) = self.arcade.as_deref() {
            let mut manufacturers = BTreeSet::new();
            for system in self.systems.iter().filter(|s| db.is_arcade_system(&s.descriptor)) {
                for &root in &system.roots {
                    for game in self.arena.filtered_items_recursively(root, &GameFilter::All) {
                        if let Some(manufacturer) = db.manufacturer(self.arena.entry(game).name()) {
                            manufacturers.insert(manufacturer);
                        }
                    }
                }
            }
            for (offset, manufacturer) in manufacturers.into_iter().enumerate() {
                planned.push((
                    200 + offset as u32,
                    VirtualKind::ArcadeManufacturer(manufacturer),
                    SystemProperties::empty(),
                ));
            }
        }

        planned
    }

    fn system_visible(&self, index: usize) -> bool {
        self.systems[index].has_visible_game(&self.arena)
    }

    /// Recompute the visible subsequence from scratch, reporting edges.
    fn rebuild_visible(&mut self) -> Vec<SystemDelta> {
        let old = std::mem::take(&mut self.visible);
        let new: Vec<usize> = (0..self.systems.len())
            .filter(|&index| self.system_visible(index))
            .collect();

        let mut deltas = Vec::new();
        for &index in &new {
            if !old.contains(&index) {
                deltas.push(SystemDelta::Shown(index));
            }
        }
        for &index in &old {
            if !new.contains(&index) {
                deltas.push(SystemDelta::Hidden(index));
            }
        }

        self.visible = new;
        if !deltas.is_empty() {
            self.searcher.invalidate();
        }
        deltas
    }

    /// Track one system across a visibility edge, inserting at the
    /// position that preserves `AllSystems` order.
    fn sync_visibility(&mut self, index: usize, deltas: &mut Vec<SystemDelta>) {
        let now = self.system_visible(index);
        let position = self.visible.iter().position(|&v| v == index);
        match (position, now) {
            (None, true) => {
                let at = self
                    .visible
                    .iter()
                    .position(|&v| v > index)
                    .unwrap_or(self.visible.len());
                self.visible.insert(at, index);
                deltas.push(SystemDelta::Shown(index));
                self.searcher.invalidate();
            }
            (Some(at), false) => {
                self.visible.remove(at);
                deltas.push(SystemDelta::Hidden(index));
                self.searcher.invalidate();
            }
            _ => {}
        }
    }

    /// The regular system owning a game, by provenance.
    pub fn owner_of(&self, game: EntryId) -> Option<usize> {
        let top = self.arena.entry(game).top_ancestor;
        self.systems
            .iter()
            .position(|system| !system.is_virtual() && system.roots.contains(&top))
    }

    /// Mutate one game's metadata and propagate the change. The closure
    /// returns the changed-field mask its setters reported.
    pub fn update_metadata(
        &mut self,
        game: EntryId,
        mutate: impl FnOnce(&mut GameMetadata) -> MetadataField,
    ) -> Vec<SystemDelta> {
        let changed = mutate(&mut self.arena.entry_mut(game).metadata);
        self.notify_game_changed(game, changed)
    }

    /// Single-game incremental update: only virtual systems whose
    /// sensitivity intersects the changed mask re-evaluate this game's
    /// membership; each transition is exactly one insert or remove.
    pub fn notify_game_changed(&mut self, game: EntryId, changed: MetadataField) -> Vec<SystemDelta> {
        let mut deltas = Vec::new();
        if changed.is_empty() {
            return deltas;
        }

        let owner = self.owner_of(game);
        if let Some(owner_index) = owner {
            deltas.push(SystemDelta::Updated(owner_index));
            if changed.contains(MetadataField::HIDDEN) {
                self.sync_visibility(owner_index, &mut deltas);
            }
        }

        for index in 0..self.systems.len() {
            let kind = {
                let system = &self.systems[index];
                if !system.is_virtual() || !system.sensitivity.intersects(changed) {
                    continue;
                }
                system.virtual_kind.clone()
            };

            let should_be_in = {
                let providers = Providers {
                    arcade: self.arcade.as_deref(),
                    lightgun: self.lightgun.as_deref(),
                };
                match owner {
                    Some(owner_index) => virtuals::is_member(
                        &self.arena,
                        &kind,
                        &self.systems[owner_index],
                        game,
                        &providers,
                    ),
                    None => false,
                }
            };

            let change =
                virtuals::update_membership(&mut self.arena, &mut self.systems[index], game, should_be_in);
            if change.is_some() {
                debug!(
                    "Game '{}' membership changed in '{}'",
                    self.arena.entry(game).name(),
                    self.systems[index].descriptor.name
                );
                deltas.push(SystemDelta::Updated(index));
                self.sync_visibility(index, &mut deltas);
            }
        }

        // Hiding a game changes no membership, but it can flip
        // has_visible_game for every virtual system aliasing it.
        if changed.contains(MetadataField::HIDDEN) {
            for index in 0..self.systems.len() {
                let aliases_game = {
                    let system = &self.systems[index];
                    system.is_virtual() && system.contains(&self.arena, game)
                };
                if aliases_game {
                    deltas.push(SystemDelta::Updated(index));
                    self.sync_visibility(index, &mut deltas);
                }
            }
        }

        if changed.intersects(MetadataField::searchable() | MetadataField::HIDDEN) {
            self.searcher.invalidate();
        }
        deltas
    }

    /// Bulk change (initial scrape, multi-game import): affected virtual
    /// systems are fully torn down and repopulated instead of being
    /// updated game by game.
    pub fn notify_bulk_change(&mut self, changed: MetadataField) -> Vec<SystemDelta> {
        let mut deltas = Vec::new();
        for index in 0..self.systems.len() {
            let affected = {
                let system = &self.systems[index];
                system.is_virtual() && system.sensitivity.intersects(changed)
            };
            if affected {
                self.rebuild_virtual(index, &mut deltas);
            }
        }
        // A bulk hidden change can flip visibility anywhere, including
        // systems whose sensitivity never intersects the mask.
        if changed.contains(MetadataField::HIDDEN) {
            for index in 0..self.systems.len() {
                self.sync_visibility(index, &mut deltas);
            }
        }
        if changed.intersects(MetadataField::searchable() | MetadataField::HIDDEN) {
            self.searcher.invalidate();
        }
        deltas
    }

    fn rebuild_virtual(&mut self, index: usize, deltas: &mut Vec<SystemDelta>) {
        let kind = self.systems[index].virtual_kind.clone();
        let members = {
            let regulars: Vec<&SystemData> =
                self.systems.iter().filter(|s| !s.is_virtual()).collect();
            let providers = Providers {
                arcade: self.arcade.as_deref(),
                lightgun: self.lightgun.as_deref(),
            };
            virtuals::collect_members(&self.arena, &kind, &regulars, &providers)
        };
        virtuals::delete_virtual_subtree(&mut self.arena, &mut self.systems[index]);
        virtuals::populate_virtual(&mut self.arena, &mut self.systems[index], &members);
        deltas.push(SystemDelta::Updated(index));
        self.sync_visibility(index, deltas);
    }

    fn rebuild_all_virtuals(&mut self, deltas: &mut Vec<SystemDelta>) {
        for index in 0..self.systems.len() {
            if self.systems[index].is_virtual() {
                self.rebuild_virtual(index, deltas);
            }
        }
    }

    /// Fuzzy search over the currently searchable systems, optionally
    /// narrowed to one target system. The series cache is rebuilt lazily
    /// when the searchable set changed.
    pub fn search(
        &mut self,
        context: SearchContext,
        text: &str,
        max_results: usize,
        target: Option<usize>,
    ) -> Vec<EntryId> {
        let searchable: Vec<(&str, EntryId)> = self
            .visible
            .iter()
            .map(|&index| &self.systems[index])
            .filter(|system| system.is_searchable() && !system.is_virtual())
            .flat_map(|system| {
                system
                    .roots
                    .iter()
                    .map(move |&root| (system.descriptor.full_name.as_str(), root))
            })
            .collect();

        self.searcher.ensure_built(&self.arena, &searchable);

        match target {
            None => self.searcher.search(context, text, max_results),
            Some(target) => {
                let mut results = self.searcher.search(context, text, usize::MAX);
                // Aliased games keep their physical top ancestor, so go
                // through the system's own containment check.
                let system = &self.systems[target];
                results.retain(|&id| system.contains(&self.arena, id));
                results.truncate(max_results);
                results
            }
        }
    }

    /// Write dirty metadata back to the gamelist store, clearing the
    /// dirty bits. Only dirty-flagged entries leave the core.
    pub fn write_back_dirty(&mut self) -> Result<usize, CatalogError> {
        let mut written = 0;
        for index in 0..self.systems.len() {
            if self.systems[index].is_virtual() {
                continue;
            }
            for position in 0..self.systems[index].roots.len() {
                let root = self.systems[index].roots[position];
                let dirty: Vec<EntryId> = self
                    .arena
                    .filtered_items_recursively(root, &GameFilter::All)
                    .into_iter()
                    .filter(|&game| self.arena.entry(game).metadata.dirty())
                    .collect();
                if dirty.is_empty() {
                    continue;
                }

                let rom_dir = self.arena.entry(root).rom_path.clone();
                let records: Vec<GameRecord> = dirty
                    .into_iter()
                    .map(|game| {
                        let path = self.arena.entry(game).rom_path.clone();
                        self.arena.entry_mut(game).metadata.take_record(&path)
                    })
                    .collect();
                self.gamelist.write_back(&rom_dir, &records)?;
                written += records.len();
            }
        }
        debug!("Wrote back {written} dirty records");
        Ok(written)
    }

    fn refresh_weights(&mut self) {
        for system in self.systems.iter().filter(|s| !s.is_virtual()) {
            self.weights
                .set(&system.descriptor.name, system.count_all(&self.arena) as u64);
        }
        if let Err(err) = self.weights.save() {
            warn!("Could not persist load weights: {err}");
        }
    }

    /// Mirror the rom folder skeleton onto a newly mounted device.
    pub fn create_rom_folders_in(&self, device: &Path) -> Result<usize, CatalogError> {
        if !device.is_dir() {
            return Err(CatalogError::RootNotFound(device.to_path_buf()));
        }
        let mut created = 0;
        for system in self.systems.iter().filter(|s| !s.is_virtual()) {
            let dir = system.descriptor.rom_dir_for(device);
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                created += 1;
            }
        }
        info!("Created {created} rom folders under {}", device.display());
        Ok(created)
    }

    /// Device hot-plug: populate newly reachable rom folders and retry
    /// virtual systems that stayed uninitialized. Runs single-threaded on
    /// the caller's thread; serializing against an in-flight `load_all`
    /// is the caller's responsibility.
    pub fn on_device_mounted(&mut self, mount: &Path) -> Result<Vec<SystemDelta>, CatalogError> {
        self.roots.push(RootSpec {
            base: mount.to_path_buf(),
            read_only: false,
        });

        let mut deltas = Vec::new();
        for index in 0..self.systems.len() {
            if self.systems[index].is_virtual() {
                continue;
            }
            let descriptor = self.systems[index].descriptor.clone();
            let rom_dir = descriptor.rom_dir_for(mount);
            if !rom_dir.is_dir() {
                continue;
            }

            // Seed the doppelganger map with the system's existing games
            // so the new root never duplicates one.
            let mut map = DoppelgangerMap::new();
            for &root in &self.systems[index].roots {
                for game in self.arena.filtered_items_recursively(root, &GameFilter::All) {
                    map.insert(self.arena.entry(game).rom_path.clone(), game);
                }
            }

            let records = self.gamelist.records_for(&rom_dir)?;
            let root = self
                .arena
                .new_root(rom_dir.clone(), ChildMode::Owns, false, false);
            {
                let mut populator = RootPopulator::new(&mut self.arena, root, &descriptor);
                populator.scan_disk(&mut map);
                populator.merge_records(&records, &mut map);
            }

            if self.arena.has_game(root) {
                self.systems[index].roots.push(root);
                deltas.push(SystemDelta::Updated(index));
                self.sync_visibility(index, &mut deltas);
            } else {
                self.arena.free_subtree(root);
            }
        }

        self.rebuild_all_virtuals(&mut deltas);
        self.searcher.invalidate();
        Ok(deltas)
    }

    /// Device removal: drop every root under the mount point and rebuild
    /// the virtual systems that may have aliased its games.
    pub fn on_device_unmounted(&mut self, mount: &Path) -> Vec<SystemDelta> {
        self.roots.retain(|spec| !spec.base.starts_with(mount));

        let mut deltas = Vec::new();
        let mut any_removed = false;
        for index in 0..self.systems.len() {
            if self.systems[index].is_virtual() {
                continue;
            }
            let removed: Vec<EntryId> = self.systems[index]
                .roots
                .iter()
                .copied()
                .filter(|&root| self.arena.entry(root).rom_path.starts_with(mount))
                .collect();
            if removed.is_empty() {
                continue;
            }

            self.systems[index].roots.retain(|root| !removed.contains(root));
            for root in removed {
                self.arena.free_subtree(root);
            }
            any_removed = true;
            deltas.push(SystemDelta::Updated(index));
            self.sync_visibility(index, &mut deltas);
        }

        if any_removed {
            self.rebuild_all_virtuals(&mut deltas);
            self.searcher.invalidate();
        }
        deltas
    }

    /// Fan deltas out to the frontend callbacks.
    pub fn dispatch(&self, deltas: &[SystemDelta], observer: &mut dyn CatalogObserver) {
        for &delta in deltas {
            match delta {
                SystemDelta::Shown(index) => observer.show_system(index, &self.systems[index]),
                SystemDelta::Hidden(index) => observer.hide_system(index, &self.systems[index]),
                SystemDelta::Updated(index) => observer.update_system(index, &self.systems[index]),
            }
        }
    }

    pub fn select(&self, index: usize, observer: &mut dyn CatalogObserver) {
        observer.select_system(index, &self.systems[index]);
    }
}

fn build_regular_system(
    descriptor: &SystemDescriptor,
    bases: &[RootSpec],
    gamelist: &(dyn GamelistProvider + Send + Sync),
    from_disk: bool,
) -> Result<PopulatedSystem, CatalogError> {
    let mut arena = EntryArena::new();
    let mut roots = Vec::new();
    let mut doppelganger = DoppelgangerMap::new();

    for spec in bases {
        let rom_dir = descriptor.rom_dir_for(&spec.base);
        let records = gamelist.records_for(&rom_dir)?;
        if !rom_dir.is_dir() && records.is_empty() {
            continue;
        }

        let root = arena.new_root(rom_dir.clone(), ChildMode::Owns, spec.read_only, false);
        let mut populator = RootPopulator::new(&mut arena, root, descriptor);
        if from_disk && rom_dir.is_dir() {
            populator.scan_disk(&mut doppelganger);
        }
        populator.merge_records(&records, &mut doppelganger);
        roots.push(root);
    }

    Ok(PopulatedSystem {
        descriptor: descriptor.clone(),
        arena,
        roots,
    })
}

/// Synthesize the descriptor of a virtual system.
fn virtual_descriptor(kind: &VirtualKind) -> SystemDescriptor {
    let (name, full_name) = match kind {
        VirtualKind::Favorites => ("favorites".to_string(), "Favorites".to_string()),
        VirtualKind::LastPlayed => ("lastplayed".to_string(), "Last Played".to_string()),
        VirtualKind::Multiplayers => ("multiplayers".to_string(), "Multi Players".to_string()),
        VirtualKind::AllGames => ("allgames".to_string(), "All Games".to_string()),
        VirtualKind::Lightgun => ("lightgun".to_string(), "LightGun Games".to_string()),
        VirtualKind::Tate => ("tate".to_string(), "Tate".to_string()),
        VirtualKind::Ports => ("ports".to_string(), "Ports".to_string()),
        VirtualKind::Arcade => ("arcade".to_string(), "Arcade".to_string()),
        VirtualKind::Genre(id) => (format!("genre-{id}"), format!("Genre {id}")),
        VirtualKind::ArcadeManufacturer(manufacturer) => (
            format!("arcade-{}", manufacturer.to_lowercase().replace(' ', "-")),
            manufacturer.clone(),
        ),
        VirtualKind::None => unreachable!("virtual descriptor for a regular system"),
    };

    SystemDescriptor {
        guid: format!("virtual-{name}"),
        rom_path: format!("virtual://{name}"),
        name,
        full_name,
        extensions: String::new(),
        theme_folder: String::new(),
        command: String::new(),
        icon: String::new(),
        scraper_id: 0,
        release_date: String::new(),
        manufacturer: String::new(),
        devices: Default::default(),
        emulators: Vec::new(),
        ignored_files: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_descriptor_names() {
        assert_eq!(
            virtual_descriptor(&VirtualKind::Favorites).full_name,
            "Favorites"
        );
        assert_eq!(
            virtual_descriptor(&VirtualKind::Genre(12)).name,
            "genre-12"
        );
        assert_eq!(
            virtual_descriptor(&VirtualKind::ArcadeManufacturer("Data East".to_string())).name,
            "arcade-data-east"
        );
    }

    #[test]
    fn test_load_options_default_scans_disk() {
        assert!(LoadOptions::default().from_disk);
    }
}
