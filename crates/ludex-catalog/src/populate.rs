//! Physical-root population
//!
//! Merges two sources into one tree: an optional filesystem walk and the
//! records persisted by the external gamelist store. Both go through the
//! doppelganger map, so one physical path is never instantiated twice.

use crate::descriptor::{SystemDescriptor, parse_extension_list};
use crate::entry::{EntryArena, EntryId};
use crate::metadata::GameMetadata;
use ludex_store::GameRecord;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Absolute rom path → entry, spanning disk scan, gamelist ingestion and
/// virtual composition.
pub type DoppelgangerMap = HashMap<PathBuf, EntryId>;

/// Per-folder scan override, read from `.system.cfg`.
#[derive(Debug, Default, Deserialize)]
struct FolderOverride {
    #[serde(default)]
    extensions: Option<String>,
}

/// Extensions whose files describe multi-disc sets; their referenced
/// companion files never become separate games.
const COMPANION_DESCRIPTORS: [&str; 4] = ["cue", "ccd", "gdi", "m3u"];

pub(crate) struct RootPopulator<'a> {
    arena: &'a mut EntryArena,
    root: EntryId,
    root_dir: PathBuf,
    extensions: HashSet<String>,
    exact_files: HashSet<String>,
    ignored: HashSet<String>,
}

impl<'a> RootPopulator<'a> {
    pub fn new(arena: &'a mut EntryArena, root: EntryId, descriptor: &SystemDescriptor) -> Self {
        let (extensions, exact_files) = descriptor.extension_sets();
        let ignored = descriptor
            .ignored_files
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        let root_dir = {
            let entry = arena.entry(root);
            entry.rom_path.clone()
        };
        Self {
            arena,
            root,
            root_dir,
            extensions,
            exact_files,
            ignored,
        }
    }

    /// Walk the root directory and add every matching rom.
    pub fn scan_disk(&mut self, map: &mut DoppelgangerMap) -> usize {
        let dir = self.root_dir.clone();
        let extensions = self.extensions.clone();
        let exact_files = self.exact_files.clone();
        self.walk_dir(&dir, &extensions, &exact_files, map)
    }

    fn walk_dir(
        &mut self,
        dir: &Path,
        extensions: &HashSet<String>,
        exact_files: &HashSet<String>,
        map: &mut DoppelgangerMap,
    ) -> usize {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                // Unreadable branch counts as zero games, never fatal.
                warn!("Cannot read {}: {err}", dir.display());
                return 0;
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
                subdirs.push((path, file_type.is_symlink()));
            } else if file_type.is_file() || file_type.is_symlink() {
                files.push(path);
            }
        }

        // Per-folder extension override.
        let override_path = dir.join(".system.cfg");
        let (effective_exts, effective_files);
        let (extensions, exact_files) = match self.folder_override(&override_path) {
            Some((exts, names)) => {
                effective_exts = exts;
                effective_files = names;
                (&effective_exts, &effective_files)
            }
            None => (extensions, exact_files),
        };

        let blacklist = companion_blacklist(&files);

        let mut added = 0;
        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let lower_name = file_name.to_lowercase();
            if lower_name.starts_with('.') || self.ignored.contains(&lower_name) {
                continue;
            }
            if blacklist.contains(&lower_name) {
                debug!("Skipping multi-disc companion {}", path.display());
                continue;
            }

            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_default();
            if !extensions.contains(&extension) && !exact_files.contains(&lower_name) {
                continue;
            }

            if !map.contains_key(&path) {
                self.lookup_or_create_game(&path, map);
                added += 1;
            }
        }

        for (path, is_symlink) in subdirs {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if name.starts_with('.') {
                continue;
            }
            if is_symlink && self.is_symlink_cycle(&path) {
                warn!("Skipping symlink cycle at {}", path.display());
                continue;
            }
            added += self.walk_dir(&path, extensions, exact_files, map);
        }

        added
    }

    /// A symlinked directory whose canonical target is a path-prefix
    /// ancestor of itself would recurse forever.
    fn is_symlink_cycle(&self, path: &Path) -> bool {
        match fs::canonicalize(path) {
            Ok(canonical) => path.starts_with(&canonical),
            Err(_) => true,
        }
    }

    fn folder_override(&self, path: &Path) -> Option<(HashSet<String>, HashSet<String>)> {
        let contents = fs::read_to_string(path).ok()?;
        match toml::from_str::<FolderOverride>(&contents) {
            Ok(FolderOverride {
                extensions: Some(list),
            }) => Some(parse_extension_list(&list)),
            Ok(_) => None,
            Err(err) => {
                warn!("Ignoring malformed {}: {err}", path.display());
                None
            }
        }
    }

    /// Idempotent by absolute path: an existing entry is returned as-is,
    /// otherwise the game and its intermediate folders are created.
    pub fn lookup_or_create_game(&mut self, path: &Path, map: &mut DoppelgangerMap) -> EntryId {
        if let Some(&existing) = map.get(path) {
            return existing;
        }

        let mut parent = self.root;
        if let Ok(relative) = path.strip_prefix(&self.root_dir) {
            let mut folder_path = self.root_dir.clone();
            let components: Vec<_> = relative.components().collect();
            for component in &components[..components.len().saturating_sub(1)] {
                folder_path.push(component);
                parent = self.find_or_create_folder(parent, &folder_path);
            }
        }

        let id = self
            .arena
            .new_game(parent, path.to_path_buf(), GameMetadata::new());
        map.insert(path.to_path_buf(), id);
        id
    }

    fn find_or_create_folder(&mut self, parent: EntryId, path: &Path) -> EntryId {
        let existing = self
            .arena
            .entry(parent)
            .children
            .iter()
            .copied()
            .find(|&child| {
                let entry = self.arena.entry(child);
                entry.is_folder() && entry.rom_path == path
            });
        match existing {
            Some(folder) => folder,
            None => self.arena.new_folder(parent, path.to_path_buf()),
        }
    }

    /// Merge gamelist records into the tree. Records whose rom no longer
    /// exists on disk are dropped.
    pub fn merge_records(&mut self, records: &[GameRecord], map: &mut DoppelgangerMap) -> usize {
        let mut merged = 0;
        for record in records {
            if !record.path.is_file() {
                debug!("Dropping record for missing rom {}", record.path.display());
                continue;
            }
            let id = self.lookup_or_create_game(&record.path, map);
            self.arena.entry_mut(id).metadata.apply_record(record);
            merged += 1;
        }
        merged
    }
}

/// File names referenced by multi-disc descriptors in one directory.
fn companion_blacklist(files: &[PathBuf]) -> HashSet<String> {
    let mut blacklist = HashSet::new();
    for path in files {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let extension = extension.to_lowercase();
        if !COMPANION_DESCRIPTORS.contains(&extension.as_str()) {
            continue;
        }
        match extension.as_str() {
            "ccd" => {
                // Companions share the descriptor's stem.
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    let stem = stem.to_lowercase();
                    blacklist.insert(format!("{stem}.img"));
                    blacklist.insert(format!("{stem}.sub"));
                }
            }
            _ => {
                let Ok(contents) = fs::read_to_string(path) else {
                    continue;
                };
                match extension.as_str() {
                    "cue" => blacklist.extend(parse_cue(&contents)),
                    "gdi" => blacklist.extend(parse_gdi(&contents)),
                    "m3u" => blacklist.extend(parse_m3u(&contents)),
                    _ => {}
                }
            }
        }
    }
    blacklist
}

/// `FILE "track01.bin" BINARY` lines.
fn parse_cue(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if !line.to_uppercase().starts_with("FILE") {
                return None;
            }
            let first = line.find('"')?;
            let last = line.rfind('"')?;
            (last > first).then(|| line[first + 1..last].to_lowercase())
        })
        .collect()
}

/// `track lba type sector_size file_name offset` rows, after the count line.
fn parse_gdi(contents: &str) -> Vec<String> {
    contents
        .lines()
        .skip(1)
        .filter_map(|line| {
            line.split_whitespace()
                .nth(4)
                .map(|name| name.trim_matches('"').to_lowercase())
        })
        .collect()
}

/// One referenced file per non-comment line.
fn parse_m3u(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            (!line.is_empty() && !line.starts_with('#')).then(|| line.to_lowercase())
        })
        .collect()
}
