//! Entity arena for the catalog tree
//!
//! Games, folders and roots live in one arena addressed by stable indices.
//! Parent and child links are ids, never references, so entries from
//! different trees can alias each other without ownership cycles. A folder
//! declares whether it owns its children (physical trees) or merely
//! references games owned by another tree (virtual trees).

use crate::metadata::GameMetadata;
use std::path::PathBuf;

/// Stable handle to an entry in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u32);

impl EntryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Game,
    Folder,
    Root,
}

/// Whether a container deletes its children when destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    Owns,
    Aliases,
}

#[derive(Debug)]
pub struct Entry {
    pub kind: EntryKind,
    /// Absolute path of the rom or directory; synthetic for virtual roots.
    pub rom_path: PathBuf,
    pub metadata: GameMetadata,
    /// Owning parent; `None` only for roots. An aliased game keeps the
    /// parent from its owning tree.
    pub parent: Option<EntryId>,
    /// The root ultimately owning this entry, used for provenance tests.
    pub top_ancestor: EntryId,
    pub children: Vec<EntryId>,
    pub child_mode: ChildMode,
    /// Set on roots backed by the read-only share template.
    pub read_only: bool,
    /// Set on synthetic roots of virtual systems.
    pub is_virtual: bool,
}

impl Entry {
    pub fn is_game(&self) -> bool {
        self.kind == EntryKind::Game
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder | EntryKind::Root)
    }

    pub fn is_root(&self) -> bool {
        self.kind == EntryKind::Root
    }

    /// Display name: metadata name when set, file stem otherwise.
    pub fn name(&self) -> &str {
        if let Some(name) = self.metadata.name()
            && !name.is_empty()
        {
            return name;
        }
        self.rom_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// File name including extension.
    pub fn file_name(&self) -> &str {
        self.rom_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }
}

/// Slotted arena with a free list. Freed slots are reused; ids are never
/// reshuffled under live references.
#[derive(Debug, Default)]
pub struct EntryArena {
    slots: Vec<Option<Entry>>,
    free: Vec<u32>,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, entry: Entry) -> EntryId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(entry);
                EntryId(slot)
            }
            None => {
                self.slots.push(Some(entry));
                EntryId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Create a parentless root anchoring one directory or one virtual
    /// aggregation.
    pub fn new_root(
        &mut self,
        path: impl Into<PathBuf>,
        child_mode: ChildMode,
        read_only: bool,
        is_virtual: bool,
    ) -> EntryId {
        let id = self.alloc(Entry {
            kind: EntryKind::Root,
            rom_path: path.into(),
            metadata: GameMetadata::new(),
            parent: None,
            top_ancestor: EntryId(0),
            children: Vec::new(),
            child_mode,
            read_only,
            is_virtual,
        });
        self.entry_mut(id).top_ancestor = id;
        id
    }

    /// Create a folder under `parent`, inheriting its ownership mode.
    pub fn new_folder(&mut self, parent: EntryId, path: impl Into<PathBuf>) -> EntryId {
        let (top, mode) = {
            let p = self.entry(parent);
            (p.top_ancestor, p.child_mode)
        };
        let id = self.alloc(Entry {
            kind: EntryKind::Folder,
            rom_path: path.into(),
            metadata: GameMetadata::new(),
            parent: Some(parent),
            top_ancestor: top,
            children: Vec::new(),
            child_mode: mode,
            read_only: false,
            is_virtual: false,
        });
        self.entry_mut(parent).children.push(id);
        id
    }

    /// Create a game under `parent`.
    pub fn new_game(
        &mut self,
        parent: EntryId,
        path: impl Into<PathBuf>,
        metadata: GameMetadata,
    ) -> EntryId {
        let top = self.entry(parent).top_ancestor;
        let id = self.alloc(Entry {
            kind: EntryKind::Game,
            rom_path: path.into(),
            metadata,
            parent: Some(parent),
            top_ancestor: top,
            children: Vec::new(),
            child_mode: ChildMode::Owns,
            read_only: false,
            is_virtual: false,
        });
        self.entry_mut(parent).children.push(id);
        id
    }

    /// Reference a game owned elsewhere from an aliasing container. The
    /// game's parent and top ancestor are left untouched.
    pub fn alias_into(&mut self, container: EntryId, game: EntryId) {
        debug_assert_eq!(self.entry(container).child_mode, ChildMode::Aliases);
        self.entry_mut(container).children.push(game);
    }

    /// Drop one alias from a container's child list.
    pub fn unalias(&mut self, container: EntryId, game: EntryId) {
        self.entry_mut(container).children.retain(|&c| c != game);
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Direct access; a stale id is a programming error.
    pub fn entry(&self, id: EntryId) -> &Entry {
        self.slots[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("stale entry id {}", id.0))
    }

    pub fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        self.slots[id.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("stale entry id {}", id.0))
    }

    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Free an entry and, when it owns its children, its whole subtree.
    /// Aliased children are left alive in their owning tree. The caller is
    /// responsible for unlinking `id` from its parent first.
    pub fn free_subtree(&mut self, id: EntryId) {
        let Some(entry) = self.slots[id.index()].take() else {
            return;
        };
        self.free.push(id.0);
        if entry.child_mode == ChildMode::Owns {
            for child in entry.children {
                self.free_subtree(child);
            }
        }
    }

    /// Merge a worker-local arena into this one, remapping every id by a
    /// fixed offset. Returns the offset; the caller rebases any root ids it
    /// kept from the absorbed arena.
    pub fn absorb(&mut self, other: EntryArena) -> u32 {
        let base = self.slots.len() as u32;
        for slot in other.slots {
            let remapped = slot.map(|mut entry| {
                entry.parent = entry.parent.map(|p| EntryId(p.0 + base));
                entry.top_ancestor = EntryId(entry.top_ancestor.0 + base);
                for child in &mut entry.children {
                    child.0 += base;
                }
                entry
            });
            self.slots.push(remapped);
        }
        for free in other.free {
            self.free.push(free + base);
        }
        base
    }
}
