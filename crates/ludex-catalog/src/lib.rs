//! In-memory game catalog engine for Ludex
//!
//! Owns the entity tree of games and folders, binds static system
//! descriptors to populated rom trees, composes virtual systems (favorites,
//! last-played, arcade, ...) over the regular ones, and exposes sorting,
//! filtering and fuzzy full-text search to the frontend. Rendering, input
//! and the gamelist persistence format live elsewhere; this crate consumes
//! and produces structured records through `ludex-store`.

mod descriptor;
mod entry;
mod filter;
mod manager;
mod metadata;
mod populate;
mod providers;
mod search;
mod sort;
mod system;
mod tree;
mod virtuals;

pub use descriptor::{
    CoreDescriptor, DeviceRequirement, DeviceRequirements, EmulatorDescriptor, SystemDescriptor,
};
pub use entry::{ChildMode, Entry, EntryArena, EntryId, EntryKind};
pub use filter::{GameFilter, ItemTraits};
pub use manager::{
    CatalogObserver, LoadOptions, RootSpec, SystemDelta, SystemManager,
};
pub use metadata::{GameMetadata, MetadataField};
pub use populate::DoppelgangerMap;
pub use providers::{ArcadeDatabase, LightgunDatabase};
pub use search::{SearchContext, SearchField};
pub use sort::{SortContext, SortKey, sort_items};
pub use system::{SystemData, SystemProperties, SystemState, VirtualKind};

pub use ludex_store::Rotation;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Nothing to browse after a full load; requires operator intervention.
    #[error("No visible system after full load")]
    NoVisibleSystems,

    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Rom root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] ludex_store::StoreError),
}
