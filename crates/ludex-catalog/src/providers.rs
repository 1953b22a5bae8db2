//! External collaborator interfaces
//!
//! Databases resolved outside the catalog (arcade DAT knowledge, lightgun
//! compatibility lists). The engine only ever asks questions; scanning and
//! integrity verification happen elsewhere.

use crate::descriptor::SystemDescriptor;

/// Arcade knowledge base: maps raw rom names to display names and
/// manufacturers, and recognizes arcade systems.
pub trait ArcadeDatabase: Send + Sync {
    /// Database display name for a raw rom name ("sf2" → "Street Fighter II").
    fn display_name(&self, rom_name: &str) -> Option<String>;

    /// Manufacturer for a raw rom name, when known.
    fn manufacturer(&self, rom_name: &str) -> Option<String>;

    /// Whether games of this system belong in the arcade virtual system.
    fn is_arcade_system(&self, descriptor: &SystemDescriptor) -> bool;
}

/// Lightgun compatibility list, matched by name substring.
pub trait LightgunDatabase: Send + Sync {
    fn matches(&self, game_name: &str) -> bool;
}
