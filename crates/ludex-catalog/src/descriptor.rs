//! Static per-system configuration
//!
//! Deserialized by an external descriptor-list parser; the catalog only
//! validates and consumes the structured form.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRequirement {
    #[default]
    No,
    Optional,
    Mandatory,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeviceRequirements {
    #[serde(default)]
    pub pad: DeviceRequirement,

    #[serde(default)]
    pub keyboard: DeviceRequirement,

    #[serde(default)]
    pub mouse: DeviceRequirement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreDescriptor {
    pub name: String,

    /// Lower value wins when picking a default.
    #[serde(default)]
    pub priority: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorDescriptor {
    pub name: String,

    #[serde(default)]
    pub cores: Vec<CoreDescriptor>,
}

/// Immutable static configuration for one system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemDescriptor {
    pub guid: String,

    /// Short name ("nes"), also the rom folder name by convention.
    pub name: String,

    /// Display name ("Nintendo Entertainment System").
    pub full_name: String,

    /// Rom directory template; `%ROOT%` is substituted with each physical
    /// root base.
    pub rom_path: String,

    /// Space-separated extension list. Entries of the form `files:NAME`
    /// match one exact file name instead of an extension.
    #[serde(default)]
    pub extensions: String,

    #[serde(default)]
    pub theme_folder: String,

    #[serde(default)]
    pub command: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub scraper_id: u32,

    #[serde(default)]
    pub release_date: String,

    #[serde(default)]
    pub manufacturer: String,

    #[serde(default)]
    pub devices: DeviceRequirements,

    #[serde(default)]
    pub emulators: Vec<EmulatorDescriptor>,

    /// File names never added as games.
    #[serde(default)]
    pub ignored_files: Vec<String>,
}

impl SystemDescriptor {
    /// Reject descriptors the loader must skip (spec: skipped and logged,
    /// never fatal).
    pub fn validate(&self) -> Result<(), String> {
        if self.guid.is_empty() {
            return Err("empty guid".to_string());
        }
        if self.name.is_empty() || self.full_name.is_empty() {
            return Err("empty name".to_string());
        }
        if self.rom_path.is_empty() {
            return Err("empty rom path".to_string());
        }
        Ok(())
    }

    /// Substitute `%ROOT%` and normalize to an absolute directory under
    /// `base`.
    pub fn rom_dir_for(&self, base: &Path) -> PathBuf {
        if self.rom_path.contains("%ROOT%") {
            let replaced = self
                .rom_path
                .replace("%ROOT%", &base.to_string_lossy());
            PathBuf::from(replaced)
        } else {
            base.join(self.rom_path.trim_start_matches('/'))
        }
    }

    /// Split the extension list into lower-cased extensions (without the
    /// leading dot) and exact `files:` names.
    pub fn extension_sets(&self) -> (HashSet<String>, HashSet<String>) {
        parse_extension_list(&self.extensions)
    }

    /// Default emulator/core pair: first emulator, lowest-priority-value
    /// core.
    pub fn default_emulator(&self) -> Option<(&str, Option<&str>)> {
        let emulator = self.emulators.first()?;
        let core = emulator
            .cores
            .iter()
            .min_by_key(|c| c.priority)
            .map(|c| c.name.as_str());
        Some((emulator.name.as_str(), core))
    }
}

/// Parse a space-separated extension list, also used by per-folder
/// overrides.
pub(crate) fn parse_extension_list(list: &str) -> (HashSet<String>, HashSet<String>) {
    let mut extensions = HashSet::new();
    let mut exact_files = HashSet::new();
    for token in list.split_whitespace() {
        if let Some(name) = token.strip_prefix("files:") {
            exact_files.insert(name.to_lowercase());
        } else {
            extensions.insert(token.trim_start_matches('.').to_lowercase());
        }
    }
    (extensions, exact_files)
}
