//! Registry manifest and project configuration schema for dskit.
//!
//! This crate defines the data layer: the registry manifest (`Manifest`) with
//! its component entries and file specs, the consuming project's
//! `components.json` configuration (`ProjectConfig`), and the maintenance
//! routine that regenerates a registry manifest from per-component config
//! files (`sync_registry`).

pub mod config;
pub mod manifest;
pub mod sync;

pub use config::{
    resolve_alias, Aliases, ConfigError, ProjectConfig, Style, TailwindConfig, COMPONENTS_JSON,
};
pub use manifest::{
    ComponentEntry, ComponentType, FileSpec, ItemKind, Manifest, ManifestError, ManifestItem,
};
pub use sync::{sync_registry, SyncError, SyncReport};

use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `data` to `path` through a temporary file in the same directory.
///
/// The temporary file is fsynced and renamed over the destination, so readers
/// observe either the old content or the complete new content.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    if let Ok(f) = fs::File::open(dir) {
        let _ = f.sync_all();
    }
    Ok(())
}
