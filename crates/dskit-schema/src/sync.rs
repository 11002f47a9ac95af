//! Regenerate a registry manifest from per-component config files.
//!
//! Registry layout:
//!
//! ```text
//! <registry>/registry.json
//! <registry>/components/<name>/config.json
//! ```
//!
//! Each `config.json` is a single component entry. The `components` mapping of
//! `registry.json` is replaced wholesale; every other top-level key (notably
//! `lib`) is preserved as-is.

use crate::manifest::ComponentEntry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("registry sync I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON in {path}: {message}")]
    InvalidJson { path: String, message: String },
    #[error("{0} is not a JSON object")]
    NotAnObject(String),
    #[error("components directory not found: {0}")]
    MissingComponentsDir(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub registry_path: PathBuf,
    pub components: Vec<String>,
}

fn read_json(path: &Path) -> Result<Value, SyncError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SyncError::InvalidJson {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn sync_registry(registry_dir: &Path) -> Result<SyncReport, SyncError> {
    let components_dir = registry_dir.join("components");
    if !components_dir.is_dir() {
        return Err(SyncError::MissingComponentsDir(
            components_dir.display().to_string(),
        ));
    }

    let mut dirs: Vec<(String, PathBuf)> = fs::read_dir(&components_dir)?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_owned();
            Some((name, e.path()))
        })
        .collect();
    dirs.sort();

    let mut components = Map::new();
    for (name, dir) in dirs {
        let config_path = dir.join("config.json");
        if !config_path.exists() {
            debug!("skipping {}: no config.json", dir.display());
            continue;
        }
        let value = read_json(&config_path)?;
        serde_json::from_value::<ComponentEntry>(value.clone()).map_err(|e| {
            SyncError::InvalidJson {
                path: config_path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        components.insert(name, value);
    }

    let registry_path = registry_dir.join("registry.json");
    let mut registry = if registry_path.exists() {
        match read_json(&registry_path)? {
            Value::Object(map) => map,
            _ => {
                return Err(SyncError::NotAnObject(
                    registry_path.display().to_string(),
                ))
            }
        }
    } else {
        let mut map = Map::new();
        map.insert("lib".to_owned(), Value::Object(Map::new()));
        map
    };

    let names: Vec<String> = components.keys().cloned().collect();
    registry.insert("components".to_owned(), Value::Object(components));

    let mut content = serde_json::to_string_pretty(&Value::Object(registry)).map_err(|e| {
        SyncError::InvalidJson {
            path: registry_path.display().to_string(),
            message: e.to_string(),
        }
    })?;
    content.push('\n');
    crate::write_atomic(&registry_path, content.as_bytes())?;
    info!(
        "synced {} components into {}",
        names.len(),
        registry_path.display()
    );

    Ok(SyncReport {
        registry_path,
        components: names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manifest;

    fn write_component(root: &Path, name: &str, body: &str) {
        let dir = root.join("components").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.json"), body).unwrap();
    }

    #[test]
    fn sync_replaces_components_and_keeps_lib() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("registry.json"),
            r#"{"components": {"stale": {"name": "stale"}}, "lib": {"utils": {"name": "utils"}}}"#,
        )
        .unwrap();
        write_component(
            dir.path(),
            "button",
            r#"{"name": "button", "description": "b", "dependencies": [], "files": []}"#,
        );
        write_component(
            dir.path(),
            "alert",
            r#"{"name": "alert", "description": "a", "dependencies": [], "files": []}"#,
        );

        let report = sync_registry(dir.path()).unwrap();
        assert_eq!(report.components, vec!["alert", "button"]);

        let data = fs::read(dir.path().join("registry.json")).unwrap();
        let manifest = Manifest::from_slice(&data).unwrap();
        assert!(manifest.contains("button"));
        assert!(manifest.contains("alert"));
        assert!(manifest.contains("utils"));
        assert!(!manifest.contains("stale"));
    }

    #[test]
    fn sync_creates_registry_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "badge", r#"{"name": "badge"}"#);

        sync_registry(dir.path()).unwrap();
        let data = fs::read(dir.path().join("registry.json")).unwrap();
        let manifest = Manifest::from_slice(&data).unwrap();
        assert_eq!(manifest.names(), vec!["badge"]);
    }

    #[test]
    fn sync_skips_dirs_without_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("components").join("draft")).unwrap();
        write_component(dir.path(), "badge", r#"{"name": "badge"}"#);

        let report = sync_registry(dir.path()).unwrap();
        assert_eq!(report.components, vec!["badge"]);
    }

    #[test]
    fn sync_rejects_invalid_component_config() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "broken", "{ not json");
        assert!(matches!(
            sync_registry(dir.path()),
            Err(SyncError::InvalidJson { .. })
        ));
    }

    #[test]
    fn sync_requires_components_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            sync_registry(dir.path()),
            Err(SyncError::MissingComponentsDir(_))
        ));
    }
}
