use crate::CoreError;
use dskit_schema::{resolve_alias, write_atomic, ProjectConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Body of the `cn` class-name helper written by `init`.
pub const UTILS_TEMPLATE: &str = r#"import { type ClassValue, clsx } from "clsx"
import { twMerge } from "tailwind-merge"

export function cn(...inputs: ClassValue[]) {
  return twMerge(clsx(inputs))
}
"#;

#[derive(Debug, Clone, Serialize)]
pub struct InitResult {
    pub config_path: PathBuf,
    pub created_dirs: Vec<PathBuf>,
    /// Set when the utils helper was written; `None` if it already existed.
    pub utils_file: Option<PathBuf>,
}

/// Write `components.json` and lay out the alias directories.
///
/// An existing `components.json` is only replaced with `force`. Other
/// existing files are left untouched.
pub fn init_project(
    root: &Path,
    config: &ProjectConfig,
    force: bool,
) -> Result<InitResult, CoreError> {
    let existing = ProjectConfig::path_in(root);
    if existing.exists() && !force {
        return Err(CoreError::AlreadyInitialized(existing.display().to_string()));
    }

    let components_dir = config.aliases.components_dir(root);
    let utils_dir = config.aliases.utils_dir(root);

    let mut created_dirs = Vec::new();
    for dir in [components_dir, utils_dir] {
        if !dir.exists() && !created_dirs.contains(&dir) {
            fs::create_dir_all(&dir).map_err(|e| CoreError::Write {
                path: dir.display().to_string(),
                source: e,
            })?;
            created_dirs.push(dir);
        }
    }

    let config_path = config.save(root)?;

    let ext = if config.tsx { "ts" } else { "js" };
    let utils_path = resolve_alias(&config.aliases.utils, root).with_extension(ext);
    let utils_file = if utils_path.exists() {
        None
    } else {
        write_atomic(&utils_path, UTILS_TEMPLATE.as_bytes()).map_err(|e| CoreError::Write {
            path: utils_path.display().to_string(),
            source: e,
        })?;
        Some(utils_path)
    };

    info!("initialized project at {}", root.display());
    Ok(InitResult {
        config_path,
        created_dirs,
        utils_file,
    })
}
