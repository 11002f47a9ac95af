use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the project configuration, relative to the project root.
pub const COMPONENTS_JSON: &str = "components.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read project config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid project config {path}: {message}")]
    Invalid { path: String, message: String },
    #[error("aliases.{0} must not be empty")]
    EmptyAlias(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Default,
    NewYork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailwindConfig {
    pub config: String,
    pub css: String,
    pub base_color: String,
    pub css_variables: bool,
    #[serde(default)]
    pub prefix: String,
}

impl Default for TailwindConfig {
    fn default() -> Self {
        Self {
            config: "tailwind.config.js".to_owned(),
            css: "app/globals.css".to_owned(),
            base_color: "slate".to_owned(),
            css_variables: true,
            prefix: String::new(),
        }
    }
}

/// Import alias prefixes used by the consuming project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aliases {
    pub components: String,
    pub utils: String,
}

impl Default for Aliases {
    fn default() -> Self {
        Self {
            components: "@/components".to_owned(),
            utils: "@/lib/utils".to_owned(),
        }
    }
}

impl Aliases {
    pub fn new(components: &str, utils: &str) -> Self {
        Self {
            components: components.to_owned(),
            utils: utils.to_owned(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.components.trim().is_empty() {
            return Err(ConfigError::EmptyAlias("components"));
        }
        if self.utils.trim().is_empty() {
            return Err(ConfigError::EmptyAlias("utils"));
        }
        Ok(())
    }

    /// Physical directory the components alias points at.
    pub fn components_dir(&self, root: &Path) -> PathBuf {
        resolve_alias(&self.components, root)
    }

    /// Physical directory holding the utils entry point and its siblings.
    pub fn utils_dir(&self, root: &Path) -> PathBuf {
        let utils = resolve_alias(&self.utils, root);
        utils
            .parent()
            .map_or_else(|| root.to_path_buf(), Path::to_path_buf)
    }
}

/// Map an alias such as `@/components/ui` to `<root>/components/ui`.
///
/// Only a single leading `@/` is stripped; anything else is taken as a path
/// relative to `root`.
pub fn resolve_alias(alias: &str, root: &Path) -> PathBuf {
    let relative = alias.strip_prefix("@/").unwrap_or(alias);
    root.join(relative)
}

/// The project's `components.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub rsc: bool,
    #[serde(default = "default_tsx")]
    pub tsx: bool,
    #[serde(default)]
    pub tailwind: TailwindConfig,
    pub aliases: Aliases,
}

fn default_tsx() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            style: Style::default(),
            rsc: false,
            tsx: true,
            tailwind: TailwindConfig::default(),
            aliases: Aliases::default(),
        }
    }
}

impl ProjectConfig {
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(COMPONENTS_JSON)
    }

    /// Load `components.json` from `root`. Returns `Ok(None)` if the project
    /// has not been initialized.
    pub fn load(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = Self::path_in(root);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_file(&path).map(Some)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.aliases.validate()?;
        Ok(config)
    }

    /// Write `components.json` into `root` and return its path.
    pub fn save(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        self.aliases.validate()?;
        let path = Self::path_in(root);
        let mut content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        content.push('\n');
        fs::create_dir_all(root)?;
        crate::write_atomic(&path, content.as_bytes())?;
        tracing::debug!("wrote {}", path.display());
        Ok(path)
    }
}
