use crate::RemoteError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/dskit-dev/dskit/main/registry";

/// Environment variable overriding the registry base URL.
pub const REGISTRY_URL_ENV: &str = "DSKIT_REGISTRY_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

impl RemoteConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_owned(),
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_owned());
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load config from `~/.config/dskit/remote.json`.
    pub fn load_default() -> Result<Self, RemoteError> {
        let path = default_config_path()?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, RemoteError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| RemoteError::Config(format!("invalid remote config: {e}")))?;
        config.url = config.url.trim_end_matches('/').to_owned();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), RemoteError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RemoteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Pick the registry endpoint for this invocation.
    ///
    /// Precedence: explicit `--registry` flag, then `DSKIT_REGISTRY_URL`, then
    /// the user config file, then [`DEFAULT_REGISTRY_URL`].
    pub fn resolve(flag: Option<&str>) -> Result<Self, RemoteError> {
        let env = std::env::var(REGISTRY_URL_ENV).ok();
        let file = default_config_path().ok();
        Self::resolve_from(flag, env.as_deref(), file.as_deref())
    }

    pub fn resolve_from(
        flag: Option<&str>,
        env: Option<&str>,
        file: Option<&Path>,
    ) -> Result<Self, RemoteError> {
        if let Some(url) = flag.filter(|u| !u.is_empty()) {
            return Ok(Self::new(url));
        }
        if let Some(url) = env.filter(|u| !u.is_empty()) {
            return Ok(Self::new(url));
        }
        match file {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

fn default_config_path() -> Result<PathBuf, RemoteError> {
    let home = std::env::var("HOME").map_err(|_| RemoteError::Config("HOME not set".to_owned()))?;
    Ok(PathBuf::from(home).join(".config/dskit/remote.json"))
}
