use crate::{RegistryBackend, RemoteError};
use dskit_schema::{ComponentEntry, Manifest};
use serde::Serialize;
use tracing::{debug, warn};

/// A file body that could not be fetched. Recorded, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFetchFailure {
    pub component: String,
    pub file: String,
    pub reason: String,
}

/// Registry access with the manifest/file error split applied.
///
/// Manifest problems surface as `RegistryUnavailable` or `RegistryMalformed`;
/// file problems as `FileFetchFailed`, which callers are expected to recover
/// from.
pub struct RegistryClient<'a> {
    backend: &'a dyn RegistryBackend,
}

impl<'a> RegistryClient<'a> {
    pub fn new(backend: &'a dyn RegistryBackend) -> Self {
        Self { backend }
    }

    pub fn fetch_manifest(&self) -> Result<Manifest, RemoteError> {
        let data = self
            .backend
            .get_manifest()
            .map_err(|e| RemoteError::RegistryUnavailable(e.to_string()))?;
        let manifest =
            Manifest::from_slice(&data).map_err(|e| RemoteError::RegistryMalformed(e.to_string()))?;
        debug!("manifest: {} entries", manifest.len());
        Ok(manifest)
    }

    pub fn fetch_file_body(&self, file_name: &str) -> Result<String, RemoteError> {
        let data = self
            .backend
            .get_file(file_name)
            .map_err(|e| RemoteError::FileFetchFailed {
                file: file_name.to_owned(),
                reason: e.to_string(),
            })?;
        String::from_utf8(data).map_err(|e| RemoteError::FileFetchFailed {
            file: file_name.to_owned(),
            reason: format!("body is not valid UTF-8: {e}"),
        })
    }

    /// Component names followed by library names. Empty if the manifest
    /// cannot be fetched.
    pub fn list_available_names(&self) -> Vec<String> {
        match self.fetch_manifest() {
            Ok(manifest) => manifest.names().into_iter().map(str::to_owned).collect(),
            Err(e) => {
                warn!("could not list registry components: {e}");
                Vec::new()
            }
        }
    }

    /// Return a copy of `entry` with every file body fetched.
    ///
    /// Files that fail keep `content: None` and are reported; the remaining
    /// files are still fetched.
    pub fn fetch_component(
        &self,
        entry: &ComponentEntry,
    ) -> (ComponentEntry, Vec<FileFetchFailure>) {
        let mut populated = entry.clone();
        let mut failures = Vec::new();
        for file in &mut populated.files {
            match self.fetch_file_body(&file.name) {
                Ok(body) => file.content = Some(body),
                Err(e) => {
                    warn!("{}: {e}", entry.name);
                    file.content = None;
                    failures.push(FileFetchFailure {
                        component: entry.name.clone(),
                        file: file.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        (populated, failures)
    }
}
