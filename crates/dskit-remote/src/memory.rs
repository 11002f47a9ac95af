use crate::{RegistryBackend, RemoteError};
use dskit_schema::Manifest;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory registry backend with canned responses.
///
/// Records every request so callers can assert on fetch counts and order.
#[derive(Default)]
pub struct MemoryBackend {
    manifest: Option<Vec<u8>>,
    files: HashMap<String, Vec<u8>>,
    log: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `manifest` as `registry.json`.
    ///
    /// # Panics
    /// Panics if the manifest cannot be serialized.
    #[must_use]
    pub fn with_manifest(self, manifest: &Manifest) -> Self {
        let bytes = manifest.to_bytes().expect("manifest serializes");
        self.with_manifest_bytes(bytes)
    }

    #[must_use]
    pub fn with_manifest_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.manifest = Some(bytes.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.to_owned(), content.into());
        self
    }

    /// Every request served so far: `registry.json` or the file name.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn manifest_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| *r == "registry.json")
            .count()
    }

    fn record(&self, what: &str) {
        if let Ok(mut log) = self.log.lock() {
            log.push(what.to_owned());
        }
    }
}

impl RegistryBackend for MemoryBackend {
    fn get_manifest(&self) -> Result<Vec<u8>, RemoteError> {
        self.record("registry.json");
        self.manifest
            .clone()
            .ok_or_else(|| RemoteError::Http("HTTP 503 for registry.json".to_owned()))
    }

    fn get_file(&self, name: &str) -> Result<Vec<u8>, RemoteError> {
        self.record(name);
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(name.to_owned()))
    }
}
