//! Registry access for dskit.
//!
//! This crate fetches the registry manifest and individual component file
//! bodies. Transport is abstracted behind [`RegistryBackend`]: [`http::HttpBackend`]
//! talks to a static HTTP registry, [`memory::MemoryBackend`] serves canned
//! data for tests. [`RegistryClient`] layers the error taxonomy on top:
//! manifest failures are fatal, file failures are recoverable.

pub mod client;
pub mod config;
pub mod http;
pub mod memory;

pub use client::{FileFetchFailure, RegistryClient};
pub use config::{RemoteConfig, DEFAULT_REGISTRY_URL};
pub use memory::MemoryBackend;

use thiserror::Error;

/// Sent as `User-Agent` on every registry request.
pub const USER_AGENT: &str = concat!("dskit/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("remote config error: {0}")]
    Config(String),
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),
    #[error("registry manifest is malformed: {0}")]
    RegistryMalformed(String),
    #[error("failed to fetch file '{file}': {reason}")]
    FileFetchFailed { file: String, reason: String },
}

/// Transport for a component registry.
pub trait RegistryBackend: Send + Sync {
    /// Download the raw manifest (`registry.json`).
    fn get_manifest(&self) -> Result<Vec<u8>, RemoteError>;

    /// Download one file body by its registry file-store name.
    fn get_file(&self, name: &str) -> Result<Vec<u8>, RemoteError>;
}
