//! Component resolution and installation engine for dskit.
//!
//! This crate turns a list of requested component names into files on disk:
//! the `resolver` walks `registryDependencies` into a dependency-first,
//! duplicate-free order and fetches file bodies, the `installer` maps logical
//! registry paths onto the project's alias directories and rewrites alias
//! tokens, and `Engine` ties both to a registry backend and a project root.
//! Project initialization and package-manager invocation live here as well.

pub mod engine;
pub mod installer;
pub mod package_manager;
pub mod project;
pub mod resolver;

pub use engine::{Engine, UTILS_COMPONENT};
pub use installer::{rewrite_aliases, FileOutcome, FileRecord, InstallReport, Installer};
pub use package_manager::PackageManager;
pub use project::{init_project, InitResult, UTILS_TEMPLATE};
pub use resolver::{resolve, resolve_order, ResolvedSet};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("registry error: {0}")]
    Remote(#[from] dskit_remote::RemoteError),
    #[error("config error: {0}")]
    Config(#[from] dskit_schema::ConfigError),
    #[error("registry error: component '{0}' not found")]
    ComponentNotFound(String),
    #[error("invalid destination for '{file}': {reason}")]
    InvalidDestination { file: String, reason: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config error: project not initialized, run `dskit init` first")]
    NotInitialized,
    #[error("config error: {0} already exists")]
    AlreadyInitialized(String),
    #[error("package manager failed: {0}")]
    PackageManager(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
