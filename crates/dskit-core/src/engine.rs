use crate::installer::{InstallReport, Installer};
use crate::resolver::{resolve, ResolvedSet};
use crate::CoreError;
use dskit_remote::{RegistryBackend, RegistryClient};
use dskit_schema::{Aliases, Manifest, ProjectConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Library entry installed by `init`, hidden from interactive selection.
pub const UTILS_COMPONENT: &str = "utils";

/// A project root bound to a registry backend.
pub struct Engine<'a> {
    root: PathBuf,
    backend: &'a dyn RegistryBackend,
}

impl<'a> Engine<'a> {
    pub fn new(root: impl Into<PathBuf>, backend: &'a dyn RegistryBackend) -> Self {
        Self {
            root: root.into(),
            backend,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn client(&self) -> RegistryClient<'a> {
        RegistryClient::new(self.backend)
    }

    pub fn manifest(&self) -> Result<Manifest, CoreError> {
        Ok(self.client().fetch_manifest()?)
    }

    /// Every name the registry offers. Empty when the registry is unreachable.
    pub fn available(&self) -> Vec<String> {
        self.client().list_available_names()
    }

    /// Names offered by `add --all` and the selection prompt: everything in
    /// the registry except the utils helper, which `init` already writes.
    pub fn installable_names(&self) -> Result<Vec<String>, CoreError> {
        let manifest = self.manifest()?;
        Ok(manifest
            .names()
            .into_iter()
            .filter(|name| *name != UTILS_COMPONENT)
            .map(str::to_owned)
            .collect())
    }

    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolvedSet, CoreError> {
        resolve(&self.client(), names)
    }

    /// Resolve `names` and write every resolved file under the project root.
    pub fn add<S: AsRef<str>>(
        &self,
        names: &[S],
        aliases: &Aliases,
    ) -> Result<InstallReport, CoreError> {
        let resolved = self.resolve(names)?;
        info!("resolved {} components: {}", resolved.len(), resolved.names().join(", "));
        Installer::new(&self.root, aliases.clone()).install(resolved)
    }

    pub fn load_config(&self) -> Result<ProjectConfig, CoreError> {
        ProjectConfig::load(&self.root)?.ok_or(CoreError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dskit_remote::MemoryBackend;
    use dskit_schema::{ComponentEntry, FileSpec, ItemKind};

    fn backend() -> MemoryBackend {
        let mut manifest = Manifest::new();
        manifest
            .insert(
                ItemKind::Component,
                ComponentEntry::new("button")
                    .with_file(FileSpec::new("button.tsx", "components/button.tsx")),
            )
            .unwrap();
        manifest
            .insert(ItemKind::Component, ComponentEntry::new("utils"))
            .unwrap();
        manifest
            .insert(
                ItemKind::Library,
                ComponentEntry::new("format")
                    .with_file(FileSpec::new("format.ts", "lib/format.ts")),
            )
            .unwrap();
        MemoryBackend::new()
            .with_manifest(&manifest)
            .with_file("button.tsx", b"import { cn } from \"@/lib/utils\"\n")
            .with_file("format.ts", b"export {}\n")
    }

    #[test]
    fn installable_names_hide_utils() {
        let backend = backend();
        let engine = Engine::new("/unused", &backend);
        assert_eq!(engine.installable_names().unwrap(), vec!["button", "format"]);
        assert_eq!(engine.available(), vec!["button", "utils", "format"]);
    }

    #[test]
    fn add_requires_nothing_but_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend();
        let engine = Engine::new(dir.path(), &backend);
        let report = engine
            .add(&["button", "format"], &Aliases::new("@/ui", "@/shared/utils"))
            .unwrap();
        assert_eq!(report.components, vec!["button", "format"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("ui/button.tsx")).unwrap(),
            "import { cn } from \"@/shared/utils\"\n"
        );
        assert!(dir.path().join("shared/format.ts").is_file());
    }

    #[test]
    fn load_config_before_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend();
        let engine = Engine::new(dir.path(), &backend);
        assert!(matches!(engine.load_config(), Err(CoreError::NotInitialized)));
    }

    #[test]
    fn load_config_after_init() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend();
        let engine = Engine::new(dir.path(), &backend);
        let config = ProjectConfig::default();

        crate::init_project(dir.path(), &config, false).unwrap();
        assert_eq!(engine.load_config().unwrap(), config);
    }
}
