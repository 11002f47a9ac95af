use crate::resolver::ResolvedSet;
use crate::CoreError;
use dskit_remote::FileFetchFailure;
use dskit_schema::{write_atomic, Aliases, FileSpec};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Canonical alias tokens that registry file bodies are authored against.
const COMPONENTS_TOKEN: &str = "@/components";
const UTILS_TOKEN: &str = "@/lib/utils";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Written { path: PathBuf },
    SkippedNoContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub component: String,
    pub file: String,
    pub outcome: FileOutcome,
}

/// Result of installing a resolved set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    /// Installed component names, in install order.
    pub components: Vec<String>,
    pub files: Vec<FileRecord>,
    pub dependencies: BTreeSet<String>,
    pub dev_dependencies: BTreeSet<String>,
    pub fetch_failures: Vec<FileFetchFailure>,
}

impl InstallReport {
    pub fn written(&self) -> impl Iterator<Item = &FileRecord> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileRecord> {
        self.files
            .iter()
            .filter(|f| f.outcome == FileOutcome::SkippedNoContent)
    }

    pub fn has_warnings(&self) -> bool {
        !self.fetch_failures.is_empty() || self.skipped().next().is_some()
    }
}

/// Replace the canonical alias tokens with the project's aliases.
///
/// Plain substring replacement of every occurrence; components first, then
/// utils.
pub fn rewrite_aliases(content: &str, aliases: &Aliases) -> String {
    content
        .replace(COMPONENTS_TOKEN, &aliases.components)
        .replace(UTILS_TOKEN, &aliases.utils)
}

/// Writes resolved components into a project tree.
pub struct Installer {
    root: PathBuf,
    aliases: Aliases,
}

impl Installer {
    pub fn new(root: impl Into<PathBuf>, aliases: Aliases) -> Self {
        Self {
            root: root.into(),
            aliases,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a file's logical registry path to its location in the project.
    ///
    /// `components/…` lands in the components alias directory, `lib/…` next
    /// to the utils entry point, anything else relative to the project root.
    pub fn destination(&self, file: &FileSpec) -> Result<PathBuf, CoreError> {
        let (base, rest) = if let Some(rest) = file.path.strip_prefix("components/") {
            (self.aliases.components_dir(&self.root), rest)
        } else if let Some(rest) = file.path.strip_prefix("lib/") {
            (self.aliases.utils_dir(&self.root), rest)
        } else {
            (self.root.clone(), file.path.as_str())
        };
        let rest = checked_relative(file, rest)?;
        Ok(base.join(rest))
    }

    /// Write every fetched file of `resolved` into the project.
    ///
    /// All destinations are validated before the first write, so an unsafe
    /// path anywhere in the set leaves the project untouched.
    pub fn install(&self, resolved: ResolvedSet) -> Result<InstallReport, CoreError> {
        let mut planned = Vec::new();
        for component in &resolved.components {
            for file in &component.files {
                let dest = match file.content {
                    Some(_) => Some(self.destination(file)?),
                    None => None,
                };
                planned.push((component.name.as_str(), file, dest));
            }
        }

        let mut report = InstallReport {
            dependencies: resolved.dependencies(),
            dev_dependencies: resolved.dev_dependencies(),
            ..InstallReport::default()
        };

        for (component, file, dest) in planned {
            let outcome = match (dest, file.content.as_deref()) {
                (Some(dest), Some(content)) => self.write_file(dest, content)?,
                _ => {
                    warn!("no content for {}, skipping", file.name);
                    FileOutcome::SkippedNoContent
                }
            };
            report.files.push(FileRecord {
                component: component.to_owned(),
                file: file.name.clone(),
                outcome,
            });
        }
        report.components = resolved.components.iter().map(|c| c.name.clone()).collect();
        report.fetch_failures = resolved.fetch_failures;

        info!(
            "installed {} components ({} files written, {} skipped)",
            report.components.len(),
            report.written().count(),
            report.skipped().count()
        );
        Ok(report)
    }

    fn write_file(&self, dest: PathBuf, content: &str) -> Result<FileOutcome, CoreError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let rewritten = rewrite_aliases(content, &self.aliases);
        write_atomic(&dest, rewritten.as_bytes()).map_err(|e| CoreError::Write {
            path: dest.display().to_string(),
            source: e,
        })?;
        debug!("wrote {}", dest.display());
        Ok(FileOutcome::Written { path: dest })
    }
}

fn checked_relative<'p>(file: &FileSpec, rest: &'p str) -> Result<&'p Path, CoreError> {
    let path = Path::new(rest);
    let invalid = |reason: &str| CoreError::InvalidDestination {
        file: file.name.clone(),
        reason: format!("{reason}: '{}'", file.path),
    };
    if rest.is_empty() {
        return Err(invalid("empty path"));
    }
    for part in path.components() {
        match part {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("path escapes the project")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"))
            }
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dskit_schema::ComponentEntry;

    fn installer(root: &Path, components: &str, utils: &str) -> Installer {
        Installer::new(root, Aliases::new(components, utils))
    }

    fn resolved(components: Vec<ComponentEntry>) -> ResolvedSet {
        ResolvedSet {
            components,
            fetch_failures: Vec::new(),
        }
    }

    #[test]
    fn components_path_maps_into_components_alias() {
        let inst = installer(Path::new("/p"), "@/ui", "@/lib/utils");
        let dest = inst
            .destination(&FileSpec::new("button.tsx", "components/button.tsx"))
            .unwrap();
        assert_eq!(dest, Path::new("/p/ui/button.tsx"));
    }

    #[test]
    fn lib_path_maps_next_to_utils() {
        let inst = installer(Path::new("/p"), "@/components", "@/lib/utils");
        let dest = inst
            .destination(&FileSpec::new("format.ts", "lib/format.ts"))
            .unwrap();
        assert_eq!(dest, Path::new("/p/lib/format.ts"));

        let inst = installer(Path::new("/p"), "@/components", "@/shared/helpers/utils");
        let dest = inst
            .destination(&FileSpec::new("format.ts", "lib/format.ts"))
            .unwrap();
        assert_eq!(dest, Path::new("/p/shared/helpers/format.ts"));
    }

    #[test]
    fn other_paths_map_to_project_root() {
        let inst = installer(Path::new("/p"), "@/ui", "@/lib/utils");
        let dest = inst
            .destination(&FileSpec::new("hook", "hooks/use-toast.ts"))
            .unwrap();
        assert_eq!(dest, Path::new("/p/hooks/use-toast.ts"));
    }

    #[test]
    fn nested_component_paths_are_kept() {
        let inst = installer(Path::new("/p"), "@/components/ui", "@/lib/utils");
        let dest = inst
            .destination(&FileSpec::new("x", "components/forms/field.tsx"))
            .unwrap();
        assert_eq!(dest, Path::new("/p/components/ui/forms/field.tsx"));
    }

    #[test]
    fn rejects_escaping_paths() {
        let inst = installer(Path::new("/p"), "@/ui", "@/lib/utils");
        for bad in ["../evil.ts", "components/../../x.ts", "/etc/passwd", "components/"] {
            assert!(
                matches!(
                    inst.destination(&FileSpec::new("f", bad)),
                    Err(CoreError::InvalidDestination { .. })
                ),
                "{bad} must be rejected"
            );
        }
    }

    #[test]
    fn rewrite_replaces_components_alias() {
        let aliases = Aliases::new("@/ui", "@/lib/utils");
        let out = rewrite_aliases(r#"import { x } from "@/components/y""#, &aliases);
        assert_eq!(out, r#"import { x } from "@/ui/y""#);
    }

    #[test]
    fn rewrite_replaces_utils_alias_everywhere() {
        let aliases = Aliases::new("@/components", "@/shared/utils");
        let input = "import { cn } from \"@/lib/utils\"\n// see @/lib/utils\n";
        let out = rewrite_aliases(input, &aliases);
        assert_eq!(
            out,
            "import { cn } from \"@/shared/utils\"\n// see @/shared/utils\n"
        );
    }

    #[test]
    fn rewrite_leaves_unrelated_text() {
        let aliases = Aliases::new("@/ui", "@/shared/utils");
        let input = "import React from \"react\"\nconst components = \"@/lib/other\"\n";
        assert_eq!(rewrite_aliases(input, &aliases), input);
    }

    #[test]
    fn install_writes_rewritten_files() {
        let dir = tempfile::tempdir().unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let entry = ComponentEntry::new("card").with_file(
            FileSpec::new("card.tsx", "components/card.tsx")
                .with_content("import { Button } from \"@/components/button\"\n"),
        );

        let report = inst.install(resolved(vec![entry])).unwrap();
        let written = std::fs::read_to_string(dir.path().join("ui/card.tsx")).unwrap();
        assert_eq!(written, "import { Button } from \"@/ui/button\"\n");
        assert_eq!(report.components, vec!["card"]);
        assert_eq!(report.written().count(), 1);
        assert!(!report.has_warnings());
    }

    #[test]
    fn install_skips_absent_content_without_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let entry = ComponentEntry::new("card")
            .with_file(FileSpec::new("card.tsx", "components/card.tsx"))
            .with_file(FileSpec::new("body.tsx", "components/body.tsx").with_content("body"));

        let report = inst.install(resolved(vec![entry])).unwrap();
        assert!(!dir.path().join("ui/card.tsx").exists());
        assert!(dir.path().join("ui/body.tsx").exists());
        let skipped: Vec<_> = report.skipped().map(|f| f.file.as_str()).collect();
        assert_eq!(skipped, vec!["card.tsx"]);
        assert!(report.has_warnings());
    }

    #[test]
    fn install_writes_fetched_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let entry = ComponentEntry::new("blank")
            .with_file(FileSpec::new("blank.ts", "lib/blank.ts").with_content(""));

        inst.install(resolved(vec![entry])).unwrap();
        let path = dir.path().join("lib/blank.ts");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");
    }

    #[test]
    fn install_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ui")).unwrap();
        std::fs::write(dir.path().join("ui/button.tsx"), "local edits").unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let entry = ComponentEntry::new("button")
            .with_file(FileSpec::new("button.tsx", "components/button.tsx").with_content("fresh"));

        inst.install(resolved(vec![entry])).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("ui/button.tsx")).unwrap(),
            "fresh"
        );
    }

    #[test]
    fn install_write_failure_is_fatal_and_names_path() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the components directory should be.
        std::fs::write(dir.path().join("ui"), "not a dir").unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let entry = ComponentEntry::new("button")
            .with_file(FileSpec::new("button.tsx", "components/button.tsx").with_content("x"));

        match inst.install(resolved(vec![entry])) {
            Err(CoreError::Write { path, .. }) => assert!(path.contains("ui"), "{path}"),
            other => panic!("expected Write error, got {other:?}"),
        }
    }

    #[test]
    fn unsafe_later_path_aborts_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let button = ComponentEntry::new("button")
            .with_file(FileSpec::new("button.tsx", "components/button.tsx").with_content("b"));
        let card = ComponentEntry::new("card")
            .with_file(FileSpec::new("a.tsx", "components/a.tsx").with_content("a"))
            .with_file(FileSpec::new("b.tsx", "components/../../b.tsx").with_content("b"));

        let result = inst.install(resolved(vec![button, card]));
        assert!(matches!(result, Err(CoreError::InvalidDestination { .. })));
        assert!(!dir.path().join("ui").exists());
        assert!(!dir.path().join("ui/a.tsx").exists());
    }

    #[test]
    fn unsafe_path_without_content_is_only_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let entry = ComponentEntry::new("card")
            .with_file(FileSpec::new("evil.tsx", "../evil.tsx"))
            .with_file(FileSpec::new("card.tsx", "components/card.tsx").with_content("c"));

        let report = inst.install(resolved(vec![entry])).unwrap();
        assert_eq!(report.skipped().count(), 1);
        assert!(dir.path().join("ui/card.tsx").exists());
    }

    #[test]
    fn install_report_carries_dependency_unions() {
        let dir = tempfile::tempdir().unwrap();
        let inst = installer(dir.path(), "@/ui", "@/lib/utils");
        let mut a = ComponentEntry::new("a");
        a.dependencies = vec!["clsx".to_owned()];
        let mut b = ComponentEntry::new("b");
        b.dependencies = vec!["clsx".to_owned(), "cmdk".to_owned()];
        b.dev_dependencies = vec!["@types/node".to_owned()];

        let report = inst.install(resolved(vec![a, b])).unwrap();
        assert_eq!(report.dependencies.len(), 2);
        assert!(report.dev_dependencies.contains("@types/node"));
    }
}
