use crate::CoreError;
use dskit_remote::{FileFetchFailure, RegistryClient};
use dskit_schema::{ComponentEntry, Manifest};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Components to install, dependency-first, each name at most once.
///
/// File bodies are populated; files that could not be fetched keep
/// `content: None` and are listed in `fetch_failures`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedSet {
    pub components: Vec<ComponentEntry>,
    pub fetch_failures: Vec<FileFetchFailure>,
}

impl ResolvedSet {
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Union of `dependencies` across all components.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.components
            .iter()
            .flat_map(|c| c.dependencies.iter().cloned())
            .collect()
    }

    /// Union of `devDependencies` across all components.
    pub fn dev_dependencies(&self) -> BTreeSet<String> {
        self.components
            .iter()
            .flat_map(|c| c.dev_dependencies.iter().cloned())
            .collect()
    }
}

enum Step<'m> {
    Visit(&'m str),
    Finish(&'m ComponentEntry),
}

fn lookup<'m>(manifest: &'m Manifest, name: &str) -> Result<&'m ComponentEntry, CoreError> {
    manifest
        .get(name)
        .ok_or_else(|| CoreError::ComponentNotFound(name.to_owned()))
}

/// Order the requested components and everything they depend on.
///
/// Depth-first, post-order: a component is emitted only after all of its
/// `registryDependencies`. Requests are walked in the given order and
/// dependencies in listed order, so the result is deterministic. A name that
/// has already been entered is never entered again, which both deduplicates
/// and breaks cycles. Any unknown name fails the whole resolution.
pub fn resolve_order<'m, S: AsRef<str>>(
    manifest: &'m Manifest,
    requested: &[S],
) -> Result<Vec<&'m ComponentEntry>, CoreError> {
    let mut entered: HashSet<&'m str> = HashSet::new();
    let mut finished: HashSet<&'m str> = HashSet::new();
    let mut order = Vec::new();

    for name in requested {
        let root = lookup(manifest, name.as_ref())?;
        let mut stack = vec![Step::Visit(root.name.as_str())];

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(name) => {
                    if !entered.insert(name) {
                        if !finished.contains(name) {
                            debug!("dependency cycle through '{name}', skipping back edge");
                        }
                        continue;
                    }
                    let entry = lookup(manifest, name)?;
                    stack.push(Step::Finish(entry));
                    // Reversed so the first listed dependency is popped first.
                    for dep in entry.registry_dependencies.iter().rev() {
                        let dep_entry = lookup(manifest, dep)?;
                        stack.push(Step::Visit(dep_entry.name.as_str()));
                    }
                }
                Step::Finish(entry) => {
                    finished.insert(entry.name.as_str());
                    order.push(entry);
                }
            }
        }
    }

    Ok(order)
}

/// Fetch the manifest once, order the request, then fetch file bodies.
///
/// Graph traversal completes before any file body is requested, so an unknown
/// name fails without downloading anything.
pub fn resolve<S: AsRef<str>>(
    client: &RegistryClient<'_>,
    requested: &[S],
) -> Result<ResolvedSet, CoreError> {
    let manifest = client.fetch_manifest()?;
    let order = resolve_order(&manifest, requested)?;
    debug!(
        "resolution order: {}",
        order
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    let mut set = ResolvedSet::default();
    for entry in order {
        let (populated, failures) = client.fetch_component(entry);
        set.components.push(populated);
        set.fetch_failures.extend(failures);
    }
    Ok(set)
}
