use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse registry manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("component name '{0}' appears in both 'components' and 'lib'")]
    DuplicateName(String),
}

/// Which manifest mapping an entry was published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Component,
    Library,
}

/// Informational classification carried in the `type` field.
///
/// Tags outside the known set are kept verbatim in `Other` and never reject
/// the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    Ui,
    Component,
    Example,
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ui => "components:ui",
            Self::Component => "components:component",
            Self::Example => "components:example",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ComponentType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "components:ui" => Self::Ui,
            "components:component" => Self::Component,
            "components:example" => Self::Example,
            _ => Self::Other(tag),
        }
    }
}

impl From<ComponentType> for String {
    fn from(kind: ComponentType) -> Self {
        match kind {
            ComponentType::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

/// One file belonging to a component.
///
/// `content` is `None` until the body has been fetched, and stays `None` when
/// the fetch fails. `Some(String::new())` is a fetched, empty file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileSpec {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_owned(),
            path: path.to_owned(),
            content: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dev_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub component_type: Option<ComponentType>,
}

impl ComponentEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: String::new(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            registry_dependencies: Vec::new(),
            files: Vec::new(),
            component_type: None,
        }
    }

    #[must_use]
    pub fn with_registry_dependencies(mut self, deps: &[&str]) -> Self {
        self.registry_dependencies = deps.iter().map(|d| (*d).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: FileSpec) -> Self {
        self.files.push(file);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub kind: ItemKind,
    pub entry: ComponentEntry,
}

/// The registry manifest as a single name-keyed store.
///
/// On the wire the manifest is two mappings, `components` and `lib`; they are
/// merged here and each entry keeps a [`ItemKind`] tag recording its origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    items: BTreeMap<String, ManifestItem>,
}

#[derive(Serialize, Deserialize)]
struct WireManifest {
    components: BTreeMap<String, ComponentEntry>,
    #[serde(default, alias = "libraries")]
    lib: BTreeMap<String, ComponentEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, ManifestError> {
        let wire: WireManifest = serde_json::from_slice(data)?;
        Self::from_parts(wire.components, wire.lib)
    }

    pub fn from_parts(
        components: BTreeMap<String, ComponentEntry>,
        libraries: BTreeMap<String, ComponentEntry>,
    ) -> Result<Self, ManifestError> {
        let mut manifest = Self::new();
        for (key, entry) in components {
            manifest.insert_keyed(ItemKind::Component, key, entry)?;
        }
        for (key, entry) in libraries {
            manifest.insert_keyed(ItemKind::Library, key, entry)?;
        }
        Ok(manifest)
    }

    /// Serialize back to the `{ components, lib }` wire shape.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ManifestError> {
        let mut wire = WireManifest {
            components: BTreeMap::new(),
            lib: BTreeMap::new(),
        };
        for (name, item) in &self.items {
            let target = match item.kind {
                ItemKind::Component => &mut wire.components,
                ItemKind::Library => &mut wire.lib,
            };
            target.insert(name.clone(), item.entry.clone());
        }
        Ok(serde_json::to_vec_pretty(&wire)?)
    }

    /// Add an entry keyed by its own `name`.
    pub fn insert(&mut self, kind: ItemKind, entry: ComponentEntry) -> Result<(), ManifestError> {
        let key = entry.name.clone();
        self.insert_keyed(kind, key, entry)
    }

    fn insert_keyed(
        &mut self,
        kind: ItemKind,
        key: String,
        mut entry: ComponentEntry,
    ) -> Result<(), ManifestError> {
        if self.items.contains_key(&key) {
            return Err(ManifestError::DuplicateName(key));
        }
        // The mapping key is the resolution key.
        if entry.name != key {
            if !entry.name.is_empty() {
                tracing::debug!("manifest entry '{}' renamed to its key '{key}'", entry.name);
            }
            entry.name.clone_from(&key);
        }
        self.items.insert(key, ManifestItem { kind, entry });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ComponentEntry> {
        self.items.get(name).map(|item| &item.entry)
    }

    pub fn item(&self, name: &str) -> Option<&ManifestItem> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries published under `kind`, in name order.
    pub fn entries(&self, kind: ItemKind) -> impl Iterator<Item = &ComponentEntry> {
        self.items
            .values()
            .filter(move |item| item.kind == kind)
            .map(|item| &item.entry)
    }

    /// All names: components first, then libraries.
    pub fn names(&self) -> Vec<&str> {
        let components = self.entries(ItemKind::Component);
        let libraries = self.entries(ItemKind::Library);
        components
            .chain(libraries)
            .map(|e| e.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "components": {
    "button": {
      "name": "button",
      "description": "A clickable button",
      "dependencies": ["@radix-ui/react-slot", "class-variance-authority"],
      "files": [{ "name": "button.tsx", "path": "components/button.tsx" }],
      "type": "components:ui"
    },
    "card": {
      "name": "card",
      "description": "Card container",
      "dependencies": [],
      "registryDependencies": ["button", "utils"],
      "files": [{ "name": "card.tsx", "path": "components/card.tsx" }]
    }
  },
  "lib": {
    "utils": {
      "name": "utils",
      "description": "Class name helper",
      "dependencies": ["clsx", "tailwind-merge"],
      "devDependencies": ["@types/node"],
      "files": [{ "name": "utils.ts", "path": "lib/utils.ts" }]
    }
  }
}"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = Manifest::from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(manifest.len(), 3);

        let button = manifest.get("button").unwrap();
        assert_eq!(button.component_type, Some(ComponentType::Ui));
        assert_eq!(button.files[0].path, "components/button.tsx");
        assert!(button.files[0].content.is_none());

        let card = manifest.get("card").unwrap();
        assert_eq!(card.registry_dependencies, vec!["button", "utils"]);
        assert!(card.component_type.is_none());

        let utils = manifest.item("utils").unwrap();
        assert_eq!(utils.kind, ItemKind::Library);
        assert_eq!(utils.entry.dev_dependencies, vec!["@types/node"]);
    }

    #[test]
    fn names_lists_components_before_libraries() {
        let manifest = Manifest::from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(manifest.names(), vec!["button", "card", "utils"]);
    }

    #[test]
    fn accepts_libraries_alias() {
        let input = r#"{"components": {}, "libraries": {"utils": {"name": "utils"}}}"#;
        let manifest = Manifest::from_slice(input.as_bytes()).unwrap();
        assert_eq!(manifest.item("utils").unwrap().kind, ItemKind::Library);
    }

    #[test]
    fn lib_mapping_is_optional() {
        let manifest = Manifest::from_slice(br#"{"components": {}}"#).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn rejects_missing_components_mapping() {
        assert!(matches!(
            Manifest::from_slice(br#"{"lib": {}}"#),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn rejects_non_json() {
        assert!(Manifest::from_slice(b"<html>404</html>").is_err());
    }

    #[test]
    fn rejects_name_in_both_mappings() {
        let input = r#"{"components": {"x": {"name": "x"}}, "lib": {"x": {"name": "x"}}}"#;
        match Manifest::from_slice(input.as_bytes()) {
            Err(ManifestError::DuplicateName(name)) => assert_eq!(name, "x"),
            other => panic!("expected DuplicateName, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_name_inherits_key() {
        let input = r#"{"components": {"badge": {"description": "d"}}}"#;
        let manifest = Manifest::from_slice(input.as_bytes()).unwrap();
        assert_eq!(manifest.get("badge").unwrap().name, "badge");
    }

    #[test]
    fn entry_name_follows_key() {
        let input = r#"{"components": {"badge": {"name": "Badge"}}}"#;
        let manifest = Manifest::from_slice(input.as_bytes()).unwrap();
        assert_eq!(manifest.get("badge").unwrap().name, "badge");
        assert!(manifest.get("Badge").is_none());
    }

    #[test]
    fn unknown_type_tag_is_kept() {
        let input = r#"{"components":{"x":{"name":"x","type":"components:block"}},"lib":{}}"#;
        let manifest = Manifest::from_slice(input.as_bytes()).unwrap();
        let entry = manifest.get("x").unwrap();
        assert_eq!(
            entry.component_type,
            Some(ComponentType::Other("components:block".to_owned()))
        );

        let value: serde_json::Value =
            serde_json::from_slice(&manifest.to_bytes().unwrap()).unwrap();
        assert_eq!(value["components"]["x"]["type"], "components:block");
    }

    #[test]
    fn wire_roundtrip_keeps_kinds() {
        let manifest = Manifest::from_slice(SAMPLE.as_bytes()).unwrap();
        let bytes = manifest.to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["components"]["button"].is_object());
        assert!(value["lib"]["utils"].is_object());
        assert_eq!(Manifest::from_slice(&bytes).unwrap(), manifest);
    }

    #[test]
    fn fetched_empty_content_differs_from_absent() {
        let absent = FileSpec::new("a.ts", "lib/a.ts");
        let empty = FileSpec::new("a.ts", "lib/a.ts").with_content("");
        assert_ne!(absent, empty);
        assert_eq!(empty.content.as_deref(), Some(""));
    }
}
