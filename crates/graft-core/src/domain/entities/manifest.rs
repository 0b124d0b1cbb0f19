//! Namespace-scoped manifest entries (scripts, package dependencies, ...).

use crate::domain::{
    error::DomainError,
    value_objects::{ManifestKey, ManifestNamespace},
};

/// One manifest entry as declared by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub namespace: ManifestNamespace,
    pub name: ManifestKey,
    pub value: String,
}

/// Entries declared by a single module.
///
/// Unlike [`ManifestDocument`], a name may be declared only once per
/// namespace; a second declaration is a module authoring bug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntries {
    entries: Vec<ManifestEntry>,
}

impl ManifestEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ManifestEntry) -> Result<(), DomainError> {
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.namespace == entry.namespace && e.name == entry.name);
        if duplicate {
            return Err(DomainError::DuplicateManifestEntry {
                namespace: entry.namespace.to_string(),
                name: entry.name.to_string(),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A project's manifest: ordered namespaces of ordered name/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    namespaces: Vec<(ManifestNamespace, Vec<(ManifestKey, String)>)>,
}

impl ManifestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; an overwritten name keeps its position.
    pub fn set(&mut self, namespace: ManifestNamespace, name: ManifestKey, value: impl Into<String>) {
        let value = value.into();
        let index = match self.namespaces.iter().position(|(ns, _)| *ns == namespace) {
            Some(index) => index,
            None => {
                self.namespaces.push((namespace, Vec::new()));
                self.namespaces.len() - 1
            }
        };
        let entries = &mut self.namespaces[index].1;
        match entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => entries.push((name, value)),
        }
    }

    pub fn merge(&mut self, entries: &ManifestEntries) -> usize {
        for entry in entries.iter() {
            self.set(entry.namespace.clone(), entry.name.clone(), entry.value.clone());
        }
        entries.len()
    }

    pub fn get(&self, namespace: &ManifestNamespace, name: &ManifestKey) -> Option<&str> {
        self.namespace(namespace)?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn namespace(&self, namespace: &ManifestNamespace) -> Option<&[(ManifestKey, String)]> {
        self.namespaces
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&ManifestNamespace, &[(ManifestKey, String)])> {
        self.namespaces.iter().map(|(ns, e)| (ns, e.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.namespaces.iter().map(|(_, e)| e.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ns: ManifestNamespace, name: &str, value: &str) -> ManifestEntry {
        ManifestEntry {
            namespace: ns,
            name: ManifestKey::new(name).unwrap(),
            value: value.to_string(),
        }
    }

    #[test]
    fn duplicate_within_one_module_is_rejected() {
        let mut entries = ManifestEntries::new();
        entries.add(entry(ManifestNamespace::scripts(), "build", "tsc")).unwrap();

        let err = entries
            .add(entry(ManifestNamespace::scripts(), "build", "vite build"))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateManifestEntry {
                namespace: "scripts".into(),
                name: "build".into(),
            }
        );
    }

    #[test]
    fn same_name_in_other_namespace_is_fine() {
        let mut entries = ManifestEntries::new();
        entries.add(entry(ManifestNamespace::dependencies(), "vite", "5")).unwrap();
        entries.add(entry(ManifestNamespace::dev_dependencies(), "vite", "5")).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn collisions_across_modules_overwrite() {
        let mut first = ManifestEntries::new();
        first.add(entry(ManifestNamespace::scripts(), "lint", "eslint")).unwrap();
        first.add(entry(ManifestNamespace::scripts(), "test", "jest")).unwrap();
        let mut second = ManifestEntries::new();
        second.add(entry(ManifestNamespace::scripts(), "lint", "biome")).unwrap();

        let mut document = ManifestDocument::new();
        document.merge(&first);
        document.merge(&second);

        let scripts = ManifestNamespace::scripts();
        assert_eq!(document.get(&scripts, &ManifestKey::new("lint").unwrap()), Some("biome"));
        let names: Vec<_> = document
            .namespace(&scripts)
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(names, vec!["lint", "test"]);
    }
}
