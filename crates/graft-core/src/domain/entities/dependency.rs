//! Dependency coordinates and their keyed merge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    ArtifactId, Classifier, DependencyScope, GroupId, Version, VersionSlug,
};

/// A version written inline or named indirectly through a catalog slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionRef {
    Literal(Version),
    Slug(VersionSlug),
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(version) => write!(f, "{version}"),
            Self::Slug(slug) => write!(f, "${{{slug}}}"),
        }
    }
}

/// Uniqueness key of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey {
    pub group: GroupId,
    pub artifact: ArtifactId,
    pub classifier: Option<Classifier>,
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// A dependency as declared by a module, before version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    group: GroupId,
    artifact: ArtifactId,
    version: Option<VersionRef>,
    scope: DependencyScope,
    classifier: Option<Classifier>,
    optional: bool,
}

impl DependencyRecord {
    pub fn new(group: GroupId, artifact: ArtifactId) -> Self {
        Self {
            group,
            artifact,
            version: None,
            scope: DependencyScope::default(),
            classifier: None,
            optional: false,
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(VersionRef::Literal(version));
        self
    }

    pub fn version_slug(mut self, slug: VersionSlug) -> Self {
        self.version = Some(VersionRef::Slug(slug));
        self
    }

    pub fn scope(mut self, scope: DependencyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    pub fn artifact(&self) -> &ArtifactId {
        &self.artifact
    }

    pub fn version_ref(&self) -> Option<&VersionRef> {
        self.version.as_ref()
    }

    pub fn key(&self) -> DependencyKey {
        DependencyKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// Pin the record to a concrete version.
    ///
    /// `version` is only consulted for slug references; literal versions and
    /// version-less records keep what they declare.
    pub fn resolved(&self, version: Option<Version>) -> ResolvedDependency {
        let version = match &self.version {
            Some(VersionRef::Literal(v)) => Some(v.clone()),
            Some(VersionRef::Slug(_)) => version,
            None => None,
        };
        ResolvedDependency {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version,
            scope: self.scope,
            classifier: self.classifier.clone(),
            optional: self.optional,
        }
    }
}

/// A dependency as persisted: versions are concrete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub group: GroupId,
    pub artifact: ArtifactId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default)]
    pub scope: DependencyScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<Classifier>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl ResolvedDependency {
    pub fn key(&self) -> DependencyKey {
        DependencyKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

/// Ordered dependency list, unique by [`DependencyKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySet {
    dependencies: Vec<ResolvedDependency>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace in place. A replaced record keeps its position.
    pub fn upsert(&mut self, dependency: ResolvedDependency) {
        let key = dependency.key();
        match self.dependencies.iter_mut().find(|d| d.key() == key) {
            Some(existing) => *existing = dependency,
            None => self.dependencies.push(dependency),
        }
    }

    /// Merge records in order; the last record for a key wins.
    pub fn merge<I>(&mut self, dependencies: I) -> usize
    where
        I: IntoIterator<Item = ResolvedDependency>,
    {
        let mut merged = 0;
        for dependency in dependencies {
            self.upsert(dependency);
            merged += 1;
        }
        merged
    }

    pub fn get(&self, key: &DependencyKey) -> Option<&ResolvedDependency> {
        self.dependencies.iter().find(|d| &d.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies.iter()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl FromIterator<ResolvedDependency> for DependencySet {
    fn from_iter<T: IntoIterator<Item = ResolvedDependency>>(iter: T) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(group: &str, artifact: &str, version: &str) -> ResolvedDependency {
        DependencyRecord::new(GroupId::new(group).unwrap(), ArtifactId::new(artifact).unwrap())
            .version(Version::new(version).unwrap())
            .resolved(None)
    }

    #[test]
    fn last_declared_wins() {
        let set: DependencySet = [dep("g1", "a1", "v1"), dep("g1", "a1", "v2")]
            .into_iter()
            .collect();

        assert_eq!(set.len(), 1);
        let only = set.iter().next().unwrap();
        assert_eq!(only.version.as_ref().unwrap().as_str(), "v2");
    }

    #[test]
    fn replacement_keeps_position() {
        let mut set: DependencySet = [dep("g", "a", "1"), dep("g", "b", "1")]
            .into_iter()
            .collect();
        set.merge([dep("g", "a", "2")]);

        let artifacts: Vec<_> = set.iter().map(|d| d.artifact.as_str()).collect();
        assert_eq!(artifacts, vec!["a", "b"]);
        assert_eq!(set.iter().next().unwrap().version.as_ref().unwrap().as_str(), "2");
    }

    #[test]
    fn classifier_is_part_of_key() {
        let plain = dep("g", "a", "1");
        let mut tests = dep("g", "a", "1");
        tests.classifier = Some(Classifier::new("tests").unwrap());

        let set: DependencySet = [plain, tests].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn merging_twice_is_stable() {
        let records = vec![dep("g", "a", "1"), dep("g", "a", "3"), dep("h", "b", "1")];
        let mut once = DependencySet::new();
        once.merge(records.clone());
        let mut twice = once.clone();
        twice.merge(records);
        assert_eq!(once, twice);
    }

    #[test]
    fn slug_records_take_the_resolved_version() {
        let record = DependencyRecord::new(
            GroupId::new("org.example").unwrap(),
            ArtifactId::new("lib").unwrap(),
        )
        .version_slug(VersionSlug::new("lib").unwrap())
        .scope(DependencyScope::Test);

        assert_eq!(record.version_ref().unwrap().to_string(), "${lib}");
        let resolved = record.resolved(Some(Version::new("1.2.3").unwrap()));
        assert_eq!(resolved.version.unwrap().as_str(), "1.2.3");
        assert_eq!(resolved.scope, DependencyScope::Test);
    }

    #[test]
    fn key_display() {
        let mut d = dep("org.example", "lib", "1");
        assert_eq!(d.key().to_string(), "org.example:lib");
        d.classifier = Some(Classifier::new("sources").unwrap());
        assert_eq!(d.key().to_string(), "org.example:lib:sources");
    }
}
