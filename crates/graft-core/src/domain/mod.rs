// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Graft.
//!
//! Pure module-application logic: anchor matching, replacement sets,
//! keyed artifact merges and the module aggregate. All I/O is performed by
//! the application layer through ports.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: Text in, text out; records in, records out
//! - **Immutable aggregate**: A `Module` cannot change once built
//! - **Eager validation**: Bad input fails at build time, never at apply time
//!
pub mod entities;
pub mod error;
pub mod value_objects;

mod validation;

pub use entities::{
    common::{Permissions, RelativePath},
    context::ModuleContext,
    dependency::{DependencyKey, DependencyRecord, DependencySet, ResolvedDependency, VersionRef},
    manifest::{ManifestDocument, ManifestEntries, ManifestEntry},
    matcher,
    matcher::{ElementMatcher, Position, ReplacementMatcher},
    module::{
        DOCUMENTATION_FOLDER, DOCUMENTATION_INDEX, DOCUMENTATION_NEEDLE, Module, ModuleBuilder,
        ModuleHook,
    },
    placement::{FilePlacement, PlacementKind, TemplateSource},
    project::{Project, ProjectContext},
    property::{PropertyBlock, PropertySet},
    replacement::{
        FileReplacements, ReplacementEntry, ReplacementKind, ReplacementOutcome, ReplacementSet,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{
    ArtifactId, Classifier, DependencyScope, DocumentationTitle, GroupId, Indentation,
    ManifestKey, ManifestNamespace, ModuleSlug, Profile, PropertyKey, PropertyTarget,
    PropertyValue, Version, VersionSlug,
};

pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use super::*;
    use matcher::{regex, text};

    fn file(content: &str, set: &ReplacementSet) -> String {
        let path = RelativePath::try_new("f.txt").unwrap();
        set.apply_to(&path, content).unwrap().content
    }

    fn entry(matcher: ReplacementMatcher, replacement: &str) -> ReplacementEntry {
        ReplacementEntry::new(RelativePath::try_new("f.txt").unwrap(), matcher, replacement)
            .unwrap()
    }

    // ========================================================================
    // Occurrence asymmetry
    // ========================================================================

    #[test]
    fn literal_anchor_replaces_all_but_regex_only_first() {
        let literal = ReplacementSet::mandatory(vec![entry(text("x").at(), "y")]);
        let pattern = ReplacementSet::mandatory(vec![entry(regex("x").unwrap().at(), "y")]);

        assert_eq!(file("x-x-x", &literal), "y-y-y");
        assert_eq!(file("x-x-x", &pattern), "y-x-x");
    }

    // ========================================================================
    // Example scenarios
    // ========================================================================

    #[test]
    fn scenario_mandatory_line_after() {
        let set = ReplacementSet::mandatory(vec![entry(text("B").line_after(), "X")]);
        assert_eq!(file("A\nB\nC", &set), "A\nB\nX\nC");
    }

    #[test]
    fn scenario_optional_without_anchor() {
        let set = ReplacementSet::optional(vec![entry(text("Z").at(), "Y")]);
        assert_eq!(file("A\nB\nC", &set), "A\nB\nC");
    }

    #[test]
    fn scenario_dependency_last_wins() {
        let record = |version: &str| {
            DependencyRecord::new(GroupId::new("g1").unwrap(), ArtifactId::new("a1").unwrap())
                .version(Version::new(version).unwrap())
                .resolved(None)
        };
        let merged: DependencySet = [record("v1"), record("v2")].into_iter().collect();

        assert_eq!(merged.len(), 1);
        let only = merged.iter().next().unwrap();
        assert_eq!(only.group.as_str(), "g1");
        assert_eq!(only.artifact.as_str(), "a1");
        assert_eq!(only.version.as_ref().map(Version::as_str), Some("v2"));
    }

    // ========================================================================
    // Idempotence
    // ========================================================================

    #[test]
    fn optional_replacement_applied_twice_is_stable() {
        let set = ReplacementSet::optional(vec![entry(text("TODO").at(), "DONE")]);
        let once = file("a TODO b", &set);
        let twice = file(&once, &set);
        assert_eq!(once, twice);
    }
}
