//! Ordered anchored edits bound to project files.
//!
//! A [`ReplacementSet`] is either mandatory or optional for all of its
//! entries. Entries are grouped per file with [`ReplacementSet::by_file`]
//! so each file is read once, edited in declaration order, and written once.

use crate::domain::{
    entities::{common::RelativePath, matcher::ReplacementMatcher},
    error::DomainError,
};

/// Whether a missing anchor fails the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementKind {
    Mandatory,
    Optional,
}

impl ReplacementKind {
    pub const fn is_mandatory(&self) -> bool {
        matches!(self, Self::Mandatory)
    }
}

/// One anchored edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementEntry {
    file: RelativePath,
    matcher: ReplacementMatcher,
    replacement: String,
}

impl ReplacementEntry {
    pub fn new(
        file: RelativePath,
        matcher: ReplacementMatcher,
        replacement: impl Into<String>,
    ) -> Result<Self, DomainError> {
        matcher.element().validate()?;
        Ok(Self {
            file,
            matcher,
            replacement: replacement.into(),
        })
    }

    pub fn file(&self) -> &RelativePath {
        &self.file
    }

    pub fn matcher(&self) -> &ReplacementMatcher {
        &self.matcher
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSet {
    kind: ReplacementKind,
    entries: Vec<ReplacementEntry>,
}

impl ReplacementSet {
    pub fn new(kind: ReplacementKind, entries: Vec<ReplacementEntry>) -> Self {
        Self { kind, entries }
    }

    pub fn mandatory(entries: Vec<ReplacementEntry>) -> Self {
        Self::new(ReplacementKind::Mandatory, entries)
    }

    pub fn optional(entries: Vec<ReplacementEntry>) -> Self {
        Self::new(ReplacementKind::Optional, entries)
    }

    pub fn kind(&self) -> ReplacementKind {
        self.kind
    }

    pub fn entries(&self) -> &[ReplacementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped per file.
    ///
    /// Files appear in the order of their first entry; entries keep their
    /// declaration order inside each group.
    pub fn by_file(&self) -> Vec<FileReplacements<'_>> {
        let mut groups: Vec<FileReplacements<'_>> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|g| g.file == entry.file()) {
                Some(group) => group.entries.push(entry),
                None => groups.push(FileReplacements {
                    kind: self.kind,
                    file: entry.file(),
                    entries: vec![entry],
                }),
            }
        }
        groups
    }

    /// Apply every entry targeting `file` to `content`.
    ///
    /// Convenience over [`by_file`](Self::by_file) for single-file callers.
    pub fn apply_to(&self, file: &RelativePath, content: &str) -> Result<ReplacementOutcome, DomainError> {
        let entries: Vec<&ReplacementEntry> =
            self.entries.iter().filter(|e| e.file() == file).collect();
        FileReplacements {
            kind: self.kind,
            file,
            entries,
        }
        .apply(content)
    }
}

/// The entries of one set that target a single file.
#[derive(Debug)]
pub struct FileReplacements<'a> {
    kind: ReplacementKind,
    file: &'a RelativePath,
    entries: Vec<&'a ReplacementEntry>,
}

impl<'a> FileReplacements<'a> {
    pub fn file(&self) -> &'a RelativePath {
        self.file
    }

    pub fn kind(&self) -> ReplacementKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &'a ReplacementEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Apply entries in declaration order; each sees the previous result.
    ///
    /// # Errors
    ///
    /// `MissingAnchor` on the first mandatory entry whose anchor is absent
    /// from the current content. Optional entries never fail.
    pub fn apply(&self, content: &str) -> Result<ReplacementOutcome, DomainError> {
        let mut current = content.to_string();
        let mut applied = 0;
        let mut skipped = Vec::new();

        for entry in &self.entries {
            match entry.matcher().replace(&current, entry.replacement()) {
                Some(next) => {
                    current = next;
                    applied += 1;
                }
                None if self.kind.is_mandatory() => {
                    return Err(DomainError::MissingAnchor {
                        file: self.file.to_string(),
                        matcher: entry.matcher().describe(),
                    });
                }
                None => skipped.push(entry.matcher().describe()),
            }
        }

        Ok(ReplacementOutcome {
            content: current,
            applied,
            skipped,
        })
    }
}

/// Result of applying a file's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOutcome {
    pub content: String,
    /// Number of entries whose anchor was found.
    pub applied: usize,
    /// Descriptions of optional entries whose anchor was absent.
    pub skipped: Vec<String>,
}

impl ReplacementOutcome {
    pub fn changed_from(&self, original: &str) -> bool {
        self.content != original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::matcher::text;

    fn path(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    fn entry(file: &str, matcher: ReplacementMatcher, replacement: &str) -> ReplacementEntry {
        ReplacementEntry::new(path(file), matcher, replacement).unwrap()
    }

    #[test]
    fn mandatory_line_after() {
        let set = ReplacementSet::mandatory(vec![entry("f.txt", text("B").line_after(), "X")]);
        let out = set.apply_to(&path("f.txt"), "A\nB\nC").unwrap();
        assert_eq!(out.content, "A\nB\nX\nC");
        assert_eq!(out.applied, 1);
    }

    #[test]
    fn optional_missing_anchor_passes_through() {
        let set = ReplacementSet::optional(vec![entry("f.txt", text("Z").at(), "Y")]);
        let out = set.apply_to(&path("f.txt"), "A\nB\nC").unwrap();
        assert_eq!(out.content, "A\nB\nC");
        assert_eq!(out.applied, 0);
        assert_eq!(out.skipped, vec!["text \"Z\" (at)".to_string()]);
        assert!(!out.changed_from("A\nB\nC"));
    }

    #[test]
    fn mandatory_missing_anchor_names_file_and_matcher() {
        let set = ReplacementSet::mandatory(vec![entry("src/f.txt", text("Z").at(), "Y")]);
        let err = set.apply_to(&path("src/f.txt"), "A\nB\nC").unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingAnchor {
                file: "src/f.txt".into(),
                matcher: "text \"Z\" (at)".into(),
            }
        );
    }

    #[test]
    fn dependent_entries_succeed_in_declared_order() {
        let set = ReplacementSet::mandatory(vec![
            entry("f.txt", text("A").just_after(), "<hook>"),
            entry("f.txt", text("<hook>").at(), "done"),
        ]);
        let out = set.apply_to(&path("f.txt"), "A").unwrap();
        assert_eq!(out.content, "Adone");
    }

    #[test]
    fn dependent_entries_fail_when_reversed() {
        let set = ReplacementSet::mandatory(vec![
            entry("f.txt", text("<hook>").at(), "done"),
            entry("f.txt", text("A").just_after(), "<hook>"),
        ]);
        let err = set.apply_to(&path("f.txt"), "A").unwrap_err();
        assert!(matches!(err, DomainError::MissingAnchor { .. }));
    }

    #[test]
    fn independent_entries_commute() {
        let forward = ReplacementSet::mandatory(vec![
            entry("f.txt", text("A").at(), "1"),
            entry("f.txt", text("C").at(), "3"),
        ]);
        let reverse = ReplacementSet::mandatory(vec![
            entry("f.txt", text("C").at(), "3"),
            entry("f.txt", text("A").at(), "1"),
        ]);
        let f = forward.apply_to(&path("f.txt"), "A B C").unwrap();
        let r = reverse.apply_to(&path("f.txt"), "A B C").unwrap();
        assert_eq!(f.content, "1 B 3");
        assert_eq!(f.content, r.content);
    }

    #[test]
    fn by_file_groups_in_first_appearance_order() {
        let set = ReplacementSet::optional(vec![
            entry("b.txt", text("1").at(), "x"),
            entry("a.txt", text("2").at(), "y"),
            entry("b.txt", text("3").at(), "z"),
        ]);
        let groups = set.by_file();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].file(), &path("b.txt"));
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].file(), &path("a.txt"));

        let replacements: Vec<_> = groups[0].entries().map(|e| e.replacement()).collect();
        assert_eq!(replacements, vec!["x", "z"]);
    }

    #[test]
    fn empty_text_anchor_rejected_at_construction() {
        let result = ReplacementEntry::new(path("f.txt"), text("").at(), "x");
        assert!(matches!(result, Err(DomainError::BlankField { .. })));
    }
}
