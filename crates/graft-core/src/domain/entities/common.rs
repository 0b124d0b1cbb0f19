use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;

/// A filesystem path guaranteed to stay **inside** a project root.
///
/// This type encodes the invariant that module destinations and replacement
/// targets never point outside the project they are applied to: the path is
/// relative, and `..` segments may never climb above the root.
///
/// `RelativePath` is a *semantic guardrail*, not a filesystem abstraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Validate and wrap a project-relative path.
    ///
    /// `.` segments are dropped and `a/../b` collapses to `b`, so two
    /// spellings of the same file compare equal.
    pub fn try_new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();
        if raw.trim().is_empty() {
            return Err(DomainError::BlankField { field: "path" });
        }

        let candidate = Path::new(raw);
        if candidate.is_absolute() || raw.starts_with('/') || raw.starts_with('\\') {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: raw.to_string(),
            });
        }

        let mut normalized = PathBuf::new();
        for component in candidate.components() {
            match component {
                Component::Normal(segment) => normalized.push(segment),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::PathTraversal {
                            path: raw.to_string(),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: raw.to_string(),
                    });
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(DomainError::InvalidValue {
                field: "path",
                value: raw.to_string(),
                reason: "resolves to the project root itself".into(),
            });
        }

        Ok(Self(normalized))
    }

    /// Join a path segment onto this relative path.
    pub fn join(&self, segment: impl AsRef<str>) -> Result<Self, DomainError> {
        let joined = self.0.join(segment.as_ref());
        Self::try_new(joined.to_string_lossy())
    }

    /// Borrow as a `Path`.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolve against a project root.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }

    /// Extension of the final segment including the dot, or `""`.
    pub fn extension(&self) -> String {
        self.0
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Simplified permission model for placed files.
///
/// This is a **capability model**, not a Unix permission model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    executable: bool,
}

impl Permissions {
    /// Regular, non-executable file.
    pub const fn regular() -> Self {
        Self { executable: false }
    }

    /// Script or wrapper that must be runnable.
    pub const fn executable() -> Self {
        Self { executable: true }
    }

    pub const fn executable_flag(&self) -> bool {
        self.executable
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::regular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------------
    // RelativePath
    // ---------------------------------------------------------------------

    #[test]
    fn relative_path_accepts_relative() {
        let p = RelativePath::try_new("src/main.rs").unwrap();
        assert_eq!(p.as_path(), Path::new("src/main.rs"));
    }

    #[test]
    fn try_new_rejects_absolute() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn try_new_rejects_traversal() {
        assert!(matches!(
            RelativePath::try_new("../outside.txt"),
            Err(DomainError::PathTraversal { .. })
        ));
        assert!(matches!(
            RelativePath::try_new("src/../../outside.txt"),
            Err(DomainError::PathTraversal { .. })
        ));
    }

    #[test]
    fn inner_parent_segments_collapse() {
        let p = RelativePath::try_new("src/./main/../lib.rs").unwrap();
        assert_eq!(p, RelativePath::try_new("src/lib.rs").unwrap());
    }

    #[test]
    fn root_itself_is_rejected() {
        assert!(RelativePath::try_new(".").is_err());
        assert!(RelativePath::try_new("src/..").is_err());
        assert!(RelativePath::try_new("").is_err());
    }

    #[test]
    fn join_relative_path() {
        let base = RelativePath::try_new("src").unwrap();
        let joined = base.join("main.rs").unwrap();
        assert_eq!(joined.as_path(), Path::new("src/main.rs"));
    }

    #[test]
    fn join_rejects_escape() {
        let base = RelativePath::try_new("src").unwrap();
        assert!(base.join("../../etc/passwd").is_err());
    }

    #[test]
    fn extension_includes_dot() {
        let p = RelativePath::try_new("docs/guide.md").unwrap();
        assert_eq!(p.extension(), ".md");
        assert_eq!(RelativePath::try_new("Makefile").unwrap().extension(), "");
    }

    // ---------------------------------------------------------------------
    // Permissions
    // ---------------------------------------------------------------------

    #[test]
    fn permissions_defaults() {
        assert!(!Permissions::default().executable_flag());
        assert!(Permissions::executable().executable_flag());
    }
}
