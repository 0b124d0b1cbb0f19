// ============================================================================
// domain/error.rs - MODULE DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside apply reports and wrapped errors)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Build-time errors (module authoring bugs)
    // ========================================================================
    #[error("'{field}' must not be blank")]
    BlankField { field: &'static str },

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the project root: {path}")]
    PathTraversal { path: String },

    #[error("Invalid regular expression '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Duplicate manifest entry '{name}' in namespace '{namespace}'")]
    DuplicateManifestEntry { namespace: String, name: String },

    #[error("Invalid module: {0}")]
    InvalidModule(String),

    // ========================================================================
    // Apply-time errors (pure text logic)
    // ========================================================================
    #[error("Missing anchor in {file}: {matcher} not found")]
    MissingAnchor { file: String, matcher: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::BlankField { field } => vec![
                format!("Provide a value for '{}'", field),
                "Module definitions must not contain blank identifiers".into(),
            ],
            Self::AbsolutePathNotAllowed { path } | Self::PathTraversal { path } => vec![
                format!("'{}' must be relative to the project root", path),
                "Remove leading '/' and '..' segments from destinations".into(),
            ],
            Self::InvalidRegex { pattern, .. } => vec![
                format!("Fix the regular expression: {}", pattern),
                "Use a text matcher if you only need a literal anchor".into(),
            ],
            Self::DuplicateManifestEntry { namespace, name } => vec![
                format!("'{}' is declared twice under '{}'", name, namespace),
                "Each module may declare a manifest entry only once".into(),
            ],
            Self::MissingAnchor { file, matcher } => vec![
                format!("The anchor {} was not found in {}", matcher, file),
                "Apply the module that introduces this anchor first".into(),
                "Or check whether the template file was refactored".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingAnchor { .. } => ErrorCategory::NotFound,
            _ => ErrorCategory::Validation,
        }
    }

    /// `true` if this error is raised while assembling a module, before any
    /// file is touched.
    pub fn is_build_time(&self) -> bool {
        !matches!(self, Self::MissingAnchor { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
