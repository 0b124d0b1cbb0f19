//! Unified error handling for Graft Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use std::fmt;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Graft Core operations.
#[derive(Debug, Error, Clone)]
pub enum GraftError {
    /// Errors from the domain layer (module authoring, missing anchors).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and adapters).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// A failure inside one module application, with where it happened.
    ///
    /// Phases before `phase` are committed; phases after it never ran.
    #[error("Module '{module}' failed during {phase}: {source}")]
    ModuleApplication {
        module: String,
        phase: ApplyPhase,
        source: Box<GraftError>,
    },

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl GraftError {
    /// Strip module-application envelopes.
    pub fn root_cause(&self) -> &GraftError {
        match self {
            Self::ModuleApplication { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Phase in which a module application failed, if this is one.
    pub fn phase(&self) -> Option<ApplyPhase> {
        match self {
            Self::ModuleApplication { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::ModuleApplication {
                module,
                phase,
                source,
            } => {
                let mut suggestions = source.suggestions();
                if *phase > ApplyPhase::PreActions {
                    suggestions.push(format!(
                        "Phases before {} of '{}' were already written; review the project before retrying",
                        phase, module
                    ));
                }
                suggestions
            }
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Graft".into(),
                "Please report this issue at: https://github.com/cosecruz/graft/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::ModuleApplication { source, .. } => source.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// `true` if nothing was written when this error was raised.
    pub fn is_build_time(&self) -> bool {
        match self.root_cause() {
            Self::Domain(e) => e.is_build_time(),
            _ => false,
        }
    }

    pub(crate) fn during(self, module: &str, phase: ApplyPhase) -> Self {
        Self::ModuleApplication {
            module: module.to_string(),
            phase,
            source: Box::new(self),
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// The six fixed phases of a module application, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyPhase {
    PreActions,
    FilePlacement,
    MandatoryReplacements,
    OptionalReplacements,
    ArtifactMerge,
    PostActions,
}

impl ApplyPhase {
    pub const ALL: [ApplyPhase; 6] = [
        Self::PreActions,
        Self::FilePlacement,
        Self::MandatoryReplacements,
        Self::OptionalReplacements,
        Self::ArtifactMerge,
        Self::PostActions,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreActions => "pre-actions",
            Self::FilePlacement => "file placement",
            Self::MandatoryReplacements => "mandatory replacements",
            Self::OptionalReplacements => "optional replacements",
            Self::ArtifactMerge => "artifact merge",
            Self::PostActions => "post-actions",
        }
    }
}

impl fmt::Display for ApplyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convenient result type alias.
pub type GraftResult<T> = Result<T, GraftError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> GraftResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> GraftResult<T> {
        self.map_err(|e| GraftError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_anchor() -> GraftError {
        DomainError::MissingAnchor {
            file: "pom.xml".into(),
            matcher: "text \"<dependencies>\" (line after)".into(),
        }
        .into()
    }

    #[test]
    fn envelope_keeps_source_and_phase() {
        let err = missing_anchor().during("spring-boot", ApplyPhase::MandatoryReplacements);

        assert_eq!(err.phase(), Some(ApplyPhase::MandatoryReplacements));
        assert!(matches!(
            err.root_cause(),
            GraftError::Domain(DomainError::MissingAnchor { .. })
        ));
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let message = err.to_string();
        assert!(message.contains("spring-boot"));
        assert!(message.contains("mandatory replacements"));
        assert!(message.contains("pom.xml"));
    }

    #[test]
    fn partial_application_is_called_out() {
        let err = missing_anchor().during("spring-boot", ApplyPhase::MandatoryReplacements);
        assert!(err.suggestions().iter().any(|s| s.contains("already written")));

        let early = missing_anchor().during("spring-boot", ApplyPhase::PreActions);
        assert!(!early.suggestions().iter().any(|s| s.contains("already written")));
    }

    #[test]
    fn build_time_classification() {
        let build: GraftError = DomainError::BlankField { field: "slug" }.into();
        assert!(build.is_build_time());
        assert!(!missing_anchor().is_build_time());
    }

    #[test]
    fn phases_are_ordered() {
        let mut sorted = ApplyPhase::ALL;
        sorted.sort();
        assert_eq!(sorted, ApplyPhase::ALL);
        assert_eq!(ApplyPhase::ArtifactMerge.to_string(), "artifact merge");
    }

    #[test]
    fn context_wraps_as_internal() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.context("reading catalog").unwrap_err();
        assert!(matches!(err, GraftError::Internal { .. }));
        assert!(err.to_string().contains("reading catalog: boom"));
    }
}
