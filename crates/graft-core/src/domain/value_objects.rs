//! Domain value objects: identifiers, versions, property keys, namespaces.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. Every
//! constructor validates eagerly, so an invalid identifier is rejected while
//! the module is being defined rather than when it is applied.

use crate::domain::{error::DomainError, validation::DomainValidator as validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates a validated string newtype with the usual conversions.
macro_rules! string_value {
    ($(#[$meta:meta])* $name:ident, $field:literal, $check:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                $check($field, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

// ── Module identity ──────────────────────────────────────────────────────────

string_value!(
    /// Identifier of a module, e.g. `spring-boot-mysql`.
    ModuleSlug,
    "module slug",
    validator::kebab_case
);

// ── Dependency coordinates ───────────────────────────────────────────────────

string_value!(
    /// Dependency group, e.g. `org.springframework.boot`.
    GroupId,
    "group id",
    validator::no_whitespace
);

string_value!(
    /// Dependency artifact, e.g. `spring-boot-starter-web`.
    ArtifactId,
    "artifact id",
    validator::no_whitespace
);

string_value!(
    /// Named indirection to a version held by an external catalog.
    VersionSlug,
    "version slug",
    validator::no_whitespace
);

string_value!(
    /// Concrete version string, e.g. `3.2.0`.
    Version,
    "version",
    validator::no_whitespace
);

string_value!(
    /// Dependency classifier, e.g. `tests` or `sources`.
    Classifier,
    "classifier",
    validator::no_whitespace
);

/// Dependency scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    Import,
}

impl DependencyScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "provided" => Ok(Self::Provided),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "import" => Ok(Self::Import),
            other => Err(DomainError::InvalidValue {
                field: "dependency scope",
                value: other.to_string(),
                reason: "expected compile, provided, runtime, test or import".into(),
            }),
        }
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

string_value!(
    /// Property key, e.g. `spring.datasource.url`.
    PropertyKey,
    "property key",
    validator::no_whitespace
);

string_value!(
    /// Named property grouping, e.g. `local` or `prod`.
    Profile,
    "profile",
    validator::no_whitespace
);

impl Profile {
    pub const DEFAULT: &'static str = "default";

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// A property value: one or more entries, rendered comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue(Vec<String>);

impl PropertyValue {
    pub fn new<I, S>(values: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(DomainError::BlankField {
                field: "property value",
            });
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined representation used by flat property files.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Which property file family a property belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyTarget {
    #[default]
    Main,
    Test,
}

impl PropertyTarget {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "test" => Ok(Self::Test),
            other => Err(DomainError::InvalidValue {
                field: "property target",
                value: other.to_string(),
                reason: "expected main or test".into(),
            }),
        }
    }
}

// ── Manifest ──────────────────────────────────────────────────────────────────

string_value!(
    /// Namespace inside a script/dependency manifest, e.g. `scripts`.
    ManifestNamespace,
    "manifest namespace",
    validator::no_whitespace
);

impl ManifestNamespace {
    pub const SCRIPTS: &'static str = "scripts";
    pub const DEPENDENCIES: &'static str = "dependencies";
    pub const DEV_DEPENDENCIES: &'static str = "devDependencies";

    pub fn scripts() -> Self {
        Self(Self::SCRIPTS.to_string())
    }

    pub fn dependencies() -> Self {
        Self(Self::DEPENDENCIES.to_string())
    }

    pub fn dev_dependencies() -> Self {
        Self(Self::DEV_DEPENDENCIES.to_string())
    }
}

string_value!(
    /// Entry name inside a manifest namespace, e.g. a script name.
    ManifestKey,
    "manifest key",
    validator::not_blank
);

// ── Layout ────────────────────────────────────────────────────────────────────

/// Indentation used by generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indentation(usize);

impl Indentation {
    pub const DEFAULT_SPACES: usize = 2;

    pub fn spaces(count: usize) -> Result<Self, DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidValue {
                field: "indentation",
                value: count.to_string(),
                reason: "must be at least one space".into(),
            });
        }
        Ok(Self(count))
    }

    pub const fn size(&self) -> usize {
        self.0
    }

    /// One indentation level, as spaces.
    pub fn unit(&self) -> String {
        " ".repeat(self.0)
    }

    /// `level` indentation units.
    pub fn times(&self, level: usize) -> String {
        " ".repeat(self.0 * level)
    }
}

impl Default for Indentation {
    fn default() -> Self {
        Self(Self::DEFAULT_SPACES)
    }
}

string_value!(
    /// Title of a documentation page linked from the project README.
    DocumentationTitle,
    "documentation title",
    validator::not_blank
);

impl DocumentationTitle {
    /// File name derived from the title: `"Dev Tools"` -> `"dev-tools"`.
    pub fn filename(&self) -> String {
        self.0
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}
