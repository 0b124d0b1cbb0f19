//! Placeholder substitution context for placed files.
//!
//! A [`ModuleContext`] is derived from the project's ambient context when a
//! module is built, then extended with module-specific entries. It is frozen
//! together with the module.
//!
//! ## Built-in Variables
//!
//! | Variable | Example | Source |
//! |----------|---------|--------|
//! | `PROJECT_NAME` | "My Shop" | `baseName` |
//! | `PROJECT_NAME_SNAKE` | "my_shop" | Computed |
//! | `PROJECT_NAME_KEBAB` | "my-shop" | Computed |
//! | `PROJECT_NAME_PASCAL` | "MyShop" | Computed |
//! | `PACKAGE_NAME` | "com.shop" | `packageName` |
//! | `PACKAGE_PATH` | "com/shop" | Computed |
//! | `INDENTATION` | "  " | `indentSize` |

use std::collections::BTreeMap;

use crate::domain::{
    entities::project::ProjectContext, error::DomainError, value_objects::Indentation,
};

/// Variables available to `{{KEY}}` placeholders in templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleContext {
    indentation: Indentation,
    /// `BTreeMap` so rendering visits variables in a stable order.
    variables: BTreeMap<String, String>,
}

impl ModuleContext {
    /// Derive the built-in variables from a project context.
    ///
    /// Every raw project entry is also exposed under its own key, so a
    /// project value `databaseName` is reachable as `{{databaseName}}`.
    pub fn from_project(project: &ProjectContext) -> Result<Self, DomainError> {
        let indentation = project.indentation()?;
        let name = project.base_name();

        let mut vars: BTreeMap<String, String> = project
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        vars.insert("PROJECT_NAME".to_string(), name.to_string());
        vars.insert("PROJECT_NAME_SNAKE".to_string(), to_snake_case(name));
        vars.insert("PROJECT_NAME_KEBAB".to_string(), to_kebab_case(name));
        vars.insert("PROJECT_NAME_PASCAL".to_string(), to_pascal_case(name));
        vars.insert(
            "PACKAGE_NAME".to_string(),
            project.package_name().to_string(),
        );
        vars.insert("PACKAGE_PATH".to_string(), project.package_path());
        vars.insert("INDENTATION".to_string(), indentation.unit());

        Ok(Self {
            indentation,
            variables: vars,
        })
    }

    /// Add or override a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    pub fn indentation(&self) -> Indentation {
        self.indentation
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render a template string by replacing `{{VARIABLE}}` placeholders.
    ///
    /// # Edge Cases
    ///
    /// - `{{UNKNOWN}}` → remains as literal `{{UNKNOWN}}` (no error)
    /// - `{{PROJECT_NAME}}{{PROJECT_NAME}}` → both replaced
    /// - Values are not re-scanned, so a value containing `{{X}}` stays literal
    pub fn render(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            let (before, after_open) = rest.split_at(open);
            result.push_str(before);

            match after_open[2..].find("}}") {
                Some(close) => {
                    let key = after_open[2..2 + close].trim();
                    match self.variables.get(key) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&after_open[..close + 4]),
                    }
                    rest = &after_open[close + 4..];
                }
                None => {
                    result.push_str(after_open);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

/// Convert a string to snake_case.
///
/// | Input | Output |
/// |-------|--------|
/// | "MyApp" | "my_app" |
/// | "my-app" | "my_app" |
/// | "HTTPRequest" | "http_request" |
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Same as `to_snake_case` but joins with `-`.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// Convert a string to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Split a string into words based on casing and separators.
///
/// 1. **Explicit separators:** `_`, `-`, whitespace → always split
/// 2. **Case transition (camelCase):** `aB` → split between `a` and `B`
/// 3. **Acronym boundary:** `HTTPRequest` → split between `P` and `R`
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(name: &str) -> ModuleContext {
        let project = ProjectContext::new()
            .with(ProjectContext::BASE_NAME, name)
            .with(ProjectContext::PACKAGE_NAME, "com.shop");
        ModuleContext::from_project(&project).unwrap()
    }

    #[test]
    fn standard_variables() {
        let ctx = context("my awesome project");

        assert_eq!(ctx.get("PROJECT_NAME"), Some("my awesome project"));
        assert_eq!(ctx.get("PROJECT_NAME_SNAKE"), Some("my_awesome_project"));
        assert_eq!(ctx.get("PROJECT_NAME_KEBAB"), Some("my-awesome-project"));
        assert_eq!(ctx.get("PROJECT_NAME_PASCAL"), Some("MyAwesomeProject"));
        assert_eq!(ctx.get("PACKAGE_PATH"), Some("com/shop"));
        assert_eq!(ctx.get("INDENTATION"), Some("  "));
    }

    #[test]
    fn project_entries_are_exposed_raw() {
        let ctx = context("shop");
        assert_eq!(ctx.get("packageName"), Some("com.shop"));
    }

    #[test]
    fn custom_variables_override() {
        let ctx = context("shop").with_variable("PROJECT_NAME", "Override");
        assert_eq!(ctx.get("PROJECT_NAME"), Some("Override"));
    }

    #[test]
    fn renders_known_and_keeps_unknown() {
        let ctx = context("my-project");
        let rendered = ctx.render("Project: {{PROJECT_NAME}}, Other: {{UNKNOWN}}");
        assert_eq!(rendered, "Project: my-project, Other: {{UNKNOWN}}");
    }

    #[test]
    fn renders_repeated_and_unterminated() {
        let ctx = context("x");
        assert_eq!(ctx.render("{{PROJECT_NAME}}{{PROJECT_NAME}}"), "xx");
        assert_eq!(ctx.render("open {{PROJECT_NAME"), "open {{PROJECT_NAME");
    }

    #[test]
    fn values_are_not_rescanned() {
        let ctx = context("x").with_variable("A", "{{PROJECT_NAME}}");
        assert_eq!(ctx.render("{{A}}"), "{{PROJECT_NAME}}");
    }

    #[test]
    fn case_conversions() {
        assert_eq!(to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(to_kebab_case("myApp"), "my-app");
        assert_eq!(to_pascal_case("my-app"), "MyApp");
    }
}
