use crate::domain::error::DomainError;

/// Centralized domain validation.
///
/// All input assertions live here, not scattered across value objects.
pub struct DomainValidator;

impl DomainValidator {
    /// Reject empty or whitespace-only input.
    pub fn not_blank(field: &'static str, value: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::BlankField { field });
        }
        Ok(())
    }

    /// Reject blank input and any whitespace inside the value.
    pub fn no_whitespace(field: &'static str, value: &str) -> Result<(), DomainError> {
        Self::not_blank(field, value)?;
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidValue {
                field,
                value: value.to_string(),
                reason: "must not contain whitespace".into(),
            });
        }
        Ok(())
    }

    /// Lowercase letters, digits and single hyphens, e.g. `spring-boot-mysql`.
    pub fn kebab_case(field: &'static str, value: &str) -> Result<(), DomainError> {
        Self::not_blank(field, value)?;

        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        let valid_shape =
            !value.starts_with('-') && !value.ends_with('-') && !value.contains("--");

        if !valid_chars || !valid_shape {
            return Err(DomainError::InvalidValue {
                field,
                value: value.to_string(),
                reason: "expected lowercase kebab-case (a-z, 0-9, '-')".into(),
            });
        }
        Ok(())
    }
}
