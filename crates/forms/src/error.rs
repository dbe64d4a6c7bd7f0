//! Field-keyed validation errors.

use serde::Serialize;

/// One failed check, keyed to the offending field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as the client knows it, e.g. `pain_description` or
    /// `medications[1].name`.
    pub field: String,
    /// Human-readable message, suitable for inline display.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The full set of failures from validating one step.
///
/// Accumulates rather than short-circuits: the client shows every invalid
/// field at once, not one per submit attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", self.summary())]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure against a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First message recorded against `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Returns `Ok(value)` when no failure was recorded, otherwise `self`.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    fn summary(&self) -> String {
        if self.errors.is_empty() {
            return "no validation errors".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_and_looks_up_by_field() {
        let mut errors = FieldErrors::new();
        errors.push("first_name", "First name is required");
        errors.push("phone", "Enter a phone number in international format");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.field("first_name"), Some("First name is required"));
        assert_eq!(errors.field("last_name"), None);
    }

    #[test]
    fn into_result_passes_value_through_when_clean() {
        let errors = FieldErrors::new();
        assert_eq!(errors.into_result(7), Ok(7));

        let mut errors = FieldErrors::new();
        errors.push("x", "bad");
        assert!(errors.into_result(7).is_err());
    }

    #[test]
    fn display_joins_field_messages() {
        let mut errors = FieldErrors::new();
        errors.push("phone", "required");
        errors.push("email", "malformed");
        assert_eq!(errors.to_string(), "phone: required; email: malformed");
    }
}
