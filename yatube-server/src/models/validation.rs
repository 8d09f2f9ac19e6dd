//! Validation error types

use std::fmt;

/// Validation error for domain models and submitted forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty (or whitespace only)
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Field is shorter than the minimum length
    TooShort { field: &'static str, min: usize },

    /// String doesn't match required format (e.g., slug)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value is not one of the available choices
    InvalidChoice { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the form field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidChoice { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::TooShort { field, min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidChoice { field, value } => {
                write!(f, "select a valid {}: '{}' is not one of the available choices", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Field errors collected while validating a submitted form.
///
/// Keeps submission order so the page lists errors the way fields appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<ValidationError>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors attached to a single field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0.iter().filter(move |e| e.field() == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

impl From<ValidationError> for FormErrors {
    fn from(err: ValidationError) -> Self {
        Self(vec![err])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 200,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 200 characters"
        );
    }

    #[test]
    fn form_errors_by_field() {
        let mut errors = FormErrors::new();
        errors.push(ValidationError::Empty { field: "text" });
        errors.push(ValidationError::InvalidChoice {
            field: "group",
            value: "42".into(),
        });

        assert_eq!(errors.for_field("text").count(), 1);
        assert_eq!(errors.for_field("group").count(), 1);
        assert_eq!(errors.for_field("author").count(), 0);
        assert!(!errors.is_empty());
    }
}
