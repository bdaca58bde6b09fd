//! Core validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three vocabularies CrateGen translates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vocabulary {
    /// GA4GH Task Execution Service.
    Tes,
    /// GA4GH Workflow Execution Service.
    Wes,
    /// Workflow Run RO-Crate.
    Wrroc,
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tes => write!(f, "TES"),
            Self::Wes => write!(f, "WES"),
            Self::Wrroc => write!(f, "WRROC"),
        }
    }
}

/// A single field-level problem, addressed by its path in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted/indexed path of the offending field, e.g. `inputs[0].url`.
    pub path: String,

    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    /// Create a new FieldError.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Ordered list of field errors collected during one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an error.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(path, message));
    }

    /// Append every error of `other`.
    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Append every error of `other`, skipping exact duplicates.
    pub fn union(&mut self, other: FieldErrors) {
        for err in other.0 {
            if !self.0.contains(&err) {
                self.0.push(err);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Returns true if any error is reported against `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.0.iter().any(|e| e.path == path)
    }

    /// Convert into `Err(self)` if any error was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl From<FieldError> for FieldErrors {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Core validation errors for CrateGen.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Required field missing, wrong type, unknown enum value or a
    /// cross-field rule violated.
    #[error("Structural validation failed: {0}")]
    Structural(FieldErrors),

    /// Payload matches none of the WRROC profile tiers.
    #[error("Payload matches no WRROC profile: {0}")]
    ProfileResolution(FieldErrors),

    /// Payload is valid for its own vocabulary but lacks what the target
    /// vocabulary needs.
    #[error("Cannot convert to {target}: {errors}")]
    ConversionField {
        target: Vocabulary,
        errors: FieldErrors,
    },
}

impl CoreError {
    /// The field-level errors behind this error.
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            Self::Structural(errors) | Self::ProfileResolution(errors) => errors,
            Self::ConversionField { errors, .. } => errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_errors() {
        let mut errors = FieldErrors::new();
        errors.push("id", "field is required");
        errors.push("inputs[0].path", "must be an absolute path");

        assert_eq!(
            errors.to_string(),
            "id: field is required; inputs[0].path: must be an absolute path"
        );
    }

    #[test]
    fn test_union_skips_duplicates() {
        let mut a = FieldErrors::from(FieldError::new("name", "field is required"));
        let mut b = FieldErrors::new();
        b.push("name", "field is required");
        b.push("workflowType", "field is required");

        a.union(b);
        assert_eq!(a.len(), 2);
        assert!(a.contains_path("workflowType"));
    }

    #[test]
    fn test_field_errors_accessor() {
        let err = CoreError::ConversionField {
            target: Vocabulary::Tes,
            errors: FieldError::new("result", "must not be empty").into(),
        };

        assert!(err.to_string().starts_with("Cannot convert to TES"));
        assert!(err.field_errors().contains_path("result"));
    }
}
