//! Error types for conversions.

use crategen_core::{CoreError, FieldErrors, Vocabulary};
use thiserror::Error;

/// Errors that can occur while converting a payload.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input is not valid for its own vocabulary, or lacks what the
    /// target vocabulary needs.
    #[error("Invalid {vocabulary} input: {source}")]
    InvalidSource {
        vocabulary: Vocabulary,
        source: CoreError,
    },

    /// The produced payload failed re-validation against the target schema.
    #[error("Converted {vocabulary} output failed validation: {source}")]
    InvalidOutput {
        vocabulary: Vocabulary,
        source: CoreError,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    pub(crate) fn source_error(vocabulary: Vocabulary) -> impl FnOnce(CoreError) -> Self {
        move |source| Self::InvalidSource { vocabulary, source }
    }

    pub(crate) fn output_error(vocabulary: Vocabulary) -> impl FnOnce(CoreError) -> Self {
        move |source| Self::InvalidOutput { vocabulary, source }
    }

    /// The validation error behind this error, if any.
    pub fn core(&self) -> Option<&CoreError> {
        match self {
            Self::InvalidSource { source, .. } | Self::InvalidOutput { source, .. } => {
                Some(source)
            }
            Self::Json(_) => None,
        }
    }

    /// The field-level errors, unchanged from validation.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.core().map(CoreError::field_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crategen_core::FieldError;

    #[test]
    fn test_field_errors_pass_through() {
        let errors = FieldErrors::from(FieldError::new("inputs[0].url", "bad"));
        let err = ConvertError::source_error(Vocabulary::Tes)(CoreError::Structural(errors.clone()));

        assert_eq!(err.field_errors(), Some(&errors));
        assert_eq!(
            err.to_string(),
            "Invalid TES input: Structural validation failed: inputs[0].url: bad"
        );
    }
}
