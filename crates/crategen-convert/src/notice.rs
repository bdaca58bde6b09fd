//! Conversion notices.
//!
//! Conversions between these vocabularies are lossy at known points. Instead
//! of printing warnings, converters return a [`Notice`] for every set field
//! they drop, every field they fill in, and every deprecated field they read.
//! Fields a target record can represent but leaves at its default, such as
//! the empty executor command, are reported as synthesized.

use std::fmt;

use serde::Serialize;

/// Something the caller should know about a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The input used a deprecated field.
    Deprecated { field: String, replacement: String },

    /// An input field has no counterpart in the target vocabulary.
    Dropped { field: String },

    /// An output field was filled with a placeholder.
    Synthesized { field: String, value: String },
}

impl Notice {
    pub fn deprecated(field: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::Deprecated {
            field: field.into(),
            replacement: replacement.into(),
        }
    }

    pub fn dropped(field: impl Into<String>) -> Self {
        Self::Dropped {
            field: field.into(),
        }
    }

    pub fn synthesized(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Synthesized {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The field the notice is about.
    pub fn field(&self) -> &str {
        match self {
            Self::Deprecated { field, .. }
            | Self::Dropped { field }
            | Self::Synthesized { field, .. } => field,
        }
    }
}

/// Push a `Dropped` notice for each `(key, set)` pair that is set.
pub(crate) fn push_dropped(notices: &mut Vec<Notice>, prefix: &str, fields: &[(&str, bool)]) {
    for (key, set) in fields {
        if *set {
            notices.push(Notice::dropped(format!("{prefix}{key}")));
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deprecated { field, replacement } => {
                write!(f, "'{field}' is deprecated, use '{replacement}' instead")
            }
            Self::Dropped { field } => {
                write!(f, "'{field}' has no counterpart in the target and was dropped")
            }
            Self::Synthesized { field, value } => {
                write!(f, "'{field}' is not retained by the source and was set to {value}")
            }
        }
    }
}
