//! The converter seam and conversion directions.

use std::fmt;
use std::str::FromStr;

use crategen_core::Vocabulary;
use serde_json::Value;
use thiserror::Error;

use crate::error::ConvertError;
use crate::notice::Notice;

/// Output of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    /// The converted payload.
    pub data: Value,

    /// Lossy or deprecated fields encountered on the way.
    pub notices: Vec<Notice>,
}

impl Converted {
    pub fn new(data: Value, notices: Vec<Notice>) -> Self {
        Self { data, notices }
    }
}

/// Converts one vocabulary to and from WRROC.
pub trait Converter {
    /// The non-WRROC side of this converter.
    fn vocabulary(&self) -> Vocabulary;

    /// Convert a payload of [`Converter::vocabulary`] into WRROC.
    fn to_wrroc(&self, data: &Value) -> Result<Converted, ConvertError>;

    /// Convert a WRROC payload into [`Converter::vocabulary`].
    fn from_wrroc(&self, data: &Value) -> Result<Converted, ConvertError>;
}

/// A supported conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    TesToWrroc,
    WrrocToTes,
    WesToWrroc,
    WrrocToWes,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::TesToWrroc,
        Direction::WrrocToTes,
        Direction::WesToWrroc,
        Direction::WrrocToWes,
    ];

    pub fn source(&self) -> Vocabulary {
        match self {
            Self::TesToWrroc => Vocabulary::Tes,
            Self::WesToWrroc => Vocabulary::Wes,
            Self::WrrocToTes | Self::WrrocToWes => Vocabulary::Wrroc,
        }
    }

    pub fn target(&self) -> Vocabulary {
        match self {
            Self::WrrocToTes => Vocabulary::Tes,
            Self::WrrocToWes => Vocabulary::Wes,
            Self::TesToWrroc | Self::WesToWrroc => Vocabulary::Wrroc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TesToWrroc => "tes-to-wrroc",
            Self::WrrocToTes => "wrroc-to-tes",
            Self::WesToWrroc => "wes-to-wrroc",
            Self::WrrocToWes => "wrroc-to-wes",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown direction name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown conversion direction '{0}'")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}
