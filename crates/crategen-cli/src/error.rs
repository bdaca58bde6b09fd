//! CLI errors and exit codes.

use std::path::PathBuf;

use crategen_convert::ConvertError;
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input file is not valid JSON.
    #[error("Failed to parse '{}' as JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The payload could not be converted.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl CliError {
    /// Process exit code: 1 for I/O and parse failures, 2 for conversion
    /// failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Read { .. } | Self::Write { .. } | Self::Parse { .. } => 1,
            Self::Convert(_) => 2,
        }
    }
}
