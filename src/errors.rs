/*!
 * Error types for the captionkit application.
 *
 * `CaptionError` is the failure taxonomy of one conversion; `AppError`
 * wraps it together with configuration and I/O failures at the top level.
 * Both use the thiserror crate for ergonomic error definitions.
 */

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::caption::model::{CaptionFormat, Direction};
use crate::caption::verifier::Divergence;

/// Errors that can occur while converting a single caption document
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Path does not carry the extension implied by the direction
    #[error("{} must have the .{} extension for {} captions", .path.display(), .expected.extension(), .expected)]
    InvalidExtension {
        path: PathBuf,
        expected: CaptionFormat,
    },

    /// Extension does not name any caption format
    #[error("Cannot tell the caption format of {} from its extension", .path.display())]
    UnknownFormat { path: PathBuf },

    /// Input could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    UnwritableOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output already exists and overwriting was not requested
    #[error("Output file already exists: {} (use --force to overwrite)", .path.display())]
    OutputExists { path: PathBuf },

    /// Forward + inverse conversion did not reproduce the input
    #[error("Conversion {direction} is not lossless\n{divergence}")]
    RoundTripDivergence {
        direction: Direction,
        divergence: Box<Divergence>,
    },

    /// Declared format's structural markers are missing (strict parsing)
    #[error("Malformed {format} source: {reason}")]
    MalformedSource {
        format: CaptionFormat,
        reason: String,
    },

    /// Timestamp token that cannot be parsed
    #[error("Malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// Operator declined to proceed after a soft divergence
    #[error("Conversion aborted: {0}")]
    Aborted(String),
}

impl CaptionError {
    /// True for failures that happen before anything is read
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidExtension { .. } | Self::UnknownFormat { .. } | Self::OutputExists { .. }
        )
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a conversion
    #[error(transparent)]
    Caption(#[from] CaptionError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
