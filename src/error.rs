//! Error types for the hand motion analysis library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Start of the requested time range is not strictly before its end
    #[error("Invalid range: start ({start}) must be before end ({end})")]
    InvalidRange {
        /// Start endpoint as entered
        start: String,
        /// End endpoint as entered
        end: String,
    },

    /// Number of selected keypoints does not match the analysis method
    #[error("The number of keypoints must be {expected} for {method} (got {actual})")]
    KeypointCountMismatch {
        /// Method name
        method: String,
        /// Arity required by the method
        expected: usize,
        /// Number of keypoints supplied
        actual: usize,
    },

    /// Keypoint name or index not present in the registry
    #[error("Unknown keypoint: {0}")]
    UnknownKeypoint(String),

    /// Time endpoint could not be parsed
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Clip id not present in the metadata store
    #[error("Unknown clip: {0}")]
    UnknownClip(String),

    /// Stored metadata or coordinate data has an unexpected shape or value
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Plot text could not be laid out
    #[error("Rendering error: {0}")]
    Render(String),

    /// Interactive prompt failure
    #[error("Prompt error: {0}")]
    Readline(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding or saving failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Metadata JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error comes from request validation and can be corrected
    /// by the user without restarting.
    ///
    /// `UnknownKeypoint` is not included: it means a keypoint outside the
    /// registry reached a request, which ends the run like a missing clip.
    /// Entry forms catch bad keypoint answers while parsing and ask again.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::KeypointCountMismatch { .. } | Self::InvalidTimeFormat(_)
        )
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
