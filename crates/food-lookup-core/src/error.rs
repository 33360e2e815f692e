//! Error types for food-lookup-core.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::catalog::Classification;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while ingesting a single catalog source.
///
/// None of these abort a load. The loader logs them and moves on to the
/// next file or line.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file's parent directory is not a recognized classification.
    #[error("{path}: parent directory {dir:?} must be \"allowed\" or \"not_allowed\"")]
    UnknownClassification {
        /// The file that was skipped.
        path: Utf8PathBuf,
        /// The offending directory name.
        dir: String,
    },

    /// A line was not valid UTF-8.
    #[error("{path}:{line}: line is not valid UTF-8")]
    MalformedLine {
        /// The file containing the line.
        path: Utf8PathBuf,
        /// One-based line number.
        line: usize,
    },

    /// A path in the data tree is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// Directory traversal failed for an entry.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// Result type alias using [`CatalogError`].
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors returned when a suggestion is rejected or cannot be stored.
#[derive(Error, Debug)]
pub enum SuggestError {
    /// Normalized text is shorter than the minimum.
    #[error("suggestion too short: {len} characters (minimum {min})")]
    TooShort {
        /// Normalized length.
        len: usize,
        /// Minimum accepted length.
        min: usize,
    },

    /// Normalized text is longer than the maximum.
    #[error("suggestion too long: {len} characters (maximum {max})")]
    TooLong {
        /// Normalized length.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The classification already holds the maximum number of suggestions.
    #[error("{classification} suggestions are full ({limit} recorded)")]
    CapacityExceeded {
        /// Classification that is full.
        classification: Classification,
        /// Configured cap.
        limit: usize,
    },

    /// The suggestion log could not be opened or appended to.
    #[error("failed to append to {path}: {source}")]
    Persist {
        /// Log file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl SuggestError {
    /// Whether the rejection is the submitter's fault rather than the server's.
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Persist { .. })
    }
}

/// Result type alias using [`SuggestError`].
pub type SuggestResult<T> = Result<T, SuggestError>;
