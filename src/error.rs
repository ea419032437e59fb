//! Error types for metadata extraction

use thiserror::Error;

/// Errors that abort an extraction.
///
/// Field-level problems (a bad date, an unparseable address, invalid UTF-8)
/// never surface here: the field is left out of the record instead.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input could not be opened or read at all
    #[error("Source unavailable: {location}: {source}")]
    SourceUnavailable {
        location: String,
        source: std::io::Error,
    },

    /// The location does not name anything a source can open
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// No header block could be recognized in the input
    #[error("Not a valid message: {0}")]
    NotAMessage(String),

    /// Rejected extractor configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ParseError {
    /// Wrap an I/O failure for the given location
    pub fn source_unavailable(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            location: location.into(),
            source,
        }
    }
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ParseError>;
