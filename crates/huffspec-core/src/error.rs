//! Error types for prefix-code construction and decoding.

use crate::types::Symbol;
use thiserror::Error;

/// Result type alias for decoding operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Decoding error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration, reported before any decoding starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The prefix code could not be built from the supplied statistics.
    #[error("code construction failed: {0}")]
    CodeConstruction(String),

    /// Decoding ran past the end of the stream (or hit an unassigned code)
    /// before a leaf was reached.
    #[error("malformed bitstream at bit offset {offset}: {message}")]
    MalformedBitstream { offset: usize, message: String },

    /// A predictor produced no candidate lengths.
    #[error("predictor returned no candidate lengths at frontier {frontier}")]
    PredictionInconsistency { frontier: usize },

    /// Symbol has no codeword in the table.
    #[error("symbol {0} is not part of the code alphabet")]
    UnknownSymbol(Symbol),

    /// A persisted artifact (bitstream, table) could not be parsed.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Create a code construction error.
    pub fn construction(message: impl Into<String>) -> Self {
        Error::CodeConstruction(message.into())
    }

    /// Create a malformed bitstream error at a bit offset.
    pub fn malformed_at(message: impl Into<String>, offset: usize) -> Self {
        Error::MalformedBitstream {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid encoding error.
    pub fn invalid_encoding(message: impl Into<String>) -> Self {
        Error::InvalidEncoding(message.into())
    }

    /// Bit offset at which the error was detected, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::MalformedBitstream { offset, .. } => Some(*offset),
            Error::PredictionInconsistency { frontier } => Some(*frontier),
            _ => None,
        }
    }

    /// Check if error can be absorbed by a speculative decode unit.
    ///
    /// Only stream errors qualify; everything else means the decoder was
    /// misconfigured and no amount of speculation will help.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MalformedBitstream { .. })
    }

    /// Get error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::CodeConstruction(_) => "code_construction",
            Error::MalformedBitstream { .. } => "malformed_bitstream",
            Error::PredictionInconsistency { .. } => "prediction_inconsistency",
            Error::UnknownSymbol(_) => "unknown_symbol",
            Error::InvalidEncoding(_) => "invalid_encoding",
            Error::Serialization(_) => "serialization",
        }
    }
}
