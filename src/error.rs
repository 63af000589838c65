//! Error types for the audio relay

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoder bank errors
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error("Failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Malformed audio data: {0}")]
    Malformed(String),

    #[error("Codec mismatch: expected {expected}, found {found}")]
    CodecMismatch { expected: String, found: String },

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("Sample rate missing from stream")]
    MissingSampleRate,

    #[error("Stream decoded to zero samples")]
    Empty,
}

impl DecodeError {
    /// Whether the failure is a missing asset rather than bad content.
    ///
    /// Missing assets abort the request with an error; everything else is
    /// downgraded to "no playable asset".
    pub fn is_not_found(&self) -> bool {
        matches!(self, DecodeError::AssetNotFound(_))
    }
}

impl From<symphonia::core::errors::Error> for DecodeError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error as SymphoniaError;
        match err {
            SymphoniaError::IoError(e) => DecodeError::Io(e),
            SymphoniaError::Unsupported(what) => DecodeError::UnsupportedCodec(what.to_string()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

/// Per-tick playback errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Chunk sink failed: {0}")]
    Sink(String),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Invalid message format")]
    InvalidMessage,
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
