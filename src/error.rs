//! Error types for the texforge library.

use std::io;
use thiserror::Error;

/// Result type alias for texforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The fragment stream violates the ordering/position invariant.
    ///
    /// This is fatal to the conversion session: reading order cannot be
    /// reconstructed, so the session aborts with the offending page.
    #[error("malformed fragment stream on page {page}: {reason}")]
    MalformedFragmentStream {
        /// Page index (0-based) where the violation was detected.
        page: u32,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// An image payload could not be decoded into pixels.
    ///
    /// Recoverable: the caller emits a placeholder reference and continues.
    #[error("failed to decode image {object_id} on page {page}: {reason}")]
    ImageDecode {
        /// Object identifier of the image within the source document.
        object_id: String,
        /// Source page number (1-based).
        page: u32,
        /// What went wrong.
        reason: String,
    },

    /// Error assembling the output markup.
    #[error("emit error: {0}")]
    Emit(String),

    /// Error deserializing a fragment stream.
    #[error("fragment stream decode error: {0}")]
    StreamDecode(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
