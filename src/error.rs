//! Error types for sniffing and decode dispatch.

use std::io;

/// Error type returned by format decoders.
///
/// Decoders are external to the dispatcher, so their errors are carried
/// opaquely and handed back to the caller unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for decode dispatch.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// No registered format matched the leading bytes of the stream.
    #[error("unrecognized image format")]
    UnrecognizedFormat,
    /// A format was requested by name but nothing is registered under it.
    #[error("no format registered under the name {0:?}")]
    UnknownFormat(String),
    /// The format was recognized but its decoder rejected the data.
    #[error("{format}: {source}")]
    Decode {
        format: String,
        #[source]
        source: BoxError,
    },
    /// Decoded dimensions are outside the configured limits.
    #[error("{format}: limit exceeded: {detail}")]
    LimitExceeded {
        format: String,
        detail: &'static str,
    },
    /// Reading the stream failed while looking for magic bytes.
    #[error("I/O error while sniffing: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Wrap a decoder error, tagging it with the format that was attempted.
    pub fn from_codec(format: impl Into<String>, source: BoxError) -> Self {
        DecodeError::Decode {
            format: format.into(),
            source,
        }
    }

    /// Name of the format that was matched, if the error happened after sniffing.
    pub fn format(&self) -> Option<&str> {
        match self {
            DecodeError::Decode { format, .. } | DecodeError::LimitExceeded { format, .. } => {
                Some(format)
            }
            _ => None,
        }
    }

    /// Whether the stream was not recognized at all, as opposed to malformed.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, DecodeError::UnrecognizedFormat)
    }
}

/// Failure to look ahead in a [`Peek`](crate::Peek) source.
#[derive(Debug, thiserror::Error)]
pub enum PeekError {
    /// The stream ended before the requested number of bytes.
    #[error("wanted {wanted} bytes but the stream only holds {available}")]
    InsufficientData { wanted: usize, available: usize },
    /// The underlying reader failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
