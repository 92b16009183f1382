//! Error types for all finbot crates.

/// Errors surfaced by one chat request.
///
/// Every variant ends up inside a failed [`ChatOutcome`](crate::ChatOutcome);
/// none of them escape `send_message`.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The server answered with a non-success status. The body is not read.
    #[error("HTTP error, status: {status}")]
    Http {
        /// Numeric HTTP status code.
        status: u16,
    },
    /// Network-level failure while sending or while reading the body.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// An unterminated stream line grew past the buffer cap.
    #[error("stream line exceeds {limit} bytes without a newline")]
    LineTooLong {
        /// Cap in bytes.
        limit: usize,
    },
    /// The stream carried an explicit error frame.
    #[error("{0}")]
    Remote(String),
    /// The outgoing message was rejected before sending.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    /// Client configuration is unusable (bad URL, missing credential).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Reading or writing session state failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ChatError {
    /// Whether a caller could reasonably retry the same request.
    ///
    /// The consumer itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// HTTP status code for transport failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }
}

/// Why a prefixed stream line could not be turned into an [`Event`](crate::Event).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The payload after the prefix is not valid JSON.
    #[error("malformed JSON in frame: {0}")]
    MalformedJson(String),
    /// The payload is valid JSON but not an object.
    #[error("frame payload is not a JSON object")]
    NotAnObject,
    /// The object carries neither `type` nor `error`.
    #[error("frame has no `type` discriminator")]
    MissingType,
    /// The `type` discriminator names no known event.
    #[error("unknown frame type: {0}")]
    UnknownType(String),
    /// A known event type lacks one of its required fields.
    #[error("`{kind}` frame is missing field `{field}`")]
    MissingField {
        /// The event type being decoded.
        kind: &'static str,
        /// The absent field.
        field: &'static str,
    },
}

/// Errors from key-value store operations.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Serialization or deserialization of a stored value failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Reading from the backend failed.
    #[error("read failed: {0}")]
    ReadFailed(String),
    /// Writing to the backend failed.
    #[error("write failed: {0}")]
    WriteFailed(String),
    /// Any other storage error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
