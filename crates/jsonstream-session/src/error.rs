/// Errors that can occur in document stream sessions.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// A caller-supplied argument violates a precondition. Nothing was transferred.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    /// The operation is not permitted for this session.
    #[error("forbidden operation: {0}")]
    Forbidden(String),

    /// Framing-level error (descriptor mismatch, malformed document, I/O).
    #[error("frame error: {0}")]
    Frame(#[from] jsonstream_frame::FrameError),

    /// The underlying resource could not be acquired.
    #[error("resource error: {0}")]
    Resource(#[from] jsonstream_resource::ResourceError),

    /// JSON serialization/deserialization error, surfaced as produced by the codec.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document payload is not valid UTF-8 text.
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The session was closed.
    #[error("session closed")]
    Closed,

    /// A thread panicked while holding the session lock.
    #[error("session lock poisoned")]
    Poisoned,

    /// An I/O error outside of document transfer (seek, flush).
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running an async operation failed.
    #[cfg(feature = "async")]
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StreamError {
    /// Whether the stream content was found to be corrupt.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Frame(err) if err.is_corruption())
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
