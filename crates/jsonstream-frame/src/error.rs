/// Errors that can occur during document framing.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer descriptor bytes were available than the descriptor width.
    #[error(
        "the expected size descriptor length {expected} is different from the read length {actual}"
    )]
    SizeDescriptorMismatch { expected: usize, actual: usize },

    /// The descriptor had the right width but did not hold a decimal length.
    #[error("error interpreting document size: {source}")]
    InvalidSizeDescriptor {
        #[source]
        source: DescriptorParseError,
    },

    /// The payload ended before its declared length.
    #[error("can't read all bytes of the json document at position {position} (expected {expected}, read {actual})")]
    MalformedDocument {
        position: u64,
        expected: usize,
        actual: usize,
    },

    /// A descriptor declared more bytes than the decoder accepts.
    #[error("declared document size {len} exceeds the maximum of {max} bytes")]
    DocumentTooLarge { len: usize, max: usize },

    /// The payload length has more decimal digits than the descriptor width.
    #[error("document of {len} bytes does not fit a {width}-byte size descriptor")]
    DescriptorOverflow { len: usize, width: usize },

    /// A document must contain at least one byte.
    #[error("document payload is empty")]
    EmptyDocument,

    /// An I/O error occurred while reading or writing documents.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Expected and actually-read descriptor byte counts.
    ///
    /// Unparseable descriptors report `(0, 0)`: the byte count was not the
    /// problem. Errors unrelated to descriptors return `None`.
    pub fn descriptor_counts(&self) -> Option<(usize, usize)> {
        match self {
            Self::SizeDescriptorMismatch { expected, actual } => Some((*expected, *actual)),
            Self::InvalidSizeDescriptor { .. } => Some((0, 0)),
            _ => None,
        }
    }

    /// Whether this error means the stream content itself is corrupt.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::SizeDescriptorMismatch { .. }
                | Self::InvalidSizeDescriptor { .. }
                | Self::MalformedDocument { .. }
                | Self::DocumentTooLarge { .. }
        )
    }
}

/// Why a full-width size descriptor could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorParseError {
    /// The descriptor held only padding.
    #[error("size descriptor holds no digits")]
    Blank,

    /// A byte other than an ASCII digit (or leading space padding).
    #[error("byte {byte:#04x} at index {index} is not a decimal digit")]
    NonDigit { index: usize, byte: u8 },

    /// The declared length does not fit the platform's address space.
    #[error("declared document size overflows")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, FrameError>;
