use jsonstream_frame::DEFAULT_DESCRIPTOR_WIDTH;
use jsonstream_resource::{AccessMode, DEFAULT_BUFFER_SIZE};

use crate::json::JsonCodec;

/// Configuration for a document stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Width in bytes of every size descriptor. Must be at least 1 and wide
    /// enough for the largest document that will ever be written.
    pub descriptor_width: usize,
    /// Directions of transfer the session permits.
    pub mode: AccessMode,
    /// Buffer capacity used when the session opens its own file.
    pub buffer_size: usize,
    /// JSON codec used for typed reads and writes and for write validation.
    pub json: JsonCodec,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            descriptor_width: DEFAULT_DESCRIPTOR_WIDTH,
            mode: AccessMode::ReadAndWrite,
            buffer_size: DEFAULT_BUFFER_SIZE,
            json: JsonCodec::default(),
        }
    }
}
