use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::descriptor::{encode_descriptor, parse_descriptor, DEFAULT_DESCRIPTOR_WIDTH};
use crate::error::{FrameError, Result};

/// Largest payload [`DocumentCodec`] accepts unless configured otherwise.
pub const DEFAULT_MAX_DOCUMENT_LEN: usize = 64 * 1024 * 1024;

/// Buffer growth granted ahead of payload bytes that have not arrived yet.
const RESERVE_CHUNK: usize = 8 * 1024;

/// `tokio_util` codec for document streams over non-seekable async sources
/// (pipes, sockets, stdin).
///
/// Applies the same end-of-stream rules as [`read_document`](crate::read_document):
/// running out of data between documents ends the stream cleanly, running out
/// inside a descriptor or payload is corruption, and a zero-length descriptor
/// ends the stream (anything after it is discarded).
///
/// Declared lengths above the configured maximum are rejected with
/// [`FrameError::DocumentTooLarge`] before any payload is buffered.
#[derive(Debug, Clone)]
pub struct DocumentCodec {
    width: usize,
    max_len: usize,
    consumed: u64,
    terminated: bool,
}

impl DocumentCodec {
    pub fn new() -> Self {
        Self::with_width(DEFAULT_DESCRIPTOR_WIDTH)
    }

    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            max_len: DEFAULT_MAX_DOCUMENT_LEN,
            consumed: 0,
            terminated: false,
        }
    }

    /// Set the largest payload the decoder accepts.
    pub fn with_max_document_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn descriptor_width(&self) -> usize {
        self.width
    }

    pub fn max_document_len(&self) -> usize {
        self.max_len
    }

    /// Stream offset of the next undecoded document.
    pub fn offset(&self) -> u64 {
        self.consumed
    }

    fn declared_len(&self, src: &BytesMut) -> Result<usize> {
        let len = parse_descriptor(&src[..self.width])
            .map_err(|source| FrameError::InvalidSizeDescriptor { source })?;
        if len > self.max_len {
            return Err(FrameError::DocumentTooLarge {
                len,
                max: self.max_len,
            });
        }
        Ok(len)
    }
}

impl Default for DocumentCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for DocumentCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if self.terminated {
            src.clear();
            return Ok(None);
        }
        if src.len() < self.width {
            return Ok(None);
        }

        let len = self.declared_len(src)?;
        if len == 0 {
            trace!(offset = self.consumed, "zero-length descriptor ends document stream");
            self.terminated = true;
            src.clear();
            return Ok(None);
        }

        let total = self
            .width
            .checked_add(len)
            .ok_or(FrameError::DocumentTooLarge {
                len,
                max: self.max_len,
            })?;
        if src.len() < total {
            src.reserve((total - src.len()).min(RESERVE_CHUNK));
            return Ok(None);
        }

        src.advance(self.width);
        let payload = src.split_to(len).freeze();
        self.consumed += total as u64;
        Ok(Some(payload))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(payload) = self.decode(src)? {
            return Ok(Some(payload));
        }
        if src.is_empty() {
            return Ok(None);
        }
        if src.len() < self.width {
            return Err(FrameError::SizeDescriptorMismatch {
                expected: self.width,
                actual: src.len(),
            });
        }

        let expected = self.declared_len(src)?;
        Err(FrameError::MalformedDocument {
            position: self.consumed + self.width as u64,
            expected,
            actual: src.len() - self.width,
        })
    }
}

impl Encoder<&[u8]> for DocumentCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
        if payload.is_empty() {
            return Err(FrameError::EmptyDocument);
        }
        encode_descriptor(payload.len(), self.width, dst)?;
        dst.extend_from_slice(payload);
        Ok(())
    }
}

impl Encoder<Bytes> for DocumentCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&[u8]>::encode(self, payload.as_ref(), dst)
    }
}
