use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::trace;

use crate::descriptor::{decode_descriptor, DEFAULT_DESCRIPTOR_WIDTH};
use crate::error::{FrameError, Result};

const INITIAL_PAYLOAD_CAPACITY: usize = 8 * 1024;

/// One framed document as read from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Byte offset of the document's size descriptor.
    pub offset: u64,
    /// Width of the size descriptor that preceded the payload.
    pub descriptor_width: usize,
    /// The document payload.
    pub payload: Bytes,
}

impl Document {
    /// The total wire size of this document (descriptor + payload).
    pub fn wire_size(&self) -> usize {
        self.descriptor_width + self.payload.len()
    }

    /// Offset of the first byte after this document.
    pub fn end_offset(&self) -> u64 {
        self.offset + self.wire_size() as u64
    }
}

/// Read the next framed document from `src`.
///
/// `offset` is the current position of `src` and is only used to label the
/// returned document and any malformed-document error. Returns `Ok(None)` on
/// a clean end of stream, leaving `src` where it was.
///
/// A descriptor declaring zero bytes also ends the stream. Its bytes have
/// been consumed from `src` when `Ok(None)` is returned for it.
///
/// Reads exactly descriptor + payload bytes and never reads ahead, so a
/// seekable source is left positioned at the next document.
pub fn read_document<R: Read + ?Sized>(
    src: &mut R,
    width: usize,
    offset: u64,
) -> Result<Option<Document>> {
    match read_next(src, width, offset)? {
        Next::Document(document) => Ok(Some(document)),
        Next::End | Next::Terminator => Ok(None),
    }
}

enum Next {
    Document(Document),
    /// No bytes left where a descriptor was expected.
    End,
    /// A full descriptor declaring a zero-length document.
    Terminator,
}

fn read_next<R: Read + ?Sized>(src: &mut R, width: usize, offset: u64) -> Result<Next> {
    let mut header = vec![0u8; width];
    let filled = read_up_to(src, &mut header)?;

    let len = match decode_descriptor(&header[..filled], width)? {
        None => {
            trace!(offset, "end of document stream");
            return Ok(Next::End);
        }
        Some(0) => {
            trace!(offset, "zero-length descriptor ends document stream");
            return Ok(Next::Terminator);
        }
        Some(len) => len,
    };

    let payload_start = offset + width as u64;
    let mut payload = Vec::with_capacity(len.min(INITIAL_PAYLOAD_CAPACITY));
    let read = read_exact_or_eof(src, len, &mut payload)?;
    if read < len {
        return Err(FrameError::MalformedDocument {
            position: payload_start,
            expected: len,
            actual: read,
        });
    }

    trace!(offset, len, "read document");
    Ok(Next::Document(Document {
        offset,
        descriptor_width: width,
        payload: Bytes::from(payload),
    }))
}

/// Fill `buf` from `src`, stopping early only at end of data.
fn read_up_to<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(filled)
}

/// Append up to `len` bytes to `dst`, growing it as data actually arrives so
/// a corrupt declared length cannot force a huge allocation up front.
fn read_exact_or_eof<R: Read + ?Sized>(src: &mut R, len: usize, dst: &mut Vec<u8>) -> Result<usize> {
    let mut limited = Read::take(&mut *src, len as u64);
    let read = limited.read_to_end(dst)?;
    Ok(read)
}

/// Reads framed documents sequentially from any `Read` source.
///
/// Tracks its own byte offset from the point it was created. Suited to
/// non-seekable sources such as pipes or stdin.
pub struct DocumentReader<T> {
    inner: T,
    width: usize,
    offset: u64,
    terminated: bool,
}

impl<T: Read> DocumentReader<T> {
    /// Create a reader using the default descriptor width.
    pub fn new(inner: T) -> Self {
        Self::with_width(inner, DEFAULT_DESCRIPTOR_WIDTH)
    }

    /// Create a reader using an explicit descriptor width.
    pub fn with_width(inner: T, width: usize) -> Self {
        Self {
            inner,
            width,
            offset: 0,
            terminated: false,
        }
    }

    /// Read the next document, or `None` at a clean end of stream.
    ///
    /// Once a zero-length descriptor has been seen the source is not read
    /// again and every later call returns `None`.
    pub fn read_document(&mut self) -> Result<Option<Document>> {
        if self.terminated {
            return Ok(None);
        }
        match read_next(&mut self.inner, self.width, self.offset)? {
            Next::Document(document) => {
                self.offset = document.end_offset();
                Ok(Some(document))
            }
            Next::End => Ok(None),
            Next::Terminator => {
                self.terminated = true;
                Ok(None)
            }
        }
    }

    /// Byte offset of the next document.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn descriptor_width(&self) -> usize {
        self.width
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Iterator for DocumentReader<T> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_document().transpose()
    }
}
