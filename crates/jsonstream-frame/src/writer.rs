use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::descriptor::{encode_descriptor, DEFAULT_DESCRIPTOR_WIDTH};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Frame `payload` and write it to `dst` as one contiguous append.
///
/// The descriptor is encoded before anything is written, so an oversized or
/// empty payload leaves `dst` untouched. Returns the number of bytes written
/// (descriptor + payload). Does not flush.
pub fn write_document<W: Write + ?Sized>(dst: &mut W, payload: &[u8], width: usize) -> Result<usize> {
    let mut buf = BytesMut::with_capacity(width + payload.len());
    frame_into(payload, width, &mut buf)?;
    write_all(dst, &buf)?;
    trace!(len = payload.len(), "wrote document");
    Ok(buf.len())
}

fn frame_into(payload: &[u8], width: usize, buf: &mut BytesMut) -> Result<()> {
    if payload.is_empty() {
        return Err(FrameError::EmptyDocument);
    }
    encode_descriptor(payload.len(), width, buf)?;
    buf.extend_from_slice(payload);
    Ok(())
}

fn write_all<W: Write + ?Sized>(dst: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match dst.write(&buf[offset..]) {
            Ok(0) => return Err(FrameError::Io(std::io::Error::from(ErrorKind::WriteZero))),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Writes framed documents sequentially to any `Write` sink.
pub struct DocumentWriter<T> {
    inner: T,
    buf: BytesMut,
    width: usize,
    offset: u64,
}

impl<T: Write> DocumentWriter<T> {
    /// Create a writer using the default descriptor width.
    pub fn new(inner: T) -> Self {
        Self::with_width(inner, DEFAULT_DESCRIPTOR_WIDTH)
    }

    /// Create a writer using an explicit descriptor width.
    pub fn with_width(inner: T, width: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            width,
            offset: 0,
        }
    }

    /// Frame and write one document. Returns the offset it was written at.
    pub fn write_document(&mut self, payload: &[u8]) -> Result<u64> {
        self.buf.clear();
        frame_into(payload, self.width, &mut self.buf)?;
        write_all(&mut self.inner, &self.buf)?;

        let at = self.offset;
        self.offset += self.buf.len() as u64;
        Ok(at)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Bytes written through this writer so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::reader::DocumentReader;

    #[test]
    fn write_single_document() {
        let mut wire = Vec::new();
        let written = write_document(&mut wire, b"{\"a\":1}", 8).unwrap();

        assert_eq!(written, 15);
        assert_eq!(wire, b"00000007{\"a\":1}");
    }

    #[test]
    fn empty_payload_writes_nothing() {
        let mut wire = Vec::new();
        let err = write_document(&mut wire, b"", 8).unwrap_err();
        assert!(matches!(err, FrameError::EmptyDocument));
        assert!(wire.is_empty());
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let mut wire = Vec::new();
        let err = write_document(&mut wire, b"[1,2,3,4,5]", 1).unwrap_err();
        assert!(matches!(
            err,
            FrameError::DescriptorOverflow { len: 11, width: 1 }
        ));
        assert!(wire.is_empty());
    }

    #[test]
    fn writer_tracks_offsets() {
        let mut writer = DocumentWriter::with_width(Vec::new(), 4);

        assert_eq!(writer.write_document(b"[]").unwrap(), 0);
        assert_eq!(writer.write_document(b"{}").unwrap(), 6);
        assert_eq!(writer.offset(), 12);
        assert_eq!(writer.into_inner(), b"0002[]0002{}");
    }

    #[test]
    fn written_documents_read_back() {
        let mut writer = DocumentWriter::new(Cursor::new(Vec::new()));
        writer.write_document(b"\"one\"").unwrap();
        writer.write_document(b"[2]").unwrap();
        writer.flush().unwrap();

        let wire = writer.into_inner().into_inner();
        let mut reader = DocumentReader::new(Cursor::new(wire));
        assert_eq!(
            reader.read_document().unwrap().unwrap().payload.as_ref(),
            b"\"one\""
        );
        assert_eq!(reader.read_document().unwrap().unwrap().payload.as_ref(), b"[2]");
        assert!(reader.read_document().unwrap().is_none());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = DocumentWriter::new(sink);

        writer.write_document(b"1").unwrap();
        assert!(!flag.load(Ordering::SeqCst));
        writer.flush().unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_and_partial_writes() {
        let sink = ChoppyWriter {
            interrupted: false,
            data: Vec::new(),
        };
        let mut writer = DocumentWriter::new(sink);
        writer.write_document(b"{\"k\":\"v\"}").unwrap();

        assert_eq!(writer.get_ref().data, b"00000009{\"k\":\"v\"}");
    }

    #[test]
    fn zero_write_is_an_error() {
        let mut writer = DocumentWriter::new(ZeroWriter);
        let err = writer.write_document(b"1").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
        assert_eq!(writer.offset(), 0);
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Interrupts once, then accepts at most three bytes per call.
    struct ChoppyWriter {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for ChoppyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(3);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
