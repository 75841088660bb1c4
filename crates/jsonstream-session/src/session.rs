use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use jsonstream_frame::{read_document, write_document};
use jsonstream_resource::{AccessMode, FileResource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::json::JsonCodec;

pub(crate) const READ_IN_WRITE_ONLY: &str = "Can't read in WriteOnly mode";
pub(crate) const WRITE_IN_READ_ONLY: &str = "Can't write in ReadOnly mode";
#[cfg(feature = "async")]
pub(crate) const ASYNC_ON_OPTIMIZED: &str =
    "Do not call any async method when using optimized constructor";

/// A session reading and writing framed JSON documents on one byte resource.
///
/// The session owns the resource and its cursor for its whole lifetime.
/// Every document transfer runs under a session-wide lock, so a `JsonStream`
/// shared between threads (e.g. in an `Arc`) never interleaves two documents
/// at the byte level.
///
/// Reads return `Ok(None)` once the stream ends cleanly; the end of stream
/// is not an error and can be observed any number of times.
pub struct JsonStream<S> {
    state: Mutex<SessionState<S>>,
    config: StreamConfig,
    optimized: bool,
}

struct SessionState<S> {
    resource: Option<S>,
    cursor: u64,
}

impl JsonStream<FileResource> {
    /// Open the file at `path` directly, buffered for `mode`.
    ///
    /// Sessions created this way cannot be driven asynchronously.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> Result<Self> {
        Self::open_with_config(
            path,
            StreamConfig {
                mode,
                ..StreamConfig::default()
            },
        )
    }

    /// Open the file at `path` with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: StreamConfig) -> Result<Self> {
        validate_config(&config)?;
        let resource = FileResource::open(path, config.mode, config.buffer_size)?;
        Self::build(resource, config, true)
    }
}

impl<S: Read + Write + Seek> JsonStream<S> {
    /// Wrap a caller-supplied resource with default configuration.
    ///
    /// The session starts at the resource's current position.
    pub fn new(resource: S) -> Result<Self> {
        Self::with_config(resource, StreamConfig::default())
    }

    /// Wrap a caller-supplied resource with explicit configuration.
    pub fn with_config(resource: S, config: StreamConfig) -> Result<Self> {
        validate_config(&config)?;
        Self::build(resource, config, false)
    }

    fn build(mut resource: S, config: StreamConfig, optimized: bool) -> Result<Self> {
        let cursor = resource.stream_position()?;
        debug!(
            mode = %config.mode,
            descriptor_width = config.descriptor_width,
            optimized,
            cursor,
            "document stream session created"
        );
        Ok(Self {
            state: Mutex::new(SessionState {
                resource: Some(resource),
                cursor,
            }),
            config,
            optimized,
        })
    }

    /// Read the next document's raw payload.
    pub fn read_bytes(&self) -> Result<Option<Bytes>> {
        self.ensure_readable()?;
        let mut state = self.lock()?;
        state.read_next(self.config.descriptor_width)
    }

    /// Read the next document as UTF-8 text.
    pub fn read_string(&self) -> Result<Option<String>> {
        let Some(payload) = self.read_bytes()? else {
            return Ok(None);
        };
        Ok(Some(String::from_utf8(payload.to_vec())?))
    }

    /// Read the next document and deserialize it into `T`.
    ///
    /// The codec is never invoked once the stream has ended.
    pub fn read_object<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(text) = self.read_string()? else {
            return Ok(None);
        };
        Ok(Some(self.config.json.decode(text.as_bytes())?))
    }

    /// Read the next document as an untyped JSON value.
    pub fn read_value(&self) -> Result<Option<Value>> {
        self.read_object()
    }

    /// Read the next document, which must be a JSON object.
    pub fn read_json_object(&self) -> Result<Option<Map<String, Value>>> {
        self.read_object()
    }

    /// Read the next document, which must be a JSON array.
    pub fn read_array(&self) -> Result<Option<Vec<Value>>> {
        self.read_object()
    }

    /// Append one document.
    ///
    /// With `validate` set the payload must parse as exactly one JSON value;
    /// the codec's error is returned unchanged and nothing is written
    /// otherwise.
    pub fn write_bytes(&self, bytes: &[u8], validate: bool) -> Result<()> {
        self.ensure_writable()?;
        if bytes.is_empty() {
            return Err(StreamError::InvalidArgument {
                name: "bytes",
                reason: "a document must contain at least one byte",
            });
        }
        if validate {
            self.config.json.validate(bytes)?;
        }

        let mut state = self.lock()?;
        state.append(bytes, self.config.descriptor_width)
    }

    /// Append one document given as text.
    pub fn write_string(&self, text: &str, validate: bool) -> Result<()> {
        self.ensure_writable()?;
        self.write_bytes(text.as_bytes(), validate)
    }

    /// Serialize `value` with the session codec and append it.
    pub fn write_object<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.ensure_writable()?;
        let text = self.config.json.encode(value)?;
        self.write_bytes(&text, false)
    }

    pub fn write_value(&self, value: &Value) -> Result<()> {
        self.write_object(value)
    }

    pub fn write_json_object(&self, object: &Map<String, Value>) -> Result<()> {
        self.write_object(object)
    }

    pub fn write_array(&self, items: &[Value]) -> Result<()> {
        self.write_object(items)
    }

    /// Iterate raw payloads from the cursor until the stream ends.
    ///
    /// The iterator stops after the first error.
    pub fn documents(&self) -> Documents<'_, S> {
        Documents {
            stream: self,
            done: false,
        }
    }

    /// Force buffered writes down to the underlying resource.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.resource()?.flush()?;
        Ok(())
    }

    /// Current cursor position in the underlying resource.
    pub fn position(&self) -> Result<u64> {
        let mut state = self.lock()?;
        state.resource()?;
        Ok(state.cursor)
    }

    /// Reposition the cursor, e.g. to re-read documents already written.
    pub fn seek(&self, pos: SeekFrom) -> Result<u64> {
        let mut state = self.lock()?;
        let cursor = state.resource()?.seek(pos)?;
        state.cursor = cursor;
        debug!(cursor, "document stream repositioned");
        Ok(cursor)
    }

    /// Move the cursor back to the start of the resource.
    pub fn rewind(&self) -> Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Flush and release the underlying resource.
    ///
    /// Closing twice is a no-op. Every other operation fails with
    /// [`StreamError::Closed`] afterwards. The resource is released even when
    /// the final flush fails.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(mut resource) = state.resource.take() else {
            return Ok(());
        };
        let flushed = resource.flush();
        drop(resource);
        debug!(cursor = state.cursor, "document stream session closed");
        flushed.map_err(StreamError::from)
    }
}

impl<S> JsonStream<S> {
    pub fn mode(&self) -> AccessMode {
        self.config.mode
    }

    pub fn descriptor_width(&self) -> usize {
        self.config.descriptor_width
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn json_codec(&self) -> &JsonCodec {
        &self.config.json
    }

    /// Whether the session opened its own file (and so refuses async use).
    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    pub fn is_closed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resource
            .is_none()
    }

    /// Consume the session and return the resource without flushing it.
    ///
    /// Returns `None` if the session was already closed.
    pub fn into_inner(self) -> Option<S> {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .resource
    }

    pub(crate) fn ensure_readable(&self) -> Result<()> {
        if self.config.mode.can_read() {
            Ok(())
        } else {
            Err(StreamError::Forbidden(READ_IN_WRITE_ONLY.to_string()))
        }
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.config.mode.can_write() {
            Ok(())
        } else {
            Err(StreamError::Forbidden(WRITE_IN_READ_ONLY.to_string()))
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState<S>>> {
        self.state.lock().map_err(|_| StreamError::Poisoned)
    }
}

impl<S> std::fmt::Debug for JsonStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStream")
            .field("mode", &self.config.mode)
            .field("descriptor_width", &self.config.descriptor_width)
            .field("optimized", &self.optimized)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<S: Read + Write + Seek> SessionState<S> {
    fn resource(&mut self) -> Result<&mut S> {
        self.resource.as_mut().ok_or(StreamError::Closed)
    }

    fn read_next(&mut self, width: usize) -> Result<Option<Bytes>> {
        let offset = self.cursor;
        let resource = self.resource()?;
        match read_document(resource, width, offset) {
            Ok(Some(document)) => {
                self.cursor = document.end_offset();
                Ok(Some(document.payload))
            }
            Ok(None) => {
                // A zero-length descriptor may have been consumed; park on it.
                let resource = self.resource()?;
                if resource.stream_position()? != offset {
                    resource.seek(SeekFrom::Start(offset))?;
                }
                Ok(None)
            }
            Err(err) => {
                self.resync();
                Err(err.into())
            }
        }
    }

    fn append(&mut self, payload: &[u8], width: usize) -> Result<()> {
        let offset = self.cursor;
        let resource = self.resource()?;
        match write_document(resource, payload, width) {
            Ok(written) => {
                self.cursor = offset + written as u64;
                trace!(offset, len = payload.len(), "appended document");
                Ok(())
            }
            Err(err) => {
                self.resync();
                Err(err.into())
            }
        }
    }

    /// After a failed transfer the resource may have moved part-way; trust
    /// its own position over our bookkeeping.
    fn resync(&mut self) {
        if let Some(resource) = self.resource.as_mut() {
            if let Ok(position) = resource.stream_position() {
                self.cursor = position;
            }
        }
    }
}

/// Iterator over the raw payloads of a session. See [`JsonStream::documents`].
pub struct Documents<'a, S> {
    stream: &'a JsonStream<S>,
    done: bool,
}

impl<S: Read + Write + Seek> Iterator for Documents<'_, S> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.stream.read_bytes().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

fn validate_config(config: &StreamConfig) -> Result<()> {
    if config.descriptor_width < 1 {
        return Err(StreamError::InvalidArgument {
            name: "descriptor_width",
            reason: "reserve at least one byte for the document size",
        });
    }
    Ok(())
}
