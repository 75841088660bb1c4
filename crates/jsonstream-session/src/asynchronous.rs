use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::session::{JsonStream, ASYNC_ON_OPTIMIZED};

/// Async front end over a [`JsonStream`].
///
/// Each operation runs the blocking transfer on tokio's blocking pool, under
/// the same session lock as the synchronous API. Cloning is cheap and every
/// clone drives the same session.
///
/// Sessions opened with [`JsonStream::open`] cannot be converted; only
/// caller-supplied resources have an async front end.
pub struct AsyncJsonStream<S> {
    inner: Arc<JsonStream<S>>,
}

impl<S> Clone for AsyncJsonStream<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> JsonStream<S> {
    /// Hand this session to an async front end.
    ///
    /// Fails with [`StreamError::Forbidden`] for sessions that opened their
    /// own file; the session is released in that case.
    pub fn into_async(self) -> Result<AsyncJsonStream<S>> {
        if self.is_optimized() {
            return Err(StreamError::Forbidden(ASYNC_ON_OPTIMIZED.to_string()));
        }
        debug!(mode = %self.mode(), "document stream session moved to async front end");
        Ok(AsyncJsonStream {
            inner: Arc::new(self),
        })
    }
}

impl<S> AsyncJsonStream<S>
where
    S: Read + Write + Seek + Send + 'static,
{
    /// Wrap a caller-supplied resource with default configuration.
    pub fn new(resource: S) -> Result<Self> {
        Self::with_config(resource, StreamConfig::default())
    }

    /// Wrap a caller-supplied resource with explicit configuration.
    pub fn with_config(resource: S, config: StreamConfig) -> Result<Self> {
        JsonStream::with_config(resource, config)?.into_async()
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&JsonStream<S>) -> Result<T> + Send + 'static,
    {
        let session = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&session)).await?
    }

    pub async fn read_bytes(&self) -> Result<Option<Bytes>> {
        self.inner.ensure_readable()?;
        self.run(|session| session.read_bytes()).await
    }

    pub async fn read_string(&self) -> Result<Option<String>> {
        self.inner.ensure_readable()?;
        self.run(|session| session.read_string()).await
    }

    pub async fn read_object<T>(&self) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.inner.ensure_readable()?;
        self.run(|session| session.read_object::<T>()).await
    }

    pub async fn read_value(&self) -> Result<Option<Value>> {
        self.read_object().await
    }

    pub async fn read_json_object(&self) -> Result<Option<Map<String, Value>>> {
        self.read_object().await
    }

    pub async fn read_array(&self) -> Result<Option<Vec<Value>>> {
        self.read_object().await
    }

    pub async fn write_bytes(&self, bytes: &[u8], validate: bool) -> Result<()> {
        self.inner.ensure_writable()?;
        let payload = bytes.to_vec();
        self.run(move |session| session.write_bytes(&payload, validate))
            .await
    }

    pub async fn write_string(&self, text: &str, validate: bool) -> Result<()> {
        self.write_bytes(text.as_bytes(), validate).await
    }

    /// Serialize `value` on the calling task, then append it.
    pub async fn write_object<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.inner.ensure_writable()?;
        let text = self.inner.json_codec().encode(value)?;
        self.write_bytes(&text, false).await
    }

    pub async fn write_value(&self, value: &Value) -> Result<()> {
        self.write_object(value).await
    }

    pub async fn write_json_object(&self, object: &Map<String, Value>) -> Result<()> {
        self.write_object(object).await
    }

    pub async fn write_array(&self, items: &[Value]) -> Result<()> {
        self.write_object(items).await
    }

    pub async fn flush(&self) -> Result<()> {
        self.run(|session| session.flush()).await
    }

    pub async fn position(&self) -> Result<u64> {
        self.run(|session| session.position()).await
    }

    pub async fn seek(&self, pos: SeekFrom) -> Result<u64> {
        self.run(move |session| session.seek(pos)).await
    }

    pub async fn rewind(&self) -> Result<()> {
        self.run(|session| session.rewind()).await
    }

    /// Flush and release the resource. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        self.run(|session| session.close()).await
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn config(&self) -> &StreamConfig {
        self.inner.config()
    }
}

impl<S> std::fmt::Debug for AsyncJsonStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AsyncJsonStream").field(&self.inner).finish()
    }
}
