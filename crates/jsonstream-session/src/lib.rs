//! Document stream sessions over a byte resource.
//!
//! This is the "just works" layer. Open a file or wrap any
//! `Read + Write + Seek` value, then read and write whole JSON documents
//! as bytes, text, untyped values or serde types. Sessions enforce their
//! [`AccessMode`], serialize concurrent callers, and report corruption with
//! the byte counts and positions involved.
//!
//! ```no_run
//! use jsonstream_session::{AccessMode, JsonStream};
//!
//! # fn main() -> jsonstream_session::Result<()> {
//! let stream = JsonStream::open("events.jsonstream", AccessMode::WriteOnly)?;
//! stream.write_string(r#"{"kind":"started"}"#, true)?;
//! stream.close()?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "async")]
pub mod asynchronous;
pub mod config;
pub mod error;
pub mod json;
pub mod session;

#[cfg(feature = "async")]
pub use asynchronous::AsyncJsonStream;
pub use config::StreamConfig;
pub use error::{Result, StreamError};
pub use json::JsonCodec;
pub use session::{Documents, JsonStream};

pub use jsonstream_frame::{FrameError, DEFAULT_DESCRIPTOR_WIDTH};
pub use jsonstream_resource::{AccessMode, FileResource, ResourceError, DEFAULT_BUFFER_SIZE};
