//! Byte resources that back a JSON document stream.
//!
//! A document stream can sit on top of any `Read + Write + Seek` value the
//! caller already owns. This crate provides the other option: a file opened
//! directly from a path, buffered and hinted according to the [`AccessMode`]
//! it is opened in.
//!
//! This is the lowest layer of jsonstream. Everything else builds on top of
//! the [`FileResource`] and [`AccessMode`] types provided here.

pub mod error;
pub mod file;
pub mod mode;

pub use error::{ResourceError, Result};
pub use file::{FileResource, DEFAULT_BUFFER_SIZE};
pub use mode::AccessMode;
