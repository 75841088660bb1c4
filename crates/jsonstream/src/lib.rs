//! Length-prefixed JSON document streams.
//!
//! jsonstream stores a sequence of JSON documents in one byte stream, each
//! preceded by a fixed-width ASCII decimal size descriptor, and reads them
//! back one whole document at a time.
//!
//! # Crate Structure
//!
//! - [`resource`]: access modes and the buffered file resource
//! - [`frame`]: size-descriptor codec and framed document read/write
//! - [`session`]: document stream sessions, typed JSON access, errors

/// Re-export resource types.
pub mod resource {
    pub use jsonstream_resource::*;
}

/// Re-export frame types.
pub mod frame {
    pub use jsonstream_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use jsonstream_session::*;
}

#[cfg(feature = "async")]
pub use jsonstream_session::AsyncJsonStream;
pub use jsonstream_session::{
    AccessMode, JsonCodec, JsonStream, Result, StreamConfig, StreamError,
    DEFAULT_DESCRIPTOR_WIDTH,
};
