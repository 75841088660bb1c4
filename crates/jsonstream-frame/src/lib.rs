//! Fixed-width size-descriptor framing for JSON document streams.
//!
//! This is the core value-add layer of jsonstream. Every document is framed as:
//! - A size descriptor: exactly `width` ASCII bytes of left-zero-padded
//!   decimal digits holding the payload length
//! - The payload: the raw UTF-8 bytes of one JSON document
//!
//! There is no separator, checksum or trailer. A zero-byte read where a
//! descriptor was expected is the only clean end of stream; anything shorter
//! than declared is corruption.

#[cfg(feature = "async")]
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use codec::{DocumentCodec, DEFAULT_MAX_DOCUMENT_LEN};
pub use descriptor::{
    decode_descriptor, encode_descriptor, max_document_len, parse_descriptor,
    DEFAULT_DESCRIPTOR_WIDTH,
};
pub use error::{DescriptorParseError, FrameError, Result};
pub use reader::{read_document, Document, DocumentReader};
pub use writer::{write_document, DocumentWriter};
