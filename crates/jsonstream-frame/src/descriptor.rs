use bytes::{BufMut, BytesMut};

use crate::error::{DescriptorParseError, FrameError, Result};

/// Default size descriptor width: 8 bytes (documents up to 99,999,999 bytes).
pub const DEFAULT_DESCRIPTOR_WIDTH: usize = 8;

/// Largest payload length a descriptor of `width` bytes can express.
pub fn max_document_len(width: usize) -> u64 {
    u32::try_from(width)
        .ok()
        .and_then(|w| 10u64.checked_pow(w))
        .map_or(u64::MAX, |limit| limit - 1)
}

/// Encode a payload length as a size descriptor.
///
/// Wire format for `len = 7`, `width = 8`:
/// ```text
/// ┌───┬───┬───┬───┬───┬───┬───┬───┐
/// │ 0 │ 0 │ 0 │ 0 │ 0 │ 0 │ 0 │ 7 │   ASCII, left-zero-padded
/// └───┴───┴───┴───┴───┴───┴───┴───┘
/// ```
///
/// Fails with [`FrameError::DescriptorOverflow`] when `len` needs more than
/// `width` digits. That is a configuration fault of the caller, not stream
/// corruption.
pub fn encode_descriptor(len: usize, width: usize, dst: &mut BytesMut) -> Result<()> {
    let digits = len.to_string();
    if width == 0 || digits.len() > width {
        return Err(FrameError::DescriptorOverflow { len, width });
    }
    dst.reserve(width);
    dst.put_bytes(b'0', width - digits.len());
    dst.put_slice(digits.as_bytes());
    Ok(())
}

/// Interpret the bytes actually read where a descriptor was expected.
///
/// - no bytes at all: clean end of stream, `Ok(None)`
/// - some, but fewer than `width`: [`FrameError::SizeDescriptorMismatch`]
/// - `width` bytes that are not a decimal length: [`FrameError::InvalidSizeDescriptor`]
pub fn decode_descriptor(src: &[u8], width: usize) -> Result<Option<usize>> {
    if src.is_empty() {
        return Ok(None);
    }
    if src.len() < width {
        return Err(FrameError::SizeDescriptorMismatch {
            expected: width,
            actual: src.len(),
        });
    }

    parse_descriptor(&src[..width])
        .map(Some)
        .map_err(|source| FrameError::InvalidSizeDescriptor { source })
}

/// Parse a full-width descriptor into a payload length.
///
/// Leading spaces are accepted as padding so that space-padded writers stay
/// readable; signs, trailing padding and any other byte are rejected.
pub fn parse_descriptor(src: &[u8]) -> std::result::Result<usize, DescriptorParseError> {
    let start = src.iter().take_while(|b| **b == b' ').count();
    if start == src.len() {
        return Err(DescriptorParseError::Blank);
    }

    let mut value: usize = 0;
    for (index, &byte) in src.iter().enumerate().skip(start) {
        if !byte.is_ascii_digit() {
            return Err(DescriptorParseError::NonDigit { index, byte });
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(byte - b'0')))
            .ok_or(DescriptorParseError::Overflow)?;
    }
    Ok(value)
}
