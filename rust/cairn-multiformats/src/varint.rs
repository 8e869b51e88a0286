//! Unsigned variable-length integers.
//!
//! Seven data bits per byte, least significant group first, with the high bit
//! set on every byte except the last (unsigned LEB128). Values are `u64`, so a
//! negative input is unrepresentable rather than a runtime error.

use std::io::Cursor;

use crate::error::VarintError;

/// The longest encoding of a `u64`.
pub const MAX_VARINT_LENGTH: usize = 10;

/// Encode `value` into a fresh buffer.
pub fn encode(value: u64) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(encoding_length(value));
    write(&mut buffer, value);
    buffer
}

/// Append the encoding of `value` to `buffer`, returning the bytes written.
pub fn write(buffer: &mut Vec<u8>, mut value: u64) -> usize {
    let start = buffer.len();
    loop {
        let group = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buffer.push(group);
            return buffer.len() - start;
        }
        buffer.push(group | 0x80);
    }
}

/// Number of bytes [`encode`] produces for `value`.
pub const fn encoding_length(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()) as usize;
    if bits == 0 { 1 } else { bits.div_ceil(7) }
}

/// Decode the varint starting at `offset`.
///
/// Returns the value and the number of bytes it occupied.
///
/// # Errors
///
/// [`VarintError::Truncated`] when the input ends mid-varint, and
/// [`VarintError::Overflow`] when the varint does not terminate within
/// [`MAX_VARINT_LENGTH`] bytes or exceeds 64 bits.
pub fn decode(bytes: &[u8], offset: usize) -> Result<(u64, usize), VarintError> {
    let tail = bytes
        .get(offset..)
        .ok_or(VarintError::Truncated { offset })?;
    let window = &tail[..tail.len().min(MAX_VARINT_LENGTH)];
    let mut cursor = Cursor::new(window);

    match leb128::read::unsigned(&mut cursor) {
        Ok(value) => Ok((value, cursor.position() as usize)),
        Err(leb128::read::Error::Overflow) => Err(VarintError::Overflow { offset }),
        Err(leb128::read::Error::IoError(_)) if window.len() == MAX_VARINT_LENGTH => {
            Err(VarintError::Overflow { offset })
        }
        Err(leb128::read::Error::IoError(_)) => Err(VarintError::Truncated { offset }),
    }
}

/// Decode a leading varint and return it with the remaining bytes.
///
/// # Errors
///
/// Same as [`decode`].
pub fn split(bytes: &[u8]) -> Result<(u64, &[u8]), VarintError> {
    let (value, length) = decode(bytes, 0)?;
    Ok((value, &bytes[length..]))
}
