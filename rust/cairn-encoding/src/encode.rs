use crate::error::EncodingError;
use crate::value::Value;

pub(crate) const MAJOR_UNSIGNED: u8 = 0;
pub(crate) const MAJOR_NEGATIVE: u8 = 1;
pub(crate) const MAJOR_BYTES: u8 = 2;
pub(crate) const MAJOR_TEXT: u8 = 3;
pub(crate) const MAJOR_LIST: u8 = 4;
pub(crate) const MAJOR_MAP: u8 = 5;
pub(crate) const MAJOR_TAG: u8 = 6;
pub(crate) const MAJOR_SIMPLE: u8 = 7;

/// Tag marking a content link.
pub const LINK_TAG: u64 = 42;

const FALSE: u8 = 0xf4;
const TRUE: u8 = 0xf5;
const NULL: u8 = 0xf6;

/// Encode `value` into a fresh buffer.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodingError> {
    let mut buffer = Vec::new();
    encode_into(value, &mut buffer)?;
    Ok(buffer)
}

/// Append the encoding of `value` to `buffer`.
///
/// On error `buffer` may hold a partial encoding.
pub fn encode_into(value: &Value, buffer: &mut Vec<u8>) -> Result<(), EncodingError> {
    match value {
        Value::Integer(integer) => write_integer(buffer, *integer)?,
        Value::Text(text) => {
            write_header(buffer, MAJOR_TEXT, text.len() as u64);
            buffer.extend_from_slice(text.as_bytes());
        }
        Value::Bytes(bytes) => {
            write_header(buffer, MAJOR_BYTES, bytes.len() as u64);
            buffer.extend_from_slice(bytes);
        }
        Value::Bool(false) => buffer.push(FALSE),
        Value::Bool(true) => buffer.push(TRUE),
        Value::Null => buffer.push(NULL),
        Value::List(items) => {
            write_header(buffer, MAJOR_LIST, items.len() as u64);
            for item in items {
                encode_into(item, buffer)?;
            }
        }
        Value::Map(map) => {
            write_header(buffer, MAJOR_MAP, map.len() as u64);
            for (key, value) in map.iter() {
                write_header(buffer, MAJOR_TEXT, key.len() as u64);
                buffer.extend_from_slice(key.as_bytes());
                encode_into(value, buffer)?;
            }
        }
        Value::Link(cid) => {
            // The leading zero is the identity multibase prefix.
            write_header(buffer, MAJOR_TAG, LINK_TAG);
            write_header(buffer, MAJOR_BYTES, cid.as_bytes().len() as u64 + 1);
            buffer.push(0x00);
            buffer.extend_from_slice(cid.as_bytes());
        }
    }
    Ok(())
}

fn write_integer(buffer: &mut Vec<u8>, integer: i128) -> Result<(), EncodingError> {
    if integer >= 0 {
        let value = u64::try_from(integer).map_err(|_| EncodingError::IntegerOutOfRange(integer))?;
        write_header(buffer, MAJOR_UNSIGNED, value);
    } else {
        let value =
            u64::try_from(-1 - integer).map_err(|_| EncodingError::IntegerOutOfRange(integer))?;
        write_header(buffer, MAJOR_NEGATIVE, value);
    }
    Ok(())
}

/// Write a major type with its argument in the shortest form.
fn write_header(buffer: &mut Vec<u8>, major: u8, argument: u64) {
    let major = major << 5;
    if argument < 24 {
        buffer.push(major | argument as u8);
    } else if let Ok(argument) = u8::try_from(argument) {
        buffer.push(major | 24);
        buffer.push(argument);
    } else if let Ok(argument) = u16::try_from(argument) {
        buffer.push(major | 25);
        buffer.extend_from_slice(&argument.to_be_bytes());
    } else if let Ok(argument) = u32::try_from(argument) {
        buffer.push(major | 26);
        buffer.extend_from_slice(&argument.to_be_bytes());
    } else {
        buffer.push(major | 27);
        buffer.extend_from_slice(&argument.to_be_bytes());
    }
}
