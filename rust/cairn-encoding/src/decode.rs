use cairn_multiformats::Cid;

use crate::encode::{
    LINK_TAG, MAJOR_BYTES, MAJOR_LIST, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TAG,
    MAJOR_TEXT, MAJOR_UNSIGNED,
};
use crate::error::EncodingError;
use crate::value::{Map, Value};

/// Maximum nesting of lists, maps and tags accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

/// Decode a value that spans all of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Value, EncodingError> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.value(0)?;
    if decoder.offset < bytes.len() {
        return Err(EncodingError::TrailingBytes {
            offset: decoder.offset,
            remaining: bytes.len() - decoder.offset,
        });
    }
    Ok(value)
}

/// Decode the value at the start of `bytes`, returning the remainder.
pub fn decode_first(bytes: &[u8]) -> Result<(Value, &[u8]), EncodingError> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.value(0)?;
    Ok((value, &bytes[decoder.offset..]))
}

struct Decoder<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, start: usize, length: usize) -> Result<&'a [u8], EncodingError> {
        let end = self
            .offset
            .checked_add(length)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(EncodingError::UnexpectedEof { offset: start })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Read an initial byte and its argument.
    fn header(&mut self) -> Result<(u8, u8, u64, usize), EncodingError> {
        let start = self.offset;
        let initial = self.take(start, 1)?[0];
        let major = initial >> 5;
        let info = initial & 0x1f;

        if major == MAJOR_SIMPLE {
            return Ok((major, info, 0, start));
        }

        let argument = match info {
            0..=23 => u64::from(info),
            24 => u64::from(self.take(start, 1)?[0]),
            25 => u64::from(u16::from_be_bytes(self.array(start)?)),
            26 => u64::from(u32::from_be_bytes(self.array(start)?)),
            27 => u64::from_be_bytes(self.array(start)?),
            31 => return Err(EncodingError::IndefiniteLength { offset: start }),
            _ => return Err(EncodingError::ReservedLength { offset: start, info }),
        };
        Ok((major, info, argument, start))
    }

    fn array<const N: usize>(&mut self, start: usize) -> Result<[u8; N], EncodingError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(start, N)?);
        Ok(array)
    }

    fn length(&self, length: u64, start: usize) -> Result<usize, EncodingError> {
        usize::try_from(length)
            .ok()
            .filter(|length| *length <= self.bytes.len() - self.offset)
            .ok_or(EncodingError::LengthOverflow {
                offset: start,
                length,
            })
    }

    fn value(&mut self, depth: usize) -> Result<Value, EncodingError> {
        let (major, info, argument, start) = self.header()?;
        match major {
            MAJOR_UNSIGNED => Ok(Value::Integer(i128::from(argument))),
            MAJOR_NEGATIVE => Ok(Value::Integer(-1 - i128::from(argument))),
            MAJOR_BYTES => {
                let length = self.length(argument, start)?;
                Ok(Value::Bytes(self.take(start, length)?.to_vec()))
            }
            MAJOR_TEXT => Ok(Value::Text(self.text(argument, start)?)),
            MAJOR_LIST => {
                let depth = self.descend(depth, start)?;
                // Every item needs at least one byte.
                let count = self.length(argument, start)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.value(depth)?);
                }
                Ok(Value::List(items))
            }
            MAJOR_MAP => {
                let depth = self.descend(depth, start)?;
                let count = self.length(argument, start)?;
                let mut map = Map::new();
                for _ in 0..count {
                    let key_offset = self.offset;
                    let (key_major, _, key_length, _) = self.header()?;
                    if key_major != MAJOR_TEXT {
                        return Err(EncodingError::NonTextKey { offset: key_offset });
                    }
                    let key = self.text(key_length, key_offset)?;
                    if map.contains_key(&key) {
                        return Err(EncodingError::DuplicateKey {
                            offset: key_offset,
                            key,
                        });
                    }
                    let value = self.value(depth)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
            MAJOR_TAG if argument == LINK_TAG => {
                self.descend(depth, start)?;
                Ok(Value::Link(self.link(start)?))
            }
            MAJOR_TAG => Err(EncodingError::UnsupportedTag {
                offset: start,
                tag: argument,
            }),
            _ => match info {
                20 => Ok(Value::Bool(false)),
                21 => Ok(Value::Bool(true)),
                22 => Ok(Value::Null),
                23 => Err(EncodingError::Unsupported {
                    offset: start,
                    kind: "undefined",
                }),
                25..=27 => Err(EncodingError::Unsupported {
                    offset: start,
                    kind: "float",
                }),
                31 => Err(EncodingError::IndefiniteLength { offset: start }),
                _ => Err(EncodingError::Unsupported {
                    offset: start,
                    kind: "simple value",
                }),
            },
        }
    }

    fn descend(&self, depth: usize, start: usize) -> Result<usize, EncodingError> {
        if depth >= MAX_DEPTH {
            return Err(EncodingError::TooDeep {
                offset: start,
                limit: MAX_DEPTH,
            });
        }
        Ok(depth + 1)
    }

    fn text(&mut self, length: u64, start: usize) -> Result<String, EncodingError> {
        let length = self.length(length, start)?;
        let bytes = self.take(start, length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| EncodingError::InvalidUtf8 { offset: start })
    }

    fn link(&mut self, start: usize) -> Result<Cid, EncodingError> {
        let (major, _, length, _) = self.header()?;
        if major != MAJOR_BYTES {
            return Err(EncodingError::InvalidLinkPrefix { offset: start });
        }
        let length = self.length(length, start)?;
        match self.take(start, length)? {
            [0x00, cid @ ..] => {
                Cid::decode(cid).map_err(|source| EncodingError::InvalidLink {
                    offset: start,
                    source,
                })
            }
            _ => Err(EncodingError::InvalidLinkPrefix { offset: start }),
        }
    }
}
