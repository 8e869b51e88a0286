use cairn_multiformats::CidError;
use thiserror::Error;

/// Errors produced while encoding or decoding a [`Value`](crate::Value).
///
/// Decoding errors carry the offset of the item that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The integer does not fit the 64-bit unsigned or negative range.
    #[error("integer {0} is outside the encodable range")]
    IntegerOutOfRange(i128),

    /// Input ended in the middle of an item.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof {
        /// Offset of the item being read.
        offset: usize,
    },

    /// Floats, `undefined` and other simple values have no [`Value`](crate::Value) form.
    #[error("unsupported {kind} at offset {offset}")]
    Unsupported {
        /// Offset of the item.
        offset: usize,
        /// What was found.
        kind: &'static str,
    },

    /// Indefinite-length strings, lists and maps are not canonical.
    #[error("indefinite length item at offset {offset}")]
    IndefiniteLength {
        /// Offset of the item.
        offset: usize,
    },

    /// The additional-information bits are reserved.
    #[error("reserved length encoding {info} at offset {offset}")]
    ReservedLength {
        /// Offset of the item.
        offset: usize,
        /// The reserved value.
        info: u8,
    },

    /// A length does not fit in memory.
    #[error("length {length} at offset {offset} exceeds the input")]
    LengthOverflow {
        /// Offset of the item.
        offset: usize,
        /// The declared length.
        length: u64,
    },

    /// A text string is not valid UTF-8.
    #[error("invalid utf-8 text at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the item.
        offset: usize,
    },

    /// A map key is not a text string.
    #[error("map key at offset {offset} is not text")]
    NonTextKey {
        /// Offset of the key.
        offset: usize,
    },

    /// A map repeats a key.
    #[error("duplicate map key {key:?} at offset {offset}")]
    DuplicateKey {
        /// Offset of the key.
        offset: usize,
        /// The repeated key.
        key: String,
    },

    /// Only tag 42 (content link) is understood.
    #[error("unsupported tag {tag} at offset {offset}")]
    UnsupportedTag {
        /// Offset of the tag.
        offset: usize,
        /// The tag number.
        tag: u64,
    },

    /// A tag 42 payload is not a byte string starting with `0x00`.
    #[error("link at offset {offset} is not a 0x00-prefixed byte string")]
    InvalidLinkPrefix {
        /// Offset of the tag.
        offset: usize,
    },

    /// A tag 42 payload does not hold a valid CID.
    #[error("invalid link at offset {offset}: {source}")]
    InvalidLink {
        /// Offset of the tag.
        offset: usize,
        /// Why the CID was rejected.
        source: CidError,
    },

    /// Nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("nesting deeper than {limit} at offset {offset}")]
    TooDeep {
        /// Offset of the item that crossed the limit.
        offset: usize,
        /// The limit.
        limit: usize,
    },

    /// A complete value was followed by more bytes.
    #[error("{remaining} trailing bytes after value at offset {offset}")]
    TrailingBytes {
        /// Offset where the trailing bytes start.
        offset: usize,
        /// How many bytes follow.
        remaining: usize,
    },
}
