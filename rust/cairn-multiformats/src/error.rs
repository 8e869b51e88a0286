//! Error types for multiformat decoding.
//!
//! Every variant describes malformed input or a violated structural
//! invariant, and carries enough context (byte offset, declared sizes,
//! offending character) to diagnose the input without a debugger.

use thiserror::Error;

use crate::varint::MAX_VARINT_LENGTH;

/// Errors produced while decoding a varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarintError {
    /// Input ended before the final varint byte.
    #[error("varint at offset {offset} is truncated")]
    Truncated {
        /// Offset of the first byte of the varint.
        offset: usize,
    },

    /// More continuation bytes than a 64-bit value can occupy.
    #[error("varint at offset {offset} does not terminate within {MAX_VARINT_LENGTH} bytes")]
    Overflow {
        /// Offset of the first byte of the varint.
        offset: usize,
    },
}

/// Errors produced by multibase codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultibaseError {
    /// The input text was empty, so there is no prefix to dispatch on.
    #[error("cannot decode an empty multibase string")]
    Empty,

    /// No codec is registered for the leading character.
    #[error("unsupported multibase prefix {0:?}")]
    UnknownPrefix(char),

    /// The text was handed to a specific codec but carries another prefix.
    #[error("expected {base} prefix {expected:?}, found {found:?}")]
    PrefixMismatch {
        /// Name of the codec that was asked to decode.
        base: &'static str,
        /// The codec's prefix.
        expected: char,
        /// The first character of the input.
        found: char,
    },

    /// A character outside the codec alphabet.
    #[error("invalid {base} character {character:?} at position {position}")]
    InvalidCharacter {
        /// Name of the codec.
        base: &'static str,
        /// The offending character.
        character: char,
        /// Character index within the un-prefixed payload.
        position: usize,
    },

    /// The payload length cannot be produced by the codec.
    #[error("invalid {base} payload length")]
    InvalidLength {
        /// Name of the codec.
        base: &'static str,
    },
}

/// Errors produced while building or decoding a multihash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultihashError {
    /// The code or size prefix is not a valid varint.
    #[error(transparent)]
    Varint(#[from] VarintError),

    /// Declared digest size does not match the bytes that follow it.
    #[error("multihash declares a {declared} byte digest but {remaining} bytes remain")]
    SizeMismatch {
        /// Size declared by the varint prefix.
        declared: u64,
        /// Bytes actually available after the prefix.
        remaining: usize,
    },

    /// The requested truncation is outside the hasher's supported range.
    #[error("{hasher} digest cannot be truncated to {requested} bytes (supported {min}..={max})")]
    InvalidTruncation {
        /// Name of the hasher.
        hasher: &'static str,
        /// The requested digest length.
        requested: usize,
        /// Shortest digest the hasher permits.
        min: usize,
        /// Longest digest the hasher produces.
        max: usize,
    },
}

/// Errors produced while building, converting or decoding content identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidError {
    /// A varint field is malformed.
    #[error(transparent)]
    Varint(#[from] VarintError),

    /// The embedded multihash is malformed.
    #[error(transparent)]
    Multihash(#[from] MultihashError),

    /// The text form could not be decoded.
    #[error(transparent)]
    Multibase(#[from] MultibaseError),

    /// The version field is neither 0 (implicit) nor 1.
    #[error("unknown CID version {0}")]
    UnknownVersion(u64),

    /// The components cannot be expressed as a CIDv0.
    #[error(
        "CIDv0 requires dag-pb content and a 32 byte sha2-256 multihash, \
         found codec {code:#x} with hash {hash:#x} of {size} bytes"
    )]
    InvalidV0 {
        /// Content-type code.
        code: u64,
        /// Multihash function code.
        hash: u64,
        /// Multihash digest size.
        size: usize,
    },

    /// A CIDv0 only has a base58btc text form.
    #[error("CIDv0 cannot be encoded in {0}, only in base58btc")]
    UnsupportedBase(&'static str),

    /// A complete CID was followed by further bytes.
    #[error("CID is followed by {0} unexpected bytes")]
    TrailingBytes(usize),
}
