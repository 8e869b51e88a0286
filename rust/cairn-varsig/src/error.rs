//! Error types for DID and signature decoding.

use cairn_multiformats::{MultibaseError, VarintError};
use thiserror::Error;

/// Errors produced while parsing or converting a DID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DidError {
    /// The text is not of the form `did:<method>:<id>`.
    #[error("invalid DID: {0}")]
    Malformed(String),

    /// The binary form has a malformed type code.
    #[error(transparent)]
    Varint(#[from] VarintError),

    /// The type code is neither a known key type nor the generic DID code.
    #[error("unknown DID type code {0:#x}")]
    UnknownCode(u64),

    /// A `did:key` identifier is not valid base58btc multibase.
    #[error(transparent)]
    Multibase(#[from] MultibaseError),

    /// A generic DID suffix is not UTF-8.
    #[error("DID suffix is not valid utf-8")]
    InvalidUtf8,
}

/// Errors produced while decoding a framed signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarsigError {
    /// The algorithm code or length prefix is malformed.
    #[error(transparent)]
    Varint(#[from] VarintError),

    /// Declared signature length does not match the bytes that follow.
    #[error("signature declares {declared} bytes but {remaining} remain")]
    LengthMismatch {
        /// Length from the prefix.
        declared: u64,
        /// Bytes after the prefix.
        remaining: usize,
    },

    /// The signature was produced by a different algorithm.
    #[error("expected signature code {expected:#x}, found {found:#x}")]
    AlgorithmMismatch {
        /// Code of the requested algorithm.
        expected: u64,
        /// Code found in the frame.
        found: u64,
    },

    /// The raw bytes are not a valid signature for the algorithm.
    #[error("invalid signature bytes")]
    InvalidSignature,
}
