use cairn_encoding::EncodingError;
use cairn_multiformats::{Cid, CidError, MultihashError, VarintError};
use thiserror::Error;

/// Errors produced while reading or writing an archive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    /// A section length prefix is malformed.
    #[error(transparent)]
    Varint(#[from] VarintError),

    /// The header or an index block is not a valid canonical object.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The header length is zero.
    #[error("archive header at offset {offset} is empty")]
    EmptyHeader {
        /// Offset of the header length prefix.
        offset: usize,
    },

    /// The header decoded but does not have the expected shape.
    #[error("malformed archive header: {0}")]
    InvalidHeader(&'static str),

    /// Only version 1 archives are understood.
    #[error("unsupported archive version {0}")]
    UnsupportedVersion(u64),

    /// A block section has zero length.
    #[error("block at offset {offset} is empty")]
    EmptyBlock {
        /// Offset of the block length prefix.
        offset: usize,
    },

    /// A section declares more bytes than remain.
    #[error("section at offset {offset} declares {length} bytes but only {remaining} remain")]
    Truncated {
        /// Offset of the section length prefix.
        offset: usize,
        /// Declared length.
        length: u64,
        /// Bytes remaining after the prefix.
        remaining: usize,
    },

    /// A block does not start with a valid CID.
    #[error("invalid block CID at offset {offset}: {source}")]
    InvalidCid {
        /// Offset of the block section.
        offset: usize,
        /// Why the CID was rejected.
        source: CidError,
    },

    /// A block's data does not hash to its CID.
    #[error("block {cid} at offset {offset} does not match its data")]
    HashMismatch {
        /// Offset of the block section.
        offset: usize,
        /// The CID the block was stored under.
        cid: Cid,
    },

    /// The archive has no roots.
    #[error("archive has no roots")]
    NoRoots,

    /// A root is not among the archive blocks.
    #[error("root block {0} is missing from the archive")]
    MissingBlock(Cid),

    /// An index block holds an invalid multihash.
    #[error(transparent)]
    Multihash(#[from] MultihashError),

    /// An index block does not have the expected shape.
    #[error("malformed index: {0}")]
    InvalidIndex(&'static str),
}
