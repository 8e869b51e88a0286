use cairn_encoding::{EncodingError, Value, encode};
use cairn_multiformats::Cid;
use cairn_multiformats::codec::DAG_CBOR;

/// A content-addressed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Identifier of `data`.
    pub cid: Cid,
    /// The block bytes.
    pub data: Vec<u8>,
}

impl Block {
    /// Pair `data` with an already known CID.
    pub fn new(cid: Cid, data: Vec<u8>) -> Self {
        Self { cid, data }
    }

    /// Address `data` by its sha2-256 digest under content type `code`.
    pub fn of(code: u64, data: Vec<u8>) -> Self {
        Self {
            cid: Cid::of(code, &data),
            data,
        }
    }

    /// Encode `value` as a dag-cbor block.
    pub fn encode(value: &Value) -> Result<Self, EncodingError> {
        Ok(Self::of(DAG_CBOR, encode(value)?))
    }
}

/// Where a block's data sits inside an encoded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPosition {
    /// The block identifier.
    pub cid: Cid,
    /// Byte offset of the block data from the start of the archive.
    pub offset: u64,
    /// Length of the block data.
    pub length: u64,
}
