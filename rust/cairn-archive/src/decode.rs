use cairn_multiformats::{Cid, varint};

use crate::block::Block;
use crate::error::ArchiveError;
use crate::header::Header;

/// A decoded archive. Blocks keep the order they were read in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// The archive header.
    pub header: Header,
    /// Blocks in archive order.
    pub blocks: Vec<Block>,
}

impl Archive {
    /// Root CIDs.
    pub fn roots(&self) -> &[Cid] {
        &self.header.roots
    }

    /// Find the block addressed by `cid`.
    pub fn get(&self, cid: &Cid) -> Option<&Block> {
        self.blocks.iter().find(|block| block.cid == *cid)
    }

    /// The block addressed by the first root.
    pub fn root_block(&self) -> Result<&Block, ArchiveError> {
        let root = self.header.roots.first().ok_or(ArchiveError::NoRoots)?;
        self.get(root)
            .ok_or_else(|| ArchiveError::MissingBlock(root.clone()))
    }

    /// Re-encode the archive.
    pub fn encode(&self) -> Result<Vec<u8>, ArchiveError> {
        crate::encode(&self.header.roots, &self.blocks)
    }
}

/// Decode an archive.
///
/// Blocks hashed with a built-in function must match their CID.
pub fn decode(bytes: &[u8]) -> Result<Archive, ArchiveError> {
    let (header_length, prefix) = varint::decode(bytes, 0)?;
    if header_length == 0 {
        return Err(ArchiveError::EmptyHeader { offset: 0 });
    }
    let header_end = section_end(bytes, 0, prefix, header_length)?;
    let header = Header::from_value(&cairn_encoding::decode(&bytes[prefix..header_end])?)?;

    let mut blocks = Vec::new();
    let mut offset = header_end;
    while offset < bytes.len() {
        let (length, prefix) = varint::decode(bytes, offset)?;
        if length == 0 {
            return Err(ArchiveError::EmptyBlock { offset });
        }
        let start = offset + prefix;
        let end = section_end(bytes, offset, prefix, length)?;
        let (cid, data) = Cid::decode_first(&bytes[start..end])
            .map_err(|source| ArchiveError::InvalidCid { offset, source })?;
        if cid.multihash().matches(data) == Some(false) {
            return Err(ArchiveError::HashMismatch { offset, cid });
        }
        blocks.push(Block::new(cid, data.to_vec()));
        offset = end;
    }

    Ok(Archive { header, blocks })
}

fn section_end(
    bytes: &[u8],
    offset: usize,
    prefix: usize,
    length: u64,
) -> Result<usize, ArchiveError> {
    let start = offset + prefix;
    let remaining = bytes.len() - start;
    usize::try_from(length)
        .ok()
        .filter(|length| *length <= remaining)
        .map(|length| start + length)
        .ok_or(ArchiveError::Truncated {
            offset,
            length,
            remaining,
        })
}

#[cfg(test)]
mod tests {
    use cairn_multiformats::codec::RAW;
    use cairn_multiformats::multihash::{Hasher, Sha256};

    use super::*;
    use crate::encode::{encode, encode_with_positions};

    fn blocks() -> Vec<Block> {
        vec![
            Block::of(RAW, b"first".to_vec()),
            Block::of(RAW, b"second".to_vec()),
        ]
    }

    #[test]
    fn it_roundtrips_roots_and_blocks_in_order() {
        let blocks = blocks();
        let bytes = encode(&[blocks[1].cid.clone()], &blocks).unwrap();
        let archive = decode(&bytes).unwrap();
        assert_eq!(archive.roots(), &[blocks[1].cid.clone()]);
        assert_eq!(archive.blocks, blocks);
        assert_eq!(archive.root_block().unwrap(), &blocks[1]);
        assert_eq!(archive.encode().unwrap(), bytes);
    }

    #[test]
    fn positions_address_block_data() {
        let blocks = blocks();
        let (bytes, positions) = encode_with_positions(&[], &blocks).unwrap();
        assert_eq!(positions.len(), 2);
        for (block, position) in blocks.iter().zip(&positions) {
            assert_eq!(position.cid, block.cid);
            let start = position.offset as usize;
            let end = start + position.length as usize;
            assert_eq!(&bytes[start..end], block.data.as_slice());
        }
    }

    #[test]
    fn it_accepts_legacy_block_cids() {
        let data = b"legacy".to_vec();
        let cid = Cid::new_v0(Sha256.digest(&data, None).unwrap()).unwrap();
        let block = Block::new(cid.clone(), data);
        let bytes = encode(&[cid], std::slice::from_ref(&block)).unwrap();
        assert_eq!(decode(&bytes).unwrap().blocks, vec![block]);
    }

    #[test]
    fn it_rejects_blocks_that_do_not_hash_to_their_cid() {
        let blocks = blocks();
        let (mut bytes, positions) = encode_with_positions(&[], &blocks).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        let section = (positions[1].offset - 1 - blocks[1].cid.as_bytes().len() as u64) as usize;
        assert_eq!(
            decode(&bytes),
            Err(ArchiveError::HashMismatch {
                offset: section,
                cid: blocks[1].cid.clone(),
            })
        );
    }

    #[test]
    fn blocks_under_unknown_hashes_are_kept() {
        let cid = Cid::new_v1(RAW, cairn_multiformats::Multihash::create(0x1e, &[7; 32]));
        let block = Block::new(cid.clone(), b"opaque".to_vec());
        let bytes = encode(&[cid], std::slice::from_ref(&block)).unwrap();
        assert_eq!(decode(&bytes).unwrap().blocks, vec![block]);
    }

    #[test]
    fn it_rejects_an_empty_header() {
        assert_eq!(decode(&[0x00]), Err(ArchiveError::EmptyHeader { offset: 0 }));
    }

    #[test]
    fn it_rejects_empty_and_truncated_blocks() {
        let mut bytes = encode(&[], &[]).unwrap();
        let header_end = bytes.len();
        bytes.push(0x00);
        assert_eq!(
            decode(&bytes),
            Err(ArchiveError::EmptyBlock { offset: header_end })
        );

        let mut bytes = encode(&[], &blocks()).unwrap();
        bytes.pop();
        assert!(matches!(decode(&bytes), Err(ArchiveError::Truncated { .. })));
    }

    #[test]
    fn it_rejects_other_versions() {
        let header = cairn_encoding::encode(
            &cairn_encoding::Map::new()
                .with("roots", cairn_encoding::Value::List(vec![]))
                .with("version", 2)
                .into(),
        )
        .unwrap();
        let mut bytes = varint::encode(header.len() as u64);
        bytes.extend(header);
        assert_eq!(decode(&bytes), Err(ArchiveError::UnsupportedVersion(2)));
    }

    #[test]
    fn root_block_must_be_present() {
        let missing = Cid::of(RAW, b"elsewhere");
        let bytes = encode(&[missing.clone()], &blocks()).unwrap();
        assert_eq!(
            decode(&bytes).unwrap().root_block(),
            Err(ArchiveError::MissingBlock(missing))
        );
        let bytes = encode(&[], &blocks()).unwrap();
        assert_eq!(decode(&bytes).unwrap().root_block(), Err(ArchiveError::NoRoots));
    }
}
