use cairn_encoding::encode_into;
use cairn_multiformats::{Cid, varint};

use crate::block::{Block, BlockPosition};
use crate::error::ArchiveError;
use crate::header::Header;

/// Encode an archive with `roots` and `blocks`, in the given order.
///
/// Roots are not required to be among the blocks.
pub fn encode(roots: &[Cid], blocks: &[Block]) -> Result<Vec<u8>, ArchiveError> {
    Ok(encode_with_positions(roots, blocks)?.0)
}

/// Encode an archive and report where each block's data was written.
pub fn encode_with_positions(
    roots: &[Cid],
    blocks: &[Block],
) -> Result<(Vec<u8>, Vec<BlockPosition>), ArchiveError> {
    let mut header = Vec::new();
    encode_into(&Header::new(roots.to_vec()).to_value(), &mut header)?;

    let mut buffer = Vec::with_capacity(
        header.len()
            + 10
            + blocks
                .iter()
                .map(|block| block.cid.as_bytes().len() + block.data.len() + 10)
                .sum::<usize>(),
    );
    varint::write(&mut buffer, header.len() as u64);
    buffer.extend_from_slice(&header);

    let mut positions = Vec::with_capacity(blocks.len());
    for block in blocks {
        let cid = block.cid.as_bytes();
        varint::write(&mut buffer, (cid.len() + block.data.len()) as u64);
        buffer.extend_from_slice(cid);
        positions.push(BlockPosition {
            cid: block.cid.clone(),
            offset: buffer.len() as u64,
            length: block.data.len() as u64,
        });
        buffer.extend_from_slice(&block.data);
    }

    Ok((buffer, positions))
}
