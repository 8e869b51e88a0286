use cairn_encoding::{Map, Value};
use cairn_multiformats::{Cid, Multihash};

use crate::block::{Block, BlockPosition};
use crate::decode::decode;
use crate::encode::encode;
use crate::error::ArchiveError;

/// Variant key of the index root block.
pub const SHARDED_DAG_INDEX: &str = "index/sharded/dag@0.1";

/// A byte range inside a shard that holds one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Multihash of the block.
    pub multihash: Multihash,
    /// Byte offset within the shard.
    pub offset: u64,
    /// Length in bytes.
    pub length: u64,
}

/// The slices recorded for one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    /// Multihash of the shard archive.
    pub multihash: Multihash,
    /// Slices in ascending multihash order.
    pub slices: Vec<Slice>,
}

/// Locates every block of a content DAG across the archives (shards) it was
/// split into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardedDagIndex {
    content: Cid,
    shards: Vec<Shard>,
}

impl ShardedDagIndex {
    /// An empty index for the DAG rooted at `content`.
    pub fn new(content: Cid) -> Self {
        Self {
            content,
            shards: Vec::new(),
        }
    }

    /// Root of the indexed DAG.
    pub fn content(&self) -> &Cid {
        &self.content
    }

    /// Shards in ascending multihash order.
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Record that the block `slice` lives at `offset..offset + length` of
    /// `shard`. A repeated slice overwrites the earlier position.
    pub fn set_slice(&mut self, shard: &Multihash, slice: Multihash, offset: u64, length: u64) {
        let index = match self
            .shards
            .binary_search_by(|existing| existing.multihash.as_bytes().cmp(shard.as_bytes()))
        {
            Ok(index) => index,
            Err(index) => {
                self.shards.insert(
                    index,
                    Shard {
                        multihash: shard.clone(),
                        slices: Vec::new(),
                    },
                );
                index
            }
        };

        let slices = &mut self.shards[index].slices;
        let entry = Slice {
            multihash: slice,
            offset,
            length,
        };
        match slices.binary_search_by(|existing| {
            existing.multihash.as_bytes().cmp(entry.multihash.as_bytes())
        }) {
            Ok(position) => slices[position] = entry,
            Err(position) => slices.insert(position, entry),
        }
    }

    /// Record every block position reported while encoding `shard`.
    pub fn add_shard(&mut self, shard: &Multihash, positions: &[BlockPosition]) {
        for position in positions {
            self.set_slice(
                shard,
                position.cid.multihash().clone(),
                position.offset,
                position.length,
            );
        }
    }

    /// Find the shard and range holding the block with `multihash`.
    pub fn locate(&self, multihash: &Multihash) -> Option<(&Multihash, &Slice)> {
        self.shards.iter().find_map(|shard| {
            shard
                .slices
                .iter()
                .find(|slice| slice.multihash == *multihash)
                .map(|slice| (&shard.multihash, slice))
        })
    }

    /// Encode the index as an archive.
    ///
    /// The root block is `{"index/sharded/dag@0.1": {"shards": [...],
    /// "content": link}}` and each shard is its own block.
    pub fn archive(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut blocks = Vec::with_capacity(self.shards.len() + 1);
        let mut links = Vec::with_capacity(self.shards.len());
        for shard in &self.shards {
            let slices = shard
                .slices
                .iter()
                .map(|slice| {
                    Value::List(vec![
                        Value::Bytes(slice.multihash.as_bytes().to_vec()),
                        Value::List(vec![slice.offset.into(), slice.length.into()]),
                    ])
                })
                .collect::<Vec<_>>();
            let block = Block::encode(&Value::List(vec![
                Value::Bytes(shard.multihash.as_bytes().to_vec()),
                Value::List(slices),
            ]))?;
            links.push(Value::Link(block.cid.clone()));
            blocks.push(block);
        }

        let body = Map::new()
            .with("shards", Value::List(links))
            .with("content", self.content.clone());
        let root = Block::encode(&Map::new().with(SHARDED_DAG_INDEX, body).into())?;
        let roots = [root.cid.clone()];
        blocks.insert(0, root);
        encode(&roots, &blocks)
    }

    /// Read an index back from its archive form.
    pub fn extract(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let archive = decode(bytes)?;
        let root = cairn_encoding::decode(&archive.root_block()?.data)?;
        let body = root
            .as_map()
            .and_then(|map| map.get(SHARDED_DAG_INDEX))
            .and_then(Value::as_map)
            .ok_or(ArchiveError::InvalidIndex("missing index variant"))?;
        let content = body
            .get("content")
            .and_then(Value::as_link)
            .ok_or(ArchiveError::InvalidIndex("missing content link"))?;
        let links = body
            .get("shards")
            .and_then(Value::as_list)
            .ok_or(ArchiveError::InvalidIndex("missing shard links"))?;

        let mut index = ShardedDagIndex::new(content.clone());
        for link in links {
            let cid = link
                .as_link()
                .ok_or(ArchiveError::InvalidIndex("shard is not a link"))?;
            let block = archive
                .get(cid)
                .ok_or_else(|| ArchiveError::MissingBlock(cid.clone()))?;
            let shard = cairn_encoding::decode(&block.data)?;
            let [shard, slices] = shard
                .as_list()
                .ok_or(ArchiveError::InvalidIndex("shard is not a list"))?
            else {
                return Err(ArchiveError::InvalidIndex("shard is not a pair"));
            };
            let shard = multihash_of(shard)?;
            for slice in slices
                .as_list()
                .ok_or(ArchiveError::InvalidIndex("slices are not a list"))?
            {
                let (multihash, offset, length) = slice_of(slice)
                    .ok_or(ArchiveError::InvalidIndex("malformed slice"))?;
                index.set_slice(&shard, multihash_of(multihash)?, offset, length);
            }
        }
        Ok(index)
    }
}

fn multihash_of(value: &Value) -> Result<Multihash, ArchiveError> {
    let bytes = value
        .as_bytes()
        .ok_or(ArchiveError::InvalidIndex("multihash is not bytes"))?;
    Ok(Multihash::decode(bytes)?)
}

fn slice_of(value: &Value) -> Option<(&Value, u64, u64)> {
    let [multihash, range] = value.as_list()? else {
        return None;
    };
    let [offset, length] = range.as_list()? else {
        return None;
    };
    Some((multihash, offset.as_u64()?, length.as_u64()?))
}

#[cfg(test)]
mod tests {
    use cairn_multiformats::codec::{CAR, RAW};

    use super::*;
    use crate::encode::encode_with_positions;

    #[test]
    fn it_indexes_shard_positions() {
        let blocks = vec![
            Block::of(RAW, b"one".to_vec()),
            Block::of(RAW, b"two".to_vec()),
        ];
        let (shard_bytes, positions) = encode_with_positions(&[], &blocks).unwrap();
        let shard = Cid::of(CAR, &shard_bytes);

        let mut index = ShardedDagIndex::new(blocks[0].cid.clone());
        index.add_shard(shard.multihash(), &positions);

        let (found, slice) = index.locate(blocks[1].cid.multihash()).unwrap();
        assert_eq!(found, shard.multihash());
        let start = slice.offset as usize;
        assert_eq!(&shard_bytes[start..start + slice.length as usize], b"two");
    }

    #[test]
    fn root_lists_shards_before_content() {
        let index = ShardedDagIndex::new(Cid::of(RAW, b"content"));
        let bytes = index.archive().unwrap();
        let archive = decode(&bytes).unwrap();
        let root = cairn_encoding::decode(&archive.root_block().unwrap().data).unwrap();
        let body = root.as_map().unwrap().get(SHARDED_DAG_INDEX).unwrap();
        let keys: Vec<_> = body.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["shards", "content"]);
    }

    #[test]
    fn it_reads_back_what_it_writes() {
        let mut index = ShardedDagIndex::new(Cid::of(RAW, b"content"));
        let shard_a = Cid::of(CAR, b"shard a");
        let shard_b = Cid::of(CAR, b"shard b");
        index.set_slice(shard_a.multihash(), Cid::of(RAW, b"x").multihash().clone(), 10, 3);
        index.set_slice(shard_a.multihash(), Cid::of(RAW, b"y").multihash().clone(), 50, 7);
        index.set_slice(shard_b.multihash(), Cid::of(RAW, b"z").multihash().clone(), 0, 1);

        let decoded = ShardedDagIndex::extract(&index.archive().unwrap()).unwrap();
        assert_eq!(decoded, index);
        assert_eq!(decoded.shards().len(), 2);
    }

    #[test]
    fn repeated_slices_overwrite() {
        let mut index = ShardedDagIndex::new(Cid::of(RAW, b"content"));
        let shard = Cid::of(CAR, b"shard");
        let slice = Cid::of(RAW, b"x").multihash().clone();
        index.set_slice(shard.multihash(), slice.clone(), 1, 1);
        index.set_slice(shard.multihash(), slice.clone(), 2, 2);
        assert_eq!(index.shards()[0].slices.len(), 1);
        assert_eq!(index.locate(&slice).unwrap().1.offset, 2);
    }
}
