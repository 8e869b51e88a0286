//! Content-addressed block archives (CARv1).
//!
//! An archive is `varint(header length) ++ header` followed by any number of
//! `varint(cid length + data length) ++ cid ++ data` sections. The header is
//! the canonical object `{roots: [...], version: 1}`, with `roots` first.
//!
//! [`encode_with_positions`] also reports where each block's data landed,
//! which is what a [`ShardedDagIndex`] records.

mod block;
mod decode;
mod encode;
mod error;
mod header;
mod index;

pub use block::*;
pub use decode::*;
pub use encode::*;
pub use error::*;
pub use header::*;
pub use index::*;
