//! Self-describing primitives shared by every other cairn layer.
//!
//! - [`varint`]: unsigned LEB128 integers
//! - [`multibase`]: prefixed text encodings of bytes
//! - [`multihash`]: tagged digests
//! - [`cid`]: content identifiers combining a content type and a multihash
//!
//! All of these are pure functions over bytes: nothing here logs, allocates
//! shared state, or suspends.

pub mod cid;
pub mod codec;
pub mod error;
pub mod multibase;
pub mod multihash;
pub mod varint;

pub use cid::{Cid, Version};
pub use error::*;
pub use multibase::Multibase;
pub use multihash::{Hasher, Multihash};
