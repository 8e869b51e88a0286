//! Canonical binary objects.
//!
//! A [`Value`] tree is written in a minimal, deterministic subset of CBOR:
//! integers, text, byte strings, booleans, null, lists, text-keyed maps and
//! content links (tag 42). The same tree always produces the same bytes.
//!
//! Map keys are written in exactly the order the caller inserted them. The
//! encoder never sorts. Consumers disagree on the order they expect (most
//! want the canonical length-first order, some want a fixed field order), so
//! [`Map::sorted_canonical`] and [`Map::sorted_alphabetical`] are available to
//! call sites that need them.
//!
//! ```
//! use cairn_encoding::{Map, Value, decode, encode};
//!
//! let value = Value::from(Map::new().with("roots", Value::List(vec![])).with("version", 1));
//! let bytes = encode(&value)?;
//! assert_eq!(decode(&bytes)?, value);
//! # Ok::<(), cairn_encoding::EncodingError>(())
//! ```

mod decode;
mod encode;
mod error;
mod value;

pub use decode::*;
pub use encode::*;
pub use error::*;
pub use value::*;
