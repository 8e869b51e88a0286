use cairn_encoding::{Map, Value};
use cairn_multiformats::Cid;

use crate::error::ArchiveError;

/// The only archive version this crate reads and writes.
pub const ARCHIVE_VERSION: u64 = 1;

/// Archive header: format version and root identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Format version, always [`ARCHIVE_VERSION`].
    pub version: u64,
    /// Root CIDs in order.
    pub roots: Vec<Cid>,
}

impl Header {
    /// A version 1 header with the given roots.
    pub fn new(roots: Vec<Cid>) -> Self {
        Self {
            version: ARCHIVE_VERSION,
            roots,
        }
    }

    /// Canonical object form, `roots` before `version`.
    pub fn to_value(&self) -> Value {
        let roots = self.roots.iter().cloned().map(Value::Link).collect::<Vec<_>>();
        Map::new()
            .with("roots", Value::List(roots))
            .with("version", self.version)
            .into()
    }

    /// Read a header from its canonical object form.
    pub fn from_value(value: &Value) -> Result<Self, ArchiveError> {
        let map = value
            .as_map()
            .ok_or(ArchiveError::InvalidHeader("header is not a map"))?;
        let version = map
            .get("version")
            .and_then(Value::as_u64)
            .ok_or(ArchiveError::InvalidHeader("missing version"))?;
        if version != ARCHIVE_VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }
        let roots = map
            .get("roots")
            .and_then(Value::as_list)
            .ok_or(ArchiveError::InvalidHeader("missing roots"))?
            .iter()
            .map(|root| {
                root.as_link()
                    .cloned()
                    .ok_or(ArchiveError::InvalidHeader("root is not a link"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { version, roots })
    }
}
