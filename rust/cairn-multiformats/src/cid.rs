//! Content identifiers.
//!
//! A CIDv1 is `varint(1) ++ varint(content code) ++ multihash`. A CIDv0 is the
//! legacy form: a bare 34 byte sha2-256 multihash of dag-pb content, always
//! rendered in base58btc without a multibase prefix.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::DAG_PB;
use crate::error::CidError;
use crate::multibase::{self, Base32Lower, Base58Btc, Multibase};
use crate::multihash::{Hasher, Multihash, SHA2_256, Sha256};
use crate::varint;

const V0_SIZE: usize = 34;

/// CID version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    /// Legacy bare multihash.
    V0,
    /// Self-describing form.
    V1,
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        match version {
            Version::V0 => 0,
            Version::V1 => 1,
        }
    }
}

/// A content identifier.
///
/// Immutable once built. Equality, ordering and hashing go through the
/// canonical bytes, which are a function of version, code and multihash.
#[derive(Clone)]
pub struct Cid {
    version: Version,
    code: u64,
    multihash: Multihash,
    bytes: Vec<u8>,
}

impl Cid {
    /// Build a CIDv0 from a sha2-256 multihash.
    pub fn new_v0(multihash: Multihash) -> Result<Self, CidError> {
        if multihash.code() != SHA2_256 || multihash.size() != 32 {
            return Err(CidError::InvalidV0 {
                code: DAG_PB,
                hash: multihash.code(),
                size: multihash.size(),
            });
        }
        Ok(Self {
            version: Version::V0,
            code: DAG_PB,
            bytes: multihash.as_bytes().to_vec(),
            multihash,
        })
    }

    /// Build a CIDv1 for content of type `code`.
    pub fn new_v1(code: u64, multihash: Multihash) -> Self {
        let mut bytes = Vec::with_capacity(
            varint::encoding_length(1) + varint::encoding_length(code) + multihash.as_bytes().len(),
        );
        varint::write(&mut bytes, 1);
        varint::write(&mut bytes, code);
        bytes.extend_from_slice(multihash.as_bytes());
        Self {
            version: Version::V1,
            code,
            multihash,
            bytes,
        }
    }

    /// Build a CID of the given version, enforcing the CIDv0 constraints.
    pub fn new(version: Version, code: u64, multihash: Multihash) -> Result<Self, CidError> {
        match version {
            Version::V0 if code != DAG_PB => Err(CidError::InvalidV0 {
                code,
                hash: multihash.code(),
                size: multihash.size(),
            }),
            Version::V0 => Self::new_v0(multihash),
            Version::V1 => Ok(Self::new_v1(code, multihash)),
        }
    }

    /// CIDv1 of `data` under the sha2-256 hash.
    pub fn of(code: u64, data: &[u8]) -> Self {
        let digest = Multihash::create(SHA2_256, &Sha256.hash(data));
        Self::new_v1(code, digest)
    }

    /// Decode a CID spanning all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, CidError> {
        let (cid, rest) = Self::decode_first(bytes)?;
        if rest.is_empty() {
            Ok(cid)
        } else {
            Err(CidError::TrailingBytes(rest.len()))
        }
    }

    /// Decode the CID at the start of `bytes`, returning the remainder.
    ///
    /// A leading `0x12 0x20` marks a fixed width CIDv0; anything else is
    /// read as a varint-prefixed CIDv1.
    pub fn decode_first(bytes: &[u8]) -> Result<(Self, &[u8]), CidError> {
        if bytes.len() >= 2 && bytes[0] == SHA2_256 as u8 && bytes[1] == 32 {
            let split = bytes.len().min(V0_SIZE);
            let multihash = Multihash::decode(&bytes[..split])?;
            return Ok((Self::new_v0(multihash)?, &bytes[split..]));
        }

        let (version, version_length) = varint::decode(bytes, 0)?;
        if version != 1 {
            return Err(CidError::UnknownVersion(version));
        }
        let (code, code_length) = varint::decode(bytes, version_length)?;
        let (multihash, rest) = Multihash::decode_first(&bytes[version_length + code_length..])?;
        let length = bytes.len() - rest.len();
        Ok((
            Self {
                version: Version::V1,
                code,
                multihash,
                bytes: bytes[..length].to_vec(),
            },
            rest,
        ))
    }

    /// Parse the text form of a CID.
    ///
    /// A leading `Q` is a legacy base58btc CIDv0, anything else must be a
    /// registered multibase prefix.
    pub fn parse(text: &str) -> Result<Self, CidError> {
        if text.starts_with('Q') {
            let bytes = Base58Btc.base_decode(text)?;
            return Self::decode(&bytes);
        }
        let (_, bytes) = multibase::decode(text)?;
        Self::decode(&bytes)
    }

    /// Render in `base`.
    ///
    /// A CIDv0 has no multibase prefix and exists only in base58btc.
    pub fn to_string_of(&self, base: &dyn Multibase) -> Result<String, CidError> {
        match self.version {
            Version::V0 if base.prefix() == Base58Btc.prefix() => {
                Ok(Base58Btc.base_encode(&self.bytes))
            }
            Version::V0 => Err(CidError::UnsupportedBase(base.name())),
            Version::V1 => Ok(base.encode(&self.bytes)),
        }
    }

    /// Convert to a CIDv0, which requires dag-pb content and sha2-256.
    pub fn to_v0(&self) -> Result<Self, CidError> {
        match self.version {
            Version::V0 => Ok(self.clone()),
            Version::V1 => Self::new(Version::V0, self.code, self.multihash.clone()),
        }
    }

    /// Convert to a CIDv1 with the same content code and multihash.
    pub fn to_v1(&self) -> Self {
        match self.version {
            Version::V0 => Self::new_v1(self.code, self.multihash.clone()),
            Version::V1 => self.clone(),
        }
    }

    /// CID version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Content-type code.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// The embedded multihash.
    pub fn multihash(&self) -> &Multihash {
        &self.multihash
    }

    /// Canonical binary form.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the CID, returning its canonical binary form.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl PartialEq for Cid {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Cid {}

impl PartialOrd for Cid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl std::hash::Hash for Cid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl AsRef<[u8]> for Cid {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Version::V0 => f.write_str(&Base58Btc.base_encode(&self.bytes)),
            Version::V1 => f.write_str(&Base32Lower.encode(&self.bytes)),
        }
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({self})")
    }
}

impl FromStr for Cid {
    type Err = CidError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl TryFrom<&[u8]> for Cid {
    type Error = CidError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::decode(bytes)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("/", &self.to_string())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LinkVisitor;

        impl<'de> Visitor<'de> for LinkVisitor {
            type Value = Cid;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(r#"a link of the form {"/": "<cid>"}"#)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Cid, A::Error> {
                let (key, text) = map
                    .next_entry::<String, String>()?
                    .ok_or_else(|| de::Error::missing_field("/"))?;
                if key != "/" {
                    return Err(de::Error::unknown_field(&key, &["/"]));
                }
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::custom("link has more than one field"));
                }
                Cid::parse(&text).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(LinkVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DAG_CBOR, RAW};
    use crate::multibase::Base64Url;
    use crate::multihash::{IDENTITY, Identity};

    const V0_TEXT: &str = "QmdfTbBqBPQ7VNxZEYEj14VmRuZBkqFbiwReogJgS1zR1n";

    #[test]
    fn it_renders_v1_in_base32_by_default() {
        let cid = Cid::of(RAW, b"hello");
        let text = cid.to_string();
        assert!(text.starts_with("bafkrei"));
        assert_eq!(Cid::parse(&text).unwrap(), cid);
    }

    #[test]
    fn it_parses_a_legacy_v0() {
        let cid = Cid::parse(V0_TEXT).unwrap();
        assert_eq!(cid.version(), Version::V0);
        assert_eq!(cid.code(), DAG_PB);
        assert_eq!(cid.as_bytes().len(), 34);
        assert_eq!(cid.to_string(), V0_TEXT);
    }

    #[test]
    fn v0_and_v1_convert_back_and_forth() {
        let v0 = Cid::parse(V0_TEXT).unwrap();
        let v1 = v0.to_v1();
        assert_eq!(v1.version(), Version::V1);
        assert_eq!(v1.code(), DAG_PB);
        assert_eq!(v1.to_v0().unwrap(), v0);
    }

    #[test]
    fn it_refuses_v0_for_other_content() {
        let cid = Cid::of(DAG_CBOR, b"{}");
        assert!(matches!(cid.to_v0(), Err(CidError::InvalidV0 { code: DAG_CBOR, .. })));

        let identity = Cid::new_v1(DAG_PB, Identity.digest(b"x", None).unwrap());
        assert!(matches!(
            identity.to_v0(),
            Err(CidError::InvalidV0 { hash: IDENTITY, .. })
        ));
    }

    #[test]
    fn v0_only_renders_in_base58() {
        let cid = Cid::parse(V0_TEXT).unwrap();
        assert_eq!(cid.to_string_of(&Base58Btc).unwrap(), V0_TEXT);
        assert_eq!(
            cid.to_string_of(&Base64Url).unwrap_err(),
            CidError::UnsupportedBase("base64url")
        );
    }

    #[test]
    fn decode_first_handles_both_versions() {
        let v0 = Cid::parse(V0_TEXT).unwrap();
        let v1 = Cid::of(RAW, b"hello");
        let mut bytes = v0.as_bytes().to_vec();
        bytes.extend_from_slice(v1.as_bytes());
        bytes.push(0xff);

        let (first, rest) = Cid::decode_first(&bytes).unwrap();
        assert_eq!(first, v0);
        let (second, rest) = Cid::decode_first(rest).unwrap();
        assert_eq!(second, v1);
        assert_eq!(rest, &[0xff]);
    }

    #[test]
    fn it_rejects_unknown_versions_and_trailing_bytes() {
        assert_eq!(
            Cid::decode(&[0x02, 0x55, 0x00, 0x00]).unwrap_err(),
            CidError::UnknownVersion(2)
        );
        let mut bytes = Cid::of(RAW, b"hello").into_bytes();
        bytes.push(0);
        assert_eq!(Cid::decode(&bytes).unwrap_err(), CidError::TrailingBytes(1));
    }

    #[test]
    fn it_serializes_as_a_json_link() {
        let cid = Cid::of(RAW, b"hello");
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, format!(r#"{{"/":"{cid}"}}"#));
        let back: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);
    }
}
