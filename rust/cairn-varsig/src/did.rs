//! Decentralized identifiers.
//!
//! The binary form of a DID is a varint type code followed by a payload:
//!
//! - a public key type code (ed25519, secp256k1, ...) followed by the key
//!   bytes, rendered as `did:key:z<base58btc of the whole byte sequence>`
//! - the generic DID code `0x0d1d` followed by the UTF-8 text after `did:`
//!
//! The set of codes is closed, so unknown codes are an error in both
//! directions.

use std::fmt;
use std::str::FromStr;

use cairn_multiformats::multibase::{Base58Btc, Multibase};
use cairn_multiformats::varint;
use serde::{Deserialize, Serialize};

use crate::error::DidError;

/// Ed25519 public key.
pub const ED25519_PUB: u64 = 0xed;
/// Secp256k1 compressed public key.
pub const SECP256K1_PUB: u64 = 0xe7;
/// BLS12-381 G1 public key.
pub const BLS12_381_G1_PUB: u64 = 0xea;
/// BLS12-381 G2 public key.
pub const BLS12_381_G2_PUB: u64 = 0xeb;
/// P-256 compressed public key.
pub const P256_PUB: u64 = 0x1200;
/// P-384 compressed public key.
pub const P384_PUB: u64 = 0x1201;
/// P-521 compressed public key.
pub const P521_PUB: u64 = 0x1202;
/// RSA public key (DER).
pub const RSA_PUB: u64 = 0x1205;
/// Any DID, carried as the UTF-8 text after `did:`.
pub const DID_CORE: u64 = 0x0d1d;

const KEY_CODES: [u64; 8] = [
    ED25519_PUB,
    SECP256K1_PUB,
    BLS12_381_G1_PUB,
    BLS12_381_G2_PUB,
    P256_PUB,
    P384_PUB,
    P521_PUB,
    RSA_PUB,
];

const DID_PREFIX: &str = "did:";
const DID_KEY_PREFIX: &str = "did:key:";

/// A [Decentralized Identifier][did-core] string.
///
/// Wraps a raw DID string like `did:key:z6Mk...` or `did:web:example.com`.
///
/// [did-core]: https://www.w3.org/TR/did-core/
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Did(String);

impl Did {
    /// Get the raw DID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method, e.g. `"key"` for `did:key:...`.
    #[must_use]
    pub fn method(&self) -> &str {
        self.0[DID_PREFIX.len()..]
            .split(':')
            .next()
            .unwrap_or_default()
    }

    /// The `did:key` of a public key with multicodec type `code`.
    #[must_use]
    pub fn key(code: u64, key: &[u8]) -> Self {
        let mut bytes = varint::encode(code);
        bytes.extend_from_slice(key);
        Did(format!("{DID_KEY_PREFIX}{}", Base58Btc.encode(&bytes)))
    }

    /// Decode the binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DidError> {
        decode(bytes)
    }

    /// Encode to the binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DidError> {
        parse(&self.0)
    }
}

/// Render the binary form of a DID as text.
pub fn decode(bytes: &[u8]) -> Result<Did, DidError> {
    let (code, length) = varint::decode(bytes, 0)?;
    if KEY_CODES.contains(&code) {
        return Ok(Did(format!("{DID_KEY_PREFIX}{}", Base58Btc.encode(bytes))));
    }
    if code == DID_CORE {
        let suffix = std::str::from_utf8(&bytes[length..]).map_err(|_| DidError::InvalidUtf8)?;
        return format!("{DID_PREFIX}{suffix}").parse();
    }
    Err(DidError::UnknownCode(code))
}

/// Convert DID text to its binary form.
pub fn parse(text: &str) -> Result<Vec<u8>, DidError> {
    if let Some(key) = text.strip_prefix(DID_KEY_PREFIX) {
        let bytes = Base58Btc.decode(key)?;
        let (code, _) = varint::decode(&bytes, 0)?;
        if !KEY_CODES.contains(&code) {
            return Err(DidError::UnknownCode(code));
        }
        return Ok(bytes);
    }

    let did: Did = text.parse()?;
    let suffix = &did.as_str()[DID_PREFIX.len()..];
    let mut bytes = varint::encode(DID_CORE);
    bytes.extend_from_slice(suffix.as_bytes());
    Ok(bytes)
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&Did> for Did {
    fn from(did: &Did) -> Self {
        did.clone()
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(DID_PREFIX)
            .ok_or_else(|| DidError::Malformed(format!("expected did: prefix, got: {s}")))?;
        match rest.split_once(':') {
            Some((method, id)) if !method.is_empty() && !id.is_empty() => Ok(Did(s.to_owned())),
            _ => Err(DidError::Malformed(format!(
                "expected did:method:identifier, got: {s}"
            ))),
        }
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Did {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "did:key:z6Mkk89bC3JrVqKie71YEcc5M1SMVxuCgNx6zLZ8SYJsxALi";

    #[test]
    fn key_dids_roundtrip_through_bytes() {
        let bytes = parse(ALICE).unwrap();
        assert_eq!(&bytes[..2], &[0xed, 0x01]);
        assert_eq!(bytes.len(), 34);
        assert_eq!(decode(&bytes).unwrap().as_str(), ALICE);
    }

    #[test]
    fn generic_dids_use_the_core_code() {
        let bytes = parse("did:web:example.com").unwrap();
        assert_eq!(&bytes[..2], &[0x9d, 0x1a]);
        assert_eq!(&bytes[2..], b"web:example.com");
        assert_eq!(decode(&bytes).unwrap().as_str(), "did:web:example.com");
        assert_eq!(decode(&bytes).unwrap().method(), "web");
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let mut bytes = varint::encode(0x99);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(decode(&bytes).unwrap_err(), DidError::UnknownCode(0x99));

        let did = format!("did:key:{}", Base58Btc.encode(&bytes));
        assert_eq!(parse(&did).unwrap_err(), DidError::UnknownCode(0x99));
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(matches!("key:abc".parse::<Did>(), Err(DidError::Malformed(_))));
        assert!(matches!("did:key".parse::<Did>(), Err(DidError::Malformed(_))));
        assert!(matches!(parse("did:key:abc"), Err(DidError::Multibase(_))));
    }

    #[test]
    fn key_builds_from_raw_key_bytes() {
        let bytes = parse(ALICE).unwrap();
        assert_eq!(Did::key(ED25519_PUB, &bytes[2..]).as_str(), ALICE);
    }

    #[test]
    fn it_serializes_as_a_string() {
        let did: Did = ALICE.parse().unwrap();
        assert_eq!(did.method(), "key");
        assert_eq!(did.to_bytes().unwrap(), parse(ALICE).unwrap());
        assert_eq!(Did::from_bytes(&did.to_bytes().unwrap()).unwrap(), did);
    }
}
