//! Ed25519 DID principal and verifier.

use std::str::FromStr;

use cairn_multiformats::varint;
use cairn_varsig::did::{self, ED25519_PUB};
use cairn_varsig::{Did, DidError, Principal, Verifier};
use serde::{Deserialize, Deserializer, Serialize};

use super::Ed25519Signature;
use super::error::Ed25519DidError;

/// An `Ed25519` `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Verifier(pub ed25519_dalek::VerifyingKey);

impl Ed25519Verifier {
    /// Raw public key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl From<ed25519_dalek::VerifyingKey> for Ed25519Verifier {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        Ed25519Verifier(key)
    }
}

impl From<&ed25519_dalek::SigningKey> for Ed25519Verifier {
    fn from(key: &ed25519_dalek::SigningKey) -> Self {
        Ed25519Verifier(key.verifying_key())
    }
}

impl std::fmt::Display for Ed25519Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.did().as_str())
    }
}

impl FromStr for Ed25519Verifier {
    type Err = Ed25519DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("did:key:") {
            return Err(DidError::Malformed(format!("expected did:key, got: {s}")).into());
        }
        let bytes = did::parse(s)?;
        let (code, length) = varint::decode(&bytes, 0).map_err(DidError::from)?;
        if code != ED25519_PUB {
            return Err(Ed25519DidError::NotEd25519(code));
        }
        let key = <[u8; 32]>::try_from(&bytes[length..]).map_err(|_| Ed25519DidError::InvalidKey)?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(&key)
            .map_err(|_| Ed25519DidError::InvalidKey)?;
        Ok(Ed25519Verifier(key))
    }
}

impl TryFrom<&Did> for Ed25519Verifier {
    type Error = Ed25519DidError;

    fn try_from(did: &Did) -> Result<Self, Self::Error> {
        did.as_str().parse()
    }
}

impl Verifier<Ed25519Signature> for Ed25519Verifier {
    async fn verify(
        &self,
        msg: &[u8],
        signature: &Ed25519Signature,
    ) -> Result<(), signature::Error> {
        use signature::Verifier as _;
        self.0
            .verify(msg, &ed25519_dalek::Signature::from(*signature))
    }
}

impl Principal for Ed25519Verifier {
    fn did(&self) -> Did {
        Did::key(ED25519_PUB, self.0.as_bytes())
    }
}

impl Serialize for Ed25519Verifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ed25519Verifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
