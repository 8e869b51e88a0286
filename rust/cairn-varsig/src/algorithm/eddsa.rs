//! Ed25519 signatures.

use signature::SignatureEncoding;

use super::{EDDSA, SignatureAlgorithm};
use crate::signature::Signature;

/// The EdDSA algorithm over Curve25519.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ed25519;

impl SignatureAlgorithm for Ed25519 {
    fn code(&self) -> u64 {
        EDDSA
    }

    fn jwt_name(&self) -> &'static str {
        "EdDSA"
    }
}

/// A 64 byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Wrap raw signature bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Raw signature bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

impl Signature for Ed25519Signature {
    type Algorithm = Ed25519;
}

impl SignatureEncoding for Ed25519Signature {
    type Repr = [u8; 64];
}

impl TryFrom<&[u8]> for Ed25519Signature {
    type Error = signature::Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 64]>::try_from(bytes)
            .map(Self)
            .map_err(|_| signature::Error::new())
    }
}

impl From<Ed25519Signature> for [u8; 64] {
    fn from(signature: Ed25519Signature) -> Self {
        signature.0
    }
}

impl From<ed25519_dalek::Signature> for Ed25519Signature {
    fn from(signature: ed25519_dalek::Signature) -> Self {
        Self(signature.to_bytes())
    }
}

impl From<Ed25519Signature> for ed25519_dalek::Signature {
    fn from(signature: Ed25519Signature) -> Self {
        ed25519_dalek::Signature::from_bytes(&signature.0)
    }
}
