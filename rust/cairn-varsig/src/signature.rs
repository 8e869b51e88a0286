//! Signature trait, signing/verification seams and varsig framing.

pub mod signer;
pub mod verifier;

use std::fmt::Debug;

use ::signature::SignatureEncoding;
use cairn_common::{ConditionalSend, ConditionalSync};
use cairn_multiformats::varint;
pub use signer::Signer;
pub use verifier::Verifier;

use crate::algorithm::{SignatureAlgorithm, jwt_name};
use crate::error::VarsigError;

/// Cryptographic signature produced by `Signer` and verified by `Verifier`.
pub trait Signature: SignatureEncoding + Debug + ConditionalSend + ConditionalSync {
    /// The signature algorithm that produces this signature type.
    type Algorithm: SignatureAlgorithm + ConditionalSend + ConditionalSync;
}

/// Raw signature bytes tagged with the code of the algorithm that made them.
///
/// The binary form is `varint(code) ++ varint(length) ++ signature`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Varsig {
    code: u64,
    raw: Vec<u8>,
}

impl Varsig {
    /// Tag `raw` signature bytes with an algorithm code.
    pub fn new(code: u64, raw: Vec<u8>) -> Self {
        Self { code, raw }
    }

    /// Frame a typed signature.
    pub fn from_signature<S: Signature>(signature: &S) -> Self {
        Self {
            code: S::Algorithm::default().code(),
            raw: signature.to_vec(),
        }
    }

    /// Recover a typed signature, checking that the algorithm matches.
    pub fn to_signature<S: Signature>(&self) -> Result<S, VarsigError> {
        let expected = S::Algorithm::default().code();
        if self.code != expected {
            return Err(VarsigError::AlgorithmMismatch {
                expected,
                found: self.code,
            });
        }
        S::try_from(self.raw.as_slice()).map_err(|_| VarsigError::InvalidSignature)
    }

    /// Algorithm code.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// JWT `alg` name of the algorithm, when registered.
    pub fn jwt_name(&self) -> Option<&'static str> {
        jwt_name(self.code)
    }

    /// Raw signature bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Binary form.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            varint::encoding_length(self.code)
                + varint::encoding_length(self.raw.len() as u64)
                + self.raw.len(),
        );
        varint::write(&mut bytes, self.code);
        varint::write(&mut bytes, self.raw.len() as u64);
        bytes.extend_from_slice(&self.raw);
        bytes
    }

    /// Parse the binary form.
    pub fn decode(bytes: &[u8]) -> Result<Self, VarsigError> {
        let (code, code_length) = varint::decode(bytes, 0)?;
        let (declared, length_length) = varint::decode(bytes, code_length)?;
        let raw = &bytes[code_length + length_length..];
        if declared != raw.len() as u64 {
            return Err(VarsigError::LengthMismatch {
                declared,
                remaining: raw.len(),
            });
        }
        Ok(Self {
            code,
            raw: raw.to_vec(),
        })
    }
}
