//! Error types for UCAN issuance, decoding and verification.

use cairn_archive::ArchiveError;
use cairn_encoding::EncodingError;
use cairn_multiformats::{Cid, CidError, MultibaseError};
use cairn_varsig::{Did, DidError, VarsigError};
use thiserror::Error;

use crate::time::Timestamp;

/// Coarse classification of a [`UcanError`].
///
/// Callers use it to tell corrupt bytes apart from a token that is merely
/// stale or insufficient, which calls for a fresh delegation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input bytes or text cannot be decoded.
    Malformed,
    /// The input decoded but violates a structural invariant, or an
    /// operation was attempted in a state that does not allow it.
    Structural,
    /// The token is well formed but does not authorize the request.
    Unauthorized,
}

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum UcanError {
    /// A CID failed to decode.
    #[error(transparent)]
    Cid(#[from] CidError),

    /// Multibase text failed to decode.
    #[error(transparent)]
    Multibase(#[from] MultibaseError),

    /// A canonical object failed to encode or decode.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// An archive failed to encode or decode.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A DID failed to parse.
    #[error(transparent)]
    Did(#[from] DidError),

    /// A signature frame failed to decode.
    #[error(transparent)]
    Varsig(#[from] VarsigError),

    /// The signing payload could not be rendered as JSON.
    #[error("cannot render signing payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field has the wrong shape.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A versioned key names a version this crate does not speak.
    #[error("unsupported version `{0}`")]
    UnsupportedVersion(String),

    /// A signature algorithm has no registered JWT name.
    #[error("signature code {0:#x} has no JWT name")]
    UnknownAlgorithm(u64),

    /// A delegation token is not an identity CID.
    #[error("token multihash {0:#x} is not the identity hash")]
    NotInline(u64),

    /// A delegation token does not wrap an archive.
    #[error("token content type {0:#x} is not an archive")]
    NotAnArchive(u64),

    /// A token was built with no capabilities.
    #[error("no capabilities were added")]
    NoCapabilities,

    /// A token was built with no audience.
    #[error("no audience was set")]
    NoAudience,

    /// A block referenced by a message root is absent.
    #[error("block {0} is missing")]
    MissingBlock(Cid),

    /// A proof cites itself, directly or through the proofs it cites.
    #[error("proof {0} cites itself")]
    ProofCycle(Cid),

    /// Proofs are nested deeper than a received archive may go.
    #[error("proofs under {cid} nest deeper than {limit}")]
    ProofTooDeep {
        /// The token whose proofs were not resolved.
        cid: Cid,
        /// The depth limit.
        limit: usize,
    },

    /// The signer failed.
    #[error("signer failed: {0}")]
    Signer(#[source] signature::Error),

    /// The issuer DID could not be resolved to a verifier.
    #[error("cannot resolve {did}: {reason}")]
    Resolve {
        /// The issuer.
        did: Did,
        /// Resolver error text.
        reason: String,
    },

    /// The signature does not verify against the issuer key.
    #[error("signature of {cid} does not verify against {issuer}")]
    InvalidSignature {
        /// The token.
        cid: Cid,
        /// Its issuer.
        issuer: Did,
    },

    /// The token expiration has passed.
    #[error("{cid} expired at {expiration}")]
    Expired {
        /// The token.
        cid: Cid,
        /// Its expiration.
        expiration: Timestamp,
    },

    /// The token is not valid yet.
    #[error("{cid} is not valid before {not_before}")]
    NotYetValid {
        /// The token.
        cid: Cid,
        /// Its not-before time.
        not_before: Timestamp,
    },

    /// A proof is addressed to someone other than the token that cites it.
    #[error("proof {cid} is addressed to {found}, expected {expected}")]
    AudienceMismatch {
        /// The proof.
        cid: Cid,
        /// Issuer of the citing token.
        expected: Did,
        /// Audience of the proof.
        found: Did,
    },

    /// No proof chain grants the invoked capability.
    #[error("`{can}` on `{with}` is not granted")]
    NotGranted {
        /// Ability.
        can: String,
        /// Resource.
        with: String,
    },
}

impl UcanError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cid(_)
            | Self::Multibase(_)
            | Self::Encoding(_)
            | Self::Did(_)
            | Self::Varsig(_)
            | Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::UnsupportedVersion(_)
            | Self::UnknownAlgorithm(_)
            | Self::NotInline(_)
            | Self::NotAnArchive(_)
            | Self::ProofCycle(_)
            | Self::ProofTooDeep { .. } => ErrorKind::Malformed,

            Self::Archive(error) => match error {
                ArchiveError::NoRoots | ArchiveError::MissingBlock(_) => ErrorKind::Structural,
                _ => ErrorKind::Malformed,
            },

            Self::Json(_)
            | Self::NoCapabilities
            | Self::NoAudience
            | Self::MissingBlock(_)
            | Self::Signer(_) => ErrorKind::Structural,

            Self::Resolve { .. }
            | Self::InvalidSignature { .. }
            | Self::Expired { .. }
            | Self::NotYetValid { .. }
            | Self::AudienceMismatch { .. }
            | Self::NotGranted { .. } => ErrorKind::Unauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_multiformats::codec::RAW;

    #[test]
    fn it_separates_corrupt_input_from_stale_tokens() {
        let cid = Cid::of(RAW, b"token");

        assert_eq!(
            UcanError::from(CidError::UnknownVersion(7)).kind(),
            ErrorKind::Malformed
        );
        assert_eq!(
            UcanError::from(ArchiveError::EmptyBlock { offset: 3 }).kind(),
            ErrorKind::Malformed
        );
        assert_eq!(
            UcanError::from(ArchiveError::NoRoots).kind(),
            ErrorKind::Structural
        );
        assert_eq!(UcanError::NoCapabilities.kind(), ErrorKind::Structural);
        assert_eq!(
            UcanError::Expired {
                cid,
                expiration: Timestamp::from_unix(10),
            }
            .kind(),
            ErrorKind::Unauthorized
        );
    }
}
