//! Failures while loading, parsing or resolving Ed25519 identities.

use cairn_varsig::DidError;
use thiserror::Error;

/// Errors from creating an [`Ed25519Signer`](super::Ed25519Signer).
#[derive(Debug, Error)]
pub enum Ed25519KeyError {
    /// Seeds are exactly 32 bytes.
    #[error("expected 32 seed bytes, got {0}")]
    InvalidSeedLength(usize),

    /// Random number generation failed.
    #[error("RNG error: {0}")]
    Rng(#[from] getrandom::Error),
}

/// Errors from parsing an [`Ed25519Verifier`](super::Ed25519Verifier) from a DID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ed25519DidError {
    /// The text is not a `did:key`.
    #[error(transparent)]
    Did(#[from] DidError),

    /// The DID names a key of another type.
    #[error("expected an ed25519 key, found key type {0:#x}")]
    NotEd25519(u64),

    /// The key bytes are not a valid Ed25519 point.
    #[error("invalid ed25519 key bytes")]
    InvalidKey,
}

/// Why a DID could not be turned into an Ed25519 verifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ed25519ResolveError {
    /// The DID is not an Ed25519 `did:key`.
    #[error("cannot resolve {0}")]
    InvalidDid(#[from] Ed25519DidError),
}
