//! Ed25519 `did:key` signer, verifier and resolver.

mod error;
mod resolver;
mod signer;
mod verifier;

pub use error::{Ed25519DidError, Ed25519KeyError, Ed25519ResolveError};
pub use resolver::Ed25519KeyResolver;
pub use signer::Ed25519Signer;
pub use verifier::Ed25519Verifier;

pub use cairn_varsig::eddsa::{Ed25519, Ed25519Signature};
