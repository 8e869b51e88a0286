//! DID-to-verifier resolution.

use std::future::Future;

use crate::did::Did;
use crate::signature::{Signature, Verifier};

/// Resolves a DID to a [`Verifier`] for signature type `S`.
///
/// Async so that network-backed DID methods can sit next to `did:key`,
/// which resolves from the identifier alone.
pub trait Resolver<S: Signature> {
    /// Error type for resolution failures.
    type Error: std::error::Error;

    /// Resolve `did` to a verifier for signature type `S`.
    fn resolve(&self, did: &Did) -> impl Future<Output = Result<impl Verifier<S>, Self::Error>>;
}
