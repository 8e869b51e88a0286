//! Concrete key and signing types for cairn identities.
//!
//! Implementations:
//! - **Ed25519** `did:key` (enabled by the `ed25519` feature, on by default)

#[cfg(feature = "ed25519")]
pub mod ed25519;
#[cfg(feature = "ed25519")]
pub use ed25519::*;
