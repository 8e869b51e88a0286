//! Identities and signatures.
//!
//! - [`did`]: the [`Did`] string type and its compact binary form
//! - [`algorithm`]: signature algorithm codes and their JWT names
//! - [`signature`]: the [`Signature`] trait, async [`Signer`]/[`Verifier`]
//!   seams and [`Varsig`] framing of raw signature bytes
//! - [`resolver`]: turning a DID into a verifier

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod algorithm;
pub mod did;
pub mod error;
pub mod principal;
pub mod resolver;
pub mod signature;

pub use algorithm::*;
pub use did::Did;
pub use error::*;
pub use principal::*;
pub use resolver::*;
pub use signature::*;
