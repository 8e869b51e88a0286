#![warn(missing_docs)]

//! UCAN 0.9 authorization for content-addressed storage clients.
//!
//! - [`capability`]: what may be done, to which resource
//! - [`ucan`]: the signed token, its canonical object form and the JWT-shaped
//!   input its signature covers
//! - [`delegation`]: grants, their archive and text forms, and a
//!   [`DelegationStore`] to pick proofs from
//! - [`invocation`] and [`message`]: signing requests and packing them with
//!   their proofs into one archive
//! - [`verify`]: checking signatures, validity windows and proof chains

pub mod capability;
pub mod delegation;
pub mod error;
pub mod invocation;
pub mod message;
pub mod settings;
pub mod time;
pub mod token;
pub mod ucan;
pub mod verify;

pub use capability::Capability;
pub use delegation::{Delegation, DelegationBuilder, DelegationStore, ProofToken};
pub use error::{ErrorKind, UcanError};
pub use invocation::{Invocation, InvocationBuilder};
pub use message::AgentMessage;
pub use settings::Settings;
pub use time::{TimeRange, Timestamp, Validity};
pub use ucan::{Payload, Ucan};
pub use verify::{Authorization, verify_invocation, verify_signature};
