#![warn(missing_docs)]

//! Light weight helpers shared across the cairn crates. They carry virtually
//! no dependencies of their own.

mod sync;
pub use sync::*;

pub mod time;
