use base58::{FromBase58, FromBase58Error, ToBase58};

use super::Multibase;
use crate::error::MultibaseError;

/// Base58 with the Bitcoin alphabet, prefix `z`.
///
/// Leading zero bytes map one-to-one onto leading `1` characters, so all-zero
/// inputs round-trip exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base58Btc;

impl Multibase for Base58Btc {
    fn name(&self) -> &'static str {
        "base58btc"
    }

    fn prefix(&self) -> char {
        'z'
    }

    fn base_encode(&self, bytes: &[u8]) -> String {
        bytes.to_base58()
    }

    fn base_decode(&self, text: &str) -> Result<Vec<u8>, MultibaseError> {
        text.from_base58().map_err(|error| match error {
            FromBase58Error::InvalidBase58Character(character, position) => {
                MultibaseError::InvalidCharacter {
                    base: self.name(),
                    character,
                    position,
                }
            }
            FromBase58Error::InvalidBase58Length => {
                MultibaseError::InvalidLength { base: self.name() }
            }
        })
    }
}
