//! Prefixed text encodings of binary data.
//!
//! A multibase string is a single prefix character naming the alphabet,
//! followed by the payload encoded in that alphabet. [`decode`] dispatches on
//! the prefix through a static registry of the supported codecs.

mod base32;
mod base58;
mod base64;

pub use base32::Base32Lower;
pub use base58::Base58Btc;
pub use base64::{Base64, Base64Url};

use crate::error::MultibaseError;

/// A text encoding identified by a one character prefix.
pub trait Multibase: Send + Sync {
    /// Conventional name of the encoding, e.g. `base58btc`.
    fn name(&self) -> &'static str;

    /// Prefix character that identifies the encoding.
    fn prefix(&self) -> char;

    /// Encode `bytes` without the prefix.
    fn base_encode(&self, bytes: &[u8]) -> String;

    /// Decode an un-prefixed payload.
    fn base_decode(&self, text: &str) -> Result<Vec<u8>, MultibaseError>;

    /// Encode `bytes` and prepend the prefix.
    fn encode(&self, bytes: &[u8]) -> String {
        let payload = self.base_encode(bytes);
        let mut text = String::with_capacity(payload.len() + 1);
        text.push(self.prefix());
        text.push_str(&payload);
        text
    }

    /// Check the prefix of `text` and decode the payload after it.
    fn decode(&self, text: &str) -> Result<Vec<u8>, MultibaseError> {
        let mut chars = text.chars();
        let found = chars.next().ok_or(MultibaseError::Empty)?;
        if found != self.prefix() {
            return Err(MultibaseError::PrefixMismatch {
                base: self.name(),
                expected: self.prefix(),
                found,
            });
        }
        self.base_decode(chars.as_str())
    }
}

static REGISTRY: [&dyn Multibase; 4] = [&Base58Btc, &Base32Lower, &Base64Url, &Base64];

/// Look up the codec registered for `prefix`.
pub fn codec_for(prefix: char) -> Option<&'static dyn Multibase> {
    REGISTRY
        .iter()
        .copied()
        .find(|codec| codec.prefix() == prefix)
}

/// Decode multibase `text` with whichever codec its prefix names.
///
/// Returns the codec alongside the bytes so callers can re-encode in the
/// same base.
pub fn decode(text: &str) -> Result<(&'static dyn Multibase, Vec<u8>), MultibaseError> {
    let prefix = text.chars().next().ok_or(MultibaseError::Empty)?;
    let codec = codec_for(prefix).ok_or(MultibaseError::UnknownPrefix(prefix))?;
    Ok((codec, codec.base_decode(&text[prefix.len_utf8()..])?))
}

/// Encode `bytes` with `base`, prefix included.
pub fn encode(base: &dyn Multibase, bytes: &[u8]) -> String {
    base.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_dispatches_on_the_prefix() {
        let bytes = b"yes mani !";
        for codec in REGISTRY {
            let text = encode(codec, bytes);
            assert!(text.starts_with(codec.prefix()));
            let (found, decoded) = decode(&text).unwrap();
            assert_eq!(found.name(), codec.name());
            assert_eq!(decoded, bytes);
        }
    }

    #[test]
    fn it_matches_reference_vectors() {
        let bytes = b"yes mani !";
        assert_eq!(Base58Btc.encode(bytes), "z7paNL19xttacUY");
        assert_eq!(Base32Lower.encode(bytes), "bpfsxgidnmfxgsibb");
        assert_eq!(Base64Url.encode(bytes), "ueWVzIG1hbmkgIQ");
        assert_eq!(Base64.encode(bytes), "meWVzIG1hbmkgIQ");
    }

    #[test]
    fn it_rejects_empty_and_unknown_input() {
        assert_eq!(decode("").unwrap_err(), MultibaseError::Empty);
        assert_eq!(decode("Xabc").unwrap_err(), MultibaseError::UnknownPrefix('X'));
    }

    #[test]
    fn it_rejects_a_foreign_prefix_on_a_specific_codec() {
        assert_eq!(
            Base58Btc.decode("bafy").unwrap_err(),
            MultibaseError::PrefixMismatch {
                base: "base58btc",
                expected: 'z',
                found: 'b'
            }
        );
    }

    #[test]
    fn it_encodes_empty_input_as_the_bare_prefix() {
        for codec in REGISTRY {
            assert_eq!(codec.encode(&[]), codec.prefix().to_string());
            assert_eq!(codec.decode(&codec.prefix().to_string()).unwrap(), vec![]);
        }
    }
}
