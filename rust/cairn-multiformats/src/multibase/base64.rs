use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::Multibase;
use crate::error::MultibaseError;

const UNPADDED: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, UNPADDED);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, UNPADDED);

/// URL-safe base64 without padding, prefix `u`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64Url;

/// Standard-alphabet base64 without padding, prefix `m`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64;

fn decode_with(
    engine: &GeneralPurpose,
    base: &'static str,
    text: &str,
) -> Result<Vec<u8>, MultibaseError> {
    engine.decode(text).map_err(|error| match error {
        base64::DecodeError::InvalidByte(position, byte) => MultibaseError::InvalidCharacter {
            base,
            character: char::from(byte),
            position,
        },
        _ => MultibaseError::InvalidLength { base },
    })
}

impl Multibase for Base64Url {
    fn name(&self) -> &'static str {
        "base64url"
    }

    fn prefix(&self) -> char {
        'u'
    }

    fn base_encode(&self, bytes: &[u8]) -> String {
        URL_SAFE.encode(bytes)
    }

    fn base_decode(&self, text: &str) -> Result<Vec<u8>, MultibaseError> {
        decode_with(&URL_SAFE, self.name(), text)
    }
}

impl Multibase for Base64 {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn prefix(&self) -> char {
        'm'
    }

    fn base_encode(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn base_decode(&self, text: &str) -> Result<Vec<u8>, MultibaseError> {
        decode_with(&STANDARD, self.name(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_alphabet_never_emits_reserved_characters() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = Base64Url.base_encode(&bytes);
        assert!(!text.contains(['=', '+', '/']));
        assert_eq!(Base64Url.base_decode(&text).unwrap(), bytes);
    }

    #[test]
    fn standard_alphabet_differs_from_url_alphabet() {
        let bytes = [0xfb, 0xff];
        assert_eq!(Base64.base_encode(&bytes), "+/8");
        assert_eq!(Base64Url.base_encode(&bytes), "-_8");
    }

    #[test]
    fn it_accepts_padded_input() {
        assert_eq!(Base64.base_decode("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn it_reports_the_offending_character() {
        assert_eq!(
            Base64Url.base_decode("ab+d").unwrap_err(),
            MultibaseError::InvalidCharacter {
                base: "base64url",
                character: '+',
                position: 2
            }
        );
    }
}
