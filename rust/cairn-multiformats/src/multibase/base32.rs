use super::Multibase;
use crate::error::MultibaseError;

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// RFC 4648 base32 in lower case without padding, prefix `b`.
///
/// Decoding accepts upper case letters and ignores trailing `=` padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base32Lower;

impl Multibase for Base32Lower {
    fn name(&self) -> &'static str {
        "base32"
    }

    fn prefix(&self) -> char {
        'b'
    }

    fn base_encode(&self, bytes: &[u8]) -> String {
        let mut text = String::with_capacity((bytes.len() * 8).div_ceil(5));
        let mut buffer: u16 = 0;
        let mut bits = 0u32;

        for byte in bytes {
            buffer = (buffer << 8) | u16::from(*byte);
            bits += 8;
            while bits >= 5 {
                bits -= 5;
                text.push(ALPHABET[usize::from((buffer >> bits) & 0x1f)] as char);
            }
            buffer &= (1 << bits) - 1;
        }

        if bits > 0 {
            text.push(ALPHABET[usize::from((buffer << (5 - bits)) & 0x1f)] as char);
        }

        text
    }

    fn base_decode(&self, text: &str) -> Result<Vec<u8>, MultibaseError> {
        let payload = text.trim_end_matches('=');
        let mut bytes = Vec::with_capacity(payload.len() * 5 / 8);
        let mut buffer: u16 = 0;
        let mut bits = 0u32;

        for (position, character) in payload.chars().enumerate() {
            let value = match character.to_ascii_lowercase() {
                letter @ 'a'..='z' => letter as u16 - 'a' as u16,
                digit @ '2'..='7' => digit as u16 - '2' as u16 + 26,
                _ => {
                    return Err(MultibaseError::InvalidCharacter {
                        base: self.name(),
                        character,
                        position,
                    });
                }
            };
            buffer = (buffer << 5) | value;
            bits += 5;
            if bits >= 8 {
                bits -= 8;
                bytes.push((buffer >> bits) as u8);
                buffer &= (1 << bits) - 1;
            }
        }

        // A complete encoding leaves fewer than 5 zero bits behind.
        if bits >= 5 || buffer != 0 {
            return Err(MultibaseError::InvalidLength { base: self.name() });
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_matches_rfc4648_vectors() {
        let vectors: [(&[u8], &str); 7] = [
            (b"", ""),
            (b"f", "my"),
            (b"fo", "mzxq"),
            (b"foo", "mzxw6"),
            (b"foob", "mzxw6yq"),
            (b"fooba", "mzxw6ytb"),
            (b"foobar", "mzxw6ytboi"),
        ];
        for (bytes, text) in vectors {
            assert_eq!(Base32Lower.base_encode(bytes), text);
            assert_eq!(Base32Lower.base_decode(text).unwrap(), bytes);
        }
    }

    #[test]
    fn it_tolerates_padding_and_upper_case() {
        assert_eq!(Base32Lower.base_decode("MZXW6YQ=").unwrap(), b"foob");
    }

    #[test]
    fn it_rejects_impossible_lengths() {
        assert_eq!(
            Base32Lower.base_decode("m").unwrap_err(),
            MultibaseError::InvalidLength { base: "base32" }
        );
    }

    #[test]
    fn it_rejects_characters_outside_the_alphabet() {
        assert_eq!(
            Base32Lower.base_decode("mz1").unwrap_err(),
            MultibaseError::InvalidCharacter {
                base: "base32",
                character: '1',
                position: 2
            }
        );
    }
}
