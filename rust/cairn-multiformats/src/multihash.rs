//! Self-describing digests.
//!
//! A multihash is `varint(code) ++ varint(size) ++ digest`. The identity code
//! stores its input verbatim, which lets small payloads (such as an embedded
//! archive) travel inside a content identifier.

use std::fmt;

use sha2::Digest as _;

use crate::error::MultihashError;
use crate::varint;

/// Identity "hash": the digest is the input itself.
pub const IDENTITY: u64 = 0x00;
/// SHA2-256.
pub const SHA2_256: u64 = 0x12;
/// SHA2-512.
pub const SHA2_512: u64 = 0x13;

/// A digest tagged with the code of the function that produced it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multihash {
    code: u64,
    digest_offset: usize,
    bytes: Vec<u8>,
}

impl Multihash {
    /// Wrap `digest` as produced by hash function `code`.
    pub fn create(code: u64, digest: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(
            varint::encoding_length(code) + varint::encoding_length(digest.len() as u64) + digest.len(),
        );
        varint::write(&mut bytes, code);
        varint::write(&mut bytes, digest.len() as u64);
        let digest_offset = bytes.len();
        bytes.extend_from_slice(digest);
        Self {
            code,
            digest_offset,
            bytes,
        }
    }

    /// Decode a multihash that spans all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, MultihashError> {
        let (code, code_length) = varint::decode(bytes, 0)?;
        let (size, size_length) = varint::decode(bytes, code_length)?;
        let digest_offset = code_length + size_length;
        let remaining = bytes.len() - digest_offset;
        if size != remaining as u64 {
            return Err(MultihashError::SizeMismatch {
                declared: size,
                remaining,
            });
        }
        Ok(Self {
            code,
            digest_offset,
            bytes: bytes.to_vec(),
        })
    }

    /// Decode the multihash at the start of `bytes` and return it together
    /// with the bytes that follow it.
    pub fn decode_first(bytes: &[u8]) -> Result<(Self, &[u8]), MultihashError> {
        let (code, code_length) = varint::decode(bytes, 0)?;
        let (size, size_length) = varint::decode(bytes, code_length)?;
        let digest_offset = code_length + size_length;
        let remaining = bytes.len() - digest_offset;
        let end = usize::try_from(size)
            .ok()
            .filter(|size| *size <= remaining)
            .map(|size| digest_offset + size)
            .ok_or(MultihashError::SizeMismatch {
                declared: size,
                remaining,
            })?;
        Ok((
            Self {
                code,
                digest_offset,
                bytes: bytes[..end].to_vec(),
            },
            &bytes[end..],
        ))
    }

    /// Code of the hash function.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// Length of the digest in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len() - self.digest_offset
    }

    /// The raw digest.
    pub fn digest(&self) -> &[u8] {
        &self.bytes[self.digest_offset..]
    }

    /// The canonical `code ++ size ++ digest` encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the multihash, returning its canonical encoding.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Is this the digest of `data`?
    ///
    /// `None` when the hash function is not one of the built-in [`hasher`]s.
    /// Truncated digests match on their prefix.
    pub fn matches(&self, data: &[u8]) -> Option<bool> {
        if self.code == IDENTITY {
            return Some(self.digest() == data);
        }
        let digest = hasher(self.code)?.hash(data);
        Some(digest.get(..self.size()) == Some(self.digest()))
    }
}

impl fmt::Debug for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multihash")
            .field("code", &format_args!("{:#x}", self.code))
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

impl AsRef<[u8]> for Multihash {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A hash function that produces [`Multihash`] digests.
pub trait Hasher: Send + Sync {
    /// Conventional name, e.g. `sha2-256`.
    fn name(&self) -> &'static str;

    /// Multihash code of the function.
    fn code(&self) -> u64;

    /// Shortest digest a caller may truncate to.
    fn min_digest_length(&self) -> usize {
        20
    }

    /// Length of an untruncated digest.
    fn max_digest_length(&self) -> usize;

    /// Compute the untruncated digest of `input`.
    fn hash(&self, input: &[u8]) -> Vec<u8>;

    /// Hash `input`, optionally truncating the digest to `truncate` bytes.
    fn digest(&self, input: &[u8], truncate: Option<usize>) -> Result<Multihash, MultihashError> {
        let mut digest = self.hash(input);
        if let Some(length) = truncate {
            let (min, max) = (self.min_digest_length(), self.max_digest_length());
            if length < min || length > max {
                return Err(MultihashError::InvalidTruncation {
                    hasher: self.name(),
                    requested: length,
                    min,
                    max,
                });
            }
            digest.truncate(length);
        }
        Ok(Multihash::create(self.code(), &digest))
    }
}

/// The built-in hash function registered under `code`.
pub fn hasher(code: u64) -> Option<&'static dyn Hasher> {
    match code {
        IDENTITY => Some(&Identity),
        SHA2_256 => Some(&Sha256),
        SHA2_512 => Some(&Sha512),
        _ => None,
    }
}

/// Wraps its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Hasher for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn code(&self) -> u64 {
        IDENTITY
    }

    fn min_digest_length(&self) -> usize {
        0
    }

    fn max_digest_length(&self) -> usize {
        usize::MAX
    }

    fn hash(&self, input: &[u8]) -> Vec<u8> {
        input.to_vec()
    }
}

/// SHA2-256, 32 byte digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

impl Hasher for Sha256 {
    fn name(&self) -> &'static str {
        "sha2-256"
    }

    fn code(&self) -> u64 {
        SHA2_256
    }

    fn max_digest_length(&self) -> usize {
        32
    }

    fn hash(&self, input: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(input).to_vec()
    }
}

/// SHA2-512, 64 byte digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512;

impl Hasher for Sha512 {
    fn name(&self) -> &'static str {
        "sha2-512"
    }

    fn code(&self) -> u64 {
        SHA2_512
    }

    fn max_digest_length(&self) -> usize {
        64
    }

    fn hash(&self, input: &[u8]) -> Vec<u8> {
        sha2::Sha512::digest(input).to_vec()
    }
}
