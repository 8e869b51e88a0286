//! Single-line text envelope for small archives.
//!
//! The archive bytes become the digest of an identity multihash inside a
//! CIDv1 with the archive content type, rendered in standard base64
//! multibase (`m` prefix).

use cairn_multiformats::codec::CAR;
use cairn_multiformats::multibase::Base64;
use cairn_multiformats::multihash::IDENTITY;
use cairn_multiformats::{Cid, Multibase, Multihash};

use crate::error::UcanError;

/// Wrap archive bytes as a text token.
pub fn format(archive: &[u8]) -> String {
    let cid = Cid::new_v1(CAR, Multihash::create(IDENTITY, archive));
    Base64.encode(cid.as_bytes())
}

/// Unwrap a text token into archive bytes.
///
/// # Errors
///
/// Malformed multibase or CID text, a content type other than the archive
/// type ([`UcanError::NotAnArchive`]), or a hashed rather than inline digest
/// ([`UcanError::NotInline`]).
pub fn parse(text: &str) -> Result<Vec<u8>, UcanError> {
    let cid = Cid::parse(text.trim())?;
    if cid.code() != CAR {
        return Err(UcanError::NotAnArchive(cid.code()));
    }
    let multihash = cid.multihash();
    if multihash.code() != IDENTITY {
        return Err(UcanError::NotInline(multihash.code()));
    }
    Ok(multihash.digest().to_vec())
}
