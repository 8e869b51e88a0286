//! Signature algorithms and their multicodec codes.

#[cfg(feature = "ed25519")]
pub mod eddsa;

use std::fmt::Debug;

/// EdDSA over Curve25519.
pub const EDDSA: u64 = 0xd0ed;
/// ECDSA over secp256k1 with SHA-256.
pub const ES256K: u64 = 0xd0e7;
/// BLS12-381 signatures in G1.
pub const BLS12381G1: u64 = 0xd0ea;
/// BLS12-381 signatures in G2.
pub const BLS12381G2: u64 = 0xd0eb;
/// ECDSA over P-256 with SHA-256.
pub const ES256: u64 = 0xd0_1200;
/// ECDSA over P-384 with SHA-384.
pub const ES384: u64 = 0xd0_1201;
/// ECDSA over P-521 with SHA-512.
pub const ES512: u64 = 0xd0_1202;
/// RSASSA-PKCS1-v1_5 with SHA-256.
pub const RS256: u64 = 0xd0_1205;
/// Ethereum personal-message signatures.
pub const EIP191: u64 = 0xd1_91;

/// JWT `alg` name registered for a signature code.
pub fn jwt_name(code: u64) -> Option<&'static str> {
    Some(match code {
        EDDSA => "EdDSA",
        ES256K => "ES256K",
        BLS12381G1 => "BLS12381G1",
        BLS12381G2 => "BLS12381G2",
        ES256 => "ES256",
        ES384 => "ES384",
        ES512 => "ES512",
        RS256 => "RS256",
        EIP191 => "EIP191",
        _ => return None,
    })
}

/// Signature code registered for a JWT `alg` name.
pub fn code_of(jwt_name: &str) -> Option<u64> {
    [
        EDDSA, ES256K, BLS12381G1, BLS12381G2, ES256, ES384, ES512, RS256, EIP191,
    ]
    .into_iter()
    .find(|code| self::jwt_name(*code) == Some(jwt_name))
}

/// A signature algorithm, identified by its multicodec code.
pub trait SignatureAlgorithm: Debug + Default + Clone + Copy + PartialEq + Eq {
    /// Multicodec code that prefixes signatures made with this algorithm.
    fn code(&self) -> u64;

    /// The JWT `alg` name.
    fn jwt_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_codes_agree() {
        assert_eq!(jwt_name(EDDSA), Some("EdDSA"));
        assert_eq!(code_of("EdDSA"), Some(EDDSA));
        assert_eq!(code_of("RS256"), Some(RS256));
        assert_eq!(jwt_name(0x1234), None);
        assert_eq!(code_of("none"), None);
    }
}
