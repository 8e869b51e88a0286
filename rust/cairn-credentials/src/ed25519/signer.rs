//! Seed-backed Ed25519 identities that sign tokens.

use cairn_varsig::{Did, Principal, Signer};
use serde::Serialize;

use super::error::Ed25519KeyError;
use super::verifier::Ed25519Verifier;
use super::Ed25519Signature;

/// Holds an Ed25519 secret key and signs as its `did:key`.
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    did: Ed25519Verifier,
    signer: ed25519_dalek::SigningKey,
}

impl From<ed25519_dalek::SigningKey> for Ed25519Signer {
    fn from(signer: ed25519_dalek::SigningKey) -> Self {
        let did = Ed25519Verifier::from(&signer);
        Self { did, signer }
    }
}

impl Ed25519Signer {
    /// Generate a new Ed25519 keypair from OS randomness.
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails.
    pub fn generate() -> Result<Self, Ed25519KeyError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed)?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed).into())
    }

    /// Import a keypair from its 32 byte seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed has the wrong length.
    pub fn import(seed: &[u8]) -> Result<Self, Ed25519KeyError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| Ed25519KeyError::InvalidSeedLength(seed.len()))?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed).into())
    }

    /// Export the 32 byte seed.
    #[must_use]
    pub fn export(&self) -> [u8; 32] {
        self.signer.to_bytes()
    }

    /// The public half, usable wherever a verifier is needed.
    #[must_use]
    pub const fn ed25519_did(&self) -> &Ed25519Verifier {
        &self.did
    }
}

impl std::fmt::Display for Ed25519Signer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.did, formatter)
    }
}

impl Signer<Ed25519Signature> for Ed25519Signer {
    async fn sign(&self, payload: &[u8]) -> Result<Ed25519Signature, signature::Error> {
        use signature::Signer as _;
        self.signer.try_sign(payload).map(Ed25519Signature::from)
    }
}

impl Principal for Ed25519Signer {
    fn did(&self) -> Did {
        self.did.did()
    }
}

impl Serialize for Ed25519Signer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.did.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_varsig::Verifier;
    use testresult::TestResult;

    fn test_signer(seed: u8) -> Ed25519Signer {
        Ed25519Signer::import(&[seed; 32]).unwrap()
    }

    #[tokio::test]
    async fn its_own_verifier_accepts_its_signatures() -> TestResult {
        let signer = test_signer(42);
        let input = b"header.payload";

        let signature = signer.sign(input).await?;
        signer.ed25519_did().verify(input, &signature).await?;
        Ok(())
    }

    #[tokio::test]
    async fn signatures_do_not_cover_other_inputs() -> TestResult {
        let signer = test_signer(7);
        let signature = signer.sign(b"first message").await?;
        assert!(
            signer
                .ed25519_did()
                .verify(b"second message", &signature)
                .await
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn export_returns_the_seed() {
        let signer = test_signer(9);
        assert_eq!(signer.export(), [9u8; 32]);
        assert_eq!(Ed25519Signer::import(&signer.export()).unwrap().did(), signer.did());
    }

    #[test]
    fn import_rejects_short_seeds() {
        assert!(matches!(
            Ed25519Signer::import(&[0u8; 16]),
            Err(Ed25519KeyError::InvalidSeedLength(16))
        ));
    }

    #[test]
    fn generated_signers_differ() -> TestResult {
        let a = Ed25519Signer::generate()?;
        let b = Ed25519Signer::generate()?;
        assert_ne!(a.did(), b.did());
        Ok(())
    }
}
