//! Ed25519 DID key resolver.

use cairn_varsig::{Did, Resolver, Verifier};

use super::error::Ed25519ResolveError;
use super::verifier::Ed25519Verifier;
use super::Ed25519Signature;

/// Resolves `did:key` strings to Ed25519 verifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyResolver;

impl Resolver<Ed25519Signature> for Ed25519KeyResolver {
    type Error = Ed25519ResolveError;

    async fn resolve(&self, did: &Did) -> Result<impl Verifier<Ed25519Signature>, Self::Error> {
        let verifier = Ed25519Verifier::try_from(did)?;
        Ok(verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ed25519Signer;
    use cairn_varsig::{Principal, Signer};
    use testresult::TestResult;

    #[tokio::test]
    async fn it_resolves_a_signer_did_to_its_verifier() -> TestResult {
        let signer = Ed25519Signer::import(&[5; 32])?;
        let signature = signer.sign(b"payload").await?;
        let verifier = Ed25519KeyResolver.resolve(&signer.did()).await?;
        verifier.verify(b"payload", &signature).await?;
        Ok(())
    }

    #[tokio::test]
    async fn it_refuses_non_key_dids() -> TestResult {
        let did: Did = "did:web:example.com".parse()?;
        assert!(Ed25519KeyResolver.resolve(&did).await.is_err());
        Ok(())
    }
}
