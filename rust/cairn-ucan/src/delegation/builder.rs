use cairn_encoding::Map;
use cairn_varsig::{Did, Principal, Signature, Signer};

use super::Delegation;
use crate::capability::Capability;
use crate::error::UcanError;
use crate::settings::Settings;
use crate::time::{Lifetime, Timestamp};
use crate::ucan::{Draft, Ucan};

/// Collects the fields of a delegation, then signs it.
///
/// Without an explicit expiration the delegation lives for the configured
/// default lifetime from the moment it is signed.
#[derive(Debug, Clone, Default)]
pub struct DelegationBuilder {
    draft: Draft,
    proofs: Vec<Delegation>,
}

impl DelegationBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Who receives the capabilities.
    #[must_use]
    pub fn audience(mut self, audience: impl Principal) -> Self {
        self.draft.audience = Some(audience.did());
        self
    }

    /// Grant `capability`.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.draft.capabilities.push(capability);
        self
    }

    /// Expire at `expiration`.
    #[must_use]
    pub fn expiration(mut self, expiration: Timestamp) -> Self {
        self.draft.lifetime = Lifetime::Until(expiration);
        self
    }

    /// Expire `seconds` after signing.
    #[must_use]
    pub fn lifetime(mut self, seconds: u64) -> Self {
        self.draft.lifetime = Lifetime::Seconds(seconds);
        self
    }

    /// Never expire.
    #[must_use]
    pub fn never_expires(mut self) -> Self {
        self.draft.lifetime = Lifetime::Unbounded;
        self
    }

    /// Not valid before `not_before`.
    #[must_use]
    pub fn not_before(mut self, not_before: Timestamp) -> Self {
        self.draft.not_before = Some(not_before);
        self
    }

    /// Set the nonce.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.draft.nonce = Some(nonce.into());
        self
    }

    /// Add a signed fact.
    #[must_use]
    pub fn fact(mut self, fact: Map) -> Self {
        self.draft.facts.push(fact);
        self
    }

    /// Cite `proof` and ship its blocks with the delegation.
    #[must_use]
    pub fn proof(mut self, proof: Delegation) -> Self {
        self.proofs.push(proof);
        self
    }

    /// Sign with `issuer` at the current time.
    pub async fn sign<S, K>(self, issuer: &K, settings: &Settings) -> Result<Delegation, UcanError>
    where
        S: Signature,
        K: Signer<S> + Principal,
    {
        self.sign_at::<S, K>(issuer, settings, Timestamp::now()).await
    }

    /// Sign with `issuer` as if the time were `now`.
    pub async fn sign_at<S, K>(
        self,
        issuer: &K,
        settings: &Settings,
        now: Timestamp,
    ) -> Result<Delegation, UcanError>
    where
        S: Signature,
        K: Signer<S> + Principal,
    {
        let proofs = self.proofs.iter().map(|proof| proof.cid().clone()).collect();
        let issuer_did: Did = issuer.did();
        let payload = self.draft.into_payload(issuer_did, proofs, settings, now)?;
        let ucan = Ucan::issue::<S, K>(payload, issuer, settings).await?;
        Ok(Delegation::new(ucan, self.proofs))
    }
}
