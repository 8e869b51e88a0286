//! Invocations: signed requests to exercise capabilities.
//!
//! An [`InvocationBuilder`] accumulates capabilities and proofs, then signs
//! once. Building with no capability fails before the signer is asked for
//! anything.

use cairn_archive::Block;
use cairn_encoding::Map;
use cairn_multiformats::Cid;
use cairn_varsig::{Did, Principal, Signature, Signer};

use crate::capability::Capability;
use crate::delegation::{BlockSink, Delegation, ProofResolver};
use crate::error::UcanError;
use crate::settings::Settings;
use crate::time::{Lifetime, Timestamp};
use crate::ucan::{Draft, Ucan};

/// A signed invocation and the delegations it cites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    ucan: Ucan,
    proofs: Vec<Delegation>,
}

impl Invocation {
    /// Pair a token with its proofs.
    pub fn new(ucan: Ucan, proofs: Vec<Delegation>) -> Self {
        Self { ucan, proofs }
    }

    /// Rebuild the invocation addressed by `cid` from a pool of blocks.
    pub fn resolve(cid: &Cid, blocks: &[Block]) -> Result<Self, UcanError> {
        Self::resolve_with(cid, &mut ProofResolver::new(blocks))
    }

    pub(crate) fn resolve_with(
        cid: &Cid,
        resolver: &mut ProofResolver<'_>,
    ) -> Result<Self, UcanError> {
        let ucan = Ucan::from_block(resolver.block(cid)?)?;
        let proofs = resolver.proofs(&ucan)?;
        Ok(Self { ucan, proofs })
    }

    /// The signed token.
    pub fn ucan(&self) -> &Ucan {
        &self.ucan
    }

    /// Content identifier of the token.
    pub fn cid(&self) -> &Cid {
        self.ucan.cid()
    }

    /// Who is invoking.
    pub fn issuer(&self) -> &Did {
        self.ucan.issuer()
    }

    /// The service addressed.
    pub fn audience(&self) -> &Did {
        self.ucan.audience()
    }

    /// The invoked capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        self.ucan.capabilities()
    }

    /// The delegations shipped with the invocation.
    pub fn proofs(&self) -> &[Delegation] {
        &self.proofs
    }

    /// Proof blocks followed by the invocation block, without duplicates.
    pub fn blocks(&self) -> Vec<Block> {
        let mut sink = BlockSink::default();
        self.export_into(&mut sink);
        sink.into_blocks()
    }

    pub(crate) fn export_into(&self, sink: &mut BlockSink) {
        for proof in &self.proofs {
            sink.delegation(proof);
        }
        sink.push(self.ucan.block());
    }
}

/// Collects capabilities and proofs for an invocation, then signs it.
#[derive(Debug, Clone, Default)]
pub struct InvocationBuilder {
    draft: Draft,
    proofs: Vec<Delegation>,
}

impl InvocationBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The service the invocation is addressed to.
    #[must_use]
    pub fn audience(mut self, audience: impl Principal) -> Self {
        self.draft.audience = Some(audience.did());
        self
    }

    /// Invoke `capability`.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.draft.capabilities.push(capability);
        self
    }

    /// Attach a delegation as proof.
    #[must_use]
    pub fn proof(mut self, proof: Delegation) -> Self {
        self.proofs.push(proof);
        self
    }

    /// Attach every delegation in `proofs`.
    #[must_use]
    pub fn proofs(mut self, proofs: impl IntoIterator<Item = Delegation>) -> Self {
        self.proofs.extend(proofs);
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

    /// Sign with `issuer` at the current time.
    pub async fn sign<S, K>(self, issuer: &K, settings: &Settings) -> Result<Invocation, UcanError>
    where
        S: Signature,
        K: Signer<S> + Principal,
    {
        self.sign_at::<S, K>(issuer, settings, Timestamp::now()).await
    }

    /// Sign with `issuer` as if the time were `now`.
    ///
    /// # Errors
    ///
    /// [`UcanError::NoCapabilities`] or [`UcanError::NoAudience`] without
    /// contacting the signer, and [`UcanError::Signer`] if signing fails.
    pub async fn sign_at<S, K>(
        self,
        issuer: &K,
        settings: &Settings,
        now: Timestamp,
    ) -> Result<Invocation, UcanError>
    where
        S: Signature,
        K: Signer<S> + Principal,
    {
        let proofs = self.proofs.iter().map(|proof| proof.cid().clone()).collect();
        let payload = self.draft.into_payload(issuer.did(), proofs, settings, now)?;
        let ucan = Ucan::issue::<S, K>(payload, issuer, settings).await?;
        tracing::debug!(
            cid = %ucan.cid(),
            capabilities = ucan.capabilities().len(),
            proofs = self.proofs.len(),
            "signed invocation"
        );
        Ok(Invocation::new(ucan, self.proofs))
    }
}
