use cairn_multiformats::Cid;
use cairn_varsig::Did;

use super::Delegation;
use crate::error::UcanError;
use crate::time::Timestamp;
use crate::token;

/// A serialized delegation ready to attach to an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofToken {
    /// CID of the delegation token.
    pub cid: Cid,
    /// The delegation archive.
    pub archive: Vec<u8>,
}

impl ProofToken {
    /// The single-line text form of the archive.
    pub fn token(&self) -> String {
        token::format(&self.archive)
    }
}

/// A mutable collection of delegations, keyed by CID.
///
/// Insertion order is kept, so queries return delegations in the order they
/// were added.
#[derive(Debug, Clone, Default)]
pub struct DelegationStore {
    delegations: Vec<Delegation>,
}

impl DelegationStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delegation`. Returns `false` if it was already present.
    pub fn add(&mut self, delegation: Delegation) -> bool {
        if self.get(delegation.cid()).is_some() {
            return false;
        }
        tracing::debug!(
            cid = %delegation.cid(),
            audience = %delegation.audience(),
            "stored delegation"
        );
        self.delegations.push(delegation);
        true
    }

    /// Remove the delegation addressed by `cid`.
    pub fn remove(&mut self, cid: &Cid) -> Option<Delegation> {
        let index = self
            .delegations
            .iter()
            .position(|delegation| delegation.cid() == cid)?;
        tracing::debug!(%cid, "removed delegation");
        Some(self.delegations.remove(index))
    }

    /// The delegation addressed by `cid`.
    pub fn get(&self, cid: &Cid) -> Option<&Delegation> {
        self.delegations
            .iter()
            .find(|delegation| delegation.cid() == cid)
    }

    /// Number of stored delegations.
    pub fn len(&self) -> usize {
        self.delegations.len()
    }

    /// Is the store empty?
    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }

    /// All delegations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Delegation> {
        self.delegations.iter()
    }

    /// Delegations granting `ability`, on `resource` when one is given.
    pub fn with_capability(&self, ability: &str, resource: Option<&str>) -> Vec<&Delegation> {
        self.iter()
            .filter(|delegation| delegation.grants_capability(ability, resource))
            .collect()
    }

    /// Delegations addressed to `audience`.
    pub fn for_audience(&self, audience: &Did) -> Vec<&Delegation> {
        self.iter()
            .filter(|delegation| delegation.audience() == audience)
            .collect()
    }

    /// Delegations valid at `now`.
    pub fn valid(&self, now: Timestamp) -> Vec<&Delegation> {
        self.iter()
            .filter(|delegation| delegation.is_valid(now))
            .collect()
    }

    /// Drop every delegation not valid at `now`, returning how many went.
    pub fn prune(&mut self, now: Timestamp) -> usize {
        let before = self.delegations.len();
        self.delegations.retain(|delegation| delegation.is_valid(now));
        let removed = before - self.delegations.len();
        tracing::debug!(removed, remaining = self.delegations.len(), "pruned delegations");
        removed
    }

    /// Serialize the delegations that let `audience` exercise `ability` on
    /// `resource` at `now`.
    pub fn proof_tokens(
        &self,
        ability: &str,
        resource: Option<&str>,
        audience: &Did,
        now: Timestamp,
    ) -> Result<Vec<ProofToken>, UcanError> {
        let tokens = self
            .iter()
            .filter(|delegation| {
                delegation.audience() == audience
                    && delegation.is_valid(now)
                    && delegation.grants_capability(ability, resource)
            })
            .map(|delegation| {
                Ok(ProofToken {
                    cid: delegation.cid().clone(),
                    archive: delegation.archive()?,
                })
            })
            .collect::<Result<Vec<_>, UcanError>>()?;
        tracing::debug!(
            ability,
            resource,
            %audience,
            selected = tokens.len(),
            "selected proof tokens"
        );
        Ok(tokens)
    }
}
