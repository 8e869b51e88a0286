//! Signature and authority checks.
//!
//! Checking an invocation means:
//! 1. its signature verifies against its issuer,
//! 2. it and every shipped proof are inside their validity windows,
//! 3. each proof is signed by its issuer and addressed to whoever cites it,
//! 4. every invoked capability is either on a resource the invoker owns or
//!    granted by a proof chain that ends at the resource owner.

use std::collections::{HashMap, HashSet};

use cairn_multiformats::Cid;
use cairn_varsig::{Did, Resolver, Signature, Verifier};

use crate::capability::Capability;
use crate::delegation::Delegation;
use crate::error::UcanError;
use crate::invocation::Invocation;
use crate::time::{TimeRange, Timestamp, Validity};
use crate::ucan::Ucan;

/// What a successful [`verify_invocation`] established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The verified invoker.
    pub issuer: Did,
    /// The capabilities it may exercise.
    pub capabilities: Vec<Capability>,
    /// When the whole chain is valid.
    pub window: TimeRange,
}

/// Verify that `ucan` was signed by its issuer.
pub async fn verify_signature<S, R>(ucan: &Ucan, resolver: &R) -> Result<(), UcanError>
where
    S: Signature,
    R: Resolver<S>,
{
    let issuer = ucan.issuer();
    let verifier = resolver
        .resolve(issuer)
        .await
        .map_err(|error| UcanError::Resolve {
            did: issuer.clone(),
            reason: error.to_string(),
        })?;
    let signature: S = ucan.signature().to_signature()?;
    let input = ucan.signing_input()?;
    verifier
        .verify(input.as_bytes(), &signature)
        .await
        .map_err(|_| UcanError::InvalidSignature {
            cid: ucan.cid().clone(),
            issuer: issuer.clone(),
        })
}

/// Verify `invocation` and the proofs shipped with it at time `now`.
pub async fn verify_invocation<S, R>(
    invocation: &Invocation,
    resolver: &R,
    now: Timestamp,
) -> Result<Authorization, UcanError>
where
    S: Signature,
    R: Resolver<S>,
{
    verify_signature::<S, R>(invocation.ucan(), resolver).await?;
    check_time(invocation.ucan(), now)?;
    let mut window = invocation.ucan().time_range();

    let mut checked = HashSet::new();
    let mut pending: Vec<(&Delegation, &Did)> = invocation
        .proofs()
        .iter()
        .map(|proof| (proof, invocation.issuer()))
        .collect();
    while let Some((proof, expected)) = pending.pop() {
        if proof.audience() != expected {
            return Err(UcanError::AudienceMismatch {
                cid: proof.cid().clone(),
                expected: expected.clone(),
                found: proof.audience().clone(),
            });
        }
        if !checked.insert(proof.cid()) {
            continue;
        }
        verify_signature::<S, R>(proof.ucan(), resolver).await?;
        check_time(proof.ucan(), now)?;
        window = window.intersect(proof.ucan().time_range());
        pending.extend(
            proof
                .proof_delegations()
                .iter()
                .map(|parent| (parent, proof.issuer())),
        );
    }

    for capability in invocation.capabilities() {
        let owned = capability.with() == invocation.issuer().as_str();
        let mut known = HashMap::new();
        if !owned
            && !invocation
                .proofs()
                .iter()
                .any(|proof| authorizes(proof, capability, &mut known))
        {
            return Err(UcanError::NotGranted {
                can: capability.can().to_owned(),
                with: capability.with().to_owned(),
            });
        }
    }

    tracing::debug!(
        cid = %invocation.cid(),
        issuer = %invocation.issuer(),
        %window,
        "verified invocation"
    );
    Ok(Authorization {
        issuer: invocation.issuer().clone(),
        capabilities: invocation.capabilities().to_vec(),
        window,
    })
}

fn check_time(ucan: &Ucan, now: Timestamp) -> Result<(), UcanError> {
    match ucan.validity(now) {
        Validity::Valid => Ok(()),
        Validity::Expired(expiration) => Err(UcanError::Expired {
            cid: ucan.cid().clone(),
            expiration,
        }),
        Validity::NotYetValid(not_before) => Err(UcanError::NotYetValid {
            cid: ucan.cid().clone(),
            not_before,
        }),
    }
}

/// Does `delegation` grant `capability`, with authority traced back to the
/// resource owner? `known` remembers the answer for every delegation asked.
fn authorizes<'a>(
    delegation: &'a Delegation,
    capability: &Capability,
    known: &mut HashMap<&'a Cid, bool>,
) -> bool {
    if let Some(&granted) = known.get(delegation.cid()) {
        return granted;
    }
    let granted = delegation.grants_capability(capability.can(), Some(capability.with()))
        && (delegation.issuer().as_str() == capability.with()
            || delegation
                .proof_delegations()
                .iter()
                .any(|parent| authorizes(parent, capability, known)));
    known.insert(delegation.cid(), granted);
    granted
}
