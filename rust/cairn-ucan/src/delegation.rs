//! Delegations and their archive and token forms.
//!
//! A delegation travels as an archive whose root is a one-entry variant
//! block, `{"ucan@<version>": <link to the token>}`, next to the token block
//! and the blocks of every proof it cites. Archives without the variant
//! wrapper are accepted too: the root block is then the token itself.

mod builder;
mod resolve;
mod store;

use std::collections::HashSet;
use std::sync::Arc;

pub use builder::DelegationBuilder;
pub(crate) use resolve::ProofResolver;
pub use resolve::MAX_PROOF_DEPTH;
pub use store::{DelegationStore, ProofToken};

use cairn_archive::Block;
use cairn_encoding::{Map, Value};
use cairn_multiformats::Cid;
use cairn_varsig::Did;

use crate::capability::Capability;
use crate::error::UcanError;
use crate::time::Timestamp;
use crate::token;
use crate::ucan::Ucan;

/// Key prefix of the variant block that roots a delegation archive.
pub const VARIANT_PREFIX: &str = "ucan@";

/// How the root block of a delegation archive is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Root {
    /// A variant wrapper pointing at the token block.
    Variant(Cid),
    /// The token itself.
    Direct,
}

impl Root {
    fn of(block: &Block) -> Result<Self, UcanError> {
        let value = cairn_encoding::decode(&block.data)?;
        let Some(map) = value.as_map() else {
            return Ok(Self::Direct);
        };
        if map.len() != 1 {
            return Ok(Self::Direct);
        }
        match map.iter().next() {
            Some((key, Value::Link(cid))) if key.starts_with(VARIANT_PREFIX) => {
                Ok(Self::Variant(cid.clone()))
            }
            _ => Ok(Self::Direct),
        }
    }
}

/// A signed grant of capabilities, with whichever of its proofs were
/// shipped alongside it.
///
/// Clones share the token and its proofs. Two delegations are equal when
/// they hold the same token and resolved the same proofs, whatever archive
/// they were read from.
#[derive(Debug, Clone)]
pub struct Delegation(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    ucan: Ucan,
    proofs: Vec<Delegation>,
    carried: Vec<Block>,
}

impl PartialEq for Delegation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.ucan == other.0.ucan && self.0.proofs == other.0.proofs)
    }
}

impl Eq for Delegation {}

impl Delegation {
    /// Pair a token with the delegations it cites.
    pub fn new(ucan: Ucan, proofs: Vec<Delegation>) -> Self {
        Self(Arc::new(Inner {
            ucan,
            proofs,
            carried: Vec::new(),
        }))
    }

    /// Rebuild the delegation addressed by `cid` from a pool of blocks.
    ///
    /// Cited proofs that are absent from `blocks`, or that are not tokens of
    /// this form, are left unresolved.
    ///
    /// # Errors
    ///
    /// [`UcanError::ProofCycle`] when a proof cites itself or a token that
    /// cites it, and [`UcanError::ProofTooDeep`] past
    /// [`MAX_PROOF_DEPTH`] nested proofs.
    pub fn resolve(cid: &Cid, blocks: &[Block]) -> Result<Self, UcanError> {
        ProofResolver::new(blocks).delegation(cid)
    }

    /// Read a delegation from archive bytes.
    ///
    /// The delegation keeps every block of the archive except its variant
    /// root, so forwarding it re-emits blocks this crate does not interpret.
    pub fn extract(bytes: &[u8]) -> Result<Self, UcanError> {
        let archive = cairn_archive::decode(bytes)?;
        let root = archive.root_block()?;
        let (cid, wrapper) = match Root::of(root)? {
            Root::Variant(cid) => (cid, Some(&root.cid)),
            Root::Direct => (root.cid.clone(), None),
        };
        let resolved = Self::resolve(&cid, &archive.blocks)?;
        let carried = archive
            .blocks
            .iter()
            .filter(|block| Some(&block.cid) != wrapper)
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(
            cid = %resolved.cid(),
            issuer = %resolved.issuer(),
            proofs = resolved.proof_delegations().len(),
            blocks = carried.len(),
            "extracted delegation"
        );
        Ok(Self(Arc::new(Inner {
            ucan: resolved.0.ucan.clone(),
            proofs: resolved.0.proofs.clone(),
            carried,
        })))
    }

    /// Encode as an archive rooted at a variant block.
    pub fn archive(&self) -> Result<Vec<u8>, UcanError> {
        let variant = Block::encode(
            &Map::new()
                .with(
                    format!("{VARIANT_PREFIX}{}", self.ucan().version()),
                    self.cid().clone(),
                )
                .into(),
        )?;
        let mut blocks = self.blocks();
        blocks.push(variant.clone());
        Ok(cairn_archive::encode(&[variant.cid], &blocks)?)
    }

    /// The single-line text token.
    pub fn format(&self) -> Result<String, UcanError> {
        Ok(token::format(&self.archive()?))
    }

    /// Read a text token.
    pub fn parse(text: &str) -> Result<Self, UcanError> {
        Self::extract(&token::parse(text)?)
    }

    /// Every block of this delegation, its resolved proofs and the archive
    /// it was read from, proofs first, without duplicates.
    pub fn blocks(&self) -> Vec<Block> {
        let mut sink = BlockSink::default();
        sink.delegation(self);
        sink.into_blocks()
    }

    /// Blocks of the archive this delegation was extracted from, minus the
    /// variant root. Empty for delegations built locally.
    pub fn carried_blocks(&self) -> &[Block] {
        &self.0.carried
    }

    /// The signed token.
    pub fn ucan(&self) -> &Ucan {
        &self.0.ucan
    }

    /// Content identifier of the token.
    pub fn cid(&self) -> &Cid {
        self.0.ucan.cid()
    }

    /// Who granted the capabilities.
    pub fn issuer(&self) -> &Did {
        self.0.ucan.issuer()
    }

    /// Who received them.
    pub fn audience(&self) -> &Did {
        self.0.ucan.audience()
    }

    /// The granted capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        self.0.ucan.capabilities()
    }

    /// CIDs of the delegations this one relies on.
    pub fn proofs(&self) -> &[Cid] {
        self.0.ucan.proofs()
    }

    /// The cited delegations that were shipped alongside this one.
    pub fn proof_delegations(&self) -> &[Delegation] {
        &self.0.proofs
    }

    /// `exp`, if any.
    pub fn expiration(&self) -> Option<Timestamp> {
        self.0.ucan.payload().expiration
    }

    /// `nbf`, if any.
    pub fn not_before(&self) -> Option<Timestamp> {
        self.0.ucan.payload().not_before
    }

    /// Has the expiration passed at `now`?
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiration().is_some_and(|exp| exp <= now)
    }

    /// Is `now` before the not-before time?
    pub fn is_not_yet_valid(&self, now: Timestamp) -> bool {
        self.not_before().is_some_and(|nbf| nbf > now)
    }

    /// Neither expired nor not yet valid at `now`.
    pub fn is_valid(&self, now: Timestamp) -> bool {
        !self.is_expired(now) && !self.is_not_yet_valid(now)
    }

    /// Does some capability grant `ability`, on `resource` when one is given?
    pub fn grants_capability(&self, ability: &str, resource: Option<&str>) -> bool {
        self.capabilities()
            .iter()
            .any(|capability| capability.matches(ability, resource))
    }
}

/// Collects blocks for an outgoing archive, each block once.
#[derive(Debug, Default)]
pub(crate) struct BlockSink {
    blocks: Vec<Block>,
    seen: HashSet<Cid>,
    exported: HashSet<Cid>,
}

impl BlockSink {
    pub(crate) fn push(&mut self, block: &Block) {
        if self.seen.insert(block.cid.clone()) {
            self.blocks.push(block.clone());
        }
    }

    /// Emit `delegation`'s proofs, carried blocks and token, in that order.
    pub(crate) fn delegation(&mut self, delegation: &Delegation) {
        if !self.exported.insert(delegation.cid().clone()) {
            return;
        }
        for proof in delegation.proof_delegations() {
            self.delegation(proof);
        }
        for block in delegation.carried_blocks() {
            self.push(block);
        }
        self.push(delegation.ucan().block());
    }

    pub(crate) fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_multiformats::codec::{DAG_CBOR, RAW};
    use cairn_varsig::Varsig;
    use cairn_varsig::algorithm::EDDSA;
    use pretty_assertions::assert_eq;

    use crate::ucan::Payload;

    const ALICE: &str = "did:key:z6Mkk89bC3JrVqKie71YEcc5M1SMVxuCgNx6zLZ8SYJsxALi";

    fn token(
        not_before: Option<Timestamp>,
        expiration: Option<Timestamp>,
        proofs: Vec<Cid>,
    ) -> Ucan {
        let alice: Did = ALICE.parse().unwrap();
        let mut payload = Payload::new(alice.clone(), alice);
        payload
            .capabilities
            .push(Capability::new("upload/add", "did:key:zSPACE"));
        payload.not_before = not_before;
        payload.expiration = expiration;
        payload.proofs = proofs;
        Ucan::assemble("0.9.1".into(), payload, Varsig::new(EDDSA, vec![3; 64])).unwrap()
    }

    fn delegation(
        not_before: Option<Timestamp>,
        expiration: Option<Timestamp>,
        proofs: Vec<Delegation>,
    ) -> Delegation {
        let cids = proofs.iter().map(|proof| proof.cid().clone()).collect();
        Delegation::new(token(not_before, expiration, cids), proofs)
    }

    fn chain(links: usize) -> Delegation {
        (0..links).fold(delegation(None, None, vec![]), |proof, _| {
            delegation(None, None, vec![proof])
        })
    }

    #[test]
    fn validity_follows_the_time_bounds() {
        let now = Timestamp::from_unix(1_700_000_000);

        let expired = delegation(None, Some(Timestamp::from_unix(now.to_unix() - 1)), vec![]);
        assert!(expired.is_expired(now));
        assert!(!expired.is_valid(now));

        let early = delegation(Some(now.after(1000)), None, vec![]);
        assert!(early.is_not_yet_valid(now));
        assert!(!early.is_valid(now));

        assert!(delegation(None, None, vec![]).is_valid(now));

        let straddling = delegation(
            Some(Timestamp::from_unix(now.to_unix() - 10)),
            Some(now.after(10)),
            vec![],
        );
        assert!(straddling.is_valid(now));
    }

    #[test]
    fn it_grants_only_literal_matches() {
        let delegation = delegation(None, None, vec![]);
        assert!(delegation.grants_capability("upload/add", Some("did:key:zSPACE")));
        assert!(delegation.grants_capability("upload/add", None));
        assert!(!delegation.grants_capability("upload/add", Some("did:key:zOTHER")));
        assert!(!delegation.grants_capability("store/add", None));
    }

    #[test]
    fn archives_are_rooted_at_a_variant_block() {
        let proof = delegation(None, None, vec![]);
        let child = delegation(None, Some(Timestamp::from_unix(9)), vec![proof.clone()]);

        let archive = cairn_archive::decode(&child.archive().unwrap()).unwrap();
        let root = cairn_encoding::decode(&archive.root_block().unwrap().data).unwrap();
        assert_eq!(
            root.as_map().unwrap().get("ucan@0.9.1"),
            Some(&Value::Link(child.cid().clone()))
        );
        assert_eq!(archive.blocks.len(), 3);

        let extracted = Delegation::extract(&child.archive().unwrap()).unwrap();
        assert_eq!(extracted, child);
        assert_eq!(extracted.proof_delegations(), &[proof]);
    }

    #[test]
    fn it_reads_archives_without_a_variant_wrapper() {
        let delegation = delegation(None, None, vec![]);
        let bytes = cairn_archive::encode(
            &[delegation.cid().clone()],
            &[delegation.ucan().block().clone()],
        )
        .unwrap();
        assert_eq!(Delegation::extract(&bytes).unwrap(), delegation);
    }

    #[test]
    fn unshipped_proofs_stay_unresolved() {
        let proof = delegation(None, None, vec![]);
        let child = delegation(None, None, vec![proof]);
        let bytes = cairn_archive::encode(
            &[child.cid().clone()],
            &[child.ucan().block().clone()],
        )
        .unwrap();

        let extracted = Delegation::extract(&bytes).unwrap();
        assert_eq!(extracted.proofs().len(), 1);
        assert!(extracted.proof_delegations().is_empty());
    }

    #[test]
    fn forged_self_citations_are_malformed() {
        let forged = Cid::of(DAG_CBOR, b"forged");
        let block = Block::new(
            forged.clone(),
            token(None, None, vec![forged.clone()]).block().data.clone(),
        );
        let error = Delegation::resolve(&forged, std::slice::from_ref(&block)).unwrap_err();
        assert!(matches!(&error, UcanError::ProofCycle(cid) if *cid == forged));
        assert_eq!(error.kind(), crate::ErrorKind::Malformed);

        let bytes = cairn_archive::encode(&[forged], &[block]).unwrap();
        let error = Delegation::extract(&bytes).unwrap_err();
        assert!(matches!(
            error,
            UcanError::Archive(cairn_archive::ArchiveError::HashMismatch { .. })
        ));
        assert_eq!(error.kind(), crate::ErrorKind::Malformed);
    }

    #[test]
    fn mutual_citations_are_malformed() {
        let (a, b) = (Cid::of(DAG_CBOR, b"a"), Cid::of(DAG_CBOR, b"b"));
        let blocks = [
            Block::new(a.clone(), token(None, None, vec![b.clone()]).block().data.clone()),
            Block::new(b.clone(), token(None, None, vec![a.clone()]).block().data.clone()),
        ];
        assert!(matches!(
            Delegation::resolve(&a, &blocks),
            Err(UcanError::ProofCycle(_))
        ));
    }

    #[test]
    fn repeated_citations_resolve_once() {
        let mut current = delegation(None, None, vec![]);
        for _ in 0..40 {
            current = delegation(None, None, vec![current.clone(), current]);
        }
        assert_eq!(current.blocks().len(), 41);

        let extracted = Delegation::extract(&current.archive().unwrap()).unwrap();
        assert_eq!(extracted.cid(), current.cid());
        assert_eq!(extracted.proofs().len(), 2);
        assert_eq!(extracted.proof_delegations().len(), 1);
        assert_eq!(extracted.blocks().len(), 41);
    }

    #[test]
    fn proof_chains_are_bounded() {
        let deepest = chain(MAX_PROOF_DEPTH);
        let extracted = Delegation::extract(&deepest.archive().unwrap()).unwrap();
        assert_eq!(extracted.cid(), deepest.cid());

        let error = Delegation::extract(&chain(MAX_PROOF_DEPTH + 1).archive().unwrap()).unwrap_err();
        assert!(matches!(
            error,
            UcanError::ProofTooDeep { limit: MAX_PROOF_DEPTH, .. }
        ));
        assert_eq!(error.kind(), crate::ErrorKind::Malformed);
    }

    #[test]
    fn foreign_proofs_are_carried_but_not_resolved() {
        let foreign = Block::encode(&Map::new().with("hello", 1).into()).unwrap();
        let ucan = token(None, None, vec![foreign.cid.clone()]);
        let bytes = cairn_archive::encode(
            &[ucan.cid().clone()],
            &[foreign.clone(), ucan.block().clone()],
        )
        .unwrap();

        let extracted = Delegation::extract(&bytes).unwrap();
        assert_eq!(extracted.proofs(), &[foreign.cid.clone()]);
        assert!(extracted.proof_delegations().is_empty());
        assert_eq!(extracted.carried_blocks(), &[foreign.clone(), ucan.block().clone()]);
        assert!(extracted.blocks().contains(&foreign));
    }

    #[test]
    fn extraction_drops_only_the_variant_root() {
        let proof = delegation(None, None, vec![]);
        let child = delegation(None, None, vec![proof.clone()]);
        let extracted = Delegation::extract(&child.archive().unwrap()).unwrap();
        assert_eq!(
            extracted.carried_blocks(),
            &[proof.ucan().block().clone(), child.ucan().block().clone()]
        );
        assert_eq!(extracted.blocks(), child.blocks());
    }

    #[test]
    fn a_missing_root_is_structural() {
        let missing = Cid::of(RAW, b"absent");
        let bytes = cairn_archive::encode(&[missing], &[]).unwrap();
        let error = Delegation::extract(&bytes).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Structural);
    }

    #[test]
    fn text_tokens_roundtrip() {
        let delegation = delegation(None, None, vec![]);
        let text = delegation.format().unwrap();
        assert!(text.starts_with('m'));
        assert_eq!(Delegation::parse(&text).unwrap(), delegation);
    }
}
