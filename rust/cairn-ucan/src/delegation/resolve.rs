//! Rebuilding proof chains from the blocks of a received archive.

use std::collections::{HashMap, HashSet};

use cairn_archive::Block;
use cairn_multiformats::Cid;

use super::Delegation;
use crate::error::{ErrorKind, UcanError};
use crate::ucan::Ucan;

/// Deepest chain of nested proofs a received archive may carry.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Resolves tokens against one pool of blocks.
///
/// Each CID is decoded at most once and every token citing it shares the
/// same [`Delegation`].
pub(crate) struct ProofResolver<'a> {
    blocks: HashMap<&'a Cid, &'a Block>,
    resolved: HashMap<Cid, Delegation>,
    ancestors: HashSet<Cid>,
}

impl<'a> ProofResolver<'a> {
    pub(crate) fn new(blocks: &'a [Block]) -> Self {
        Self {
            blocks: blocks.iter().map(|block| (&block.cid, block)).collect(),
            resolved: HashMap::new(),
            ancestors: HashSet::new(),
        }
    }

    pub(crate) fn block(&self, cid: &Cid) -> Result<&'a Block, UcanError> {
        self.blocks
            .get(cid)
            .copied()
            .ok_or_else(|| UcanError::MissingBlock(cid.clone()))
    }

    /// The delegation addressed by `cid`, which must be in the pool.
    pub(crate) fn delegation(&mut self, cid: &Cid) -> Result<Delegation, UcanError> {
        if let Some(delegation) = self.resolved.get(cid) {
            return Ok(delegation.clone());
        }
        let ucan = Ucan::from_block(self.block(cid)?)?;
        self.build(ucan)
    }

    /// The shipped proofs `ucan` cites, each once.
    pub(crate) fn proofs(&mut self, ucan: &Ucan) -> Result<Vec<Delegation>, UcanError> {
        if self.ancestors.len() > MAX_PROOF_DEPTH {
            return Err(UcanError::ProofTooDeep {
                cid: ucan.cid().clone(),
                limit: MAX_PROOF_DEPTH,
            });
        }
        if !self.ancestors.insert(ucan.cid().clone()) {
            return Err(UcanError::ProofCycle(ucan.cid().clone()));
        }

        let mut cited = HashSet::new();
        let mut proofs = Vec::new();
        for cid in ucan.proofs() {
            if !cited.insert(cid) {
                continue;
            }
            if let Some(proof) = self.resolved.get(cid) {
                proofs.push(proof.clone());
                continue;
            }
            let Some(block) = self.blocks.get(cid).copied() else {
                continue;
            };
            let proof = match Ucan::from_block(block) {
                Ok(proof) => proof,
                Err(error) if error.kind() == ErrorKind::Malformed => {
                    tracing::debug!(%cid, %error, "left proof in a foreign form unresolved");
                    continue;
                }
                Err(error) => return Err(error),
            };
            proofs.push(self.build(proof)?);
        }

        self.ancestors.remove(ucan.cid());
        Ok(proofs)
    }

    fn build(&mut self, ucan: Ucan) -> Result<Delegation, UcanError> {
        let proofs = self.proofs(&ucan)?;
        let cid = ucan.cid().clone();
        let delegation = Delegation::new(ucan, proofs);
        self.resolved.insert(cid, delegation.clone());
        Ok(delegation)
    }
}
