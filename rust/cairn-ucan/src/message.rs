//! Agent messages: invocations and their proofs in one archive.
//!
//! The archive root is `{"<message version>": {"execute": [<invocation>, ...]}}`.
//! The remaining blocks are the invocations, every block of their proofs and
//! every block their proofs were received with, each included once.

use cairn_archive::Block;
use cairn_encoding::{Map, Value};
use cairn_multiformats::Cid;

use crate::delegation::{BlockSink, ProofResolver};
use crate::error::UcanError;
use crate::invocation::Invocation;
use crate::settings::Settings;

/// An assembled or received agent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMessage {
    root: Block,
    invocations: Vec<Invocation>,
    blocks: Vec<Block>,
}

impl AgentMessage {
    /// Assemble a message executing `invocations` in order.
    pub fn build(invocations: Vec<Invocation>, settings: &Settings) -> Result<Self, UcanError> {
        let mut sink = BlockSink::default();
        for invocation in &invocations {
            invocation.export_into(&mut sink);
        }

        let execute = invocations
            .iter()
            .map(|invocation| Value::Link(invocation.cid().clone()))
            .collect::<Vec<_>>();
        let root = Block::encode(
            &Map::new()
                .with(
                    settings.message_version.as_str(),
                    Map::new().with("execute", execute),
                )
                .into(),
        )?;
        sink.push(&root);
        let blocks = sink.into_blocks();

        tracing::debug!(
            root = %root.cid,
            invocations = invocations.len(),
            blocks = blocks.len(),
            "assembled agent message"
        );
        Ok(Self {
            root,
            invocations,
            blocks,
        })
    }

    /// Read a message archive.
    ///
    /// # Errors
    ///
    /// [`UcanError::UnsupportedVersion`] when the root key is not the
    /// configured message version, and [`UcanError::MissingBlock`] when an
    /// executed invocation is not in the archive.
    pub fn decode(bytes: &[u8], settings: &Settings) -> Result<Self, UcanError> {
        let archive = cairn_archive::decode(bytes)?;
        let root = archive.root_block()?.clone();
        let value = cairn_encoding::decode(&root.data)?;
        let map = value.as_map().ok_or(UcanError::InvalidField {
            field: "message",
            reason: "expected a map",
        })?;
        let body = match map.get(&settings.message_version) {
            Some(body) => body,
            None => {
                return Err(match map.keys().next() {
                    Some(key) => UcanError::UnsupportedVersion(key.to_owned()),
                    None => UcanError::MissingField("execute"),
                });
            }
        };
        let execute = body
            .as_map()
            .and_then(|body| body.get("execute"))
            .ok_or(UcanError::MissingField("execute"))?
            .as_list()
            .ok_or(UcanError::InvalidField {
                field: "execute",
                reason: "expected a list",
            })?;

        let invocations = {
            let mut resolver = ProofResolver::new(&archive.blocks);
            execute
                .iter()
                .map(|link| {
                    let cid = link.as_link().ok_or(UcanError::InvalidField {
                        field: "execute",
                        reason: "expected a list of links",
                    })?;
                    Invocation::resolve_with(cid, &mut resolver)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        tracing::debug!(
            root = %root.cid,
            invocations = invocations.len(),
            blocks = archive.blocks.len(),
            "decoded agent message"
        );
        Ok(Self {
            root,
            invocations,
            blocks: archive.blocks,
        })
    }

    /// Encode as an archive rooted at the message root.
    pub fn encode(&self) -> Result<Vec<u8>, UcanError> {
        Ok(cairn_archive::encode(
            std::slice::from_ref(&self.root.cid),
            &self.blocks,
        )?)
    }

    /// CID of the root block.
    pub fn root(&self) -> &Cid {
        &self.root.cid
    }

    /// The executed invocations, in order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Every block of the message, root last.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The block addressed by `cid`.
    pub fn get(&self, cid: &Cid) -> Option<&Block> {
        self.blocks.iter().find(|block| block.cid == *cid)
    }
}
