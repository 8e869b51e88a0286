//! The signed UCAN 0.9 token shared by delegations and invocations.
//!
//! On the wire a token is a canonical object with the fields in alphabetical
//! order: `att`, `aud`, `exp`, `fct`, `iss`, `nbf`, `nnc`, `prf`, `s`, `v`.
//! `iss` and `aud` hold binary DIDs and `s` holds the varsig-framed
//! signature over the [`formatter`] signing input.

pub mod formatter;

use cairn_archive::Block;
use cairn_encoding::{Map, Value};
use cairn_multiformats::Cid;
use cairn_varsig::{Did, Signature, SignatureAlgorithm, Signer, Varsig};

use crate::capability::Capability;
use crate::error::UcanError;
use crate::settings::Settings;
use crate::time::{Lifetime, TimeRange, Timestamp, Validity};

/// The signed fields of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Who signs the token.
    pub issuer: Did,
    /// Who the token is addressed to.
    pub audience: Did,
    /// What the token grants or invokes.
    pub capabilities: Vec<Capability>,
    /// First second the token is no longer valid.
    pub expiration: Option<Timestamp>,
    /// First second the token is valid.
    pub not_before: Option<Timestamp>,
    /// Makes otherwise identical tokens distinct.
    pub nonce: Option<String>,
    /// Arbitrary signed assertions.
    pub facts: Vec<Map>,
    /// Delegations the token relies on.
    pub proofs: Vec<Cid>,
}

impl Payload {
    /// An empty payload from `issuer` to `audience`.
    pub fn new(issuer: Did, audience: Did) -> Self {
        Self {
            issuer,
            audience,
            capabilities: Vec::new(),
            expiration: None,
            not_before: None,
            nonce: None,
            facts: Vec::new(),
            proofs: Vec::new(),
        }
    }
}

/// Unsigned fields collected by the delegation and invocation builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct Draft {
    pub(crate) audience: Option<Did>,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) lifetime: Lifetime,
    pub(crate) not_before: Option<Timestamp>,
    pub(crate) nonce: Option<String>,
    pub(crate) facts: Vec<Map>,
}

impl Draft {
    /// Fix the draft into a payload issued by `issuer` at `now`.
    pub(crate) fn into_payload(
        self,
        issuer: Did,
        proofs: Vec<Cid>,
        settings: &Settings,
        now: Timestamp,
    ) -> Result<Payload, UcanError> {
        if self.capabilities.is_empty() {
            return Err(UcanError::NoCapabilities);
        }
        let audience = self.audience.ok_or(UcanError::NoAudience)?;
        Ok(Payload {
            issuer,
            audience,
            capabilities: self.capabilities,
            expiration: self.lifetime.expiration(now, settings.default_lifetime),
            not_before: self.not_before,
            nonce: self.nonce,
            facts: self.facts,
            proofs,
        })
    }
}

/// A signed token together with its encoded block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ucan {
    version: String,
    payload: Payload,
    signature: Varsig,
    block: Block,
}

impl Ucan {
    /// Sign `payload` with `signer`.
    ///
    /// # Errors
    ///
    /// [`UcanError::NoCapabilities`] before signing if the payload grants
    /// nothing, and [`UcanError::Signer`] carrying the signer's own error if
    /// signing fails.
    pub async fn issue<S, K>(
        payload: Payload,
        signer: &K,
        settings: &Settings,
    ) -> Result<Self, UcanError>
    where
        S: Signature,
        K: Signer<S>,
    {
        if payload.capabilities.is_empty() {
            return Err(UcanError::NoCapabilities);
        }
        let alg = S::Algorithm::default().jwt_name();
        let input = formatter::signing_input(alg, &settings.ucan_version, &payload)?;
        let signature = signer
            .sign(input.as_bytes())
            .await
            .map_err(UcanError::Signer)?;
        let ucan = Self::assemble(
            settings.ucan_version.clone(),
            payload,
            Varsig::from_signature(&signature),
        )?;
        tracing::debug!(cid = %ucan.cid(), issuer = %ucan.issuer(), alg, "issued ucan");
        Ok(ucan)
    }

    /// Combine fields and an existing signature into a token.
    pub fn assemble(
        version: String,
        payload: Payload,
        signature: Varsig,
    ) -> Result<Self, UcanError> {
        let value = to_value(&version, &payload, &signature)?;
        Ok(Self {
            block: Block::encode(&value)?,
            version,
            payload,
            signature,
        })
    }

    /// Decode a token from canonical object bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, UcanError> {
        Self::from_block(&Block::of(cairn_multiformats::codec::DAG_CBOR, bytes.to_vec()))
    }

    /// Decode a token from a block, keeping the block's CID.
    pub fn from_block(block: &Block) -> Result<Self, UcanError> {
        let value = cairn_encoding::decode(&block.data)?;
        let map = value.as_map().ok_or(UcanError::InvalidField {
            field: "ucan",
            reason: "expected a map",
        })?;

        let version = text(required(map, "v")?, "v")?.to_owned();
        let payload = Payload {
            issuer: did(required(map, "iss")?, "iss")?,
            audience: did(required(map, "aud")?, "aud")?,
            capabilities: list(required(map, "att")?, "att")?
                .iter()
                .map(Capability::from_value)
                .collect::<Result<_, _>>()?,
            expiration: match required(map, "exp")? {
                Value::Null => None,
                exp => Some(timestamp(exp, "exp")?),
            },
            not_before: map
                .get("nbf")
                .map(|nbf| timestamp(nbf, "nbf"))
                .transpose()?,
            nonce: map
                .get("nnc")
                .map(|nnc| text(nnc, "nnc").map(str::to_owned))
                .transpose()?,
            facts: match map.get("fct") {
                None => Vec::new(),
                Some(facts) => list(facts, "fct")?
                    .iter()
                    .map(|fact| {
                        fact.as_map().cloned().ok_or(UcanError::InvalidField {
                            field: "fct",
                            reason: "expected a list of maps",
                        })
                    })
                    .collect::<Result<_, _>>()?,
            },
            proofs: list(required(map, "prf")?, "prf")?
                .iter()
                .map(|proof| {
                    proof.as_link().cloned().ok_or(UcanError::InvalidField {
                        field: "prf",
                        reason: "expected a list of links",
                    })
                })
                .collect::<Result<_, _>>()?,
        };
        let signature = Varsig::decode(bytes(required(map, "s")?, "s")?)?;

        Ok(Self {
            version,
            payload,
            signature,
            block: block.clone(),
        })
    }

    /// Recompute the string the issuer signed.
    pub fn signing_input(&self) -> Result<String, UcanError> {
        let alg = self
            .signature
            .jwt_name()
            .ok_or(UcanError::UnknownAlgorithm(self.signature.code()))?;
        formatter::signing_input(alg, &self.version, &self.payload)
    }

    /// Content identifier of the encoded token.
    pub fn cid(&self) -> &Cid {
        &self.block.cid
    }

    /// The encoded token.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// The `v` field.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The signed fields.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The framed signature.
    pub fn signature(&self) -> &Varsig {
        &self.signature
    }

    /// The signer.
    pub fn issuer(&self) -> &Did {
        &self.payload.issuer
    }

    /// The addressee.
    pub fn audience(&self) -> &Did {
        &self.payload.audience
    }

    /// Granted or invoked capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        &self.payload.capabilities
    }

    /// Proof CIDs.
    pub fn proofs(&self) -> &[Cid] {
        &self.payload.proofs
    }

    /// Validity window.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.payload.not_before, self.payload.expiration)
    }

    /// Where `now` falls in the validity window.
    pub fn validity(&self, now: Timestamp) -> Validity {
        self.time_range().check(now)
    }
}

fn to_value(version: &str, payload: &Payload, signature: &Varsig) -> Result<Value, UcanError> {
    let mut map = Map::new()
        .with(
            "att",
            Value::List(payload.capabilities.iter().map(Capability::to_value).collect()),
        )
        .with("aud", Value::Bytes(payload.audience.to_bytes()?))
        .with("exp", payload.expiration.map(Timestamp::to_unix))
        .with(
            "fct",
            Value::List(payload.facts.iter().cloned().map(Value::Map).collect()),
        )
        .with("iss", Value::Bytes(payload.issuer.to_bytes()?));
    if let Some(nbf) = payload.not_before {
        map.insert("nbf", nbf.to_unix());
    }
    if let Some(nonce) = &payload.nonce {
        map.insert("nnc", nonce.as_str());
    }
    map.insert(
        "prf",
        Value::List(payload.proofs.iter().cloned().map(Value::Link).collect()),
    );
    map.insert("s", Value::Bytes(signature.encode()));
    map.insert("v", version);
    Ok(map.into())
}

fn required<'a>(map: &'a Map, field: &'static str) -> Result<&'a Value, UcanError> {
    map.get(field).ok_or(UcanError::MissingField(field))
}

fn text<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, UcanError> {
    value.as_text().ok_or(UcanError::InvalidField {
        field,
        reason: "expected text",
    })
}

fn bytes<'a>(value: &'a Value, field: &'static str) -> Result<&'a [u8], UcanError> {
    value.as_bytes().ok_or(UcanError::InvalidField {
        field,
        reason: "expected bytes",
    })
}

fn list<'a>(value: &'a Value, field: &'static str) -> Result<&'a [Value], UcanError> {
    value.as_list().ok_or(UcanError::InvalidField {
        field,
        reason: "expected a list",
    })
}

fn did(value: &Value, field: &'static str) -> Result<Did, UcanError> {
    Ok(Did::from_bytes(bytes(value, field)?)?)
}

fn timestamp(value: &Value, field: &'static str) -> Result<Timestamp, UcanError> {
    value
        .as_u64()
        .map(Timestamp::from_unix)
        .ok_or(UcanError::InvalidField {
            field,
            reason: "expected unix seconds",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_varsig::algorithm::EDDSA;
    use pretty_assertions::assert_eq;

    fn payload() -> Payload {
        let issuer: Did = "did:key:z6Mkk89bC3JrVqKie71YEcc5M1SMVxuCgNx6zLZ8SYJsxALi"
            .parse()
            .unwrap();
        let mut payload = Payload::new(issuer.clone(), issuer);
        payload.capabilities.push(Capability::new("store/add", "did:key:zSPACE"));
        payload
    }

    #[test]
    fn fields_are_written_in_alphabetical_order() {
        let mut fields = payload();
        fields.not_before = Some(Timestamp::from_unix(5));
        fields.nonce = Some("abc".into());
        let ucan = Ucan::assemble("0.9.1".into(), fields, Varsig::new(EDDSA, vec![7; 64])).unwrap();

        let value = cairn_encoding::decode(&ucan.block().data).unwrap();
        let keys: Vec<_> = value.as_map().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["att", "aud", "exp", "fct", "iss", "nbf", "nnc", "prf", "s", "v"]
        );
    }

    #[test]
    fn it_decodes_what_it_assembles() {
        let mut fields = payload();
        fields.expiration = Some(Timestamp::from_unix(1_000));
        fields.facts.push(Map::new().with("note", "hi"));
        let ucan = Ucan::assemble("0.9.1".into(), fields, Varsig::new(EDDSA, vec![7; 64])).unwrap();

        let decoded = Ucan::decode(&ucan.block().data).unwrap();
        assert_eq!(decoded, ucan);
        assert_eq!(decoded.cid(), ucan.cid());
        assert_eq!(decoded.signing_input().unwrap(), ucan.signing_input().unwrap());
    }

    #[test]
    fn a_missing_expiration_is_null_on_the_wire() {
        let ucan =
            Ucan::assemble("0.9.1".into(), payload(), Varsig::new(EDDSA, vec![7; 64])).unwrap();
        let value = cairn_encoding::decode(&ucan.block().data).unwrap();
        assert!(value.as_map().unwrap().get("exp").unwrap().is_null());
        assert_eq!(ucan.validity(Timestamp::from_unix(u64::MAX)), Validity::Valid);
    }

    #[test]
    fn it_rejects_tokens_without_a_signature() {
        let mut value = to_value("0.9.1", &payload(), &Varsig::new(EDDSA, vec![1; 64])).unwrap();
        if let Value::Map(map) = &mut value {
            map.remove("s");
        }
        let bytes = cairn_encoding::encode(&value).unwrap();
        assert!(matches!(
            Ucan::decode(&bytes),
            Err(UcanError::MissingField("s"))
        ));
    }

    #[test]
    fn unknown_algorithms_have_no_signing_input() {
        let ucan =
            Ucan::assemble("0.9.1".into(), payload(), Varsig::new(0x1234, vec![7; 64])).unwrap();
        assert!(matches!(
            ucan.signing_input(),
            Err(UcanError::UnknownAlgorithm(0x1234))
        ));
    }
}
