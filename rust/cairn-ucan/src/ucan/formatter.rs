//! The JWT-shaped signing input.
//!
//! Signatures do not cover the canonical object bytes. They cover
//! `base64url(header) "." base64url(payload)`, where both halves are JSON with
//! keys in alphabetical order at every level. Byte strings render as
//! `{"/": {"bytes": <standard base64, unpadded>}}` and links as
//! `{"/": "<cid>"}`.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use cairn_encoding::Value;
use serde_json::{Map as JsonMap, Number, Value as Json, json};

use super::Payload;
use crate::capability::Capability;
use crate::error::UcanError;

/// The JWT header for algorithm `alg`.
pub fn header(alg: &str, version: &str) -> Json {
    json!({ "alg": alg, "typ": "JWT", "ucv": version })
}

/// The JWT payload.
///
/// `exp` is always present, `null` when the token never expires. `fct` is
/// left out when empty, `nbf` and `nnc` when unset.
pub fn payload(payload: &Payload) -> Result<Json, UcanError> {
    let mut object = JsonMap::new();
    object.insert(
        "att".into(),
        Json::Array(
            payload
                .capabilities
                .iter()
                .map(capability)
                .collect::<Result<_, _>>()?,
        ),
    );
    object.insert("aud".into(), payload.audience.as_str().into());
    object.insert(
        "exp".into(),
        payload
            .expiration
            .map_or(Json::Null, |exp| exp.to_unix().into()),
    );
    if !payload.facts.is_empty() {
        object.insert(
            "fct".into(),
            Json::Array(
                payload
                    .facts
                    .iter()
                    .map(|fact| to_json(&Value::Map(fact.clone()), "fct"))
                    .collect::<Result<_, _>>()?,
            ),
        );
    }
    object.insert("iss".into(), payload.issuer.as_str().into());
    if let Some(nbf) = payload.not_before {
        object.insert("nbf".into(), nbf.to_unix().into());
    }
    if let Some(nonce) = &payload.nonce {
        object.insert("nnc".into(), nonce.as_str().into());
    }
    object.insert(
        "prf".into(),
        payload
            .proofs
            .iter()
            .map(|proof| Json::String(proof.to_string()))
            .collect(),
    );
    Ok(Json::Object(object))
}

fn capability(capability: &Capability) -> Result<Json, UcanError> {
    to_json(&capability.to_value(), "att")
}

/// Render a canonical object as linked-data JSON. `field` names the payload
/// field it came from in errors.
pub fn to_json(value: &Value, field: &'static str) -> Result<Json, UcanError> {
    Ok(match value {
        Value::Integer(integer) => Json::Number(number(*integer, field)?),
        Value::Text(text) => Json::String(text.clone()),
        Value::Bytes(bytes) => json!({ "/": { "bytes": STANDARD_NO_PAD.encode(bytes) } }),
        Value::Bool(flag) => Json::Bool(*flag),
        Value::Null => Json::Null,
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| to_json(item, field))
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(key, value)| Ok((key.to_owned(), to_json(value, field)?)))
                .collect::<Result<_, UcanError>>()?,
        ),
        Value::Link(cid) => json!({ "/": cid.to_string() }),
    })
}

fn number(integer: i128, field: &'static str) -> Result<Number, UcanError> {
    if let Ok(signed) = i64::try_from(integer) {
        Ok(signed.into())
    } else if let Ok(unsigned) = u64::try_from(integer) {
        Ok(unsigned.into())
    } else {
        Err(UcanError::InvalidField {
            field,
            reason: "integer does not fit a JSON number",
        })
    }
}

/// `base64url(header) "." base64url(payload)` for a token signed with `alg`.
pub fn signing_input(alg: &str, version: &str, fields: &Payload) -> Result<String, UcanError> {
    let header = serde_json::to_vec(&header(alg, version))?;
    let payload = serde_json::to_vec(&payload(fields)?)?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;
    use cairn_encoding::Map;
    use cairn_multiformats::Cid;
    use cairn_multiformats::codec::RAW;
    use cairn_varsig::Did;
    use pretty_assertions::assert_eq;

    fn fields() -> Payload {
        let issuer: Did = "did:key:z6Mkk89bC3JrVqKie71YEcc5M1SMVxuCgNx6zLZ8SYJsxALi"
            .parse()
            .unwrap();
        let audience: Did = "did:web:example.com".parse().unwrap();
        let mut payload = Payload::new(issuer, audience);
        payload.capabilities.push(Capability::new("store/add", "did:key:zSPACE"));
        payload
    }

    #[test]
    fn the_header_is_stable() {
        let header = serde_json::to_vec(&header("EdDSA", "0.9.1")).unwrap();
        assert_eq!(
            URL_SAFE_NO_PAD.encode(header),
            "eyJhbGciOiJFZERTQSIsInR5cCI6IkpXVCIsInVjdiI6IjAuOS4xIn0"
        );
    }

    #[test]
    fn payload_keys_are_alphabetical_and_optional_fields_are_omitted() {
        let json = serde_json::to_string(&payload(&fields()).unwrap()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"att":[{"can":"store/add","with":"did:key:zSPACE"}],"#,
                r#""aud":"did:web:example.com","exp":null,"#,
                r#""iss":"did:key:z6Mkk89bC3JrVqKie71YEcc5M1SMVxuCgNx6zLZ8SYJsxALi","prf":[]}"#
            )
        );
    }

    #[test]
    fn optional_fields_appear_when_set() {
        let proof = Cid::of(RAW, b"proof");
        let mut fields = fields();
        fields.expiration = Some(Timestamp::from_unix(2_000));
        fields.not_before = Some(Timestamp::from_unix(1_000));
        fields.nonce = Some("n1".into());
        fields.facts.push(Map::new().with("origin", "test"));
        fields.proofs.push(proof.clone());

        let json = payload(&fields).unwrap();
        assert_eq!(json["exp"], 2_000);
        assert_eq!(json["nbf"], 1_000);
        assert_eq!(json["nnc"], "n1");
        assert_eq!(json["fct"], json!([{ "origin": "test" }]));
        assert_eq!(json["prf"], json!([proof.to_string()]));
    }

    #[test]
    fn bytes_use_unpadded_standard_base64() {
        let json = to_json(&Value::Bytes(vec![1, 2, 3, 255]), "fct").unwrap();
        assert_eq!(json, json!({ "/": { "bytes": "AQID/w" } }));
    }

    #[test]
    fn links_render_as_cid_text() {
        let cid = Cid::of(RAW, b"linked");
        assert_eq!(
            to_json(&Value::Link(cid.clone()), "fct").unwrap(),
            json!({ "/": cid.to_string() })
        );
    }

    #[test]
    fn oversized_integers_name_their_field() {
        let huge = Value::Integer(i128::from(u64::MAX) + 1);

        let mut with_fact = fields();
        with_fact.facts.push(Map::new().with("size", huge.clone()));
        assert!(matches!(
            payload(&with_fact),
            Err(UcanError::InvalidField { field: "fct", .. })
        ));

        let mut with_caveat = fields();
        with_caveat.capabilities[0] = Capability::new("store/add", "did:key:zSPACE")
            .with_caveats(Map::new().with("size", huge));
        assert!(matches!(
            payload(&with_caveat),
            Err(UcanError::InvalidField { field: "att", .. })
        ));
    }

    #[test]
    fn signing_input_joins_both_halves() {
        let input = signing_input("EdDSA", "0.9.1", &fields()).unwrap();
        let (header, body) = input.split_once('.').unwrap();
        assert_eq!(header, "eyJhbGciOiJFZERTQSIsInR5cCI6IkpXVCIsInVjdiI6IjAuOS4xIn0");
        let body: Json = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(body).unwrap()).unwrap();
        assert_eq!(body, payload(&fields()).unwrap());
    }
}
