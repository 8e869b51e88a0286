use cairn_encoding::{Map, Value, decode, encode};
use cairn_multiformats::Cid;
use cairn_multiformats::codec::{DAG_CBOR, RAW};
use pretty_assertions::assert_eq;
use serde::Serialize;
use testresult::TestResult;

#[derive(Serialize)]
struct Header {
    roots: Vec<ipld_core::cid::Cid>,
    version: u64,
}

#[derive(Serialize)]
struct Mixed {
    a: i64,
    bb: bool,
    #[serde(with = "serde_bytes")]
    ccc: Vec<u8>,
    dddd: Option<String>,
    eeeee: Vec<String>,
}

fn reference(cid: &Cid) -> TestResult<ipld_core::cid::Cid> {
    Ok(ipld_core::cid::Cid::try_from(cid.as_bytes())?)
}

#[test]
fn archive_header_matches_dag_cbor() -> TestResult {
    let root = Cid::of(DAG_CBOR, b"root");
    let expected = serde_ipld_dagcbor::to_vec(&Header {
        roots: vec![reference(&root)?],
        version: 1,
    })?;

    let value = Value::from(
        Map::new()
            .with("roots", Value::List(vec![root.into()]))
            .with("version", 1),
    );
    assert_eq!(encode(&value)?, expected);
    Ok(())
}

#[test]
fn canonically_sorted_maps_match_dag_cbor() -> TestResult {
    let expected = serde_ipld_dagcbor::to_vec(&Mixed {
        a: -42,
        bb: true,
        ccc: vec![1, 2, 3],
        dddd: None,
        eeeee: vec!["x".into(), "y".into()],
    })?;

    let map = Map::new()
        .with("eeeee", Value::List(vec!["x".into(), "y".into()]))
        .with("ccc", Value::Bytes(vec![1, 2, 3]))
        .with("a", -42)
        .with("dddd", Value::Null)
        .with("bb", true)
        .sorted_canonical();
    assert_eq!(encode(&Value::from(map))?, expected);
    Ok(())
}

#[test]
fn dag_cbor_links_decode_as_links() -> TestResult {
    let cid = Cid::of(RAW, b"hello");
    let bytes = serde_ipld_dagcbor::to_vec(&vec![reference(&cid)?])?;
    assert_eq!(decode(&bytes)?, Value::List(vec![Value::Link(cid)]));
    Ok(())
}
