use cairn_multiformats::Cid;
use cairn_multiformats::codec::{DAG_CBOR, RAW};
use pretty_assertions::assert_eq;
use testresult::TestResult;

#[test]
fn raw_cid_of_hello_matches_the_ecosystem() -> TestResult {
    let cid = Cid::of(RAW, b"hello");
    let text = cid.to_string();
    assert!(text.starts_with('b'));

    let reference = ipld_core::cid::Cid::try_from(text.as_str())?;
    assert_eq!(reference.to_bytes(), cid.as_bytes());
    assert_eq!(reference.codec(), RAW);
    assert_eq!(Cid::parse(&text)?, cid);
    Ok(())
}

#[test]
fn legacy_cid_matches_the_ecosystem() -> TestResult {
    let text = "QmdfTbBqBPQ7VNxZEYEj14VmRuZBkqFbiwReogJgS1zR1n";
    let reference = ipld_core::cid::Cid::try_from(text)?;
    let cid = Cid::parse(text)?;
    assert_eq!(reference.to_bytes(), cid.as_bytes());
    assert_eq!(reference.into_v1()?.to_bytes(), cid.to_v1().as_bytes());
    Ok(())
}

#[test]
fn decoding_accepts_ecosystem_bytes() -> TestResult {
    let digest = ipld_core::cid::multihash::Multihash::<64>::wrap(0x12, &[7u8; 32])?;
    let reference = ipld_core::cid::Cid::new_v1(DAG_CBOR, digest);
    let cid = Cid::decode(&reference.to_bytes())?;
    assert_eq!(cid.to_string(), reference.to_string());
    assert_eq!(cid.multihash().digest(), &[7u8; 32]);
    Ok(())
}
