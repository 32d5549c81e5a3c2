//! Allocation response decoding.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use kubecost_core::error::ErrorKind;
use kubecost_core::model::decode_allocations;

mod vector_loader;

#[test]
fn fixture_decodes_all_records() {
    let out = decode_allocations(&vector_loader::load_bytes("allocation_namespace.json")).unwrap();
    assert_eq!(out.records.len(), 3);

    let system = &out.records[1];
    assert_eq!(system.cpu_core_hours, 2.5);
    assert_eq!(system.raw_allocation_only.as_ref().unwrap().cpu_core_usage_max, 0.4);
    assert!(out.records[0].is_idle());
    assert!(!system.is_idle());
}

#[test]
fn empty_data_is_a_scrape_error() {
    for body in [
        r#"{"code":200,"status":"success","data":[]}"#,
        r#"{"code":200,"status":"success"}"#,
        r#"{"code":200,"status":"success","data":null}"#,
    ] {
        let err = decode_allocations(body.as_bytes()).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::Scrape, "body={body}");
        assert!(err.to_string().contains("empty allocations"));
    }
}

#[test]
fn null_first_element_is_an_empty_window() {
    let out = decode_allocations(br#"{"code":200,"data":[null]}"#).unwrap();
    assert!(out.records.is_empty());
}

#[test]
fn upstream_error_code_is_a_scrape_error() {
    let body = br#"{"code":400,"status":"error","message":"invalid window"}"#;
    let err = decode_allocations(body).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Scrape);
    assert!(err.to_string().contains("invalid window"));
}

#[test]
fn bad_record_is_rejected_and_siblings_survive() {
    let body = br#"{
        "code": 200,
        "data": [{
            "ok": { "name": "ok", "totalCost": 1.0 },
            "broken": { "name": "broken", "totalCost": "NaN" }
        }]
    }"#;
    let out = decode_allocations(body).unwrap();
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.rejected.len(), 1);
    assert_eq!(out.rejected[0].key, "broken");
    assert_eq!(out.rejected[0].error.kind(), ErrorKind::Decode);
}

#[test]
fn non_json_body_is_a_decode_error() {
    let err = decode_allocations(b"").expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Decode);
}
