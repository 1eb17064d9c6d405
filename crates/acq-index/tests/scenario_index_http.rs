//! Scenario: index adapter against a mock HTTP endpoint
//!
//! # Invariants under test
//!
//! 1. search_page POSTs the query with from/size merged in.
//! 2. `hits.total` decodes in either wire form.
//! 3. AOI lookup sends a term query on the id field.
//! 4. update_doc wraps the partial document in `doc` and picks the typed or
//!    untyped endpoint.
//! 5. exists / list_ids.
//! 6. Non-success status => SourceError::Status.
//! 7. A hit without `_id` is skipped; the rest of the page survives.
//! 8. Document ids are sent as one encoded path segment.

use acq_index::{ClientOptions, IndexClient};
use acq_reconcile::{IndexSource, SourceError};
use httpmock::prelude::*;
use serde_json::json;

fn client(server: &MockServer) -> IndexClient {
    IndexClient::new(server.base_url(), &ClientOptions::default()).unwrap()
}

#[test]
fn search_page_merges_from_and_size() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/grq_acq/_search")
            .json_body(json!({ "query": { "match_all": {} }, "from": 1000, "size": 1000 }));
        then.status(200).json_body(json!({
            "hits": { "total": { "value": 1001, "relation": "eq" }, "hits": [
                { "_id": "acquisition-X-esa_scihub", "_source": { "metadata": { "title": "X" } } }
            ] }
        }));
    });

    let page = client(&server)
        .search_page("grq_acq", &json!({ "query": { "match_all": {} } }), 1000, 1000)
        .unwrap();

    m.assert();
    assert_eq!(page.total, Some(1001));
    assert_eq!(page.items[0].id, "acquisition-X-esa_scihub");
}

#[test]
fn aoi_lookup_uses_term_on_id_field() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/grq_aoi/_search")
            .json_body_partial(r#"{ "query": { "bool": { "must": [ { "term": { "id.raw": "AOI_1" } } ] } } }"#);
        then.status(200).json_body(json!({
            "hits": { "total": 1, "hits": [{ "_id": "AOI_1", "_source": { "id": "AOI_1" } }] }
        }));
    });

    let hits = client(&server)
        .find_by_id_field("grq_aoi", "id.raw", "AOI_1")
        .unwrap();

    m.assert();
    assert_eq!(hits.len(), 1);
}

#[test]
fn update_doc_typed_endpoint() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/grq_v2.0_acquisition-s1-iw_slc/acquisition-S1-IW_SLC/acq-1/_update")
            .json_body(json!({ "doc": { "metadata": { "tags": "deprecated" } } }));
        then.status(200).json_body(json!({ "result": "updated" }));
    });

    client(&server)
        .update_doc(
            "grq_v2.0_acquisition-s1-iw_slc",
            Some("acquisition-S1-IW_SLC"),
            "acq-1",
            &json!({ "metadata": { "tags": "deprecated" } }),
        )
        .unwrap();

    m.assert();
}

#[test]
fn update_doc_untyped_endpoint_and_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/idx/_update/missing");
        then.status(404).body(r#"{"error":"document_missing_exception"}"#);
    });

    let err = client(&server)
        .update_doc("idx", None, "missing", &json!({}))
        .unwrap_err();

    match err {
        SourceError::Status { code, body } => {
            assert_eq!(code, 404);
            assert!(body.contains("document_missing_exception"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn exists_checks_hit_total() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/grq_aoi/_search")
            .json_body_partial(r#"{ "query": { "ids": { "values": ["AOI_known"] } } }"#);
        then.status(200).json_body(json!({ "hits": { "total": 1, "hits": [] } }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/grq_aoi/_search")
            .json_body_partial(r#"{ "query": { "ids": { "values": ["AOI_other"] } } }"#);
        then.status(200).json_body(json!({ "hits": { "total": 0, "hits": [] } }));
    });

    let c = client(&server);
    assert!(c.exists("grq_aoi", "AOI_known").unwrap());
    assert!(!c.exists("grq_aoi", "AOI_other").unwrap());
}

#[test]
fn list_ids_pages_until_total() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/grq_aoi/_search")
            .json_body_partial(r#"{ "from": 0 }"#);
        then.status(200).json_body(json!({
            "hits": { "total": 3, "hits": [{ "_id": "a" }, { "_id": "b" }] }
        }));
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/grq_aoi/_search")
            .json_body_partial(r#"{ "from": 2 }"#);
        then.status(200).json_body(json!({
            "hits": { "total": 3, "hits": [{ "_id": "c" }] }
        }));
    });

    let ids = client(&server).list_ids("grq_aoi", 2).unwrap();

    assert_eq!(ids, vec!["a", "b", "c"]);
    first.assert_hits(1);
    second.assert_hits(1);
}

#[test]
fn server_error_is_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/idx/_search");
        then.status(500).body("boom");
    });

    let err = client(&server)
        .search_page("idx", &json!({ "query": { "match_all": {} } }), 0, 10)
        .unwrap_err();
    assert_eq!(
        err,
        SourceError::Status {
            code: 500,
            body: "boom".to_string()
        }
    );
}

#[test]
fn hit_without_id_is_skipped_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/grq_acq/_search");
        then.status(200).json_body(json!({
            "hits": { "total": 2, "hits": [
                { "_source": { "metadata": { "title": "NO_ID" } } },
                { "_id": "acquisition-GOOD-esa_scihub", "_source": { "metadata": { "title": "GOOD" } } }
            ] }
        }));
    });

    let page = client(&server)
        .search_page("grq_acq", &json!({ "query": { "match_all": {} } }), 0, 1000)
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "acquisition-GOOD-esa_scihub");
    assert_eq!(page.skipped, 1);
    assert_eq!(page.raw_len(), 2);
}

#[test]
fn update_doc_keeps_reserved_characters_inside_the_id() {
    let server = MockServer::start();
    let truncated = server.mock(|when, then| {
        when.method(POST).path("/idx/_update/acq");
        then.status(200).json_body(json!({ "result": "updated" }));
    });
    let any = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!({ "result": "updated" }));
    });

    client(&server)
        .update_doc("idx", None, "acq?v=2", &json!({}))
        .unwrap();

    truncated.assert_hits(0);
    any.assert_hits(1);
}
