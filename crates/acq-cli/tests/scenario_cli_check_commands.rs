//! Scenario: `acq check-acquisitions` / `acq check-ipf` end to end
//!
//! Both systems of record are served by one mock HTTP server:
//! - AOI lookup      POST /grq_aoi/_search
//! - index search    POST /grq_acq/_search
//! - catalog search  GET  /apihub/search
//!
//! GREEN when:
//! - an incomplete reconciliation exits 2 and lists MISSING / STALE titles
//! - a complete one exits 0
//! - an unknown AOI fails (exit 1) naming the AOI
//! - check-ipf lists unfilled acquisitions and exits 2

use assert_cmd::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::process::Command;

fn write_config(server: &MockServer) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"
catalog:
  base_url: "{base}/apihub"
  credentials_env:
    username: "ACQ_CLI_SENTINEL_UNSET_USER"
    password: "ACQ_CLI_SENTINEL_UNSET_PASS"
index:
  base_url: "{base}"
  aoi_index: "grq_aoi"
  acquisition_index: "grq_acq"
"#,
        base = server.base_url()
    )
    .unwrap();
    f
}

fn mock_aoi(server: &MockServer, id: &str) {
    let id = id.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/grq_aoi/_search")
            .json_body_partial(
                json!({ "query": { "bool": { "must": [{ "term": { "id.raw": id } }] } } })
                    .to_string(),
            );
        then.status(200).json_body(json!({
            "hits": { "total": 1, "hits": [{
                "_id": id,
                "_source": {
                    "id": id,
                    "starttime": "2018-01-01T00:00:00",
                    "endtime": "2018-03-01T00:00:00",
                    "location": {
                        "type": "polygon",
                        "coordinates": [[[-118.0, 34.0], [-117.0, 34.0], [-117.0, 35.0], [-118.0, 35.0], [-118.0, 34.0]]]
                    }
                }
            }] }
        }));
    });
}

fn catalog_entry(title: &str, ingestion: &str) -> Value {
    json!({
        "title": title,
        "date": { "name": "ingestiondate", "content": ingestion },
        "int": { "name": "relativeorbitnumber", "content": "64" }
    })
}

fn index_hit(title: &str, ingestion: &str) -> Value {
    json!({
        "_id": format!("acquisition-{title}-esa_scihub"),
        "_source": { "metadata": { "title": title, "ingestiondate": ingestion } }
    })
}

fn mock_catalog(server: &MockServer, entries: Vec<Value>) {
    server.mock(move |when, then| {
        when.method(GET).path("/apihub/search");
        then.status(200).json_body(json!({
            "feed": { "opensearch:totalResults": entries.len().to_string(), "entry": entries }
        }));
    });
}

fn mock_index(server: &MockServer, hits: Vec<Value>) {
    server.mock(move |when, then| {
        when.method(POST).path("/grq_acq/_search");
        then.status(200)
            .json_body(json!({ "hits": { "total": hits.len(), "hits": hits } }));
    });
}

fn acq(config: &tempfile::NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("acq").unwrap();
    cmd.arg("--config").arg(config.path());
    cmd
}

#[test]
fn incomplete_reconciliation_exits_2() {
    let server = MockServer::start();
    mock_aoi(&server, "AOI_T");
    mock_catalog(
        &server,
        vec![
            catalog_entry("S1A_A", "2018-01-10T00:00:00Z"),
            catalog_entry("S1A_B", "2018-01-20T00:00:00Z"),
            catalog_entry("S1A_C", "2018-01-10T00:00:00Z"),
        ],
    );
    mock_index(
        &server,
        vec![
            index_hit("S1A_B", "2018-01-10T00:00:00Z"),
            index_hit("S1A_C", "2018-01-10T00:00:00Z"),
            index_hit("S1A_D", "2018-01-10T00:00:00Z"),
        ],
    );
    let config = write_config(&server);

    acq(&config)
        .args(["check-acquisitions", "--aoi", "AOI_T", "--track", "64"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Missing acquisition count: 2"))
        .stdout(predicate::str::contains("MISSING S1A_A"))
        .stdout(predicate::str::contains("STALE S1A_B"))
        .stdout(predicate::str::contains("S1A_D").not());
}

#[test]
fn complete_reconciliation_exits_0() {
    let server = MockServer::start();
    mock_aoi(&server, "AOI_T");
    mock_catalog(&server, vec![catalog_entry("S1A_A", "2018-01-10T00:00:00Z")]);
    mock_index(&server, vec![index_hit("S1A_A", "2018-01-10T00:00:00Z")]);
    let config = write_config(&server);

    acq(&config)
        .args(["check-acquisitions", "--aoi", "AOI_T", "--track", "64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("There are no missing acquisitions!"));
}

#[test]
fn json_output_is_the_result_value() {
    let server = MockServer::start();
    mock_aoi(&server, "AOI_T");
    mock_catalog(&server, vec![catalog_entry("S1A_A", "2018-01-10T00:00:00Z")]);
    mock_index(&server, vec![]);
    let config = write_config(&server);

    let out = acq(&config)
        .args(["check-acquisitions", "--aoi", "AOI_T", "--track", "64", "--json"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(2));
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["missing"][0]["title"], "S1A_A");
    assert_eq!(v["catalog_count"], 1);
}

#[test]
fn unknown_aoi_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/grq_aoi/_search");
        then.status(200).json_body(json!({ "hits": { "total": 0, "hits": [] } }));
    });
    let config = write_config(&server);

    acq(&config)
        .args(["check-acquisitions", "--aoi", "AOI_NOPE", "--track", "64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("AOI_NOPE"));
}

#[test]
fn catalog_outage_fails_without_report() {
    let server = MockServer::start();
    mock_aoi(&server, "AOI_T");
    server.mock(|when, then| {
        when.method(GET).path("/apihub/search");
        then.status(503).body("down for maintenance");
    });
    let config = write_config(&server);

    acq(&config)
        .args(["check-acquisitions", "--aoi", "AOI_T", "--track", "64"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("MISSING").not())
        .stderr(predicate::str::contains("503"));
}

#[test]
fn check_ipf_lists_unfilled() {
    let server = MockServer::start();
    mock_aoi(&server, "AOI_T");
    mock_index(
        &server,
        vec![
            json!({ "_id": "acq-2", "_source": { "metadata": {} } }),
            json!({ "_id": "acq-1", "_source": { "metadata": {} } }),
        ],
    );
    let config = write_config(&server);

    acq(&config)
        .args(["check-ipf", "--aoi", "AOI_T", "--track", "64"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Missing ipfs count: 2\nAcquisitions:\nacq-1\nacq-2\n"));
}
