// HTTP-level tests for the CONTENTdm and FromThePage clients.

use catcher_api_client::{CdmClient, FtpClient, RemoteError};
use catcher_recon::Catalog;
use httpmock::prelude::*;
use serde_json::json;

const QUERY_PATH: &str = "/dmwebservices/index.php";

fn query(start: usize) -> String {
    format!("dmQuery/coll/0/identi/nosort/1024/{start}/1/0/0/0/0/0/json")
}

fn records(range: std::ops::Range<usize>) -> Vec<serde_json::Value> {
    range
        .map(|i| json!({"pointer": i, "filetype": "jp2", "identi": format!("ID-{i}")}))
        .collect()
}

// ── Query pagination ────────────────────────────────────────────────

#[test]
fn query_pages_until_total() {
    let server = MockServer::start();

    let first = server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH).query_param("q", query(1));
        then.status(200).json_body(json!({
            "pager": {"start": "1", "maxrecs": "1024", "total": 1030},
            "records": records(0..1024)
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH).query_param("q", query(1025));
        then.status(200).json_body(json!({
            "pager": {"start": "1025", "maxrecs": "1024", "total": "1030"},
            "records": records(1024..1030)
        }));
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    let result = client.list_records("/coll", "identi").unwrap();

    first.assert();
    second.assert();
    assert_eq!(result.len(), 1030);
    assert_eq!(result[0].pointer, "0");
    assert_eq!(result[1029].identifier, "ID-1029");
    assert!(!result[0].is_compound);
}

#[test]
fn query_exactly_one_page_makes_one_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH).query_param("q", query(1));
        then.status(200).json_body(json!({
            "pager": {"start": "1", "maxrecs": "1024", "total": 2},
            "records": [
                {"pointer": 10, "filetype": "cpd", "identi": "A"},
                {"pointer": 11, "filetype": "jp2", "identi": {}}
            ]
        }));
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    let result = client.list_records("coll", "identi").unwrap();

    mock.assert_calls(1);
    assert!(result[0].is_compound);
    assert_eq!(result[1].identifier, "");
}

// ── Error classification ────────────────────────────────────────────

#[test]
fn application_error_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH);
        then.status(200)
            .json_body(json!({"code": "-2", "message": "Requested item not found", "restrictionCode": "-1"}));
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    let err = client.item_info("coll", "99").unwrap_err();
    assert!(matches!(err, RemoteError::Application(ref m) if m.contains("Requested item not found")));
}

#[test]
fn http_status_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH);
        then.status(503).body("maintenance");
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    let err = client.collection_list().unwrap_err();
    assert_eq!(err, RemoteError::Http(503, "maintenance".into()));
}

#[test]
fn malformed_body_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(QUERY_PATH);
        then.status(200).body("<html>oops</html>");
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    assert!(matches!(
        client.field_info("coll").unwrap_err(),
        RemoteError::Malformed(_)
    ));
}

#[test]
fn unreachable_server_is_transport_error() {
    let client = CdmClient::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        client.collection_list().unwrap_err(),
        RemoteError::Transport(_)
    ));
}

// ── Item and compound info ──────────────────────────────────────────

#[test]
fn child_pointers_flatten_nested_nodes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path(QUERY_PATH)
            .query_param("q", "dmGetCompoundObjectInfo/coll/50/json");
        then.status(200).json_body(json!({
            "type": "Monograph",
            "node": {
                "nodetitle": "Volume",
                "node": [
                    {"nodetitle": "Part 1", "page": [{"pageptr": "41"}, {"pageptr": "42"}]},
                    {"nodetitle": "Part 2", "page": {"pageptr": "43"}}
                ]
            }
        }));
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    assert_eq!(client.child_pointers("coll", "50").unwrap(), vec!["41", "42", "43"]);
}

#[test]
fn item_info_and_schema() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path(QUERY_PATH)
            .query_param("q", "dmGetItemInfo/coll/7/json");
        then.status(200)
            .json_body(json!({"title": "Letter", "subjec": {}, "dmrecord": "7"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path(QUERY_PATH)
            .query_param("q", "dmGetCollectionFieldInfo/coll/json");
        then.status(200).json_body(json!([
            {"name": "Title", "nick": "title", "type": "TEXT", "dc": "title", "req": 1, "search": 1, "hide": 0, "vocab": 0, "readonly": 0},
            {"name": "Subject", "nick": "subjec", "type": "TEXT", "dc": "subjec", "req": 0, "search": 1, "hide": 0, "vocab": 1, "readonly": 0}
        ]));
    });

    let client = CdmClient::new(&server.base_url()).unwrap();
    let info = client.item_info("/coll", "7").unwrap();
    assert_eq!(info["title"], "Letter");
    assert_eq!(info["subjec"], "");

    let fields = client.field_info("coll").unwrap();
    assert_eq!(fields.len(), 2);
    assert!(fields[0].required);
    assert!(fields[1].vocabulary);
}

// ── FromThePage ─────────────────────────────────────────────────────

#[test]
fn ftp_collection_and_structured_data() {
    let server = MockServer::start();
    let manifest_url = format!("{}/iiif/55/manifest", server.base_url());
    let data_url = format!("{}/iiif/55/page/1/structured", server.base_url());

    server.mock(|when, then| {
        when.method(GET).path("/iiif/collection/archive/letters");
        then.status(200).json_body(json!({
            "manifests": [{"@id": manifest_url, "label": "Letter 1"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/iiif/55/manifest");
        then.status(200).json_body(json!({
            "label": "Letter 1",
            "dc:source": "https://cdm.example.org/digital/collection/coll/id/70",
            "sequences": [{"canvases": [
                {"@id": "p1", "label": "1", "seeAlso": [{"@id": data_url, "label": "Structured data"}]}
            ]}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/iiif/55/page/1/structured");
        then.status(200)
            .json_body(json!({"data": [{"label": "Sender", "value": ["Ada", "Bea"]}]}));
    });

    let client = FtpClient::new(&server.base_url()).unwrap();
    let manifests = client.collection_manifests("archive/letters").unwrap();
    assert_eq!(manifests.len(), 1);

    let work = client.work(&manifests[0].url).unwrap();
    assert_eq!(work.pages.len(), 1);
    let url = work.pages[0].rendering("Structured data").unwrap();
    let pairs = client.structured_data(url).unwrap();
    assert_eq!(pairs, vec![("Sender".to_string(), "Ada; Bea".to_string())]);
}
