mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockServer;
use rerank_testbed_client::{
    ClientError, HttpBackendConfig, QueryRequest, RerankRequest, SearchBackend, SessionError,
    TestbedSession, build_search_backend,
};
use rerank_testbed_core::Item;
use serde_json::json;

fn catalogue() -> serde_json::Value {
    json!([
        {"work_id": 1, "work_title": "Dune", "work_author": "Frank Herbert", "work_synopsis": "Desert planet."},
        {"work_id": 2, "work_title": "Emma", "work_author": "Jane Austen", "work_synopsis": "Matchmaking."}
    ])
}

fn backend_for(server: &MockServer) -> Arc<dyn SearchBackend> {
    build_search_backend(
        HttpBackendConfig::new(format!("{}/", server.base_url)).with_timeout(Duration::from_secs(5)),
    )
    .expect("build backend")
}

fn search_api(path: &str, _body: &serde_json::Value) -> (u16, String) {
    match path {
        "/search/parse" => (200, json!({"items": catalogue()}).to_string()),
        "/search/rerank" => (
            200,
            json!({"result": {"reason": "  austen fans  ", "work_id": [2, 77, 1], "model": "x"}})
                .to_string(),
        ),
        "/search" => (
            200,
            json!({
                "parsed_items": catalogue(),
                "rerank_result": {"reason": "kept order", "work_id": [1, 2]}
            })
            .to_string(),
        ),
        _ => (404, json!({"detail": "not found"}).to_string()),
    }
}

#[tokio::test]
async fn endpoints_receive_expected_payloads() {
    let server = MockServer::start(search_api);
    let backend = backend_for(&server);

    let parsed = backend
        .parse(QueryRequest::new("regency romance"))
        .await
        .expect("parse");
    assert_eq!(parsed.items.len(), 2);

    let reranked = backend
        .rerank(RerankRequest {
            query: "regency romance".to_string(),
            items: parsed.items.clone(),
        })
        .await
        .expect("rerank");
    let result = reranked.result.expect("result");
    assert_eq!(result.order(), &[2, 77, 1]);
    assert_eq!(result.extension("model"), Some(&json!("x")));

    let combined = backend
        .search(QueryRequest::new("regency romance"))
        .await
        .expect("combined");
    assert_eq!(combined.parsed_items, parsed.items);

    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.method == "POST"));
    assert_eq!(requests[0].path, "/search/parse");
    assert_eq!(requests[0].body, json!({"query": "regency romance"}));
    assert_eq!(requests[1].path, "/search/rerank");
    assert_eq!(requests[1].body["items"], catalogue());
    assert_eq!(requests[2].path, "/search");
    assert_eq!(requests[2].body, json!({"query": "regency romance"}));
}

#[tokio::test]
async fn error_status_surfaces_status_and_body() {
    let server = MockServer::start(|_, _| (503, r#"{"detail":"warming up"}"#.to_string()));
    let backend = backend_for(&server);

    let err = backend
        .parse(QueryRequest::new("anything"))
        .await
        .expect_err("503 must fail");
    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("warming up"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start(|_, _| (200, "<html>oops</html>".to_string()));
    let backend = backend_for(&server);

    let err = backend
        .search(QueryRequest::new("anything"))
        .await
        .expect_err("html must fail");
    assert!(matches!(err, ClientError::Serde(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve addr");
        listener.local_addr().expect("addr")
    };
    let backend = build_search_backend(
        HttpBackendConfig::new(format!("http://{addr}")).with_timeout(Duration::from_secs(2)),
    )
    .expect("build backend");

    let err = backend
        .parse(QueryRequest::new("anything"))
        .await
        .expect_err("nothing listens");
    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test]
async fn session_reorders_over_http() {
    let server = MockServer::start(search_api);
    let session = TestbedSession::new(backend_for(&server));

    session.parse("regency romance").await.expect("parse");
    let outcome = session.rerank("regency romance").await.expect("rerank");

    let titles: Vec<&str> = outcome
        .reordered()
        .iter()
        .map(|item| item.work_title.as_str())
        .collect();
    assert_eq!(titles, vec!["Emma", "Dune"]);
    assert_eq!(outcome.reason(), "austen fans");
    assert_eq!(outcome.comparison().unknown_ids, vec![77]);
}

#[tokio::test]
async fn session_surfaces_http_failures() {
    let server = MockServer::start(|_, _| (500, "boom".to_string()));
    let session = TestbedSession::new(backend_for(&server));
    session
        .load_items(vec![Item::new(1, "Dune")])
        .expect("load items");

    let err = session.rerank("q").await.expect_err("500 must fail");
    assert!(matches!(
        err,
        SessionError::Client(ClientError::Api { status: 500, .. })
    ));
    assert_eq!(session.items().len(), 1);
}
