//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: HTTP request → upstream pages → streamed JSON array

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use futures::TryStreamExt;
use odata_list_service::cli::router;
use odata_list_service::output::write_json_array;
use odata_list_service::types::{AuthMode, Dialect};
use odata_list_service::{Error, Settings, SyncEngine, SyncRequest};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use tower::ServiceExt;
use wiremock::matchers::{header as header_is, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/_api/Lists/Projects/items";

fn settings(server: &MockServer, dialect: Dialect) -> Settings {
    Settings {
        base_url: Some(format!("{}/_api", server.uri())),
        auth_mode: AuthMode::None,
        dialect,
        timeout_secs: 5,
        ..Settings::default()
    }
}

async fn engine(server: &MockServer, dialect: Dialect) -> SyncEngine {
    settings(server, dialect).build_engine().await.unwrap()
}

async fn get(engine: SyncEngine, uri: &str) -> Response {
    router(engine)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A page body in the given dialect
fn page(dialect: Dialect, entities: Value, next: Option<&str>) -> Value {
    match (dialect, next) {
        (Dialect::Auto | Dialect::Verbose, Some(next)) => {
            json!({"d": {"results": entities, "__next": next}})
        }
        (Dialect::Auto | Dialect::Verbose, None) => json!({"d": {"results": entities}}),
        (Dialect::NextLink, Some(next)) => json!({"value": entities, "odata.nextLink": next}),
        (Dialect::OdataNextLink, Some(next)) => {
            json!({"value": entities, "@odata.nextLink": next})
        }
        (_, None) => json!({"value": entities}),
    }
}

/// Mount a list of pages chained by `$skiptoken` cursors
async fn mount_pages(server: &MockServer, dialect: Dialect, pages: &[Value]) {
    for (i, entities) in pages.iter().enumerate() {
        let next = (i + 1 < pages.len())
            .then(|| format!("{}{LIST_PATH}?$skiptoken={}", server.uri(), i + 1));
        let body = page(dialect, entities.clone(), next.as_deref());

        let mock = Mock::given(method("GET")).and(path(LIST_PATH));
        let mock = if i == 0 {
            mock.and(query_param_is_missing("$skiptoken"))
        } else {
            mock.and(query_param("$skiptoken", i.to_string()))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }
}

// ============================================================================
// Streaming Endpoint
// ============================================================================

#[test_case(Dialect::Verbose, 1 ; "verbose single page")]
#[test_case(Dialect::Verbose, 3 ; "verbose three pages")]
#[test_case(Dialect::NextLink, 2 ; "next link two pages")]
#[test_case(Dialect::OdataNextLink, 3 ; "odata next link three pages")]
#[test_case(Dialect::Auto, 2 ; "auto two pages")]
#[tokio::test]
async fn test_streams_every_page_in_order(dialect: Dialect, page_count: usize) {
    let server = MockServer::start().await;
    let pages: Vec<Value> = (0..page_count)
        .map(|p| json!([{"Id": p * 10 + 1}, {"Id": p * 10 + 2}]))
        .collect();
    mount_pages(&server, dialect, &pages).await;

    let response = get(engine(&server, dialect).await, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let expected: Vec<Value> = pages
        .iter()
        .flat_map(|p| p.as_array().unwrap().clone())
        .collect();
    assert_eq!(body_json(response).await, Value::Array(expected));
}

#[tokio::test]
async fn test_auto_detects_value_dialect() {
    let server = MockServer::start().await;
    mount_pages(
        &server,
        Dialect::OdataNextLink,
        &[json!([{"id": 1}]), json!([{"id": 2}])],
    )
    .await;

    let response = get(engine(&server, Dialect::Auto).await, "/Lists/Projects/items").await;
    assert_eq!(body_json(response).await, json!([{"id": 1}, {"id": 2}]));
}

#[tokio::test]
async fn test_empty_list_is_empty_array() {
    let server = MockServer::start().await;
    mount_pages(&server, Dialect::Verbose, &[json!([])]).await;

    let response = get(engine(&server, Dialect::Auto).await, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"[]");
}

#[tokio::test]
async fn test_unrecognized_body_is_empty_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2]})))
        .mount(&server)
        .await;

    let response = get(engine(&server, Dialect::Auto).await, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_d_takes_precedence_over_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"from": "d"}]},
            "value": [{"from": "value"}]
        })))
        .mount(&server)
        .await;

    let response = get(engine(&server, Dialect::Auto).await, "/Lists/Projects/items").await;
    assert_eq!(body_json(response).await, json!([{"from": "d"}]));
}

// ============================================================================
// Incremental Sync
// ============================================================================

#[tokio::test]
async fn test_since_adds_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param(
            "$filter",
            "Modified gt datetime'2024-01-01T00:00:00Z'",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(Dialect::Verbose, json!([{"Id": 9}]), None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = get(
        engine(&server, Dialect::Auto).await,
        "/Lists/Projects/items?since=2024-01-01T00:00:00Z",
    )
    .await;
    assert_eq!(body_json(response).await, json!([{"Id": 9}]));
}

#[tokio::test]
async fn test_since_filter_for_value_dialect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("$filter", "Modified gt 2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = get(
        engine(&server, Dialect::NextLink).await,
        "/Lists/Projects/items?since=2024-01-01T00:00:00Z",
    )
    .await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_since_path_sets_updated() {
    let server = MockServer::start().await;
    mount_pages(
        &server,
        Dialect::Verbose,
        &[
            json!([{"Id": 1, "a": {"b": 7}}]),
            json!([{"Id": 2, "a": {}}]),
        ],
    )
    .await;

    let response = get(
        engine(&server, Dialect::Verbose).await,
        "/Lists/Projects/items?since_path=a.b&list=ignored",
    )
    .await;

    assert_eq!(
        body_json(response).await,
        json!([
            {"Id": 1, "a": {"b": 7}, "_updated": 7},
            {"Id": 2, "a": {}, "_updated": null}
        ])
    );
}

#[tokio::test]
async fn test_builtin_expansion_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_api/Tasks/items"))
        .and(query_param("$expand", "AssignedTo,Author,Editor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"d": {"results": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let response = get(engine(&server, Dialect::Auto).await, "/Tasks/items").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Error Responses
// ============================================================================

#[tokio::test]
async fn test_first_page_404_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("List does not exist"))
        .mount(&server)
        .await;

    let response = get(engine(&server, Dialect::Auto).await, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("404"));
    assert!(message.contains("List does not exist"));
}

#[tokio::test]
async fn test_missing_credentials_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = settings(&server, Dialect::Auto);
    settings.auth_mode = AuthMode::Basic;
    settings.username = Some("alice".into());
    let engine = settings.build_engine().await.unwrap();

    let response = get(engine, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("password"));
}

#[tokio::test]
async fn test_upstream_timeout_is_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"value": []}))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut settings = settings(&server, Dialect::Auto);
    settings.timeout_secs = 1;
    let engine = settings.build_engine().await.unwrap();

    let response = get(engine, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_later_page_error_truncates_body() {
    let server = MockServer::start().await;
    let next = format!("{}{LIST_PATH}?$skiptoken=1", server.uri());
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param_is_missing("$skiptoken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(Dialect::Verbose, json!([{"Id": 1}]), Some(&next))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("$skiptoken", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("throttled"))
        .mount(&server)
        .await;

    let response = get(engine(&server, Dialect::Auto).await, "/Lists/Projects/items").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_basic_credentials_sent_on_every_page() {
    let server = MockServer::start().await;
    let next = format!("{}{LIST_PATH}?$skiptoken=1", server.uri());
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param_is_missing("$skiptoken"))
        .and(header_is("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": 1}],
            "odata.nextLink": next
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("$skiptoken", "1"))
        .and(header_is("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"id": 2}]})))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server, Dialect::NextLink);
    settings.auth_mode = AuthMode::Basic;
    settings.username = Some("alice".into());
    settings.password = Some("secret".into());
    let engine = settings.build_engine().await.unwrap();

    let response = get(engine, "/Lists/Projects/items").await;
    assert_eq!(body_json(response).await, json!([{"id": 1}, {"id": 2}]));
}

#[tokio::test]
async fn test_oauth2_token_fetched_once_for_all_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(header_is("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"id": 1}]})))
        .expect(2)
        .mount(&server)
        .await;

    let mut settings = settings(&server, Dialect::OdataNextLink);
    settings.auth_mode = AuthMode::Oauth2;
    settings.token_url = Some(format!("{}/token", server.uri()));
    settings.client_id = Some("client".into());
    settings.client_secret = Some("secret".into());
    let engine = settings.build_engine().await.unwrap();

    for _ in 0..2 {
        let response = get(engine.clone(), "/Lists/Projects/items").await;
        assert_eq!(body_json(response).await, json!([{"id": 1}]));
    }
}

// ============================================================================
// Engine Without the Server
// ============================================================================

#[tokio::test]
async fn test_engine_to_writer() {
    let server = MockServer::start().await;
    mount_pages(
        &server,
        Dialect::NextLink,
        &[json!([{"id": 1}]), json!([{"id": 2}, {"id": 3}])],
    )
    .await;

    let engine = engine(&server, Dialect::NextLink).await;
    let entities = engine
        .start(SyncRequest::new("Lists/Projects/items"))
        .await
        .unwrap();

    let mut out = Vec::new();
    let written = write_json_array(entities, &mut out).await.unwrap();

    assert_eq!(written, 3);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        r#"[{"id":1},{"id":2},{"id":3}]"#
    );
}

#[tokio::test]
async fn test_engine_last_page_404() {
    let server = MockServer::start().await;
    let next = format!("{}{LIST_PATH}?$skiptoken=1", server.uri());
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param_is_missing("$skiptoken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"value": [{"id": 1}], "@odata.nextLink": next})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("$skiptoken", "1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let engine = engine(&server, Dialect::OdataNextLink).await;
    let result: Result<Vec<_>, Error> = engine
        .entities(SyncRequest::new("Lists/Projects/items"))
        .try_collect()
        .await;

    match result {
        Err(Error::Upstream { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "gone");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}
