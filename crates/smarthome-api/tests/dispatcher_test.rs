#![allow(clippy::unwrap_used)]
// Integration tests for `Dispatcher` against a wiremock backend.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smarthome_api::{
    ApiRequest, ConnectionStatus, DemoDataSource, Dispatcher, Error, SessionState,
    TransportConfig,
};
use smarthome_config::{KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Dispatcher, Arc<MemoryStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Dispatcher::with_demo_source(
        store.clone(),
        TransportConfig::default(),
        DemoDataSource::with_seed(7),
    )
    .unwrap();
    dispatcher.set_server_url(&server.uri()).unwrap();
    (server, dispatcher, store)
}

// ── Live requests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_returns_payload() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/scenarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "s1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let value = dispatcher
        .request(ApiRequest::get("/scenarios"))
        .await
        .unwrap();
    assert_eq!(value, json!([{ "id": "s1" }]));
}

#[tokio::test]
async fn test_bearer_token_attached_when_stored() {
    let (server, dispatcher, store) = setup().await;
    store.set(TOKEN_KEY, "abc").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .request(ApiRequest::get("/users/me"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    dispatcher.request(ApiRequest::get("/devices")).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_query_and_body_forwarded() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/locations"))
        .and(query_param("dry_run", "1"))
        .and(body_json(json!({ "name": "Cottage" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "l9" })))
        .expect(1)
        .mount(&server)
        .await;

    let created = dispatcher
        .request(
            ApiRequest::post("/locations")
                .with_query("dry_run", "1")
                .with_body(json!({ "name": "Cottage" })),
        )
        .await
        .unwrap();
    assert_eq!(created["id"], "l9");
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/scenarios/s1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let value = dispatcher
        .request(ApiRequest::delete("/scenarios/s1"))
        .await
        .unwrap();
    assert!(value.is_null());
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_clears_session_and_signals_login() {
    let (server, dispatcher, store) = setup().await;
    store.set(TOKEN_KEY, "stale").unwrap();
    store.set(USER_KEY, r#"{"id":"u1"}"#).unwrap();
    let session = dispatcher.session();

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .mount(&server)
        .await;

    let result = dispatcher.request(ApiRequest::get("/devices")).await;

    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
    assert!(store.get(TOKEN_KEY).is_none());
    assert!(store.get(USER_KEY).is_none());
    assert_eq!(*session.borrow(), SessionState::LoginRequired);
}

#[tokio::test]
async fn test_status_error_carries_backend_message() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Location not found" })),
        )
        .mount(&server)
        .await;

    let err = dispatcher
        .request(ApiRequest::get("/locations/missing"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Location not found");
        }
        other => panic!("expected Status, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_deserialization_error() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/scenarios"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = dispatcher.request(ApiRequest::get("/scenarios")).await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_non_ascii_non_json_body_is_deserialization_error() {
    let (server, dispatcher, _) = setup().await;
    let body = format!("{}Ошибка сервера", "x".repeat(199));

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let err = dispatcher
        .request(ApiRequest::get("/devices"))
        .await
        .unwrap_err();
    match err {
        Error::Deserialization { message, body: raw } => {
            assert_eq!(raw, body);
            assert!(message.contains("xО"), "{message}");
        }
        other => panic!("expected deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Dispatcher::new(store, TransportConfig::default()).unwrap();
    // Port 9 (discard) is not listening on test hosts.
    dispatcher.set_server_url("http://127.0.0.1:9").unwrap();

    let err = dispatcher
        .request(ApiRequest::get("/devices"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}

// ── Client switching ────────────────────────────────────────────────

#[tokio::test]
async fn test_update_client_switches_base_url() {
    let (first, dispatcher, _) = setup().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/scenarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["first"])))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scenarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["second"])))
        .expect(1)
        .mount(&second)
        .await;

    let a = dispatcher
        .request(ApiRequest::get("/scenarios"))
        .await
        .unwrap();
    dispatcher.set_server_url(&second.uri()).unwrap();
    let b = dispatcher
        .request(ApiRequest::get("/scenarios"))
        .await
        .unwrap();

    assert_eq!(a, json!(["first"]));
    assert_eq!(b, json!(["second"]));
    assert_eq!(dispatcher.server_url(), format!("{}/api", second.uri()));
}

#[tokio::test]
async fn test_demo_flag_read_per_call() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let live = dispatcher.request(ApiRequest::get("/devices")).await.unwrap();
    assert_eq!(live, json!([]));

    dispatcher.set_demo_mode(true).unwrap();
    let demo = dispatcher.request(ApiRequest::get("/devices")).await.unwrap();
    assert_eq!(demo.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_demo_mode_never_touches_network() {
    let (server, dispatcher, _) = setup().await;
    dispatcher.set_demo_mode(true).unwrap();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    dispatcher.request(ApiRequest::get("/devices")).await.unwrap();
    dispatcher
        .request(ApiRequest::get("/scenarios"))
        .await
        .unwrap();
    assert_eq!(dispatcher.test_connection().await, ConnectionStatus::connected());
}

// ── Connection test ─────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_ok_on_health_2xx() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(dispatcher.test_connection().await, ConnectionStatus::connected());
}

#[tokio::test]
async fn test_connection_reports_failure() {
    let (server, dispatcher, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let status = dispatcher.test_connection().await;
    assert!(!status.connected);
    assert!(status.error.unwrap().contains("503"));
}
