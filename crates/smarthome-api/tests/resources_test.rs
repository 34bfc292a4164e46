#![allow(clippy::unwrap_used)]
// Integration tests for the `SmartHome` resource wrappers in live mode.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smarthome_api::{
    Credentials, DeviceCommand, DeviceDraft, Error, Interval, NotificationFilter, SessionState,
    SmartHome, TransportConfig,
};
use smarthome_config::{KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SmartHome, Arc<MemoryStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let home = SmartHome::open(store.clone(), TransportConfig::default()).unwrap();
    home.dispatcher().set_server_url(&server.uri()).unwrap();
    (server, home, store)
}

fn device_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "type": "light",
        "online": true,
        "active": false,
        "canControl": true,
        "properties": { "tb_power": "off" }
    })
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, home, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    device_json("d1", "Lamp"),
                    { "id": 2, "name": "Porch", "type": "light" }
                ])),
        )
        .mount(&server)
        .await;

    let devices = home.devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].name, "Lamp");
    assert_eq!(devices[1].id, "2");
}

#[tokio::test]
async fn test_device_null_is_none() {
    let (server, home, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    assert!(home.device("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_device_rejects_blank_name_without_request() {
    let (server, home, _) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let result = home.create_device(DeviceDraft::new("   ", "light")).await;
    assert!(
        matches!(result, Err(Error::Validation { field: "name", .. })),
        "got: {result:?}"
    );

    let missing_type = DeviceDraft {
        name: Some("Lamp".into()),
        ..DeviceDraft::default()
    };
    let result = home.create_device(missing_type).await;
    assert!(matches!(result, Err(Error::Validation { field: "type", .. })));
}

#[tokio::test]
async fn test_create_device_adds_unique_id() {
    let (server, home, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .and(body_partial_json(json!({ "name": "Lamp", "type": "light" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(device_json("d7", "Lamp")))
        .expect(1)
        .mount(&server)
        .await;

    let created = home
        .create_device(DeviceDraft::new("Lamp", "light"))
        .await
        .unwrap();
    assert_eq!(created.id, "d7");

    let received = server.received_requests().await.unwrap();
    let sent: serde_json::Value = received[0].body_json().unwrap();
    let token = sent["properties"]["device_unique_id"].as_str().unwrap();
    assert!(token.starts_with("device_"));
    assert!(token.len() > "device_".len() + 5);
}

#[tokio::test]
async fn test_create_device_keeps_caller_unique_id() {
    let (server, home, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .and(body_partial_json(
            json!({ "properties": { "device_unique_id": "mine" } }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(device_json("d8", "Lamp")))
        .expect(1)
        .mount(&server)
        .await;

    home.create_device(DeviceDraft::new("Lamp", "light").property("device_unique_id", "mine"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_device_conflict_maps_to_device_exists() {
    let (server, home, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "dup" })))
        .mount(&server)
        .await;

    let err = home
        .create_device(DeviceDraft::new("Lamp", "light"))
        .await
        .unwrap_err();
    match err {
        Error::DeviceExists { ref name } => assert_eq!(name, "Lamp"),
        other => panic!("expected DeviceExists, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_device_other_errors_unchanged() {
    let (server, home, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = home
        .create_device(DeviceDraft::new("Lamp", "light"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_send_command_soft_failure_is_ok() {
    let (server, home, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/d1/command"))
        .and(body_partial_json(json!({ "command": "setState" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "device offline" })),
        )
        .mount(&server)
        .await;

    let mut params = serde_json::Map::new();
    params.insert("tb_power".into(), json!("on"));
    let outcome = home
        .send_command("d1", &DeviceCommand::set_state(params))
        .await
        .unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("device offline"));
}

#[tokio::test]
async fn test_history_sends_interval_query() {
    let (server, home, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/d2/temperature-history"))
        .and(query_param("interval", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "deviceId": "d2",
            "timestamp": "2026-10-15T10:00:00Z",
            "value": "21.4"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices/d3/humidity-history"))
        .and(query_param("interval", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let temps = home.temperature_history("d2", Interval::Week).await.unwrap();
    assert!((temps[0].value - 21.4).abs() < 1e-9);

    let humidity = home
        .humidity_history("d3", Interval::default())
        .await
        .unwrap();
    assert!(humidity.is_empty());
}

#[tokio::test]
async fn test_sensor_acknowledge_paths() {
    let (server, home, _) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/devices/sensor-history/e5/acknowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/devices/d1/sensor-history/acknowledge-all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    home.acknowledge_sensor_entry("e5").await.unwrap();
    home.acknowledge_device_sensor_history("d1").await.unwrap();
}

// ── Notifications & stats ───────────────────────────────────────────

#[tokio::test]
async fn test_notifications_status_query() {
    let (server, home, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(query_param("status", "unread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "n1",
            "timestamp": "2026-10-15T09:00:00Z",
            "title": "Door",
            "message": "Front door opened",
            "type": "security",
            "isRead": false
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let unread = home
        .notifications(NotificationFilter::Unread)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].kind, "security");
}

#[tokio::test]
async fn test_consumption_stats_period_query() {
    let (server, home, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics/consumption"))
        .and(query_param("period", "month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 312.5 })))
        .expect(1)
        .mount(&server)
        .await;

    let stats = home.consumption_stats("month").await.unwrap();
    assert_eq!(stats["total"], 312.5);
}

#[tokio::test]
async fn test_device_activity_forwards_params() {
    let (server, home, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stats/device-history"))
        .and(query_param("deviceId", "d1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    home.device_activity(&[("deviceId", "d1"), ("limit", "10")])
        .await
        .unwrap();
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_persists_token_and_user() {
    let (server, home, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({ "email": "me@home.io", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "t-1", "id": "u1", "email": "me@home.io" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", "Bearer t-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "u1", "role": "admin" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = home
        .login(&Credentials::new("me@home.io", "hunter2"))
        .await
        .unwrap();
    assert_eq!(payload["token"], "t-1");
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("t-1"));
    let user: serde_json::Value = serde_json::from_str(&store.get(USER_KEY).unwrap()).unwrap();
    assert_eq!(user["id"], "u1");
    assert_eq!(
        home.dispatcher().session_state(),
        SessionState::Authenticated
    );

    let me = home.current_user().await.unwrap();
    assert_eq!(me.role.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_login_without_token_stores_nothing() {
    let (server, home, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "bad credentials" })),
        )
        .mount(&server)
        .await;

    let payload = home
        .login(&Credentials::new("me@home.io", "nope"))
        .await
        .unwrap();
    assert_eq!(payload["success"], false);
    assert!(store.get(TOKEN_KEY).is_none());
    assert!(store.get(USER_KEY).is_none());
}

#[tokio::test]
async fn test_logout_clears_credentials() {
    let (_server, home, store) = setup().await;
    store.set(TOKEN_KEY, "t").unwrap();
    store.set(USER_KEY, "{}").unwrap();

    home.logout().unwrap();

    assert!(store.get(TOKEN_KEY).is_none());
    assert!(store.get(USER_KEY).is_none());
    assert_eq!(home.dispatcher().session_state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_expired_token_on_wrapper_call() {
    let (server, home, store) = setup().await;
    store.set(TOKEN_KEY, "old").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/stats/dashboard"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = home.dashboard_stats().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(store.get(TOKEN_KEY).is_none());
    assert_eq!(
        home.dispatcher().session_state(),
        SessionState::LoginRequired
    );
}
