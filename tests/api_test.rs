//! Bridge API Integration Tests

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{FakeTransportFactory, ScriptedSignaling};
use cyberfish::application::{BindingService, SettingsService};
use cyberfish::config::Settings;
use cyberfish::domain::binding::SharedGamepadSource;
use cyberfish::domain::settings::{ConfigRepository, ConfigStore, ControlSource};
use cyberfish::domain::stream::{ManagerOptions, StreamConnectionManager};
use cyberfish::infrastructure::persistence::FileConfigRepository;
use cyberfish::interface::api::{build_router, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt; // For `oneshot`

struct TestApp {
    _dir: TempDir,
    router: Router,
    repository: Arc<FileConfigRepository>,
    signaling: Arc<ScriptedSignaling>,
    stream: StreamConnectionManager,
}

fn setup_api_test() -> TestApp {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(FileConfigRepository::new(dir.path().join("config.toml")));
    let config_store = Arc::new(ConfigStore::new(repository.clone()));

    let signaling = ScriptedSignaling::answering();
    let stream = StreamConnectionManager::new(
        FakeTransportFactory::new(),
        signaling.clone(),
        ManagerOptions::default(),
    );

    let gamepads = Arc::new(SharedGamepadSource::new());
    let state = AppState {
        config_store: config_store.clone(),
        settings: Arc::new(SettingsService::new(
            config_store.clone(),
            stream.clone(),
            Settings::default(),
        )),
        stream: stream.clone(),
        gamepads: gamepads.clone(),
        bindings: Arc::new(BindingService::new(config_store, gamepads)),
    };

    let prometheus_handle = PrometheusBuilder::new().build_recorder().handle();

    TestApp {
        _dir: dir,
        router: build_router(state, prometheus_handle),
        repository,
        signaling,
        stream,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Non-JSON bodies (metrics text, extractor rejections) come back as Null
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = setup_api_test();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
}

#[tokio::test]
async fn test_get_config_returns_defaults() {
    let app = setup_api_test();

    let (status, json) = send(&app, "GET", "/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["ip"], "10.10.10.10");
    assert_eq!(json["data"]["streamPort"], 8889);
    assert_eq!(json["data"]["keyboard"]["moveForward"], "W");
    assert_eq!(json["data"]["gamepad"]["pitchYaw"], "rightStick");
}

#[tokio::test]
async fn test_update_keyboard_bindings_persists() {
    let app = setup_api_test();

    let (_, json) = send(&app, "GET", "/config", None).await;
    let mut keyboard = json["data"]["keyboard"].clone();
    keyboard["moveUp"] = json!("E");

    let (status, json) = send(&app, "PUT", "/config/keyboard", Some(keyboard)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["keyboard"]["moveUp"], "E");

    let saved = app.repository.get_config().await.unwrap();
    assert_eq!(saved.keyboard.move_up, "E");
}

#[tokio::test]
async fn test_update_gamepad_bindings_persists() {
    let app = setup_api_test();

    let bindings = json!({
        "moveHorizontal": "dPad",
        "moveUp": 1,
        "moveDown": 2,
        "pitchYaw": "faceButtons",
        "rollLeft": 7,
        "rollRight": 8
    });
    let (status, _) = send(&app, "PUT", "/config/gamepad", Some(bindings)).await;
    assert_eq!(status, StatusCode::OK);

    let saved = app.repository.get_config().await.unwrap();
    assert_eq!(saved.gamepad.move_horizontal, ControlSource::DPad);
    assert_eq!(saved.gamepad.pitch_yaw, ControlSource::FaceButtons);
}

#[tokio::test]
async fn test_invalid_server_settings_rejected() {
    let app = setup_api_test();

    let (status, json) = send(
        &app,
        "PUT",
        "/config/server",
        Some(json!({ "ip": "", "streamPort": 8889, "controlPort": 5000 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_server_settings_retarget_stream() {
    let app = setup_api_test();

    let (status, json) = send(
        &app,
        "PUT",
        "/config/server",
        Some(json!({ "ip": "192.168.4.1", "streamPort": 8890, "controlPort": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["ip"], "192.168.4.1");

    tokio::time::sleep(Duration::from_millis(50)).await;
    let endpoints = app.signaling.endpoints();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].url(), "http://192.168.4.1:8890/cam/whep");

    let (_, json) = send(&app, "GET", "/stream", None).await;
    assert_eq!(json["data"]["state"], "negotiating");

    app.stream.dispose().await;
}

#[tokio::test]
async fn test_stream_status_and_restart() {
    let app = setup_api_test();

    let (status, json) = send(&app, "GET", "/stream", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["state"], "idle");
    assert_eq!(
        json["data"]["overlay"],
        "Connecting to CyberFish drone camera..."
    );

    let (status, _) = send(&app, "POST", "/stream/restart", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.signaling.exchanges(), 1);

    app.stream.dispose().await;
}

#[tokio::test]
async fn test_capture_without_gamepad_conflicts() {
    let app = setup_api_test();

    let (status, json) = send(
        &app,
        "POST",
        "/bindings/capture",
        Some(json!({ "field": "moveUp" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_capture_binding_from_reported_gamepad() {
    let app = setup_api_test();

    let mut buttons = vec![false; 17];
    buttons[9] = true;
    let (status, json) = send(
        &app,
        "POST",
        "/gamepad/state",
        Some(json!({ "gamepads": [{ "buttons": buttons, "axes": [0.0, 0.0, 0.0, 0.0] }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["connected"], 1);

    let (status, json) = send(
        &app,
        "POST",
        "/bindings/capture",
        Some(json!({ "field": "rollLeft" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["outcome"], "captured");
    assert_eq!(json["data"]["binding"], "12");
    assert_eq!(json["data"]["label"], "Start / Options");

    let saved = app.repository.get_config().await.unwrap();
    assert_eq!(saved.gamepad.roll_left, 12);

    let (_, json) = send(
        &app,
        "POST",
        "/bindings/reset",
        Some(json!({ "field": "rollLeft" })),
    )
    .await;
    assert_eq!(json["data"]["gamepad"]["rollLeft"], 7);
}

#[tokio::test]
async fn test_cancel_without_capture() {
    let app = setup_api_test();

    let (status, json) = send(&app, "POST", "/bindings/capture/cancel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["cancelled"], false);
}

#[tokio::test]
async fn test_unknown_binding_field_rejected() {
    let app = setup_api_test();

    let (status, _) = send(
        &app,
        "POST",
        "/bindings/capture",
        Some(json!({ "field": "throttle" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup_api_test();

    let (status, _) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
}
