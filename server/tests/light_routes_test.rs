mod common;

use std::sync::Arc;
use std::sync::Mutex;

use axum::http::{Method, StatusCode};
use casa_core::{LightEvent, LightStates};
use common::{dead_url, test_app, test_app_with_controller};
use serde_json::json;

#[tokio::test]
async fn status_mirrors_controller() {
    let app = test_app().await;
    app.lights.lock().unwrap().insert("garage".into(), true);

    let (status, body) = app.get("/light/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["garage"], true);
    assert_eq!(body["kitchen"], false);
}

#[tokio::test]
async fn toggle_switches_light_and_pushes_update() {
    let app = test_app().await;
    let mut updates = app.state.relay.broadcaster().subscribe();

    let (status, body) = app
        .post("/light/toggle", json!({"room": "kitchen", "state": true}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(app.lights.lock().unwrap().get("kitchen"), Some(&true));

    match updates.recv().await.unwrap() {
        LightEvent::StatusUpdate(states) => assert_eq!(states.get("kitchen"), Some(&true)),
        other => panic!("unexpected event: {:?}", other),
    }

    let (status, usage) = app.get("/light/usage").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usage, json!({"kitchen": 0}));
}

#[tokio::test]
async fn toggle_rejects_bad_payloads() {
    let app = test_app().await;
    let expected = json!({"error": "Invalid payload. Expected { room: string, state: boolean }"});

    for payload in [
        json!({"room": "attic", "state": true}),
        json!({"room": "kitchen", "state": "on"}),
        json!({"room": "kitchen"}),
    ] {
        let (status, body) = app.post("/light/toggle", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, expected);
    }

    // nothing reached the controller
    assert!(app.lights.lock().unwrap().values().all(|on| !on));
}

#[tokio::test]
async fn toggle_all_switches_every_room() {
    let app = test_app().await;

    let (status, _) = app.post("/light/toggle/all", json!({"state": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.lights.lock().unwrap().values().all(|on| *on));

    let (_, usage) = app.get("/light/usage").await;
    assert_eq!(usage.as_object().unwrap().len(), 4);

    let (status, body) = app.post("/light/toggle/all", json!({"state": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid payload. Expected { state: boolean }"}));
}

#[tokio::test]
async fn usage_reset_clears_records() {
    let app = test_app().await;
    app.post("/light/toggle", json!({"room": "bath", "state": true}))
        .await;

    let (status, _) = app.send(Method::DELETE, "/light/usage", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, usage) = app.get("/light/usage").await;
    assert_eq!(usage, json!({}));
}

#[tokio::test]
async fn unreachable_controller_is_server_error() {
    let lights = Arc::new(Mutex::new(LightStates::new()));
    let app = test_app_with_controller(dead_url().await, lights).await;

    let (status, body) = app.get("/light/status").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Light controller unavailable"));

    let (status, _) = app
        .post("/light/toggle", json!({"room": "room", "state": true}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, usage) = app.get("/light/usage").await;
    assert_eq!(usage, json!({}));
}

#[tokio::test]
async fn health_check() {
    let app = test_app().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
