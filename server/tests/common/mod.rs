//! Shared harness: a throwaway store plus in-process stand-ins for the
//! light controller and the weather API, reached over real HTTP.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::Query,
    http::{header, Method, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use casa_core::{CasaConfig, HttpLightDevice, LightStates, Storage};
use casa_server::{app, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub struct TestApp {
    _dir: TempDir,
    pub state: AppState,
    pub router: Router,
    pub lights: Arc<Mutex<LightStates>>,
}

/// Serve `router` on an ephemeral port, returning its base URL
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn fake_controller() -> (Router, Arc<Mutex<LightStates>>) {
    let lights = Arc::new(Mutex::new(LightStates::from([
        ("kitchen".to_string(), false),
        ("garage".to_string(), false),
        ("room".to_string(), false),
        ("bath".to_string(), false),
    ])));

    let read = lights.clone();
    let write = lights.clone();
    let router = Router::new()
        .route(
            "/showlight",
            get(move || {
                let lights = read.clone();
                async move { Json(lights.lock().unwrap().clone()) }
            }),
        )
        .route(
            "/led",
            post(move |Json(command): Json<BTreeMap<String, bool>>| {
                let lights = write.clone();
                async move {
                    lights.lock().unwrap().extend(command);
                    Json(json!({ "status": "ok" }))
                }
            }),
        );

    (router, lights)
}

pub const UNKNOWN_CITY: &str = "Atlantis";

/// Queried under a local spelling, reported upstream as [`REPORTED_CITY`]
pub const LOCAL_CITY: &str = "Warszawa";
pub const REPORTED_CITY: &str = "Warsaw";

async fn fake_current(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let city = params.get("q").cloned().unwrap_or_default();
    if city == UNKNOWN_CITY {
        return (StatusCode::NOT_FOUND, Json(json!({"cod": "404", "message": "city not found"})));
    }
    let name = if city == LOCAL_CITY { REPORTED_CITY.to_string() } else { city };
    (
        StatusCode::OK,
        Json(json!({
            "name": name,
            "dt": 1_704_110_400,
            "main": {"temp": 3.5, "humidity": 71},
            "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d"}],
            "wind": {"speed": 4.1, "deg": 270}
        })),
    )
}

async fn fake_forecast(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let city = params.get("q").cloned().unwrap_or_default();
    if city == UNKNOWN_CITY {
        return (StatusCode::NOT_FOUND, Json(json!({"cod": "404"})));
    }
    let entry = |dt: i64, temp: f64| {
        json!({
            "dt": dt,
            "main": {"temp": temp},
            "weather": [{"description": "light rain", "icon": "10d"}],
            "wind": {"speed": 1.5, "deg": 90}
        })
    };
    (
        StatusCode::OK,
        Json(json!({
            "city": {"name": city},
            "list": [
                entry(1_704_099_600, 1.0),
                entry(1_704_110_400, 2.0),
                entry(1_704_196_800, 5.0),
                entry(1_704_207_600, 6.0)
            ]
        })),
    )
}

pub fn fake_weather() -> Router {
    Router::new()
        .route("/weather", get(fake_current))
        .route("/forecast", get(fake_forecast))
}

pub async fn test_app() -> TestApp {
    let (controller, lights) = fake_controller();
    let controller_url = spawn(controller).await;
    test_app_with_controller(controller_url, lights).await
}

pub async fn test_app_with_controller(
    controller_url: String,
    lights: Arc<Mutex<LightStates>>,
) -> TestApp {
    test_app_with(controller_url, lights, |_| {}).await
}

/// Like [`test_app`], with a last chance to adjust the config
pub async fn test_app_configured(configure: impl FnOnce(&mut CasaConfig)) -> TestApp {
    let (controller, lights) = fake_controller();
    let controller_url = spawn(controller).await;
    test_app_with(controller_url, lights, configure).await
}

async fn test_app_with(
    controller_url: String,
    lights: Arc<Mutex<LightStates>>,
    configure: impl FnOnce(&mut CasaConfig),
) -> TestApp {
    let weather_url = spawn(fake_weather()).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = CasaConfig::default();
    config.storage.path = dir.path().to_path_buf();
    config.device.base_url = controller_url;
    config.weather.current_endpoint = format!("{}/weather", weather_url);
    config.weather.forecast_endpoint = format!("{}/forecast", weather_url);
    config.weather.api_key = "test-key".to_string();
    configure(&mut config);

    let storage = Storage::open(dir.path()).expect("Failed to open storage");
    let device = Arc::new(HttpLightDevice::new(config.device.base_url.clone(), 2_000));
    let state = AppState::new(config, storage, device);

    TestApp {
        _dir: dir,
        router: app(state.clone()),
        state,
        lights,
    }
}

/// URL of a port nothing listens on
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }
}
