#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sensor_core::id::IdGenerator;
use sensor_core::sensor::SensorId;
use sensor_db::repositories::InMemorySensorRepo;
use sensor_monitoring::{MonitoringClient, MonitoringError};
use tower::ServiceExt;

use sensor_api::config::ServerConfig;
use sensor_api::router::build_app_router;
use sensor_api::state::AppState;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Hands out 1, 2, 3, ... so tests can predict ids.
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> SensorId {
        SensorId::from_u64(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringCall {
    Enable(SensorId),
    Disable(SensorId),
}

/// Records every call; optionally fails them all with a 503.
#[derive(Default)]
pub struct RecordingMonitoring {
    calls: Mutex<Vec<MonitoringCall>>,
    fail: bool,
}

impl RecordingMonitoring {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<MonitoringCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MonitoringCall) -> Result<(), MonitoringError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(MonitoringError::ApiError {
                status: 503,
                body: "monitoring down".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MonitoringClient for RecordingMonitoring {
    async fn enable_monitoring(&self, sensor_id: SensorId) -> Result<(), MonitoringError> {
        self.record(MonitoringCall::Enable(sensor_id))
    }

    async fn disable_monitoring(&self, sensor_id: SensorId) -> Result<(), MonitoringError> {
        self.record(MonitoringCall::Disable(sensor_id))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|key| match key {
        "HOST" => Some("127.0.0.1".to_string()),
        "PORT" => Some("0".to_string()),
        _ => None,
    })
    .expect("default test config is valid")
}

/// A router plus handles on its collaborators for assertions.
pub struct TestApp {
    pub router: Router,
    pub repo: InMemorySensorRepo,
    pub monitoring: Arc<RecordingMonitoring>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_monitoring(RecordingMonitoring::default())
    }

    pub fn with_monitoring(monitoring: RecordingMonitoring) -> Self {
        let config = test_config();
        let repo = InMemorySensorRepo::new();
        let monitoring = Arc::new(monitoring);

        let state = AppState {
            sensors: Arc::new(repo.clone()),
            monitoring: monitoring.clone(),
            ids: Arc::new(SequentialIds::default()),
        };

        Self {
            router: build_app_router(state, &config),
            repo,
            monitoring,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, json: serde_json::Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(json)).await
    }

    pub async fn put_json(&self, uri: &str, json: serde_json::Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(json)).await
    }

    pub async fn put(&self, uri: &str) -> Response<Body> {
        self.send(Method::PUT, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Method::DELETE, uri, None).await
    }

    /// POST a sensor and return the created JSON body.
    pub async fn create_sensor(&self, json: serde_json::Value) -> serde_json::Value {
        let response = self.post_json("/api/sensors", json).await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        body_json(response).await
    }
}

// ---------------------------------------------------------------------------
// Body helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub fn sensor_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "ip": "10.0.0.5",
        "location": "Warehouse A",
        "protocol": "MQTT",
        "model": "TS-100",
    })
}
