//! REST client for the monitoring service HTTP endpoints.
//!
//! ```text
//! PUT    {base_url}/api/sensors/{id}/monitoring/enable   -> enable
//! DELETE {base_url}/api/sensors/{id}/monitoring/enable   -> disable
//! ```

use std::time::Duration;

use async_trait::async_trait;
use sensor_core::sensor::SensorId;

use crate::{MonitoringClient, MonitoringError};

/// Default base URL of the monitoring service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8082";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`HttpMonitoringClient`].
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Base HTTP URL, e.g. `http://monitoring:8082`. No trailing slash needed.
    pub base_url: String,
    /// Upper bound on a single enable/disable call.
    pub timeout: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for a single monitoring service instance.
pub struct HttpMonitoringClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMonitoringClient {
    /// Build a client with its own connection pool and the configured timeout.
    pub fn new(config: &MonitoringConfig) -> Result<Self, MonitoringError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn enable_url(&self, sensor_id: SensorId) -> String {
        format!("{}/api/sensors/{sensor_id}/monitoring/enable", self.base_url)
    }

    /// Ensure the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), MonitoringError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MonitoringError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MonitoringClient for HttpMonitoringClient {
    async fn enable_monitoring(&self, sensor_id: SensorId) -> Result<(), MonitoringError> {
        tracing::debug!(%sensor_id, "Enabling sensor monitoring");
        let response = self.client.put(self.enable_url(sensor_id)).send().await?;
        Self::check_status(response).await
    }

    async fn disable_monitoring(&self, sensor_id: SensorId) -> Result<(), MonitoringError> {
        tracing::debug!(%sensor_id, "Disabling sensor monitoring");
        let response = self.client.delete(self.enable_url(sensor_id)).send().await?;
        Self::check_status(response).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use axum::extract::{Path, State};
    use axum::http::{Method, StatusCode};
    use axum::routing::put;
    use axum::Router;

    use super::*;

    type Calls = Arc<Mutex<Vec<(Method, String)>>>;

    /// Spawn a fake monitoring service on an ephemeral port.
    async fn spawn_server(status: StatusCode, delay: Duration) -> (String, Calls) {
        let calls: Calls = Arc::default();

        async fn record(
            State((calls, status, delay)): State<(Calls, StatusCode, Duration)>,
            method: Method,
            Path(id): Path<String>,
        ) -> (StatusCode, &'static str) {
            tokio::time::sleep(delay).await;
            calls.lock().unwrap().push((method, id));
            (status, "remote says no")
        }

        let app = Router::new()
            .route(
                "/api/sensors/{id}/monitoring/enable",
                put(record).delete(record),
            )
            .with_state((Arc::clone(&calls), status, delay));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), calls)
    }

    fn client(base_url: &str, timeout: Duration) -> HttpMonitoringClient {
        HttpMonitoringClient::new(&MonitoringConfig {
            base_url: base_url.to_string(),
            timeout,
        })
        .unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = client("http://monitoring:8082/", DEFAULT_TIMEOUT);
        assert_eq!(
            client.enable_url(SensorId::from_u64(42)),
            "http://monitoring:8082/api/sensors/000000000001A/monitoring/enable"
        );
    }

    #[tokio::test]
    async fn enable_sends_put() {
        let (base, calls) = spawn_server(StatusCode::NO_CONTENT, Duration::ZERO).await;
        let client = client(&base, DEFAULT_TIMEOUT);

        client.enable_monitoring(SensorId::from_u64(42)).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec![(Method::PUT, "000000000001A".to_string())]);
    }

    #[tokio::test]
    async fn disable_sends_delete() {
        let (base, calls) = spawn_server(StatusCode::OK, Duration::ZERO).await;
        let client = client(&base, DEFAULT_TIMEOUT);

        client.disable_monitoring(SensorId::from_u64(42)).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec![(Method::DELETE, "000000000001A".to_string())]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let (base, _calls) = spawn_server(StatusCode::SERVICE_UNAVAILABLE, Duration::ZERO).await;
        let client = client(&base, DEFAULT_TIMEOUT);

        let err = client.enable_monitoring(SensorId::from_u64(1)).await.unwrap_err();
        assert_matches!(
            err,
            MonitoringError::ApiError { status: 503, ref body } if body == "remote says no"
        );
    }

    #[tokio::test]
    async fn slow_server_hits_timeout() {
        let (base, _calls) = spawn_server(StatusCode::OK, Duration::from_secs(2)).await;
        let client = client(&base, Duration::from_millis(100));

        let err = client.enable_monitoring(SensorId::from_u64(1)).await.unwrap_err();
        assert_matches!(err, MonitoringError::Request(ref e) if e.is_timeout());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        // Bind then drop to obtain a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(&format!("http://{addr}"), DEFAULT_TIMEOUT);
        let err = client.disable_monitoring(SensorId::from_u64(1)).await.unwrap_err();
        assert_matches!(err, MonitoringError::Request(_));
    }
}
