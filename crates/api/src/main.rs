use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use sensor_core::id::TsidGenerator;
use sensor_core::repository::SensorRepository;
use sensor_db::repositories::{InMemorySensorRepo, PgSensorRepo};
use sensor_monitoring::HttpMonitoringClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensor_api::config::{LogFormat, ServerConfig};
use sensor_api::router::build_app_router;
use sensor_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let sensors = build_repository(&config).await?;

    // --- Monitoring client ---
    let monitoring = HttpMonitoringClient::new(&config.monitoring)
        .context("Failed to build monitoring HTTP client")?;
    tracing::info!(
        base_url = %config.monitoring.base_url,
        timeout_ms = config.monitoring.timeout.as_millis() as u64,
        "Monitoring client configured",
    );

    // --- App state ---
    let state = AppState {
        sensors,
        monitoring: Arc::new(monitoring),
        ids: Arc::new(TsidGenerator::new()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let ip = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "sensor_api=debug,sensor_db=debug,sensor_monitoring=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Pick PostgreSQL when `DATABASE_URL` is set, otherwise the in-memory store.
async fn build_repository(config: &ServerConfig) -> anyhow::Result<Arc<dyn SensorRepository>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, sensors are kept in memory only");
        return Ok(Arc::new(InMemorySensorRepo::new()));
    };

    let pool = sensor_db::create_pool(database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    sensor_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    sensor_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgSensorRepo::new(pool)))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
