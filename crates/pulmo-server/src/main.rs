//! PulmoVision API Server - HTTP boundary for the classification engine

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod state;

use pulmo_core::{ClassificationService, PipelineConfig};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulmo_server=debug,pulmo_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PulmoVision API server");

    let config = PipelineConfig::default();
    info!("Model root: {:?}", config.models_dir);

    let service = ClassificationService::new(config)?;

    // Warm-up failures do not abort startup: the service keeps running
    // degraded, /health says so, and the next request retries the load.
    match service.warm_up().await {
        Ok(report) => info!(
            "Model v{} from '{}' warmed up in {}ms",
            report.model_version, report.model_directory, report.elapsed_ms
        ),
        Err(err) => warn!("Warm-up failed, serving degraded: {err}"),
    }

    let state = AppState::new(service);
    let app = api::create_router(state);

    let host = std::env::var("PULMO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match std::env::var("PULMO_PORT") {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Invalid PULMO_PORT='{}', falling back to 8000", raw);
                8000
            }
        },
        Err(_) => 8000,
    };
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
