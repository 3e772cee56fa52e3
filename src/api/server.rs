//! API server implementation
//!
//! HTTP REST API server using Axum for formula evaluation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::core::Calculator;

/// API Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub version: String,
    pub calculator: Arc<Calculator>,
}

impl AppState {
    pub fn new(calculator: Calculator) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            calculator: Arc::new(calculator),
        }
    }
}

/// Build the router with all endpoints and middleware
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/functions", get(handlers::functions))
        .route("/api/v1/evaluate", post(handlers::evaluate))
        .route("/api/v1/check", post(handlers::check))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, calculator: Calculator) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calc_server=info,spreadsheet_calc=info,tower_http=info".into()),
        )
        .init();

    info!(
        timezone = %calculator.zone(),
        decimal = %calculator.config().number_format.decimal,
        "Evaluator configured"
    );
    let app = router(Arc::new(AppState::new(calculator)));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🧮 Calc API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/evaluate, /api/v1/check, /api/v1/functions");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Calc API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
