//! mintwatch - transaction notifications for watched Solana addresses
//!
//! Loads the settings, starts one monitor per address, optionally serves
//! health and metrics, and runs until interrupted.

use axum::Router;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use mintwatch::config::AppConfig;
use mintwatch::handlers::{health_router, AppState};
use mintwatch::metrics::{metrics_router, MetricsState};
use mintwatch::monitoring::{StatusBoard, Supervisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    tracing::info!("Starting mintwatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    tracing::info!(
        addresses = config.addresses.len(),
        rpc_url = %config.rpc.url,
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsState::new());
    let cancel = CancellationToken::new();

    // One independent monitor per address
    let supervisor = Supervisor::start(&config, metrics.clone(), cancel.clone())?;

    if config.server.enabled {
        spawn_server(&config, supervisor.board(), metrics, cancel.clone()).await?;
    }

    shutdown_signal().await;
    tracing::info!("Shutdown requested");

    supervisor.shutdown().await;
    tracing::info!("mintwatch stopped");

    Ok(())
}

/// Serve /health and /metrics until `cancel` fires
async fn spawn_server(
    config: &AppConfig,
    board: StatusBoard,
    metrics: Arc<MetricsState>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState {
        started_at: Utc::now(),
        board,
    });

    let app = Router::new()
        .merge(health_router().with_state(app_state))
        .merge(metrics_router().with_state(metrics))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Health server listening");

    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Health server failed");
        }
    });

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let pretty = std::env::var("MINTWATCH_LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("pretty"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mintwatch=info,tower_http=info".into()),
        )
        .with((!pretty).then(|| tracing_subscriber::fmt::layer().json()))
        .with(pretty.then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Load and validate configuration
fn load_config() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}
