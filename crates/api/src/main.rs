use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zest_api::background;
use zest_api::config::{ServerConfig, StoreBackend};
use zest_api::rate_limiter::RateLimiter;
use zest_api::router::build_app_router;
use zest_api::state::AppState;
use zest_mail::{EmailConfig, ResendMailer};
use zest_store::{MemoryStore, RedisStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zest_api=debug,zest_mail=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let email_config = EmailConfig::from_env().context("Invalid email configuration")?;
    tracing::info!(
        from = %email_config.from_address,
        to = %email_config.to_address,
        "Loaded email configuration"
    );

    // --- Counter store ---
    let sweeper_cancel = CancellationToken::new();
    let mut sweeper_handle = None;

    let rate_limiter = match &config.store {
        StoreBackend::Redis(url) => {
            let store = RedisStore::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            RateLimiter::new(Arc::new(store), config.rate_limit)
        }
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            sweeper_handle = Some(tokio::spawn(background::store_sweeper::run(
                Arc::clone(&store),
                background::store_sweeper::SWEEP_INTERVAL,
                sweeper_cancel.clone(),
            )));
            RateLimiter::new(store, config.rate_limit)
        }
        StoreBackend::Disabled => {
            tracing::warn!("Rate limit store not configured, all submissions will be allowed");
            RateLimiter::disabled(config.rate_limit)
        }
    };
    tracing::info!(
        backend = rate_limiter.backend(),
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        block_secs = config.rate_limit.block_secs,
        "Rate limiter ready"
    );

    // --- Mailer ---
    let mailer = ResendMailer::new(email_config).context("Failed to build HTTP client")?;

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        rate_limiter,
        mailer: Arc::new(mailer),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse::<IpAddr>().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_cancel.cancel();
    if let Some(handle) = sweeper_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
