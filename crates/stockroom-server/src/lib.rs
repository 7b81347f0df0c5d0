//! Stockroom HTTP front end.
//!
//! Server-rendered pages for the catalog, cart, categories, users and audit
//! log, served by axum over the services in `stockroom-commerce` and
//! `stockroom-auth`.
//!
//! ```rust,ignore
//! let config = AppConfig::load(None)?;
//! let state = AppState::open(config).await?;
//! stockroom_server::serve(state).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod media;
pub mod routes;
pub mod seed;
pub mod state;
pub mod telemetry;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use routes::router;
pub use state::AppState;

use std::time::Duration;

use anyhow::Context;
use stockroom_cache::Cache;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// How often expired sessions are dropped from the cache.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Bind the configured address and serve until ctrl-c or SIGTERM.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind = state.config.server.bind.clone();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(address = %bind, backend = %state.config.storage.backend, "listening");

    let sweeper = tokio::spawn(sweep_sessions(state.cache.clone()));
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served.context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn sweep_sessions(cache: Cache) {
    let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        let dropped = cache.purge_expired();
        if dropped > 0 {
            debug!(dropped, "expired sessions purged");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
