//! Netguard HTTP server.
//!
//! Provides an HTTP API over the detection engine and its collaborators:
//! - Payload scanning (`POST /scan`, `POST /api/threats/scan`)
//! - Signature listing
//! - Alert log (list, create, resolve)
//! - Traffic sample (paginated rows, summary stats)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use netguard::server::{serve, AppState, ServerConfig};
//!
//! let config = ServerConfig::default().with_port(8080);
//! let state = Arc::new(AppState::new(config)?);
//! serve(state).await?;
//! ```

mod config;
mod handlers;
mod state;

use std::sync::Arc;

pub use config::ServerConfig;
pub use handlers::{create_router, health_check, TrafficQuery};
pub use state::AppState;

use crate::error::Result;

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.addr;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
