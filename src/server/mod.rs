/// RPC server for byte.
///
/// The server carries no per-device key material: every request re-derives
/// the claimed device's chain from the server chain and validates the
/// presented token against it before anything else happens.
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::crypto::chain::ServerChain;
use crate::state::DeviceRegistry;

/// Shared application state available to all handlers.
pub struct AppState {
    /// Root of the key hierarchy; read-only after construction.
    pub chain: ServerChain,
    /// Enrolled-device registry.
    pub registry: Arc<dyn DeviceRegistry>,
}

/// Error response body.
///
/// Authentication failures always carry the same opaque message; the
/// reason only ever goes to the log.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::device_routes())
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the API server and run until ctrl-c or SIGTERM.
pub async fn serve(state: AppState, addr: &str) -> crate::error::Result<()> {
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("byte API server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
