/// Request gate: per-request device authentication.
///
/// Extracts the bearer token and device id headers, re-derives the claimed
/// device's key chain, validates the token, and only then confirms the
/// device is still registered. Use this as an extractor to require an
/// authenticated device in a handler:
/// ```ignore
/// async fn handler(device: AuthDevice) -> impl IntoResponse { ... }
/// ```
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;

use super::{AppState, ErrorResponse};
use crate::crypto::token;

/// The authenticated device, available to downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthDevice {
    pub device_id: String,
}

/// Every authentication failure maps onto this one response. Which step
/// failed is never visible to the caller.
fn unauthenticated() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "unauthenticated".into(),
        }),
    )
}

impl FromRequestParts<Arc<AppState>> for AuthDevice {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let Some(token_str) = auth_header.strip_prefix("Bearer ") else {
            return Err(unauthenticated());
        };

        let device_id = parts
            .headers
            .get("Device-ID")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if device_id.is_empty() {
            tracing::warn!("request gate: missing device id header");
            return Err(unauthenticated());
        }

        let chain = state.chain.client_chain(device_id).map_err(|e| {
            tracing::warn!(device_id, error = %e, "request gate: failed to derive client chain");
            unauthenticated()
        })?;

        let token_key = chain.token_key().map_err(|e| {
            tracing::error!(device_id, error = %e, "request gate: failed to derive token key");
            unauthenticated()
        })?;

        if let Err(e) = token::validate(&token_key, token_str, device_id) {
            tracing::warn!(device_id, error = %e, "request gate: token rejected");
            return Err(unauthenticated());
        }

        // Registry is consulted only now that the token has authenticated,
        // so pre-auth input never reaches the database layer.
        match state.registry.device_exists(device_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(device_id, "request gate: device not registered");
                return Err(unauthenticated());
            }
            Err(e) => {
                tracing::error!(device_id, error = %e, "request gate: registry lookup failed");
                return Err(unauthenticated());
            }
        }

        Ok(AuthDevice {
            device_id: device_id.to_string(),
        })
    }
}
