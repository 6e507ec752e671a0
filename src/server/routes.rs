/// Device management endpoints.
///
/// All device routes sit behind the request gate. `create` is the invite
/// flow: the server mints a brand-new device and hands its seed back
/// wrapped for the inviting device, never storing any of it.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::middleware::AuthDevice;
use super::{AppState, ErrorResponse};

// ─── Health ──────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

// ─── Devices ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceResponse {
    pub id: String,
    /// Hex of the new device's seed, AES-GCM-wrapped for the inviter
    /// (`ciphertext ‖ tag ‖ nonce`).
    pub encrypted_device_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListDevicesResponse {
    pub devices: Vec<DeviceEntry>,
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal error".into(),
        }),
    )
}

fn wrap_new_seed(state: &AppState, new_id: &str, inviter_id: &str) -> crate::error::Result<Vec<u8>> {
    let new_chain = state.chain.client_chain(new_id)?;
    let inviter_chain = state.chain.client_chain(inviter_id)?;
    inviter_chain.wrap_key(new_chain.seed().as_bytes())
}

/// POST /api/devices — Register a new device, invited by the caller.
async fn create_device(
    device: AuthDevice,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreateDeviceResponse>, (StatusCode, Json<ErrorResponse>)> {
    let id = Uuid::new_v4().to_string();

    state.registry.add_device(&id).await.map_err(|e| {
        tracing::error!(error = %e, "failed to register new device");
        internal_error()
    })?;

    // The row now exists; a wrap failure has to remove it again so a
    // failed invite leaves no orphaned registration behind.
    match wrap_new_seed(&state, &id, &device.device_id) {
        Ok(wrapped) => Ok(Json(CreateDeviceResponse {
            id,
            encrypted_device_key: hex::encode(wrapped),
        })),
        Err(e) => {
            tracing::error!(error = %e, new_device = %id, "failed to wrap new device seed");

            if let Err(e) = state.registry.delete_device(&id).await {
                tracing::error!(error = %e, new_device = %id, "failed to roll back registration");
            }

            Err(internal_error())
        }
    }
}

/// GET /api/devices — List enrolled device ids.
async fn list_devices(
    _device: AuthDevice,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListDevicesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let ids = state.registry.list_devices().await.map_err(|e| {
        tracing::error!(error = %e, "failed to list devices");
        internal_error()
    })?;

    Ok(Json(ListDevicesResponse {
        devices: ids.into_iter().map(|id| DeviceEntry { id }).collect(),
    }))
}

/// DELETE /api/devices/{id} — Remove a device; revokes it entirely.
async fn delete_device(
    _device: AuthDevice,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.registry.delete_device(&id).await.map_err(|e| {
        tracing::error!(error = %e, device_id = %id, "failed to delete device");
        internal_error()
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn device_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/devices", post(create_device).get(list_devices))
        .route("/api/devices/{id}", delete(delete_device))
}
