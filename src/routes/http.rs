// GET handlers: version, traffic, devices, ping, CSV export

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use super::AppState;
use super::export::{self, ExportKind};
use crate::models::Device;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON envelope shared by every /api response.
#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

fn success<T: Serialize>(data: T) -> Response {
    axum::Json(ApiResponse {
        status: "success",
        data: Some(data),
        error: None,
        timestamp: Utc::now(),
    })
    .into_response()
}

fn failure(code: StatusCode, message: &str) -> Response {
    let body = ApiResponse::<()> {
        status: "error",
        data: None,
        error: Some(message.to_string()),
        timestamp: Utc::now(),
    };
    (code, axum::Json(body)).into_response()
}

/// Devices ordered by address (numerically where the key parses).
fn device_list(devices: impl IntoIterator<Item = Device>) -> Vec<Device> {
    let mut list: Vec<Device> = devices.into_iter().collect();
    list.sort_by_key(|d| (d.ip.parse::<Ipv4Addr>().ok(), d.ip.clone()));
    list
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

pub(super) async fn traffic(State(state): State<AppState>) -> Response {
    success(serde_json::json!({ "interfaces": state.store.snapshot_interfaces() }))
}

pub(super) async fn interface_traffic(
    State(state): State<AppState>,
    Path(interface): Path<String>,
) -> Response {
    match state.store.snapshot_interfaces().remove(&interface) {
        Some(iface) => success(iface),
        None => failure(StatusCode::NOT_FOUND, "Interface not found"),
    }
}

pub(super) async fn devices(State(state): State<AppState>) -> Response {
    let list = device_list(state.store.snapshot_devices().into_values());
    let total = list.len();
    success(serde_json::json!({ "devices": list, "total": total }))
}

pub(super) async fn active_devices(State(state): State<AppState>) -> Response {
    let list = device_list(
        state
            .store
            .snapshot_devices()
            .into_values()
            .filter(|d| d.is_active),
    );
    let total = list.len();
    success(serde_json::json!({ "devices": list, "total": total }))
}

pub(super) async fn pings(State(state): State<AppState>) -> Response {
    success(serde_json::json!({ "pings": state.store.snapshot_pings() }))
}

pub(super) async fn ping(State(state): State<AppState>, Path(host): Path<String>) -> Response {
    match state.store.snapshot_pings().remove(&host) {
        Some(stats) => success(stats),
        None => failure(StatusCode::NOT_FOUND, "Host not found"),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ExportParams {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// GET /api/export/csv?type=traffic|devices|ping (default traffic).
pub(super) async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Response {
    let kind = match params.kind.as_deref().unwrap_or("traffic").parse::<ExportKind>() {
        Ok(k) => k,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid export type").into_response(),
    };

    let body = match kind {
        ExportKind::Traffic => export::traffic_csv(&state.store.snapshot_interfaces()),
        ExportKind::Devices => export::devices_csv(&state.store.snapshot_devices()),
        ExportKind::Ping => export::ping_csv(&state.store.snapshot_pings()),
    };
    let body = match body {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, operation = "export_csv", "CSV export failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "CSV export failed");
        }
    };

    let disposition = format!(
        "attachment; filename=\"network_{}_{}.csv\"",
        kind.as_str(),
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
