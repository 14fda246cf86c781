// HTTP + WebSocket routes over the store's snapshot operations

pub mod export;
mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::models::LiveData;
use crate::store::Store;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<Store>,
    pub(crate) live_tx: broadcast::Sender<LiveData>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    store: Arc<Store>,
    live_tx: broadcast::Sender<LiveData>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        store,
        live_tx,
        ws_connections,
    };
    Router::new()
        .route("/", get(|| async { "netmonitor: see /api/ and /ws" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/traffic", get(http::traffic)) // GET /api/traffic
        .route("/api/traffic/{interface}", get(http::interface_traffic))
        .route("/api/devices", get(http::devices)) // GET /api/devices
        .route("/api/devices/active", get(http::active_devices))
        .route("/api/ping", get(http::pings)) // GET /api/ping
        .route("/api/ping/{host}", get(http::ping))
        .route("/api/export/csv", get(http::export_csv)) // GET /api/export/csv?type=
        .route("/ws", get(ws::ws_live)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
