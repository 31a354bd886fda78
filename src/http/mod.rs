//! HTTP diagnostic surface.
//!
//! A small router hosted next to the hub socket: process liveness, local
//! address discovery, a reachability probe, and a registry snapshot.
//! Nothing here participates in message relay and nothing here writes
//! hub state.

pub mod netinfo;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::error::Result;
use crate::registry::ClientRegistry;
use crate::stats::HubStats;

/// Read-only state shared by the diagnostic handlers.
pub struct DiagState {
    registry: Arc<ClientRegistry>,
    stats: Arc<HubStats>,
    started_at: Instant,
}

impl DiagState {
    pub fn new(registry: Arc<ClientRegistry>, stats: Arc<HubStats>) -> Self {
        Self {
            registry,
            stats,
            started_at: Instant::now(),
        }
    }
}

/// Build the diagnostic router.
pub fn router(state: Arc<DiagState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/interfaces", get(interfaces))
        .route("/ping/:host", get(ping))
        .route("/clients", get(clients))
        .with_state(state)
}

/// Bind `addr` and serve the diagnostic router until the task is dropped.
pub async fn serve(addr: SocketAddr, state: Arc<DiagState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Diagnostics listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health(State(state): State<Arc<DiagState>>) -> Json<Value> {
    let counters = state.stats.snapshot();
    Json(json!({
        "status": "ok",
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "activeConnections": counters.connections_active,
        "registeredClients": state.registry.count().await,
        "counters": counters,
    }))
}

async fn interfaces() -> Json<Value> {
    let list: Vec<Value> = netinfo::local_addresses()
        .into_iter()
        .map(|iface| {
            json!({
                "name": iface.name,
                "address": iface.addr.to_string(),
                "family": if iface.addr.is_ipv4() { "v4" } else { "v6" },
            })
        })
        .collect();
    Json(Value::Array(list))
}

async fn ping(Path(host): Path<String>) -> Response {
    if !valid_ping_host(&host) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid host" })),
        )
            .into_response();
    }

    let reachable = match tokio::process::Command::new("ping")
        .args(["-c", "1", "-W", "2", &host])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
    {
        Ok(status) => status.success(),
        Err(err) => {
            tracing::debug!(error = %err, "Ping utility unavailable");
            false
        }
    };

    Json(json!({ "host": host, "reachable": reachable })).into_response()
}

async fn clients(State(state): State<Arc<DiagState>>) -> Json<Value> {
    let list: Vec<Value> = state
        .registry
        .snapshot()
        .await
        .into_iter()
        .map(|info| {
            json!({
                "userId": info.id.as_str(),
                "sessionId": info.session_id,
                "live": info.live,
                "metadata": Value::Object(info.metadata),
            })
        })
        .collect();
    Json(Value::Array(list))
}

/// Hostnames and literal addresses only; anything shell-ish is rejected
/// before it reaches the ping binary.
fn valid_ping_host(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'))
}
