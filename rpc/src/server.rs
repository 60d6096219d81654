//! Axum-based RPC server.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use vouch_ledger::Ledger;
use vouch_types::Identity;

use crate::error::{RpcError, CALLER_HEADER};
use crate::handlers::{dispatch, RpcRequest};
use crate::metrics::RpcMetrics;

/// Shared state behind every route.
///
/// The ledger is a sequential state machine; one lock serializes all
/// calls and is never held across an await point.
pub struct RpcState {
    pub ledger: Mutex<Ledger>,
    pub metrics: RpcMetrics,
}

impl RpcState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            metrics: RpcMetrics::new(),
        }
    }
}

/// Build the router: `POST /` for actions, `GET /metrics`, `GET /health`.
pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route("/", post(rpc_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    pub state: Arc<RpcState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<RpcState>) -> Self {
        Self { port, state }
    }

    /// Serve until `shutdown` completes.
    pub async fn start(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let app = router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("RPC server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("RPC server stopped");
        Ok(())
    }
}

fn caller_from(headers: &HeaderMap) -> Result<Identity, RpcError> {
    let raw = headers
        .get(CALLER_HEADER)
        .ok_or(RpcError::MissingCaller)?
        .to_str()
        .map_err(|e| RpcError::InvalidCaller(e.to_string()))?;
    Identity::parse(raw).map_err(|e| RpcError::InvalidCaller(e.to_string()))
}

async fn rpc_handler(
    State(state): State<Arc<RpcState>>,
    headers: HeaderMap,
    Json(request): Json<RpcRequest>,
) -> Result<Json<Value>, RpcError> {
    let action = request.action();
    let is_write = request.is_write();
    state.metrics.requests.with_label_values(&[action]).inc();

    let result = caller_from(&headers).and_then(|caller| {
        debug!(caller = %caller, action, "rpc request");
        handle(&state, &caller, request).map_err(|e| {
            warn!(caller = %caller, action, error = %e, "rpc request failed");
            e
        })
    });
    if let Err(e) = &result {
        if is_write {
            state
                .metrics
                .writes_rejected
                .with_label_values(&[e.kind()])
                .inc();
        }
    }
    result.map(Json)
}

fn handle(state: &RpcState, caller: &Identity, request: RpcRequest) -> Result<Value, RpcError> {
    let mut ledger = state.ledger.lock().map_err(|_| RpcError::LockPoisoned)?;
    let result = dispatch(&mut ledger, caller, request);
    let events = ledger.drain_events();
    drop(ledger);

    for event in &events {
        info!(event = event.name(), detail = ?event, "ledger event");
        state.metrics.observe_event(event);
    }
    Ok(result?)
}

async fn metrics_handler(State(state): State<Arc<RpcState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn health_handler() -> &'static str {
    "ok"
}
