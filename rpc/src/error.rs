//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use vouch_ledger::{ErrorKind, LedgerError};

/// Header carrying the caller identity.
pub const CALLER_HEADER: &str = "x-vouch-caller";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing {CALLER_HEADER} header")]
    MissingCaller,

    #[error("invalid caller identity: {0}")]
    InvalidCaller(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::MissingCaller => StatusCode::UNAUTHORIZED,
            RpcError::InvalidCaller(_) => StatusCode::BAD_REQUEST,
            RpcError::Ledger(e) => status_for(e.kind()),
            RpcError::LockPoisoned | RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable kind reported in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::MissingCaller => "unauthenticated",
            RpcError::InvalidCaller(_) => "validation",
            RpcError::Ledger(e) => e.kind().as_str(),
            RpcError::LockPoisoned | RpcError::Server(_) => "internal",
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Availability => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Registry => StatusCode::BAD_GATEWAY,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        RpcError::Server(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        assert_eq!(status_for(ErrorKind::Authorization), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Availability), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Registry), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn paused_maps_to_service_unavailable() {
        let err = RpcError::from(LedgerError::Paused);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), "availability");
    }

    #[test]
    fn missing_caller_is_unauthorized() {
        assert_eq!(RpcError::MissingCaller.status(), StatusCode::UNAUTHORIZED);
    }
}
