//! JSON RPC server for the vouch ledger.
//!
//! A single `POST /` endpoint takes a JSON body tagged by `action` and the
//! caller identity from the `x-vouch-caller` header. Ledger errors map onto
//! HTTP statuses by kind. `GET /metrics` exposes Prometheus counters and
//! `GET /health` answers `ok`.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use handlers::{dispatch, RpcRequest};
pub use metrics::RpcMetrics;
pub use server::{router, RpcServer, RpcState};
