//! Prometheus metrics for the RPC surface.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use vouch_ledger::LedgerEvent;

pub struct RpcMetrics {
    pub registry: Registry,
    /// Requests received, by action.
    pub requests: IntCounterVec,
    /// Verification records created (single and batch).
    pub verifications_recorded: IntCounter,
    /// Write actions rejected, by error kind.
    pub writes_rejected: IntCounterVec,
    /// Ledger audit events emitted, by event name.
    pub events_emitted: IntCounterVec,
}

impl RpcMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests = register_int_counter_vec_with_registry!(
            Opts::new("vouch_rpc_requests_total", "RPC requests received"),
            &["action"],
            registry
        )
        .expect("failed to register requests counter");

        let verifications_recorded = register_int_counter_with_registry!(
            Opts::new(
                "vouch_verifications_recorded_total",
                "Verification records created"
            ),
            registry
        )
        .expect("failed to register verifications_recorded counter");

        let writes_rejected = register_int_counter_vec_with_registry!(
            Opts::new("vouch_writes_rejected_total", "Write actions rejected"),
            &["kind"],
            registry
        )
        .expect("failed to register writes_rejected counter");

        let events_emitted = register_int_counter_vec_with_registry!(
            Opts::new("vouch_events_emitted_total", "Ledger audit events emitted"),
            &["event"],
            registry
        )
        .expect("failed to register events_emitted counter");

        Self {
            registry,
            requests,
            verifications_recorded,
            writes_rejected,
            events_emitted,
        }
    }

    pub fn observe_event(&self, event: &LedgerEvent) {
        self.events_emitted.with_label_values(&[event.name()]).inc();
        if matches!(event, LedgerEvent::VerificationRecorded { .. }) {
            self.verifications_recorded.inc();
        }
    }

    /// Encode every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}
