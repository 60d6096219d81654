//! Ledger-wide counters.

use serde::{Deserialize, Serialize};

/// Monotonic counters persisted alongside the access state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCounters {
    /// Every verification ever recorded.
    pub total_verifications: u64,
    /// Every effective verifier grant ever issued.
    pub total_verifier_grants: u64,
}

/// Counters plus the derived figures returned by `getGlobalStatistics`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStatistics {
    pub total_verifications: u64,
    /// Counts grants, not distinct identities: a verifier revoked and
    /// granted again is counted twice.
    pub total_verifier_grants: u64,
    pub active_verifiers: u64,
    pub attestations_with_reputation: u64,
    pub attestations_with_consensus: u64,
}
