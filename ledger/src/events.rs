//! Audit events emitted by every state change.

use serde::Serialize;

use vouch_types::{AttestationId, ConsensusParams, Identity, RegistryRef, VerificationId};

use crate::consensus::ConsensusVerdict;

/// One state change, in the order it was applied.
///
/// The ledger buffers events until the host calls
/// [`Ledger::drain_events`](crate::Ledger::drain_events).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    VerifierGranted {
        verifier: Identity,
        by: Identity,
        /// Whether the reputation was (re-)initialized.
        reset: bool,
    },
    VerifierRevoked {
        verifier: Identity,
        by: Identity,
    },
    AdminGranted {
        admin: Identity,
        by: Identity,
    },
    AdminRevoked {
        admin: Identity,
        by: Identity,
    },
    PausedChanged {
        paused: bool,
        by: Identity,
    },
    CircuitBreakerChanged {
        engaged: bool,
        by: Identity,
    },
    RegistryUpdated {
        old: RegistryRef,
        new: RegistryRef,
        by: Identity,
    },
    ParametersUpdated {
        old: ConsensusParams,
        new: ConsensusParams,
        by: Identity,
    },
    VerificationRecorded {
        id: VerificationId,
        attestation: AttestationId,
        verifier: Identity,
        is_valid: bool,
        confidence: u8,
    },
    ConsensusReached {
        attestation: AttestationId,
        verdict: ConsensusVerdict,
    },
    NotesUpdated {
        id: VerificationId,
        by: Identity,
    },
    VerificationRevoked {
        id: VerificationId,
        by: Identity,
    },
}

impl LedgerEvent {
    /// Stable snake_case name, used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VerifierGranted { .. } => "verifier_granted",
            Self::VerifierRevoked { .. } => "verifier_revoked",
            Self::AdminGranted { .. } => "admin_granted",
            Self::AdminRevoked { .. } => "admin_revoked",
            Self::PausedChanged { .. } => "paused_changed",
            Self::CircuitBreakerChanged { .. } => "circuit_breaker_changed",
            Self::RegistryUpdated { .. } => "registry_updated",
            Self::ParametersUpdated { .. } => "parameters_updated",
            Self::VerificationRecorded { .. } => "verification_recorded",
            Self::ConsensusReached { .. } => "consensus_reached",
            Self::NotesUpdated { .. } => "notes_updated",
            Self::VerificationRevoked { .. } => "verification_revoked",
        }
    }
}
