//! Ledger error types and their classification.

use thiserror::Error;

use vouch_store::StoreError;
use vouch_types::{AttestationId, Identity, VerificationId, VouchError};

use crate::registry::RegistryError;

/// Broad class of a [`LedgerError`], used by hosts to decide how to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller lacks a role or is an inactive verifier.
    Authorization,
    /// Writes are paused or the circuit breaker is engaged.
    Availability,
    /// The input can never succeed as given.
    Validation,
    /// A referenced record or reputation does not exist.
    NotFound,
    /// The Attestation Registry could not answer.
    Registry,
    /// The persistence backend failed.
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Availability => "availability",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Registry => "registry",
            Self::Storage => "storage",
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Authorization ───────────────────────────────────────────────────
    #[error("{0} does not hold the verifier role")]
    NotVerifier(Identity),

    #[error("verifier {0} is inactive")]
    InactiveVerifier(Identity),

    #[error("{0} does not hold the admin role")]
    NotAdmin(Identity),

    #[error("{caller} is neither the verifier of {id} nor an admin")]
    NotRecordOwner { caller: Identity, id: VerificationId },

    // ── Availability ────────────────────────────────────────────────────
    #[error("ledger writes are paused")]
    Paused,

    #[error("circuit breaker is engaged")]
    CircuitBroken,

    // ── Validation ──────────────────────────────────────────────────────
    #[error("confidence {0} is outside 0..=100")]
    ConfidenceOutOfRange(u32),

    #[error("batch element {index}: confidence {value} is outside 0..=100")]
    BatchConfidenceOutOfRange { index: usize, value: u32 },

    #[error(
        "batch arrays differ in length: {attestations} attestations, \
         {confidences} confidences, {notes} notes"
    )]
    BatchLengthMismatch {
        attestations: usize,
        confidences: usize,
        notes: usize,
    },

    #[error("batch of {len} exceeds the maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("cannot revoke the last remaining admin {0}")]
    LastAdmin(Identity),

    #[error("a new ledger needs at least one initial admin")]
    NoInitialAdmins,

    #[error("verification {0} is already revoked")]
    AlreadyRevoked(VerificationId),

    #[error(transparent)]
    Invalid(#[from] VouchError),

    // ── Not found ───────────────────────────────────────────────────────
    #[error("verification {0} not found")]
    VerificationNotFound(VerificationId),

    #[error("no reputation recorded for attestation {0}")]
    AttestationNotFound(AttestationId),

    #[error("no reputation recorded for verifier {0}")]
    VerifierNotFound(Identity),

    // ── Collaborators ───────────────────────────────────────────────────
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(String),
}

impl LedgerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotVerifier(_)
            | Self::InactiveVerifier(_)
            | Self::NotAdmin(_)
            | Self::NotRecordOwner { .. } => ErrorKind::Authorization,
            Self::Paused | Self::CircuitBroken => ErrorKind::Availability,
            Self::ConfidenceOutOfRange(_)
            | Self::BatchConfidenceOutOfRange { .. }
            | Self::BatchLengthMismatch { .. }
            | Self::BatchTooLarge { .. }
            | Self::LastAdmin(_)
            | Self::NoInitialAdmins
            | Self::AlreadyRevoked(_)
            | Self::Invalid(_)
            | Self::Storage(StoreError::Rejected(_)) => ErrorKind::Validation,
            Self::VerificationNotFound(_)
            | Self::AttestationNotFound(_)
            | Self::VerifierNotFound(_) => ErrorKind::NotFound,
            Self::Registry(_) => ErrorKind::Registry,
            Self::Storage(_) | Self::Codec(_) => ErrorKind::Storage,
        }
    }

    /// Whether the same call may succeed later without changing its input.
    ///
    /// Pause is transient; the circuit breaker stays engaged until an admin
    /// clears it and is therefore not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Paused | Self::Registry(_) => true,
            Self::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Codec(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_is_retryable_but_circuit_breaker_is_not() {
        assert!(LedgerError::Paused.is_retryable());
        assert!(!LedgerError::CircuitBroken.is_retryable());
        assert_eq!(LedgerError::CircuitBroken.kind(), ErrorKind::Availability);
    }

    #[test]
    fn validation_errors_are_never_retryable() {
        let err = LedgerError::ConfidenceOutOfRange(101);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.is_retryable());
    }

    #[test]
    fn storage_errors_follow_the_backend() {
        let transient = LedgerError::from(StoreError::Backend("map full".into()));
        assert_eq!(transient.kind(), ErrorKind::Storage);
        assert!(transient.is_retryable());

        let rejected = LedgerError::from(StoreError::Rejected("key too large".into()));
        assert_eq!(rejected.kind(), ErrorKind::Validation);
        assert!(!rejected.is_retryable());

        let corrupt = LedgerError::from(StoreError::Corruption("bad index".into()));
        assert!(!corrupt.is_retryable());
    }

    #[test]
    fn type_errors_classify_as_validation() {
        let err = LedgerError::from(VouchError::EmptyRegistryRef);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
