//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while constructing or parsing the shared types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VouchError {
    #[error("invalid identity: {0:?}")]
    InvalidIdentity(String),

    #[error("invalid attestation id: {0:?}")]
    InvalidAttestationId(String),

    #[error("identifier is {got} bytes, longer than the {max} byte limit")]
    IdTooLong { max: usize, got: usize },

    #[error("invalid verification id: {0}")]
    InvalidVerificationId(String),

    #[error("registry reference must not be empty")]
    EmptyRegistryRef,

    #[error("minimum verifications for consensus must be at least {min}, got {got}")]
    MinVerificationsTooLow { min: u32, got: u32 },

    #[error("consensus threshold must be within {min}..={max} percent, got {got}")]
    ThresholdOutOfRange { min: u32, max: u32, got: u32 },

    #[error("reputation decay rate must be at most {max}, got {got}")]
    DecayRateOutOfRange { max: u32, got: u32 },
}
