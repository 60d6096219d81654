//! Fundamental types for the vouch ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: caller identities, attestation and verification identifiers,
//! registry references, timestamps and the governable consensus parameters.

pub mod attestation;
pub mod error;
pub mod hash;
pub mod identity;
pub mod params;
pub mod registry;
pub mod time;

pub use attestation::AttestationId;
pub use error::VouchError;
pub use hash::VerificationId;
pub use identity::{Identity, Role};
pub use params::ConsensusParams;
pub use registry::RegistryRef;
pub use time::Timestamp;

/// Upper bound, in bytes, on identities and attestation ids. Both are used
/// as storage keys, so they must fit the backend's key size limit.
pub const MAX_ID_LEN: usize = 256;

pub(crate) fn check_id_len(s: &str) -> Result<(), VouchError> {
    if s.len() > MAX_ID_LEN {
        return Err(VouchError::IdTooLong {
            max: MAX_ID_LEN,
            got: s.len(),
        });
    }
    Ok(())
}
