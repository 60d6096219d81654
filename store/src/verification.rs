//! Verification record storage trait.

use crate::StoreError;
use vouch_types::{AttestationId, Identity, VerificationId};

/// Trait for reading verification records and their two ordered indexes.
pub trait VerificationStore {
    /// Get an encoded record by id.
    fn get_record(&self, id: &VerificationId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All encoded records, in id order.
    fn iter_records(&self) -> Result<Vec<(VerificationId, Vec<u8>)>, StoreError>;

    /// Record ids for an attestation, oldest first.
    fn attestation_index(&self, attestation: &AttestationId)
        -> Result<Vec<VerificationId>, StoreError>;

    /// Record ids submitted by a verifier, oldest first.
    fn verifier_index(&self, verifier: &Identity) -> Result<Vec<VerificationId>, StoreError>;

    fn record_count(&self) -> Result<u64, StoreError> {
        self.iter_records().map(|r| r.len() as u64)
    }
}
