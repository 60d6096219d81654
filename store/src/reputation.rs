//! Reputation storage trait.

use crate::StoreError;
use vouch_types::{AttestationId, Identity};

/// Trait for reading encoded verifier and attestation reputations.
pub trait ReputationStore {
    fn get_verifier_reputation(&self, verifier: &Identity) -> Result<Option<Vec<u8>>, StoreError>;

    fn iter_verifier_reputations(&self) -> Result<Vec<(Identity, Vec<u8>)>, StoreError>;

    fn get_attestation_reputation(
        &self,
        attestation: &AttestationId,
    ) -> Result<Option<Vec<u8>>, StoreError>;

    fn iter_attestation_reputations(&self) -> Result<Vec<(AttestationId, Vec<u8>)>, StoreError>;
}
