//! Verification records and the in-memory record log.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use vouch_types::{AttestationId, Identity, Timestamp, VerificationId};

use crate::pagination::{page_range, Page};

/// One third-party verification of an attestation.
///
/// Everything except `notes` and the `revoked` marker is fixed at creation.
/// `is_valid` is the registry's answer at verification time and is never
/// refreshed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: VerificationId,
    pub attestation_id: AttestationId,
    pub verifier: Identity,
    pub timestamp: Timestamp,
    pub is_valid: bool,
    pub confidence: u8,
    pub notes: String,
    #[serde(default)]
    pub revoked: bool,
    /// Global ordinal of this record (0-based), also fed into the id.
    pub sequence: u64,
}

impl VerificationRecord {
    /// The captured registry answer, overridden by an admin revocation.
    pub fn effective_validity(&self) -> bool {
        self.is_valid && !self.revoked
    }
}

/// All records plus their per-attestation and per-verifier indexes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordLog {
    records: HashMap<VerificationId, VerificationRecord>,
    by_attestation: HashMap<AttestationId, Vec<VerificationId>>,
    by_verifier: HashMap<Identity, Vec<VerificationId>>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &VerificationId) -> Option<&VerificationRecord> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerificationRecord> {
        self.records.values()
    }

    pub fn contains(&self, id: &VerificationId) -> bool {
        self.records.contains_key(id)
    }

    /// Position the next record of `attestation` will take in its index.
    pub fn attestation_len(&self, attestation: &AttestationId) -> usize {
        self.by_attestation.get(attestation).map_or(0, Vec::len)
    }

    /// Position the next record of `verifier` will take in its index.
    pub fn verifier_len(&self, verifier: &Identity) -> usize {
        self.by_verifier.get(verifier).map_or(0, Vec::len)
    }

    /// Append a new record to the log and both indexes.
    pub fn append(&mut self, record: VerificationRecord) {
        self.by_attestation
            .entry(record.attestation_id.clone())
            .or_default()
            .push(record.id);
        self.by_verifier
            .entry(record.verifier.clone())
            .or_default()
            .push(record.id);
        self.records.insert(record.id, record);
    }

    /// Overwrite an existing record in place without touching the indexes.
    pub fn replace(&mut self, record: VerificationRecord) {
        self.records.insert(record.id, record);
    }

    /// Restore a record and its index positions from storage.
    pub(crate) fn restore(
        &mut self,
        records: HashMap<VerificationId, VerificationRecord>,
        by_attestation: HashMap<AttestationId, Vec<VerificationId>>,
        by_verifier: HashMap<Identity, Vec<VerificationId>>,
    ) {
        self.records = records;
        self.by_attestation = by_attestation;
        self.by_verifier = by_verifier;
    }

    pub fn for_attestation(
        &self,
        attestation: &AttestationId,
        offset: usize,
        limit: usize,
    ) -> Page<VerificationRecord> {
        self.page(self.by_attestation.get(attestation), offset, limit)
    }

    pub fn for_verifier(
        &self,
        verifier: &Identity,
        offset: usize,
        limit: usize,
    ) -> Page<VerificationRecord> {
        self.page(self.by_verifier.get(verifier), offset, limit)
    }

    fn page(
        &self,
        ids: Option<&Vec<VerificationId>>,
        offset: usize,
        limit: usize,
    ) -> Page<VerificationRecord> {
        let Some(ids) = ids else {
            return Page::empty();
        };
        let items = ids[page_range(ids.len(), offset, limit)]
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();
        Page {
            items,
            total: ids.len() as u64,
        }
    }
}
