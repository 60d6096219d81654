//! Batch verification: request validation and staging.
//!
//! Every verification, single or batched, is staged here first. The stager
//! builds new records and reputations beside the live state and encodes
//! them into a [`WriteSet`]; the ledger publishes the staged values only
//! after the store committed that set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use vouch_crypto::derive_verification_id;
use vouch_store::{WriteOp, WriteSet};
use vouch_types::{AttestationId, ConsensusParams, Timestamp, VerificationId};

use crate::consensus::ConsensusEvaluator;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::record::{RecordLog, VerificationRecord};
use crate::reputation::{AttestationReputation, ReputationEngine, VerifierReputation};

/// Highest accepted confidence value.
pub const MAX_CONFIDENCE: u32 = 100;

/// Three parallel arrays, one element per verification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchVerifyRequest {
    pub attestation_ids: Vec<AttestationId>,
    pub confidences: Vec<u32>,
    pub notes: Vec<String>,
}

impl BatchVerifyRequest {
    pub fn len(&self) -> usize {
        self.attestation_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attestation_ids.is_empty()
    }

    /// Shape and range checks. Touches no state.
    pub fn validate(&self, max_batch_size: usize) -> Result<(), LedgerError> {
        let attestations = self.attestation_ids.len();
        if self.confidences.len() != attestations || self.notes.len() != attestations {
            return Err(LedgerError::BatchLengthMismatch {
                attestations,
                confidences: self.confidences.len(),
                notes: self.notes.len(),
            });
        }
        if attestations > max_batch_size {
            return Err(LedgerError::BatchTooLarge {
                len: attestations,
                max: max_batch_size,
            });
        }
        for (index, &value) in self.confidences.iter().enumerate() {
            if value > MAX_CONFIDENCE {
                return Err(LedgerError::BatchConfidenceOutOfRange { index, value });
            }
        }
        Ok(())
    }
}

/// Parallel arrays of new record ids and the validity captured for each.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub verification_ids: Vec<VerificationId>,
    pub results: Vec<bool>,
}

pub(crate) fn check_confidence(value: u32) -> Result<u8, LedgerError> {
    u8::try_from(value)
        .ok()
        .filter(|&c| u32::from(c) <= MAX_CONFIDENCE)
        .ok_or(LedgerError::ConfidenceOutOfRange(value))
}

/// Values to publish once the matching write set is committed.
#[derive(Debug)]
pub(crate) struct StagedVerifications {
    pub records: Vec<VerificationRecord>,
    pub verifier: VerifierReputation,
    pub attestations: Vec<AttestationReputation>,
    pub events: Vec<LedgerEvent>,
}

pub(crate) struct VerificationStager<'a> {
    records: &'a RecordLog,
    reputation: &'a ReputationEngine,
    params: &'a ConsensusParams,
    timestamp: Timestamp,
    next_sequence: u64,
    verifier: VerifierReputation,
    verifier_position: u64,
    attestations: HashMap<AttestationId, AttestationReputation>,
    attestation_positions: HashMap<AttestationId, u64>,
    new_records: Vec<VerificationRecord>,
    events: Vec<LedgerEvent>,
}

impl<'a> VerificationStager<'a> {
    /// `next_sequence` is the global verification counter; element `i` of
    /// the call uses `next_sequence + i`.
    pub fn new(
        records: &'a RecordLog,
        reputation: &'a ReputationEngine,
        params: &'a ConsensusParams,
        verifier: VerifierReputation,
        timestamp: Timestamp,
        next_sequence: u64,
    ) -> Self {
        let verifier_position = records.verifier_len(&verifier.verifier) as u64;
        Self {
            records,
            reputation,
            params,
            timestamp,
            next_sequence,
            verifier,
            verifier_position,
            attestations: HashMap::new(),
            attestation_positions: HashMap::new(),
            new_records: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Run one element through record creation, reputation update and
    /// consensus evaluation. `is_valid` is the registry's answer.
    pub fn stage(
        &mut self,
        attestation: &AttestationId,
        confidence: u8,
        notes: String,
        is_valid: bool,
    ) -> &VerificationRecord {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let id = derive_verification_id(
            attestation,
            &self.verifier.verifier,
            self.timestamp,
            sequence,
        );

        self.verifier.record_outcome(is_valid, self.timestamp);

        let reputation = self
            .attestations
            .entry(attestation.clone())
            .or_insert_with(|| {
                self.reputation
                    .attestation(attestation)
                    .cloned()
                    .unwrap_or_else(|| AttestationReputation::new(attestation.clone()))
            });
        reputation.record(is_valid, confidence, self.timestamp);

        self.events.push(LedgerEvent::VerificationRecorded {
            id,
            attestation: attestation.clone(),
            verifier: self.verifier.verifier.clone(),
            is_valid,
            confidence,
        });
        if let Some(verdict) = ConsensusEvaluator::apply(reputation, self.params) {
            self.events.push(LedgerEvent::ConsensusReached {
                attestation: attestation.clone(),
                verdict,
            });
        }

        self.new_records.push(VerificationRecord {
            id,
            attestation_id: attestation.clone(),
            verifier: self.verifier.verifier.clone(),
            timestamp: self.timestamp,
            is_valid,
            confidence,
            notes,
            revoked: false,
            sequence,
        });
        &self.new_records[self.new_records.len() - 1]
    }

    /// Encode everything staged so far.
    pub fn finish(self) -> Result<(WriteSet, StagedVerifications), LedgerError> {
        let mut writes = WriteSet::new();
        let mut attestation_positions = self.attestation_positions;
        let mut verifier_position = self.verifier_position;

        for record in &self.new_records {
            writes.push(WriteOp::PutRecord {
                id: record.id,
                data: bincode::serialize(record)?,
            });
            let position = attestation_positions
                .entry(record.attestation_id.clone())
                .or_insert_with(|| self.records.attestation_len(&record.attestation_id) as u64);
            writes.push(WriteOp::IndexByAttestation {
                attestation: record.attestation_id.clone(),
                seq: *position,
                id: record.id,
            });
            *position += 1;
            writes.push(WriteOp::IndexByVerifier {
                verifier: record.verifier.clone(),
                seq: verifier_position,
                id: record.id,
            });
            verifier_position += 1;
        }

        if !self.new_records.is_empty() {
            writes.push(WriteOp::PutVerifierReputation {
                verifier: self.verifier.verifier.clone(),
                data: bincode::serialize(&self.verifier)?,
            });
        }
        let mut attestations: Vec<AttestationReputation> = self.attestations.into_values().collect();
        attestations.sort_by(|a, b| a.attestation_id.cmp(&b.attestation_id));
        for reputation in &attestations {
            writes.push(WriteOp::PutAttestationReputation {
                attestation: reputation.attestation_id.clone(),
                data: bincode::serialize(reputation)?,
            });
        }

        Ok((
            writes,
            StagedVerifications {
                records: self.new_records,
                verifier: self.verifier,
                attestations,
                events: self.events,
            },
        ))
    }
}
