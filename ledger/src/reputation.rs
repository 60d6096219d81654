//! Reputation engine: bounded verifier scores and per-attestation tallies.
//!
//! "Correct" means agreement with the registry's live answer at
//! verification time, nothing more. A verifier that verifies a valid
//! attestation gains [`CORRECT_REWARD`]; one that verifies an invalid
//! attestation loses [`INCORRECT_PENALTY`], saturating at zero.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use vouch_types::{AttestationId, Identity, Timestamp};

/// Score of a freshly granted verifier.
pub const INITIAL_SCORE: u32 = 500;

/// Upper bound of any verifier score.
pub const MAX_SCORE: u32 = 1000;

pub const CORRECT_REWARD: u32 = 10;

pub const INCORRECT_PENALTY: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierReputation {
    pub verifier: Identity,
    pub total_verifications: u64,
    pub correct_verifications: u64,
    pub incorrect_verifications: u64,
    pub reputation_score: u32,
    pub is_active: bool,
    #[serde(default)]
    pub last_verification_at: Option<Timestamp>,
}

impl VerifierReputation {
    /// A freshly granted, active verifier.
    pub fn fresh(verifier: Identity) -> Self {
        Self {
            verifier,
            total_verifications: 0,
            correct_verifications: 0,
            incorrect_verifications: 0,
            reputation_score: INITIAL_SCORE,
            is_active: true,
            last_verification_at: None,
        }
    }

    pub fn record_outcome(&mut self, was_positive: bool, at: Timestamp) {
        self.total_verifications += 1;
        if was_positive {
            self.correct_verifications += 1;
            self.reputation_score = (self.reputation_score + CORRECT_REWARD).min(MAX_SCORE);
        } else {
            self.incorrect_verifications += 1;
            self.reputation_score = self.reputation_score.saturating_sub(INCORRECT_PENALTY);
        }
        self.last_verification_at = Some(at);
    }

    /// `total == correct + incorrect` and the score is in range.
    pub fn is_consistent(&self) -> bool {
        self.total_verifications == self.correct_verifications + self.incorrect_verifications
            && self.reputation_score <= MAX_SCORE
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationReputation {
    pub attestation_id: AttestationId,
    pub total_verifications: u64,
    pub positive_verifications: u64,
    pub negative_verifications: u64,
    /// Running integer mean of confidences, truncated at every step.
    pub average_confidence: u32,
    /// Set once a qualified majority was reached; never cleared.
    pub has_consensus: bool,
    #[serde(default)]
    pub last_verified_at: Option<Timestamp>,
}

impl AttestationReputation {
    pub fn new(attestation_id: AttestationId) -> Self {
        Self {
            attestation_id,
            total_verifications: 0,
            positive_verifications: 0,
            negative_verifications: 0,
            average_confidence: 0,
            has_consensus: false,
            last_verified_at: None,
        }
    }

    pub fn record(&mut self, was_positive: bool, confidence: u8, at: Timestamp) {
        self.total_verifications += 1;
        if was_positive {
            self.positive_verifications += 1;
        } else {
            self.negative_verifications += 1;
        }
        let total = self.total_verifications;
        let sum = u64::from(self.average_confidence) * (total - 1) + u64::from(confidence);
        // Mean of values in 0..=100 stays in 0..=100.
        self.average_confidence = (sum / total) as u32;
        self.last_verified_at = Some(at);
    }

    /// Live balance of the tallies; positive only on a strict lead.
    pub fn consensus_result(&self) -> bool {
        self.positive_verifications > self.negative_verifications
    }

    pub fn is_consistent(&self) -> bool {
        self.total_verifications == self.positive_verifications + self.negative_verifications
    }
}

/// Owner of every verifier and attestation reputation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReputationEngine {
    verifiers: HashMap<Identity, VerifierReputation>,
    attestations: HashMap<AttestationId, AttestationReputation>,
}

impl ReputationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verifier(&self, verifier: &Identity) -> Option<&VerifierReputation> {
        self.verifiers.get(verifier)
    }

    pub fn attestation(&self, attestation: &AttestationId) -> Option<&AttestationReputation> {
        self.attestations.get(attestation)
    }

    pub fn put_verifier(&mut self, reputation: VerifierReputation) {
        self.verifiers.insert(reputation.verifier.clone(), reputation);
    }

    pub fn put_attestation(&mut self, reputation: AttestationReputation) {
        self.attestations
            .insert(reputation.attestation_id.clone(), reputation);
    }

    pub fn verifiers(&self) -> impl Iterator<Item = &VerifierReputation> {
        self.verifiers.values()
    }

    pub fn attestations(&self) -> impl Iterator<Item = &AttestationReputation> {
        self.attestations.values()
    }

    pub fn active_verifier_count(&self) -> usize {
        self.verifiers.values().filter(|v| v.is_active).count()
    }

    pub fn attestation_count(&self) -> usize {
        self.attestations.len()
    }

    pub fn consensus_count(&self) -> usize {
        self.attestations.values().filter(|a| a.has_consensus).count()
    }
}
