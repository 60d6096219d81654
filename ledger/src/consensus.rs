//! Consensus evaluator.
//!
//! An attestation reaches consensus once it has at least
//! `min_verifications` verifications and one side holds at least
//! `floor(total * threshold_percent / 100)` of them. The `has_consensus`
//! flag is sticky; the result reported by [`ConsensusStatus`] is always
//! the live balance.

use serde::{Deserialize, Serialize};

use vouch_types::ConsensusParams;

use crate::reputation::AttestationReputation;

/// Which side reached the qualified majority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusVerdict {
    Positive,
    Negative,
}

impl ConsensusVerdict {
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

/// Read-only view returned by `getConsensusStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusStatus {
    pub has_consensus: bool,
    pub consensus_result: bool,
    pub verification_count: u64,
}

impl ConsensusStatus {
    /// Status of an attestation nobody has verified.
    pub const NONE: Self = Self {
        has_consensus: false,
        consensus_result: false,
        verification_count: 0,
    };

    pub fn of(reputation: &AttestationReputation) -> Self {
        Self {
            has_consensus: reputation.has_consensus,
            consensus_result: reputation.consensus_result(),
            verification_count: reputation.total_verifications,
        }
    }
}

pub struct ConsensusEvaluator;

impl ConsensusEvaluator {
    /// Whether the current tallies hold a qualified majority. Positive wins
    /// when both sides qualify.
    pub fn evaluate(
        reputation: &AttestationReputation,
        params: &ConsensusParams,
    ) -> Option<ConsensusVerdict> {
        let total = reputation.total_verifications;
        if total < u64::from(params.min_verifications) {
            return None;
        }
        let majority = params.majority_of(total);
        if reputation.positive_verifications >= majority {
            Some(ConsensusVerdict::Positive)
        } else if reputation.negative_verifications >= majority {
            Some(ConsensusVerdict::Negative)
        } else {
            None
        }
    }

    /// Evaluate and latch `has_consensus`. Returns the verdict only when
    /// this call is the one that set the flag.
    pub fn apply(
        reputation: &mut AttestationReputation,
        params: &ConsensusParams,
    ) -> Option<ConsensusVerdict> {
        let verdict = Self::evaluate(reputation, params)?;
        if reputation.has_consensus {
            return None;
        }
        reputation.has_consensus = true;
        Some(verdict)
    }
}
