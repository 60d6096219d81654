//! Governable consensus parameters.
//!
//! Admins tune these through `updateConsensusParameters`; every update is
//! bounds-checked here before it reaches the ledger.

use serde::{Deserialize, Serialize};

use crate::VouchError;

/// Fewest verifications an attestation needs before consensus is evaluated.
pub const MIN_VERIFICATIONS_FLOOR: u32 = 2;

/// Lowest accepted consensus threshold (a strict majority).
pub const MIN_THRESHOLD_PERCENT: u32 = 51;

/// Highest accepted consensus threshold (unanimity).
pub const MAX_THRESHOLD_PERCENT: u32 = 100;

/// Upper bound for the reserved decay rate (per-mille).
pub const MAX_DECAY_RATE: u32 = 1000;

/// Parameters of the consensus evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Verifications required before a majority is looked for.
    pub min_verifications: u32,

    /// Share of all verifications (percent, floored) one side must reach.
    pub threshold_percent: u32,

    /// Reserved. Stored and validated, never applied to scores.
    pub reputation_decay_rate: u32,
}

impl ConsensusParams {
    /// Build and validate a parameter set.
    pub fn new(
        min_verifications: u32,
        threshold_percent: u32,
        reputation_decay_rate: u32,
    ) -> Result<Self, VouchError> {
        let params = Self {
            min_verifications,
            threshold_percent,
            reputation_decay_rate,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), VouchError> {
        if self.min_verifications < MIN_VERIFICATIONS_FLOOR {
            return Err(VouchError::MinVerificationsTooLow {
                min: MIN_VERIFICATIONS_FLOOR,
                got: self.min_verifications,
            });
        }
        if !(MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&self.threshold_percent) {
            return Err(VouchError::ThresholdOutOfRange {
                min: MIN_THRESHOLD_PERCENT,
                max: MAX_THRESHOLD_PERCENT,
                got: self.threshold_percent,
            });
        }
        if self.reputation_decay_rate > MAX_DECAY_RATE {
            return Err(VouchError::DecayRateOutOfRange {
                max: MAX_DECAY_RATE,
                got: self.reputation_decay_rate,
            });
        }
        Ok(())
    }

    /// Votes one side needs: `floor(total * threshold_percent / 100)`.
    pub fn majority_of(&self, total: u64) -> u64 {
        total.saturating_mul(u64::from(self.threshold_percent)) / 100
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            min_verifications: MIN_VERIFICATIONS_FLOOR,
            threshold_percent: MIN_THRESHOLD_PERCENT,
            reputation_decay_rate: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ConsensusParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_min_verifications_below_two() {
        assert_eq!(
            ConsensusParams::new(1, 67, 0),
            Err(VouchError::MinVerificationsTooLow { min: 2, got: 1 })
        );
    }

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(ConsensusParams::new(2, 51, 0).is_ok());
        assert!(ConsensusParams::new(2, 100, 0).is_ok());
        assert!(ConsensusParams::new(2, 50, 0).is_err());
        assert!(ConsensusParams::new(2, 101, 0).is_err());
    }

    #[test]
    fn majority_floors() {
        let params = ConsensusParams::new(3, 67, 0).unwrap();
        assert_eq!(params.majority_of(3), 2);
        assert_eq!(params.majority_of(10), 6);
    }
}
