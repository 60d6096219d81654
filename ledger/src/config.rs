//! Ledger configuration.

use serde::{Deserialize, Serialize};

use vouch_types::params::{MIN_THRESHOLD_PERCENT, MIN_VERIFICATIONS_FLOOR};
use vouch_types::{ConsensusParams, Identity, RegistryRef};

use crate::error::LedgerError;

/// Settings a [`Ledger`](crate::Ledger) is opened with.
///
/// `initial_admins`, `registry_reference` and the consensus parameters only
/// seed a fresh store; once persisted, the stored values win.
/// `reset_on_regrant` and `max_batch_size` are read on every open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub initial_admins: Vec<String>,

    #[serde(default = "default_registry_reference")]
    pub registry_reference: String,

    #[serde(default = "default_min_verifications")]
    pub min_verifications_for_consensus: u32,

    #[serde(default = "default_threshold_percent")]
    pub consensus_threshold_percent: u32,

    /// Reserved; validated and stored, never applied.
    #[serde(default)]
    pub reputation_decay_rate: u32,

    /// Re-granting a revoked verifier wipes its reputation back to the
    /// initial score when set; otherwise the verifier is only reactivated.
    #[serde(default = "default_true")]
    pub reset_on_regrant: bool,

    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_registry_reference() -> String {
    "default".to_string()
}

fn default_min_verifications() -> u32 {
    MIN_VERIFICATIONS_FLOOR
}

fn default_threshold_percent() -> u32 {
    MIN_THRESHOLD_PERCENT
}

fn default_true() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    256
}

impl LedgerConfig {
    /// Config with a single initial admin and defaults elsewhere.
    pub fn with_admin(admin: &str) -> Self {
        Self {
            initial_admins: vec![admin.to_string()],
            ..Self::default()
        }
    }

    pub fn admins(&self) -> Result<Vec<Identity>, LedgerError> {
        self.initial_admins
            .iter()
            .map(|a| Identity::parse(a.as_str()).map_err(LedgerError::from))
            .collect()
    }

    pub fn registry(&self) -> Result<RegistryRef, LedgerError> {
        Ok(RegistryRef::parse(self.registry_reference.as_str())?)
    }

    pub fn params(&self) -> Result<ConsensusParams, LedgerError> {
        Ok(ConsensusParams::new(
            self.min_verifications_for_consensus,
            self.consensus_threshold_percent,
            self.reputation_decay_rate,
        )?)
    }

    /// Check every field without opening anything.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.initial_admins.is_empty() {
            return Err(LedgerError::NoInitialAdmins);
        }
        self.admins()?;
        self.registry()?;
        self.params()?;
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_admins: Vec::new(),
            registry_reference: default_registry_reference(),
            min_verifications_for_consensus: default_min_verifications(),
            consensus_threshold_percent: default_threshold_percent(),
            reputation_decay_rate: 0,
            reset_on_regrant: default_true(),
            max_batch_size: default_max_batch_size(),
        }
    }
}
