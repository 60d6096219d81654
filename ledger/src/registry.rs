//! The Attestation Registry interface.
//!
//! The ledger never owns attestations. For every verification it asks the
//! registry bound in the access state whether the attestation is currently
//! valid, and records that answer verbatim. Answers are never cached.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use vouch_types::{AttestationId, RegistryRef, Timestamp};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry {0} is unknown to this client")]
    UnknownRegistry(RegistryRef),

    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// What the registry reports about one attestation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationStatus {
    /// Exists, not revoked and not expired.
    pub is_valid: bool,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub issue_date: Option<Timestamp>,
    #[serde(default)]
    pub expiry_date: Option<Timestamp>,
}

impl AttestationStatus {
    /// The answer for an attestation the registry has never issued.
    pub fn missing() -> Self {
        Self {
            is_valid: false,
            issuer: None,
            subject: None,
            issue_date: None,
            expiry_date: None,
        }
    }
}

/// Read-only client for Attestation Registries.
///
/// `registry` is the reference currently bound in the ledger; a client may
/// serve several registries and must route by it.
pub trait AttestationRegistry: Send {
    fn attestation_status(
        &self,
        registry: &RegistryRef,
        attestation: &AttestationId,
    ) -> Result<AttestationStatus, RegistryError>;
}

/// A registry client backed by fixed, in-memory answers.
///
/// Deserializes from a table keyed by registry reference, then attestation
/// id. Attestations absent from a known registry are reported as
/// [`AttestationStatus::missing`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticRegistry {
    registries: HashMap<String, HashMap<String, AttestationStatus>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status of one attestation, creating the registry if needed.
    pub fn insert(
        &mut self,
        registry: &RegistryRef,
        attestation: &AttestationId,
        status: AttestationStatus,
    ) {
        self.registries
            .entry(registry.as_str().to_string())
            .or_default()
            .insert(attestation.as_str().to_string(), status);
    }

    /// Number of registries this client knows.
    pub fn registry_count(&self) -> usize {
        self.registries.len()
    }
}

impl AttestationRegistry for StaticRegistry {
    fn attestation_status(
        &self,
        registry: &RegistryRef,
        attestation: &AttestationId,
    ) -> Result<AttestationStatus, RegistryError> {
        let entries = self
            .registries
            .get(registry.as_str())
            .ok_or_else(|| RegistryError::UnknownRegistry(registry.clone()))?;
        Ok(entries
            .get(attestation.as_str())
            .cloned()
            .unwrap_or_else(AttestationStatus::missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(s: &str) -> RegistryRef {
        RegistryRef::parse(s).unwrap()
    }

    fn att(s: &str) -> AttestationId {
        AttestationId::parse(s).unwrap()
    }

    #[test]
    fn unknown_attestation_is_invalid() {
        let mut registry = StaticRegistry::new();
        registry.insert(
            &reg("main"),
            &att("a1"),
            AttestationStatus {
                is_valid: true,
                ..AttestationStatus::missing()
            },
        );
        assert!(registry.attestation_status(&reg("main"), &att("a1")).unwrap().is_valid);
        assert!(!registry.attestation_status(&reg("main"), &att("a2")).unwrap().is_valid);
    }

    #[test]
    fn unknown_registry_is_an_error() {
        let registry = StaticRegistry::new();
        assert!(matches!(
            registry.attestation_status(&reg("other"), &att("a1")),
            Err(RegistryError::UnknownRegistry(_))
        ));
    }
}
