//! Nullable attestation registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vouch_ledger::{AttestationRegistry, AttestationStatus, RegistryError};
use vouch_types::{AttestationId, RegistryRef};

#[derive(Default)]
struct Inner {
    statuses: Mutex<HashMap<(String, String), bool>>,
    unavailable: AtomicBool,
    lookups: AtomicUsize,
}

/// A programmable registry for testing.
///
/// Answers for any registry reference; unknown attestations are invalid.
/// Clones share state.
#[derive(Clone, Default)]
pub struct NullRegistry {
    inner: Arc<Inner>,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `attestation` as valid or invalid under `registry`.
    pub fn set_valid(&self, registry: &str, attestation: &str, valid: bool) {
        self.inner
            .statuses
            .lock()
            .unwrap()
            .insert((registry.to_string(), attestation.to_string()), valid);
    }

    /// Make every lookup fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups served or refused so far.
    pub fn lookups(&self) -> usize {
        self.inner.lookups.load(Ordering::SeqCst)
    }
}

impl AttestationRegistry for NullRegistry {
    fn attestation_status(
        &self,
        registry: &RegistryRef,
        attestation: &AttestationId,
    ) -> Result<AttestationStatus, RegistryError> {
        self.inner.lookups.fetch_add(1, Ordering::SeqCst);
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("null registry switched off".into()));
        }
        let valid = self
            .inner
            .statuses
            .lock()
            .unwrap()
            .get(&(registry.as_str().to_string(), attestation.as_str().to_string()))
            .copied()
            .unwrap_or(false);
        Ok(AttestationStatus {
            is_valid: valid,
            ..AttestationStatus::missing()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_scoped_by_registry() {
        let registry = NullRegistry::new();
        registry.set_valid("main", "a1", true);
        let main = RegistryRef::parse("main").unwrap();
        let other = RegistryRef::parse("other").unwrap();
        let a1 = AttestationId::parse("a1").unwrap();
        assert!(registry.attestation_status(&main, &a1).unwrap().is_valid);
        assert!(!registry.attestation_status(&other, &a1).unwrap().is_valid);
        assert_eq!(registry.lookups(), 2);
    }

    #[test]
    fn unavailable_registry_errors() {
        let registry = NullRegistry::new();
        registry.set_unavailable(true);
        let result = registry.attestation_status(
            &RegistryRef::parse("main").unwrap(),
            &AttestationId::parse("a1").unwrap(),
        );
        assert!(matches!(result, Err(RegistryError::Unavailable(_))));
    }
}
