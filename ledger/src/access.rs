//! Access & safety controller.
//!
//! Holds role membership, the two-level stop mechanism, the bound registry
//! reference and the consensus parameters. Mutators never check the caller;
//! the [`Ledger`](crate::Ledger) authorizes first and then applies the change
//! to a staged copy of the controller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use vouch_types::{ConsensusParams, Identity, RegistryRef, Role};

use crate::error::LedgerError;

/// The persisted portion of the controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    pub admins: BTreeSet<Identity>,
    pub verifiers: BTreeSet<Identity>,
    pub paused: bool,
    pub circuit_broken: bool,
    pub registry: RegistryRef,
    pub params: ConsensusParams,
}

/// Pause, circuit breaker and registry binding, as reported to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyState {
    pub paused: bool,
    pub circuit_broken: bool,
    pub registry: RegistryRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessController {
    state: AccessState,
}

impl AccessController {
    /// Genesis controller: `admins` hold the admin role, nobody verifies yet,
    /// writes are open.
    pub fn new(
        admins: impl IntoIterator<Item = Identity>,
        registry: RegistryRef,
        params: ConsensusParams,
    ) -> Result<Self, LedgerError> {
        let admins: BTreeSet<Identity> = admins.into_iter().collect();
        if admins.is_empty() {
            return Err(LedgerError::NoInitialAdmins);
        }
        params.validate()?;
        Ok(Self {
            state: AccessState {
                admins,
                verifiers: BTreeSet::new(),
                paused: false,
                circuit_broken: false,
                registry,
                params,
            },
        })
    }

    pub fn from_state(state: AccessState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AccessState {
        &self.state
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.state.params
    }

    pub fn registry(&self) -> &RegistryRef {
        &self.state.registry
    }

    pub fn safety_state(&self) -> SafetyState {
        SafetyState {
            paused: self.state.paused,
            circuit_broken: self.state.circuit_broken,
            registry: self.state.registry.clone(),
        }
    }

    pub fn has_role(&self, identity: &Identity, role: Role) -> bool {
        match role {
            Role::Admin => self.state.admins.contains(identity),
            Role::Verifier => self.state.verifiers.contains(identity),
        }
    }

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.has_role(identity, Role::Admin)
    }

    pub fn is_verifier(&self, identity: &Identity) -> bool {
        self.has_role(identity, Role::Verifier)
    }

    pub fn admin_count(&self) -> usize {
        self.state.admins.len()
    }

    pub fn require_admin(&self, identity: &Identity) -> Result<(), LedgerError> {
        if self.is_admin(identity) {
            Ok(())
        } else {
            Err(LedgerError::NotAdmin(identity.clone()))
        }
    }

    pub fn require_verifier(&self, identity: &Identity) -> Result<(), LedgerError> {
        if self.is_verifier(identity) {
            Ok(())
        } else {
            Err(LedgerError::NotVerifier(identity.clone()))
        }
    }

    /// Fails while either stop is engaged. The circuit breaker is reported
    /// first since it outlives a pause.
    pub fn check_writable(&self) -> Result<(), LedgerError> {
        if self.state.circuit_broken {
            return Err(LedgerError::CircuitBroken);
        }
        if self.state.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    /// Returns `false` if the role was already held.
    pub fn grant_verifier(&mut self, identity: &Identity) -> bool {
        self.state.verifiers.insert(identity.clone())
    }

    /// Returns `false` if the role was not held.
    pub fn revoke_verifier(&mut self, identity: &Identity) -> bool {
        self.state.verifiers.remove(identity)
    }

    pub fn grant_admin(&mut self, identity: &Identity) -> bool {
        self.state.admins.insert(identity.clone())
    }

    /// Removing the only remaining admin is refused.
    pub fn revoke_admin(&mut self, identity: &Identity) -> Result<bool, LedgerError> {
        if !self.state.admins.contains(identity) {
            return Ok(false);
        }
        if self.state.admins.len() == 1 {
            return Err(LedgerError::LastAdmin(identity.clone()));
        }
        Ok(self.state.admins.remove(identity))
    }

    /// Returns the previous value.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        std::mem::replace(&mut self.state.paused, paused)
    }

    /// Returns the previous value.
    pub fn set_circuit_breaker(&mut self, engaged: bool) -> bool {
        std::mem::replace(&mut self.state.circuit_broken, engaged)
    }

    /// Bind a new registry, returning the old reference.
    pub fn set_registry(&mut self, registry: RegistryRef) -> RegistryRef {
        std::mem::replace(&mut self.state.registry, registry)
    }

    /// Replace the consensus parameters after validating them, returning the
    /// old set.
    pub fn set_params(&mut self, params: ConsensusParams) -> Result<ConsensusParams, LedgerError> {
        params.validate()?;
        Ok(std::mem::replace(&mut self.state.params, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::parse(s).unwrap()
    }

    fn controller() -> AccessController {
        AccessController::new(
            [id("root")],
            RegistryRef::parse("main").unwrap(),
            ConsensusParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn genesis_requires_an_admin() {
        let err = AccessController::new(
            Vec::<Identity>::new(),
            RegistryRef::parse("main").unwrap(),
            ConsensusParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::NoInitialAdmins));
    }

    #[test]
    fn circuit_breaker_reported_before_pause() {
        let mut ac = controller();
        assert!(ac.check_writable().is_ok());
        ac.set_paused(true);
        assert!(matches!(ac.check_writable(), Err(LedgerError::Paused)));
        ac.set_circuit_breaker(true);
        assert!(matches!(ac.check_writable(), Err(LedgerError::CircuitBroken)));
        ac.set_paused(false);
        assert!(matches!(ac.check_writable(), Err(LedgerError::CircuitBroken)));
    }

    #[test]
    fn grant_and_revoke_report_changes() {
        let mut ac = controller();
        assert!(ac.grant_verifier(&id("v")));
        assert!(!ac.grant_verifier(&id("v")));
        assert!(ac.has_role(&id("v"), Role::Verifier));
        assert!(ac.revoke_verifier(&id("v")));
        assert!(!ac.revoke_verifier(&id("v")));
    }

    #[test]
    fn last_admin_cannot_be_removed() {
        let mut ac = controller();
        assert!(matches!(
            ac.revoke_admin(&id("root")),
            Err(LedgerError::LastAdmin(_))
        ));
        ac.grant_admin(&id("second"));
        assert!(ac.revoke_admin(&id("root")).unwrap());
        assert_eq!(ac.admin_count(), 1);
        assert!(!ac.revoke_admin(&id("root")).unwrap());
    }

    #[test]
    fn invalid_params_leave_state_untouched() {
        let mut ac = controller();
        let bad = ConsensusParams {
            min_verifications: 1,
            ..ConsensusParams::default()
        };
        assert!(ac.set_params(bad).is_err());
        assert_eq!(*ac.params(), ConsensusParams::default());
    }
}
