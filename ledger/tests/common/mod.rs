#![allow(dead_code)]

use vouch_ledger::{Ledger, LedgerConfig};
use vouch_nullables::{NullClock, NullRegistry, NullStore};
use vouch_types::{AttestationId, Identity};

pub const REGISTRY: &str = "main";

pub fn who(s: &str) -> Identity {
    Identity::parse(s).unwrap()
}

pub fn att(s: &str) -> AttestationId {
    AttestationId::parse(s).unwrap()
}

pub fn config() -> LedgerConfig {
    LedgerConfig {
        registry_reference: REGISTRY.to_string(),
        ..LedgerConfig::with_admin("admin")
    }
}

/// A ledger over nullables, plus handles to drive them.
pub struct Harness {
    pub ledger: Ledger,
    pub store: NullStore,
    pub registry: NullRegistry,
    pub clock: NullClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let store = NullStore::new();
        let registry = NullRegistry::new();
        let clock = NullClock::new(1_700_000_000);
        let ledger = Ledger::open(
            config,
            Box::new(store.clone()),
            Box::new(registry.clone()),
            Box::new(clock.clone()),
        )
        .expect("open ledger");
        Self {
            ledger,
            store,
            registry,
            clock,
        }
    }

    /// Reopen a ledger over the same store, registry and clock.
    pub fn reopen(&self, config: LedgerConfig) -> Ledger {
        Ledger::open(
            config,
            Box::new(self.store.clone()),
            Box::new(self.registry.clone()),
            Box::new(self.clock.clone()),
        )
        .expect("reopen ledger")
    }

    pub fn admin(&self) -> Identity {
        who("admin")
    }

    /// Grant the verifier role to `name`.
    pub fn verifier(&mut self, name: &str) -> Identity {
        let v = who(name);
        self.ledger.grant_verifier(&who("admin"), &v).unwrap();
        v
    }

    pub fn valid(&self, attestation: &str) {
        self.registry.set_valid(REGISTRY, attestation, true);
    }

    pub fn invalid(&self, attestation: &str) {
        self.registry.set_valid(REGISTRY, attestation, false);
    }
}
