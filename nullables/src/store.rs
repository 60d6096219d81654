//! Nullable store, thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vouch_store::keys::{index_key, index_prefix};
use vouch_store::{
    LedgerStore, MetaStore, ReputationStore, StoreError, VerificationStore, WriteOp, WriteSet,
};
use vouch_types::{AttestationId, Identity, VerificationId};

#[derive(Clone, Default)]
struct Tables {
    records: BTreeMap<VerificationId, Vec<u8>>,
    attestation_index: BTreeMap<Vec<u8>, VerificationId>,
    verifier_index: BTreeMap<Vec<u8>, VerificationId>,
    verifier_reputation: BTreeMap<Identity, Vec<u8>>,
    attestation_reputation: BTreeMap<AttestationId, Vec<u8>>,
    meta: HashMap<String, Vec<u8>>,
}

impl Tables {
    fn apply(&mut self, op: WriteOp) {
        match op {
            WriteOp::PutRecord { id, data } => {
                self.records.insert(id, data);
            }
            WriteOp::IndexByAttestation {
                attestation,
                seq,
                id,
            } => {
                self.attestation_index
                    .insert(index_key(attestation.as_bytes(), seq), id);
            }
            WriteOp::IndexByVerifier { verifier, seq, id } => {
                self.verifier_index
                    .insert(index_key(verifier.as_str().as_bytes(), seq), id);
            }
            WriteOp::PutVerifierReputation { verifier, data } => {
                self.verifier_reputation.insert(verifier, data);
            }
            WriteOp::PutAttestationReputation { attestation, data } => {
                self.attestation_reputation.insert(attestation, data);
            }
            WriteOp::PutMeta { key, data } => {
                self.meta.insert(key, data);
            }
        }
    }
}

fn scan(index: &BTreeMap<Vec<u8>, VerificationId>, owner: &[u8]) -> Vec<VerificationId> {
    let prefix = index_prefix(owner);
    index
        .range(prefix.clone()..)
        .take_while(|(k, _)| k.starts_with(&prefix))
        .map(|(_, id)| *id)
        .collect()
}

/// An in-memory ledger store for testing.
///
/// Clones share the same tables, so a test can inspect or sabotage the
/// store after handing a clone to a ledger. Commits apply to a copy of the
/// tables and swap it in, so a failed commit changes nothing.
#[derive(Clone, Default)]
pub struct NullStore {
    tables: Arc<Mutex<Tables>>,
    fail_next_commit: Arc<AtomicBool>,
    commits: Arc<AtomicUsize>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`LedgerStore::commit`] fail with a backend error.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl VerificationStore for NullStore {
    fn get_record(&self, id: &VerificationId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tables.lock().unwrap().records.get(id).cloned())
    }

    fn iter_records(&self) -> Result<Vec<(VerificationId, Vec<u8>)>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .records
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn attestation_index(
        &self,
        attestation: &AttestationId,
    ) -> Result<Vec<VerificationId>, StoreError> {
        Ok(scan(
            &self.tables.lock().unwrap().attestation_index,
            attestation.as_bytes(),
        ))
    }

    fn verifier_index(&self, verifier: &Identity) -> Result<Vec<VerificationId>, StoreError> {
        Ok(scan(
            &self.tables.lock().unwrap().verifier_index,
            verifier.as_str().as_bytes(),
        ))
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.lock().unwrap().records.len() as u64)
    }
}

impl ReputationStore for NullStore {
    fn get_verifier_reputation(&self, verifier: &Identity) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .verifier_reputation
            .get(verifier)
            .cloned())
    }

    fn iter_verifier_reputations(&self) -> Result<Vec<(Identity, Vec<u8>)>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .verifier_reputation
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn get_attestation_reputation(
        &self,
        attestation: &AttestationId,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .attestation_reputation
            .get(attestation)
            .cloned())
    }

    fn iter_attestation_reputations(&self) -> Result<Vec<(AttestationId, Vec<u8>)>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .attestation_reputation
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl MetaStore for NullStore {
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tables.lock().unwrap().meta.get(key).cloned())
    }
}

impl LedgerStore for NullStore {
    fn commit(&self, set: WriteSet) -> Result<(), StoreError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        let mut tables = self.tables.lock().unwrap();
        let mut staged = tables.clone();
        for op in set.into_ops() {
            staged.apply(op);
        }
        *tables = staged;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
