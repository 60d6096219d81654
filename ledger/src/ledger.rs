//! The ledger facade.
//!
//! [`Ledger`] owns the access controller, the record log and the reputation
//! engine, and is the only way to change them. Every write authorizes the
//! caller, stages its changes, commits them to the store in one
//! transaction and only then publishes them in memory. A rejected or failed
//! call leaves the ledger exactly as it was.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use vouch_store::keys::{META_ACCESS_STATE, META_GLOBAL_STATS};
use vouch_store::{LedgerStore, StoreError, WriteOp, WriteSet};
use vouch_types::{
    AttestationId, ConsensusParams, Identity, RegistryRef, Role, VerificationId,
};

use crate::access::{AccessController, AccessState, SafetyState};
use crate::batch::{
    check_confidence, BatchOutcome, BatchVerifyRequest, StagedVerifications, VerificationStager,
};
use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::consensus::ConsensusStatus;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::pagination::Page;
use crate::record::{RecordLog, VerificationRecord};
use crate::registry::AttestationRegistry;
use crate::reputation::{AttestationReputation, ReputationEngine, VerifierReputation};
use crate::stats::{GlobalCounters, GlobalStatistics};

/// Full, comparable copy of the ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub access: AccessState,
    pub counters: GlobalCounters,
    /// Ordered by global sequence.
    pub records: Vec<VerificationRecord>,
    /// Ordered by identity.
    pub verifiers: Vec<VerifierReputation>,
    /// Ordered by attestation id.
    pub attestations: Vec<AttestationReputation>,
}

pub struct Ledger {
    store: Box<dyn LedgerStore>,
    registry: Box<dyn AttestationRegistry>,
    clock: Box<dyn Clock>,
    access: AccessController,
    records: RecordLog,
    reputation: ReputationEngine,
    counters: GlobalCounters,
    reset_on_regrant: bool,
    max_batch_size: usize,
    events: Vec<LedgerEvent>,
}

impl Ledger {
    /// Open a ledger over `store`.
    ///
    /// An empty store is initialized from `config` (genesis). Otherwise the
    /// persisted roles, parameters, records and reputations are loaded and
    /// the genesis fields of `config` are ignored.
    pub fn open(
        config: LedgerConfig,
        store: Box<dyn LedgerStore>,
        registry: Box<dyn AttestationRegistry>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let persisted = store.get_meta(META_ACCESS_STATE)?;
        let access = match &persisted {
            Some(bytes) => AccessController::from_state(decode(bytes)?),
            None => {
                config.validate()?;
                AccessController::new(config.admins()?, config.registry()?, config.params()?)?
            }
        };

        let mut ledger = Self {
            store,
            registry,
            clock,
            access,
            records: RecordLog::new(),
            reputation: ReputationEngine::new(),
            counters: GlobalCounters::default(),
            reset_on_regrant: config.reset_on_regrant,
            max_batch_size: config.max_batch_size,
            events: Vec::new(),
        };

        if persisted.is_some() {
            ledger.load()?;
            info!(
                records = ledger.records.len(),
                verifiers = ledger.reputation.verifiers().count(),
                attestations = ledger.reputation.attestation_count(),
                "ledger loaded"
            );
        } else {
            let mut writes = WriteSet::new();
            writes.push(access_write(&ledger.access)?);
            writes.push(counters_write(&ledger.counters)?);
            ledger.commit(writes)?;
            info!(
                admins = ledger.access.admin_count(),
                registry = %ledger.access.registry(),
                "ledger initialized from genesis config"
            );
        }
        Ok(ledger)
    }

    fn load(&mut self) -> Result<(), LedgerError> {
        if let Some(bytes) = self.store.get_meta(META_GLOBAL_STATS)? {
            self.counters = decode(&bytes)?;
        }

        for (_, bytes) in self.store.iter_verifier_reputations()? {
            self.reputation.put_verifier(decode(&bytes)?);
        }
        for (_, bytes) in self.store.iter_attestation_reputations()? {
            self.reputation.put_attestation(decode(&bytes)?);
        }

        let mut records = HashMap::new();
        for (id, bytes) in self.store.iter_records()? {
            let record: VerificationRecord = decode(&bytes)?;
            if record.id != id {
                return Err(corrupt(format!("record stored under {id} claims id {}", record.id)));
            }
            records.insert(id, record);
        }

        let mut by_attestation = HashMap::new();
        for reputation in self.reputation.attestations() {
            let ids = self.store.attestation_index(&reputation.attestation_id)?;
            check_index(&records, &ids)?;
            by_attestation.insert(reputation.attestation_id.clone(), ids);
        }
        let mut by_verifier = HashMap::new();
        for reputation in self.reputation.verifiers() {
            let ids = self.store.verifier_index(&reputation.verifier)?;
            check_index(&records, &ids)?;
            by_verifier.insert(reputation.verifier.clone(), ids);
        }

        if records.len() as u64 != self.counters.total_verifications {
            warn!(
                stored = records.len(),
                counted = self.counters.total_verifications,
                "record count disagrees with the verification counter"
            );
        }
        self.records.restore(records, by_attestation, by_verifier);
        Ok(())
    }

    // ── Verification writes ─────────────────────────────────────────────

    /// Record one verification of `attestation` by `caller`.
    ///
    /// The registry's current answer is captured as the record's
    /// `is_valid` and drives the reputation update: agreeing with a valid
    /// attestation counts as correct, anything else as incorrect.
    pub fn record_verification(
        &mut self,
        caller: &Identity,
        attestation: &AttestationId,
        confidence: u32,
        notes: String,
    ) -> Result<VerificationRecord, LedgerError> {
        let verifier = self.authorize_verifier(caller)?;
        let confidence = check_confidence(confidence).inspect_err(|e| {
            debug!(verifier = %caller, error = %e, "verification rejected");
        })?;
        let status = self
            .registry
            .attestation_status(self.access.registry(), attestation)?;

        let timestamp = self.clock.now();
        let mut stager = VerificationStager::new(
            &self.records,
            &self.reputation,
            self.access.params(),
            verifier,
            timestamp,
            self.counters.total_verifications,
        );
        let record = stager
            .stage(attestation, confidence, notes, status.is_valid)
            .clone();
        let (writes, staged) = stager.finish()?;
        self.commit_verifications(writes, staged)?;

        info!(
            verifier = %caller,
            attestation = %attestation,
            id = %record.id,
            is_valid = record.is_valid,
            confidence = record.confidence,
            "verification recorded"
        );
        Ok(record)
    }

    /// Record one verification per element of `request`, all or nothing.
    ///
    /// Every confidence and every registry answer is checked before any
    /// state is touched. An empty request succeeds with empty results.
    pub fn batch_verify(
        &mut self,
        caller: &Identity,
        request: &BatchVerifyRequest,
    ) -> Result<BatchOutcome, LedgerError> {
        let verifier = self.authorize_verifier(caller)?;
        request.validate(self.max_batch_size).inspect_err(|e| {
            debug!(verifier = %caller, error = %e, "batch rejected");
        })?;

        let statuses = request
            .attestation_ids
            .iter()
            .map(|a| {
                self.registry
                    .attestation_status(self.access.registry(), a)
                    .map(|s| s.is_valid)
            })
            .collect::<Result<Vec<bool>, _>>()?;

        if request.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let timestamp = self.clock.now();
        let mut stager = VerificationStager::new(
            &self.records,
            &self.reputation,
            self.access.params(),
            verifier,
            timestamp,
            self.counters.total_verifications,
        );
        let mut outcome = BatchOutcome::default();
        for (i, attestation) in request.attestation_ids.iter().enumerate() {
            // Range checked by `validate`.
            let confidence = check_confidence(request.confidences[i])?;
            let record = stager.stage(attestation, confidence, request.notes[i].clone(), statuses[i]);
            outcome.verification_ids.push(record.id);
            outcome.results.push(record.is_valid);
        }
        let (writes, staged) = stager.finish()?;
        self.commit_verifications(writes, staged)?;

        info!(
            verifier = %caller,
            count = outcome.verification_ids.len(),
            "batch verification recorded"
        );
        Ok(outcome)
    }

    /// Replace the notes of a record. Allowed for admins and for the
    /// original verifier while it still holds an active verifier role.
    pub fn update_notes(
        &mut self,
        caller: &Identity,
        id: &VerificationId,
        notes: String,
    ) -> Result<(), LedgerError> {
        if self.access.is_admin(caller) {
            self.access.check_writable()?;
        } else {
            self.authorize_verifier(caller)?;
        }
        let record = self
            .records
            .get(id)
            .ok_or(LedgerError::VerificationNotFound(*id))?;
        if &record.verifier != caller && !self.access.is_admin(caller) {
            return Err(LedgerError::NotRecordOwner {
                caller: caller.clone(),
                id: *id,
            });
        }

        let mut updated = record.clone();
        updated.notes = notes;
        self.commit_record(updated)?;
        self.events.push(LedgerEvent::NotesUpdated {
            id: *id,
            by: caller.clone(),
        });
        info!(id = %id, by = %caller, "verification notes updated");
        Ok(())
    }

    /// Admin override marking a record as revoked. The captured `is_valid`
    /// and all reputation tallies stay as they are.
    pub fn revoke_verification(
        &mut self,
        caller: &Identity,
        id: &VerificationId,
    ) -> Result<(), LedgerError> {
        self.access.check_writable()?;
        self.access.require_admin(caller)?;
        let record = self
            .records
            .get(id)
            .ok_or(LedgerError::VerificationNotFound(*id))?;
        if record.revoked {
            return Err(LedgerError::AlreadyRevoked(*id));
        }

        let mut updated = record.clone();
        updated.revoked = true;
        self.commit_record(updated)?;
        self.events.push(LedgerEvent::VerificationRevoked {
            id: *id,
            by: caller.clone(),
        });
        warn!(id = %id, by = %caller, "verification revoked by admin");
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn verification(&self, id: &VerificationId) -> Result<&VerificationRecord, LedgerError> {
        self.records
            .get(id)
            .ok_or(LedgerError::VerificationNotFound(*id))
    }

    /// Records of `attestation`, oldest first. `limit == 0` returns all
    /// records from `offset`.
    pub fn verifications_for_attestation(
        &self,
        attestation: &AttestationId,
        offset: usize,
        limit: usize,
    ) -> Page<VerificationRecord> {
        self.records.for_attestation(attestation, offset, limit)
    }

    /// Records submitted by `verifier`, oldest first.
    pub fn verifier_history(
        &self,
        verifier: &Identity,
        offset: usize,
        limit: usize,
    ) -> Page<VerificationRecord> {
        self.records.for_verifier(verifier, offset, limit)
    }

    pub fn verifier_reputation(
        &self,
        verifier: &Identity,
    ) -> Result<&VerifierReputation, LedgerError> {
        self.reputation
            .verifier(verifier)
            .ok_or_else(|| LedgerError::VerifierNotFound(verifier.clone()))
    }

    pub fn attestation_reputation(
        &self,
        attestation: &AttestationId,
    ) -> Result<&AttestationReputation, LedgerError> {
        self.reputation
            .attestation(attestation)
            .ok_or_else(|| LedgerError::AttestationNotFound(attestation.clone()))
    }

    /// Sticky consensus flag plus the live balance. Never fails.
    pub fn consensus_status(&self, attestation: &AttestationId) -> ConsensusStatus {
        self.reputation
            .attestation(attestation)
            .map_or(ConsensusStatus::NONE, ConsensusStatus::of)
    }

    pub fn global_statistics(&self) -> GlobalStatistics {
        GlobalStatistics {
            total_verifications: self.counters.total_verifications,
            total_verifier_grants: self.counters.total_verifier_grants,
            active_verifiers: self.reputation.active_verifier_count() as u64,
            attestations_with_reputation: self.reputation.attestation_count() as u64,
            attestations_with_consensus: self.reputation.consensus_count() as u64,
        }
    }

    pub fn consensus_parameters(&self) -> ConsensusParams {
        *self.access.params()
    }

    pub fn safety_state(&self) -> SafetyState {
        self.access.safety_state()
    }

    pub fn has_role(&self, identity: &Identity, role: Role) -> bool {
        self.access.has_role(identity, role)
    }

    /// Hand all buffered events to the caller, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut records: Vec<VerificationRecord> = self.records.iter().cloned().collect();
        records.sort_by_key(|r| r.sequence);
        let mut verifiers: Vec<VerifierReputation> = self.reputation.verifiers().cloned().collect();
        verifiers.sort_by(|a, b| a.verifier.cmp(&b.verifier));
        let mut attestations: Vec<AttestationReputation> =
            self.reputation.attestations().cloned().collect();
        attestations.sort_by(|a, b| a.attestation_id.cmp(&b.attestation_id));
        LedgerSnapshot {
            access: self.access.state().clone(),
            counters: self.counters,
            records,
            verifiers,
            attestations,
        }
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Grant the verifier role. Returns `false` if it was already held.
    ///
    /// A new grant creates an active reputation at the initial score. For
    /// a returning verifier the reputation is reset the same way unless
    /// `reset_on_regrant` is off, in which case it is only reactivated.
    pub fn grant_verifier(
        &mut self,
        caller: &Identity,
        verifier: &Identity,
    ) -> Result<bool, LedgerError> {
        self.access.require_admin(caller)?;
        if self.access.is_verifier(verifier) {
            debug!(verifier = %verifier, "verifier role already held");
            return Ok(false);
        }

        let mut access = self.access.clone();
        access.grant_verifier(verifier);
        let (reputation, reset) = match self.reputation.verifier(verifier) {
            Some(prior) if !self.reset_on_regrant => {
                let mut kept = prior.clone();
                kept.is_active = true;
                (kept, false)
            }
            _ => (VerifierReputation::fresh(verifier.clone()), true),
        };
        let mut counters = self.counters;
        counters.total_verifier_grants += 1;

        let mut writes = WriteSet::new();
        writes.push(access_write(&access)?);
        writes.push(verifier_write(&reputation)?);
        writes.push(counters_write(&counters)?);
        self.commit(writes)?;

        self.access = access;
        self.reputation.put_verifier(reputation);
        self.counters = counters;
        self.events.push(LedgerEvent::VerifierGranted {
            verifier: verifier.clone(),
            by: caller.clone(),
            reset,
        });
        info!(verifier = %verifier, by = %caller, reset, "verifier role granted");
        Ok(true)
    }

    /// Revoke the verifier role and deactivate the reputation. Records stay.
    /// Returns `false` if the role was not held.
    pub fn revoke_verifier(
        &mut self,
        caller: &Identity,
        verifier: &Identity,
    ) -> Result<bool, LedgerError> {
        self.access.require_admin(caller)?;
        if !self.access.is_verifier(verifier) {
            debug!(verifier = %verifier, "verifier role not held");
            return Ok(false);
        }

        let mut access = self.access.clone();
        access.revoke_verifier(verifier);
        let reputation = self.reputation.verifier(verifier).cloned().map(|mut r| {
            r.is_active = false;
            r
        });

        let mut writes = WriteSet::new();
        writes.push(access_write(&access)?);
        if let Some(reputation) = &reputation {
            writes.push(verifier_write(reputation)?);
        }
        self.commit(writes)?;

        self.access = access;
        if let Some(reputation) = reputation {
            self.reputation.put_verifier(reputation);
        }
        self.events.push(LedgerEvent::VerifierRevoked {
            verifier: verifier.clone(),
            by: caller.clone(),
        });
        info!(verifier = %verifier, by = %caller, "verifier role revoked");
        Ok(true)
    }

    pub fn grant_admin(&mut self, caller: &Identity, admin: &Identity) -> Result<bool, LedgerError> {
        self.access.require_admin(caller)?;
        let mut access = self.access.clone();
        if !access.grant_admin(admin) {
            return Ok(false);
        }
        self.commit_access(access)?;
        self.events.push(LedgerEvent::AdminGranted {
            admin: admin.clone(),
            by: caller.clone(),
        });
        info!(admin = %admin, by = %caller, "admin role granted");
        Ok(true)
    }

    /// Revoke an admin. Refuses to remove the last one.
    pub fn revoke_admin(&mut self, caller: &Identity, admin: &Identity) -> Result<bool, LedgerError> {
        self.access.require_admin(caller)?;
        let mut access = self.access.clone();
        if !access.revoke_admin(admin)? {
            return Ok(false);
        }
        self.commit_access(access)?;
        self.events.push(LedgerEvent::AdminRevoked {
            admin: admin.clone(),
            by: caller.clone(),
        });
        info!(admin = %admin, by = %caller, "admin role revoked");
        Ok(true)
    }

    pub fn set_paused(&mut self, caller: &Identity, paused: bool) -> Result<(), LedgerError> {
        self.access.require_admin(caller)?;
        let mut access = self.access.clone();
        access.set_paused(paused);
        self.commit_access(access)?;
        self.events.push(LedgerEvent::PausedChanged {
            paused,
            by: caller.clone(),
        });
        info!(paused, by = %caller, "pause state set");
        Ok(())
    }

    pub fn set_circuit_breaker(&mut self, caller: &Identity, engaged: bool) -> Result<(), LedgerError> {
        self.access.require_admin(caller)?;
        let mut access = self.access.clone();
        access.set_circuit_breaker(engaged);
        self.commit_access(access)?;
        self.events.push(LedgerEvent::CircuitBreakerChanged {
            engaged,
            by: caller.clone(),
        });
        warn!(engaged, by = %caller, "circuit breaker set");
        Ok(())
    }

    /// Bind a different attestation registry. Returns the previous
    /// reference.
    pub fn update_registry(
        &mut self,
        caller: &Identity,
        registry: RegistryRef,
    ) -> Result<RegistryRef, LedgerError> {
        self.access.require_admin(caller)?;
        let mut access = self.access.clone();
        let old = access.set_registry(registry.clone());
        self.commit_access(access)?;
        self.events.push(LedgerEvent::RegistryUpdated {
            old: old.clone(),
            new: registry.clone(),
            by: caller.clone(),
        });
        info!(old = %old, new = %registry, by = %caller, "registry reference updated");
        Ok(old)
    }

    /// Change the consensus minimum and threshold. The reserved decay rate
    /// is kept. Already latched consensus flags are not revisited.
    pub fn update_consensus_parameters(
        &mut self,
        caller: &Identity,
        min_verifications: u32,
        threshold_percent: u32,
    ) -> Result<ConsensusParams, LedgerError> {
        self.access.require_admin(caller)?;
        let params = ConsensusParams::new(
            min_verifications,
            threshold_percent,
            self.access.params().reputation_decay_rate,
        )?;
        let mut access = self.access.clone();
        let old = access.set_params(params)?;
        self.commit_access(access)?;
        self.events.push(LedgerEvent::ParametersUpdated {
            old,
            new: params,
            by: caller.clone(),
        });
        info!(
            min_verifications,
            threshold_percent,
            by = %caller,
            "consensus parameters updated"
        );
        Ok(old)
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Write gates in order: circuit breaker, pause, role, active flag.
    fn authorize_verifier(&self, caller: &Identity) -> Result<VerifierReputation, LedgerError> {
        let result = self
            .access
            .check_writable()
            .and_then(|()| self.access.require_verifier(caller))
            .and_then(|()| {
                self.reputation
                    .verifier(caller)
                    .filter(|r| r.is_active)
                    .cloned()
                    .ok_or_else(|| LedgerError::InactiveVerifier(caller.clone()))
            });
        if let Err(e) = &result {
            debug!(verifier = %caller, error = %e, "verification rejected");
        }
        result
    }

    fn commit(&self, writes: WriteSet) -> Result<(), LedgerError> {
        self.store.commit(writes).map_err(|e| {
            warn!(error = %e, "store commit failed, change discarded");
            LedgerError::Storage(e)
        })
    }

    fn commit_access(&mut self, access: AccessController) -> Result<(), LedgerError> {
        let mut writes = WriteSet::new();
        writes.push(access_write(&access)?);
        self.commit(writes)?;
        self.access = access;
        Ok(())
    }

    fn commit_record(&mut self, record: VerificationRecord) -> Result<(), LedgerError> {
        let mut writes = WriteSet::new();
        writes.push(WriteOp::PutRecord {
            id: record.id,
            data: bincode::serialize(&record)?,
        });
        self.commit(writes)?;
        self.records.replace(record);
        Ok(())
    }

    fn commit_verifications(
        &mut self,
        mut writes: WriteSet,
        staged: StagedVerifications,
    ) -> Result<(), LedgerError> {
        let mut counters = self.counters;
        counters.total_verifications += staged.records.len() as u64;
        writes.push(counters_write(&counters)?);
        self.commit(writes)?;

        for record in staged.records {
            self.records.append(record);
        }
        self.reputation.put_verifier(staged.verifier);
        for reputation in staged.attestations {
            self.reputation.put_attestation(reputation);
        }
        self.counters = counters;
        self.events.extend(staged.events);
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, LedgerError> {
    bincode::deserialize(bytes).map_err(|e| corrupt(e.to_string()))
}

fn corrupt(msg: String) -> LedgerError {
    LedgerError::Storage(StoreError::Corruption(msg))
}

fn check_index(
    records: &HashMap<VerificationId, VerificationRecord>,
    ids: &[VerificationId],
) -> Result<(), LedgerError> {
    match ids.iter().find(|id| !records.contains_key(id)) {
        Some(missing) => Err(corrupt(format!("index references missing record {missing}"))),
        None => Ok(()),
    }
}

fn access_write(access: &AccessController) -> Result<WriteOp, LedgerError> {
    Ok(WriteOp::PutMeta {
        key: META_ACCESS_STATE.to_string(),
        data: bincode::serialize(access.state())?,
    })
}

fn counters_write(counters: &GlobalCounters) -> Result<WriteOp, LedgerError> {
    Ok(WriteOp::PutMeta {
        key: META_GLOBAL_STATS.to_string(),
        data: bincode::serialize(counters)?,
    })
}

fn verifier_write(reputation: &VerifierReputation) -> Result<WriteOp, LedgerError> {
    Ok(WriteOp::PutVerifierReputation {
        verifier: reputation.verifier.clone(),
        data: bincode::serialize(reputation)?,
    })
}
