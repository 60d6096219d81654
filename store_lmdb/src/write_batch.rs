//! Write batching: groups multiple store operations into a single LMDB write
//! transaction so that one ledger operation commits atomically.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put_record(&id, &record_bytes)?;
//! batch.index_by_attestation(&attestation, seq, &id)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;

use vouch_store::keys::index_key;
use vouch_store::{StoreError, WriteOp};
use vouch_types::{AttestationId, Identity, VerificationId};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// A write batch that groups multiple store operations into a single LMDB
/// write transaction.
pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    /// Begin a new write batch.
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    /// Apply one [`WriteOp`] inside this batch.
    pub fn apply(&mut self, op: WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::PutRecord { id, data } => self.put_record(&id, &data),
            WriteOp::IndexByAttestation {
                attestation,
                seq,
                id,
            } => self.index_by_attestation(&attestation, seq, &id),
            WriteOp::IndexByVerifier { verifier, seq, id } => {
                self.index_by_verifier(&verifier, seq, &id)
            }
            WriteOp::PutVerifierReputation { verifier, data } => {
                self.put_verifier_reputation(&verifier, &data)
            }
            WriteOp::PutAttestationReputation { attestation, data } => {
                self.put_attestation_reputation(&attestation, &data)
            }
            WriteOp::PutMeta { key, data } => self.put_meta(&key, &data),
        }
    }

    // ── Verification records ────────────────────────────────────────────

    pub fn put_record(&mut self, id: &VerificationId, data: &[u8]) -> Result<(), StoreError> {
        self.env
            .records_db
            .put(&mut self.txn, id.as_bytes(), data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn index_by_attestation(
        &mut self,
        attestation: &AttestationId,
        seq: u64,
        id: &VerificationId,
    ) -> Result<(), StoreError> {
        let key = index_key(attestation.as_bytes(), seq);
        self.env
            .attestation_index_db
            .put(&mut self.txn, &key, id.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn index_by_verifier(
        &mut self,
        verifier: &Identity,
        seq: u64,
        id: &VerificationId,
    ) -> Result<(), StoreError> {
        let key = index_key(verifier.as_str().as_bytes(), seq);
        self.env
            .verifier_index_db
            .put(&mut self.txn, &key, id.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Reputation ──────────────────────────────────────────────────────

    pub fn put_verifier_reputation(
        &mut self,
        verifier: &Identity,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.env
            .verifier_reputation_db
            .put(&mut self.txn, verifier.as_str().as_bytes(), data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn put_attestation_reputation(
        &mut self,
        attestation: &AttestationId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.env
            .attestation_reputation_db
            .put(&mut self.txn, attestation.as_bytes(), data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Meta ────────────────────────────────────────────────────────────

    pub fn put_meta(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.env
            .meta_db
            .put(&mut self.txn, key.as_bytes(), data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Commit all operations in this batch atomically.
    pub fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
