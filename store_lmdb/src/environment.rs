//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use vouch_store::{LedgerStore, StoreError, WriteSet};

use crate::migration::Migrator;
use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Named databases opened in every environment.
pub(crate) const DATABASE_NAMES: &[&str] = &[
    "records",
    "attestation_index",
    "verifier_index",
    "verifier_reputation",
    "attestation_reputation",
    "meta",
];

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) attestation_index_db: Database<Bytes, Bytes>,
    pub(crate) verifier_index_db: Database<Bytes, Bytes>,
    pub(crate) verifier_reputation_db: Database<Bytes, Bytes>,
    pub(crate) attestation_reputation_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// Creates the directory if needed, opens every named database and runs
    /// schema migrations before returning.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // never concurrently with another handle to the same files.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(DATABASE_NAMES.len() as u32)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let records_db = env.create_database(&mut wtxn, Some("records"))?;
        let attestation_index_db = env.create_database(&mut wtxn, Some("attestation_index"))?;
        let verifier_index_db = env.create_database(&mut wtxn, Some("verifier_index"))?;
        let verifier_reputation_db = env.create_database(&mut wtxn, Some("verifier_reputation"))?;
        let attestation_reputation_db =
            env.create_database(&mut wtxn, Some("attestation_reputation"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let this = Self {
            env: Arc::new(env),
            records_db,
            attestation_index_db,
            verifier_index_db,
            verifier_reputation_db,
            attestation_reputation_db,
            meta_db,
        };

        Migrator::run(&this)?;
        tracing::debug!(path = %path.display(), "opened LMDB environment");
        Ok(this)
    }

    /// The underlying heed environment.
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Begin a write batch. Dropping it without committing aborts it.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}

impl LedgerStore for LmdbEnvironment {
    fn commit(&self, set: WriteSet) -> Result<(), StoreError> {
        let op_count = set.len();
        let mut batch = self.write_batch()?;
        for op in set.into_ops() {
            batch.apply(op)?;
        }
        batch.commit()?;
        tracing::trace!(ops = op_count, "committed write set");
        Ok(())
    }
}
