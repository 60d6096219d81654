//! Database schema migration engine.
//!
//! Tracks a monotonically increasing schema version in the meta database and
//! runs sequential migration functions to bring an older database up to date.

use vouch_store::keys::META_SCHEMA_VERSION;
use vouch_store::MetaStore;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Runs database migrations to bring the schema up to date.
pub struct Migrator;

impl Migrator {
    /// Check the stored schema version and run any needed migrations.
    ///
    /// - Version 0 means a fresh database (no version stored yet).
    /// - If the stored version matches `CURRENT_SCHEMA_VERSION`, this is a no-op.
    /// - If the stored version is *higher* than what this code supports, the
    ///   database was written by a newer build and we refuse to open it.
    pub fn run(env: &LmdbEnvironment) -> Result<(), LmdbError> {
        let current = env
            .get_schema_version()
            .map_err(|e| LmdbError::Schema(e.to_string()))?;

        if current == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = current, "database schema is up to date");
            return Ok(());
        }

        if current > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::Schema(format!(
                "database schema version {} is newer than supported version {}",
                current, CURRENT_SCHEMA_VERSION
            )));
        }

        for version in current..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "running migration");
            run_migration(version, version + 1)?;
        }

        let mut wtxn = env.env().write_txn()?;
        env.meta_db.put(
            &mut wtxn,
            META_SCHEMA_VERSION.as_bytes(),
            &CURRENT_SCHEMA_VERSION.to_le_bytes(),
        )?;
        wtxn.commit()?;

        tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
        Ok(())
    }
}

fn run_migration(from: u32, to: u32) -> Result<(), LmdbError> {
    match (from, to) {
        // Initial schema: nothing to migrate from a blank slate.
        (0, 1) => Ok(()),
        _ => Err(LmdbError::Schema(format!(
            "unknown migration: {} -> {}",
            from, to
        ))),
    }
}
