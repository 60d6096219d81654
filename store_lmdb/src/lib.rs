//! LMDB storage backend for the vouch ledger.
//!
//! Implements all storage traits from `vouch-store` using the `heed` LMDB
//! bindings. Each logical store maps to one named LMDB database within a
//! single environment; [`LmdbEnvironment::commit`] applies a whole
//! [`WriteSet`](vouch_store::WriteSet) in one write transaction.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod reputation;
pub mod verification;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use write_batch::WriteBatch;
