//! Abstract storage traits for the vouch ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The ledger depends only on the traits and stores opaque,
//! already-encoded values; encoding is the ledger's concern.
//!
//! Reads go through the per-concern traits. Writes are grouped into a
//! [`WriteSet`] and applied with [`LedgerStore::commit`], which must apply
//! every operation or none of them.

pub mod error;
pub mod keys;
pub mod meta;
pub mod reputation;
pub mod verification;
pub mod write_set;

pub use error::StoreError;
pub use meta::MetaStore;
pub use reputation::ReputationStore;
pub use verification::VerificationStore;
pub use write_set::{WriteOp, WriteSet};

/// A complete ledger backend: every read trait plus an atomic commit.
pub trait LedgerStore: VerificationStore + ReputationStore + MetaStore + Send {
    /// Apply all operations of `set` in a single transaction.
    ///
    /// On error nothing from `set` may be visible to later reads.
    fn commit(&self, set: WriteSet) -> Result<(), StoreError>;
}
