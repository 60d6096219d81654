//! Nullable infrastructure for deterministic testing.
//!
//! The ledger reaches the outside world through three seams: the clock, the
//! attestation registry and the store. This crate provides test-friendly
//! implementations of each that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Every nullable is cheaply cloneable and clones share state, so a test can
//! hand one clone to a [`vouch_ledger::Ledger`] and drive it with another.

pub mod clock;
pub mod registry;
pub mod store;

pub use clock::NullClock;
pub use registry::NullRegistry;
pub use store::NullStore;
