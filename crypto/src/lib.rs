//! Cryptographic primitives for the vouch ledger.
//!
//! - **Blake2b** for hashing
//! - Deterministic verification-record id derivation

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, derive_verification_id};
