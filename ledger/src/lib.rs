//! Attestation verification and reputation ledger.
//!
//! The [`Ledger`] records third-party verifications of attestations owned by
//! an external [`AttestationRegistry`], scores every verifier by how often
//! its verifications agree with the registry, keeps per-attestation tallies
//! and latches a consensus flag once a qualified majority is reached.
//!
//! Components, leaf-first:
//!
//! - [`access`]: roles, pause and circuit breaker, registry binding,
//!   consensus parameters.
//! - [`record`]: verification records and their ordered indexes.
//! - [`reputation`]: verifier scores and attestation tallies.
//! - [`consensus`]: the majority rule.
//! - [`batch`]: request validation and staging shared by single and batch
//!   verification.

pub mod access;
pub mod batch;
pub mod clock;
pub mod config;
pub mod consensus;
pub mod error;
pub mod events;
pub mod ledger;
pub mod pagination;
pub mod record;
pub mod registry;
pub mod reputation;
pub mod stats;

pub use access::{AccessController, AccessState, SafetyState};
pub use batch::{BatchOutcome, BatchVerifyRequest};
pub use clock::{Clock, SystemClock};
pub use config::LedgerConfig;
pub use consensus::{ConsensusEvaluator, ConsensusStatus, ConsensusVerdict};
pub use error::{ErrorKind, LedgerError};
pub use events::LedgerEvent;
pub use ledger::{Ledger, LedgerSnapshot};
pub use pagination::Page;
pub use record::VerificationRecord;
pub use registry::{AttestationRegistry, AttestationStatus, RegistryError, StaticRegistry};
pub use reputation::{AttestationReputation, VerifierReputation};
pub use stats::GlobalStatistics;
