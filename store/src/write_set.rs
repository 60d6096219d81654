//! Atomic groups of store writes.
//!
//! The ledger stages every change of one operation into a [`WriteSet`] and
//! hands it to [`LedgerStore::commit`](crate::LedgerStore::commit). Backends
//! apply the operations in order inside one transaction.

use vouch_types::{AttestationId, Identity, VerificationId};

/// A single store mutation with an already-encoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite a verification record.
    PutRecord { id: VerificationId, data: Vec<u8> },
    /// Append `id` as the `seq`-th entry of the attestation's index.
    IndexByAttestation {
        attestation: AttestationId,
        seq: u64,
        id: VerificationId,
    },
    /// Append `id` as the `seq`-th entry of the verifier's index.
    IndexByVerifier {
        verifier: Identity,
        seq: u64,
        id: VerificationId,
    },
    PutVerifierReputation { verifier: Identity, data: Vec<u8> },
    PutAttestationReputation {
        attestation: AttestationId,
        data: Vec<u8>,
    },
    PutMeta { key: String, data: Vec<u8> },
}

/// An ordered group of writes that must be applied all-or-nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSet {
    ops: Vec<WriteOp>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn put_meta(&mut self, key: &str, data: Vec<u8>) {
        self.ops.push(WriteOp::PutMeta {
            key: key.to_string(),
            data,
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

impl Extend<WriteOp> for WriteSet {
    fn extend<T: IntoIterator<Item = WriteOp>>(&mut self, iter: T) {
        self.ops.extend(iter);
    }
}
