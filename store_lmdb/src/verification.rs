//! LMDB implementation of VerificationStore.
//!
//! Records are keyed by their 32-byte id. The two indexes use the
//! length-prefixed composite keys from [`vouch_store::keys`], so listing all
//! ids for one owner is a prefix range-scan that yields insertion order.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, Env};

use vouch_store::keys::{increment_prefix, index_prefix};
use vouch_store::{StoreError, VerificationStore};
use vouch_types::{AttestationId, Identity, VerificationId};

use crate::{LmdbEnvironment, LmdbError};

/// Decode a stored 32-byte id.
pub(crate) fn decode_id(bytes: &[u8]) -> Result<VerificationId, LmdbError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corrupt(format!("verification id of {} bytes", bytes.len())))?;
    Ok(VerificationId::new(arr))
}

/// Prefix range-scan: collect all values whose key starts with `prefix`.
pub(crate) fn range_scan_values(
    db: &Database<Bytes, Bytes>,
    env: &Env,
    prefix: &[u8],
) -> Result<Vec<Vec<u8>>, LmdbError> {
    let rtxn = env.read_txn()?;
    let mut upper = prefix.to_vec();
    let upper_bound = if increment_prefix(&mut upper) {
        Bound::Excluded(upper.as_slice())
    } else {
        Bound::Unbounded
    };
    let bounds = (Bound::Included(prefix), upper_bound);
    let iter = db.range(&rtxn, &bounds)?;
    let mut results = Vec::new();
    for result in iter {
        let (_key, val) = result?;
        results.push(val.to_vec());
    }
    Ok(results)
}

fn scan_index(
    env: &LmdbEnvironment,
    db: &Database<Bytes, Bytes>,
    owner: &[u8],
) -> Result<Vec<VerificationId>, StoreError> {
    let values = range_scan_values(db, env.env(), &index_prefix(owner))?;
    values
        .iter()
        .map(|v| decode_id(v).map_err(StoreError::from))
        .collect()
}

impl VerificationStore for LmdbEnvironment {
    fn get_record(&self, id: &VerificationId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .records_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?
            .map(|b| b.to_vec());
        Ok(val)
    }

    fn iter_records(&self) -> Result<Vec<(VerificationId, Vec<u8>)>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self.records_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, val) = item.map_err(LmdbError::from)?;
            results.push((decode_id(key)?, val.to_vec()));
        }
        Ok(results)
    }

    fn attestation_index(
        &self,
        attestation: &AttestationId,
    ) -> Result<Vec<VerificationId>, StoreError> {
        scan_index(self, &self.attestation_index_db, attestation.as_bytes())
    }

    fn verifier_index(&self, verifier: &Identity) -> Result<Vec<VerificationId>, StoreError> {
        scan_index(self, &self.verifier_index_db, verifier.as_str().as_bytes())
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(self.records_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
