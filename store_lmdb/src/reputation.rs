//! LMDB implementation of ReputationStore.

use vouch_store::{ReputationStore, StoreError};
use vouch_types::{AttestationId, Identity};

use crate::{LmdbEnvironment, LmdbError};

fn utf8_key(key: &[u8]) -> Result<String, LmdbError> {
    std::str::from_utf8(key)
        .map(str::to_string)
        .map_err(|e| LmdbError::Corrupt(format!("non-utf8 key: {e}")))
}

impl ReputationStore for LmdbEnvironment {
    fn get_verifier_reputation(&self, verifier: &Identity) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .verifier_reputation_db
            .get(&rtxn, verifier.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .map(|b| b.to_vec());
        Ok(val)
    }

    fn iter_verifier_reputations(&self) -> Result<Vec<(Identity, Vec<u8>)>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self.verifier_reputation_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, val) = item.map_err(LmdbError::from)?;
            let verifier = Identity::parse(utf8_key(key)?)
                .map_err(|e| StoreError::Corruption(e.to_string()))?;
            results.push((verifier, val.to_vec()));
        }
        Ok(results)
    }

    fn get_attestation_reputation(
        &self,
        attestation: &AttestationId,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .attestation_reputation_db
            .get(&rtxn, attestation.as_bytes())
            .map_err(LmdbError::from)?
            .map(|b| b.to_vec());
        Ok(val)
    }

    fn iter_attestation_reputations(&self) -> Result<Vec<(AttestationId, Vec<u8>)>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self
            .attestation_reputation_db
            .iter(&rtxn)
            .map_err(LmdbError::from)?
        {
            let (key, val) = item.map_err(LmdbError::from)?;
            let attestation = AttestationId::parse(utf8_key(key)?)
                .map_err(|e| StoreError::Corruption(e.to_string()))?;
            results.push((attestation, val.to_vec()));
        }
        Ok(results)
    }
}
