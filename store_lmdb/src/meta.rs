//! LMDB implementation of MetaStore.

use vouch_store::{MetaStore, StoreError};

use crate::{LmdbEnvironment, LmdbError};

impl MetaStore for LmdbEnvironment {
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .meta_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?
            .map(|b| b.to_vec());
        Ok(val)
    }
}
