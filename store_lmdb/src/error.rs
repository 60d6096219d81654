use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("corrupt entry: {0}")]
    Corrupt(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("key or value rejected: {0}")]
    BadSize(String),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        match e {
            heed::Error::Mdb(heed::MdbError::BadValSize) => LmdbError::BadSize(e.to_string()),
            other => LmdbError::Heed(other.to_string()),
        }
    }
}

impl From<LmdbError> for vouch_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::NotFound(key) => vouch_store::StoreError::NotFound(key),
            LmdbError::Corrupt(msg) => vouch_store::StoreError::Corruption(msg),
            LmdbError::BadSize(msg) => vouch_store::StoreError::Rejected(msg),
            other => vouch_store::StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_store::StoreError;

    #[test]
    fn oversized_keys_map_to_a_rejected_write() {
        let err = LmdbError::from(heed::Error::Mdb(heed::MdbError::BadValSize));
        let store_err = StoreError::from(err);
        assert!(matches!(store_err, StoreError::Rejected(_)));
        assert!(!store_err.is_retryable());
    }
}
