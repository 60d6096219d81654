//! Metadata storage trait.

use crate::StoreError;

/// Trait for reading database metadata (schema version, access state,
/// global statistics).
///
/// This is a generic key-value store for internal bookkeeping that doesn't
/// belong in any domain-specific store. Writes go through
/// [`WriteOp::PutMeta`](crate::WriteOp::PutMeta).
pub trait MetaStore {
    /// Retrieve a metadata value, `None` if the key was never written.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Get the current database schema version (0 for a fresh database).
    fn get_schema_version(&self) -> Result<u32, StoreError> {
        match self.get_meta(crate::keys::META_SCHEMA_VERSION)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Corruption("schema_version has unexpected byte length".into())
                })?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }
}
