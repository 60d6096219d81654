use thiserror::Error;

/// Failures reported by a storage backend.
///
/// Only [`StoreError::Backend`] describes a condition that may clear on its
/// own; the other variants are properties of the data or the request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    /// The backend refused the key or value itself, e.g. a key over the
    /// backend's size limit. Retrying the same write fails the same way.
    #[error("write rejected by backend: {0}")]
    Rejected(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_backend_failures_are_retryable() {
        assert!(StoreError::Backend("map full".into()).is_retryable());
        assert!(!StoreError::Rejected("key too large".into()).is_retryable());
        assert!(!StoreError::Corruption("bad record".into()).is_retryable());
        assert!(!StoreError::NotFound("x".into()).is_retryable());
    }
}
