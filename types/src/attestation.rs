//! Opaque reference to an externally owned attestation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::VouchError;

/// Identifier of an attestation held by the Attestation Registry.
///
/// The ledger never owns attestations; it only keys its reputation and
/// verification indexes by this identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttestationId(String);

impl AttestationId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, VouchError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(VouchError::InvalidAttestationId(s));
        }
        crate::check_id_len(&s)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AttestationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AttestationId {
    type Err = VouchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AttestationId {
    type Error = VouchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AttestationId> for String {
    fn from(id: AttestationId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank() {
        assert!(AttestationId::parse("").is_err());
        assert!(AttestationId::parse("  ").is_err());
        assert_eq!(AttestationId::parse("A1").unwrap().as_str(), "A1");
    }

    #[test]
    fn parse_rejects_ids_past_the_key_limit() {
        let at_limit = "a".repeat(crate::MAX_ID_LEN);
        assert!(AttestationId::parse(at_limit).is_ok());
        let err = AttestationId::parse("a".repeat(crate::MAX_ID_LEN + 1)).unwrap_err();
        assert!(matches!(err, VouchError::IdTooLong { got, .. } if got == crate::MAX_ID_LEN + 1));
    }
}
