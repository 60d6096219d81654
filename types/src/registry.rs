//! Reference to the bound Attestation Registry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::VouchError;

/// Address of an Attestation Registry instance.
///
/// The ledger is bound to exactly one reference at a time; admins can rebind
/// it. The reference is opaque here and interpreted by the registry client.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryRef(String);

impl RegistryRef {
    /// Parse a registry reference. Blank references are rejected.
    pub fn parse(raw: impl Into<String>) -> Result<Self, VouchError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(VouchError::EmptyRegistryRef);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RegistryRef {
    type Error = VouchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<RegistryRef> for String {
    fn from(r: RegistryRef) -> Self {
        r.0
    }
}
