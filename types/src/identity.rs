//! Caller identities and the roles they can hold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::VouchError;

/// The identity of a caller, as supplied by the identity/access substrate.
///
/// Identities are opaque to the ledger: any non-blank string without
/// surrounding whitespace, and no longer than [`crate::MAX_ID_LEN`] bytes,
/// is accepted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Parse an identity, rejecting blank or padded strings.
    pub fn parse(raw: impl Into<String>) -> Result<Self, VouchError> {
        let s = raw.into();
        if s.trim().is_empty() || s.trim() != s {
            return Err(VouchError::InvalidIdentity(s));
        }
        crate::check_id_len(&s)?;
        Ok(Self(s))
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identity {
    type Err = VouchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = VouchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

/// Roles an identity can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Mutates roles, safety switches, the registry reference and parameters.
    Admin,
    /// Submits verification records.
    Verifier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Verifier => "verifier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
