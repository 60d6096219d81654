//! Blake2b hashing and verification-id derivation.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use vouch_types::{AttestationId, Identity, Timestamp, VerificationId};

type Blake2b256 = Blake2b<U32>;

/// Domain tag mixed into every verification id.
const VERIFICATION_ID_DOMAIN: &[u8] = b"vouch/verification-id/v1";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the id of a verification record.
///
/// The id commits to the attestation, the verifier, the recording time and
/// the ledger-wide `counter`. Variable-length fields are length-prefixed so
/// that `("ab", "c")` and `("a", "bc")` cannot collide. Two calls with the
/// same attestation, verifier and timestamp differ only through `counter`,
/// which callers must never reuse.
pub fn derive_verification_id(
    attestation: &AttestationId,
    verifier: &Identity,
    timestamp: Timestamp,
    counter: u64,
) -> VerificationId {
    let attestation_bytes = attestation.as_bytes();
    let verifier_bytes = verifier.as_str().as_bytes();
    let attestation_len = (attestation_bytes.len() as u64).to_be_bytes();
    let verifier_len = (verifier_bytes.len() as u64).to_be_bytes();
    VerificationId::new(blake2b_256_multi(&[
        VERIFICATION_ID_DOMAIN,
        &attestation_len,
        attestation_bytes,
        &verifier_len,
        verifier_bytes,
        &timestamp.to_be_bytes(),
        &counter.to_be_bytes(),
    ]))
}
