//! Key layouts shared by every backend.
//!
//! Index entries use `len(owner) ++ owner ++ seq` where `len` is a big-endian
//! `u32` and `seq` a big-endian `u64`. The length prefix keeps the owner
//! prefix unambiguous (`"a"` never range-scans into `"ab"`) and the
//! big-endian sequence makes a prefix scan return insertion order.

/// Metadata key holding the schema version (`u32`, little-endian).
pub const META_SCHEMA_VERSION: &str = "schema_version";

/// Metadata key holding the encoded access/safety state.
pub const META_ACCESS_STATE: &str = "access_state";

/// Metadata key holding the encoded global statistics.
pub const META_GLOBAL_STATS: &str = "global_stats";

/// Build the scan prefix for every index entry of `owner`.
pub fn index_prefix(owner: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(4 + owner.len() + 8);
    key.extend_from_slice(&(owner.len() as u32).to_be_bytes());
    key.extend_from_slice(owner);
    key
}

/// Build the full key of the `seq`-th index entry of `owner`.
pub fn index_key(owner: &[u8], seq: u64) -> Vec<u8> {
    let mut key = index_prefix(owner);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `false` if `prefix` is all `0xff` bytes (no such key exists).
pub fn increment_prefix(prefix: &mut Vec<u8>) -> bool {
    while let Some(last) = prefix.last_mut() {
        if *last < 0xff {
            *last += 1;
            return true;
        }
        prefix.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keys_sort_by_sequence() {
        let a = index_key(b"att", 1);
        let b = index_key(b"att", 2);
        let c = index_key(b"att", 256);
        assert!(a < b && b < c);
    }

    #[test]
    fn prefixes_do_not_overlap_for_extended_owners() {
        let short = index_prefix(b"a");
        let long = index_key(b"ab", 0);
        assert!(!long.starts_with(&short));
    }

    #[test]
    fn increment_prefix_carries() {
        let mut p = vec![0x01, 0xff];
        assert!(increment_prefix(&mut p));
        assert_eq!(p, vec![0x02]);

        let mut all_ff = vec![0xff, 0xff];
        assert!(!increment_prefix(&mut all_ff));
    }
}
