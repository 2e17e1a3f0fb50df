use xxhash_rust::xxh32::xxh32;
use zerocopy::AsBytes;

/// Seed mixed into every [`hash_key`] call.
///
/// The value is arbitrary. Changing it changes how keys are distributed over
/// the buckets but never affects correctness.
pub const HASHMAP_SEED: u32 = 0x23B5_8532;

/// Hashes the raw byte representation of `key` with xxHash32 and
/// [`HASHMAP_SEED`].
///
/// `AsBytes` can only be derived for types without padding, so two logically
/// equal keys always present identical bytes to the hasher.
///
/// # Examples
///
/// ```rust
/// # use dense_hash::hash_key;
/// #
/// assert_eq!(hash_key(&7u64), hash_key(&7u64));
/// assert_ne!(hash_key(&7u64), hash_key(&8u64));
/// ```
#[inline]
pub fn hash_key<K: AsBytes + ?Sized>(key: &K) -> u32 {
    hash_key_with_seed(key, HASHMAP_SEED)
}

/// Same as [`hash_key`] with an explicit seed.
#[inline]
pub fn hash_key_with_seed<K: AsBytes + ?Sized>(key: &K, seed: u32) -> u32 {
    xxh32(key.as_bytes(), seed)
}

/// Returns `true` if `a` and `b` have identical byte representations.
///
/// # Examples
///
/// ```rust
/// # use dense_hash::key_equals;
/// #
/// assert!(key_equals(&[1u8, 2, 3], &[1u8, 2, 3]));
/// assert!(!key_equals(&1u32, &2u32));
/// ```
#[inline]
pub fn key_equals<K: AsBytes + ?Sized>(a: &K, b: &K) -> bool {
    a.as_bytes() == b.as_bytes()
}

#[cfg(test)]
mod tests {
    use zerocopy::AsBytes;

    use super::*;

    #[derive(AsBytes, Clone, Copy)]
    #[repr(C)]
    struct Pair {
        a: u32,
        b: u32,
    }

    #[test]
    fn empty_input_matches_reference() {
        // xxHash32 reference vector for the empty input.
        assert_eq!(hash_key_with_seed::<[u8]>(&[], 0), 0x02CC_5D05);
    }

    #[test]
    fn seed_changes_distribution() {
        let key = 0xDEAD_BEEFu32;
        assert_ne!(hash_key_with_seed(&key, 0), hash_key(&key));
        assert_eq!(hash_key_with_seed(&key, HASHMAP_SEED), hash_key(&key));
    }

    #[test]
    fn struct_keys_hash_by_bytes() {
        let x = Pair { a: 1, b: 2 };
        let y = Pair { a: 1, b: 2 };
        let z = Pair { a: 2, b: 1 };

        assert_eq!(hash_key(&x), hash_key(&y));
        assert!(key_equals(&x, &y));
        assert!(!key_equals(&x, &z));
        assert_eq!(hash_key(&x), hash_key(x.as_bytes()));
    }

    #[test]
    fn distinct_integers_spread() {
        let mut low_bits = [0usize; 8];
        for k in 0..1024u32 {
            low_bits[(hash_key(&k) & 7) as usize] += 1;
        }
        for count in low_bits {
            assert!(count > 64, "poor spread over low bits: {low_bits:?}");
        }
    }
}
