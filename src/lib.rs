#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! trace_event {
            ($($arg:tt)*) => { tracing::trace!($($arg)*) };
        }
    } else {
        macro_rules! trace_event {
            ($($arg:tt)*) => {};
        }
    }
}

/// Seeded xxHash32 hashing and byte-wise equality for plain-old-data keys.
pub mod hash;

pub mod hash_table;

/// A linear-probing map keyed by plain-old-data keys.
///
/// This module provides [`DenseHashMap`], which hashes the raw bytes of each
/// key with [`hash_key`] and stores entries in a [`HashTable`].
pub mod hash_map;

/// A linear-probing map keyed by caller-supplied 32-bit hashes.
///
/// This module provides [`PrehashMap`], which performs no hashing of its own
/// and stores entries in a [`HashTable`].
pub mod prehash_map;

#[cfg(all(test, feature = "std"))]
mod proptests;

pub use hash::HASHMAP_SEED;
pub use hash::hash_key;
pub use hash::key_equals;
pub use hash_map::DenseHashMap;
pub use hash_table::BucketState;
pub use hash_table::HashTable;
pub use prehash_map::PrehashMap;
