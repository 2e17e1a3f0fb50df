use core::fmt::Debug;

use crate::hash_map::DEFAULT_CAPACITY;
use crate::hash_map::Keys;
use crate::hash_map::Values;
use crate::hash_table::HashTable;
use crate::hash_table::Iter;

#[inline(always)]
fn identity(hash: &u32) -> u32 {
    *hash
}

/// A small linear-probing map keyed directly by 32-bit hashes.
///
/// `PrehashMap<V>` performs no hashing: the caller's hash is both the key and
/// the probe start. Two entries are the same entry exactly when their hashes
/// are equal, so the caller is responsible for supplying well-distributed,
/// collision-free identifiers.
///
/// Apart from the key representation it behaves exactly like
/// [`DenseHashMap`](crate::DenseHashMap).
///
/// # Examples
///
/// ```rust
/// # use dense_hash::PrehashMap;
/// #
/// let mut map: PrehashMap<usize> = PrehashMap::new(4);
/// assert!(map.insert(0x10, 1));
/// assert!(map.insert(0x14, 2));
/// assert!(!map.insert(0x10, 3));
///
/// assert_eq!(map.get(0x10), Some(1));
/// assert_eq!(map.get(0x14), Some(2));
/// ```
pub struct PrehashMap<V> {
    table: HashTable<u32, V>,
}

impl<V: Copy> Clone for PrehashMap<V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<V: Copy + Debug> Debug for PrehashMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (hash, value) in self.iter() {
            map.key(&format_args!("{hash:#010x}")).value(&value);
        }
        map.finish()
    }
}

impl<V: Copy> PrehashMap<V> {
    /// Creates an empty map with `capacity` buckets.
    ///
    /// `capacity` should be a power of two. Other values are rounded up to
    /// the next power of two.
    pub fn new(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns a copy of the value stored for `hash`.
    pub fn get(&self, hash: u32) -> Option<V> {
        self.table.find(hash, |h| *h == hash).copied()
    }

    /// Returns a mutable reference to the value stored for `hash`.
    pub fn get_mut(&mut self, hash: u32) -> Option<&mut V> {
        self.table.find_mut(hash, |h| *h == hash)
    }

    /// Returns `true` if the map contains `hash`.
    pub fn contains_key(&self, hash: u32) -> bool {
        self.get(hash).is_some()
    }

    /// Inserts `value` under `hash` if the hash is not already present.
    ///
    /// Returns `false` without modifying the map if `hash` already exists, so
    /// callers may use it as a combined presence check and insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::PrehashMap;
    /// #
    /// let mut map = PrehashMap::new(8);
    /// assert!(map.insert(0xABCD_0001, "first"));
    /// assert!(!map.insert(0xABCD_0001, "second"));
    /// assert_eq!(map.get(0xABCD_0001), Some("first"));
    /// ```
    pub fn insert(&mut self, hash: u32, value: V) -> bool {
        self.table.insert(hash, hash, value, |h| *h == hash, identity)
    }

    /// Removes `hash` from the map, returning its value if it was present.
    ///
    /// Removing an absent hash does nothing.
    pub fn remove(&mut self, hash: u32) -> Option<V> {
        self.table.remove(hash, |h| *h == hash)
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over `(hash, value)` copies in bucket order.
    pub fn iter(&self) -> Iter<'_, u32, V> {
        self.table.iter()
    }

    /// Returns an iterator over the stored hashes.
    pub fn keys(&self) -> Keys<'_, u32, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, u32, V> {
        Values { inner: self.iter() }
    }

    /// Returns the underlying table.
    pub fn as_table(&self) -> &HashTable<u32, V> {
        &self.table
    }

    /// Computes a histogram of probe lengths. Requires the `stats` feature.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram(identity)
    }

    /// Returns layout statistics. Requires the `stats` feature.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats(identity)
    }
}

impl<V: Copy> Default for PrehashMap<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<V: Copy> Extend<(u32, V)> for PrehashMap<V> {
    /// Inserts every pair. Hashes already present keep their existing value.
    fn extend<I: IntoIterator<Item = (u32, V)>>(&mut self, iter: I) {
        for (hash, value) in iter {
            self.insert(hash, value);
        }
    }
}

impl<'a, V: Copy> IntoIterator for &'a PrehashMap<V> {
    type Item = (u32, V);
    type IntoIter = Iter<'a, u32, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
