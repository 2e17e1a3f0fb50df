use core::fmt::Debug;
use core::iter::FusedIterator;

use zerocopy::AsBytes;

use crate::hash::hash_key;
use crate::hash::key_equals;
use crate::hash_table::HashTable;
use crate::hash_table::Iter;

/// Number of buckets used by [`DenseHashMap::default`] and
/// [`PrehashMap::default`](crate::PrehashMap).
pub(crate) const DEFAULT_CAPACITY: usize = 16;

/// A small linear-probing map keyed by plain-old-data keys.
///
/// `DenseHashMap<K, V>` hashes the raw bytes of each key with
/// [`hash_key`](crate::hash_key) and compares keys byte for byte. Keys must
/// implement [`AsBytes`], which can only be derived for types without
/// padding, so equal keys always hash equally. Values must be `Copy` and are
/// meant to be small handles; lookups return copies.
///
/// The map never shrinks. It doubles whenever an insert would take it above
/// half full.
///
/// # Examples
///
/// ```rust
/// # use dense_hash::DenseHashMap;
/// #
/// let mut map: DenseHashMap<u32, u16> = DenseHashMap::new(8);
/// assert!(map.insert(1, 10));
/// assert!(!map.insert(1, 11));
/// assert_eq!(map.get(&1), Some(10));
///
/// map.remove(&1);
/// assert_eq!(map.get(&1), None);
/// ```
pub struct DenseHashMap<K, V> {
    table: HashTable<K, V>,
}

impl<K: Copy, V: Copy> Clone for DenseHashMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K, V> Debug for DenseHashMap<K, V>
where
    K: AsBytes + Copy + Debug,
    V: Copy + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> DenseHashMap<K, V>
where
    K: AsBytes + Copy,
    V: Copy,
{
    /// Creates an empty map with `capacity` buckets.
    ///
    /// `capacity` should be a power of two. Other values are rounded up to
    /// the next power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::DenseHashMap;
    /// #
    /// let map: DenseHashMap<u64, u32> = DenseHashMap::new(32);
    /// assert_eq!(map.capacity(), 32);
    /// assert!(map.is_empty());
    /// ```
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

    /// Returns a copy of the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::DenseHashMap;
    /// #
    /// let mut map = DenseHashMap::new(8);
    /// map.insert([1u8, 2], 3usize);
    /// assert_eq!(map.get(&[1, 2]), Some(3));
    /// assert_eq!(map.get(&[2, 1]), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<V> {
        self.table
            .find(hash_key(key), |k| key_equals(k, key))
            .copied()
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.find_mut(hash_key(key), |k| key_equals(k, key))
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `value` under `key` if the key is not already present.
    ///
    /// Returns `false` and leaves the stored value unchanged if `key` already
    /// exists. Use [`get_mut`](Self::get_mut) to overwrite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::DenseHashMap;
    /// #
    /// let mut map = DenseHashMap::new(8);
    /// assert!(map.insert(37u32, 'a'));
    /// assert!(!map.insert(37, 'b'));
    /// assert_eq!(map.get(&37), Some('a'));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.table.insert(
            hash_key(&key),
            key,
            value,
            |k| key_equals(k, &key),
            |k| hash_key(k),
        )
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// Removing an absent key does nothing.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(hash_key(key), |k| key_equals(k, key))
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over `(key, value)` copies in bucket order.
    ///
    /// The order is not insertion order and changes when the map grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::DenseHashMap;
    /// #
    /// let mut map = DenseHashMap::new(8);
    /// map.insert(1u32, 'a');
    /// map.insert(2u32, 'b');
    ///
    /// let mut pairs: Vec<_> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(1, 'a'), (2, 'b')]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns the underlying table.
    pub fn as_table(&self) -> &HashTable<K, V> {
        &self.table
    }

    /// Computes a histogram of probe lengths. Requires the `stats` feature.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram(|k| hash_key(k))
    }

    /// Returns layout statistics. Requires the `stats` feature.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats(|k| hash_key(k))
    }
}

impl<K, V> Default for DenseHashMap<K, V>
where
    K: AsBytes + Copy,
    V: Copy,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> Extend<(K, V)> for DenseHashMap<K, V>
where
    K: AsBytes + Copy,
    V: Copy,
{
    /// Inserts every pair. Keys already present keep their existing value.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a DenseHashMap<K, V>
where
    K: AsBytes + Copy,
    V: Copy,
{
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the keys of a map.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<K: Copy, V: Copy> Iterator for Keys<'_, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Copy, V: Copy> ExactSizeIterator for Keys<'_, K, V> {}

impl<K: Copy, V: Copy> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a map.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<K: Copy, V: Copy> Iterator for Values<'_, K, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Copy, V: Copy> ExactSizeIterator for Values<'_, K, V> {}

impl<K: Copy, V: Copy> FusedIterator for Values<'_, K, V> {}
