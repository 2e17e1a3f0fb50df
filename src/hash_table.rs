//! The linear-probing engine shared by [`DenseHashMap`] and [`PrehashMap`].
//!
//! [`HashTable<K, V>`] stores `(K, V)` pairs inline in a single power-of-two
//! array of buckets. It never hashes anything itself: every operation takes a
//! 32-bit hash and an equality predicate, and operations that may relocate
//! entries also take a `hasher` that recomputes the hash of a stored key.
//!
//! Removal leaves a [`BucketState::Removed`] tombstone so that probe chains
//! passing through the bucket stay intact. Tombstones are recycled by later
//! inserts and discarded whenever the table is rebuilt.
//!
//! [`DenseHashMap`]: crate::DenseHashMap
//! [`PrehashMap`]: crate::PrehashMap

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;

/// Occupancy tag of a single bucket.
///
/// Every bucket starts [`Free`](BucketState::Free). A successful insert moves
/// it to [`Taken`](BucketState::Taken), a successful remove moves it to
/// [`Removed`](BucketState::Removed), and a later insert may take it again.
/// [`HashTable::clear`] and table rebuilds reset every bucket to `Free`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BucketState {
    /// Never used since the last clear or rebuild. Terminates probe chains.
    Free,
    /// Holds a live entry.
    Taken,
    /// Tombstone left by a removal. Skipped by lookups, reusable by inserts.
    Removed,
}

struct Bucket<K, V> {
    state: BucketState,
    entry: MaybeUninit<(K, V)>,
}

impl<K: Copy, V: Copy> Clone for Bucket<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Copy, V: Copy> Copy for Bucket<K, V> {}

impl<K: Copy, V: Copy> Bucket<K, V> {
    const FREE: Self = Bucket {
        state: BucketState::Free,
        entry: MaybeUninit::uninit(),
    };

    #[inline(always)]
    fn is_taken(&self) -> bool {
        self.state == BucketState::Taken
    }

    /// # Safety
    ///
    /// The bucket must be [`BucketState::Taken`].
    #[inline(always)]
    unsafe fn entry(&self) -> &(K, V) {
        debug_assert!(self.is_taken());
        // SAFETY: Caller guarantees the bucket is taken, and taken buckets are
        // only produced by `place`, which writes the entry.
        unsafe { self.entry.assume_init_ref() }
    }

    /// # Safety
    ///
    /// The bucket must be [`BucketState::Taken`].
    #[inline(always)]
    unsafe fn entry_mut(&mut self) -> &mut (K, V) {
        debug_assert!(self.is_taken());
        // SAFETY: See `entry`.
        unsafe { self.entry.assume_init_mut() }
    }
}

/// Outcome of walking a probe chain.
enum Probe {
    /// A taken bucket whose key matched.
    Found(usize),
    /// The key is absent. Holds the first reusable bucket on the chain: the
    /// earliest tombstone if there was one, otherwise the terminating free
    /// bucket.
    Vacant(usize),
}

#[cold]
#[inline(never)]
fn probe_wrapped() -> ! {
    panic!("probe sequence wrapped the whole table without reaching a free bucket");
}

/// Low-level statistics about a table's layout.
///
/// Requires the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub populated: usize,
    /// Number of buckets
    pub capacity: usize,
    /// Number of tombstones
    pub tombstones: usize,
    /// Number of never-used buckets
    pub free: usize,
    /// Live entries divided by buckets
    pub load_factor: f64,
    /// Largest distance between an entry and its home bucket
    pub max_probe_length: usize,
    /// Mean distance between an entry and its home bucket
    pub mean_probe_length: f64,
    /// Bytes held by the bucket array
    pub total_bytes: usize,
}

#[cfg(feature = "stats")]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Buckets: {} free, {} tombstones",
            self.free, self.tombstones
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressing hash table using linear probing and tombstones.
///
/// `HashTable<K, V>` keeps keys and small values side by side so that a
/// lookup touches a single cache line. Both `K` and `V` must be `Copy`;
/// values are conventionally indices or handles.
///
/// ## Invariants
///
/// - The number of buckets is a power of two, so the home bucket of a hash
///   is `hash & (capacity - 1)`.
/// - After every successful insert, `len() * 2 <= capacity()`.
/// - At least one bucket is always [`BucketState::Free`], so every probe
///   chain terminates.
///
/// ## Example
///
/// ```rust
/// # use dense_hash::HashTable;
/// #
/// let mut table: HashTable<u32, u16> = HashTable::with_capacity(8);
/// let hash_of = |k: &u32| k.wrapping_mul(0x9E37_79B9);
///
/// assert!(table.insert(hash_of(&7), 7, 70, |k| *k == 7, hash_of));
/// assert!(!table.insert(hash_of(&7), 7, 71, |k| *k == 7, hash_of));
/// assert_eq!(table.find(hash_of(&7), |k| *k == 7), Some(&70));
/// ```
pub struct HashTable<K, V> {
    buckets: Vec<Bucket<K, V>>,
    populated: usize,
    tombstones: usize,
}

impl<K: Copy, V: Copy> Clone for HashTable<K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            populated: self.populated,
            tombstones: self.tombstones,
        }
    }
}

impl<K: Copy, V: Copy> Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let states: String = self
            .buckets
            .iter()
            .map(|b| match b.state {
                BucketState::Free => '.',
                BucketState::Taken => '#',
                BucketState::Removed => 'x',
            })
            .collect();

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.capacity())
            .field("buckets", &states)
            .finish()
    }
}

impl<K: Copy, V: Copy> HashTable<K, V> {
    /// Creates a new hash table with `capacity` buckets.
    ///
    /// `capacity` is rounded up to a power of two, with a minimum of one
    /// bucket. The table holds at most half as many entries before growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::HashTable;
    /// #
    /// let table: HashTable<u32, u32> = HashTable::with_capacity(12);
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity
            .max(1)
            .checked_next_power_of_two()
            .expect("capacity overflow");

        Self {
            buckets: vec![Bucket::FREE; capacity],
            populated: 0,
            tombstones: 0,
        }
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of buckets. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of tombstones currently in the table.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the state of the bucket at `index`, or `None` if `index` is out
    /// of range.
    pub fn bucket_state(&self, index: usize) -> Option<BucketState> {
        self.buckets.get(index).map(|b| b.state)
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.buckets.len() - 1
    }

    #[inline(always)]
    fn free(&self) -> usize {
        self.buckets.len() - self.populated - self.tombstones
    }

    /// Most buckets that may be taken or removed once an insert completes.
    #[inline(always)]
    fn max_used(&self) -> usize {
        self.capacity() * 3 / 4
    }

    /// Walks the probe chain of `hash` until a matching entry or a free bucket.
    fn probe(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Probe {
        let mask = self.mask();
        let home = hash as usize & mask;
        let mut index = home;
        let mut first_tombstone = None;

        loop {
            let bucket = &self.buckets[index];
            match bucket.state {
                BucketState::Taken => {
                    // SAFETY: The bucket is taken.
                    let (key, _) = unsafe { bucket.entry() };
                    if eq(key) {
                        return Probe::Found(index);
                    }
                }
                BucketState::Removed => {
                    first_tombstone.get_or_insert(index);
                }
                BucketState::Free => {
                    return Probe::Vacant(first_tombstone.unwrap_or(index));
                }
            }

            index = (index + 1) & mask;
            if index == home {
                probe_wrapped();
            }
        }
    }

    /// Returns the first bucket on the chain of `hash` that is not taken.
    ///
    /// Only valid when the key is known to be absent.
    fn vacant_slot(&self, hash: u32) -> usize {
        match self.probe(hash, |_| false) {
            Probe::Vacant(index) => index,
            Probe::Found(_) => unreachable!(),
        }
    }

    fn place(&mut self, index: usize, key: K, value: V) {
        let bucket = &mut self.buckets[index];
        debug_assert!(!bucket.is_taken());
        if bucket.state == BucketState::Removed {
            self.tombstones -= 1;
        }
        bucket.state = BucketState::Taken;
        bucket.entry = MaybeUninit::new((key, value));
        self.populated += 1;
    }

    /// Returns a reference to the value whose key satisfies `eq`, searching
    /// the probe chain of `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::HashTable;
    /// #
    /// let mut table: HashTable<u32, &str> = HashTable::with_capacity(4);
    /// table.insert(5, 5, "five", |k| *k == 5, |k| *k);
    ///
    /// assert_eq!(table.find(5, |k| *k == 5), Some(&"five"));
    /// assert_eq!(table.find(6, |k| *k == 6), None);
    /// ```
    pub fn find(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<&V> {
        match self.probe(hash, eq) {
            // SAFETY: `probe` only reports taken buckets as found.
            Probe::Found(index) => Some(unsafe { &self.buckets[index].entry().1 }),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value whose key satisfies `eq`.
    pub fn find_mut(&mut self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<&mut V> {
        match self.probe(hash, eq) {
            // SAFETY: `probe` only reports taken buckets as found.
            Probe::Found(index) => Some(unsafe { &mut self.buckets[index].entry_mut().1 }),
            Probe::Vacant(_) => None,
        }
    }

    /// Inserts `(key, value)` unless an entry satisfying `eq` already exists.
    ///
    /// Returns `false`, leaving the existing entry untouched, if the key is
    /// already present. Otherwise the entry is stored in the first tombstone
    /// or free bucket on the probe chain of `hash` and `true` is returned.
    ///
    /// If the insert would push the load factor above one half, the table
    /// doubles first. If it would take a free bucket while live entries and
    /// tombstones already fill three quarters of the table, the table is
    /// rebuilt at the same capacity to drop tombstones. Both paths use
    /// `hasher` to recompute the hash of every stored key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::HashTable;
    /// #
    /// let mut table: HashTable<u32, u32> = HashTable::with_capacity(2);
    /// for k in 0..4 {
    ///     assert!(table.insert(k, k, k * 10, |s| *s == k, |s| *s));
    /// }
    /// assert_eq!(table.capacity(), 8);
    /// assert!(!table.insert(2, 2, 99, |s| *s == 2, |s| *s));
    /// assert_eq!(table.find(2, |s| *s == 2), Some(&20));
    /// ```
    pub fn insert(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u32,
    ) -> bool {
        let mut index = match self.probe(hash, eq) {
            Probe::Found(_) => return false,
            Probe::Vacant(index) => index,
        };

        if (self.populated + 1) * 2 > self.capacity() {
            self.grow(&hasher);
            index = self.vacant_slot(hash);
        } else if self.buckets[index].state == BucketState::Free
            && (self.populated + self.tombstones >= self.max_used() || self.free() == 1)
        {
            self.purge_tombstones(&hasher);
            index = self.vacant_slot(hash);
        }

        self.place(index, key, value);
        debug_assert!(self.populated * 2 <= self.capacity());
        debug_assert!(self.free() >= 1);
        debug_assert!(
            self.capacity() < 2 || self.populated + self.tombstones <= self.max_used()
        );
        true
    }

    /// Removes the entry whose key satisfies `eq`, returning its value.
    ///
    /// The bucket becomes a tombstone. Removing an absent key is a no-op that
    /// returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dense_hash::HashTable;
    /// #
    /// let mut table: HashTable<u32, u32> = HashTable::with_capacity(8);
    /// table.insert(1, 1, 10, |k| *k == 1, |k| *k);
    ///
    /// assert_eq!(table.remove(1, |k| *k == 1), Some(10));
    /// assert_eq!(table.remove(1, |k| *k == 1), None);
    /// assert_eq!(table.tombstones(), 1);
    /// ```
    pub fn remove(&mut self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<V> {
        let Probe::Found(index) = self.probe(hash, eq) else {
            return None;
        };

        let bucket = &mut self.buckets[index];
        // SAFETY: `probe` only reports taken buckets as found.
        let (_, value) = unsafe { *bucket.entry() };
        bucket.state = BucketState::Removed;
        self.populated -= 1;
        self.tombstones += 1;
        Some(value)
    }

    /// Resets every bucket to [`BucketState::Free`], keeping the capacity.
    pub fn clear(&mut self) {
        self.buckets.fill(Bucket::FREE);
        self.populated = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all entries in bucket order.
    ///
    /// The order depends on the hashes and the table's history, not on the
    /// order of insertion. Calling `iter` again restarts from the beginning.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            remaining: self.populated,
        }
    }

    fn grow(&mut self, hasher: &impl Fn(&K) -> u32) {
        let new_capacity = self.capacity().checked_mul(2).expect("capacity overflow");
        trace_event!(
            from = self.capacity(),
            to = new_capacity,
            populated = self.populated,
            tombstones = self.tombstones,
            "growing hash table"
        );
        self.rebuild(new_capacity, hasher);
    }

    fn purge_tombstones(&mut self, hasher: &impl Fn(&K) -> u32) {
        trace_event!(
            capacity = self.capacity(),
            populated = self.populated,
            tombstones = self.tombstones,
            "purging tombstones"
        );
        self.rebuild(self.capacity(), hasher);
    }

    /// Moves every live entry, in old bucket order, into a fresh all-free
    /// array of `capacity` buckets.
    fn rebuild(&mut self, capacity: usize, hasher: &impl Fn(&K) -> u32) {
        let old = core::mem::replace(&mut self.buckets, vec![Bucket::FREE; capacity]);
        self.populated = 0;
        self.tombstones = 0;

        for bucket in old.iter().filter(|b| b.is_taken()) {
            // SAFETY: Filtered to taken buckets.
            let (key, value) = unsafe { *bucket.entry() };
            let index = self.vacant_slot(hasher(&key));
            self.place(index, key, value);
        }
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Requires the `stats` feature. Entry `i` counts live entries stored `i`
    /// buckets past their home bucket. `hasher` must be the same function used
    /// to insert.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self, hasher: impl Fn(&K) -> u32) -> Vec<usize> {
        let mask = self.mask();
        let mut hist = Vec::new();

        for (index, bucket) in self.buckets.iter().enumerate() {
            if !bucket.is_taken() {
                continue;
            }
            // SAFETY: Checked above.
            let (key, _) = unsafe { bucket.entry() };
            let distance = index.wrapping_sub(hasher(key) as usize) & mask;
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }

        hist
    }

    /// Returns layout and probe-length statistics for debugging.
    ///
    /// Requires the `stats` feature.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self, hasher: impl Fn(&K) -> u32) -> DebugStats {
        let hist = self.probe_histogram(hasher);
        let total: usize = hist.iter().enumerate().map(|(d, n)| d * n).sum();

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            tombstones: self.tombstones,
            free: self.free(),
            load_factor: self.populated as f64 / self.capacity() as f64,
            max_probe_length: hist.len().saturating_sub(1),
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total as f64 / self.populated as f64
            },
            total_bytes: self.capacity() * core::mem::size_of::<Bucket<K, V>>(),
        }
    }
}

impl<'a, K: Copy, V: Copy> IntoIterator for &'a HashTable<K, V> {
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`HashTable`], in bucket order.
///
/// This struct is created by the [`iter`] method on [`HashTable`]. It yields
/// copies of the stored `(K, V)` pairs.
///
/// [`iter`]: HashTable::iter
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Bucket<K, V>>,
    remaining: usize,
}

impl<K: Copy, V: Copy> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let bucket = self.buckets.find(|b| b.is_taken())?;
        self.remaining -= 1;
        // SAFETY: `find` only yields taken buckets.
        Some(unsafe { *bucket.entry() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Copy, V: Copy> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Copy, V: Copy> FusedIterator for Iter<'_, K, V> {}
