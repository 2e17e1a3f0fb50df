use std::collections::HashMap;
use std::vec::Vec;

use proptest::prelude::*;

use super::*;

fn validate_table<K: Copy, V: Copy>(t: &HashTable<K, V>) {
    assert!(
        t.capacity().is_power_of_two(),
        "capacity must be a power of two"
    );
    assert!(t.len() * 2 <= t.capacity(), "load factor above one half");

    let mut taken = 0;
    let mut removed = 0;
    for i in 0..t.capacity() {
        match t.bucket_state(i).unwrap() {
            BucketState::Taken => taken += 1,
            BucketState::Removed => removed += 1,
            BucketState::Free => {}
        }
    }
    assert_eq!(taken, t.len(), "taken buckets must match len");
    assert_eq!(
        removed,
        t.tombstones(),
        "removed buckets must match tombstones"
    );
    assert!(taken + removed < t.capacity(), "no free bucket left");
    assert!(
        t.capacity() < 2 || taken + removed <= t.capacity() * 3 / 4,
        "tombstones were not purged"
    );
    assert_eq!(t.iter().count(), t.len());
}

#[derive(Clone, Debug)]
enum Op<K> {
    Insert(K, u32),
    Remove(K),
    Get(K),
    Clear,
}

fn ops_strategy<K: Clone + core::fmt::Debug>(
    key: impl Strategy<Value = K> + Clone,
) -> impl Strategy<Value = Vec<Op<K>>> {
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        19 => key.prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=2000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_dense_equivalence(
        initial in 0usize..=16,
        ops in ops_strategy(any::<[u8; 2]>().prop_map(|k| [k[0] & 0x3F, k[1] & 0x01])),
    ) {
        let mut t: DenseHashMap<[u8; 2], u32> = DenseHashMap::new(initial);
        let mut m: HashMap<[u8; 2], u32> = HashMap::new();

        for op in ops {
            let capacity = t.capacity();
            match op {
                Op::Insert(key, value) => {
                    let inserted = t.insert(key, value);
                    prop_assert_eq!(inserted, !m.contains_key(&key));
                    m.entry(key).or_insert(value);
                    prop_assert!(t.len() * 2 <= t.capacity());
                    prop_assert!(t.capacity() == capacity || t.capacity() == capacity * 2);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                    prop_assert_eq!(t.capacity(), capacity);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key).copied());
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                    prop_assert_eq!(t.capacity(), capacity);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_table(t.as_table());
        let mut got: Vec<([u8; 2], u32)> = t.iter().collect();
        got.sort();
        let mut expected: Vec<([u8; 2], u32)> = m.into_iter().collect();
        expected.sort();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_prehash_equivalence(
        initial in 0usize..=16,
        ops in ops_strategy((0u32..96).prop_map(|h| h.rotate_left(3))),
    ) {
        let mut t: PrehashMap<u32> = PrehashMap::new(initial);
        let mut m: HashMap<u32, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(hash, value) => {
                    prop_assert_eq!(t.insert(hash, value), !m.contains_key(&hash));
                    m.entry(hash).or_insert(value);
                }
                Op::Remove(hash) => {
                    prop_assert_eq!(t.remove(hash), m.remove(&hash));
                }
                Op::Get(hash) => {
                    prop_assert_eq!(t.get(hash), m.get(&hash).copied());
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_table(t.as_table());
        let mut got: Vec<(u32, u32)> = t.iter().collect();
        got.sort();
        let mut expected: Vec<(u32, u32)> = m.into_iter().collect();
        expected.sort();
        prop_assert_eq!(got, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(
        items: &[T],
        used: &mut [bool],
        out: &mut Vec<T>,
        f: &mut impl FnMut(Vec<T>),
    ) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = std::vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_remove_order_on_one_chain() {
    // Every hash shares home bucket 0, so all entries form a single chain.
    let hashes = [0x00u32, 0x10, 0x20, 0x30, 0x40, 0x50];

    let mut base = PrehashMap::new(16);
    for (i, h) in hashes.iter().enumerate() {
        assert!(base.insert(*h, i));
    }

    for_each_permutation(&hashes, |perm| {
        let mut t = base.clone();
        let mut remaining: Vec<u32> = hashes.to_vec();

        for h in perm {
            assert!(t.remove(h).is_some());
            remaining.retain(|r| *r != h);
            for r in &remaining {
                assert!(t.contains_key(*r), "lost {r:#x} after removing {h:#x}");
            }
            validate_table(t.as_table());
        }
        assert!(t.is_empty());
        assert_eq!(t.capacity(), 16);
    });
}

#[test]
fn exhaustive_reinsert_order_on_one_chain() {
    let hashes = [0x00u32, 0x08, 0x18, 0x28, 0x38];

    for_each_permutation(&hashes, |perm| {
        let mut t = PrehashMap::new(16);
        for h in &hashes {
            assert!(t.insert(*h, 0u8));
        }
        for h in &perm[..2] {
            t.remove(*h);
        }
        for h in &perm {
            let was_removed = perm[..2].contains(h);
            assert_eq!(t.insert(*h, 1), was_removed);
        }

        assert_eq!(t.len(), hashes.len());
        assert_eq!(t.capacity(), 16);
        validate_table(t.as_table());
    });
}
