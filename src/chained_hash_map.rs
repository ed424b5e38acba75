//! ChainedHashMap: string-keyed map with one `Sequence` per bucket and
//! doubling growth.

use crate::entry::Entry;
use crate::hash::bucket_index;
use crate::sequence::{self, Sequence};
use core::fmt;
use log::{debug, trace};

/// Bucket count of a new or cleared map.
pub const DEFAULT_CAPACITY: usize = 16;

/// `len / capacity` ratio above which an insertion doubles the capacity.
pub const LOAD_FACTOR: f64 = 0.75;

type Bucket<V> = Sequence<Entry<V>>;

fn empty_buckets<V>(capacity: usize) -> Vec<Bucket<V>> {
    (0..capacity).map(|_| Sequence::new()).collect()
}

/// Hash map from `String` keys to `V` using separate chaining.
///
/// Each key lives in the bucket chosen by [`bucket_index`] for the current
/// capacity. Iteration order is bucket order, then chain order, and is
/// reshuffled by every growth.
#[derive(Clone)]
pub struct ChainedHashMap<V> {
    buckets: Vec<Bucket<V>>,
    len: usize,
}

impl<V> ChainedHashMap<V> {
    pub fn new() -> Self {
        Self {
            buckets: empty_buckets(DEFAULT_CAPACITY),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, key: &str) -> usize {
        bucket_index(key, self.buckets.len())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.buckets[self.bucket_of(key)]
            .find(|e| e.key() == key)
            .map(|found| found.value.value())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let b = self.bucket_of(key);
        self.buckets[b]
            .find_mut(|e| e.key() == key)
            .map(|found| found.value.value_mut())
    }

    /// Inserts or overwrites `key`.
    ///
    /// Only an insertion of a new key changes `len()` and can trigger growth;
    /// overwriting keeps the entry at its position in its chain.
    pub fn set<K: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        let key = key.into();
        let b = self.bucket_of(&key);
        let bucket = &mut self.buckets[b];
        if let Some(found) = bucket.find_mut(|e| e.key() == key) {
            *found.value.value_mut() = value;
            return self;
        }
        trace!("inserting {:?} into bucket {}", key, b);
        bucket.append(Entry::new(key, value));
        self.len += 1;
        if self.should_grow() {
            self.grow();
        }
        self
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn take(&mut self, key: &str) -> Option<V> {
        let b = self.bucket_of(key);
        let bucket = &mut self.buckets[b];
        let index = bucket.find(|e| e.key() == key)?.index;
        let entry = bucket
            .remove_at(index)
            .expect("index reported by find must be in range");
        self.len -= 1;
        trace!("removed {:?} from bucket {} at {}", key, b, index);
        Some(entry.into_value())
    }

    /// Drops every entry and resets the capacity to [`DEFAULT_CAPACITY`].
    pub fn clear(&mut self) -> &mut Self {
        debug!(
            "clearing {} entries across {} buckets",
            self.len,
            self.buckets.len()
        );
        self.buckets = empty_buckets(DEFAULT_CAPACITY);
        self.len = 0;
        self
    }

    fn should_grow(&self) -> bool {
        self.len as f64 / self.buckets.len() as f64 > LOAD_FACTOR
    }

    // Rehash into twice as many buckets. Old buckets are drained in bucket
    // order, then chain order; keys are already unique so each entry is
    // appended to its new bucket without a lookup. The old array keeps its
    // length until the new one replaces it.
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity * 2;
        debug!(
            "growing from {} to {} buckets at {} entries",
            old_capacity, new_capacity, self.len
        );
        let mut rehashed = empty_buckets(new_capacity);
        for bucket in self.buckets.iter_mut() {
            for entry in core::mem::take(bucket) {
                let b = bucket_index(entry.key(), new_capacity);
                rehashed[b].append(entry);
            }
        }
        self.buckets = rehashed;

        #[cfg(test)]
        self.check_layout();
    }

    // Materializes one item per entry in iteration order.
    fn collect_entries<'a, R, F>(&'a self, mut f: F) -> Vec<R>
    where
        F: FnMut(&'a Entry<V>) -> R,
    {
        let mut out = Vec::with_capacity(self.len);
        for bucket in &self.buckets {
            bucket.for_each(|e| out.push(f(e)));
        }
        out
    }

    pub fn keys(&self) -> Vec<&str> {
        self.collect_entries(|e| e.key())
    }

    pub fn values(&self) -> Vec<&V> {
        self.collect_entries(|e| e.value())
    }

    pub fn entries(&self) -> Vec<(&str, &V)> {
        self.collect_entries(|e| (e.key(), e.value()))
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Chain length of every bucket, in bucket order.
    #[cfg(feature = "stats")]
    pub fn bucket_lens(&self) -> Vec<usize> {
        self.buckets.iter().map(Sequence::len).collect()
    }

    /// Panics unless every entry sits in the bucket its key hashes to, no
    /// bucket holds a key twice, every chain is consistent, and the chain
    /// lengths add up to `len`.
    #[cfg(test)]
    pub(crate) fn check_layout(&self) {
        let capacity = self.buckets.len();
        assert!(
            capacity >= DEFAULT_CAPACITY && capacity.is_power_of_two(),
            "capacity {} is not a doubling of {}",
            capacity,
            DEFAULT_CAPACITY
        );
        let mut total = 0;
        for (i, bucket) in self.buckets.iter().enumerate() {
            bucket.check_invariants();
            for (pos, e) in bucket.iter().enumerate() {
                assert_eq!(
                    bucket_index(e.key(), capacity),
                    i,
                    "key {:?} stored in the wrong bucket",
                    e.key()
                );
                let first = bucket.find(|o| o.key() == e.key()).map(|f| f.index);
                assert_eq!(first, Some(pos), "key {:?} stored twice", e.key());
            }
            total += bucket.len();
        }
        assert_eq!(total, self.len, "chain lengths must add up to len");
    }
}

impl<V> Default for ChainedHashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for ChainedHashMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for ChainedHashMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ChainedHashMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ChainedHashMap::new();
        map.extend(iter);
        map
    }
}

/// Iterator over `(key, value)` pairs in bucket order, then chain order.
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Bucket<V>>,
    chain: Option<sequence::Iter<'a, Entry<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((e.key(), e.value()));
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a ChainedHashMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_logger::init_test_logger;
    use std::collections::BTreeMap;

    fn sorted<V: Clone>(m: &ChainedHashMap<V>) -> BTreeMap<String, V> {
        m.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Invariant: a new map is empty with the default capacity.
    #[test]
    fn new_map_is_empty() {
        let m: ChainedHashMap<i32> = ChainedHashMap::new();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
        assert_eq!(m.capacity(), DEFAULT_CAPACITY);
        assert!(m.entries().is_empty());
        assert_eq!(m.get("a"), None);
        assert!(!m.contains_key("a"));
        m.check_layout();
    }

    /// Invariant: `set` on an existing key overwrites in place; len counts keys once.
    #[test]
    fn set_overwrites_without_counting() {
        let mut m = ChainedHashMap::new();
        m.set("k", 1).set("k", 2);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("k"), Some(&2));
        m.check_layout();
    }

    /// Invariant: colliding keys share a bucket chain and stay individually addressable.
    #[test]
    fn colliding_keys_chain_in_one_bucket() {
        // "a", "q" and "ab" all hash to bucket 1 at capacity 16.
        let mut m = ChainedHashMap::new();
        m.set("a", 1).set("q", 2).set("ab", 3);
        assert_eq!(m.buckets[1].len(), 3);
        assert_eq!(m.keys(), vec!["a", "q", "ab"]);

        assert_eq!(m.get("q"), Some(&2));
        assert!(m.remove("q"));
        assert_eq!(m.keys(), vec!["a", "ab"]);
        assert_eq!(m.get("ab"), Some(&3));

        // Overwriting the chain tail keeps its position.
        m.set("ab", 30).set("a", 10);
        assert_eq!(m.entries(), vec![("a", &10), ("ab", &30)]);
        m.check_layout();
    }

    /// Invariant: `remove` and `take` on a missing key leave the map untouched.
    #[test]
    fn remove_missing_is_noop() {
        let mut m = ChainedHashMap::new();
        m.set("a", 1);
        assert!(!m.remove("b"));
        assert_eq!(m.take("q"), None);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("a"), Some(&1));
        m.check_layout();
    }

    /// Invariant: `take` hands back the owned value and forgets the key.
    #[test]
    fn take_returns_value() {
        let mut m = ChainedHashMap::new();
        m.set("s", String::from("value"));
        assert_eq!(m.take("s"), Some(String::from("value")));
        assert!(!m.contains_key("s"));
        assert!(m.is_empty());
    }

    /// Invariant: `get_mut` edits the stored value without touching len.
    #[test]
    fn get_mut_updates_value() {
        let mut m = ChainedHashMap::new();
        m.set("n", 1);
        *m.get_mut("n").unwrap() += 41;
        assert_eq!(m.get("n"), Some(&42));
        assert!(m.get_mut("missing").is_none());
        assert_eq!(m.len(), 1);
    }

    /// Invariant: the 13th distinct insertion at capacity 16 is the first to
    /// exceed the load factor, and growth doubles capacity exactly once.
    #[test]
    fn growth_happens_on_thirteenth_insert() {
        init_test_logger();
        let mut m = ChainedHashMap::new();
        for i in 0..12 {
            m.set(format!("key{i}"), i);
            assert_eq!(m.capacity(), 16, "no growth at len {}", m.len());
        }
        // Overwrites never grow.
        m.set("key0", 100);
        assert_eq!(m.capacity(), 16);

        m.set("key12", 12);
        assert_eq!(m.len(), 13);
        assert_eq!(m.capacity(), 32);
        assert_eq!(m.get("key0"), Some(&100));
        for i in 1..13 {
            assert_eq!(m.get(&format!("key{i}")), Some(&i));
        }
        m.check_layout();
    }

    /// Invariant: growth re-buckets entries by the new capacity.
    #[test]
    fn growth_moves_entries_to_new_buckets() {
        let mut m = ChainedHashMap::new();
        m.set("key0", 0);
        assert_eq!(m.buckets[1].len(), 1);
        for i in 1..13 {
            m.set(format!("key{i}"), i);
        }
        assert_eq!(m.capacity(), 32);
        assert!(m.buckets[1].find(|e| e.key() == "key0").is_none());
        assert!(m.buckets[17].find(|e| e.key() == "key0").is_some());
        m.check_layout();
    }

    /// Invariant: a panic while draining old buckets during growth leaves the
    /// map with its old, non-empty bucket array, so later lookups still hash.
    #[test]
    fn growth_panic_keeps_old_buckets() {
        let mut m = ChainedHashMap::new();
        for i in 0..12 {
            m.set(format!("key{i}"), i);
        }
        let b = bucket_index("key11", DEFAULT_CAPACITY);
        m.buckets[b].free_head_slot();

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            m.set("key12", 12);
        }));
        assert!(res.is_err(), "draining a broken chain must panic");
        assert_eq!(m.capacity(), DEFAULT_CAPACITY);
        assert_eq!(m.get("never-set"), None);
    }

    /// Invariant: removals never shrink the capacity.
    #[test]
    fn remove_does_not_shrink() {
        let mut m = ChainedHashMap::new();
        for i in 0..13 {
            m.set(format!("k{i}"), i);
        }
        assert_eq!(m.capacity(), 32);
        for i in 0..13 {
            assert!(m.remove(&format!("k{i}")));
        }
        assert!(m.is_empty());
        assert_eq!(m.capacity(), 32);
        m.check_layout();
    }

    /// Invariant: `clear` empties the map and restores the default capacity.
    #[test]
    fn clear_resets_capacity() {
        init_test_logger();
        let mut m = ChainedHashMap::new();
        for i in 0..40 {
            m.set(format!("k{i}"), i);
        }
        assert_eq!(m.capacity(), 64);
        m.clear();
        assert_eq!(m.len(), 0);
        assert_eq!(m.capacity(), DEFAULT_CAPACITY);
        assert!(m.entries().is_empty());
        assert!(!m.contains_key("k0"));
        m.check_layout();

        // Cleared maps grow again from the default.
        for i in 0..13 {
            m.set(format!("k{i}"), i);
        }
        assert_eq!(m.capacity(), 32);
    }

    /// Invariant: keys, values, entries and iter all agree on order and length.
    #[test]
    fn materialized_views_agree_with_iter() {
        let m: ChainedHashMap<usize> = (0..50).map(|i| (format!("item{i}"), i)).collect();
        let entries = m.entries();
        assert_eq!(entries.len(), 50);
        assert_eq!(m.iter().len(), 50);
        assert_eq!(entries, m.iter().collect::<Vec<_>>());
        assert_eq!(
            m.keys(),
            entries.iter().map(|(k, _)| *k).collect::<Vec<_>>()
        );
        assert_eq!(
            m.values(),
            entries.iter().map(|(_, v)| *v).collect::<Vec<_>>()
        );
        m.check_layout();
    }

    /// Invariant: `Extend` applies `set` semantics, including overwrites.
    #[test]
    fn extend_overwrites() {
        let mut m: ChainedHashMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        m.extend([("b", 20), ("c", 3)]);
        let expected: BTreeMap<String, i32> =
            [("a", 1), ("b", 20), ("c", 3)].map(|(k, v)| (k.to_string(), v)).into();
        assert_eq!(sorted(&m), expected);
    }

    /// Invariant: `Debug` renders entries in iteration order.
    #[test]
    fn debug_lists_entries() {
        let mut m = ChainedHashMap::new();
        m.set("a", 1).set("b", 2);
        assert_eq!(format!("{:?}", m), r#"{"a": 1, "b": 2}"#);
    }

    /// Invariant: clones are independent.
    #[test]
    fn clone_is_deep() {
        let mut a = ChainedHashMap::new();
        a.set("x", 1);
        let mut b = a.clone();
        b.set("x", 2).set("y", 3);
        assert_eq!(a.get("x"), Some(&1));
        assert!(!a.contains_key("y"));
        assert_eq!(b.len(), 2);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn bucket_lens_sum_to_len() {
        let m: ChainedHashMap<usize> = (0..30).map(|i| (format!("s{i}"), i)).collect();
        let lens = m.bucket_lens();
        assert_eq!(lens.len(), m.capacity());
        assert_eq!(lens.iter().sum::<usize>(), m.len());
    }
}
