#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// bucket layout, which the public API does not expose.

use crate::chained_hash_map::{ChainedHashMap, DEFAULT_CAPACITY, LOAD_FACTOR};
use crate::hash::bucket_index;
use hashbrown::HashMap;
use proptest::prelude::*;

// Ops name keys by position in a generated pool, so a failing case shrinks
// toward fewer keys, lower positions and shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Remove(usize),
    Take(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    // Pools of up to 40 keys push the map through several doublings.
    proptest::collection::vec("[a-z0-9]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Take),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z0-9]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against hashbrown::HashMap.
// Invariants exercised across random operation sequences:
// - `get`/`contains_key` agree with the model; `set` overwrites in place.
// - `remove`/`take` report presence exactly as the model does.
// - Every key sits in `bucket_index(key, capacity)`; chains are consistent and
//   their lengths add up to `len()`.
// - Capacity is the default or a doubling of it, and never holds more than
//   `LOAD_FACTOR * capacity` entries after an operation returns.
// - `clear` restores the default capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<i32> = ChainedHashMap::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = &pool[i];
                    let before = sut.capacity();
                    let already = model.contains_key(k);
                    sut.set(k.as_str(), v);
                    model.insert(k.clone(), v);
                    if already {
                        prop_assert_eq!(sut.capacity(), before, "overwrite must not grow");
                    }
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.remove(k), model.remove(k).is_some());
                    prop_assert!(!sut.contains_key(k));
                }
                OpI::Take(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.take(k), model.remove(k));
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k));
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    match (sut.get_mut(k), model.get_mut(k)) {
                        (Some(sv), Some(mv)) => {
                            *sv = sv.saturating_add(d);
                            *mv = mv.saturating_add(d);
                        }
                        (None, None) => {}
                        (s, m) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m),
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), DEFAULT_CAPACITY);
                }
                OpI::Iterate => {
                    let mut s_entries: Vec<(String, i32)> =
                        sut.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                    let mut m_entries: Vec<(String, i32)> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    s_entries.sort();
                    m_entries.sort();
                    prop_assert_eq!(s_entries, m_entries);
                }
            }

            // Post-conditions after each op
            sut.check_layout();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.len() as f64 <= LOAD_FACTOR * sut.capacity() as f64);
        }
    }
}

// Property: growth fires on exactly the insertion that pushes the load above
// the threshold, and every entry is re-bucketed by the new capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_boundary(keys in proptest::collection::hash_set("[a-z]{1,8}", 1..200)) {
        let mut sut: ChainedHashMap<usize> = ChainedHashMap::new();
        for (n, k) in keys.iter().enumerate() {
            let before = sut.capacity();
            sut.set(k.as_str(), n);
            let expect_growth = (n + 1) as f64 / before as f64 > LOAD_FACTOR;
            let expected = if expect_growth { before * 2 } else { before };
            prop_assert_eq!(sut.capacity(), expected);
        }
        let capacity = sut.capacity();
        for (k, _) in sut.iter() {
            prop_assert!(bucket_index(k, capacity) < capacity);
        }
        for (n, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.get(k), Some(&n));
        }
        sut.check_layout();
    }
}
