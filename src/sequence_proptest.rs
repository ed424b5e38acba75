#![cfg(test)]

// Property tests for Sequence against a Vec model. Kept in-crate so every
// step can run the structural invariant check.

use crate::sequence::Sequence;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum SeqOp {
    Append(i16),
    RemoveAt(usize),
    At(usize),
    SetAt(usize, i16),
    Find(i16),
    FindMut(i16, i16),
    ForEach,
}

fn arb_ops() -> impl Strategy<Value = Vec<SeqOp>> {
    // Indices overshoot the usual length so out-of-range paths get hit.
    let op = prop_oneof![
        4 => any::<i16>().prop_map(SeqOp::Append),
        2 => (0usize..24).prop_map(SeqOp::RemoveAt),
        2 => (0usize..24).prop_map(SeqOp::At),
        1 => (0usize..24, any::<i16>()).prop_map(|(i, v)| SeqOp::SetAt(i, v)),
        2 => (-4i16..4).prop_map(SeqOp::Find),
        1 => (-4i16..4, any::<i16>()).prop_map(|(m, v)| SeqOp::FindMut(m, v)),
        1 => Just(SeqOp::ForEach),
    ];
    proptest::collection::vec(op, 1..100)
}

// Property: Sequence behaves like a Vec under append, positional access and
// removal, and predicate search.
// - `remove_at`/`at` return `None` exactly when the index is out of range.
// - `find` reports the first matching element and its index.
// - `for_each`/`iter` visit elements in model order.
// - head/tail/len stay consistent after every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_vec_model(ops in arb_ops()) {
        let mut sut: Sequence<i16> = Sequence::new();
        let mut model: Vec<i16> = Vec::new();

        for op in ops {
            match op {
                SeqOp::Append(v) => {
                    sut.append(v % 4);
                    model.push(v % 4);
                }
                SeqOp::RemoveAt(i) => {
                    let expected = (i < model.len()).then(|| model.remove(i));
                    prop_assert_eq!(sut.remove_at(i), expected);
                }
                SeqOp::At(i) => {
                    prop_assert_eq!(sut.at(i), model.get(i));
                }
                SeqOp::SetAt(i, v) => {
                    match (sut.at_mut(i), model.get_mut(i)) {
                        (Some(s), Some(m)) => {
                            *s = v;
                            *m = v;
                        }
                        (None, None) => {}
                        (s, m) => prop_assert!(false, "at_mut mismatch: {:?} vs {:?}", s, m),
                    }
                }
                SeqOp::Find(needle) => {
                    let found = sut.find(|v| *v == needle).map(|f| (*f.value, f.index));
                    let expected = model.iter().position(|v| *v == needle).map(|i| (needle, i));
                    prop_assert_eq!(found, expected);
                }
                SeqOp::FindMut(needle, v) => {
                    let found = sut.find_mut(|x| *x == needle).map(|f| {
                        *f.value = v;
                        f.index
                    });
                    let expected = model.iter().position(|x| *x == needle);
                    if let Some(i) = expected {
                        model[i] = v;
                    }
                    prop_assert_eq!(found, expected);
                }
                SeqOp::ForEach => {
                    let mut seen = Vec::with_capacity(sut.len());
                    sut.for_each(|v| seen.push(*v));
                    prop_assert_eq!(&seen, &model);
                }
            }

            sut.check_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.iter().copied().collect::<Vec<_>>(), model.clone());
        }
    }
}
