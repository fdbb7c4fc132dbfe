// Table property tests under allocation failure.
//
// Property: with an allocator that refuses requests at random points, the
// table stays equivalent to a HashMap that only applies the operations
// that reported success.
//  - Model: std HashMap<Vec<u8>, u32>.
//  - Operations: put, remove, resize, snapshot, and budget changes.
//  - Invariant after every op: len() == model.len(); every model key maps
//    to its value; report() sums to len(); a refused put hands back its
//    value and leaves len() unchanged.
// At the end every acquired byte must have been released.
mod common;

use bytetable::{KeyMode, Table};
use common::Tracking;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Put(u8, u32),
    Remove(u8),
    Resize(usize),
    Keys(bool),
    Budget(Option<usize>),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0u8..32, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0u8..32).prop_map(Op::Remove),
        1 => prop_oneof![Just(0usize), 2usize..64].prop_map(Op::Resize),
        1 => any::<bool>().prop_map(Op::Keys),
        2 => proptest::option::of(0usize..6).prop_map(Op::Budget),
    ]
}

fn key_of(k: u8) -> Vec<u8> {
    format!("key-{k}").into_bytes()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_failures_never_corrupt(buckets in 1usize..8, ops in proptest::collection::vec(arb_op(), 1..120)) {
        let a = Tracking::new();
        {
            let mut t = Table::try_new_in(buckets, &a).unwrap();
            let mut model: HashMap<Vec<u8>, u32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Put(k, v) => {
                        let key = key_of(k);
                        let before = t.len();
                        match t.put(&key, v) {
                            Ok(prev) => {
                                prop_assert_eq!(prev, model.insert(key, v));
                            }
                            Err(err) => {
                                prop_assert!(!model.contains_key(&key), "replacing never allocates");
                                prop_assert_eq!(err.into_value(), v);
                                prop_assert_eq!(t.len(), before);
                                prop_assert!(!t.has_key(&key));
                            }
                        }
                    }
                    Op::Remove(k) => {
                        let key = key_of(k);
                        prop_assert_eq!(t.remove(&key), model.remove(&key));
                    }
                    Op::Resize(n) => {
                        let before = t.num_buckets();
                        let n = if n == 0 && before >= 1024 { 5 } else { n };
                        let wanted = if n == 0 { before * 2 } else { n };
                        let got = t.resize(n);
                        prop_assert!(got == wanted || got == before);
                        prop_assert_eq!(t.num_buckets(), got);
                    }
                    Op::Keys(copy) => {
                        let mode = if copy { KeyMode::Copied } else { KeyMode::Borrowed };
                        if let Ok(keys) = t.keys(mode) {
                            prop_assert_eq!(keys.len(), model.len());
                            let got: BTreeSet<Vec<u8>> = keys.iter().map(|k| k.bytes().to_vec()).collect();
                            let want: BTreeSet<Vec<u8>> = model.keys().cloned().collect();
                            prop_assert_eq!(got, want);
                        }
                    }
                    Op::Budget(b) => a.set_budget(b),
                }

                prop_assert_eq!(t.len(), model.len());
                for (k, v) in &model {
                    prop_assert_eq!(t.get(k), Some(v));
                }
                let mut sizes = vec![0usize; t.num_buckets()];
                t.report(&mut sizes);
                prop_assert_eq!(sizes.iter().sum::<usize>(), t.len());
            }
        }
        prop_assert_eq!(a.live_bytes(), 0);
        prop_assert_eq!(a.acquired(), a.released());
    }
}
