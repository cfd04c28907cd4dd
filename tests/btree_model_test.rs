//! Property tests: the tree must behave like a `BTreeMap` under any
//! sequence of upserts, deletes, lookups and range scans.

use std::collections::BTreeMap;

use pagetree::{BPlusTree, TreeOptions, Value};
use proptest::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Clone)]
enum Op {
    Write(i32, u8),
    Delete(i32),
    Read(i32),
    Range(i32, i32),
}

// A narrow key space forces overwrites, deletes of present keys and
// repeated splits of the same leaves.
fn key() -> impl Strategy<Value = i32> {
    -300..300i32
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (key(), any::<u8>()).prop_map(|(k, b)| Op::Write(k, b)),
        2 => key().prop_map(Op::Delete),
        1 => key().prop_map(Op::Read),
        1 => (key(), key()).prop_map(|(a, b)| Op::Range(a, b)),
    ]
}

fn value(k: i32, b: u8) -> Value {
    let mut raw = [b; pagetree::VALUE_SIZE];
    raw[..4].copy_from_slice(&k.to_le_bytes());
    Value::new(raw)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_matches_btreemap(ops in prop::collection::vec(op(), 1..1500)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.idx");
        let mut tree = BPlusTree::open_with_options(
            &path,
            TreeOptions::default().sync_writes(false),
        )
        .unwrap();
        let mut model: BTreeMap<i32, Value> = BTreeMap::new();

        for op in &ops {
            match *op {
                Op::Write(k, b) => {
                    tree.write_data(k, &value(k, b)).unwrap();
                    model.insert(k, value(k, b));
                }
                Op::Delete(k) => {
                    prop_assert_eq!(tree.delete_data(k).unwrap(), model.remove(&k).is_some());
                }
                Op::Read(k) => {
                    prop_assert_eq!(tree.read_data(k).unwrap(), model.get(&k).copied());
                }
                Op::Range(lo, hi) => {
                    let got = tree.read_range_data(lo, hi).unwrap();
                    let expected: Vec<Value> = if lo <= hi {
                        model.range(lo..=hi).map(|(_, v)| *v).collect()
                    } else {
                        Vec::new()
                    };
                    prop_assert_eq!(got, expected);
                }
            }
        }

        let summary = tree.verify().unwrap();
        prop_assert_eq!(summary.key_count, model.len());

        let all: Vec<(i32, Value)> = tree.iter().unwrap().map(|e| e.unwrap()).collect();
        let expected: Vec<(i32, Value)> = model.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(all, expected);

        // Everything survives a reopen.
        tree.close().unwrap();
        let mut tree = BPlusTree::open_with_options(
            &path,
            TreeOptions::default().sync_writes(false),
        )
        .unwrap();
        for (k, v) in &model {
            prop_assert_eq!(tree.read_data(*k).unwrap(), Some(*v));
        }
    }

    #[test]
    fn prop_any_insert_order_gives_sorted_chain(
        keys in prop::collection::hash_set(any::<i32>(), 0..800)
    ) {
        let dir = tempdir().unwrap();
        let mut tree = BPlusTree::open_with_options(
            dir.path().join("order.idx"),
            TreeOptions::default().sync_writes(false),
        )
        .unwrap();

        for &k in &keys {
            tree.write_data(k, &value(k, 0)).unwrap();
        }

        let scanned: Vec<i32> = tree.iter().unwrap().map(|e| e.unwrap().0).collect();
        let mut expected: Vec<i32> = keys.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(scanned, expected);
        tree.verify().unwrap();
    }
}
