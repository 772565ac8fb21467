//! Randomized operation sequences checked against a std oracle.
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::HashSet;

#[derive(Debug)]
pub(crate) enum Operation<K> {
    Insert(K),
    Remove(K),
    /// Compare a single membership answer against the oracle.
    Probe(K),
    /// Audit the trie and sweep every oracle key through `contains`.
    Check,
}

pub(crate) fn run_ops<K>(ops: impl IntoIterator<Item = Operation<K>>)
where
    K: Hash + Eq + Ord + Clone + Debug,
{
    let mut oracle = BTreeSet::new();
    let mut set = HashSet::new();
    for op in ops {
        match op {
            Operation::Insert(k) => {
                assert_eq!(oracle.contains(&k), set.contains(&k));
                oracle.insert(k.clone());
                set.insert(k.clone());
                assert!(set.contains(&k));
                assert_eq!(oracle.len(), set.len());
            }
            Operation::Remove(k) => {
                assert_eq!(oracle.contains(&k), set.contains(&k));
                assert_eq!(oracle.remove(&k), set.remove(&k));
                assert!(!set.contains(&k));
                assert_eq!(oracle.len(), set.len());
            }
            Operation::Probe(k) => {
                assert_eq!(oracle.contains(&k), set.contains(&k));
            }
            Operation::Check => {
                set.check();
                for k in &oracle {
                    assert!(set.contains(k));
                }
            }
        }
    }
}

/// Two keys per `u64`, hashed only by the first field, so every pair shares
/// a full 64-bit hash and lands in one leaf.
#[derive(Copy, Clone, Eq, PartialOrd, Ord, Debug)]
pub(crate) struct Collider(pub(crate) u64, pub(crate) u64);

impl Hash for Collider {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl PartialEq for Collider {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

/// Rewrite a `u64` workload so every operation touches a colliding pair.
pub(crate) fn with_collisions(ops: Vec<Operation<u64>>) -> Vec<Operation<Collider>> {
    let mut out = Vec::with_capacity(ops.len() * 2);
    for op in ops {
        match op {
            Operation::Insert(i) => {
                out.push(Operation::Insert(Collider(i, 0)));
                out.push(Operation::Insert(Collider(i, 1)));
            }
            Operation::Remove(i) => {
                out.push(Operation::Remove(Collider(i, 0)));
                out.push(Operation::Remove(Collider(i, 1)));
            }
            Operation::Probe(i) => {
                out.push(Operation::Probe(Collider(i, 0)));
                out.push(Operation::Probe(Collider(i, 1)));
            }
            Operation::Check => out.push(Operation::Check),
        }
    }
    out
}

const N: usize = 1000;

pub(crate) fn insert_remove_dense() -> Vec<Operation<u64>> {
    let mut ops: Vec<_> = (0..N as u64).map(Operation::Insert).collect();
    ops.push(Operation::Check);
    ops.extend((0..N as u64).map(Operation::Remove));
    ops.push(Operation::Check);
    ops
}

pub(crate) fn insert_remove_sparse() -> Vec<Operation<u64>> {
    let distinct: BTreeSet<u64> = (0..N).map(|_| rand::random()).collect();
    let in_sequence: Vec<u64> = distinct.into_iter().collect();
    let (present, absent) = in_sequence.split_at(in_sequence.len() / 2);
    let mut ops: Vec<_> = present.iter().copied().map(Operation::Insert).collect();
    ops.push(Operation::Check);
    ops.extend(absent.iter().copied().map(Operation::Probe));
    ops.extend(absent.iter().copied().map(Operation::Remove));
    ops.push(Operation::Check);
    ops.extend(present.iter().copied().map(Operation::Remove));
    ops.push(Operation::Check);
    ops
}

pub(crate) fn halves() -> Vec<Operation<u64>> {
    let mut rng = rand::thread_rng();
    let distinct: BTreeSet<u64> = (0..N).map(|_| rng.gen()).collect();
    let mut keys: Vec<u64> = distinct.into_iter().collect();
    keys.shuffle(&mut rng);
    let mut ops: Vec<_> = keys.iter().copied().map(Operation::Insert).collect();
    ops.push(Operation::Check);
    keys.shuffle(&mut rng);
    let half = keys.len() / 2;
    ops.extend(keys[..half].iter().copied().map(Operation::Remove));
    ops.extend(keys.iter().copied().map(Operation::Probe));
    ops.push(Operation::Check);
    ops
}

/// Inserts and removals drawn from a narrow key range, so slots fill up,
/// split, and collapse over and over.
pub(crate) fn churn() -> Vec<Operation<u64>> {
    let mut rng = rand::thread_rng();
    let mut ops = Vec::with_capacity(4 * N + 4 * N / 256 + 1);
    for i in 0..4 * N {
        let key = rng.gen_range(0..256);
        if rng.gen_bool(0.5) {
            ops.push(Operation::Insert(key));
        } else {
            ops.push(Operation::Remove(key));
        }
        if i % 256 == 0 {
            ops.push(Operation::Check);
        }
    }
    ops.push(Operation::Check);
    ops
}

/// A random printable string, length 0..256. Never contains '~', so callers
/// can append it to build keys that are guaranteed absent.
pub(crate) fn random_word(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(0..256);
    (0..len).map(|_| rng.gen_range(32u8..126) as char).collect()
}
