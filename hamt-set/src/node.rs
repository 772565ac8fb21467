//! Underlying trie representation for the set.
use std::hash::{Hash, Hasher};
use std::mem;

use rustc_hash::FxHasher;

/// How many hash bits each trie level consumes.
pub(crate) const BITS_PER_LEVEL: u32 = 6;

/// Fanout of every node; also the size of the root table.
pub(crate) const FANOUT: usize = 1 << BITS_PER_LEVEL;

/// Mask selecting the hash bits for the current level.
pub(crate) const LEVEL_MASK: u64 = FANOUT as u64 - 1;

/// One cell of a node's child array.
///
/// A slot owns whatever it points at; overwriting a slot drops the subtree
/// rooted below it.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K> {
    Empty,
    Leaf(Box<Leaf<K>>),
    Node(Box<Interior<K>>),
}

/// A terminal bucket.
///
/// Holds every key whose hash collided along the whole path down to this
/// slot. The common case is a single key; more than one means the keys share
/// their entire 64-bit hash.
#[derive(Clone, Debug)]
pub(crate) struct Leaf<K> {
    /// The keys' hash, right-shifted 6 bits for each level above this leaf.
    /// Cached so pushing the leaf deeper never re-hashes its keys.
    hash: u64,
    /// Keys in insertion order. Never empty, never contains duplicates.
    keys: Vec<K>,
}

impl<K> Leaf<K> {
    fn new(hash: u64, key: K) -> Leaf<K> {
        Leaf {
            hash,
            keys: vec![key],
        }
    }
}

/// An interior node: a 64-bit occupancy bitmap plus a child array with one
/// slot per set bit, kept in ascending order of the 6-bit index.
#[derive(Clone, Debug)]
pub(crate) struct Interior<K> {
    bitmap: u64,
    children: Box<[Slot<K>]>,
}

impl<K> Interior<K> {
    fn bit(idx: u64) -> u64 {
        debug_assert!(idx < FANOUT as u64);
        1 << idx
    }

    fn occupied(&self, idx: u64) -> bool {
        self.bitmap & Self::bit(idx) != 0
    }

    /// Dense position of `idx`: the number of occupied indices below it.
    fn position(&self, idx: u64) -> usize {
        (self.bitmap & (Self::bit(idx) - 1)).count_ones() as usize
    }

    fn len(&self) -> usize {
        self.bitmap.count_ones() as usize
    }

    fn child(&self, idx: u64) -> &Slot<K> {
        debug_assert!(self.occupied(idx));
        &self.children[self.position(idx)]
    }

    fn child_mut(&mut self, idx: u64) -> &mut Slot<K> {
        debug_assert!(self.occupied(idx));
        let at = self.position(idx);
        &mut self.children[at]
    }

    fn single(idx: u64, child: Slot<K>) -> Interior<K> {
        Interior {
            bitmap: Self::bit(idx),
            children: Box::new([child]),
        }
    }

    fn pair(idx_a: u64, a: Slot<K>, idx_b: u64, b: Slot<K>) -> Interior<K> {
        debug_assert_ne!(idx_a, idx_b);
        let children: Box<[Slot<K>]> = if idx_a < idx_b {
            Box::new([a, b])
        } else {
            Box::new([b, a])
        };
        Interior {
            bitmap: Self::bit(idx_a) | Self::bit(idx_b),
            children,
        }
    }

    /// Re-allocate the child array one slot wider, placing `child` at the
    /// previously vacant `idx`.
    fn add_child(&mut self, idx: u64, child: Slot<K>) {
        debug_assert!(!self.occupied(idx));
        let at = self.position(idx);
        let mut rest = mem::take(&mut self.children).into_vec().into_iter();
        let mut grown = Vec::with_capacity(rest.len() + 1);
        grown.extend(rest.by_ref().take(at));
        grown.push(child);
        grown.extend(rest);
        self.children = grown.into_boxed_slice();
        self.bitmap |= Self::bit(idx);
    }

    /// Re-allocate the child array one slot narrower, dropping the child at
    /// `idx`. The caller must leave at least one child behind.
    fn remove_child(&mut self, idx: u64) {
        debug_assert!(self.occupied(idx));
        debug_assert!(self.len() > 1);
        let at = self.position(idx);
        let mut shrunk = mem::take(&mut self.children).into_vec();
        shrunk.remove(at);
        self.children = shrunk.into_boxed_slice();
        self.bitmap &= !Self::bit(idx);
    }
}

impl<K: Eq> Slot<K> {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Insert `key` into the subtree rooted at this slot. `h` is the portion
    /// of the key's hash not yet consumed on the way down. Returns whether a
    /// new key was added.
    pub(crate) fn insert(&mut self, h: u64, key: K) -> bool {
        match self {
            Slot::Empty => {
                *self = Slot::Leaf(Box::new(Leaf::new(h, key)));
                true
            }
            Slot::Leaf(leaf) => {
                if leaf.hash == h {
                    // Remaining hash bits agree entirely, so the leaf keeps
                    // the key. Equal keys are left alone.
                    if leaf.keys.iter().any(|k| *k == key) {
                        return false;
                    }
                    leaf.keys.push(key);
                    return true;
                }
                let idx = h & LEVEL_MASK;
                let other_idx = leaf.hash & LEVEL_MASK;
                let Slot::Leaf(mut other) = mem::replace(self, Slot::Empty) else {
                    unreachable!()
                };
                other.hash >>= BITS_PER_LEVEL;
                if idx != other_idx {
                    // The hashes part ways at the next level. One new node
                    // holds the old leaf and a fresh leaf for `key`.
                    let new = Slot::Leaf(Box::new(Leaf::new(h >> BITS_PER_LEVEL, key)));
                    *self = Slot::Node(Box::new(Interior::pair(
                        idx,
                        new,
                        other_idx,
                        Slot::Leaf(other),
                    )));
                    true
                } else {
                    // Same index at the next level too: push the old leaf
                    // down one level and retry until the hashes diverge.
                    *self = Slot::Node(Box::new(Interior::single(other_idx, Slot::Leaf(other))));
                    self.insert(h, key)
                }
            }
            Slot::Node(node) => {
                let idx = h & LEVEL_MASK;
                if node.occupied(idx) {
                    node.child_mut(idx).insert(h >> BITS_PER_LEVEL, key)
                } else {
                    let leaf = Slot::Leaf(Box::new(Leaf::new(h >> BITS_PER_LEVEL, key)));
                    node.add_child(idx, leaf);
                    true
                }
            }
        }
    }

    /// Whether `key` is stored in the subtree rooted at this slot.
    pub(crate) fn contains(&self, h: u64, key: &K) -> bool {
        match self {
            Slot::Empty => false,
            Slot::Leaf(leaf) => leaf.hash == h && leaf.keys.iter().any(|k| k == key),
            Slot::Node(node) => {
                let idx = h & LEVEL_MASK;
                node.occupied(idx) && node.child(idx).contains(h >> BITS_PER_LEVEL, key)
            }
        }
    }

    /// Remove `key` from the subtree rooted at this slot, leaving the slot
    /// empty if its subtree held no other key. Returns whether the key was
    /// present.
    pub(crate) fn remove(&mut self, h: u64, key: &K) -> bool {
        match self {
            Slot::Empty => false,
            Slot::Leaf(leaf) => {
                if leaf.hash != h {
                    return false;
                }
                let Some(at) = leaf.keys.iter().position(|k| k == key) else {
                    return false;
                };
                leaf.keys.remove(at);
                if leaf.keys.is_empty() {
                    *self = Slot::Empty;
                }
                true
            }
            Slot::Node(node) => {
                let idx = h & LEVEL_MASK;
                if !node.occupied(idx) {
                    return false;
                }
                let removed = node.child_mut(idx).remove(h >> BITS_PER_LEVEL, key);
                if removed && node.child(idx).is_empty() {
                    if node.len() == 1 {
                        // Last subtree gone; the node goes with it.
                        *self = Slot::Empty;
                    } else {
                        node.remove_child(idx);
                    }
                }
                removed
            }
        }
    }
}

/// The root of the trie: a fixed table of 64 slots addressed directly by the
/// low 6 bits of the hash. Every index is always addressable, so unlike
/// interior nodes the root needs no bitmap and no popcount.
#[derive(Clone, Debug)]
pub(crate) struct Table<K> {
    slots: [Slot<K>; FANOUT],
}

impl<K> Default for Table<K> {
    fn default() -> Table<K> {
        Table {
            slots: std::array::from_fn(|_| Slot::Empty),
        }
    }
}

impl<K: Eq> Table<K> {
    pub(crate) fn insert(&mut self, h: u64, key: K) -> bool {
        self.slots[(h & LEVEL_MASK) as usize].insert(h >> BITS_PER_LEVEL, key)
    }

    pub(crate) fn contains(&self, h: u64, key: &K) -> bool {
        self.slots[(h & LEVEL_MASK) as usize].contains(h >> BITS_PER_LEVEL, key)
    }

    pub(crate) fn remove(&mut self, h: u64, key: &K) -> bool {
        self.slots[(h & LEVEL_MASK) as usize].remove(h >> BITS_PER_LEVEL, key)
    }
}

pub(crate) fn hash_value(k: &impl Hash) -> u64 {
    let mut hasher = FxHasher::default();
    k.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
impl<K: Eq + Hash> Table<K> {
    /// Walk the whole trie verifying its structural invariants. Returns the
    /// number of keys found.
    pub(crate) fn audit(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| audit_slot(slot, i as u64, BITS_PER_LEVEL))
            .sum()
    }

    /// Whether every root slot is vacant.
    pub(crate) fn is_unoccupied(&self) -> bool {
        self.slots.iter().all(Slot::is_empty)
    }
}

/// Check one subtree: bitmaps sized to their child arrays, no empty leaves
/// or childless nodes, and every key's hash spelling out the path that leads
/// to it. `path` holds the `consumed` hash bits used to get here.
#[cfg(test)]
fn audit_slot<K: Eq + Hash>(slot: &Slot<K>, path: u64, consumed: u32) -> usize {
    match slot {
        Slot::Empty => 0,
        Slot::Leaf(leaf) => {
            assert!(!leaf.keys.is_empty(), "leaf with no keys");
            for key in &leaf.keys {
                let full = hash_value(key);
                if consumed < 64 {
                    assert_eq!(full & ((1u64 << consumed) - 1), path);
                    assert_eq!(full >> consumed, leaf.hash);
                } else {
                    assert_eq!(full, path);
                    assert_eq!(leaf.hash, 0);
                }
            }
            leaf.keys.len()
        }
        Slot::Node(node) => {
            assert!(consumed < 64, "node deeper than the hash reaches");
            assert!(node.len() >= 1, "childless interior node");
            assert_eq!(node.children.len(), node.len());
            let mut total = 0;
            for idx in 0..FANOUT as u64 {
                if !node.occupied(idx) {
                    continue;
                }
                let child = node.child(idx);
                assert!(!child.is_empty(), "vacant slot inside a child array");
                total += audit_slot(child, path | (idx << consumed), consumed + BITS_PER_LEVEL);
            }
            total
        }
    }
}
