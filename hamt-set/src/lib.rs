//! An in-memory set backed by a hash array mapped trie (HAMT).
//!
//! The trie consumes a key's 64-bit hash six bits at a time, giving every
//! node a fanout of 64. Interior nodes pair a 64-bit occupancy bitmap with a
//! child array sized to exactly the number of set bits; a popcount over the
//! bitmap turns a hash fragment into an index into that dense array, so
//! sparse nodes never pay for 64 slots. The root level is different: it is a
//! plain 64-entry table whose slots are all permanently addressable, sparing
//! the hottest level the bitmap bookkeeping.
//!
//! # Hashing
//! The set does not let callers customize the hash function; keys are hashed
//! with `FxHasher`. Hash quality affects the depth distribution of the trie
//! but never correctness: keys that collide on their full 64-bit hash are
//! kept together in one leaf and told apart by equality.
//!
//! # Ownership
//! Every leaf and interior node is owned by exactly one slot of its parent.
//! Nothing is shared or reference-counted. Dropping the set, or overwriting
//! a slot during removal, tears down the whole subtree below it, and
//! removals that empty a subtree collapse the chain of nodes that led to it.

pub(crate) mod node;
pub(crate) mod set;
#[cfg(test)]
pub(crate) mod test_workloads;

pub use set::HashSet;
