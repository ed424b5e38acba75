//! chain-hashmap: a single-threaded, string-keyed map built from
//! separate chaining over singly-linked buckets.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the map in two small layers so each can be checked on its
//!   own.
//! - Layers:
//!   - Sequence<T>: singly-linked ordered storage with O(1) append,
//!     O(index) positional access/removal, predicate search and in-order
//!     traversal. Nodes live in a slot arena; links are arena keys.
//!   - ChainedHashMap<V>: an array of `Sequence`s ("buckets"). Every
//!     operation hashes the key to a bucket and runs one `Sequence`
//!     operation there; `set` may then double the bucket array.
//!
//! Hashing and growth
//! - `bucket_index` folds the key's UTF-16 code units with
//!   `h = (31 * h + unit) % capacity`, reducing at every step. Because the
//!   result depends on the capacity, growth is a full rehash: every entry
//!   is moved into a fresh array of twice as many buckets.
//! - Growth is checked only after `set` inserts a new key, and fires when
//!   `len / capacity > 0.75`. With the default 16 buckets that is the 13th
//!   entry. Removals never shrink the array; `clear` resets it to 16.
//!
//! Failure model
//! - Absence (missing key, out-of-range index) is `None` or `false`.
//! - A broken structural invariant (for example a head without a tail)
//!   is a bug and panics with the invariant's name.
//!
//! Notes and non-goals
//! - Single-threaded: no interior mutability, so `&`/`&mut` are the only
//!   access discipline.
//! - Keys are `String`s compared by value; there is no pluggable hasher.
//! - Iteration order is bucket order, then chain order, and changes
//!   whenever the map grows.

mod chained_hash_map;
mod chained_hash_map_proptest;
mod entry;
pub mod hash;
pub mod sequence;
mod sequence_proptest;
mod test_logger;

// Public surface
pub use chained_hash_map::{ChainedHashMap, Iter, DEFAULT_CAPACITY, LOAD_FACTOR};
pub use hash::bucket_index;
pub use sequence::{Found, FoundMut, Sequence};
