//! bytetable: a single-threaded hash table from byte-string keys to
//! caller values, with the hash function and the allocator supplied by the
//! caller.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) average access with bounded chains, while letting any
//!   allocation fail without leaving the table half modified.
//! - Layers:
//!   - Hash port (`KeyHasher`): a pure function from key bytes to `u32`.
//!     Defaults to the "multiply by 31" polynomial.
//!   - Allocator port: `allocator_api2::alloc::Allocator`. Every buffer the
//!     table owns lives in the caller's allocator.
//!   - Element arena: slots holding the key copy, its hashcode, the value
//!     and the next link of its chain; vacant slots form a free list.
//!   - Table: the bucket array of chain heads over the arena, plus resize,
//!     iteration and key snapshots.
//!
//! Constraints
//! - Single-threaded; no locks, no atomics.
//! - Keys are byte slices with explicit length; each is copied once at
//!   insertion with a trailing NUL and never reallocated afterwards.
//! - Values are stored as given. The table never clones them; `V` is
//!   whatever handle the caller wants kept (`&T`, `Rc<T>`, an index).
//! - Every element sits in bucket `hashcode % num_buckets`.
//!
//! Growth
//! - `put` only considers growing when the new key collides with an
//!   existing chain and `len >= num_buckets * load_factor`. The bucket
//!   count then doubles. A load factor `<= 0` disables this.
//! - `resize` relinks elements into a fresh bucket array using the stored
//!   hashcodes; nothing is rehashed and no element is reallocated.
//!
//! Failure
//! - Allocation failure is reported as a `Result` from the operation that
//!   hit it; the table is unchanged. Debug builds also emit a `tracing`
//!   warning. `resize` on failure keeps the old bucket count.
//! - Misuse (a resize to one bucket) panics.
//!
//! Notes and non-goals
//! - No ordering across keys; iteration follows bucket index, then chain
//!   order (most recently chained first).
//! - Mutating the table while iterating or while a borrowed key snapshot
//!   is alive does not compile.
//! - No persistence, no concurrent access.

mod alloc;
mod element;
pub mod error;
pub mod hash;
pub mod keys;
mod render;
pub mod table;
mod table_proptest;

// Public surface
pub use alloc::{AllocError, Global};
pub use allocator_api2::alloc::Allocator;
pub use error::{InsertError, TableError};
pub use hash::{kr2_hashcode, KeyHasher, Kr2Hasher};
pub use keys::{Key, KeyMode, Keys};
pub use table::{Iter, Table, DEFAULT_BUCKETS, DEFAULT_LOAD_FACTOR};
