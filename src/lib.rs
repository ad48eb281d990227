//! int-hashmap: an open-addressing hash map with integer keys, in-place
//! tombstone deletion and dynamic capacity, shareable across threads.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a drop-in associative map for `i64` keys that many threads can
//!   mutate, built in layers that each carry a small contract.
//! - Layers:
//!   - `Probe`: the cyclic index sequence `h0 = key mod capacity`,
//!     `h(i+1) = h(i) + 3571 mod capacity`. Capacity is always a power of
//!     two, so the odd stride visits every slot once per cycle.
//!   - `Slot`: `Empty`, `Occupied(Entry)` or `Tombstone`. The tombstone
//!     marker lives in the slot itself rather than a parallel bit array.
//!   - `RawTable<T>`: single-threaded structural layer. Owns the slot array
//!     plus `live`/`filled` counters and the capacity manager.
//!   - `IntHashMap<T>`: public API. Wraps `RawTable` in a
//!     `parking_lot::RwLock` and hands out mapped guards.
//!
//! Constraints
//! - `live <= filled <= capacity`; `filled` counts tombstones too.
//! - A live key sits in exactly one slot, reachable along its probe
//!   sequence before any empty slot.
//! - Capacity is 0 only before the first insert (or after `clear`/`take`).
//!
//! Capacity manager
//! - Before an insert into a table with `filled == capacity`: grow 0 -> 1,
//!   halve if fewer than a quarter of the slots are live, otherwise double.
//! - `shrink()` applies the quarter rule on demand.
//! - A resize builds a fresh table, marks it frozen so it cannot resize
//!   itself while being refilled, reinserts every live entry through the
//!   normal insert path and then replaces the old storage in one step.
//!   Tombstones never survive a resize.
//!
//! Locking
//! - Writers (`insert`, `get_or_default`, `erase`, `shrink`, `clear`,
//!   `take`) hold the write lock for their whole duration, resize
//!   included. Readers hold the read lock, so no reader can see a table
//!   mid-swap.
//! - `Ref`/`RefMut` guards keep the lock; holding one while calling a
//!   writer from the same thread deadlocks.
//!
//! Errors
//! - Missing keys surface as `Option` from lookups and as
//!   `Error::KeyNotFound` from `try_get` and `erase`.
//! - `TableFull` is internal. Growth makes it unreachable, so the public
//!   insert paths treat it as an invariant violation and panic.
//!
//! Notes and non-goals
//! - No iteration API and no ordered traversal.
//! - Keys are fixed to `i64`.
//! - The optional `tracing` feature traces resizes and moves.

mod cfg;
mod error;
mod map;
mod probe;
mod slot;
mod table;
mod table_proptest;

// Public surface
pub use error::Error;
pub use map::{IntHashMap, Ref, RefMut};
