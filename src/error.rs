//! Error types returned by the map.

use thiserror::Error;

/// Errors surfaced by the public `IntHashMap` API.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key has no live entry.
    #[error("not a valid key: {key}")]
    KeyNotFound { key: i64 },
}

/// A full probe cycle found neither the key nor an admissible slot.
///
/// Only reachable if every slot is occupied or tombstoned, which the growth
/// policy rules out for non-frozen tables.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no admissible slot in a table of capacity {capacity}")]
pub struct TableFull {
    pub capacity: usize,
}
