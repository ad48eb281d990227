//! Slot storage cells.

#[derive(Debug, Clone)]
pub(crate) struct Entry<T> {
    pub key: i64,
    pub value: T,
}

/// One cell of the backing array.
#[derive(Debug, Clone)]
pub(crate) enum Slot<T> {
    Empty,
    Occupied(Entry<T>),
    /// Left behind by an erase. Never matches a lookup but can be reused
    /// by an insert.
    Tombstone,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> Slot<T> {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<&Entry<T>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut Entry<T>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    /// Replaces an occupied slot with a tombstone, yielding the entry.
    pub(crate) fn bury(&mut self) -> Option<Entry<T>> {
        match core::mem::replace(self, Slot::Tombstone) {
            Slot::Occupied(e) => Some(e),
            other => {
                *self = other;
                None
            }
        }
    }
}
