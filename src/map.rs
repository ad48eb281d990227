//! IntHashMap: public thread-safe surface over `RawTable`.

use crate::cfg::trace;
use crate::error::Error;
use crate::table::RawTable;
use core::fmt;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// Shared borrow of a value; holds the map's read lock until dropped.
pub type Ref<'a, T> = MappedRwLockReadGuard<'a, T>;

/// Exclusive borrow of a value; holds the map's write lock until dropped.
pub type RefMut<'a, T> = MappedRwLockWriteGuard<'a, T>;

/// An open-addressing hash map from `i64` keys to `T`, safe to share across
/// threads.
///
/// Every mutation runs under an exclusive lock for its whole duration,
/// including any resize it triggers, so concurrent writers are
/// linearizable. Readers share the lock and never observe a resize
/// half-way through.
///
/// Returned [`Ref`]/[`RefMut`] guards keep the lock held; drop them before
/// calling a mutating method on the same map from the same thread.
pub struct IntHashMap<T> {
    table: RwLock<RawTable<T>>,
}

impl<T> IntHashMap<T> {
    /// Creates an empty map. No slots are allocated until the first insert.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(RawTable::new()),
        }
    }

    /// Creates an empty map with at least `capacity` slots, rounded up to a
    /// power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(RawTable::with_capacity(capacity)),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Number of slots, live or not.
    pub fn capacity(&self) -> usize {
        self.table.read().capacity()
    }

    pub fn contains(&self, key: i64) -> bool {
        self.table.read().contains(key)
    }

    /// Returns a guard to the value for `key`, or `None` if absent.
    pub fn get(&self, key: i64) -> Option<Ref<'_, T>> {
        RwLockReadGuard::try_map(self.table.read(), |t| t.get(key)).ok()
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if `key` has no live entry.
    pub fn try_get(&self, key: i64) -> Result<Ref<'_, T>, Error> {
        self.get(key).ok_or(Error::KeyNotFound { key })
    }

    /// Returns a copy of the value for `key`.
    pub fn get_cloned(&self, key: i64) -> Option<T>
    where
        T: Clone,
    {
        self.table.read().get(key).cloned()
    }

    /// Mutable access without locking, through exclusive ownership.
    pub fn get_mut(&mut self, key: i64) -> Option<&mut T> {
        self.table.get_mut().get_mut(key)
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was live.
    ///
    /// # Panics
    ///
    /// If the table reports no admissible slot after growth. The growth
    /// policy makes this unreachable; the map is left unchanged if it does
    /// happen.
    pub fn insert(&self, key: i64, value: T) -> Option<T> {
        let mut table = self.table.write();
        table.insert(key, value).unwrap_or_else(|full| panic!("{full}"))
    }

    /// Returns a guard to the value for `key`, inserting the value produced
    /// by `default` first if the key is absent.
    ///
    /// # Panics
    ///
    /// Under the same condition as [`insert`](Self::insert).
    pub fn get_or_insert_with<F>(&self, key: i64, default: F) -> RefMut<'_, T>
    where
        F: FnOnce() -> T,
    {
        RwLockWriteGuard::map(self.table.write(), |t| {
            t.get_or_insert_with(key, default)
                .unwrap_or_else(|full| panic!("{full}"))
        })
    }

    /// Returns a guard to the value for `key`, inserting `T::default()` first
    /// if the key is absent.
    pub fn get_or_default(&self, key: i64) -> RefMut<'_, T>
    where
        T: Default,
    {
        self.get_or_insert_with(key, T::default)
    }

    /// Removes `key`, returning its value. The slot becomes a tombstone.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if `key` has no live entry.
    pub fn erase(&self, key: i64) -> Result<T, Error> {
        self.table.write().erase(key).ok_or(Error::KeyNotFound { key })
    }

    /// Halves the capacity when fewer than a quarter of the slots are live.
    /// Returns whether the table was rebuilt.
    pub fn shrink(&self) -> bool {
        self.table.write().shrink()
    }

    /// Drops every entry and releases the slot storage.
    pub fn clear(&self) {
        *self.table.write() = RawTable::new();
    }

    /// Moves the contents into a new map, leaving `self` empty with no slots.
    pub fn take(&self) -> IntHashMap<T> {
        let table = core::mem::take(&mut *self.table.write());
        trace!("moved out table with {} live entries", table.len());
        IntHashMap {
            table: RwLock::new(table),
        }
    }
}

impl<T> Default for IntHashMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for IntHashMap<T> {
    /// Copies the table while holding the source's read lock.
    fn clone(&self) -> Self {
        let table = self.table.read().clone();
        Self {
            table: RwLock::new(table),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        let table = source.table.read().clone();
        *self.table.get_mut() = table;
    }
}

impl<T> fmt::Debug for IntHashMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read();
        f.debug_struct("IntHashMap")
            .field("len", &table.len())
            .field("filled", &table.filled())
            .field("capacity", &table.capacity())
            .finish()
    }
}

impl<T> Extend<(i64, T)> for IntHashMap<T> {
    fn extend<I: IntoIterator<Item = (i64, T)>>(&mut self, iter: I) {
        let table = self.table.get_mut();
        for (key, value) in iter {
            table.insert(key, value).unwrap_or_else(|full| panic!("{full}"));
        }
    }
}

impl<T> FromIterator<(i64, T)> for IntHashMap<T> {
    fn from_iter<I: IntoIterator<Item = (i64, T)>>(iter: I) -> Self {
        let mut map = IntHashMap::new();
        map.extend(iter);
        map
    }
}
