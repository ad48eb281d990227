//! RawTable: structural open-addressing layer and capacity manager.

use crate::cfg::trace;
use crate::error::TableFull;
use crate::probe::Probe;
use crate::slot::{Entry, Slot};

/// Shrink when fewer than `capacity / SHRINK_DIVISOR` slots are live.
pub(crate) const SHRINK_DIVISOR: usize = 4;

/// Outcome of walking a key's probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// The key is live at this index.
    Found(usize),
    /// The key is absent; this is the slot an insert should land in.
    Vacant(usize),
    /// A full cycle saw neither the key nor an admissible slot.
    Exhausted,
}

#[derive(Debug, Clone)]
pub(crate) struct RawTable<T> {
    slots: Box<[Slot<T>]>,
    // Occupied slots.
    live: usize,
    // Occupied or tombstoned slots.
    filled: usize,
    // Set while the table is being populated by a rebuild.
    frozen: bool,
}

impl<T> Default for RawTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RawTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Box::default(),
            live: 0,
            filled: 0,
            frozen: false,
        }
    }

    /// Allocates `capacity` rounded up to a power of two (zero stays zero).
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = match capacity {
            0 => 0,
            n => n.next_power_of_two(),
        };
        Self {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            live: 0,
            filled: 0,
            frozen: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn filled(&self) -> usize {
        self.filled
    }

    /// Walks the probe sequence for `key`.
    ///
    /// Tombstones never end the walk since the key may sit further along the
    /// cycle; the first one passed is remembered as the landing slot.
    pub(crate) fn lookup(&self, key: i64) -> Lookup {
        let mut tombstone = None;
        for i in Probe::start(key, self.slots.len()) {
            match &self.slots[i] {
                Slot::Occupied(e) if e.key == key => return Lookup::Found(i),
                Slot::Occupied(_) => {}
                Slot::Tombstone => {
                    tombstone.get_or_insert(i);
                }
                Slot::Empty => return Lookup::Vacant(tombstone.unwrap_or(i)),
            }
        }
        tombstone.map_or(Lookup::Exhausted, Lookup::Vacant)
    }

    fn find(&self, key: i64) -> Option<usize> {
        match self.lookup(key) {
            Lookup::Found(i) => Some(i),
            _ => None,
        }
    }

    pub(crate) fn get(&self, key: i64) -> Option<&T> {
        let i = self.find(key)?;
        self.slots[i].entry().map(|e| &e.value)
    }

    pub(crate) fn get_mut(&mut self, key: i64) -> Option<&mut T> {
        let i = self.find(key)?;
        self.slots[i].entry_mut().map(|e| &mut e.value)
    }

    pub(crate) fn contains(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    /// Inserts or overwrites, returning the previous value on overwrite.
    pub(crate) fn insert(&mut self, key: i64, value: T) -> Result<Option<T>, TableFull> {
        self.insert_full(key, value).map(|(_, prev)| prev)
    }

    // Returns the slot index the entry ended up in alongside the previous value.
    fn insert_full(&mut self, key: i64, value: T) -> Result<(usize, Option<T>), TableFull> {
        if !self.frozen && self.filled == self.slots.len() {
            self.resize();
        }

        match self.lookup(key) {
            Lookup::Found(i) => {
                let prev = self.slots[i]
                    .entry_mut()
                    .map(|e| core::mem::replace(&mut e.value, value));
                Ok((i, prev))
            }
            Lookup::Vacant(i) => {
                // A reused tombstone is already counted as filled.
                if self.slots[i].is_empty() {
                    self.filled += 1;
                }
                self.slots[i] = Slot::Occupied(Entry { key, value });
                self.live += 1;
                Ok((i, None))
            }
            Lookup::Exhausted => Err(TableFull {
                capacity: self.slots.len(),
            }),
        }
    }

    /// Returns the value for `key`, inserting `default()` first if absent.
    pub(crate) fn get_or_insert_with<F>(&mut self, key: i64, default: F) -> Result<&mut T, TableFull>
    where
        F: FnOnce() -> T,
    {
        let i = match self.find(key) {
            Some(i) => i,
            None => self.insert_full(key, default())?.0,
        };
        let capacity = self.slots.len();
        self.slots[i]
            .entry_mut()
            .map(|e| &mut e.value)
            .ok_or(TableFull { capacity })
    }

    /// Tombstones the slot holding `key`. `filled` is left unchanged.
    pub(crate) fn erase(&mut self, key: i64) -> Option<T> {
        let i = self.find(key)?;
        let entry = self.slots[i].bury()?;
        self.live -= 1;
        Some(entry.value)
    }

    /// Halves the capacity (never below 1) when fewer than a quarter of the
    /// slots are live. Returns whether a rebuild happened.
    pub(crate) fn shrink(&mut self) -> bool {
        let capacity = self.slots.len();
        if self.frozen || capacity == 0 || self.live >= capacity / SHRINK_DIVISOR {
            return false;
        }
        self.rebuild((capacity / 2).max(1));
        true
    }

    // Called on a full table before an insert.
    fn resize(&mut self) {
        if self.frozen {
            return;
        }

        let capacity = self.slots.len();
        let target = if capacity == 0 {
            1
        } else if self.live < capacity / SHRINK_DIVISOR {
            (capacity / 2).max(1)
        } else if self.filled == capacity {
            capacity * 2
        } else {
            return;
        };

        self.rebuild(target);
    }

    /// Moves every live entry into a fresh table of `capacity` slots and
    /// swaps it in. Tombstones are dropped, so `filled == live` afterwards.
    fn rebuild(&mut self, capacity: usize) {
        assert!(
            capacity > self.live,
            "rebuild target {capacity} cannot hold {} live entries",
            self.live
        );
        trace!(
            "rebuilding table: {} -> {} slots ({} live, {} filled)",
            self.slots.len(),
            capacity,
            self.live,
            self.filled
        );

        let mut fresh = RawTable::with_capacity(capacity);
        fresh.frozen = true;
        for slot in core::mem::take(&mut self.slots).into_vec() {
            if let Slot::Occupied(Entry { key, value }) = slot {
                // Fresh storage has no tombstones and more slots than entries,
                // so every probe ends on an empty slot.
                fresh
                    .insert(key, value)
                    .expect("rebuild target has a free slot for every live entry");
            }
        }

        self.slots = fresh.slots;
        self.live = fresh.live;
        self.filled = fresh.filled;
        self.frozen = false;
    }

    /// Checks counters and reachability of every live entry.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let live = self.slots.iter().filter(|s| s.entry().is_some()).count();
        let filled = self.slots.iter().filter(|s| !s.is_empty()).count();
        assert_eq!(self.live, live, "live count");
        assert_eq!(self.filled, filled, "filled count");
        assert!(self.live <= self.filled && self.filled <= self.slots.len());
        assert!(self.slots.is_empty() || self.slots.len().is_power_of_two());
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(e) = slot.entry() {
                assert_eq!(self.lookup(e.key), Lookup::Found(i), "key {} orphaned", e.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the first insert grows capacity 0 to 1; later growth doubles.
    #[test]
    fn growth_doubles_from_one() {
        let mut t: RawTable<i32> = RawTable::new();
        assert_eq!(t.capacity(), 0);
        t.insert(10, 1).unwrap();
        assert_eq!(t.capacity(), 1);
        t.insert(11, 2).unwrap();
        assert_eq!(t.capacity(), 2);
        t.insert(12, 3).unwrap();
        assert_eq!(t.capacity(), 4);
        t.insert(13, 4).unwrap();
        assert_eq!(t.capacity(), 4);
        t.insert(14, 5).unwrap();
        assert_eq!(t.capacity(), 8);
        t.assert_invariants();
    }

    /// Invariant: overwrite returns the old value and leaves counters alone.
    #[test]
    fn overwrite_keeps_counters() {
        let mut t = RawTable::new();
        assert_eq!(t.insert(1, "a").unwrap(), None);
        let (live, filled) = (t.len(), t.filled());
        assert_eq!(t.insert(1, "b").unwrap(), Some("a"));
        assert_eq!((t.len(), t.filled()), (live, filled));
        assert_eq!(t.get(1), Some(&"b"));
    }

    /// Invariant: erase leaves a tombstone that keeps `filled` but drops `live`;
    /// reinsertion into it does not double-count `filled`.
    #[test]
    fn tombstone_reuse_does_not_double_count() {
        let mut t = RawTable::with_capacity(8);
        for k in 0..4 {
            t.insert(k, k).unwrap();
        }
        assert_eq!(t.erase(2), Some(2));
        assert_eq!((t.len(), t.filled()), (3, 4));
        assert!(!t.contains(2));

        t.insert(2, 20).unwrap();
        assert_eq!((t.len(), t.filled()), (4, 4));
        assert_eq!(t.get(2), Some(&20));
        t.assert_invariants();
    }

    /// Invariant: lookups continue past tombstones to reach colliding keys.
    #[test]
    fn probe_walks_past_tombstones() {
        let mut t = RawTable::with_capacity(8);
        // All congruent mod 8, so they share a probe sequence.
        for k in [0i64, 8, 16] {
            t.insert(k, k).unwrap();
        }
        t.erase(0).unwrap();
        t.erase(8).unwrap();
        assert_eq!(t.get(16), Some(&16));
        // Re-inserting 16 must overwrite, not land in an earlier tombstone.
        assert_eq!(t.insert(16, 160).unwrap(), Some(16));
        assert_eq!(t.len(), 1);
        t.assert_invariants();
    }

    /// Invariant: a cycle of only tombstones and foreign keys still yields a
    /// landing slot when a tombstone exists.
    #[test]
    fn full_cycle_lands_on_tombstone() {
        let mut t = RawTable::with_capacity(2);
        t.insert(0, 0).unwrap();
        t.insert(1, 1).unwrap();
        t.erase(0).unwrap();
        assert_eq!(t.filled(), t.capacity());
        assert!(matches!(t.lookup(5), Lookup::Vacant(_)));
    }

    /// Invariant: a frozen table never resizes itself; when full it reports
    /// `TableFull` and stays unchanged.
    #[test]
    fn frozen_table_reports_full() {
        let mut t = RawTable::with_capacity(2);
        t.frozen = true;
        t.insert(0, 'a').unwrap();
        t.insert(1, 'b').unwrap();
        assert_eq!(t.insert(2, 'c'), Err(TableFull { capacity: 2 }));
        assert_eq!(t.capacity(), 2);
        assert_eq!(t.len(), 2);
        assert!(!t.shrink());
    }

    /// Invariant: a resize compacts tombstones away (`filled == live`).
    #[test]
    fn resize_drops_tombstones() {
        let mut t = RawTable::new();
        for k in 0..8 {
            t.insert(k, k).unwrap();
        }
        for k in 0..3 {
            t.erase(k).unwrap();
        }
        assert_eq!(t.capacity(), 8);
        assert_eq!(t.filled(), 8);
        // Table is full of live+tombstones; the next insert must rebuild.
        t.insert(100, 100).unwrap();
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.filled(), t.len());
        for k in 3..8 {
            assert_eq!(t.get(k), Some(&k));
        }
        t.assert_invariants();
    }

    /// Invariant: a full table with under a quarter live halves instead of
    /// doubling, and uses halving rather than collapsing to one slot.
    #[test]
    fn full_sparse_table_halves_on_insert() {
        let mut t = RawTable::new();
        for k in 0..16 {
            t.insert(k, k).unwrap();
        }
        assert_eq!(t.capacity(), 16);
        for k in 0..13 {
            t.erase(k).unwrap();
        }
        assert_eq!((t.len(), t.filled()), (3, 16));

        t.insert(99, 99).unwrap();
        assert_eq!(t.capacity(), 8);
        assert_eq!(t.len(), 4);
        for k in [13, 14, 15, 99] {
            assert_eq!(t.get(k), Some(&k));
        }
        t.assert_invariants();
    }

    /// Invariant: explicit shrink halves only below quarter load.
    #[test]
    fn shrink_halves_below_quarter_load() {
        let mut t = RawTable::with_capacity(16);
        for k in 0..4 {
            t.insert(k, k).unwrap();
        }
        assert!(!t.shrink(), "4 live of 16 is not below a quarter");
        t.erase(0).unwrap();
        assert!(t.shrink());
        assert_eq!(t.capacity(), 8);
        assert!(!t.shrink(), "3 live of 8 is above a quarter");

        let mut e: RawTable<i32> = RawTable::with_capacity(4);
        assert!(e.shrink());
        assert_eq!(e.capacity(), 2);
        // Below four slots a quarter rounds down to zero live entries.
        assert!(!e.shrink());
        assert_eq!(e.capacity(), 2);
    }

    /// Invariant: `get_or_insert_with` runs the constructor only for absent
    /// keys and the returned reference aliases the stored value.
    #[test]
    fn get_or_insert_with_is_lazy() {
        let mut t = RawTable::new();
        let mut calls = 0;
        *t.get_or_insert_with(7, || {
            calls += 1;
            1
        })
        .unwrap() += 10;
        assert_eq!(t.get(7), Some(&11));

        let v = t
            .get_or_insert_with(7, || {
                calls += 1;
                0
            })
            .unwrap();
        assert_eq!(*v, 11);
        assert_eq!(calls, 1);
    }

    #[test]
    fn erase_absent_is_none() {
        let mut t: RawTable<u8> = RawTable::new();
        assert_eq!(t.erase(3), None);
        t.insert(3, 3).unwrap();
        assert_eq!(t.erase(3), Some(3));
        assert_eq!(t.erase(3), None);
        assert!(t.is_empty());
    }

    #[test]
    fn negative_keys_round_trip() {
        let mut t = RawTable::new();
        for k in -500i64..500 {
            t.insert(k, k * 2).unwrap();
        }
        for k in -500i64..500 {
            assert_eq!(t.get(k), Some(&(k * 2)));
        }
        assert_eq!(t.get(i64::MIN), None);
        t.assert_invariants();
    }
}
