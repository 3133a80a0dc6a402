//! An insertion-ordered table built on [`ProbeTable`].
//!
//! Every entry carries the slot handles of its neighbours, forming a doubly
//! linked list threaded through the slot array. Lookups cost the same as in
//! the plain table; iteration follows the list instead of the slots.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::TryReserveError;
use crate::hash_table::DEFAULT_CAPACITY;
use crate::hash_table::Probe;
use crate::hash_table::ProbeTable;
use crate::hash_table::SlotIndex;
use crate::hash_table::capacity_for;
use crate::hash_table::exceeds_load;

/// A value plus its list links. Links are slot handles into the same table
/// and are rebuilt whenever the table is rehashed.
#[derive(Clone)]
pub(crate) struct Linked<V> {
    value: V,
    prev: Option<SlotIndex>,
    next: Option<SlotIndex>,
}

#[cold]
#[inline(never)]
fn broken_link(index: SlotIndex) -> ! {
    panic!("list links name slot {} which holds no entry", index.0);
}

/// A hash table that iterates in list order.
///
/// New entries are appended to the back of the list unless an explicit
/// position is given with [`insert_before`](Self::insert_before). Replacing
/// the value of an existing entry keeps its position. Resizing preserves the
/// order exactly even though every entry moves to a new slot.
///
/// As with [`ProbeTable`], callers supply the hash and an equality predicate
/// for every keyed operation.
///
/// # Examples
///
/// ```rust
/// # use tombstone_hash::linked_hash_table::LinkedProbeTable;
/// #
/// let mut table = LinkedProbeTable::new();
/// let (a, _) = table.insert(1, 'A', |&c| c == 'A');
/// let (b, _) = table.insert_before(2, 'B', |&c| c == 'B', Some(a));
/// table.insert_before(3, 'C', |&c| c == 'C', Some(a));
/// table.insert_before(4, 'D', |&c| c == 'D', Some(b));
///
/// let order: String = table.iter().collect();
/// assert_eq!(order, "DBCA");
/// ```
#[derive(Clone)]
pub struct LinkedProbeTable<V> {
    table: ProbeTable<Linked<V>>,
    head: Option<SlotIndex>,
    tail: Option<SlotIndex>,
}

impl<V> Debug for LinkedProbeTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinkedProbeTable")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("table", &self.table)
            .finish()
    }
}

impl<V> Default for LinkedProbeTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LinkedProbeTable<V> {
    /// Creates an empty table with
    /// [`DEFAULT_CAPACITY`](crate::hash_table::DEFAULT_CAPACITY) slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with exactly `capacity` slots. `capacity` must
    /// be a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: ProbeTable::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns an error if the slot array cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            table: ProbeTable::try_with_capacity(capacity)?,
            head: None,
            tail: None,
        })
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table holds no live entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of tombstoned slots.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Returns the fixed-point load, see [`ProbeTable::load`].
    #[inline]
    pub fn load(&self) -> usize {
        self.table.load()
    }

    #[inline]
    fn node(&self, index: SlotIndex) -> &Linked<V> {
        match self.table.get(index) {
            Some(node) => node,
            None => broken_link(index),
        }
    }

    #[inline]
    fn node_mut(&mut self, index: SlotIndex) -> &mut Linked<V> {
        match self.table.get_mut(index) {
            Some(node) => node,
            None => broken_link(index),
        }
    }

    /// Splices the detached entry at `index` in front of `before`, or at the
    /// back when `before` is `None`.
    fn link(&mut self, index: SlotIndex, before: Option<SlotIndex>) {
        let prev = match before {
            Some(before) => self.node(before).prev,
            None => self.tail,
        };

        let node = self.node_mut(index);
        node.prev = prev;
        node.next = before;

        match prev {
            Some(prev) => self.node_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        match before {
            Some(before) => self.node_mut(before).prev = Some(index),
            None => self.tail = Some(index),
        }
    }

    /// Detaches the entry at `index` from the list. The entry stays in its
    /// slot.
    fn unlink(&mut self, index: SlotIndex) {
        let node = self.node_mut(index);
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn try_rehash(
        &mut self,
        new_capacity: usize,
        track: Option<SlotIndex>,
    ) -> Result<Option<SlotIndex>, TryReserveError> {
        let mut old = self.table.swap_buffer(new_capacity)?;
        let mut cursor = self.head.take();
        self.tail = None;

        let mut tracked = None;
        while let Some(index) = cursor {
            let Some(bucket) = old.take(index.0) else {
                broken_link(index)
            };
            cursor = bucket.value.next;

            let placed = self.table.place(
                bucket.hash,
                Linked {
                    value: bucket.value.value,
                    prev: self.tail,
                    next: None,
                },
            );
            match self.tail {
                Some(tail) => self.node_mut(tail).next = Some(placed),
                None => self.head = Some(placed),
            }
            self.tail = Some(placed);

            if Some(index) == track {
                tracked = Some(placed);
            }
        }
        Ok(tracked)
    }

    fn rehash(&mut self, new_capacity: usize) {
        if let Err(err) = self.try_rehash(new_capacity, None) {
            err.fail();
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, track: SlotIndex) -> SlotIndex {
        let new_capacity = match self.capacity().checked_mul(2) {
            Some(capacity) => capacity,
            None => TryReserveError::CapacityOverflow.fail(),
        };
        match self.try_rehash(new_capacity, Some(track)) {
            Ok(Some(index)) => index,
            Ok(None) => broken_link(track),
            Err(err) => err.fail(),
        }
    }

    /// Inserts `value` at the back of the list, or replaces the value of a
    /// matching entry in place.
    ///
    /// Returns the slot of the entry (after any resize) and the replaced
    /// value.
    pub fn insert(
        &mut self,
        hash: u64,
        value: V,
        eq: impl Fn(&V) -> bool,
    ) -> (SlotIndex, Option<V>) {
        self.insert_before(hash, value, eq, None)
    }

    /// Inserts `value` immediately before the entry at `before`, or at the
    /// back when `before` is `None`.
    ///
    /// A matching entry that already exists only has its value replaced; it
    /// does not move.
    ///
    /// # Panics
    ///
    /// Panics if `before` does not name a live entry.
    pub fn insert_before(
        &mut self,
        hash: u64,
        value: V,
        eq: impl Fn(&V) -> bool,
        before: Option<SlotIndex>,
    ) -> (SlotIndex, Option<V>) {
        if let Some(before) = before {
            assert!(
                self.table.get(before).is_some(),
                "insert position {before:?} does not name a live entry"
            );
        }

        match self.table.probe_insert(hash, |node| eq(&node.value)) {
            Probe::Found(index) => {
                let index = SlotIndex(index);
                let old = core::mem::replace(&mut self.node_mut(index).value, value);
                (index, Some(old))
            }
            Probe::Vacant(index) => (self.attach(index, hash, value, before), None),
        }
    }

    /// Inserts a value whose key the caller has already proven absent.
    pub(crate) fn insert_unique(
        &mut self,
        hash: u64,
        value: V,
        before: Option<SlotIndex>,
    ) -> SlotIndex {
        let index = self.table.vacant_index(hash);
        self.attach(index, hash, value, before)
    }

    fn attach(&mut self, index: usize, hash: u64, value: V, before: Option<SlotIndex>) -> SlotIndex {
        let slot = self.table.occupy(
            index,
            hash,
            Linked {
                value,
                prev: None,
                next: None,
            },
        );
        self.link(slot, before);
        if self.table.needs_grow() {
            self.grow(slot)
        } else {
            slot
        }
    }

    /// Returns the handle of a matching entry.
    #[inline]
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<SlotIndex> {
        self.table.find_index(hash, |node| eq(&node.value))
    }

    /// Returns a reference to a matching value.
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.table
            .find(hash, |node| eq(&node.value))
            .map(|node| &node.value)
    }

    /// Returns a mutable reference to a matching value.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.table
            .find_mut(hash, |node| eq(&node.value))
            .map(|node| &mut node.value)
    }

    /// Returns the value in slot `index`, or `None` if that slot is not
    /// occupied.
    #[inline]
    pub fn get(&self, index: SlotIndex) -> Option<&V> {
        self.table.get(index).map(|node| &node.value)
    }

    /// Mutable variant of [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut V> {
        self.table.get_mut(index).map(|node| &mut node.value)
    }

    /// Returns the hash stored with the entry in slot `index`.
    #[inline]
    pub fn hash_at(&self, index: SlotIndex) -> Option<u64> {
        self.table.hash_at(index)
    }

    /// Removes a matching entry and returns its value.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        self.remove_at(index)
    }

    /// Removes the entry in slot `index` and returns its value.
    pub fn remove_at(&mut self, index: SlotIndex) -> Option<V> {
        self.table.get(index)?;
        self.unlink(index);
        self.table.remove_at(index).map(|node| node.value)
    }

    /// Handle of the first entry in list order.
    #[inline]
    pub fn front_index(&self) -> Option<SlotIndex> {
        self.head
    }

    /// Handle of the last entry in list order.
    #[inline]
    pub fn back_index(&self) -> Option<SlotIndex> {
        self.tail
    }

    /// The first value in list order.
    pub fn front(&self) -> Option<&V> {
        self.head.map(|index| &self.node(index).value)
    }

    /// The last value in list order.
    pub fn back(&self) -> Option<&V> {
        self.tail.map(|index| &self.node(index).value)
    }

    /// Removes and returns the first value in list order.
    pub fn pop_front(&mut self) -> Option<V> {
        let head = self.head?;
        self.remove_at(head)
    }

    /// Removes and returns the last value in list order.
    pub fn pop_back(&mut self) -> Option<V> {
        let tail = self.tail?;
        self.remove_at(tail)
    }

    /// Handle of the entry after `index` in list order.
    pub fn next_of(&self, index: SlotIndex) -> Option<SlotIndex> {
        self.table.get(index)?.next
    }

    /// Handle of the entry before `index` in list order.
    pub fn prev_of(&self, index: SlotIndex) -> Option<SlotIndex> {
        self.table.get(index)?.prev
    }

    /// Moves the entry at `index` to the back of the list. Returns `false` if
    /// `index` names no live entry.
    pub fn move_to_back(&mut self, index: SlotIndex) -> bool {
        self.move_before(index, None)
    }

    /// Moves the entry at `index` in front of the entry at `before`, or to the
    /// back when `before` is `None`. Returns `false`, leaving the list
    /// untouched, if either handle names no live entry.
    pub fn move_before(&mut self, index: SlotIndex, before: Option<SlotIndex>) -> bool {
        if self.table.get(index).is_none() {
            return false;
        }
        match before {
            Some(before) if before == index => return true,
            Some(before) if self.table.get(before).is_none() => return false,
            _ => {}
        }

        self.unlink(index);
        self.link(index, before);
        true
    }

    /// Rehashes into `new_capacity` slots, keeping the list order.
    ///
    /// `new_capacity` must be a power of two large enough to hold the current
    /// entries under the load limit.
    pub fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two());
        assert!(
            !exceeds_load(self.len(), 0, new_capacity),
            "{new_capacity} slots cannot hold {} entries",
            self.len()
        );
        self.rehash(new_capacity);
    }

    /// Reserves room for at least `additional` more entries without growing.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            err.fail();
        }
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns an error if the new capacity overflows or cannot be allocated.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self
            .len()
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        if !exceeds_load(required, self.tombstones(), self.capacity()) {
            return Ok(());
        }

        let new_capacity = capacity_for(required)?.max(self.capacity());
        self.try_rehash(new_capacity, None)?;
        Ok(())
    }

    /// Shrinks to the smallest capacity that holds the entries under the load
    /// limit, purging tombstones. List order is kept.
    pub fn shrink_to_fit(&mut self) {
        let target = match capacity_for(self.len()) {
            Ok(capacity) => capacity.min(self.capacity()),
            Err(_) => self.capacity(),
        };
        if target == self.capacity() && self.tombstones() == 0 {
            return;
        }

        log::debug!(
            "shrink linked table {} -> {} slots ({} live)",
            self.capacity(),
            target,
            self.len()
        );
        self.rehash(target);
    }

    /// Removes every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.table.clear();
        self.head = None;
        self.tail = None;
    }

    /// Keeps only the values for which `f` returns `true`, visiting them in
    /// list order.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.node_mut(index);
            cursor = node.next;
            if !f(&mut node.value) {
                drop(self.remove_at(index));
            }
        }
    }

    /// Returns a double-ended iterator over the values in list order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Returns a double-ended iterator over `(SlotIndex, &V)` in list order.
    pub fn iter_indexed(&self) -> IterIndexed<'_, V> {
        IterIndexed { inner: self.iter() }
    }

    /// Returns a double-ended iterator over mutable references to the values
    /// in list order.
    ///
    /// Creating the iterator costs one pass over the slot array.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let (front, back, remaining) = (self.head, self.tail, self.len());
        IterMut {
            slots: self.table.slots_mut().collect(),
            front,
            back,
            remaining,
        }
    }

    /// Returns an iterator that removes and yields every value in list order.
    ///
    /// The table is empty, with no tombstones, once the iterator is dropped.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain { table: self }
    }

    /// Asserts that the forward walk, the backward walk and the occupied
    /// slots all describe the same list.
    #[cfg(test)]
    pub(crate) fn check_links(&self) {
        let mut forward = Vec::new();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.node(index);
            assert_eq!(node.prev, prev, "{:#?}", self);
            forward.push(index);
            assert!(forward.len() <= self.len(), "cycle in list: {:#?}", self);
            prev = Some(index);
            cursor = node.next;
        }
        assert_eq!(prev, self.tail, "{:#?}", self);
        assert_eq!(forward.len(), self.len(), "{:#?}", self);

        let mut backward = Vec::new();
        let mut cursor = self.tail;
        while let Some(index) = cursor {
            backward.push(index);
            cursor = self.node(index).prev;
        }
        backward.reverse();
        assert_eq!(forward, backward);

        let mut occupied: Vec<_> = self.table.iter_indexed().map(|(index, _)| index).collect();
        let mut listed = forward;
        occupied.sort();
        listed.sort();
        assert_eq!(occupied, listed, "{:#?}", self);
    }
}

/// A list-order iterator over the values of a [`LinkedProbeTable`].
///
/// This struct is created by [`LinkedProbeTable::iter`].
pub struct Iter<'a, V> {
    table: &'a LinkedProbeTable<V>,
    front: Option<SlotIndex>,
    back: Option<SlotIndex>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    fn next_indexed(&mut self) -> Option<(SlotIndex, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        let node = self.table.node(index);
        self.front = node.next;
        self.remaining -= 1;
        Some((index, &node.value))
    }

    fn next_back_indexed(&mut self) -> Option<(SlotIndex, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        let node = self.table.node(index);
        self.back = node.prev;
        self.remaining -= 1;
        Some((index, &node.value))
    }
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_indexed().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.next_back_indexed().map(|(_, value)| value)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> core::iter::FusedIterator for Iter<'_, V> {}

/// A list-order iterator over `(SlotIndex, &V)` pairs of a
/// [`LinkedProbeTable`].
pub struct IterIndexed<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for IterIndexed<'a, V> {
    type Item = (SlotIndex, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_indexed()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for IterIndexed<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back_indexed()
    }
}

/// A list-order mutable iterator over the values of a [`LinkedProbeTable`].
///
/// This struct is created by [`LinkedProbeTable::iter_mut`].
pub struct IterMut<'a, V> {
    slots: Vec<Option<&'a mut Linked<V>>>,
    front: Option<SlotIndex>,
    back: Option<SlotIndex>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        let node = self.slots.get_mut(index.0)?.take()?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        let node = self.slots.get_mut(index.0)?.take()?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&mut node.value)
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A list-order draining iterator over a [`LinkedProbeTable`].
///
/// This struct is created by [`LinkedProbeTable::drain`].
pub struct Drain<'a, V> {
    table: &'a mut LinkedProbeTable<V>,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        self.table.clear();
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len(), Some(self.table.len()))
    }
}

impl<V> DoubleEndedIterator for Drain<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.table.pop_back()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

/// An owning list-order iterator over a [`LinkedProbeTable`].
pub struct IntoIter<V> {
    table: LinkedProbeTable<V>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len(), Some(self.table.len()))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.table.pop_back()
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for LinkedProbeTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { table: self }
    }
}

impl<'a, V> IntoIterator for &'a LinkedProbeTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn hash(&self, key: u64) -> u64 {
            let mut h = SipHasher::new_with_keys(self.k0, self.k1);
            h.write_u64(key);
            h.finish()
        }
    }

    fn keys<V: Copy>(table: &LinkedProbeTable<(u64, V)>) -> Vec<u64> {
        table.iter().map(|&(k, _)| k).collect()
    }

    fn push(table: &mut LinkedProbeTable<(u64, u64)>, state: &HashState, key: u64) -> SlotIndex {
        table.insert(state.hash(key), (key, key * 10), |&(k, _)| k == key).0
    }

    #[test]
    fn positional_insert_order() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        let a = table.insert(state.hash(0xA), (0xA, ()), |&(k, _)| k == 0xA).0;
        let b = table
            .insert_before(state.hash(0xB), (0xB, ()), |&(k, _)| k == 0xB, Some(a))
            .0;
        table.insert_before(state.hash(0xC), (0xC, ()), |&(k, _)| k == 0xC, Some(a));
        table.insert_before(state.hash(0xD), (0xD, ()), |&(k, _)| k == 0xD, Some(b));
        table.check_links();

        assert_eq!(keys(&table), vec![0xD, 0xB, 0xC, 0xA]);
        assert_eq!(
            table.iter().rev().map(|&(k, _)| k).collect::<Vec<_>>(),
            vec![0xA, 0xC, 0xB, 0xD]
        );
    }

    #[test]
    fn append_order_survives_growth() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..1000u64 {
            push(&mut table, &state, key);
            if key % 97 == 0 {
                table.check_links();
            }
        }
        table.check_links();
        assert_eq!(table.capacity(), 2048);
        assert_eq!(keys(&table), (0..1000).collect::<Vec<_>>());
        for key in 0..1000u64 {
            assert_eq!(
                table.find(state.hash(key), |&(k, _)| k == key),
                Some(&(key, key * 10))
            );
        }
    }

    #[test]
    fn insert_returns_post_resize_handle() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::with_capacity(4);
        push(&mut table, &state, 1);
        push(&mut table, &state, 2);
        let slot = push(&mut table, &state, 3);
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.get(slot), Some(&(3, 30)));
        assert_eq!(table.back_index(), Some(slot));
        table.check_links();
    }

    #[test]
    fn overwrite_keeps_position() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..4u64 {
            push(&mut table, &state, key);
        }
        let (_, old) = table.insert(state.hash(1), (1, 99), |&(k, _)| k == 1);
        assert_eq!(old, Some((1, 10)));

        let tail = table.back_index();
        let (_, old) = table.insert_before(state.hash(2), (2, 77), |&(k, _)| k == 2, tail);
        assert_eq!(old, Some((2, 20)));

        assert_eq!(keys(&table), vec![0, 1, 2, 3]);
        assert_eq!(table.len(), 4);
        table.check_links();
    }

    #[test]
    fn remove_relinks_neighbours() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..6u64 {
            push(&mut table, &state, key);
        }

        assert_eq!(table.remove(state.hash(0), |&(k, _)| k == 0), Some((0, 0)));
        table.check_links();
        assert_eq!(table.remove(state.hash(5), |&(k, _)| k == 5), Some((5, 50)));
        table.check_links();
        assert_eq!(table.remove(state.hash(3), |&(k, _)| k == 3), Some((3, 30)));
        table.check_links();
        assert_eq!(table.remove(state.hash(3), |&(k, _)| k == 3), None);

        assert_eq!(keys(&table), vec![1, 2, 4]);
        assert_eq!(table.front(), Some(&(1, 10)));
        assert_eq!(table.back(), Some(&(4, 40)));
        assert_eq!(table.tombstones(), 3);

        assert_eq!(table.pop_front(), Some((1, 10)));
        assert_eq!(table.pop_back(), Some((4, 40)));
        assert_eq!(table.pop_back(), Some((2, 20)));
        assert_eq!(table.pop_back(), None);
        assert!(table.front().is_none());
        table.check_links();
    }

    #[test]
    fn reinsert_after_remove_appends() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..3u64 {
            push(&mut table, &state, key);
        }
        table.remove(state.hash(0), |&(k, _)| k == 0);
        push(&mut table, &state, 0);
        assert_eq!(keys(&table), vec![1, 2, 0]);
        table.check_links();
    }

    #[test]
    fn navigation_and_moves() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        let slots: Vec<_> = (0..4u64).map(|key| push(&mut table, &state, key)).collect();

        assert_eq!(table.next_of(slots[1]), Some(slots[2]));
        assert_eq!(table.prev_of(slots[1]), Some(slots[0]));
        assert_eq!(table.prev_of(slots[0]), None);
        assert_eq!(table.next_of(slots[3]), None);

        assert!(table.move_to_back(slots[0]));
        assert_eq!(keys(&table), vec![1, 2, 3, 0]);
        assert!(table.move_before(slots[3], Some(slots[1])));
        assert_eq!(keys(&table), vec![3, 1, 2, 0]);
        assert!(table.move_before(slots[2], Some(slots[2])));
        assert!(table.move_to_back(slots[0]));
        assert_eq!(keys(&table), vec![3, 1, 2, 0]);
        table.check_links();

        table.remove_at(slots[2]);
        assert!(!table.move_to_back(slots[2]));
        assert!(!table.move_before(slots[1], Some(slots[2])));
        assert_eq!(keys(&table), vec![3, 1, 0]);
        table.check_links();
    }

    #[test]
    #[should_panic(expected = "does not name a live entry")]
    fn insert_before_stale_handle_panics() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        let slot = push(&mut table, &state, 1);
        table.remove_at(slot);
        table.insert_before(state.hash(2), (2, 2), |&(k, _)| k == 2, Some(slot));
    }

    #[test]
    fn resize_reserve_shrink_keep_order() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in (0..40u64).rev() {
            push(&mut table, &state, key);
        }
        for key in (0..40u64).step_by(2) {
            table.remove(state.hash(key), |&(k, _)| k == key);
        }
        let expected: Vec<_> = (0..40u64).rev().filter(|k| k % 2 == 1).collect();

        table.shrink_to_fit();
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.capacity(), 64);
        assert_eq!(keys(&table), expected);
        table.check_links();

        table.reserve(400);
        assert_eq!(table.capacity(), 1024);
        assert_eq!(keys(&table), expected);
        table.check_links();

        table.resize(64);
        assert_eq!(keys(&table), expected);
        table.check_links();
    }

    #[test]
    fn iter_mut_both_ends() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..5u64 {
            push(&mut table, &state, key);
        }

        let mut iter = table.iter_mut();
        assert_eq!(iter.len(), 5);
        iter.next().unwrap().1 = 0;
        iter.next_back().unwrap().1 = 4;
        for entry in iter {
            entry.1 += 1;
        }
        let values: Vec<_> = table.iter().map(|&(_, v)| v).collect();
        assert_eq!(values, vec![0, 11, 21, 31, 4]);
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..5u64 {
            push(&mut table, &state, key);
        }
        let mut iter = table.iter_indexed().map(|(_, &(k, _))| k);
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn retain_drain_into_iter() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..10u64 {
            push(&mut table, &state, key);
        }
        table.retain(|(k, _)| *k % 3 != 0);
        assert_eq!(keys(&table), vec![1, 2, 4, 5, 7, 8]);
        table.check_links();

        let copy = table.clone();
        let drained: Vec<_> = table.drain().map(|(k, _)| k).collect();
        assert_eq!(drained, vec![1, 2, 4, 5, 7, 8]);
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
        table.check_links();

        let reversed: Vec<_> = copy.into_iter().rev().map(|(k, _)| k).collect();
        assert_eq!(reversed, vec![8, 7, 5, 4, 2, 1]);
    }

    #[test]
    fn clone_keeps_links_valid() {
        let state = HashState::default();
        let mut table = LinkedProbeTable::new();
        for key in 0..20u64 {
            push(&mut table, &state, key);
        }
        let mut copy = table.clone();
        copy.check_links();
        copy.pop_front();
        push(&mut copy, &state, 100);
        copy.check_links();
        assert_eq!(keys(&table), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn clear_releases_values() {
        let tracker = Rc::new(());
        let mut table = LinkedProbeTable::new();
        for key in 0..12u64 {
            table.insert(key, (key, Rc::clone(&tracker)), |(k, _)| *k == key);
        }
        assert_eq!(Rc::strong_count(&tracker), 13);
        table.clear();
        assert_eq!(Rc::strong_count(&tracker), 1);
        assert!(table.front_index().is_none());
        assert!(table.back_index().is_none());
        table.check_links();
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn random_operations_keep_links() {
        let state = HashState::default();
        let mut rng = SmallRng::from_os_rng();
        let mut table = LinkedProbeTable::new();
        let mut order: Vec<u64> = Vec::new();

        for _ in 0..5000 {
            let key = rng.random_range(0..256u64);
            match rng.random_range(0..4) {
                0 | 1 => {
                    let position = if order.is_empty() || rng.random_bool(0.5) {
                        None
                    } else {
                        Some(rng.random_range(0..order.len()))
                    };
                    let before = position.map(|p| {
                        let k = order[p];
                        table.find_index(state.hash(k), |&(x, _)| x == k).unwrap()
                    });
                    let (_, old) =
                        table.insert_before(state.hash(key), (key, key), |&(k, _)| k == key, before);
                    if old.is_none() {
                        match position {
                            Some(p) => order.insert(p, key),
                            None => order.push(key),
                        }
                    }
                }
                2 => {
                    let removed = table.remove(state.hash(key), |&(k, _)| k == key);
                    let position = order.iter().position(|&k| k == key);
                    assert_eq!(removed.is_some(), position.is_some());
                    if let Some(p) = position {
                        order.remove(p);
                    }
                }
                _ => {
                    if let Some(k) = order.first().copied() {
                        let slot = table.find_index(state.hash(k), |&(x, _)| x == k).unwrap();
                        table.move_to_back(slot);
                        order.rotate_left(1);
                    }
                }
            }
        }

        table.check_links();
        assert_eq!(keys(&table), order);
    }
}
