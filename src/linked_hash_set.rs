use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::TryReserveError;
use crate::hash::DefaultHashBuilder;
use crate::hash::make_hash;
use crate::hash_table::SlotIndex;
use crate::hash_table::capacity_for;
use crate::linked_hash_table::LinkedProbeTable;

/// A hash set that remembers the order its values were inserted in.
///
/// Equality is order-sensitive: two sets with the same values in a different
/// order are not equal.
///
/// # Examples
///
/// ```rust
/// use tombstone_hash::LinkedHashSet;
///
/// let mut set = LinkedHashSet::new();
/// set.insert(3);
/// set.insert(1);
/// set.insert(2);
/// assert!(!set.insert(3));
///
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 1, 2]);
/// assert_eq!(set.front(), Some(&3));
/// assert_eq!(set.back(), Some(&2));
/// ```
#[derive(Clone)]
pub struct LinkedHashSet<T, S = DefaultHashBuilder> {
    table: LinkedProbeTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for LinkedHashSet<T, S>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, S> Eq for LinkedHashSet<T, S> where T: Eq {}

impl<T, S> Debug for LinkedHashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> LinkedHashSet<T, DefaultHashBuilder> {
    /// Creates an empty set with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty set that can hold at least `capacity` values before
    /// growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<T, S> LinkedHashSet<T, S> {
    /// Creates an empty set with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: LinkedProbeTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty set that can hold at least `capacity` values before
    /// growing, using the given hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let slots = match capacity_for(capacity) {
            Ok(slots) => slots,
            Err(err) => err.fail(),
        };
        Self {
            table: LinkedProbeTable::with_capacity(slots),
            hash_builder,
        }
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every value, keeping the allocated slots.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the slot array as far as the load limit allows.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves room for at least `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns an error if the new capacity overflows or cannot be allocated.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(additional)
    }

    /// Returns the value stored in slot `index`.
    pub fn get_at(&self, index: SlotIndex) -> Option<&T> {
        self.table.get(index)
    }

    /// Returns the oldest value.
    pub fn front(&self) -> Option<&T> {
        self.table.front()
    }

    /// Returns the newest value.
    pub fn back(&self) -> Option<&T> {
        self.table.back()
    }

    /// Removes and returns the oldest value.
    pub fn pop_front(&mut self) -> Option<T> {
        self.table.pop_front()
    }

    /// Removes and returns the newest value.
    pub fn pop_back(&mut self) -> Option<T> {
        self.table.pop_back()
    }

    /// Returns an iterator over the values in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes and yields every value in insertion order.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table.retain(|v| f(v));
    }
}

impl<T, S> LinkedHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn insert_at(&mut self, value: T, before: Option<SlotIndex>) -> (SlotIndex, bool) {
        if let Some(before) = before {
            assert!(
                self.table.get(before).is_some(),
                "insert position {before:?} does not name a live entry"
            );
        }

        let hash = make_hash(&self.hash_builder, &value);
        let found = self.table.find_index(hash, |v| v == &value);
        match found {
            Some(index) => (index, false),
            None => (self.table.insert_unique(hash, value, before), true),
        }
    }

    /// Adds a value at the back. Returns `false`, leaving the set unchanged,
    /// if an equal value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        self.insert_at(value, None).1
    }

    /// Adds a value at the back and returns its slot, and whether it was
    /// newly inserted.
    pub fn insert_full(&mut self, value: T) -> (SlotIndex, bool) {
        self.insert_at(value, None)
    }

    /// Adds a value immediately in front of the value at `before` and returns
    /// its slot. A value that is already present does not move.
    ///
    /// # Panics
    ///
    /// Panics if `before` does not name a live entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::LinkedHashSet;
    ///
    /// let mut set = LinkedHashSet::new();
    /// let last = set.insert_full("last").0;
    /// set.insert_before("first", last);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["first", "last"]);
    /// ```
    pub fn insert_before(&mut self, value: T, before: SlotIndex) -> SlotIndex {
        self.insert_at(value, Some(before)).0
    }

    /// Returns the slot holding `value`.
    pub fn find(&self, value: &T) -> Option<SlotIndex> {
        let hash = make_hash(&self.hash_builder, value);
        self.table.find_index(hash, |v| v == value)
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Returns the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = make_hash(&self.hash_builder, value);
        self.table.find(hash, |v| v == value)
    }

    /// Removes `value`. Returns `true` if it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = make_hash(&self.hash_builder, value);
        self.table.remove(hash, |v| v == value)
    }

    /// Moves `value` to the back of the order. Returns `false` if it is
    /// absent.
    pub fn move_to_back(&mut self, value: &T) -> bool {
        match self.find(value) {
            Some(index) => self.table.move_to_back(index),
            None => false,
        }
    }
}

impl<T, S> Default for LinkedHashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for LinkedHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = LinkedHashSet::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for LinkedHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, S> IntoIterator for LinkedHashSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a LinkedHashSet<T, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An insertion-order iterator over the values of a `LinkedHashSet`.
pub struct Iter<'a, T> {
    inner: crate::linked_hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining insertion-order iterator over the values of a
/// `LinkedHashSet`.
pub struct Drain<'a, T> {
    inner: crate::linked_hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Drain<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// An owning insertion-order iterator over the values of a `LinkedHashSet`.
pub struct IntoIter<T> {
    inner: crate::linked_hash_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type Set<T> = LinkedHashSet<T, SipHashBuilder>;

    fn order<T: Copy>(set: &Set<T>) -> Vec<T> {
        set.iter().copied().collect()
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut set = Set::default();
        for v in [5, 3, 9, 1] {
            assert!(set.insert(v));
        }
        assert!(!set.insert(3));
        assert_eq!(order(&set), vec![5, 3, 9, 1]);
        assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), vec![1, 9, 3, 5]);
        assert_eq!(set.iter().len(), 4);
    }

    #[test]
    fn test_insert_before() {
        let mut set = Set::default();
        let a = set.insert_full('A').0;
        let b = set.insert_before('B', a);
        set.insert_before('C', a);
        set.insert_before('D', b);
        assert_eq!(order(&set), vec!['D', 'B', 'C', 'A']);

        assert_eq!(set.insert_before('A', b), a);
        assert_eq!(order(&set), vec!['D', 'B', 'C', 'A']);
    }

    #[test]
    #[should_panic(expected = "does not name a live entry")]
    fn test_insert_before_vacated_slot_panics() {
        let mut set = Set::default();
        let slot = set.insert_full(1).0;
        set.pop_front();
        set.insert_before(2, slot);
    }

    #[test]
    fn test_remove_take_and_reinsert() {
        let mut set: Set<u32> = (0..6).collect();
        assert!(set.remove(&2));
        assert!(!set.remove(&2));
        assert_eq!(set.take(&4), Some(4));
        assert_eq!(order(&set), vec![0, 1, 3, 5]);

        set.insert(2);
        assert_eq!(order(&set), vec![0, 1, 3, 5, 2]);
        assert_eq!(set.get(&3), Some(&3));
        assert!(set.contains(&2));
        assert!(!set.contains(&4));
    }

    #[test]
    fn test_front_back_pop_move() {
        let mut set: Set<u32> = [10, 20, 30].into_iter().collect();
        assert_eq!(set.front(), Some(&10));
        assert_eq!(set.back(), Some(&30));

        assert!(set.move_to_back(&10));
        assert!(!set.move_to_back(&99));
        assert_eq!(order(&set), vec![20, 30, 10]);

        assert_eq!(set.pop_front(), Some(20));
        assert_eq!(set.pop_back(), Some(10));
        assert_eq!(set.pop_back(), Some(30));
        assert_eq!(set.pop_back(), None);
        assert_eq!(set.front(), None);
    }

    #[test]
    fn test_growth_keeps_order() {
        let mut set = Set::default();
        for v in (0..1000u32).rev() {
            set.insert(v);
        }
        assert!(set.capacity() >= 2000);
        assert_eq!(order(&set), (0..1000u32).rev().collect::<Vec<_>>());

        set.retain(|v| v % 100 == 0);
        set.shrink_to_fit();
        assert_eq!(order(&set), vec![900, 800, 700, 600, 500, 400, 300, 200, 100, 0]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a: Set<u8> = [1, 2, 3].into_iter().collect();
        let b: Set<u8> = [3, 2, 1].into_iter().collect();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(alloc::format!("{:?}", a), "{1, 2, 3}");
    }

    #[test]
    fn test_drain_and_into_iter() {
        let mut set: Set<u8> = [4, 5, 6].into_iter().collect();
        let owned: Vec<_> = set.clone().into_iter().rev().collect();
        assert_eq!(owned, vec![6, 5, 4]);

        let drained: Vec<_> = set.drain().collect();
        assert_eq!(drained, vec![4, 5, 6]);
        assert!(set.is_empty());

        set.extend([7, 7, 8]);
        assert_eq!(order(&set), vec![7, 8]);
        let by_ref: Vec<_> = (&set).into_iter().collect();
        assert_eq!(by_ref, vec![&7, &8]);
    }
}
