use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::TryReserveError;
use crate::hash::DefaultHashBuilder;
use crate::hash::make_hash;
use crate::hash_table::Entry;
use crate::hash_table::ProbeTable;
use crate::hash_table::SlotIndex;
use crate::hash_table::capacity_for;

/// A hash set backed by a [`ProbeTable`].
///
/// `HashSet<T, S>` stores unique values of type `T` and uses a configurable
/// hasher builder `S`. Equality between sets ignores insertion order.
///
/// # Examples
///
/// ```rust
/// use tombstone_hash::HashSet;
///
/// let mut set = HashSet::new();
/// assert!(set.insert("a"));
/// assert!(!set.insert("a"));
/// assert!(set.contains(&"a"));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: ProbeTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> HashSet<T, DefaultHashBuilder> {
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

impl<T, S> HashSet<T, S> {
    /// Creates an empty set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::HashSet;
    /// use tombstone_hash::hash::BuildMixHasher;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(BuildMixHasher::default());
    /// assert!(set.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: ProbeTable::new(),
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
            table: ProbeTable::with_capacity(slots),
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

    /// Returns an iterator over the values in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::HashSet;
    ///
    /// let set: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let mut values: Vec<_> = set.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, vec![1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes and yields every value.
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

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Adds a value to the set. Returns `false` if an equal value was already
    /// present; the stored value is left untouched in that case.
    pub fn insert(&mut self, value: T) -> bool {
        self.insert_full(value).1
    }

    /// Adds a value and returns its slot, and whether it was newly inserted.
    pub fn insert_full(&mut self, value: T) -> (SlotIndex, bool) {
        let hash = make_hash(&self.hash_builder, &value);
        match self.table.entry(hash, |v| v == &value) {
            Entry::Occupied(entry) => (entry.slot(), false),
            Entry::Vacant(entry) => (entry.insert_indexed(value).0, true),
        }
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

    /// Removes `value`. Returns `true` if it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Adds `value`, replacing and returning an equal stored value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert_eq!(set.replace(5), None);
    /// assert_eq!(set.replace(5), Some(5));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = make_hash(&self.hash_builder, &value);
        match self.table.entry(hash, |v| v == &value) {
            Entry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = make_hash(&self.hash_builder, value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = make_hash(&self.hash_builder, value);
        self.table.find(hash, |v| v == value)
    }

    /// Returns `true` if the sets share no values.
    pub fn is_disjoint(&self, other: &HashSet<T, S>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|v| !large.contains(v))
    }

    /// Returns `true` if every value of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<T, S>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Visits the values of `self`, then the values of `other` not in `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<i32> = [3, 4].into_iter().collect();
    /// let mut union: Vec<_> = a.union(&b).copied().collect();
    /// union.sort();
    /// assert_eq!(union, vec![1, 2, 3, 4]);
    /// ```
    pub fn union<'a>(&'a self, other: &'a HashSet<T, S>) -> Union<'a, T, S> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Visits the values in both `self` and `other`.
    pub fn intersection<'a>(&'a self, other: &'a HashSet<T, S>) -> Intersection<'a, T, S> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.iter(),
            other: large,
        }
    }

    /// Visits the values in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the values in exactly one of the two sets.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<T, S>,
    ) -> SymmetricDifference<'a, T, S> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

impl<T, S> Default for HashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
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

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T> {
    inner: crate::hash_table::Drain<'a, T>,
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

/// An owning iterator over the values of a `HashSet`.
pub struct IntoIter<T> {
    inner: crate::hash_table::IntoIter<T>,
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

impl<T, S> IntoIterator for HashSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
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

/// An iterator over the union of two sets.
pub struct Union<'a, T, S> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    set: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Union<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.set.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S> {
    iter: core::iter::Chain<Difference<'a, T, S>, Difference<'a, T, S>>,
}

impl<'a, T, S> Iterator for SymmetricDifference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
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

    fn set_of(values: &[i32]) -> HashSet<i32, SipHashBuilder> {
        values.iter().copied().collect()
    }

    fn sorted<'a>(iter: impl Iterator<Item = &'a i32>) -> Vec<i32> {
        let mut values: Vec<_> = iter.copied().collect();
        values.sort();
        values
    }

    #[test]
    fn test_new_and_with_capacity() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::default();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 16);

        let set2 = HashSet::<i32, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert_eq!(set2.capacity(), 512);
        assert!(set2.is_empty());

        let set3: HashSet<i32> = HashSet::with_capacity(5);
        assert_eq!(set3.capacity(), 16);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&1));

        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);

        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_remove_and_take() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert("a".to_string());
        set.insert("b".to_string());

        assert!(set.remove(&"a".to_string()));
        assert!(!set.remove(&"a".to_string()));
        assert_eq!(set.take(&"b".to_string()), Some("b".to_string()));
        assert_eq!(set.take(&"b".to_string()), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_replace_and_get() {
        #[derive(Debug)]
        struct Tagged(u32, &'static str);

        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl Eq for Tagged {}

        impl core::hash::Hash for Tagged {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        assert!(set.insert(Tagged(1, "first")));
        assert!(!set.insert(Tagged(1, "second")));
        assert_eq!(set.get(&Tagged(1, "")).map(|t| t.1), Some("first"));

        let old = set.replace(Tagged(1, "third"));
        assert_eq!(old.map(|t| t.1), Some("first"));
        assert_eq!(set.get(&Tagged(1, "")).map(|t| t.1), Some("third"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insert_full_and_find() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        let (slot, fresh) = set.insert_full(10);
        assert!(fresh);
        assert_eq!(set.get_at(slot), Some(&10));
        assert_eq!(set.insert_full(10), (slot, false));
        assert_eq!(set.find(&10), Some(slot));
        assert_eq!(set.find(&11), None);
    }

    #[test]
    fn test_set_relations() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[1, 2, 3, 4]);
        let c = set_of(&[7, 8]);

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(b.is_superset(&a));
        assert!(a.is_disjoint(&c));
        assert!(!a.is_disjoint(&b));
        assert!(HashSet::<i32, SipHashBuilder>::default().is_subset(&a));
    }

    #[test]
    fn test_set_operations() {
        let a = set_of(&[1, 2, 3, 4]);
        let b = set_of(&[3, 4, 5]);

        assert_eq!(sorted(a.union(&b)), vec![1, 2, 3, 4, 5]);
        assert_eq!(sorted(b.union(&a)), vec![1, 2, 3, 4, 5]);
        assert_eq!(sorted(a.intersection(&b)), vec![3, 4]);
        assert_eq!(sorted(b.intersection(&a)), vec![3, 4]);
        assert_eq!(sorted(a.difference(&b)), vec![1, 2]);
        assert_eq!(sorted(b.difference(&a)), vec![5]);
        assert_eq!(sorted(a.symmetric_difference(&b)), vec![1, 2, 5]);
    }

    #[test]
    fn test_retain_drain_into_iter() {
        let mut set = set_of(&(0..20).collect::<Vec<_>>());
        set.retain(|v| v % 4 == 0);
        assert_eq!(sorted(set.iter()), vec![0, 4, 8, 12, 16]);

        let mut owned: Vec<_> = set.clone().into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![0, 4, 8, 12, 16]);

        let drained: Vec<_> = set.drain().collect();
        assert_eq!(drained.len(), 5);
        assert!(set.is_empty());
    }

    #[test]
    fn test_equality_and_debug() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[3, 2, 1]);
        assert_eq!(a, b);
        assert_ne!(a, set_of(&[1, 2]));
        assert_ne!(a, set_of(&[1, 2, 4]));

        let one = set_of(&[9]);
        assert_eq!(alloc::format!("{:?}", one), "{9}");
    }

    #[test]
    fn test_extend_strings() {
        let mut set: HashSet<String> = HashSet::new();
        set.extend(["x", "y", "x"].iter().map(|s| s.to_string()));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&"y".to_string()));
    }
}
