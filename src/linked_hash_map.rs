use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Index;

use crate::error::TryReserveError;
use crate::hash::DefaultHashBuilder;
use crate::hash::make_hash;
use crate::hash_table::SlotIndex;
use crate::hash_table::capacity_for;
use crate::linked_hash_table::LinkedProbeTable;

#[cold]
#[inline(never)]
fn stale_slot(index: SlotIndex) -> ! {
    panic!("entry slot {index:?} was vacated while borrowed");
}

fn entry_at<K, V>(table: &mut LinkedProbeTable<(K, V)>, index: SlotIndex) -> &mut (K, V) {
    match table.get_mut(index) {
        Some(entry) => entry,
        None => stale_slot(index),
    }
}

/// A hash map that remembers the order its keys were inserted in.
///
/// Iteration, [`front`](Self::front), [`back`](Self::back) and the pop
/// methods follow that order. Overwriting the value of an existing key keeps
/// its position; removing a key and inserting it again moves it to the back.
/// [`insert_before`](Self::insert_before) places a new key in front of a
/// given entry instead.
///
/// Two maps compare equal only if they hold the same entries in the same
/// order.
///
/// # Examples
///
/// ```rust
/// use tombstone_hash::LinkedHashMap;
///
/// let mut map = LinkedHashMap::new();
/// let a = map.insert_full("a", 1).0;
/// let b = map.insert_before("b", 2, a);
/// map.insert_before("c", 3, a);
/// map.insert_before("d", 4, b);
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, ["d", "b", "c", "a"]);
/// ```
#[derive(Clone)]
pub struct LinkedHashMap<K, V, S = DefaultHashBuilder> {
    table: LinkedProbeTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for LinkedHashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> LinkedHashMap<K, V, DefaultHashBuilder> {
    /// Creates an empty map with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map that can hold at least `capacity` entries before
    /// growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> LinkedHashMap<K, V, S> {
    /// Creates an empty map with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: LinkedProbeTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty map that can hold at least `capacity` entries before
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

    /// Fallible version of [`with_capacity_and_hasher`](Self::with_capacity_and_hasher).
    ///
    /// # Errors
    ///
    /// Returns an error if the slot array cannot be allocated.
    pub fn try_with_capacity_and_hasher(
        capacity: usize,
        hash_builder: S,
    ) -> Result<Self, TryReserveError> {
        Ok(Self {
            table: LinkedProbeTable::try_with_capacity(capacity_for(capacity)?)?,
            hash_builder,
        })
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every entry, keeping the allocated slots.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the slot array as far as the load limit allows. Order is kept.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves room for at least `additional` more entries.
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

    /// Returns the entry stored in slot `index`.
    pub fn get_at(&self, index: SlotIndex) -> Option<(&K, &V)> {
        self.table.get(index).map(|(k, v)| (k, v))
    }

    /// Returns the entry stored in slot `index`, with the value mutable.
    pub fn get_at_mut(&mut self, index: SlotIndex) -> Option<(&K, &mut V)> {
        self.table.get_mut(index).map(|(k, v)| (&*k, v))
    }

    /// Removes the entry stored in slot `index`.
    pub fn remove_at(&mut self, index: SlotIndex) -> Option<(K, V)> {
        self.table.remove_at(index)
    }

    /// Returns the oldest entry.
    pub fn front(&self) -> Option<(&K, &V)> {
        self.table.front().map(|(k, v)| (k, v))
    }

    /// Returns the newest entry.
    pub fn back(&self) -> Option<(&K, &V)> {
        self.table.back().map(|(k, v)| (k, v))
    }

    /// Returns the slot of the oldest entry.
    pub fn front_slot(&self) -> Option<SlotIndex> {
        self.table.front_index()
    }

    /// Returns the slot of the newest entry.
    pub fn back_slot(&self) -> Option<SlotIndex> {
        self.table.back_index()
    }

    /// Removes and returns the oldest entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::LinkedHashMap;
    ///
    /// let mut map: LinkedHashMap<_, _> = [(1, "a"), (2, "b")].into_iter().collect();
    /// assert_eq!(map.pop_front(), Some((1, "a")));
    /// assert_eq!(map.pop_back(), Some((2, "b")));
    /// assert_eq!(map.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        self.table.pop_front()
    }

    /// Removes and returns the newest entry.
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        self.table.pop_back()
    }

    /// Keeps only the entries for which `f` returns `true`. Survivors keep
    /// their order.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(k, v));
    }

    /// Returns an iterator over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries in insertion order, with mutable
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys in insertion order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in insertion order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values in
    /// insertion order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes and yields every entry in insertion order.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, S> LinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn insert_at(&mut self, key: K, value: V, before: Option<SlotIndex>) -> (SlotIndex, Option<V>) {
        if let Some(before) = before {
            assert!(
                self.table.get(before).is_some(),
                "insert position {before:?} does not name a live entry"
            );
        }

        let hash = make_hash(&self.hash_builder, &key);
        let found = self.table.find_index(hash, |(k, _)| k == &key);
        match found {
            Some(index) => {
                let old = core::mem::replace(&mut entry_at(&mut self.table, index).1, value);
                (index, Some(old))
            }
            None => (self.table.insert_unique(hash, (key, value), before), None),
        }
    }

    /// Inserts a key-value pair at the back, returning the previous value for
    /// `key`. An existing key keeps its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::LinkedHashMap;
    ///
    /// let mut map = LinkedHashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.insert(1, "c"), Some("a"));
    /// assert_eq!(map.front(), Some((&1, &"c")));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_at(key, value, None).1
    }

    /// Inserts a key-value pair at the back and returns its slot, plus the
    /// previous value for `key`.
    pub fn insert_full(&mut self, key: K, value: V) -> (SlotIndex, Option<V>) {
        self.insert_at(key, value, None)
    }

    /// Inserts `key` immediately in front of the entry at `before` and
    /// returns the slot it ended up in. If `key` is already present only its
    /// value is replaced; it does not move.
    ///
    /// # Panics
    ///
    /// Panics if `before` does not name a live entry.
    pub fn insert_before(&mut self, key: K, value: V, before: SlotIndex) -> SlotIndex {
        self.insert_at(key, value, Some(before)).0
    }

    /// Returns the slot holding `key`.
    pub fn find(&self, key: &K) -> Option<SlotIndex> {
        let hash = make_hash(&self.hash_builder, key);
        self.table.find_index(hash, |(k, _)| k == key)
    }

    /// Returns a reference to the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and the value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let hash = make_hash(&self.hash_builder, key);
        self.table
            .find(hash, |(k, _)| k == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = make_hash(&self.hash_builder, key);
        self.table
            .find_mut(hash, |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Removes `key`, returning its value. Its neighbours become adjacent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = make_hash(&self.hash_builder, key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Moves `key` to the back of the order. Returns `false` if it is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tombstone_hash::LinkedHashMap;
    ///
    /// let mut map: LinkedHashMap<_, _> = [(1, ()), (2, ()), (3, ())].into_iter().collect();
    /// assert!(map.move_to_back(&1));
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, 3, 1]);
    /// ```
    pub fn move_to_back(&mut self, key: &K) -> bool {
        match self.find(key) {
            Some(index) => self.table.move_to_back(index),
            None => false,
        }
    }

    /// Returns the value for `key`, inserting `V::default()` at the back
    /// first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Gets the entry for `key` for in-place manipulation. Vacant entries
    /// insert at the back.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = make_hash(&self.hash_builder, &key);
        let found = self.table.find_index(hash, |(k, _)| k == &key);
        match found {
            Some(index) => Entry::Occupied(OccupiedEntry {
                table: &mut self.table,
                index,
            }),
            None => Entry::Vacant(VacantEntry {
                table: &mut self.table,
                hash,
                key,
            }),
        }
    }
}

impl<K, V, S> Default for LinkedHashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for LinkedHashMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, S> Eq for LinkedHashMap<K, V, S>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V, S> Index<&K> for LinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not present in LinkedHashMap"),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for LinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LinkedHashMap::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for LinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> IntoIterator for LinkedHashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinkedHashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut LinkedHashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in a [`LinkedHashMap`].
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `default` at the back if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` at the back if the entry is vacant.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts `V::default()` at the back if the entry is vacant.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in a [`LinkedHashMap`].
pub struct VacantEntry<'a, K, V> {
    table: &'a mut LinkedProbeTable<(K, V)>,
    hash: u64,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value at the back and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.insert_indexed(value).1
    }

    /// Inserts the value at the back and returns its slot together with a
    /// mutable reference to it.
    pub fn insert_indexed(self, value: V) -> (SlotIndex, &'a mut V) {
        let index = self.table.insert_unique(self.hash, (self.key, value), None);
        (index, &mut entry_at(self.table, index).1)
    }
}

/// A view into an occupied entry in a [`LinkedHashMap`].
pub struct OccupiedEntry<'a, K, V> {
    table: &'a mut LinkedProbeTable<(K, V)>,
    index: SlotIndex,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        match self.table.get(self.index) {
            Some((k, _)) => k,
            None => stale_slot(self.index),
        }
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match self.table.get(self.index) {
            Some((_, v)) => v,
            None => stale_slot(self.index),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut entry_at(self.table, self.index).1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut entry_at(self.table, self.index).1
    }

    /// Replaces the value, returning the old one. The position is kept.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Moves the entry to the back of the order.
    pub fn move_to_back(&mut self) {
        self.table.move_to_back(self.index);
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        match self.table.remove_at(self.index) {
            Some(entry) => entry,
            None => stale_slot(self.index),
        }
    }

    /// Returns the slot holding this entry.
    pub fn slot(&self) -> SlotIndex {
        self.index
    }
}

/// An insertion-order iterator over the entries of a `LinkedHashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::linked_hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An insertion-order iterator over the entries of a `LinkedHashMap` with
/// mutable values.
pub struct IterMut<'a, K, V> {
    inner: crate::linked_hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An insertion-order iterator over the keys of a `LinkedHashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

/// An insertion-order iterator over the values of a `LinkedHashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

/// An insertion-order iterator over mutable references to the values of a
/// `LinkedHashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining insertion-order iterator over the entries of a
/// `LinkedHashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::linked_hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Drain<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// An owning insertion-order iterator over the entries of a
/// `LinkedHashMap`.
pub struct IntoIter<K, V> {
    inner: crate::linked_hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}
