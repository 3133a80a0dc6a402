//! The raw open addressing table.
//!
//! [`ProbeTable`] stores values of type `V` in a power-of-two array of slots
//! and resolves collisions with linear probing. Erased slots are tombstoned in
//! a 2-bit state bitmap rather than emptied, so probe chains that pass through
//! them stay intact. Callers supply the 64-bit hash and an equality predicate
//! for every operation; the table never hashes anything itself.

use core::fmt::Debug;

use crate::error::TryReserveError;
use crate::slot_buffer::SlotBuffer;
use crate::slot_buffer::SlotState;

/// Number of slots allocated by [`ProbeTable::new`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Fixed-point scale of [`ProbeTable::load`]: a load of `LOAD_MULTIPLIER`
/// means every slot is occupied or tombstoned.
pub const LOAD_MULTIPLIER: usize = 1 << 17;

/// Load above which the table doubles its capacity: half of
/// [`LOAD_MULTIPLIER`], i.e. a 0.5 load factor.
pub const LOAD_FACTOR: usize = 1 << 16;

#[inline(always)]
fn fixed_load(used: usize, capacity: usize) -> usize {
    ((used as u128 * LOAD_MULTIPLIER as u128) / capacity as u128) as usize
}

#[inline(always)]
pub(crate) fn exceeds_load(populated: usize, tombstones: usize, capacity: usize) -> bool {
    fixed_load(populated.saturating_add(tombstones), capacity) > LOAD_FACTOR
}

/// Smallest capacity, no smaller than [`DEFAULT_CAPACITY`], that holds
/// `required` entries without exceeding the load limit.
pub(crate) fn capacity_for(required: usize) -> Result<usize, TryReserveError> {
    required
        .checked_mul(LOAD_MULTIPLIER / LOAD_FACTOR)
        .and_then(usize::checked_next_power_of_two)
        .map(|capacity| capacity.max(DEFAULT_CAPACITY))
        .ok_or(TryReserveError::CapacityOverflow)
}

#[cold]
#[inline(never)]
fn probe_exhausted(capacity: usize) -> ! {
    panic!("probe visited all {capacity} slots without finding a free one");
}

#[cold]
#[inline(never)]
fn missing_entry(index: usize) -> ! {
    panic!("slot {index} is marked occupied but holds no entry");
}

/// The contents of an occupied slot. The hash is kept so that resizing never
/// calls back into the caller's hasher.
#[derive(Clone)]
pub(crate) struct Bucket<V> {
    pub(crate) hash: u64,
    pub(crate) value: V,
}

/// A handle naming one slot of a table.
///
/// Handles are returned by insertion and lookup and accepted by the positional
/// accessors. A handle stays valid until the table is resized or the entry in
/// its slot is removed. Using a stale handle is never undefined behavior: the
/// accessors return `None` if the slot is no longer occupied, but a handle
/// kept across a resize may name an unrelated entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub(crate) usize);

impl SlotIndex {
    /// Returns the raw slot number.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outcome of an insertion probe.
pub(crate) enum Probe {
    /// The predicate matched the occupied slot at this index.
    Found(usize),
    /// The key is absent; this is the first reusable slot on its probe path.
    Vacant(usize),
}

/// Per-entry displacement counts. Bin `d` holds the number of entries stored
/// `d` slots past their home slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Entry counts indexed by displacement.
    pub bins: alloc::vec::Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// The largest displacement of any entry, or `None` for an empty table.
    pub fn max_displacement(&self) -> Option<usize> {
        self.bins.iter().rposition(|&count| count != 0)
    }

    /// Average displacement over all entries.
    pub fn mean(&self) -> f64 {
        let (entries, total) = self
            .bins
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |(entries, total), (distance, &count)| {
                (entries + count, total + distance * count)
            });
        if entries == 0 {
            0.0
        } else {
            total as f64 / entries as f64
        }
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!(
            "probe histogram ({} entries, mean displacement {:.3}):",
            self.bins.iter().sum::<usize>(),
            self.mean()
        );

        for (distance, &count) in self.bins.iter().enumerate() {
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            match units % 8 {
                0 => {}
                1 => bar.push('▏'),
                2 => bar.push('▎'),
                3 => bar.push('▍'),
                4 => bar.push('▌'),
                5 => bar.push('▋'),
                6 => bar.push('▊'),
                _ => bar.push('▉'),
            }
            println!("{distance:>4} | {bar} ({count})");
        }
    }
}

/// Debug statistics for table analysis.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of slots.
    pub capacity: usize,
    /// Number of tombstoned slots.
    pub tombstones: usize,
    /// `(populated + tombstones) / capacity`.
    pub load_factor: f64,
    /// Bytes owned by the slot array and the state bitmap.
    pub total_bytes: usize,
    /// Bytes held by slots that contain no live entry.
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({} tombstones, {:.2}% load factor)",
            self.populated,
            self.capacity,
            self.tombstones,
            self.load_factor * 100.0
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// An open addressing hash table with linear probing and tombstoned
/// deletion.
///
/// `ProbeTable<V>` stores values of type `V`. Like a raw table it requires you
/// to provide both the hash value and an equality predicate for each
/// operation.
///
/// ## Layout
///
/// - Capacity is always a power of two. The home slot of a hash is
///   `hash & (capacity - 1)`; probing steps forward one slot at a time,
///   wrapping at the end, for at most `capacity` steps.
/// - Each slot owns two bits of state (available, occupied, deleted) in a
///   bitmap kept next to the slot array.
/// - Erasing an entry marks its slot deleted. Tombstones count toward the load
///   and are purged when the table is rehashed.
/// - Right after an insertion claims a slot, the table doubles its capacity
///   if `(len + tombstones) / capacity` exceeds one half.
/// - Growth always doubles, even when most of the load is tombstones. A
///   workload that keeps removing old keys and inserting new ones therefore
///   grows the capacity without bound at a constant [`len`](Self::len). Call
///   [`shrink_to_fit`](Self::shrink_to_fit) to purge tombstones and give the
///   slots back.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use siphasher::sip::SipHasher;
/// # use tombstone_hash::hash_table::Entry;
/// # use tombstone_hash::hash_table::ProbeTable;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = ProbeTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).map(|p| p.name.as_str()), Some("Alice"));
/// ```
#[derive(Clone)]
pub struct ProbeTable<V> {
    buffer: SlotBuffer<Bucket<V>>,
    populated: usize,
    tombstones: usize,
}

impl<V> Debug for ProbeTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProbeTable")
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("load", &self.load())
            .field("buffer", &self.buffer)
            .finish()
    }
}

impl<V> Default for ProbeTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ProbeTable<V> {
    /// Creates an empty table with [`DEFAULT_CAPACITY`] slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let table: ProbeTable<u32> = ProbeTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with exactly `capacity` slots.
    ///
    /// `capacity` must be a power of two. This is checked with a debug
    /// assertion only. Because the table grows as soon as half of its slots
    /// are used, it holds `capacity / 2` entries before the first resize.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let table: ProbeTable<String> = ProbeTable::with_capacity(256);
    /// assert_eq!(table.capacity(), 256);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(table) => table,
            Err(err) => err.fail(),
        }
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns an error if the slot array cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            buffer: SlotBuffer::try_with_capacity(capacity)?,
            populated: 0,
            tombstones: 0,
        })
    }

    /// Returns the number of live entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// assert_eq!(table.len(), 0);
    ///
    /// table.insert(7, 7u64, |&n| n == 7);
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no live entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots. Always a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns the number of tombstoned slots.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns `(len + tombstones) / capacity` in fixed point, scaled by
    /// [`LOAD_MULTIPLIER`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::LOAD_MULTIPLIER;
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::with_capacity(16);
    /// for n in 0..4u64 {
    ///     table.insert(n, n, |&v| v == n);
    /// }
    /// assert_eq!(table.load(), LOAD_MULTIPLIER / 4);
    /// ```
    #[inline]
    pub fn load(&self) -> usize {
        fixed_load(self.populated + self.tombstones, self.capacity())
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    /// Walks the probe path of `hash` looking for a match.
    #[inline]
    fn probe_find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let mask = self.mask();
        let mut index = hash as usize & mask;
        for _ in 0..self.capacity() {
            match self.buffer.state(index) {
                SlotState::Available => return None,
                SlotState::Deleted => {}
                SlotState::Occupied => {
                    if let Some(bucket) = self.buffer.get(index) {
                        if bucket.hash == hash && eq(&bucket.value) {
                            return Some(index);
                        }
                    }
                }
            }
            index = (index + 1) & mask;
        }

        None
    }

    /// Walks the probe path of `hash` until the key is either found or proven
    /// absent.
    ///
    /// The first tombstone passed is remembered and reused, but the walk only
    /// stops at an available slot or after visiting every slot, so a matching
    /// entry stored beyond a tombstone is still found.
    #[inline]
    pub(crate) fn probe_insert(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut reusable = None;
        for _ in 0..self.capacity() {
            match self.buffer.state(index) {
                SlotState::Available => return Probe::Vacant(reusable.unwrap_or(index)),
                SlotState::Deleted => {
                    reusable.get_or_insert(index);
                }
                SlotState::Occupied => {
                    if let Some(bucket) = self.buffer.get(index) {
                        if bucket.hash == hash && eq(&bucket.value) {
                            return Probe::Found(index);
                        }
                    }
                }
            }
            index = (index + 1) & mask;
        }

        match reusable {
            Some(index) => Probe::Vacant(index),
            None => probe_exhausted(self.capacity()),
        }
    }

    /// First slot on the probe path of `hash` that is not occupied. Only valid
    /// when the caller already knows the key is absent.
    #[inline]
    pub(crate) fn vacant_index(&self, hash: u64) -> usize {
        let mask = self.mask();
        let mut index = hash as usize & mask;
        for _ in 0..self.capacity() {
            if self.buffer.state(index) != SlotState::Occupied {
                return index;
            }
            index = (index + 1) & mask;
        }
        probe_exhausted(self.capacity())
    }

    /// Stores a new entry in the non-occupied slot `index` without checking
    /// the load.
    #[inline]
    pub(crate) fn occupy(&mut self, index: usize, hash: u64, value: V) -> SlotIndex {
        if self.buffer.state(index) == SlotState::Deleted {
            self.tombstones -= 1;
        }
        self.buffer.occupy(index, Bucket { hash, value });
        self.populated += 1;
        SlotIndex(index)
    }

    #[inline]
    pub(crate) fn needs_grow(&self) -> bool {
        exceeds_load(self.populated, self.tombstones, self.capacity())
    }

    /// Stores a new entry in slot `index` and grows the table if the load
    /// limit is now exceeded. Returns where the entry ended up.
    #[inline]
    fn claim(&mut self, index: usize, hash: u64, value: V) -> usize {
        let slot = self.occupy(index, hash, value);
        if self.needs_grow() {
            self.grow(slot.0)
        } else {
            slot.0
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, track: usize) -> usize {
        let new_capacity = match self.capacity().checked_mul(2) {
            Some(capacity) => capacity,
            None => TryReserveError::CapacityOverflow.fail(),
        };
        match self.try_rehash(new_capacity, Some(track)) {
            Ok(Some(index)) => index,
            Ok(None) => missing_entry(track),
            Err(err) => err.fail(),
        }
    }

    /// Replaces the slot buffer with an empty one of `new_capacity` slots and
    /// returns the old buffer. Tombstones are forgotten; the live count is
    /// kept, so every entry of the returned buffer must be
    /// [`place`](Self::place)d back.
    pub(crate) fn swap_buffer(
        &mut self,
        new_capacity: usize,
    ) -> Result<SlotBuffer<Bucket<V>>, TryReserveError> {
        let fresh = SlotBuffer::try_with_capacity(new_capacity)?;
        log::trace!(
            "rehash {} -> {} slots ({} live, {} tombstones dropped)",
            self.capacity(),
            new_capacity,
            self.populated,
            self.tombstones
        );
        self.tombstones = 0;
        Ok(core::mem::replace(&mut self.buffer, fresh))
    }

    /// Stores an entry taken from the previous buffer during a rehash. The
    /// table holds no tombstones and no duplicate of the key at this point.
    pub(crate) fn place(&mut self, hash: u64, value: V) -> SlotIndex {
        let index = self.vacant_index(hash);
        self.buffer.occupy(index, Bucket { hash, value });
        SlotIndex(index)
    }

    /// Rehashes into `new_capacity` slots. Returns the new index of the entry
    /// that lived at `track`, if given.
    fn try_rehash(
        &mut self,
        new_capacity: usize,
        track: Option<usize>,
    ) -> Result<Option<usize>, TryReserveError> {
        debug_assert!(
            !exceeds_load(self.populated, 0, new_capacity) || new_capacity > self.capacity(),
            "rehash to {new_capacity} slots cannot hold {} entries",
            self.populated
        );

        let old = self.swap_buffer(new_capacity)?;
        let mut tracked = None;
        for (index, bucket) in old.into_occupied() {
            let placed = self.place(bucket.hash, bucket.value);
            if Some(index) == track {
                tracked = Some(placed.0);
            }
        }
        Ok(tracked)
    }

    /// Rehashes every live entry into a fresh buffer of `new_capacity` slots,
    /// dropping all tombstones.
    ///
    /// `new_capacity` must be a power of two large enough to hold the current
    /// entries under the load limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// for n in 0..5u64 {
    ///     table.insert(n, n, |&v| v == n);
    /// }
    /// table.remove(0, |&v| v == 0);
    /// assert_eq!(table.tombstones(), 1);
    ///
    /// table.resize(64);
    /// assert_eq!(table.capacity(), 64);
    /// assert_eq!(table.tombstones(), 0);
    /// assert_eq!(table.find(4, |&v| v == 4), Some(&4));
    /// ```
    pub fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two());
        assert!(
            !exceeds_load(self.populated, 0, new_capacity),
            "{new_capacity} slots cannot hold {} entries",
            self.populated
        );
        if let Err(err) = self.try_rehash(new_capacity, None) {
            err.fail();
        }
    }

    /// Reserves room for at least `additional` more entries without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table: ProbeTable<u64> = ProbeTable::new();
    /// table.reserve(100);
    /// assert!(table.capacity() >= 200);
    /// ```
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
    /// The table is unchanged in that case.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        if !exceeds_load(required, self.tombstones, self.capacity()) {
            return Ok(());
        }

        let new_capacity = capacity_for(required)?.max(self.capacity());
        self.try_rehash(new_capacity, None)?;
        Ok(())
    }

    /// Shrinks the table to the smallest capacity that holds its entries
    /// under the load limit, and purges tombstones.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(1024);
    /// table.insert(1, 1, |&v| v == 1);
    /// table.shrink_to_fit();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        let target = match capacity_for(self.populated) {
            Ok(capacity) => capacity.min(self.capacity()),
            Err(_) => self.capacity(),
        };
        if target == self.capacity() && self.tombstones == 0 {
            return;
        }

        log::debug!(
            "shrink {} -> {} slots ({} live)",
            self.capacity(),
            target,
            self.populated
        );
        if let Err(err) = self.try_rehash(target, None) {
            err.fail();
        }
    }

    /// Removes every entry, keeping the capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// table.insert(1, 1u64, |&v| v == 1);
    /// table.insert(2, 2u64, |&v| v == 2);
    /// table.remove(1, |&v| v == 1);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.tombstones(), 0);
    /// ```
    pub fn clear(&mut self) {
        if self.populated != 0 {
            log::debug!(
                "clear {} entries from {} slots",
                self.populated,
                self.capacity()
            );
        }
        self.buffer.reset();
        self.populated = 0;
        self.tombstones = 0;
    }

    /// Returns the handle of a matching entry.
    #[inline]
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<SlotIndex> {
        self.probe_find(hash, eq).map(SlotIndex)
    }

    /// Returns a reference to a matching value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use siphasher::sip::SipHasher;
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ProbeTable::new();
    /// table.insert(hash_str("key"), "key".to_string(), |s| s == "key");
    ///
    /// assert_eq!(
    ///     table.find(hash_str("key"), |s| s == "key"),
    ///     Some(&"key".to_string())
    /// );
    /// assert_eq!(table.find(hash_str("nope"), |s| s == "nope"), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.probe_find(hash, eq)?;
        self.buffer.get(index).map(|bucket| &bucket.value)
    }

    /// Returns a mutable reference to a matching value.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.probe_find(hash, eq)?;
        self.buffer.get_mut(index).map(|bucket| &mut bucket.value)
    }

    /// Returns the value in slot `index`, or `None` if that slot is not
    /// occupied.
    #[inline]
    pub fn get(&self, index: SlotIndex) -> Option<&V> {
        self.buffer.get(index.0).map(|bucket| &bucket.value)
    }

    /// Returns the value in slot `index` mutably, or `None` if that slot is
    /// not occupied.
    #[inline]
    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut V> {
        self.buffer.get_mut(index.0).map(|bucket| &mut bucket.value)
    }

    /// Returns the hash stored with the entry in slot `index`.
    #[inline]
    pub fn hash_at(&self, index: SlotIndex) -> Option<u64> {
        self.buffer.get(index.0).map(|bucket| bucket.hash)
    }

    /// Every slot in index order, `None` where no live entry is stored.
    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = Option<&mut V>> + '_ {
        self.buffer
            .entries_mut()
            .map(|slot| slot.as_mut().map(|bucket| &mut bucket.value))
    }

    #[inline(always)]
    fn slot_mut(&mut self, index: usize) -> &mut V {
        match self.buffer.get_mut(index) {
            Some(bucket) => &mut bucket.value,
            None => missing_entry(index),
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use siphasher::sip::SipHasher;
    /// # use tombstone_hash::hash_table::Entry;
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ProbeTable::new();
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    ///
    /// table
    ///     .entry(hash, |s: &String| s == "hello")
    ///     .or_insert("unused".to_string());
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.probe_insert(hash, eq) {
            Probe::Found(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Probe::Vacant(index) => Entry::Vacant(VacantEntry {
                table: self,
                hash,
                index,
            }),
        }
    }

    /// Inserts `value`, replacing the matching value if there is one.
    ///
    /// Returns the slot the value ended up in (after any resize) and the
    /// replaced value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// let (slot, old) = table.insert(9, (9u64, "a"), |&(k, _)| k == 9);
    /// assert_eq!(old, None);
    /// assert_eq!(table.get(slot), Some(&(9, "a")));
    ///
    /// let (_, old) = table.insert(9, (9u64, "b"), |&(k, _)| k == 9);
    /// assert_eq!(old, Some((9, "a")));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, hash: u64, value: V, eq: impl Fn(&V) -> bool) -> (SlotIndex, Option<V>) {
        match self.probe_insert(hash, eq) {
            Probe::Found(index) => {
                let old = core::mem::replace(self.slot_mut(index), value);
                (SlotIndex(index), Some(old))
            }
            Probe::Vacant(index) => (SlotIndex(self.claim(index, hash, value)), None),
        }
    }

    /// Removes and returns a matching value. Removing an absent value leaves
    /// the table untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// table.insert(42, 42u64, |&n| n == 42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.probe_find(hash, eq)?;
        self.remove_at(SlotIndex(index))
    }

    /// Removes the value in slot `index`, tombstoning the slot.
    pub fn remove_at(&mut self, index: SlotIndex) -> Option<V> {
        let bucket = self.buffer.vacate(index.0)?;
        self.populated -= 1;
        self.tombstones += 1;
        Some(bucket.value)
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut cursor = 0;
        while let Some(index) = self.buffer.next_occupied(cursor) {
            cursor = index + 1;
            if !f(self.slot_mut(index)) {
                drop(self.remove_at(SlotIndex(index)));
            }
        }
    }

    /// Returns an iterator over the values in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// for n in [3u64, 1, 2] {
    ///     table.insert(n, n, |&v| v == n);
    /// }
    /// let mut values: Vec<_> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, vec![1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buffer: &self.buffer,
            index: 0,
            remaining: self.populated,
        }
    }

    /// Returns an iterator that yields `(SlotIndex, &V)` in slot order.
    pub fn iter_indexed(&self) -> IterIndexed<'_, V> {
        IterIndexed { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values in slot
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.buffer.entries_mut(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields every value.
    ///
    /// The table is empty, with no tombstones, once the iterator is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table = ProbeTable::new();
    /// table.insert(1, 1u64, |&v| v == 1);
    /// table.insert(2, 2u64, |&v| v == 2);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Returns the displacement histogram of the live entries.
    ///
    /// Available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mask = self.mask();
        let mut bins = alloc::vec::Vec::new();
        let mut cursor = 0;
        while let Some(index) = self.buffer.next_occupied(cursor) {
            cursor = index + 1;
            if let Some(bucket) = self.buffer.get(index) {
                let distance = index.wrapping_sub(bucket.hash as usize & mask) & mask;
                if bins.len() <= distance {
                    bins.resize(distance + 1, 0);
                }
                bins[distance] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns occupancy and memory statistics.
    ///
    /// Available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let (occupied, deleted) = self.buffer.count_states();
        debug_assert_eq!(occupied, self.populated);
        debug_assert_eq!(deleted, self.tombstones);

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            tombstones: self.tombstones,
            load_factor: (self.populated + self.tombstones) as f64 / self.capacity() as f64,
            total_bytes: self.buffer.byte_size(),
            wasted_bytes: (self.capacity() - self.populated)
                * core::mem::size_of::<Option<Bucket<V>>>(),
        }
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`ProbeTable`].
///
/// [`entry`]: ProbeTable::entry
pub enum Entry<'a, V> {
    /// The table holds no matching value.
    Vacant(VacantEntry<'a, V>),
    /// The table holds a matching value.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Modifies an occupied entry in place.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns the slot this entry names or would be inserted into.
    pub fn slot(&self) -> SlotIndex {
        match self {
            Entry::Occupied(entry) => entry.slot(),
            Entry::Vacant(entry) => SlotIndex(entry.index),
        }
    }
}

impl<'a, V> Entry<'a, V>
where
    V: Default,
{
    /// Inserts `V::default()` if the entry is vacant.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry of a [`ProbeTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut ProbeTable<V>,
    hash: u64,
    index: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts `value` and returns a mutable reference to it.
    ///
    /// If the insertion crosses the load limit the table grows first; the
    /// returned reference points at the entry's new location.
    pub fn insert(self, value: V) -> &'a mut V {
        self.insert_indexed(value).1
    }

    /// Inserts `value` and returns its slot (after any resize) together with
    /// a mutable reference to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tombstone_hash::hash_table::Entry;
    /// # use tombstone_hash::hash_table::ProbeTable;
    /// #
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(4);
    /// table.insert(0, 0, |&v| v == 0);
    /// table.insert(1, 1, |&v| v == 1);
    ///
    /// // The third entry pushes the load past one half.
    /// let Entry::Vacant(entry) = table.entry(2, |&v| v == 2) else {
    ///     unreachable!()
    /// };
    /// let (slot, value) = entry.insert_indexed(2);
    /// *value += 10;
    ///
    /// assert_eq!(table.capacity(), 8);
    /// assert_eq!(table.get(slot), Some(&12));
    /// ```
    pub fn insert_indexed(self, value: V) -> (SlotIndex, &'a mut V) {
        let table = self.table;
        let index = table.claim(self.index, self.hash, value);
        (SlotIndex(index), table.slot_mut(index))
    }

    /// Returns the hash this entry was looked up with.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// A view into an occupied entry of a [`ProbeTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut ProbeTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        match self.table.buffer.get(self.index) {
            Some(bucket) => &bucket.value,
            None => missing_entry(self.index),
        }
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.slot_mut(self.index)
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        self.table.slot_mut(self.index)
    }

    /// Removes the value from the table, tombstoning its slot.
    pub fn remove(self) -> V {
        match self.table.remove_at(SlotIndex(self.index)) {
            Some(value) => value,
            None => missing_entry(self.index),
        }
    }

    /// Returns the slot holding this entry.
    pub fn slot(&self) -> SlotIndex {
        SlotIndex(self.index)
    }
}

/// An iterator over the values of a [`ProbeTable`], in slot order.
///
/// This struct is created by [`ProbeTable::iter`].
pub struct Iter<'a, V> {
    buffer: &'a SlotBuffer<Bucket<V>>,
    index: usize,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    #[inline]
    fn next_indexed(&mut self) -> Option<(usize, &'a V)> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.buffer.next_occupied(self.index)?;
        self.index = index + 1;
        self.remaining -= 1;
        self.buffer.get(index).map(|bucket| (index, &bucket.value))
    }
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_indexed().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> core::iter::FusedIterator for Iter<'_, V> {}

/// An iterator over `(SlotIndex, &V)` pairs of a [`ProbeTable`].
///
/// This struct is created by [`ProbeTable::iter_indexed`].
pub struct IterIndexed<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for IterIndexed<'a, V> {
    type Item = (SlotIndex, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next_indexed()
            .map(|(index, value)| (SlotIndex(index), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A mutable iterator over the values of a [`ProbeTable`], in slot order.
///
/// This struct is created by [`ProbeTable::iter_mut`].
pub struct IterMut<'a, V> {
    inner: core::slice::IterMut<'a, Option<Bucket<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.inner.by_ref() {
            if let Some(bucket) = slot {
                self.remaining -= 1;
                return Some(&mut bucket.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`ProbeTable`].
///
/// This struct is created by [`ProbeTable::drain`].
pub struct Drain<'a, V> {
    table: &'a mut ProbeTable<V>,
    index: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        self.table.clear();
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.table.populated == 0 {
            return None;
        }

        let index = self.table.buffer.next_occupied(self.index)?;
        self.index = index + 1;
        let bucket = self.table.buffer.vacate(index)?;
        self.table.populated -= 1;
        self.table.tombstones += 1;
        Some(bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

/// An owning iterator over the values of a [`ProbeTable`], in slot order.
pub struct IntoIter<V> {
    inner: alloc::vec::IntoIter<Option<Bucket<V>>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.inner.by_ref() {
            if let Some(bucket) = slot {
                self.remaining -= 1;
                return Some(bucket.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for ProbeTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            inner: self.buffer.into_entries(),
        }
    }
}

impl<'a, V> IntoIterator for &'a ProbeTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut ProbeTable<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
