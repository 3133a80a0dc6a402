//! Slot storage shared by every table in the crate.
//!
//! A [`SlotBuffer`] owns the entry array of a table together with a packed
//! state bitmap holding two bits per slot. The bitmap is what the probe loops
//! consult; the entry array only ever holds a constructed value for slots whose
//! state is [`SlotState::Occupied`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;

use crate::error::TryReserveError;

/// Low bit of every 2-bit state, i.e. the `occupied` bit of all 32 slots
/// packed into one bitmap word.
const OCCUPIED_MASK: u64 = 0x5555_5555_5555_5555;

/// Number of slot states packed into one bitmap word.
const STATES_PER_WORD: usize = 32;

/// The state of a single slot, stored as two bits in the bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum SlotState {
    /// Never used since the last clear or rehash. Terminates lookups.
    Available = 0,
    /// Holds a live entry.
    Occupied = 1,
    /// Vacated by an erase. Lookups must probe past it.
    Deleted = 2,
}

impl SlotState {
    /// `Occupied | Deleted`. Only ever used as a mask: a slot whose bits under
    /// this mask are zero can be claimed by an insert.
    pub(crate) const RECYCLED_MASK: u8 = 0b11;

    #[inline(always)]
    fn from_bits(bits: u64) -> Self {
        match bits as u8 & Self::RECYCLED_MASK {
            0 => SlotState::Available,
            1 => SlotState::Occupied,
            2 => SlotState::Deleted,
            _ => corrupted_state(),
        }
    }
}

#[cold]
#[inline(never)]
fn corrupted_state() -> ! {
    panic!("slot bitmap holds the reserved occupied|deleted pattern");
}

/// Byte length of the state bitmap for `capacity` slots: a quarter byte per
/// slot, rounded up to a whole 8-byte word.
#[inline(always)]
pub(crate) fn bitmap_capacity(capacity: usize) -> usize {
    (((capacity + 3) >> 2) + 7) & !7
}

#[inline(always)]
fn bitmap_idx(index: usize) -> usize {
    index >> 5
}

#[inline(always)]
fn bitmap_shift(index: usize) -> usize {
    (index << 1) & 63
}

fn layout_error<T>(len: usize) -> TryReserveError {
    match Layout::array::<T>(len) {
        Ok(layout) => TryReserveError::AllocError { layout },
        Err(_) => TryReserveError::CapacityOverflow,
    }
}

/// Owned storage for `capacity` slots plus their state bitmap.
///
/// Invariant: `entries[i].is_some()` exactly when `state(i)` is
/// [`SlotState::Occupied`]. Dropping or cloning the buffer therefore only
/// touches constructed entries.
#[derive(Clone)]
pub(crate) struct SlotBuffer<T> {
    entries: Box<[Option<T>]>,
    states: Box<[u64]>,
}

impl<T> SlotBuffer<T> {
    /// Allocates a buffer with every slot [`SlotState::Available`].
    ///
    /// Panics on capacity overflow and aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if the
    /// allocator fails.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(buffer) => buffer,
            Err(err) => err.fail(),
        }
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        debug_assert!(
            capacity.is_power_of_two(),
            "slot capacity {capacity} is not a power of two"
        );

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|_| layout_error::<Option<T>>(capacity))?;
        entries.resize_with(capacity, || None);

        let words = bitmap_capacity(capacity) / core::mem::size_of::<u64>();
        let mut states = Vec::new();
        states
            .try_reserve_exact(words)
            .map_err(|_| layout_error::<u64>(words))?;
        states.resize(words, 0);

        Ok(Self {
            entries: entries.into_boxed_slice(),
            states: states.into_boxed_slice(),
        })
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub(crate) fn state(&self, index: usize) -> SlotState {
        SlotState::from_bits(self.states[bitmap_idx(index)] >> bitmap_shift(index))
    }

    #[inline(always)]
    fn set_state(&mut self, index: usize, state: SlotState) {
        let word = &mut self.states[bitmap_idx(index)];
        *word &= !((SlotState::RECYCLED_MASK as u64) << bitmap_shift(index));
        *word |= (state as u64) << bitmap_shift(index);
    }

    /// Constructs `value` in slot `index` and marks it occupied.
    #[inline]
    pub(crate) fn occupy(&mut self, index: usize, value: T) {
        debug_assert_ne!(self.state(index), SlotState::Occupied);
        self.entries[index] = Some(value);
        self.set_state(index, SlotState::Occupied);
    }

    /// Moves the entry out of slot `index`, leaving a tombstone.
    #[inline]
    pub(crate) fn vacate(&mut self, index: usize) -> Option<T> {
        let value = self.entries.get_mut(index)?.take()?;
        self.set_state(index, SlotState::Deleted);
        Some(value)
    }

    /// Moves the entry out of slot `index`, leaving the slot available.
    ///
    /// Only valid while the whole buffer is being dismantled (rehash):
    /// marking a slot available in a live table cuts probe chains.
    #[inline]
    pub(crate) fn take(&mut self, index: usize) -> Option<T> {
        let value = self.entries.get_mut(index)?.take()?;
        self.set_state(index, SlotState::Available);
        Some(value)
    }

    #[inline(always)]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)?.as_ref()
    }

    #[inline(always)]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)?.as_mut()
    }

    /// Drops every entry and marks every slot available.
    pub(crate) fn reset(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.states.fill(0);
    }

    /// Returns the first occupied slot at or after `from`.
    ///
    /// Whole bitmap words without an occupied bit are skipped at once.
    #[inline]
    pub(crate) fn next_occupied(&self, from: usize) -> Option<usize> {
        let capacity = self.capacity();
        let mut index = from;
        while index < capacity {
            let bits = (self.states[bitmap_idx(index)] >> bitmap_shift(index)) & OCCUPIED_MASK;
            if bits != 0 {
                let found = index + bits.trailing_zeros() as usize / 2;
                return (found < capacity).then_some(found);
            }
            index = (index | (STATES_PER_WORD - 1)) + 1;
        }
        None
    }

    /// Mutable view of the slots, in index order. `None` slots are vacant.
    pub(crate) fn entries_mut(&mut self) -> core::slice::IterMut<'_, Option<T>> {
        self.entries.iter_mut()
    }

    /// Consumes the buffer, yielding every slot in index order.
    pub(crate) fn into_entries(self) -> alloc::vec::IntoIter<Option<T>> {
        self.entries.into_vec().into_iter()
    }

    /// Consumes the buffer, yielding `(index, entry)` for every occupied slot
    /// in index order. Tombstones are discarded.
    pub(crate) fn into_occupied(self) -> impl Iterator<Item = (usize, T)> {
        self.into_entries()
            .enumerate()
            .filter_map(|(index, entry)| entry.map(|value| (index, value)))
    }

    /// Counts `(occupied, deleted)` slots by scanning the bitmap.
    #[cfg_attr(not(any(test, feature = "stats")), allow(dead_code))]
    pub(crate) fn count_states(&self) -> (usize, usize) {
        self.states.iter().fold((0, 0), |(occupied, deleted), &word| {
            (
                occupied + (word & OCCUPIED_MASK).count_ones() as usize,
                deleted + ((word >> 1) & OCCUPIED_MASK).count_ones() as usize,
            )
        })
    }

    /// Bytes owned by the entry array and the bitmap.
    #[cfg_attr(not(any(test, feature = "stats")), allow(dead_code))]
    pub(crate) fn byte_size(&self) -> usize {
        core::mem::size_of_val(&*self.entries) + core::mem::size_of_val(&*self.states)
    }
}

impl<T> Debug for SlotBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;

        let rows = (0..self.capacity())
            .collect::<Vec<_>>()
            .chunks(STATES_PER_WORD)
            .map(|row| {
                row.iter()
                    .map(|&index| match self.state(index) {
                        SlotState::Available => '.',
                        SlotState::Occupied => '#',
                        SlotState::Deleted => 'x',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>();

        f.debug_struct("SlotBuffer")
            .field("capacity", &self.capacity())
            .field("states", &rows)
            .finish()
    }
}
