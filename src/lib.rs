#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Error types for fallible allocation.
pub mod error;

/// Hasher builders and the default hasher selection.
pub mod hash;

/// A HashMap built on the tombstone probe table.
///
/// This module provides a `HashMap` that wraps the `ProbeTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// A hash set built on the tombstone probe table.
pub mod hash_set;

pub mod hash_table;

/// An insertion-ordered HashMap.
pub mod linked_hash_map;

/// An insertion-ordered hash set.
pub mod linked_hash_set;

pub mod linked_hash_table;

mod slot_buffer;

pub use error::TryReserveError;
pub use hash::DefaultHashBuilder;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::ProbeTable;
pub use hash_table::SlotIndex;
pub use linked_hash_map::LinkedHashMap;
pub use linked_hash_set::LinkedHashSet;
pub use linked_hash_table::LinkedProbeTable;
