//! Hash adapters.
//!
//! The tables only ever mask the 64-bit value a [`BuildHasher`] produces, so
//! the quality of that value decides how long probe chains get. Two
//! deterministic hashers are provided alongside the randomly seeded default:
//!
//! - [`MixHasher`] folds input bytes with xor, rotate and multiply, then runs
//!   a final avalanche step. It suits integer and string keys alike.
//! - [`IdentityHasher`] returns the integer it was given unchanged. Only use
//!   it for keys that are already uniformly distributed.

use core::hash::BuildHasher;
use core::hash::BuildHasherDefault;
use core::hash::Hasher;

const PRIME: u64 = 0x0000_0100_0000_01b3;
const SEED: u64 = 0xcbf2_9ce4_8422_2325;

/// The 64-bit finaliser from MurmurHash3. Every input bit affects every
/// output bit.
#[inline]
pub fn mix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

#[inline(always)]
fn fold(h: u64, byte: u8) -> u64 {
    (h ^ byte as u64).rotate_left(5).wrapping_mul(PRIME)
}

/// A deterministic byte-wise mixing hasher.
///
/// Each byte is folded in as `h = (h ^ byte).rotate_left(5) * PRIME`. Integer
/// writes fold the eight 8-bit lanes of the value, lowest first.
/// [`finish`](Hasher::finish) applies [`mix64`] so that nearby inputs land in
/// unrelated slots.
///
/// # Examples
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use tombstone_hash::hash::BuildMixHasher;
///
/// let builder = BuildMixHasher::default();
/// assert_eq!(builder.hash_one(7u64), builder.hash_one(7u64));
/// assert_ne!(builder.hash_one(7u64), builder.hash_one(8u64));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MixHasher {
    state: u64,
}

impl Default for MixHasher {
    fn default() -> Self {
        Self { state: SEED }
    }
}

impl Hasher for MixHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = bytes.iter().fold(self.state, |h, &byte| fold(h, byte));
    }

    #[inline]
    fn write_u8(&mut self, n: u8) {
        self.state = fold(self.state, n);
    }

    #[inline]
    fn write_u16(&mut self, n: u16) {
        self.write(&n.to_le_bytes());
    }

    #[inline]
    fn write_u32(&mut self, n: u32) {
        self.write(&n.to_le_bytes());
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.write(&n.to_le_bytes());
    }

    #[inline]
    fn write_usize(&mut self, n: usize) {
        self.write_u64(n as u64);
    }

    #[inline]
    fn finish(&self) -> u64 {
        mix64(self.state)
    }
}

/// Builds [`MixHasher`]s. Deterministic across runs and platforms.
pub type BuildMixHasher = BuildHasherDefault<MixHasher>;

/// A hasher that passes integer keys through untouched.
///
/// Writing an integer replaces the state with that integer, so `finish`
/// returns the last integer written. Byte slices, e.g. from `str` keys, are
/// folded like [`MixHasher`] without the finaliser.
///
/// Keys hashed this way pick their home slot from their low bits directly;
/// sequential or strided keys cluster badly.
///
/// # Examples
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use tombstone_hash::hash::BuildIdentityHasher;
///
/// let builder = BuildIdentityHasher::default();
/// assert_eq!(builder.hash_one(0xdead_beef_u64), 0xdead_beef);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHasher {
    state: u64,
}

impl Hasher for IdentityHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = bytes.iter().fold(self.state, |h, &byte| fold(h, byte));
    }

    #[inline]
    fn write_u8(&mut self, n: u8) {
        self.state = n as u64;
    }

    #[inline]
    fn write_u16(&mut self, n: u16) {
        self.state = n as u64;
    }

    #[inline]
    fn write_u32(&mut self, n: u32) {
        self.state = n as u64;
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.state = n;
    }

    #[inline]
    fn write_usize(&mut self, n: usize) {
        self.state = n as u64;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Builds [`IdentityHasher`]s.
pub type BuildIdentityHasher = BuildHasherDefault<IdentityHasher>;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is named: `foldhash`'s randomly
        /// seeded fast hasher.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is named: the standard library's
        /// randomly seeded SipHash.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// The hasher builder used when none is named. Without `std` or
        /// `foldhash` there is no seed source, so this is the deterministic
        /// [`BuildMixHasher`].
        pub type DefaultHashBuilder = BuildMixHasher;
    }
}

/// Hashes `value` with `builder`. The single place the collections turn keys
/// into table hashes.
#[inline]
pub(crate) fn make_hash<Q, S>(builder: &S, value: &Q) -> u64
where
    Q: core::hash::Hash + ?Sized,
    S: BuildHasher,
{
    builder.hash_one(value)
}
