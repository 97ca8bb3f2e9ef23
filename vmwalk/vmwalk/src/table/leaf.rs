//! # Leaf Table
//!
//! The last level, indexed by VA bits `[20:12]`. A leaf entry maps a 4 KiB
//! frame instead of referencing another table, so the three-way directory
//! classification does not apply here: a leaf entry is either empty or it
//! carries a value the caller interprets (frame number, permission bits).
//! The walk returns the leaf slot without reading it.
//!
//! A non-empty, non-present leaf entry is *not* a structural fault; callers
//! use such values for their own bookkeeping (a swapped-out mapping, say),
//! which is exactly why the walker leaves interpretation to them.

use crate::entry_bits::EntryBits;
use crate::table::{LevelEntry, TableIndex};
use vmwalk_addresses::{PhysicalFrame, VirtualAddress};

/// Index into a leaf table (VA bits `[20:12]`).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LeafIndex(u16);

/// A leaf entry: maps one 4 KiB frame, or holds caller-defined bits.
#[doc(alias = "PTE")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct LeafEntry(EntryBits);

/// 512 entries, 4 KiB-aligned.
#[doc(alias = "PT")]
#[repr(C, align(4096))]
pub struct LeafTable {
    entries: [LeafEntry; 512],
}

impl LeafIndex {
    /// Extract VA bits `[20:12]`. Returns a value in `0..512`.
    #[inline]
    #[must_use]
    pub const fn of_address(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 12) & 0x1FF) as u16)
    }

    /// Construct from a raw `u16`; debug builds assert `v < 512`.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!(v < 512);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TableIndex for LeafIndex {
    #[inline]
    fn as_usize(self) -> usize {
        Self::as_usize(self)
    }
}

impl LeafEntry {
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(EntryBits::new())
    }

    /// A present mapping of `frame`, carrying `flags`.
    #[inline]
    #[must_use]
    pub const fn make_mapping(frame: PhysicalFrame, flags: EntryBits) -> Self {
        Self(flags.with_present(true).with_frame(frame))
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> EntryBits {
        self.0
    }

    /// Whether nothing is stored here at all (raw value zero).
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0.into_bits() == 0
    }

    /// Whether the entry maps a frame right now.
    ///
    /// Non-empty, non-present values are caller bookkeeping, not faults.
    #[inline]
    #[must_use]
    pub const fn is_present(self) -> bool {
        self.0.present()
    }

    /// The mapped frame. Meaningful only while [`is_present`](Self::is_present).
    #[inline]
    #[must_use]
    pub const fn frame(self) -> PhysicalFrame {
        self.0.frame()
    }
}

impl LevelEntry for LeafEntry {
    type Index = LeafIndex;

    #[inline]
    fn from_raw(raw: u64) -> Self {
        Self(EntryBits::from_bits(raw))
    }

    #[inline]
    fn raw(self) -> u64 {
        self.0.into_bits()
    }
}

impl LeafTable {
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [LeafEntry::zero(); 512],
        }
    }

    /// Read the entry at `i`. Plain fetch, no commit bookkeeping.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: LeafIndex) -> LeafEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    ///
    /// For tables a concurrent walker may observe, go through the slot
    /// write path instead.
    #[inline]
    pub const fn set(&mut self, i: LeafIndex, e: LeafEntry) {
        self.entries[i.as_usize()] = e;
    }
}
