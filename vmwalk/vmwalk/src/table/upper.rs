//! # Upper Directory
//!
//! Third level from the leaf, indexed by VA bits `[38:30]`. Present entries
//! reference a [middle directory](super::middle).

use crate::entry_bits::EntryBits;
use crate::table::{
    EntryClass, EntryFault, LevelEntry, TableIndex, classify_directory, descend_directory,
};
use vmwalk_addresses::{PhysicalFrame, VirtualAddress};

/// Index into an upper directory (VA bits `[38:30]`).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UpperIndex(u16);

/// An upper-directory entry: references a middle directory.
#[doc(alias = "PDPTE")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct UpperEntry(EntryBits);

/// 512 entries, 4 KiB-aligned.
#[doc(alias = "PDPT")]
#[repr(C, align(4096))]
pub struct UpperDirectory {
    entries: [UpperEntry; 512],
}

impl UpperIndex {
    /// Extract VA bits `[38:30]`. Returns a value in `0..512`.
    #[inline]
    #[must_use]
    pub const fn of_address(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 30) & 0x1FF) as u16)
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

impl TableIndex for UpperIndex {
    #[inline]
    fn as_usize(self) -> usize {
        Self::as_usize(self)
    }
}

impl UpperEntry {
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(EntryBits::new())
    }

    /// Entry referencing the middle directory at `next`, carrying `flags`.
    #[inline]
    #[must_use]
    pub const fn make_next(next: PhysicalFrame, flags: EntryBits) -> Self {
        debug_assert!(!flags.large_page());
        Self(flags.with_present(true).with_frame(next))
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> EntryBits {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn classify(self) -> EntryClass {
        classify_directory(self.0)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self.classify(), EntryClass::Empty)
    }

    #[inline]
    #[must_use]
    pub const fn is_bad(self) -> bool {
        matches!(self.classify(), EntryClass::Bad)
    }

    /// The referenced middle-directory frame, or the fault that stops a walk.
    ///
    /// # Errors
    /// [`EntryFault::Empty`] if nothing is mapped, [`EntryFault::Bad`] if the
    /// entry cannot reference a table.
    #[inline]
    pub const fn next_table(self) -> Result<PhysicalFrame, EntryFault> {
        descend_directory(self.0)
    }
}

impl LevelEntry for UpperEntry {
    type Index = UpperIndex;

    #[inline]
    fn from_raw(raw: u64) -> Self {
        Self(EntryBits::from_bits(raw))
    }

    #[inline]
    fn raw(self) -> u64 {
        self.0.into_bits()
    }
}

impl UpperDirectory {
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [UpperEntry::zero(); 512],
        }
    }

    /// Read the entry at `i`. Plain fetch, no commit bookkeeping.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: UpperIndex) -> UpperEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    #[inline]
    pub const fn set(&mut self, i: UpperIndex, e: UpperEntry) {
        self.entries[i.as_usize()] = e;
    }
}
