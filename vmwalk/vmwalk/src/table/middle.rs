//! # Middle Directory
//!
//! Second level from the leaf, indexed by VA bits `[29:21]`. Present entries
//! reference a [leaf table](super::leaf).

use crate::entry_bits::EntryBits;
use crate::table::{
    EntryClass, EntryFault, LevelEntry, TableIndex, classify_directory, descend_directory,
};
use vmwalk_addresses::{PhysicalFrame, VirtualAddress};

/// Index into a middle directory (VA bits `[29:21]`).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MiddleIndex(u16);

/// A middle-directory entry: references a leaf table.
#[doc(alias = "PDE")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct MiddleEntry(EntryBits);

/// 512 entries, 4 KiB-aligned.
#[doc(alias = "PD")]
#[repr(C, align(4096))]
pub struct MiddleDirectory {
    entries: [MiddleEntry; 512],
}

impl MiddleIndex {
    /// Extract VA bits `[29:21]`. Returns a value in `0..512`.
    #[inline]
    #[must_use]
    pub const fn of_address(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 21) & 0x1FF) as u16)
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

impl TableIndex for MiddleIndex {
    #[inline]
    fn as_usize(self) -> usize {
        Self::as_usize(self)
    }
}

impl MiddleEntry {
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(EntryBits::new())
    }

    /// Entry referencing the leaf table at `next`, carrying `flags`.
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

    /// The referenced leaf-table frame, or the fault that stops a walk.
    ///
    /// # Errors
    /// [`EntryFault::Empty`] if nothing is mapped, [`EntryFault::Bad`] if the
    /// entry cannot reference a table.
    #[inline]
    pub const fn next_table(self) -> Result<PhysicalFrame, EntryFault> {
        descend_directory(self.0)
    }
}

impl LevelEntry for MiddleEntry {
    type Index = MiddleIndex;

    #[inline]
    fn from_raw(raw: u64) -> Self {
        Self(EntryBits::from_bits(raw))
    }

    #[inline]
    fn raw(self) -> u64 {
        self.0.into_bits()
    }
}

impl MiddleDirectory {
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [MiddleEntry::zero(); 512],
        }
    }

    /// Read the entry at `i`. Plain fetch, no commit bookkeeping.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: MiddleIndex) -> MiddleEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    #[inline]
    pub const fn set(&mut self, i: MiddleIndex, e: MiddleEntry) {
        self.entries[i.as_usize()] = e;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_extracts_bits_29_21() {
        assert_eq!(
            MiddleIndex::of_address(VirtualAddress::new(0x0000_7F00_1234_5000)).as_usize(),
            0x91
        );
        assert_eq!(
            MiddleIndex::of_address(VirtualAddress::new(0x0000_0000_3FE0_0000)).as_usize(),
            0x1FF
        );
    }
}
