//! # Extension Directory (optional fifth level)
//!
//! Participates only in five-level hierarchies, indexed by VA bits
//! `[47:39]`. When the hierarchy is four levels deep this directory does
//! not exist: the global entry is used directly as the parent of the
//! upper directory and the walk skips this step entirely, so no code
//! outside the translator needs to know which shape is in effect.

use crate::entry_bits::EntryBits;
use crate::table::{
    EntryClass, EntryFault, LevelEntry, TableIndex, classify_directory, descend_directory,
};
use vmwalk_addresses::{PhysicalFrame, VirtualAddress};

/// Index into an extension directory (VA bits `[47:39]`, five-level only).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExtensionIndex(u16);

/// An extension-directory entry: references an upper directory.
#[doc(alias = "PML4E")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct ExtensionEntry(EntryBits);

/// The optional fifth-level table: 512 entries, 4 KiB-aligned.
#[doc(alias = "PML4")]
#[repr(C, align(4096))]
pub struct ExtensionDirectory {
    entries: [ExtensionEntry; 512],
}

impl ExtensionIndex {
    /// Extract VA bits `[47:39]`. Returns a value in `0..512`.
    #[inline]
    #[must_use]
    pub const fn of_address(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 39) & 0x1FF) as u16)
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

impl TableIndex for ExtensionIndex {
    #[inline]
    fn as_usize(self) -> usize {
        Self::as_usize(self)
    }
}

impl ExtensionEntry {
    /// A zero (empty) entry.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(EntryBits::new())
    }

    /// Entry referencing the upper directory at `next`, carrying `flags`.
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

    /// Total classification: empty, bad, or present.
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

    /// The referenced upper-directory frame, or the fault that stops a walk.
    ///
    /// # Errors
    /// [`EntryFault::Empty`] if nothing is mapped, [`EntryFault::Bad`] if the
    /// entry cannot reference a table.
    #[inline]
    pub const fn next_table(self) -> Result<PhysicalFrame, EntryFault> {
        descend_directory(self.0)
    }
}

impl LevelEntry for ExtensionEntry {
    type Index = ExtensionIndex;

    #[inline]
    fn from_raw(raw: u64) -> Self {
        Self(EntryBits::from_bits(raw))
    }

    #[inline]
    fn raw(self) -> u64 {
        self.0.into_bits()
    }
}

impl ExtensionDirectory {
    /// A directory with every entry empty.
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [ExtensionEntry::zero(); 512],
        }
    }

    /// Read the entry at `i`. Plain fetch, no commit bookkeeping.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: ExtensionIndex) -> ExtensionEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    #[inline]
    pub const fn set(&mut self, i: ExtensionIndex, e: ExtensionEntry) {
        self.entries[i.as_usize()] = e;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_extracts_bits_47_39() {
        let va = VirtualAddress::new(0x0000_7F00_1234_5000);
        assert_eq!(ExtensionIndex::of_address(va).as_usize(), 0xFE);
        assert_eq!(
            ExtensionIndex::of_address(VirtualAddress::zero()).as_usize(),
            0
        );
    }

    #[test]
    fn non_present_non_zero_is_bad() {
        let e = ExtensionEntry(EntryBits::new().with_accessed(true));
        assert!(e.is_bad());
        assert_eq!(e.next_table(), Err(EntryFault::Bad));
    }
}
