//! # Address-Space Geometry
//!
//! The constants every table consumer shares, and the one switch that
//! distinguishes a four-level from a five-level translation hierarchy.

use core::fmt;

/// log2 of the page size; also the number of VA bits consumed by the
/// in-page offset.
pub const PAGE_SHIFT: u32 = 12;

/// Base page size in bytes (4 KiB).
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// Entries per translation table, at every level.
pub const TABLE_ENTRIES: usize = 512;

/// Bytes per table entry.
pub const ENTRY_BYTES: u64 = 8;

/// VA bits consumed per table level (`log2(TABLE_ENTRIES)`).
pub const INDEX_BITS: u32 = 9;

const _: () = {
    assert!(TABLE_ENTRIES as u64 * ENTRY_BYTES == PAGE_SIZE);
    assert!(1_u64 << INDEX_BITS == TABLE_ENTRIES as u64);
};

/// How many translation levels the hierarchy has.
///
/// Four-level hierarchies translate 48 VA bits; five-level hierarchies
/// insert one more directory between the root and the upper directory and
/// translate 57. Resolved once per process (see the walker crate's `depth`
/// module) and never consulted per entry: the walk code takes it as a value
/// so both shapes share one traversal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HierarchyDepth {
    /// 48-bit VAs, root indexed by bits `[47:39]`.
    FourLevel,
    /// 57-bit VAs, root indexed by bits `[56:48]`; the extension directory
    /// takes over bits `[47:39]`.
    FiveLevel,
}

impl HierarchyDepth {
    /// Translated VA width in bits.
    #[inline]
    #[must_use]
    pub const fn va_bits(self) -> u32 {
        match self {
            Self::FourLevel => 48,
            Self::FiveLevel => 57,
        }
    }

    /// Bit position of the root-table index within a VA.
    #[inline]
    #[must_use]
    pub const fn top_shift(self) -> u32 {
        match self {
            Self::FourLevel => 39,
            Self::FiveLevel => 48,
        }
    }

    /// Whether the extension directory participates in the walk.
    #[inline]
    #[must_use]
    pub const fn has_extension(self) -> bool {
        matches!(self, Self::FiveLevel)
    }

    /// First address past the non-privileged half of the address space,
    /// less one guard page.
    ///
    /// User ranges handed across the privilege boundary must end at or
    /// below this.
    #[inline]
    #[must_use]
    pub const fn userspace_top(self) -> u64 {
        (1_u64 << (self.va_bits() - 1)) - PAGE_SIZE
    }
}

impl fmt::Display for HierarchyDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FourLevel => f.write_str("four-level"),
            Self::FiveLevel => f.write_str("five-level"),
        }
    }
}

const _: () = {
    assert!(HierarchyDepth::FourLevel.userspace_top() < HierarchyDepth::FiveLevel.userspace_top());
    // the root index must sit directly above the lower levels' 27 bits
    assert!(HierarchyDepth::FourLevel.top_shift() == PAGE_SHIFT + 3 * INDEX_BITS);
    assert!(HierarchyDepth::FiveLevel.top_shift() == PAGE_SHIFT + 4 * INDEX_BITS);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn userspace_top_is_half_space_minus_guard() {
        assert_eq!(
            HierarchyDepth::FourLevel.userspace_top(),
            0x0000_7FFF_FFFF_F000
        );
        assert_eq!(
            HierarchyDepth::FiveLevel.userspace_top(),
            0x00FF_FFFF_FFFF_F000
        );
    }

    #[test]
    fn shifts_match_va_layout() {
        assert_eq!(HierarchyDepth::FourLevel.top_shift(), 39);
        assert_eq!(HierarchyDepth::FiveLevel.top_shift(), 48);
        assert!(HierarchyDepth::FiveLevel.has_extension());
        assert!(!HierarchyDepth::FourLevel.has_extension());
    }
}
