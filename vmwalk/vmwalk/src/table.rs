//! # Translation Tables, One Module per Level
//!
//! Strongly-typed wrappers for the five hierarchy levels, root first:
//!
//! | Module | Table | Indexed by VA bits |
//! |--------|-------|--------------------|
//! | [`global`] | root directory | `[47:39]` or `[56:48]`, depth-dependent |
//! | [`extension`] | optional fifth-level directory | `[47:39]`, five-level only |
//! | [`upper`] | upper directory | `[38:30]` |
//! | [`middle`] | middle directory | `[29:21]` |
//! | [`leaf`] | leaf table | `[20:12]` |
//!
//! Each module follows the same pattern: an index newtype extracted from
//! the architecture-defined bit range, an entry wrapper over [`EntryBits`]
//! with its level's classification rules, and a 4 KiB-aligned table of 512
//! entries. [`EntrySlot`](crate::EntrySlot) pairs any of these entry types
//! with the address of one slot inside a mapped table.
//!
//! ## Entry classification
//!
//! Every directory entry is in exactly one of three states:
//!
//! - **empty**: the raw value is zero; nothing is mapped here.
//! - **bad**: non-zero but unusable for descent, either not present or
//!   carrying the large-page bit where a next-table reference is required.
//! - **present**: references a next-level table frame.
//!
//! A walk stops at the first empty or bad entry; leaf entries know only
//! empty/present and are left to the caller to interpret.

pub mod extension;
pub mod global;
pub mod leaf;
pub mod middle;
pub mod upper;

use core::fmt;

use crate::entry_bits::EntryBits;
use vmwalk_addresses::PhysicalFrame;

/// Total classification of a directory entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EntryClass {
    /// Zero: nothing mapped.
    Empty,
    /// Non-zero but structurally unusable for descent.
    Bad,
    /// References a next-level table.
    Present,
}

/// Why a walk stopped at some level.
///
/// The failing subset of [`EntryClass`]; a present entry never faults.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EntryFault {
    /// The entry was empty: the address is not mapped at this level.
    Empty,
    /// The entry was structurally invalid for descent.
    Bad,
}

impl fmt::Display for EntryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Bad => f.write_str("bad"),
        }
    }
}

/// Raw-value view shared by all per-level entry types.
///
/// This is the seam [`EntrySlot`](crate::EntrySlot) needs: every level's
/// entry is an 8-byte value convertible to and from its raw bits, selected
/// within its table by that level's index newtype.
pub trait LevelEntry: Copy {
    /// The index newtype addressing one slot of this level's table.
    type Index: TableIndex;

    #[must_use]
    fn from_raw(raw: u64) -> Self;

    #[must_use]
    fn raw(self) -> u64;
}

/// A 0..512 slot selector for one hierarchy level.
///
/// Implemented by the per-level index newtypes so slot arithmetic can stay
/// generic without allowing indices from one level to address another.
pub trait TableIndex: Copy {
    #[must_use]
    fn as_usize(self) -> usize;
}

/// Directory-entry classification, shared by the four directory levels.
pub(crate) const fn classify_directory(bits: EntryBits) -> EntryClass {
    if bits.into_bits() == 0 {
        EntryClass::Empty
    } else if bits.references_table() {
        EntryClass::Present
    } else {
        EntryClass::Bad
    }
}

/// Classify-and-descend, shared by the four directory levels.
pub(crate) const fn descend_directory(bits: EntryBits) -> Result<PhysicalFrame, EntryFault> {
    match classify_directory(bits) {
        EntryClass::Empty => Err(EntryFault::Empty),
        EntryClass::Bad => Err(EntryFault::Bad),
        EntryClass::Present => Ok(bits.frame()),
    }
}
