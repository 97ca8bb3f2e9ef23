//! # The Walk
//!
//! One translator body serves both hierarchy depths: the walk descends
//! global, then extension when the root is five-level, then upper and
//! middle, classifying the entry at each step, and hands back the leaf
//! slot unread. On a four-level root the global entry directly parents
//! the upper directory, which is the whole of the hierarchy collapse.
//!
//! A walk never retries and never locks: an empty or bad entry is a
//! deterministic fact about the current mapping state, reported with the
//! level it was found at.

use core::fmt;

use thiserror::Error;

use crate::mapper::TableMapper;
use crate::slot::EntrySlot;
use crate::space::PagingRoot;
use crate::table::EntryFault;
use crate::table::extension::{ExtensionEntry, ExtensionIndex};
use crate::table::global::{GlobalEntry, GlobalIndex};
use crate::table::leaf::{LeafEntry, LeafIndex};
use crate::table::middle::{MiddleEntry, MiddleIndex};
use crate::table::upper::{UpperEntry, UpperIndex};
use vmwalk_addresses::VirtualAddress;

/// The five hierarchy levels, root first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Level {
    /// The root directory (bits `[47:39]` or `[56:48]`, depth-dependent).
    Global,
    /// The fifth-level directory, present on five-level roots only.
    Extension,
    /// The upper directory (bits `[38:30]`).
    Upper,
    /// The middle directory (bits `[29:21]`).
    Middle,
    /// The leaf table (bits `[20:12]`).
    Leaf,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Extension => f.write_str("extension"),
            Self::Upper => f.write_str("upper"),
            Self::Middle => f.write_str("middle"),
            Self::Leaf => f.write_str("leaf"),
        }
    }
}

/// A walk stopped before reaching the leaf table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
#[error("{fault} entry at the {level} level")]
pub struct WalkError {
    /// The level whose entry failed classification. Never [`Level::Leaf`]:
    /// the walk returns the leaf slot without classifying it.
    pub level: Level,
    /// Whether that entry was empty or structurally bad.
    pub fault: EntryFault,
}

/// Walk the hierarchy from `root` and return the leaf slot for `va`.
///
/// Descends global, extension (five-level roots only), upper, and middle;
/// the first empty or bad entry fails the walk at its level and nothing
/// below it is touched. The returned slot is *not* read: interpreting the
/// leaf value is the caller's business, and a leaf entry has no bad state,
/// so reaching the leaf table already is success.
///
/// The walk takes no locks. A caller that mutates the same hierarchy
/// concurrently must hold the table lock for both sides (see
/// [`AddressSpace::lock_tables`](crate::AddressSpace::lock_tables));
/// read-only walks of quiescent tables need nothing.
///
/// # Errors
/// [`WalkError`] names the failing level and whether the entry there was
/// empty or bad.
pub fn translate<M: TableMapper>(
    mapper: &M,
    root: PagingRoot,
    va: VirtualAddress,
) -> Result<EntrySlot<LeafEntry>, WalkError> {
    let depth = root.depth();

    let global_base = mapper.table_base(root.frame());
    let global = EntrySlot::<GlobalEntry>::of(global_base, GlobalIndex::of_address(va, depth));
    // SAFETY: the mapper contract keeps every table frame reachable from
    // `root` mapped at the returned base for the duration of the walk.
    let entry = unsafe { global.read() };
    let mut parent = entry.next_table().map_err(|fault| WalkError {
        level: Level::Global,
        fault,
    })?;

    if depth.has_extension() {
        let ext_base = mapper.table_base(parent);
        let ext = EntrySlot::<ExtensionEntry>::of(ext_base, ExtensionIndex::of_address(va));
        // SAFETY: as above; `parent` came out of a present directory entry.
        let entry = unsafe { ext.read() };
        parent = entry.next_table().map_err(|fault| WalkError {
            level: Level::Extension,
            fault,
        })?;
    }

    let upper_base = mapper.table_base(parent);
    let upper = EntrySlot::<UpperEntry>::of(upper_base, UpperIndex::of_address(va));
    // SAFETY: as above.
    let entry = unsafe { upper.read() };
    let parent = entry.next_table().map_err(|fault| WalkError {
        level: Level::Upper,
        fault,
    })?;

    let middle_base = mapper.table_base(parent);
    let middle = EntrySlot::<MiddleEntry>::of(middle_base, MiddleIndex::of_address(va));
    // SAFETY: as above.
    let entry = unsafe { middle.read() };
    let parent = entry.next_table().map_err(|fault| WalkError {
        level: Level::Middle,
        fault,
    })?;

    let leaf_base = mapper.table_base(parent);
    Ok(EntrySlot::of(leaf_base, LeafIndex::of_address(va)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_names_fault_and_level() {
        let e = WalkError {
            level: Level::Middle,
            fault: EntryFault::Bad,
        };
        assert_eq!(e.to_string(), "bad entry at the middle level");

        let e = WalkError {
            level: Level::Global,
            fault: EntryFault::Empty,
        };
        assert_eq!(e.to_string(), "empty entry at the global level");
    }
}
