//! # vmwalk: Multi-Level Page-Table Walking
//!
//! Software walks of an x86-64-style translation hierarchy: four or five
//! levels of 512-entry tables over 4 KiB frames. The product of a walk is
//! the *leaf slot*, the address of the final entry for a virtual address,
//! returned unread so the caller decides what the raw value means.
//!
//! ## Address layout
//!
//! ```text
//! five-level   63..57  56..48  47..39     38..30  29..21  20..12  11..0
//!              unused  global  extension  upper   middle  leaf    offset
//!
//! four-level   63..48  47..39  38..30     29..21  20..12  11..0
//!              unused  global  upper      middle  leaf    offset
//! ```
//!
//! Which shape applies is a platform fact, resolved once (see [`depth`]).
//! One translator body serves both: when there is no extension level the
//! global entry directly parents the upper directory, so the walk simply
//! skips a step.
//!
//! ## Reading and writing entries
//!
//! Per-level types live in [`table`]: an index newtype, an entry wrapper
//! with that level's classification rules, and an aligned in-memory table.
//! [`EntrySlot`] addresses one entry inside a mapped table; all slot access
//! is atomic, acquire on read and release on write, so concurrent walkers
//! never observe torn entries. Table entries reference each other by
//! physical frame; a [`TableMapper`] says where those frames are visible
//! in the current context.
//!
//! ## Locking
//!
//! [`translate`] itself takes no locks; an empty or bad entry is a
//! deterministic fact about current state, reported as a [`WalkError`]
//! with the failing level. Callers that mutate a hierarchy while others
//! walk it wrap both sides in [`AddressSpace::lock_tables`], a spin-locked
//! guard sized for such short sections.
//!
//! ## Example
//!
//! ```rust
//! use vmwalk::table::global::{GlobalDirectory, GlobalEntry, GlobalIndex};
//! use vmwalk::table::middle::{MiddleDirectory, MiddleEntry, MiddleIndex};
//! use vmwalk::table::upper::{UpperDirectory, UpperEntry, UpperIndex};
//! use vmwalk::table::leaf::LeafTable;
//! use vmwalk::{DirectMap, EntryBits, PagingRoot, translate};
//! use vmwalk::{HierarchyDepth, PhysicalAddress, PhysicalFrame, VirtualAddress};
//!
//! fn frame_of<T>(t: &T) -> PhysicalFrame {
//!     PhysicalAddress::from_ptr(core::ptr::from_ref(t)).frame()
//! }
//!
//! // one table per level, wired up for a single address
//! let va = VirtualAddress::new(0x0000_7F00_1234_5000);
//! let depth = HierarchyDepth::FourLevel;
//!
//! let mut global = Box::new(GlobalDirectory::zeroed());
//! let mut upper = Box::new(UpperDirectory::zeroed());
//! let mut middle = Box::new(MiddleDirectory::zeroed());
//! let leaf = Box::new(LeafTable::zeroed());
//!
//! let flags = EntryBits::table_rw();
//! let gi = GlobalIndex::of_address(va, depth);
//! global.set(gi, GlobalEntry::make_next(frame_of(&*upper), flags));
//! let ui = UpperIndex::of_address(va);
//! upper.set(ui, UpperEntry::make_next(frame_of(&*middle), flags));
//! let mi = MiddleIndex::of_address(va);
//! middle.set(mi, MiddleEntry::make_next(frame_of(&*leaf), flags));
//!
//! // hosted test: heap addresses double as "physical" frames
//! let mapper = unsafe { DirectMap::identity() };
//! let root = PagingRoot::with_depth(frame_of(&*global), depth);
//!
//! let slot = translate(&mapper, root, va).unwrap();
//! let entry = unsafe { slot.read() };
//! assert!(entry.is_empty()); // reached the leaf table; nothing mapped yet
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod depth;
pub mod table;

mod entry_bits;
mod fatal;
mod mapper;
mod slot;
mod space;
mod uaccess;
mod walk;

pub use entry_bits::EntryBits;
pub use fatal::fatal_stop;
pub use mapper::{DirectMap, TableMapper};
pub use slot::EntrySlot;
pub use space::{AddressSpace, PagingRoot, TableGuard};
pub use uaccess::user_range_ok;
pub use walk::{Level, WalkError, translate};

pub use vmwalk_addresses::{HierarchyDepth, PhysicalAddress, PhysicalFrame, VirtualAddress};
