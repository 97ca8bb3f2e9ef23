//! # Hierarchy-Depth Resolution
//!
//! Whether the extension level exists is a platform fact, probed once at
//! startup, not a property of individual walks. This module holds the
//! process-wide answer:
//!
//! - the build-time default comes from the `five-level` cargo feature;
//! - a platform that probes the real depth publishes it through
//!   [`resolve`], first caller wins;
//! - [`resolved`] is what everything else consults, and individual roots
//!   may still carry an explicit depth via
//!   [`PagingRoot::with_depth`](crate::PagingRoot::with_depth).
//!
//! Re-resolving to the same depth is a no-op. A *conflicting* re-resolution
//! means two subsystems disagree about the shape of every table in the
//! machine, and gets the fatal stop.

use log::debug;

use crate::fatal::fatal_stop;
use vmwalk_addresses::HierarchyDepth;
use vmwalk_sync::SetOnce;

/// The depth assumed until a platform publishes one.
pub const BUILD_DEFAULT: HierarchyDepth = if cfg!(feature = "five-level") {
    HierarchyDepth::FiveLevel
} else {
    HierarchyDepth::FourLevel
};

static RESOLVED: SetOnce<HierarchyDepth> = SetOnce::new();

/// Publish the platform's hierarchy depth, process-wide.
///
/// The first caller wins and the value sticks for the life of the process.
/// Calling again with the same depth is a no-op; a different depth
/// terminates via [`fatal_stop`], because no correct execution can continue
/// under two table shapes at once.
pub fn resolve(depth: HierarchyDepth) {
    let stored = *RESOLVED.get_or_set(|| {
        debug!("hierarchy depth resolved: {depth}");
        depth
    });
    if stored != depth {
        fatal_stop("conflicting hierarchy depth re-resolution");
    }
}

/// The effective depth: the resolved value if one has been published, the
/// build default otherwise.
///
/// Reading does not latch the default; a `resolve` arriving later still
/// wins for subsequent readers.
#[must_use]
pub fn resolved() -> HierarchyDepth {
    RESOLVED.get().copied().unwrap_or(BUILD_DEFAULT)
}
