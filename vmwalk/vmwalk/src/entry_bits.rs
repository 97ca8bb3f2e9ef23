use bitfield_struct::bitfield;
use vmwalk_addresses::{PhysicalAddress, PhysicalFrame};

/// Raw 64-bit table entry, shared by every hierarchy level.
///
/// This models the common superset of fields a long-mode style entry
/// carries. Levels differ only in which bits they honor: directory levels
/// must keep `large_page` clear to reference a next table, leaf entries
/// ignore it entirely and the dirty/global bits only mean something there.
///
/// ### Bit layout
///
/// | Bits  | Name                 | Meaning |
/// |-------|----------------------|---------|
/// | 0     | `present`            | Entry participates in translation |
/// | 1     | `writable`           | Write permission |
/// | 2     | `user_access`        | Non-privileged access allowed |
/// | 3     | `write_through`      | Write-through caching |
/// | 4     | `cache_disable`      | Bypass caches |
/// | 5     | `accessed`           | Set by hardware on first use |
/// | 6     | `dirty`              | Set by hardware on first write (leaf) |
/// | 7     | `large_page`         | Entry maps a large frame, not a table |
/// | 8     | `global_translation` | Survives root switches (leaf) |
/// | 9-11  | `os_low`             | Software use |
/// | 12-51 | frame number         | Physical frame bits `[51:12]` |
/// | 52-58 | `os_high`            | Software use |
/// | 59-62 | `protection_key`     | Protection key, or software use |
/// | 63    | `no_execute`         | Instruction fetch disallowed |
///
/// The frame number always omits the low 12 bits; table frames are 4 KiB
/// aligned by construction.
#[bitfield(u64)]
pub struct EntryBits {
    /// Present (bit 0). Clear means the entry does not translate anything;
    /// the remaining bits are software's to use.
    pub present: bool,

    /// Writable (bit 1).
    pub writable: bool,

    /// User/supervisor (bit 2): set to allow non-privileged access.
    pub user_access: bool,

    /// Write-through caching (bit 3).
    pub write_through: bool,

    /// Cache disable (bit 4).
    pub cache_disable: bool,

    /// Accessed (bit 5), set by hardware the first time the entry is used.
    pub accessed: bool,

    /// Dirty (bit 6), set by hardware on the first write through a leaf.
    pub dirty: bool,

    /// Large page (bit 7). A directory entry with this bit maps a large
    /// frame directly instead of referencing a next-level table.
    pub large_page: bool,

    /// Global translation (bit 8), meaningful on leaf entries.
    pub global_translation: bool,

    /// Software-available low bits (9..11).
    #[bits(3)]
    pub os_low: u8,

    /// Physical frame bits `[51:12]`.
    #[bits(40)]
    frame_51_12: u64,

    /// Software-available high bits (52..58).
    #[bits(7)]
    pub os_high: u8,

    /// Protection key (59..62) where supported, otherwise software use.
    #[bits(4)]
    pub protection_key: u8,

    /// No-execute (bit 63).
    pub no_execute: bool,
}

impl EntryBits {
    /// Flags for a directory entry referencing a next-level table:
    /// present, writable, accessed.
    #[inline]
    #[must_use]
    pub const fn table_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_accessed(true)
    }

    /// Flags for a writable leaf mapping.
    #[inline]
    #[must_use]
    pub const fn leaf_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_accessed(true)
            .with_dirty(true)
    }

    /// The referenced physical frame.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> PhysicalFrame {
        PhysicalFrame::new_aligned(PhysicalAddress::new(self.frame_51_12() << 12))
    }

    /// Point the entry at `frame`.
    #[inline]
    pub const fn set_frame(&mut self, frame: PhysicalFrame) {
        self.set_frame_51_12(frame.base().as_u64() >> 12);
    }

    /// Builder form of [`EntryBits::set_frame`].
    #[inline]
    #[must_use]
    pub const fn with_frame(mut self, frame: PhysicalFrame) -> Self {
        self.set_frame(frame);
        self
    }

    /// Whether the entry can be descended into: present and referencing a
    /// next-level table rather than mapping a large frame.
    #[inline]
    #[must_use]
    pub const fn references_table(self) -> bool {
        self.present() && !self.large_page()
    }
}
