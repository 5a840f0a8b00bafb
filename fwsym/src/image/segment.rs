//! Loadable segments and their address ranges

use object::elf;

use crate::domain::Address;

/// Half-open address range `[start, end)`
///
/// Bounds are `u64` because `base + memsz` of a 32-bit segment may land
/// exactly on (or past) 4 GiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    pub start: u64,
    pub end: u64,
}

impl MemoryRange {
    /// Check if an address falls within this memory range
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when both ranges are non-empty and share at least one address
    #[must_use]
    pub fn overlaps(&self, other: &MemoryRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

/// One program header and the file bytes it describes
///
/// `data` holds exactly `file_size` bytes. The span between `file_size` and
/// `mem_size` is zero-fill and has no backing storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub(crate) kind: u32,
    pub(crate) base: Address,
    pub(crate) file_size: u32,
    pub(crate) mem_size: u32,
    pub(crate) data: Vec<u8>,
}

impl Segment {
    /// Short display name for the program header type
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        segment_kind_name(self.kind)
    }

    #[must_use]
    pub fn base(&self) -> Address {
        self.base
    }

    #[must_use]
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    #[must_use]
    pub fn mem_size(&self) -> u32 {
        self.mem_size
    }

    /// File-backed bytes (empty for segments without file contents)
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Runtime footprint `[base, base + memsz)`
    #[must_use]
    pub fn range(&self) -> MemoryRange {
        let start = self.base.as_u64();
        MemoryRange { start, end: start + u64::from(self.mem_size) }
    }

    #[must_use]
    pub fn contains(&self, addr: Address) -> bool {
        self.range().contains(addr.as_u64())
    }
}

/// Map a `p_type` value to its conventional name
#[must_use]
pub fn segment_kind_name(kind: u32) -> &'static str {
    match kind {
        elf::PT_NULL => "NULL",
        elf::PT_LOAD => "LOAD",
        elf::PT_DYNAMIC => "DYNAMIC",
        elf::PT_INTERP => "INTERP",
        elf::PT_NOTE => "NOTE",
        elf::PT_SHLIB => "SHLIB",
        elf::PT_PHDR => "PHDR",
        elf::PT_TLS => "TLS",
        elf::PT_GNU_STACK => "GNU_STACK",
        k if (elf::PT_LOPROC..=elf::PT_HIPROC).contains(&k) => "PROC",
        k if (elf::PT_LOOS..=elf::PT_HIOS).contains(&k) => "OS",
        _ => "UNKNOWN",
    }
}
