//! The composed index and its query surface

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::debug;

use super::header::ImageHeader;
use super::limits::ParseLimits;
use super::loader::{self, LoadedImage};
use super::segment::Segment;
use super::symbols::{SymbolEntry, SymbolTable};
use crate::domain::Address;
use crate::domain::ParseError;

/// Parsed firmware image: segments, string pool and symbols
///
/// Immutable once built, so a shared reference can be queried from several
/// threads at once.
#[derive(Debug)]
pub struct SymbolIndex {
    header: ImageHeader,
    segments: Vec<Segment>,
    pool: Vec<u8>,
    symbols: Vec<SymbolEntry>,
}

/// A symbol name and value, borrowed from a [`SymbolIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a> {
    raw_name: &'a [u8],
    pub address: Address,
}

impl<'a> Symbol<'a> {
    /// Name bytes exactly as stored in the string table
    #[must_use]
    pub fn raw_name(&self) -> &'a [u8] {
        self.raw_name
    }

    /// Name as text; invalid UTF-8 is replaced rather than rejected
    #[must_use]
    pub fn name(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.raw_name)
    }
}

/// Load-time content at an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressData<'a> {
    /// File bytes from the address to the end of the segment's file-backed part
    FileBacked(&'a [u8]),
    /// The address lies in zero-initialised memory; `len` bytes remain in
    /// the segment from the address onwards
    ZeroFill { len: u64 },
}

impl SymbolIndex {
    /// Parse the image at `path` with the default [`ParseLimits`]
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the image cannot be opened, is not an
    /// ELF32 image, or any of its tables is malformed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        Self::open_with_limits(path, ParseLimits::default())
    }

    /// Parse the image at `path`
    ///
    /// # Errors
    /// Same as [`SymbolIndex::open`], plus `TooManySegments`/`TooManySections`
    /// when the image exceeds `limits`
    pub fn open_with_limits<P: AsRef<Path>>(
        path: P,
        limits: ParseLimits,
    ) -> Result<Self, ParseError> {
        let image: LoadedImage<BufReader<File>> = loader::load(path, limits)?;
        image.index()
    }

    /// Parse an image from any seekable reader
    ///
    /// # Errors
    /// Same as [`SymbolIndex::open_with_limits`], minus `FileNotFound`
    pub fn from_reader<R: Read + Seek>(reader: R, limits: ParseLimits) -> Result<Self, ParseError> {
        LoadedImage::from_reader(reader, limits)?.index()
    }

    pub(crate) fn new(header: ImageHeader, segments: Vec<Segment>, table: SymbolTable) -> Self {
        let index = Self { header, segments, pool: table.pool, symbols: table.entries };
        for (a, b) in index.overlapping_segments() {
            debug!(
                "segments {a} and {b} overlap ({} and {}); lookups use segment {a}",
                index.segments[a].base, index.segments[b].base
            );
        }
        index
    }

    /// Entry point recorded in the file header
    #[must_use]
    pub fn entry_point(&self) -> Address {
        self.header.entry
    }

    /// Segments in program header order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Symbols in symbol table order
    pub fn symbols(&self) -> impl ExactSizeIterator<Item = Symbol<'_>> + '_ {
        self.symbols.iter().map(|entry| self.symbol(entry))
    }

    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Size of the concatenated string pool in bytes
    #[must_use]
    pub fn string_pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Address of the first symbol whose name contains `name`
    ///
    /// Matching is by substring so decorated or mangled names can be found
    /// without spelling them out. Use [`SymbolIndex::find_symbol_exact`] for
    /// an exact match.
    #[must_use]
    pub fn find_symbol_address(&self, name: &str) -> Option<Address> {
        self.symbols_matching(name).next().map(|sym| sym.address)
    }

    /// Every symbol whose name contains `name`, in table order
    pub fn symbols_matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Symbol<'a>> + 'a {
        let needle = name.as_bytes();
        self.symbols().filter(move |sym| contains_bytes(sym.raw_name, needle))
    }

    /// Address of the first symbol named exactly `name`
    #[must_use]
    pub fn find_symbol_exact(&self, name: &str) -> Option<Address> {
        self.symbols_matching(name).find(|sym| sym.raw_name == name.as_bytes()).map(|s| s.address)
    }

    /// Index of the first segment (in program header order) containing `addr`
    #[must_use]
    pub fn segment_index_for(&self, addr: Address) -> Option<usize> {
        self.segments.iter().position(|seg| seg.contains(addr))
    }

    /// What the target will hold at `addr` once the image is loaded
    ///
    /// Segments are scanned in program header order and the first one whose
    /// `[base, base + memsz)` contains `addr` answers. Returns `None` when no
    /// segment does.
    #[must_use]
    pub fn resolve_address(&self, addr: Address) -> Option<AddressData<'_>> {
        let seg = &self.segments[self.segment_index_for(addr)?];
        let offset = addr.as_u64() - seg.base.as_u64();

        if offset < u64::from(seg.file_size) {
            Some(AddressData::FileBacked(&seg.data[offset as usize..]))
        } else {
            Some(AddressData::ZeroFill { len: u64::from(seg.mem_size) - offset })
        }
    }

    /// Copy `len` load-time bytes starting at `addr`
    ///
    /// The run may cross from file-backed into zero-fill memory but must stay
    /// inside the segment that contains `addr`.
    #[must_use]
    pub fn read_bytes(&self, addr: Address, len: usize) -> Option<Vec<u8>> {
        let seg = &self.segments[self.segment_index_for(addr)?];
        let offset = addr.as_u64() - seg.base.as_u64();
        let end = u64::try_from(len).ok().and_then(|l| offset.checked_add(l))?;
        if end > u64::from(seg.mem_size) {
            return None;
        }

        let start = offset as usize;
        let file_end = (start + len).min(seg.data.len());
        let mut bytes = Vec::with_capacity(len);
        if start < file_end {
            bytes.extend_from_slice(&seg.data[start..file_end]);
        }
        bytes.resize(len, 0);
        Some(bytes)
    }

    /// Pairs of segment indices whose runtime ranges overlap
    ///
    /// Overlap is accepted: lookups resolve to the lower index.
    #[must_use]
    pub fn overlapping_segments(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.segments.iter().enumerate() {
            for (j, b) in self.segments.iter().enumerate().skip(i + 1) {
                if a.range().overlaps(&b.range()) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Free every buffer owned by the index
    ///
    /// Dropping the index does the same; this makes the end of its use
    /// explicit at the call site.
    pub fn release(self) {
        debug!(
            "Releasing index: {} segments, {} symbols, {} byte string pool",
            self.segments.len(),
            self.symbols.len(),
            self.pool.len()
        );
    }

    fn symbol<'a>(&'a self, entry: &SymbolEntry) -> Symbol<'a> {
        Symbol { raw_name: &self.pool[entry.name.clone()], address: entry.address }
    }
}

/// Byte-wise `strstr`: an empty needle matches everything
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
