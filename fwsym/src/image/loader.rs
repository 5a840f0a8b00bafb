//! Image loading: file header, program headers and segment contents
//!
//! This is the first of the two parse stages. It leaves the reader open in the
//! returned [`LoadedImage`] so the symbol stage can keep seeking through the
//! same handle.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;
use object::elf::ProgramHeader32;
use object::Endianness;

use super::header::{
    read_record_at, table_entry_offset, view, ImageHeader, PROGRAM_HEADER_SIZE,
};
use super::index::SymbolIndex;
use super::limits::ParseLimits;
use super::segment::Segment;
use super::symbols::read_symbol_table;
use crate::domain::{Address, ParseError};

/// An image whose header and segments have been read
///
/// Holds the open reader for the second stage, [`LoadedImage::index`].
pub struct LoadedImage<R> {
    reader: R,
    header: ImageHeader,
    file_len: u64,
    segments: Vec<Segment>,
    limits: ParseLimits,
}

/// Open `path` and run the loading stage
///
/// # Errors
/// `FileNotFound` if nothing exists at `path`, plus every error of
/// [`LoadedImage::from_reader`].
pub fn load<P: AsRef<Path>>(
    path: P,
    limits: ParseLimits,
) -> Result<LoadedImage<BufReader<File>>, ParseError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ParseError::FileNotFound(path.to_path_buf()),
        _ => ParseError::Io(e),
    })?;
    debug!("Loading image {}", path.display());

    // Non-ELF and 64-bit files are rejected before the read buffer exists
    let header = ImageHeader::read(&mut file)?;
    LoadedImage::with_header(BufReader::new(file), header, limits)
}

impl<R: Read + Seek> LoadedImage<R> {
    /// Read the file header and every program header, copying segment bytes
    ///
    /// # Errors
    /// - `InvalidFormat` for a missing magic number, unknown class or encoding,
    ///   or a program header table that does not fit the file
    /// - `UnsupportedFormat` for 64-bit images
    /// - `TooManySegments` when `e_phnum` exceeds `limits.max_segments`
    /// - `MalformedSegment` when a segment's file data is inconsistent
    /// - `Io` for read failures
    pub fn from_reader(mut reader: R, limits: ParseLimits) -> Result<Self, ParseError> {
        reader.seek(SeekFrom::Start(0))?;
        let header = ImageHeader::read(&mut reader)?;
        Self::with_header(reader, header, limits)
    }

    fn with_header(
        mut reader: R,
        header: ImageHeader,
        limits: ParseLimits,
    ) -> Result<Self, ParseError> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        let segments = read_segments(&mut reader, &header, file_len, &limits)?;

        Ok(Self { reader, header, file_len, segments, limits })
    }

    /// Run the symbol stage and combine both into a [`SymbolIndex`]
    ///
    /// # Errors
    /// See [`SymbolIndex::from_reader`]; nothing allocated here survives a
    /// failure.
    pub fn index(mut self) -> Result<SymbolIndex, ParseError> {
        let table = read_symbol_table(&mut self.reader, &self.header, self.file_len, &self.limits)?;
        Ok(SymbolIndex::new(self.header, self.segments, table))
    }
}

impl<R> LoadedImage<R> {
    /// Entry point from the file header
    #[must_use]
    pub fn entry_point(&self) -> Address {
        self.header.entry
    }

    /// Segments in program header order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn read_segments<R: Read + Seek>(
    reader: &mut R,
    header: &ImageHeader,
    file_len: u64,
    limits: &ParseLimits,
) -> Result<Vec<Segment>, ParseError> {
    let count = usize::from(header.phnum);
    if count == 0 {
        return Ok(Vec::new());
    }
    if count > limits.max_segments {
        return Err(ParseError::TooManySegments { count, limit: limits.max_segments });
    }
    if usize::from(header.phentsize) < PROGRAM_HEADER_SIZE {
        return Err(ParseError::InvalidFormat("program header entry size too small"));
    }
    // A wider stride pads between records, not after the last one
    let table_end = table_entry_offset(header.phoff, count - 1, header.phentsize)
        + PROGRAM_HEADER_SIZE as u64;
    if table_end > file_len {
        return Err(ParseError::InvalidFormat("program header table extends past end of image"));
    }

    let endian = header.endian;
    let mut segments = Vec::with_capacity(count);

    for index in 0..count {
        let offset = table_entry_offset(header.phoff, index, header.phentsize);
        let raw: [u8; PROGRAM_HEADER_SIZE] = read_record_at(reader, offset)?;
        let phdr: &ProgramHeader32<Endianness> = view(&raw)?;

        let kind = phdr.p_type.get(endian);
        let base = Address(phdr.p_vaddr.get(endian));
        let file_offset = phdr.p_offset.get(endian);
        let file_size = phdr.p_filesz.get(endian);
        let mem_size = phdr.p_memsz.get(endian);

        if file_size > mem_size {
            return Err(ParseError::MalformedSegment {
                index,
                reason: "file size exceeds memory size",
            });
        }

        let data = if file_size == 0 {
            Vec::new()
        } else {
            if u64::from(file_offset) + u64::from(file_size) > file_len {
                return Err(ParseError::MalformedSegment {
                    index,
                    reason: "file data extends past end of image",
                });
            }
            let mut data = vec![0u8; file_size as usize];
            reader.seek(SeekFrom::Start(u64::from(file_offset)))?;
            reader.read_exact(&mut data)?;
            data
        };

        debug!(
            "segment {index}: {:<9} vaddr {base} filesz 0x{file_size:x} memsz 0x{mem_size:x} offset 0x{file_offset:x}",
            super::segment::segment_kind_name(kind)
        );

        segments.push(Segment { kind, base, file_size, mem_size, data });
    }

    Ok(segments)
}
