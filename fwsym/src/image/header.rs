//! ELF32 file header and fixed-size record decoding
//!
//! Raw records are viewed through the `object` crate's `#[repr(C)]` ELF
//! definitions. Every field in those definitions is a byte array, so the views
//! have alignment 1 and can be taken over any stack or heap buffer.

use std::io::{self, Read, Seek, SeekFrom};

use log::debug;
use object::elf::{self, FileHeader32};
use object::pod::Pod;
use object::Endianness;

use crate::domain::{Address, ParseError};

/// Size of the ELF identification block (`e_ident`)
pub(crate) const IDENT_SIZE: usize = 16;
/// Size of an ELF32 file header
pub(crate) const FILE_HEADER_SIZE: usize = 52;
/// Size of one ELF32 program header record
pub(crate) const PROGRAM_HEADER_SIZE: usize = 32;
/// Size of one ELF32 section header record
pub(crate) const SECTION_HEADER_SIZE: usize = 40;
/// Size of one ELF32 symbol table entry
pub(crate) const SYMBOL_ENTRY_SIZE: usize = 16;

/// Everything the loader and the indexer need from the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImageHeader {
    pub endian: Endianness,
    pub entry: Address,
    pub phoff: u32,
    pub phentsize: u16,
    pub phnum: u16,
    pub shoff: u32,
    pub shentsize: u16,
    pub shnum: u16,
}

impl ImageHeader {
    /// Read and validate the file header at the current reader position
    ///
    /// Magic and class are checked from a stack buffer, so a non-ELF or
    /// 64-bit file is rejected before any buffer is allocated.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, ParseError> {
        let mut raw = [0u8; FILE_HEADER_SIZE];

        let got = read_up_to(reader, &mut raw[..IDENT_SIZE])?;

        // Only e_ident is filled in yet; the rest of the buffer is still zero
        let (magic, class, data) = {
            let ident = &view::<FileHeader32<Endianness>>(&raw)?.e_ident;
            (ident.magic, ident.class, ident.data)
        };
        if got < magic.len() || magic != elf::ELFMAG {
            return Err(ParseError::InvalidFormat("missing ELF magic number"));
        }
        if got < IDENT_SIZE {
            return Err(ParseError::InvalidFormat("truncated identification block"));
        }

        match class {
            elf::ELFCLASS32 => {}
            elf::ELFCLASS64 => {
                return Err(ParseError::UnsupportedFormat("64-bit ELF images are not supported"))
            }
            _ => return Err(ParseError::InvalidFormat("unknown ELF class")),
        }
        let endian = match data {
            elf::ELFDATA2LSB => Endianness::Little,
            elf::ELFDATA2MSB => Endianness::Big,
            _ => return Err(ParseError::InvalidFormat("unknown ELF data encoding")),
        };

        reader.read_exact(&mut raw[IDENT_SIZE..])?;
        let hdr: &FileHeader32<Endianness> = view(&raw)?;

        let header = Self {
            endian,
            entry: Address(hdr.e_entry.get(endian)),
            phoff: hdr.e_phoff.get(endian),
            phentsize: hdr.e_phentsize.get(endian),
            phnum: hdr.e_phnum.get(endian),
            shoff: hdr.e_shoff.get(endian),
            shentsize: hdr.e_shentsize.get(endian),
            shnum: hdr.e_shnum.get(endian),
        };
        debug!(
            "ELF32 {:?}-endian, entry {}, {} program headers at 0x{:x}, {} section headers at 0x{:x}",
            endian, header.entry, header.phnum, header.phoff, header.shnum, header.shoff
        );
        Ok(header)
    }
}

/// View a byte slice as a fixed-size ELF record
pub(crate) fn view<T: Pod>(bytes: &[u8]) -> Result<&T, ParseError> {
    object::pod::from_bytes::<T>(bytes)
        .map(|(record, _)| record)
        .map_err(|()| ParseError::InvalidFormat("truncated record"))
}

/// Read one `N`-byte record located at `offset`
pub(crate) fn read_record_at<R: Read + Seek, const N: usize>(
    reader: &mut R,
    offset: u64,
) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Offset of entry `index` in a table starting at `base` with stride `entsize`
pub(crate) fn table_entry_offset(base: u32, index: usize, entsize: u16) -> u64 {
    u64::from(base) + index as u64 * u64::from(entsize)
}

/// Like `read_exact`, but a short file is reported as a short count
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
