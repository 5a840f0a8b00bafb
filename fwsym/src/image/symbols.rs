//! Symbol stage: section headers, string pool and symbol records
//!
//! All `SHT_STRTAB` sections are concatenated, in section order, into a single
//! string pool, and every `st_name` is an offset into that pool. Linkers emit
//! `.strtab` ahead of `.shstrtab`, so for their output the offsets land on the
//! symbol names.

use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;

use log::{debug, trace};
use object::elf::{self, SectionHeader32, Sym32};
use object::Endianness;

use super::header::{
    read_record_at, table_entry_offset, view, ImageHeader, SECTION_HEADER_SIZE,
    SYMBOL_ENTRY_SIZE,
};
use super::limits::ParseLimits;
use crate::domain::{Address, ParseError};

/// A symbol as stored in the index: a span of the string pool and a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SymbolEntry {
    pub name: Range<usize>,
    pub address: Address,
}

/// Output of the symbol stage
#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    pub pool: Vec<u8>,
    pub entries: Vec<SymbolEntry>,
}

#[derive(Debug, Clone, Copy)]
struct SectionInfo {
    kind: u32,
    offset: u32,
    size: u32,
}

impl SectionInfo {
    fn fits_in(&self, file_len: u64) -> bool {
        u64::from(self.offset) + u64::from(self.size) <= file_len
    }
}

pub(crate) fn read_symbol_table<R: Read + Seek>(
    reader: &mut R,
    header: &ImageHeader,
    file_len: u64,
    limits: &ParseLimits,
) -> Result<SymbolTable, ParseError> {
    let sections = read_sections(reader, header, file_len, limits)?;

    // First pass: size both kinds of table
    let mut strtab_total: u64 = 0;
    let mut symtab_total: u64 = 0;
    for (index, section) in sections.iter().enumerate() {
        match section.kind {
            elf::SHT_STRTAB => strtab_total += u64::from(section.size),
            elf::SHT_SYMTAB => {
                if section.size as usize % SYMBOL_ENTRY_SIZE != 0 {
                    return Err(ParseError::MalformedSymbolTable(format!(
                        "section {index} size {} is not a multiple of {SYMBOL_ENTRY_SIZE}",
                        section.size
                    )));
                }
                symtab_total += u64::from(section.size);
            }
            _ => continue,
        }
        if !section.fits_in(file_len) {
            return Err(ParseError::MalformedSymbolTable(format!(
                "section {index} extends past end of image"
            )));
        }
    }
    // Each table fits the file, so only tables sharing bytes can exceed it
    for (kind, total) in [("string", strtab_total), ("symbol", symtab_total)] {
        if total > file_len {
            return Err(ParseError::MalformedSymbolTable(format!(
                "{kind} tables total {total} bytes, more than the {file_len} byte image"
            )));
        }
    }

    // Second pass: concatenate the string tables
    let mut pool = Vec::with_capacity(usize::try_from(strtab_total).unwrap_or(0));
    for section in sections.iter().filter(|s| s.kind == elf::SHT_STRTAB) {
        let start = pool.len();
        pool.resize(start + section.size as usize, 0);
        reader.seek(SeekFrom::Start(u64::from(section.offset)))?;
        reader.read_exact(&mut pool[start..])?;
    }

    // Third pass: resolve every symbol against the pool
    let symbol_count = usize::try_from(symtab_total / SYMBOL_ENTRY_SIZE as u64).unwrap_or(0);
    let mut entries = Vec::with_capacity(symbol_count);
    let endian = header.endian;
    for section in sections.iter().filter(|s| s.kind == elf::SHT_SYMTAB) {
        let count = section.size as usize / SYMBOL_ENTRY_SIZE;
        for i in 0..count {
            let offset = u64::from(section.offset) + (i * SYMBOL_ENTRY_SIZE) as u64;
            let raw: [u8; SYMBOL_ENTRY_SIZE] = read_record_at(reader, offset)?;
            let sym: &Sym32<Endianness> = view(&raw)?;

            let name = name_span(&pool, sym.st_name.get(endian) as usize)?;
            let address = Address(sym.st_value.get(endian));
            trace!("symbol {} = {address}", String::from_utf8_lossy(&pool[name.clone()]));

            entries.push(SymbolEntry { name, address });
        }
    }

    debug!(
        "{} symbols, {} byte string pool from {} sections",
        entries.len(),
        pool.len(),
        sections.len()
    );
    Ok(SymbolTable { pool, entries })
}

/// Read the section header table, honouring extended section numbering
fn read_sections<R: Read + Seek>(
    reader: &mut R,
    header: &ImageHeader,
    file_len: u64,
    limits: &ParseLimits,
) -> Result<Vec<SectionInfo>, ParseError> {
    if header.shoff == 0 {
        debug!("Image has no section header table");
        return Ok(Vec::new());
    }
    if usize::from(header.shentsize) < SECTION_HEADER_SIZE {
        return Err(ParseError::InvalidFormat("section header entry size too small"));
    }

    let endian = header.endian;
    let read_section = |reader: &mut R, index: usize| -> Result<SectionInfo, ParseError> {
        let offset = table_entry_offset(header.shoff, index, header.shentsize);
        if offset + SECTION_HEADER_SIZE as u64 > file_len {
            return Err(ParseError::InvalidFormat(
                "section header table extends past end of image",
            ));
        }
        let raw: [u8; SECTION_HEADER_SIZE] = read_record_at(reader, offset)?;
        let shdr: &SectionHeader32<Endianness> = view(&raw)?;
        Ok(SectionInfo {
            kind: shdr.sh_type.get(endian),
            offset: shdr.sh_offset.get(endian),
            size: shdr.sh_size.get(endian),
        })
    };

    // With 0xff00 or more sections, e_shnum is 0 and section 0 carries the count
    let count = if header.shnum == 0 {
        read_section(reader, 0)?.size as usize
    } else {
        usize::from(header.shnum)
    };
    if count > limits.max_sections {
        return Err(ParseError::TooManySections { count, limit: limits.max_sections });
    }
    if let Some(last) = count.checked_sub(1) {
        let table_end = table_entry_offset(header.shoff, last, header.shentsize)
            + SECTION_HEADER_SIZE as u64;
        if table_end > file_len {
            return Err(ParseError::InvalidFormat(
                "section header table extends past end of image",
            ));
        }
    }

    let mut sections = Vec::with_capacity(count);
    for index in 0..count {
        let section = read_section(reader, index)?;
        debug!(
            "section {index}: type {} offset 0x{:x} size 0x{:x}",
            section.kind, section.offset, section.size
        );
        sections.push(section);
    }
    Ok(sections)
}

/// Span of the NUL-terminated name starting at `offset`
///
/// An offset equal to the pool length is an empty name; a name with no
/// terminator runs to the end of the pool.
fn name_span(pool: &[u8], offset: usize) -> Result<Range<usize>, ParseError> {
    if offset > pool.len() {
        return Err(ParseError::MalformedSymbolTable(format!(
            "name offset {offset} outside {} byte string pool",
            pool.len()
        )));
    }
    let len = pool[offset..].iter().position(|&b| b == 0).unwrap_or(pool.len() - offset);
    Ok(offset..offset + len)
}
