//! ELF32 image builder shared by the integration tests
//!
//! Produces small but structurally complete images: file header, program
//! headers, segment contents, `.strtab`, one or more `.symtab`, `.shstrtab`
//! and the section header table, in either byte order.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const PT_LOAD: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;

pub const E_SHOFF_OFFSET: usize = 32;
pub const E_PHNUM_OFFSET: usize = 44;
pub const E_SHNUM_OFFSET: usize = 48;

#[derive(Debug, Clone)]
pub struct SegmentDef {
    pub kind: u32,
    pub vaddr: u32,
    pub data: Vec<u8>,
    pub mem_size: u32,
}

#[derive(Debug, Clone)]
struct SymbolDef {
    name: String,
    st_name_override: Option<u32>,
    value: u32,
}

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    big_endian: bool,
    class: u8,
    entry: u32,
    phentsize: u16,
    segments: Vec<SegmentDef>,
    symbol_tables: Vec<Vec<SymbolDef>>,
    symtab_trailing_bytes: usize,
    with_sections: bool,
    extended_numbering: bool,
    duplicate_strtab_headers: usize,
}

/// Bytes of a built image and where each segment's data was placed
pub struct BuiltImage {
    pub bytes: Vec<u8>,
    pub segment_offsets: Vec<usize>,
}

impl BuiltImage {
    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&self.bytes).expect("Failed to write image");
        file.flush().expect("Failed to flush image");
        file
    }
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            big_endian: false,
            class: 1,
            entry: 0,
            phentsize: 32,
            segments: Vec::new(),
            symbol_tables: vec![Vec::new()],
            symtab_trailing_bytes: 0,
            with_sections: true,
            extended_numbering: false,
            duplicate_strtab_headers: 0,
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn class(mut self, class: u8) -> Self {
        self.class = class;
        self
    }

    pub fn entry(mut self, entry: u32) -> Self {
        self.entry = entry;
        self
    }

    pub fn phentsize(mut self, size: u16) -> Self {
        self.phentsize = size;
        self
    }

    /// Add a `PT_LOAD` segment; `mem_size` may exceed `data.len()`
    pub fn segment(self, vaddr: u32, data: &[u8], mem_size: u32) -> Self {
        self.segment_of_kind(PT_LOAD, vaddr, data, mem_size)
    }

    pub fn segment_of_kind(mut self, kind: u32, vaddr: u32, data: &[u8], mem_size: u32) -> Self {
        self.segments.push(SegmentDef { kind, vaddr, data: data.to_vec(), mem_size });
        self
    }

    /// Add a symbol to the most recently started symbol table
    pub fn symbol(mut self, name: &str, value: u32) -> Self {
        self.current_table().push(SymbolDef {
            name: name.to_string(),
            st_name_override: None,
            value,
        });
        self
    }

    /// Add a symbol whose `st_name` is written verbatim
    pub fn symbol_with_name_offset(mut self, st_name: u32, value: u32) -> Self {
        self.current_table().push(SymbolDef {
            name: String::new(),
            st_name_override: Some(st_name),
            value,
        });
        self
    }

    /// Start a second (third, ...) `SHT_SYMTAB` section
    pub fn new_symbol_table(mut self) -> Self {
        self.symbol_tables.push(Vec::new());
        self
    }

    /// Pad the first symbol table so its size is not a multiple of 16
    pub fn symtab_trailing_bytes(mut self, n: usize) -> Self {
        self.symtab_trailing_bytes = n;
        self
    }

    /// Emit no section header table at all
    pub fn without_sections(mut self) -> Self {
        self.with_sections = false;
        self
    }

    /// Write `e_shnum` as 0 and put the section count in section 0's `sh_size`
    pub fn extended_numbering(mut self) -> Self {
        self.extended_numbering = true;
        self
    }

    /// Repeat the `.strtab` section header `n` more times, all over the same bytes
    pub fn duplicate_strtab_headers(mut self, n: usize) -> Self {
        self.duplicate_strtab_headers = n;
        self
    }

    fn current_table(&mut self) -> &mut Vec<SymbolDef> {
        self.symbol_tables.last_mut().expect("at least one symbol table")
    }

    pub fn build(&self) -> BuiltImage {
        let enc = Enc { big: self.big_endian };
        let phnum = self.segments.len();
        let phoff = if phnum == 0 { 0 } else { 52 };

        let mut out = vec![0u8; 52 + phnum * usize::from(self.phentsize)];

        // Segment contents
        let mut segment_offsets = Vec::new();
        for seg in &self.segments {
            segment_offsets.push(out.len());
            out.extend_from_slice(&seg.data);
        }

        // Program headers
        for (i, seg) in self.segments.iter().enumerate() {
            let mut ph = Vec::new();
            enc.u32(&mut ph, seg.kind);
            enc.u32(&mut ph, if seg.data.is_empty() { 0 } else { segment_offsets[i] as u32 });
            enc.u32(&mut ph, seg.vaddr);
            enc.u32(&mut ph, seg.vaddr);
            enc.u32(&mut ph, seg.data.len() as u32);
            enc.u32(&mut ph, seg.mem_size);
            enc.u32(&mut ph, 5);
            enc.u32(&mut ph, 4);
            let at = 52 + i * usize::from(self.phentsize);
            out[at..at + ph.len()].copy_from_slice(&ph);
        }

        let mut shoff = 0usize;
        let mut shnum = 0usize;
        let mut shstrndx = 0usize;

        if self.with_sections {
            // .strtab
            let mut strtab = vec![0u8];
            let mut name_offsets: Vec<Vec<u32>> = Vec::new();
            for table in &self.symbol_tables {
                let mut offsets = Vec::new();
                for sym in table {
                    let offset = match sym.st_name_override {
                        Some(o) => o,
                        None if sym.name.is_empty() => 0,
                        None => {
                            let o = strtab.len() as u32;
                            strtab.extend_from_slice(sym.name.as_bytes());
                            strtab.push(0);
                            o
                        }
                    };
                    offsets.push(offset);
                }
                name_offsets.push(offsets);
            }

            // .symtab sections; the first starts with the null symbol
            let mut symtabs = Vec::new();
            for (t, table) in self.symbol_tables.iter().enumerate() {
                let mut bytes = Vec::new();
                if t == 0 {
                    bytes.extend_from_slice(&[0u8; 16]);
                }
                for (sym, &st_name) in table.iter().zip(&name_offsets[t]) {
                    enc.u32(&mut bytes, st_name);
                    enc.u32(&mut bytes, sym.value);
                    enc.u32(&mut bytes, 0);
                    bytes.push(0x12);
                    bytes.push(0);
                    enc.u16(&mut bytes, 1);
                }
                if t == 0 {
                    bytes.extend(std::iter::repeat(0u8).take(self.symtab_trailing_bytes));
                }
                symtabs.push(bytes);
            }

            let shstrtab = b"\0.strtab\0.symtab\0.shstrtab\0".to_vec();
            let (name_strtab, name_symtab, name_shstrtab) = (1u32, 9u32, 17u32);

            // Sections: null, .strtab, .symtab..., .shstrtab
            let mut sections: Vec<[u32; 10]> = vec![[0; 10]];

            let strtab_off = out.len();
            out.extend_from_slice(&strtab);
            let strtab_section = [name_strtab, SHT_STRTAB, 0, 0, strtab_off as u32, strtab.len() as u32, 0, 0, 1, 0];
            sections.push(strtab_section);
            for _ in 0..self.duplicate_strtab_headers {
                sections.push(strtab_section);
            }

            for bytes in &symtabs {
                while out.len() % 4 != 0 {
                    out.push(0);
                }
                let off = out.len();
                out.extend_from_slice(bytes);
                sections.push([name_symtab, SHT_SYMTAB, 0, 0, off as u32, bytes.len() as u32, 1, 1, 4, 16]);
            }

            let shstr_off = out.len();
            out.extend_from_slice(&shstrtab);
            shstrndx = sections.len();
            sections.push([name_shstrtab, SHT_STRTAB, 0, 0, shstr_off as u32, shstrtab.len() as u32, 0, 0, 1, 0]);

            while out.len() % 4 != 0 {
                out.push(0);
            }
            shoff = out.len();
            shnum = sections.len();
            if self.extended_numbering {
                sections[0][5] = shnum as u32;
                shnum = 0;
            }
            for section in &sections {
                for &field in section {
                    enc.u32(&mut out, field);
                }
            }
        }

        // File header
        let mut hdr = Vec::new();
        hdr.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
        hdr.push(self.class);
        hdr.push(if self.big_endian { 2 } else { 1 });
        hdr.push(1);
        hdr.extend_from_slice(&[0u8; 9]);
        enc.u16(&mut hdr, 2); // e_type: EXEC
        enc.u16(&mut hdr, 40); // e_machine: ARM
        enc.u32(&mut hdr, 1);
        enc.u32(&mut hdr, self.entry);
        enc.u32(&mut hdr, phoff);
        enc.u32(&mut hdr, shoff as u32);
        enc.u32(&mut hdr, 0x0500_0200);
        enc.u16(&mut hdr, 52);
        enc.u16(&mut hdr, self.phentsize);
        enc.u16(&mut hdr, phnum as u16);
        enc.u16(&mut hdr, 40);
        enc.u16(&mut hdr, shnum as u16);
        enc.u16(&mut hdr, shstrndx as u16);
        assert_eq!(hdr.len(), 52);
        out[..52].copy_from_slice(&hdr);

        BuiltImage { bytes: out, segment_offsets }
    }
}

/// Read a 32-bit field from a little-endian image
pub fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().expect("4 bytes"))
}

/// Overwrite a 32-bit field in a little-endian image
pub fn patch_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Overwrite a 16-bit header field in a little-endian image
pub fn patch_u16_le(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// A typical Cortex-M image: flash with code and initialised data, RAM with
/// a file-backed `.data` head followed by `.bss`
pub fn cortex_m_image() -> ImageBuilder {
    let flash: Vec<u8> = (0u8..64).collect();
    ImageBuilder::new()
        .entry(0x0800_0041)
        .segment(0x0800_0000, &flash, 64)
        .segment(0x2000_0000, &[0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04], 0x100)
        .symbol("Reset_Handler", 0x0800_0041)
        .symbol("startup", 0x0800_0011)
        .symbol("startup_late", 0x0800_0021)
        .symbol("g_config", 0x2000_0000)
        .symbol("g_counter", 0x2000_0010)
        .symbol("_SEGGER_RTT", 0x2000_0040)
        .symbol("__vector_base", 0)
}

struct Enc {
    big: bool,
}

impl Enc {
    fn u16(&self, out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&if self.big { v.to_be_bytes() } else { v.to_le_bytes() });
    }

    fn u32(&self, out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&if self.big { v.to_be_bytes() } else { v.to_le_bytes() });
    }
}
