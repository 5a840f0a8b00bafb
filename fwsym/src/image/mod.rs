//! # Firmware Image Parsing and Address Resolution
//!
//! This module turns a linked 32-bit firmware image into two lookups a debug
//! tool needs before it ever touches a target:
//!
//! - **symbol → address**: where will `startup` (or `_SEGGER_RTT`, or a global
//!   counter) live once the image is flashed?
//! - **address → bytes**: what will the target hold at `0x2000_0100` right
//!   after load?
//!
//! ## Key Concepts
//!
//! ### Segments (program headers)
//!
//! Each program header describes a region of the target's address space:
//!
//! ```text
//!   vaddr                    vaddr + filesz            vaddr + memsz
//!     │◄──── file-backed ─────►│◄──── zero-fill ──────────►│
//!     │   bytes copied from    │   .bss-style storage,     │
//!     │   p_offset in the file │   zero at load time       │
//! ```
//!
//! The file-backed part is copied into an owned buffer while loading. The
//! zero-fill part has no storage; lookups into it return
//! [`AddressData::ZeroFill`].
//!
//! ### String pool and symbols (sections)
//!
//! Symbol records don't store names, only an offset (`st_name`) into string
//! table data. Every `SHT_STRTAB` section is concatenated, in section order,
//! into one pool, and each offset is resolved against that pool:
//!
//! ```text
//!   .strtab   "\0Reset_Handler\0startup\0..."   ┐
//!   .shstrtab "\0.text\0.data\0..."             ┘─► string pool
//!
//!   Sym32 { st_name: 15, st_value: 0x0800_0101 } ─► ("startup", 0x0800_0101)
//! ```
//!
//! ## Parse Flow
//!
//! ```text
//! 1. Read e_ident from a stack buffer
//!    magic != 7f 'E' 'L' 'F'  → InvalidFormat      (no buffer allocated)
//!    class == ELFCLASS64      → UnsupportedFormat  (no further reads)
//!
//! 2. Read the rest of the ELF32 header (either byte order)
//!
//! 3. Program headers: e_phnum entries at e_phoff, stride e_phentsize
//!    copy p_filesz bytes from p_offset for each non-empty segment
//!
//! 4. Section headers: e_shnum entries at e_shoff, stride e_shentsize
//!    sum SHT_STRTAB sizes, sum SHT_SYMTAB sizes
//!
//! 5. Concatenate string tables into the pool
//!
//! 6. Walk every symbol table, resolving st_name against the pool
//! ```
//!
//! Steps 1–3 are [`loader`], steps 4–6 run in [`LoadedImage::index`]; both
//! seek through the same open reader. The result is a [`SymbolIndex`].
//!
//! ## Example
//!
//! ```rust,ignore
//! let index = SymbolIndex::open("build/firmware.elf")?;
//!
//! let rtt = index.find_symbol_address("_SEGGER_RTT").expect("RTT not linked in");
//! match index.resolve_address(rtt) {
//!     Some(AddressData::FileBacked(bytes)) => println!("initialised: {:02x?}", &bytes[..16]),
//!     Some(AddressData::ZeroFill { len }) => println!("zero-initialised, {len} bytes left"),
//!     None => println!("not in any segment"),
//! }
//! ```
//!
//! ## Limitations
//!
//! - **ELF32 only**: 64-bit images are detected and rejected
//! - **No relocations**: addresses are taken as linked
//! - **No DWARF**: names come from the symbol table only
//! - **Overlapping segments**: accepted, the first in program header order
//!   answers lookups (see [`SymbolIndex::overlapping_segments`])

pub(crate) mod header;
pub mod index;
pub mod limits;
pub mod loader;
pub mod segment;
pub(crate) mod symbols;

pub use index::{AddressData, Symbol, SymbolIndex};
pub use limits::ParseLimits;
pub use loader::{load, LoadedImage};
pub use segment::{MemoryRange, Segment};
