//! Terminal output for the fwsym binary
//!
//! Formatting lives here (as pure functions where practical) so `main.rs`
//! stays a thin dispatcher.

// Hex dump assembly reads better with format!
#![allow(clippy::format_push_string)]

use rustc_demangle::demangle;

use crate::device::Comparison;
use crate::domain::Address;
use crate::image::{AddressData, SymbolIndex};

const BYTES_PER_LINE: usize = 16;

/// Demangle a Rust symbol name; other names pass through unchanged
#[must_use]
pub fn demangle_symbol(symbol: &str) -> String {
    format!("{:#}", demangle(symbol))
}

/// Classic `addr: hex  |ascii|` dump, one line per 16 bytes
#[must_use]
pub fn hex_dump(start: Address, bytes: &[u8]) -> String {
    let mut output = String::new();

    for (line, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        let addr = start.as_u64() + (line * BYTES_PER_LINE) as u64;
        output.push_str(&format!("0x{addr:08x}: "));

        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(b) => output.push_str(&format!("{b:02x} ")),
                None => output.push_str("   "),
            }
        }

        output.push_str(" |");
        for &b in chunk {
            output.push(if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' });
        }
        output.push('|');

        if line + 1 < bytes.len().div_ceil(BYTES_PER_LINE) {
            output.push('\n');
        }
    }

    output
}

/// Print a load-time dump of `bytes` read at `addr`, noting any zero-fill span
pub fn display_read(index: &SymbolIndex, addr: Address, bytes: &[u8]) {
    println!("{}", hex_dump(addr, bytes));

    let file_backed = match index.resolve_address(addr) {
        Some(AddressData::FileBacked(data)) => data.len().min(bytes.len()),
        _ => 0,
    };
    if file_backed < bytes.len() {
        println!("  ({} bytes zero-fill at load)", bytes.len() - file_backed);
    }
}

/// Print symbols in table order, optionally filtered and demangled
pub fn display_symbols(index: &SymbolIndex, filter: Option<&str>, demangled: bool) {
    let mut shown = 0usize;
    for sym in index.symbols_matching(filter.unwrap_or("")) {
        let name = sym.name();
        if name.is_empty() {
            continue;
        }
        let name = if demangled { demangle_symbol(&name) } else { name.into_owned() };
        println!("{}  {name}", sym.address);
        shown += 1;
    }
    eprintln!("{shown} of {} symbols", index.symbol_count());
}

/// Print the segment table, flagging overlapping ranges
pub fn display_segments(index: &SymbolIndex) {
    println!("  #  {:<9} {:<10}  {:>10}  {:>10}", "TYPE", "VADDR", "FILESZ", "MEMSZ");
    for (i, seg) in index.segments().iter().enumerate() {
        println!(
            "{i:>3}  {:<9} {}  0x{:08x}  0x{:08x}",
            seg.kind_name(),
            seg.base(),
            seg.file_size(),
            seg.mem_size()
        );
    }
    for (a, b) in index.overlapping_segments() {
        println!("warning: segments {a} and {b} overlap; addresses resolve to segment {a}");
    }
}

/// Print the result of an image/device comparison
pub fn display_comparison(cmp: &Comparison) {
    println!("{} at {} ({} bytes)", cmp.symbol, cmp.address, cmp.expected.len());
    println!("  image:  {}", hex_bytes(&cmp.expected));
    println!("  device: {}", hex_bytes(&cmp.actual));

    let mismatches = cmp.mismatches();
    if mismatches.is_empty() {
        println!("  ✓ match");
    } else {
        let offsets: Vec<String> = mismatches.iter().map(|o| format!("+{o}")).collect();
        println!("  ✗ {} byte(s) differ at {}", mismatches.len(), offsets.join(", "));
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}
