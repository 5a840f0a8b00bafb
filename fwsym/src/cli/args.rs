//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::Address;
use crate::image::limits::{DEFAULT_MAX_SECTIONS, DEFAULT_MAX_SEGMENTS};
use crate::image::ParseLimits;

#[derive(Parser, Debug)]
#[command(
    name = "fwsym",
    version,
    about = "Resolve symbol addresses and load-time data from 32-bit firmware images",
    after_help = "\
EXAMPLES:
    fwsym -i fw.elf lookup startup                  Address of the first symbol containing 'startup'
    fwsym -i fw.elf read 0x20000000 --len 32        Bytes the target holds there after load
    fwsym -i fw.elf symbols --filter RTT            List matching symbols
    fwsym -i fw.elf compare _SEGGER_RTT --snapshot ram.bin --base 0x20000000"
)]
pub struct Args {
    /// Firmware image (ELF32)
    #[arg(short, long, value_name = "ELF")]
    pub image: PathBuf,

    /// Reject images declaring more program headers than this
    #[arg(long, default_value_t = DEFAULT_MAX_SEGMENTS)]
    pub max_segments: usize,

    /// Reject images declaring more section headers than this
    #[arg(long, default_value_t = DEFAULT_MAX_SECTIONS)]
    pub max_sections: usize,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the address of each named symbol (substring match)
    Lookup {
        #[arg(value_name = "NAME", default_value = "startup")]
        names: Vec<String>,

        /// Require the full symbol name to match
        #[arg(long)]
        exact: bool,
    },

    /// Hex dump the bytes an address holds after load
    Read {
        #[arg(value_name = "ADDR")]
        address: Address,

        /// Number of bytes to show
        #[arg(short, long, default_value = "16")]
        len: usize,
    },

    /// List symbols in table order
    Symbols {
        /// Only symbols whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Demangle Rust symbol names
        #[arg(short, long)]
        demangle: bool,
    },

    /// List program header segments
    Segments,

    /// Write segments and symbols as JSON
    Export {
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },

    /// Compare image bytes at a symbol with a raw memory snapshot
    Compare {
        #[arg(value_name = "NAME")]
        name: String,

        /// Raw dump of target memory
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,

        /// Target address of the first byte in the snapshot
        #[arg(long, value_name = "ADDR")]
        base: Address,

        /// Number of bytes to compare
        #[arg(short, long, default_value = "4")]
        len: usize,
    },
}

impl Args {
    /// Parse limits from the command line
    #[must_use]
    pub fn limits(&self) -> ParseLimits {
        ParseLimits { max_segments: self.max_segments, max_sections: self.max_sections }
    }
}
