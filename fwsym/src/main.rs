//! # fwsym - Main Entry Point
//!
//! Parses one firmware image, runs a single subcommand against the resulting
//! index, then releases it. Exit codes distinguish "image could not be used"
//! from "image fine, lookup missed" so scripts can tell them apart.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;

use fwsym::cli::{Args, Command};
use fwsym::device::{cross_check, DeviceMemory, SnapshotMemory};
use fwsym::display::{display_comparison, display_read, display_segments, display_symbols};
use fwsym::domain::{LookupError, ParseError};
use fwsym::export::ImageReport;
use fwsym::image::SymbolIndex;

// Exit codes (clap itself exits with 2 on usage errors)
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOT_FOUND: i32 = 3;
const EXIT_UNSUPPORTED: i32 = 4;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<LookupError>().is_some() {
        return EXIT_NOT_FOUND;
    }
    match err.downcast_ref::<ParseError>() {
        Some(ParseError::UnsupportedFormat(_)) => EXIT_UNSUPPORTED,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let index = SymbolIndex::open_with_limits(&args.image, args.limits())
        .with_context(|| format!("Failed to parse {}", args.image.display()))?;

    if !quiet {
        println!("fwsym v{}", env!("CARGO_PKG_VERSION"));
        println!("image: {}", args.image.display());
        println!("entry: {}", index.entry_point());
        println!("segments: {}, symbols: {}", index.segments().len(), index.symbol_count());
    }

    match args.command {
        Command::Lookup { names, exact } => lookup(&index, &names, exact)?,

        Command::Read { address, len } => {
            if index.resolve_address(address).is_none() {
                return Err(LookupError::AddressNotMapped(address).into());
            }
            let bytes = index
                .read_bytes(address, len)
                .ok_or(LookupError::RangeNotMapped { address, length: len })?;
            display_read(&index, address, &bytes);
        }

        Command::Symbols { filter, demangle } => {
            display_symbols(&index, filter.as_deref(), demangle);
        }

        Command::Segments => display_segments(&index),

        Command::Export { output } => {
            let file = File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            ImageReport::from_index(&index)
                .export(BufWriter::new(file))
                .context("Failed to export image report")?;
            if !quiet {
                println!("saved: {}", output.display());
            }
        }

        Command::Compare { name, snapshot, base, len } => {
            let mut device = SnapshotMemory::new(base);
            device
                .open(&snapshot)
                .with_context(|| format!("Failed to open snapshot {}", snapshot.display()))?;
            let result = cross_check(&index, &mut device, &name, len);
            device.close();
            display_comparison(&result?);
        }
    }

    index.release();
    Ok(())
}

/// Print each name's address; a miss is reported after all names are tried
fn lookup(index: &SymbolIndex, names: &[String], exact: bool) -> Result<()> {
    let mut first_miss = None;

    for name in names {
        let found = if exact {
            index.find_symbol_exact(name)
        } else {
            index.find_symbol_address(name)
        };
        match found {
            Some(addr) => {
                info!("{name} resolved to {addr}");
                println!("{name}: {addr}");
            }
            None => {
                println!("{name}: not found");
                first_miss.get_or_insert_with(|| name.clone());
            }
        }
    }

    match first_miss {
        Some(name) => Err(LookupError::SymbolNotFound(name).into()),
        None => Ok(()),
    }
}
