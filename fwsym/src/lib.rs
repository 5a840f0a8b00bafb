//! # fwsym - Firmware Image Symbol and Load-Data Resolver
//!
//! fwsym reads a linked 32-bit firmware image (ELF32) and answers two questions
//! an embedded debugging tool asks before, or instead of, attaching to a target:
//!
//! - At which absolute address will a named symbol live once the image is
//!   loaded?
//! - What bytes will a given target address hold right after load?
//!
//! Both are answered from the image alone, without a debugger or a running device.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      firmware.elf (ELF32)                       │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ seek + read
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      fwsym (This Crate)                         │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │ Image Loader │──▶│ Symbol Stage │──▶│ SymbolIndex  │         │
//! │  │ (segments)   │   │ (strings,    │   │  (queries)   │         │
//! │  └──────────────┘   │  symbols)    │   └──────┬───────┘         │
//! │                     └──────────────┘          │                 │
//! │                     ┌─────────────────────────┼──────────┐      │
//! │                     ▼                         ▼          ▼      │
//! │              ┌──────────────┐   ┌──────────────┐ ┌───────────┐  │
//! │              │ Cross-check  │   │    Export    │ │  Display  │  │
//! │              │ (device mem) │   │ (JSON)       │ │  (CLI)    │  │
//! │              └──────────────┘   └──────────────┘ └───────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`image`]: ELF32 parsing and the query surface
//!   - `loader`: file header, program headers, segment contents
//!   - `index`: [`image::SymbolIndex`] with symbol and address lookups
//!   - `segment`: segments and their address ranges
//!   - `limits`: caps on declared table sizes
//!
//! - [`device`]: the [`device::DeviceMemory`] contract, an offline snapshot
//!   backend and image/device cross-checking
//!
//! - [`export`]: JSON report of segments and symbols
//!
//! - [`display`]: terminal formatting used by the binary
//!
//! - [`cli`]: Command-line argument parsing and configuration
//!
//! - [`domain`]: Core domain types ([`domain::Address`]) and errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Where does the startup routine live?
//! fwsym -i build/firmware.elf lookup startup
//!
//! # What does RAM hold at 0x20000000 after load?
//! fwsym -i build/firmware.elf read 0x20000000 --len 64
//!
//! # Does a RAM dump agree with the image for a variable?
//! fwsym -i build/firmware.elf compare g_config --snapshot ram.bin --base 0x20000000 --len 16
//! ```
//!
//! ## Logging
//!
//! Library code logs parse diagnostics at `debug` and per-symbol detail at
//! `trace` through the `log` facade. The binary installs `env_logger`, so
//! `RUST_LOG=fwsym=debug` shows how an image was read.

pub mod cli;
pub mod device;
pub mod display;
pub mod domain;
pub mod export;
pub mod image;
