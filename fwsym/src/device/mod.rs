//! Device memory access and image/target cross-checking
//!
//! The parser never talks to hardware. Tools that do (a debug adapter, a GDB
//! server, a captured RAM dump) implement [`DeviceMemory`], and
//! [`cross_check`] compares what the image says an address will hold with what
//! the device reports.
//!
//! - [`DeviceMemory`]: open / read / close contract for a memory source
//! - [`SnapshotMemory`]: offline source backed by a raw memory dump
//! - [`cross_check`]: resolve a symbol and diff image bytes against the device

pub mod cross_check;
pub mod snapshot;

use std::path::Path;

use crate::domain::{Address, DeviceError};

pub use cross_check::{cross_check, Comparison};
pub use snapshot::SnapshotMemory;

/// A source of target memory contents
pub trait DeviceMemory {
    /// Connect to the device described by `config`
    ///
    /// # Errors
    /// Backend-specific; an error leaves the device closed
    fn open(&mut self, config: &Path) -> Result<(), DeviceError>;

    /// Read `length` bytes starting at `address`
    ///
    /// # Errors
    /// `NotOpen` before a successful [`open`](DeviceMemory::open), or a
    /// backend error for the read itself
    fn read_memory(&mut self, address: Address, length: usize) -> Result<Vec<u8>, DeviceError>;

    /// Disconnect; further reads fail with `NotOpen`
    fn close(&mut self);
}
