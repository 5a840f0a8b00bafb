//! Memory source backed by a raw dump of target memory

use std::fs;
use std::path::Path;

use log::debug;

use super::DeviceMemory;
use crate::domain::{Address, DeviceError};

/// A raw memory dump mapped at a fixed base address
///
/// The dump is taken elsewhere (for example `dump binary memory` in GDB) and
/// covers `[base, base + len)` of the target's address space.
#[derive(Debug, Clone)]
pub struct SnapshotMemory {
    base: Address,
    data: Option<Vec<u8>>,
}

impl SnapshotMemory {
    /// An unopened snapshot that will be mapped at `base`
    #[must_use]
    pub fn new(base: Address) -> Self {
        Self { base, data: None }
    }

    /// An already-open snapshot over in-memory bytes
    #[must_use]
    pub fn from_bytes(base: Address, data: Vec<u8>) -> Self {
        Self { base, data: Some(data) }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.data.is_some()
    }
}

impl DeviceMemory for SnapshotMemory {
    fn open(&mut self, config: &Path) -> Result<(), DeviceError> {
        let data = fs::read(config)?;
        debug!("Snapshot {} mapped at {} ({} bytes)", config.display(), self.base, data.len());
        self.data = Some(data);
        Ok(())
    }

    fn read_memory(&mut self, address: Address, length: usize) -> Result<Vec<u8>, DeviceError> {
        let data = self.data.as_ref().ok_or(DeviceError::NotOpen)?;
        let out_of_range = || DeviceError::OutOfRange { address, length };

        let start = address.as_u64().checked_sub(self.base.as_u64()).ok_or_else(out_of_range)?;
        let end = u64::try_from(length)
            .ok()
            .and_then(|l| start.checked_add(l))
            .ok_or_else(out_of_range)?;
        if end > data.len() as u64 {
            return Err(out_of_range());
        }

        Ok(data[start as usize..end as usize].to_vec())
    }

    fn close(&mut self) {
        self.data = None;
    }
}
