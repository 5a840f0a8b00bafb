//! Compare image load-time bytes with device memory

use anyhow::{Context, Result};
use log::info;

use super::DeviceMemory;
use crate::domain::{Address, LookupError};
use crate::image::SymbolIndex;

/// Image bytes and device bytes for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Full name of the symbol that matched the query
    pub symbol: String,
    pub address: Address,
    /// Load-time content according to the image
    pub expected: Vec<u8>,
    /// Content reported by the device
    pub actual: Vec<u8>,
}

impl Comparison {
    /// Offsets (from `address`) at which the device differs from the image
    #[must_use]
    pub fn mismatches(&self) -> Vec<usize> {
        self.expected
            .iter()
            .zip(&self.actual)
            .enumerate()
            .filter_map(|(i, (e, a))| (e != a).then_some(i))
            .collect()
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.expected == self.actual
    }
}

/// Resolve `name` in the image and compare `len` bytes there with `device`
///
/// # Errors
/// Returns an error if no symbol matches, the span is not inside one image
/// segment, or the device read fails
pub fn cross_check<D: DeviceMemory + ?Sized>(
    index: &SymbolIndex,
    device: &mut D,
    name: &str,
    len: usize,
) -> Result<Comparison> {
    let symbol = index
        .symbols_matching(name)
        .next()
        .ok_or_else(|| LookupError::SymbolNotFound(name.to_string()))?;
    let address = symbol.address;

    let expected = index
        .read_bytes(address, len)
        .ok_or(LookupError::RangeNotMapped { address, length: len })?;
    let actual = device
        .read_memory(address, len)
        .with_context(|| format!("Failed to read {len} bytes at {address} from device"))?;

    info!("Cross-checking {} at {address} ({len} bytes)", symbol.name());
    Ok(Comparison { symbol: symbol.name().into_owned(), address, expected, actual })
}
