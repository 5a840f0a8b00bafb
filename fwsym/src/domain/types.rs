//! Domain types providing compile-time safety and self-documentation
//!
//! Target addresses are 32-bit: every image this crate accepts is ELF32, so a
//! load address never exceeds `u32::MAX`. Range ends (`base + memsz`) can, which
//! is why range arithmetic elsewhere is done in `u64`.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Absolute address in the target's memory map
///
/// `Address(0)` is a valid address; absence is always expressed as
/// `Option<Address>`, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u32);

impl Address {
    /// Widen to `u64` for range arithmetic
    #[must_use]
    pub fn as_u64(self) -> u64 {
        u64::from(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Accepts `0x`-prefixed hexadecimal or plain decimal
impl FromStr for Address {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(&hex.replace('_', ""), 16)?
        } else {
            s.replace('_', "").parse()?
        };
        Ok(Address(value))
    }
}
