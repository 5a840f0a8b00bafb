//! Structured error types for fwsym
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::Address;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to build a [`SymbolIndex`](crate::image::SymbolIndex) from an image
///
/// Every variant is deterministic for a given file; retrying never helps.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Image not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Not a valid ELF image: {0}")]
    InvalidFormat(&'static str),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(&'static str),

    #[error("Image declares {count} program headers, limit is {limit}")]
    TooManySegments { count: usize, limit: usize },

    #[error("Image declares {count} section headers, limit is {limit}")]
    TooManySections { count: usize, limit: usize },

    #[error("Malformed segment {index}: {reason}")]
    MalformedSegment { index: usize, reason: &'static str },

    #[error("Malformed symbol table: {0}")]
    MalformedSymbolTable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A query that found nothing, where the caller needs it as an error
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No symbol matching '{0}'")]
    SymbolNotFound(String),

    #[error("Address {0} is not inside any segment")]
    AddressNotMapped(Address),

    #[error("{length} bytes at {address} run past the end of their segment")]
    RangeNotMapped { address: Address, length: usize },
}

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device memory is not open")]
    NotOpen,

    #[error("Read of {length} bytes at {address} is outside device memory")]
    OutOfRange { address: Address, length: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::TooManySegments { count: 300, limit: 256 };
        assert_eq!(err.to_string(), "Image declares 300 program headers, limit is 256");

        let err = ParseError::FileNotFound(PathBuf::from("/tmp/missing.elf"));
        assert!(err.to_string().contains("/tmp/missing.elf"));
    }

    #[test]
    fn test_lookup_error_display() {
        let err = LookupError::AddressNotMapped(Address(0x4000_0000));
        assert_eq!(err.to_string(), "Address 0x40000000 is not inside any segment");

        let err = LookupError::SymbolNotFound("startup".to_string());
        assert!(err.to_string().contains("startup"));
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = ParseError::from(io);
        assert_eq!(err.to_string(), "short read");
    }
}
