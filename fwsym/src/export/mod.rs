//! Image report export
//!
//! This module writes the parsed view of an image (entry point, segments,
//! symbols) as JSON so other tools can consume it without re-parsing the ELF.

pub mod report;

pub use report::ImageReport;
