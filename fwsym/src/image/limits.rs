//! Capacity limits applied while parsing

/// Default cap on program headers per image
pub const DEFAULT_MAX_SEGMENTS: usize = 256;

/// Default cap on section headers per image
pub const DEFAULT_MAX_SECTIONS: usize = 4096;

/// Upper bounds on table sizes declared by an image header
///
/// Tables are stored in growable vectors, so these are not storage limits.
/// They stop a corrupt header from driving thousands of seeks, and an image
/// over a limit is rejected with `TooManySegments`/`TooManySections` rather
/// than truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_segments: usize,
    pub max_sections: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self { max_segments: DEFAULT_MAX_SEGMENTS, max_sections: DEFAULT_MAX_SECTIONS }
    }
}

impl ParseLimits {
    /// No limit beyond what the ELF32 header fields can express
    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_segments: usize::MAX, max_sections: usize::MAX }
    }
}
