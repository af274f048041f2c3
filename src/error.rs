//! Errors produced while reading a fat container.
//!
//! Every variant describes malformed input; none of them is transient, so
//! retrying a parse over the same bytes always yields the same error.

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Why a fat container was rejected.
///
/// Descriptor-level variants carry the zero-based `index` of the offending
/// descriptor in file order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first four bytes are not an accepted fat magic.
    #[error("unrecognized magic {magic:#010x}")]
    UnrecognizedMagic { magic: u32 },

    /// Fewer bytes remain than the read at `offset` requires.
    #[error("truncated input at offset {offset:#x}: need {needed} bytes, {remaining} remain")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The header announces more architectures than the parser accepts.
    #[error("too many architectures: {count} (limit {max})")]
    TooManyArchitectures { count: u32, max: u32 },

    /// `offset + size` overflows or runs past the end of the container.
    #[error("arch {index}: range {offset:#x}+{size:#x} exceeds container length {len:#x}")]
    InvalidRange {
        index: usize,
        offset: u32,
        size: u32,
        len: usize,
    },

    /// The offset is not a multiple of `2^align`.
    #[error("arch {index}: offset {offset:#x} is not aligned to 2^{align}")]
    MisalignedOffset { index: usize, offset: u32, align: u32 },

    /// The alignment exponent does not fit a 32-bit offset.
    #[error("arch {index}: alignment exponent {align} out of range")]
    InvalidAlignment { index: usize, align: u32 },

    /// A cursor seek past the end of the region.
    #[error("seek to {offset:#x} past end of region ({len:#x} bytes)")]
    OutOfBounds { offset: usize, len: usize },

    /// Two slices share bytes, or a slice covers the header table.
    ///
    /// `first` is `None` when the conflict is with the header table itself.
    #[error("arch {second}: slice overlaps {}", overlap_target(.first))]
    OverlappingSlices { first: Option<usize>, second: usize },
}

fn overlap_target(first: &Option<usize>) -> String {
    match first {
        Some(i) => format!("arch {i}"),
        None => "the fat header".to_string(),
    }
}

impl ParseError {
    /// Index of the descriptor the error is about, if any.
    pub fn arch_index(&self) -> Option<usize> {
        match *self {
            ParseError::InvalidRange { index, .. }
            | ParseError::MisalignedOffset { index, .. }
            | ParseError::InvalidAlignment { index, .. } => Some(index),
            ParseError::OverlappingSlices { second, .. } => Some(second),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_descriptor() {
        let e = ParseError::MisalignedOffset {
            index: 2,
            offset: 0x1001,
            align: 12,
        };
        assert_eq!(e.to_string(), "arch 2: offset 0x1001 is not aligned to 2^12");
        assert_eq!(e.arch_index(), Some(2));
    }

    #[test]
    fn overlap_with_header_message() {
        let e = ParseError::OverlappingSlices {
            first: None,
            second: 0,
        };
        assert_eq!(e.to_string(), "arch 0: slice overlaps the fat header");
        let e = ParseError::OverlappingSlices {
            first: Some(0),
            second: 1,
        };
        assert_eq!(e.to_string(), "arch 1: slice overlaps arch 0");
    }

    #[test]
    fn magic_is_hex_padded() {
        let e = ParseError::UnrecognizedMagic { magic: 0xfeedfacf };
        assert_eq!(e.to_string(), "unrecognized magic 0xfeedfacf");
        assert_eq!(e.arch_index(), None);
    }
}
