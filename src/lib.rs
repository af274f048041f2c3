//! Reader and validator for fat (universal) Mach-O containers.
//!
//! ```
//! use fatarch::{fat, ParseError};
//!
//! let file = [0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 1];
//! assert!(matches!(fat::parse(&file), Err(ParseError::TruncatedInput { .. })));
//! ```

pub mod cpu;
pub mod cursor;
pub mod error;
pub mod fat;
pub mod layout;
pub mod source;

pub use cursor::ByteCursor;
pub use error::{ParseError, Result};
pub use fat::{parse, ArchDescriptor, FatHeader, FatParser, ParseOptions, ParsedFatBinary};
pub use layout::ByteOrder;
pub use source::Source;
