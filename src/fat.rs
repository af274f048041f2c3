//! Fat header and architecture table parsing.
//!
//! A fat container starts with an 8-byte header (`magic`, `nfat_arch`)
//! followed by `nfat_arch` 20-byte descriptors. Each descriptor locates one
//! architecture's image inside the same file. [`parse`] reads the table in a
//! single pass, validates every descriptor against the container length and
//! its alignment, and hands back a [`ParsedFatBinary`] that borrows the input.
//!
//! ```
//! use fatarch::fat;
//!
//! let file = [0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 0];
//! let fat = fat::parse(&file).unwrap();
//! assert!(fat.is_empty());
//! ```

use std::ops::Range;

use crate::cpu;
use crate::cursor::ByteCursor;
use crate::error::{ParseError, Result};
use crate::layout::{ByteOrder, FAT_ARCH_SIZE, FAT_CIGAM, FAT_HEADER_SIZE, FAT_MAGIC};

/// Default limit on `nfat_arch`. Real containers carry a handful.
pub const DEFAULT_MAX_ARCH_COUNT: u32 = 128;

/// The fixed 8-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatHeader {
    magic: u32,
    arch_count: u32,
}

impl FatHeader {
    /// Magic as read big-endian from offset 0.
    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn arch_count(&self) -> u32 {
        self.arch_count
    }

    /// Bytes covered by the header plus the descriptor table.
    pub fn table_len(&self) -> u64 {
        FAT_HEADER_SIZE as u64 + self.arch_count as u64 * FAT_ARCH_SIZE as u64
    }
}

/// One architecture entry of the table.
///
/// Only a successful parse produces descriptors, so every value seen by
/// callers already lies inside its container and is aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchDescriptor {
    cpu_type: i32,
    cpu_subtype: i32,
    offset: u32,
    size: u32,
    align: u32,
}

impl ArchDescriptor {
    #[cfg(test)]
    pub(crate) fn new(
        cpu_type: i32,
        cpu_subtype: i32,
        offset: u32,
        size: u32,
        align: u32,
    ) -> Self {
        Self {
            cpu_type,
            cpu_subtype,
            offset,
            size,
            align,
        }
    }

    fn read(c: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            cpu_type: c.read_i32()?,
            cpu_subtype: c.read_i32()?,
            offset: c.read_u32()?,
            size: c.read_u32()?,
            align: c.read_u32()?,
        })
    }

    pub fn cpu_type(&self) -> i32 {
        self.cpu_type
    }

    pub fn cpu_subtype(&self) -> i32 {
        self.cpu_subtype
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Alignment as a power-of-two exponent.
    pub fn align(&self) -> u32 {
        self.align
    }

    /// Alignment in bytes, `None` when the exponent does not fit in 32 bits.
    pub fn alignment(&self) -> Option<u32> {
        1u32.checked_shl(self.align)
    }

    /// Conventional architecture name, if the pair is a known one.
    pub fn name(&self) -> Option<&'static str> {
        cpu::name(self.cpu_type, self.cpu_subtype)
    }

    /// One past the last byte of the slice, computed without overflow.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }

    /// Byte range of the slice within its container.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }

    fn validate(&self, index: usize, len: usize) -> Result<()> {
        let in_bounds = self
            .offset
            .checked_add(self.size)
            .is_some_and(|end| end as u64 <= len as u64);
        if !in_bounds {
            return Err(ParseError::InvalidRange {
                index,
                offset: self.offset,
                size: self.size,
                len,
            });
        }
        let Some(alignment) = self.alignment() else {
            return Err(ParseError::InvalidAlignment {
                index,
                align: self.align,
            });
        };
        if self.offset % alignment != 0 {
            return Err(ParseError::MisalignedOffset {
                index,
                offset: self.offset,
                align: self.align,
            });
        }
        Ok(())
    }
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accepted magics as read big-endian. [`FAT_CIGAM`] switches the
    /// remaining fields to little-endian.
    pub magics: Vec<u32>,
    /// Largest `nfat_arch` accepted before any descriptor is read.
    pub max_arch_count: u32,
    /// Reject slices that share bytes with each other or with the table.
    pub reject_overlaps: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            magics: vec![FAT_MAGIC, FAT_CIGAM],
            max_arch_count: DEFAULT_MAX_ARCH_COUNT,
            reject_overlaps: false,
        }
    }
}

impl ParseOptions {
    /// Defaults plus overlap rejection.
    pub fn strict() -> Self {
        Self {
            reject_overlaps: true,
            ..Self::default()
        }
    }

    pub fn accepts(&self, magic: u32) -> bool {
        self.magics.contains(&magic)
    }
}

/// Reads fat containers according to a [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct FatParser {
    options: ParseOptions,
}

impl FatParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse and validate the header and descriptor table of `data`.
    ///
    /// On error nothing is returned; the error names the first violation
    /// found, with descriptor-level errors checked in file order.
    pub fn parse<'a>(&self, data: &'a [u8]) -> Result<ParsedFatBinary<'a>> {
        let mut c = ByteCursor::new(data);

        let magic = c.read_u32()?;
        if !self.options.accepts(magic) {
            return Err(ParseError::UnrecognizedMagic { magic });
        }
        let order = ByteOrder::for_magic(magic);
        c.set_order(order);

        let arch_count = c.read_u32()?;
        if arch_count > self.options.max_arch_count {
            return Err(ParseError::TooManyArchitectures {
                count: arch_count,
                max: self.options.max_arch_count,
            });
        }
        let needed = (arch_count as usize).checked_mul(FAT_ARCH_SIZE);
        match needed {
            Some(n) => c.ensure(n)?,
            None => {
                return Err(ParseError::TruncatedInput {
                    offset: c.position(),
                    needed: usize::MAX,
                    remaining: c.remaining(),
                })
            }
        }

        let arches = (0..arch_count)
            .map(|_| ArchDescriptor::read(&mut c))
            .collect::<Result<Vec<_>>>()?;

        for (index, arch) in arches.iter().enumerate() {
            arch.validate(index, data.len())?;
        }

        let header = FatHeader { magic, arch_count };
        if self.options.reject_overlaps {
            check_overlaps(&header, &arches)?;
        }

        Ok(ParsedFatBinary {
            header,
            order,
            arches,
            data,
        })
    }
}

/// Parse with [`ParseOptions::default`].
pub fn parse(data: &[u8]) -> Result<ParsedFatBinary<'_>> {
    FatParser::default().parse(data)
}

/// Big-endian magic at offset 0, if there are four bytes to read.
pub fn magic_of(data: &[u8]) -> Option<u32> {
    ByteCursor::new(data).read_u32().ok()
}

/// True if `data` starts with either fat magic.
pub fn is_fat(data: &[u8]) -> bool {
    matches!(magic_of(data), Some(FAT_MAGIC | FAT_CIGAM))
}

// Empty slices occupy no bytes and never conflict.
fn check_overlaps(header: &FatHeader, arches: &[ArchDescriptor]) -> Result<()> {
    let table_end = header.table_len();
    let mut order: Vec<usize> = (0..arches.len())
        .filter(|&i| arches[i].size() > 0)
        .collect();

    if let Some(&second) = order
        .iter()
        .find(|&&i| (arches[i].offset() as u64) < table_end)
    {
        return Err(ParseError::OverlappingSlices {
            first: None,
            second,
        });
    }

    order.sort_by_key(|&i| (arches[i].offset(), i));
    let mut furthest: Option<(u64, usize)> = None;
    for &i in &order {
        if let Some((end, owner)) = furthest {
            if (arches[i].offset() as u64) < end {
                return Err(ParseError::OverlappingSlices {
                    first: Some(owner.min(i)),
                    second: owner.max(i),
                });
            }
        }
        if furthest.map_or(true, |(end, _)| arches[i].end() > end) {
            furthest = Some((arches[i].end(), i));
        }
    }
    Ok(())
}

/// A validated fat container borrowing its source bytes.
#[derive(Debug, Clone)]
pub struct ParsedFatBinary<'a> {
    header: FatHeader,
    order: ByteOrder,
    arches: Vec<ArchDescriptor>,
    data: &'a [u8],
}

impl<'a> ParsedFatBinary<'a> {
    pub fn header(&self) -> &FatHeader {
        &self.header
    }

    /// Byte order of every field after the magic.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Descriptors in file order.
    pub fn arches(&self) -> &[ArchDescriptor] {
        &self.arches
    }

    pub fn len(&self) -> usize {
        self.arches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arches.is_empty()
    }

    /// Image bytes of `arch`, borrowed from the container.
    ///
    /// `None` if `arch` is not one of this container's descriptors.
    pub fn slice_for(&self, arch: &ArchDescriptor) -> Option<&'a [u8]> {
        if !self.arches.contains(arch) {
            return None;
        }
        self.data.get(arch.range())
    }

    /// First descriptor in file order with exactly this type and subtype.
    pub fn find_by_cpu_type(&self, cpu_type: i32, cpu_subtype: i32) -> Option<ArchDescriptor> {
        self.arches
            .iter()
            .find(|a| a.cpu_type == cpu_type && a.cpu_subtype == cpu_subtype)
            .copied()
    }

    /// First descriptor whose type and subtype match a known architecture
    /// name. Capability bits in the stored subtype are ignored.
    pub fn find_by_name(&self, name: &str) -> Option<ArchDescriptor> {
        cpu::from_name(name)?;
        self.arches.iter().find(|a| a.name() == Some(name)).copied()
    }

    /// Descriptors paired with their image bytes, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArchDescriptor, &'a [u8])> + '_ {
        self.arches
            .iter()
            .filter_map(move |a| Some((a, self.data.get(a.range())?)))
    }
}
