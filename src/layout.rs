//! On-disk constants of the fat container.

/// Fat header magic, fields big-endian.
pub const FAT_MAGIC: u32 = 0xcafebabe;
/// [`FAT_MAGIC`] as seen through a big-endian read of a little-endian header.
pub const FAT_CIGAM: u32 = 0xbebafeca;

/// Thin Mach-O magics, recognised only to improve diagnostics.
pub const MH_MAGIC: u32 = 0xfeedface;
pub const MH_CIGAM: u32 = 0xcefaedfe;
pub const MH_MAGIC_64: u32 = 0xfeedfacf;
pub const MH_CIGAM_64: u32 = 0xcffaedfe;

/// `magic` + `nfat_arch`.
pub const FAT_HEADER_SIZE: usize = 8;
/// `cputype`, `cpusubtype`, `offset`, `size`, `align`.
pub const FAT_ARCH_SIZE: usize = 20;

/// Order of the multi-byte fields that follow the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    /// Field order implied by a magic read big-endian.
    pub fn for_magic(magic: u32) -> ByteOrder {
        if magic == FAT_CIGAM {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

/// True if `magic` belongs to a thin (single architecture) Mach-O image.
pub fn is_thin_macho(magic: u32) -> bool {
    matches!(magic, MH_MAGIC | MH_CIGAM | MH_MAGIC_64 | MH_CIGAM_64)
}
