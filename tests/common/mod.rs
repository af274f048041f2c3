//! Fixture builder for fat containers.

#![allow(dead_code)]

use fatarch::layout::{FAT_ARCH_SIZE, FAT_CIGAM, FAT_HEADER_SIZE, FAT_MAGIC};

/// `(cpu_type, cpu_subtype, offset, size, align)` as laid out on disk.
pub type Arch = (i32, i32, u32, u32, u32);

/// Encode a header and table, zero-padded to at least `len` bytes.
///
/// A `FAT_CIGAM` magic writes every later field little-endian.
pub fn build(magic: u32, count: u32, arches: &[Arch], len: usize) -> Vec<u8> {
    let le = magic == FAT_CIGAM;
    let put = |b: &mut Vec<u8>, v: u32| {
        if le {
            b.extend_from_slice(&v.to_le_bytes())
        } else {
            b.extend_from_slice(&v.to_be_bytes())
        }
    };

    let mut b = Vec::with_capacity(len.max(FAT_HEADER_SIZE + arches.len() * FAT_ARCH_SIZE));
    b.extend_from_slice(&magic.to_be_bytes());
    put(&mut b, count);
    for &(t, s, o, z, a) in arches {
        for v in [t as u32, s as u32, o, z, a] {
            put(&mut b, v);
        }
    }
    if b.len() < len {
        b.resize(len, 0);
    }
    b
}

/// A well-formed big-endian container whose slices are packed after the
/// table at the given alignment, each filled with its own index byte.
pub fn packed(cpus: &[(i32, i32)], size: u32, align: u32) -> (Vec<u8>, Vec<Arch>) {
    let step = 1u32 << align;
    let table = (FAT_HEADER_SIZE + cpus.len() * FAT_ARCH_SIZE) as u32;
    let mut offset = table.div_ceil(step) * step;
    let mut arches = Vec::new();
    for &(t, s) in cpus {
        arches.push((t, s, offset, size, align));
        offset = (offset + size).div_ceil(step) * step;
    }
    let end = arches.last().map_or(table, |a| a.2 + a.3) as usize;
    let mut data = build(FAT_MAGIC, cpus.len() as u32, &arches, end);
    for (i, a) in arches.iter().enumerate() {
        data[a.2 as usize..(a.2 + a.3) as usize].fill(i as u8 + 1);
    }
    (data, arches)
}
