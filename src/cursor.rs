//! Bounds-checked sequential reader over a borrowed byte region.

use crate::error::{ParseError, Result};
use crate::layout::ByteOrder;

/// Forward reader over `&[u8]` that never copies the region.
///
/// Reads fail with [`ParseError::TruncatedInput`] instead of panicking when
/// the region runs short; a failed read leaves the position untouched.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    /// Big-endian cursor at position 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, ByteOrder::Big)
    }

    pub fn with_order(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }

    /// Switch the byte order used by subsequent reads.
    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move to absolute `offset`. Seeking to exactly the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(ParseError::OutOfBounds {
                offset,
                len: self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Fail unless at least `n` bytes remain. Does not advance.
    pub fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(ParseError::TruncatedInput {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut b = [0u8; N];
        b.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(b)
    }

    /// Read a `u32` in the cursor's byte order (big-endian unless changed).
    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::Big => u32::from_be_bytes(b),
            ByteOrder::Little => u32::from_le_bytes(b),
        })
    }

    /// Read a `u32` and reinterpret its bits as `i32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_u32().map(|v| v as i32)
    }
}
