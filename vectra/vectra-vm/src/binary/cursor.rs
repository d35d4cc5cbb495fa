//! Forward-only reader over a VBC image. Every failure reports the offset where the
//! read started.

use super::{BinaryReadError, Result};

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `n` bytes from the image and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let start = self.pos;
        let bytes = start
            .checked_add(n)
            .and_then(|end| self.data.get(start..end))
            .ok_or(BinaryReadError::UnexpectedEof { offset: start })?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.read_array().map(f64::from_le_bytes)
    }
}
