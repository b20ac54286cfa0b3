//! Bounds-checked cursors over caller-owned buffers.
//!
//! Every primitive field goes through [`Cursor`] (decode side) or
//! [`CursorMut`] (encode side). All multi-byte values are big-endian.
//!
//! A read or write that does not fit fails without moving the cursor, so
//! `position() <= len()` always holds.

use bytes::{Buf, BufMut};

use crate::error::CodecError;

/// A read cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// Total length of the window.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current offset from the start of the window.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether all bytes have been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread part of the window.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Fail with `InputTooShort` unless at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<(), CodecError> {
        if self.remaining() < n {
            return Err(CodecError::InputTooShort {
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        self.ensure(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, CodecError> {
        self.ensure(1)?;
        Ok(self.buf[self.pos])
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?.get_u8())
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(self.take(1)?.get_i8())
    }

    /// Read a boolean; any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(self.take(2)?.get_u16())
    }

    /// Read a big-endian `i16`.
    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(self.take(2)?.get_i16())
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(self.take(4)?.get_u32())
    }

    /// Read a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(self.take(4)?.get_i32())
    }

    /// Read exactly `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        self.take(n)
    }

    /// Split off the next `n` bytes as their own cursor and skip past them.
    pub fn sub_cursor(&mut self, n: usize) -> Result<Cursor<'a>, CodecError> {
        Ok(Cursor::new(self.take(n)?))
    }
}

/// A write cursor over a mutable byte slice.
#[derive(Debug)]
pub struct CursorMut<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> CursorMut<'a> {
    /// Create a cursor at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        CursorMut { buf, pos: 0 }
    }

    /// Capacity of the destination.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the destination has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Room left in the destination.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail with `OutputTooShort` unless `n` more bytes fit.
    pub fn ensure(&self, n: usize) -> Result<(), CodecError> {
        if self.remaining() < n {
            return Err(CodecError::OutputTooShort {
                required: self.pos.saturating_add(n),
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    fn slot(&mut self, n: usize) -> Result<&mut [u8], CodecError> {
        self.ensure(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(&mut self.buf[start..start + n])
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        let mut slot = self.slot(1)?;
        slot.put_u8(value);
        Ok(())
    }

    /// Write a signed byte.
    pub fn write_i8(&mut self, value: i8) -> Result<(), CodecError> {
        let mut slot = self.slot(1)?;
        slot.put_i8(value);
        Ok(())
    }

    /// Write a boolean as 1 or 0.
    pub fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.write_u8(u8::from(value))
    }

    /// Write a big-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> Result<(), CodecError> {
        let mut slot = self.slot(2)?;
        slot.put_u16(value);
        Ok(())
    }

    /// Write a big-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        let mut slot = self.slot(2)?;
        slot.put_i16(value);
        Ok(())
    }

    /// Write a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> Result<(), CodecError> {
        let mut slot = self.slot(4)?;
        slot.put_u32(value);
        Ok(())
    }

    /// Write a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        let mut slot = self.slot(4)?;
        slot.put_i32(value);
        Ok(())
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.slot(data.len())?.copy_from_slice(data);
        Ok(())
    }
}
