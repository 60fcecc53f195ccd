use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{CursorError, Result};

/// Four-character chunk tag.
pub type FourCc = [u8; 4];

/// Render a tag for messages, replacing non-UTF-8 bytes.
pub fn fourcc_str(tag: &FourCc) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Bounds-checked little-endian reader.
///
/// Every read verifies the remaining length first, so a failed read leaves
/// the position untouched and reports [`CursorError::OutOfRange`].
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.len() {
            return Err(CursorError::OutOfRange {
                offset: pos,
                needed: 0,
                len: self.len(),
            });
        }
        self.cursor.set_position(pos as u64);
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.check_remaining(count)?;
        self.cursor.set_position((self.position() + count) as u64);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check_remaining(1)?;
        self.cursor.read_u8().map_err(|_| self.out_of_range(1))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check_remaining(2)?;
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.out_of_range(2))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check_remaining(4)?;
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.out_of_range(4))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.check_remaining(4)?;
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| self.out_of_range(4))
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.check_remaining(count)?;
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + count) as u64);
        Ok(&data[start..start + count])
    }

    pub fn read_fourcc(&mut self) -> Result<FourCc> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn check_remaining(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(self.out_of_range(needed));
        }
        Ok(())
    }

    fn out_of_range(&self, needed: usize) -> CursorError {
        CursorError::OutOfRange {
            offset: self.position(),
            needed,
            len: self.len(),
        }
    }
}
