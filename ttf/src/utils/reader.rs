use std::convert::TryFrom;
use std::io::{Cursor, Read};

use crate::{Error, Tag};
use byteorder::{BigEndian, ReadBytesExt};

/// Returns the `len` bytes starting at `offset`, failing instead of reading outside of `data`.
pub fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8], Error> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::CorruptFont("offset points outside of the font data"))
}

/// A cursor positioned at `offset`, which must not be past the end of `data`.
pub fn cursor_at(data: &[u8], offset: usize) -> Result<Cursor<&[u8]>, Error> {
    if offset > data.len() {
        return Err(Error::CorruptFont("offset points outside of the font data"));
    }
    let mut cursor = Cursor::new(data);
    cursor.set_position(offset as u64);
    Ok(cursor)
}

/// Font specific reads on top of `byteorder`, sharing the same bounds checks.
pub trait CursorExt {
    fn skip(&mut self, len: usize) -> Result<(), Error>;
    fn read_tag(&mut self) -> Result<Tag, Error>;
    /// Signed 2.14 fixed point number.
    fn read_f2dot14(&mut self) -> Result<f32, Error>;
}

impl CursorExt for Cursor<&[u8]> {
    fn skip(&mut self, len: usize) -> Result<(), Error> {
        let end = usize::try_from(self.position())
            .ok()
            .and_then(|pos| pos.checked_add(len))
            .filter(|end| *end <= self.get_ref().len())
            .ok_or(Error::CorruptFont("unexpected end of table data"))?;
        self.set_position(end as u64);
        Ok(())
    }

    fn read_tag(&mut self) -> Result<Tag, Error> {
        let mut tag = [0; 4];
        self.read_exact(&mut tag)?;
        Ok(Tag::new(&tag))
    }

    fn read_f2dot14(&mut self) -> Result<f32, Error> {
        Ok(f32::from(self.read_i16::<BigEndian>()?) / 16384.0)
    }
}
