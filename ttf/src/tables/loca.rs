use std::convert::TryFrom;
use std::io::Cursor;
use std::ops::Range;

use super::FontTable;
use crate::utils::reader::cursor_at;
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};

/// This table stores the offsets to the locations of the glyphs in the font, relative to the
/// beginning of the glyph data table.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/loca
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6loca.html
///
/// Offsets are read on demand, the table is not copied.
#[derive(Debug, PartialEq, Clone)]
pub struct LocaTable<'a> {
    data: &'a [u8],
    // not part of the table, taken from head.index_to_loc_format
    pub(crate) format: Format,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Format {
    /// Offset16, the actual offset divided by 2.
    Short,
    /// Offset32.
    Long,
}

impl<'a> LocaTable<'a> {
    /// Byte offset of `glyph` into the glyf table.
    pub fn offset(&self, glyph: u32) -> Result<u32, Error> {
        let glyph = usize::try_from(glyph)
            .map_err(|_| Error::CorruptFont("glyph index out of range"))?;
        Ok(match self.format {
            Format::Short => {
                let mut rd = self.entry(glyph, 2)?;
                u32::from(rd.read_u16::<BigEndian>()?) * 2
            }
            Format::Long => self.entry(glyph, 4)?.read_u32::<BigEndian>()?,
        })
    }

    /// The glyph's data block, inferred from the difference between two consecutive offsets.
    pub fn glyph_range(&self, glyph: u32) -> Result<Range<usize>, Error> {
        let start = self.offset(glyph)? as usize;
        let end = self.offset(glyph.saturating_add(1))? as usize;
        if end < start {
            return Err(Error::CorruptFont("loca offsets are not ascending"));
        }
        Ok(start..end)
    }

    fn entry(&self, ix: usize, size: usize) -> Result<Cursor<&'a [u8]>, Error> {
        ix.checked_mul(size)
            .ok_or(Error::CorruptFont("glyph index out of range"))
            .and_then(|pos| cursor_at(self.data, pos))
    }
}

impl<'a> FontTable<'a> for LocaTable<'a> {
    /// `index_to_loc_format` of the head table.
    type Dep = i16;

    fn unpack(data: &'a [u8], index_to_loc_format: Self::Dep) -> Result<Self, Error> {
        let format = match index_to_loc_format {
            0 => Format::Short,
            1 => Format::Long,
            _ => return Err(Error::CorruptFont("unknown index_to_loc_format")),
        };
        Ok(LocaTable { data, format })
    }
}
