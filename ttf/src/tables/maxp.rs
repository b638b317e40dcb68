use std::io::Cursor;

use super::FontTable;
use crate::utils::reader::CursorExt;
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};

/// This table establishes the memory requirements for this font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/maxp
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html
#[derive(Debug, PartialEq, Clone)]
pub enum MaxpTable {
    // Version 0.5
    CFF(CffMaxpTable),
    // Version 1.0
    TrueType(TrueTypeMaxpTable),
}

#[derive(Debug, PartialEq, Clone)]
pub struct CffMaxpTable {
    /// The number of glyphs in the font.
    num_glyphs: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct TrueTypeMaxpTable {
    /// The number of glyphs in the font.
    num_glyphs: u16,
    /// Maximum levels of recursion; 1 for simple components.
    max_component_depth: u16,
}

impl MaxpTable {
    pub fn num_glyphs(&self) -> u16 {
        match self {
            MaxpTable::CFF(table) => table.num_glyphs,
            MaxpTable::TrueType(table) => table.num_glyphs,
        }
    }

    /// The composite nesting depth the font itself claims to need, if it says so.
    pub fn max_component_depth(&self) -> Option<u16> {
        match self {
            MaxpTable::CFF(_) => None,
            MaxpTable::TrueType(table) => Some(table.max_component_depth),
        }
    }
}

impl<'a> FontTable<'a> for MaxpTable {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        let version = rd.read_u32::<BigEndian>()?;
        let num_glyphs = rd.read_u16::<BigEndian>()?;
        match version {
            0x00005000 => Ok(MaxpTable::CFF(CffMaxpTable { num_glyphs })),
            0x00010000 => {
                // max_points .. max_component_elements
                rd.skip(24)?;
                Ok(MaxpTable::TrueType(TrueTypeMaxpTable {
                    num_glyphs,
                    max_component_depth: rd.read_u16::<BigEndian>()?,
                }))
            }
            _ => Err(Error::CorruptFont("invalid maxp version")),
        }
    }
}
