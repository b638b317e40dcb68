use std::io::{Cursor, Read};

use super::FontTable;
use crate::utils::reader::CursorExt;
use crate::{BoundingBox, Error};
use byteorder::{BigEndian, ReadBytesExt};

const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/head
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html
#[derive(Debug, PartialEq, Clone)]
pub struct HeadTable {
    /// Set to a value from 16 to 16384.
    pub(crate) units_per_em: u16,
    /// Bounding box over all glyphs, in font units.
    pub(crate) bounding_box: BoundingBox,
    /// Smallest readable size in pixels.
    pub(crate) lowest_rec_ppem: u16,
    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub(crate) index_to_loc_format: i16,
}

impl<'a> FontTable<'a> for HeadTable {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        // major_version, minor_version, font_revision, check_sum_adjustment
        rd.skip(12)?;
        let magic_number = rd.read_u32::<BigEndian>()?;
        if magic_number != MAGIC_NUMBER {
            log::warn!("head table has unexpected magic number {:#010x}", magic_number);
        }
        let _flags = rd.read_u16::<BigEndian>()?;
        let units_per_em = rd.read_u16::<BigEndian>()?;
        // created, modified
        rd.skip(16)?;
        let bounding_box = BoundingBox {
            x_min: rd.read_i16::<BigEndian>()?,
            y_min: rd.read_i16::<BigEndian>()?,
            x_max: rd.read_i16::<BigEndian>()?,
            y_max: rd.read_i16::<BigEndian>()?,
        };
        let _mac_style = rd.read_u16::<BigEndian>()?;
        let lowest_rec_ppem = rd.read_u16::<BigEndian>()?;
        let _font_direction_hint = rd.read_i16::<BigEndian>()?;
        let index_to_loc_format = rd.read_i16::<BigEndian>()?;

        // glyph_data_format is the last field, make sure the table is not cut short
        let mut glyph_data_format = [0; 2];
        rd.read_exact(&mut glyph_data_format)?;

        Ok(HeadTable {
            units_per_em,
            bounding_box,
            lowest_rec_ppem,
            index_to_loc_format,
        })
    }
}
