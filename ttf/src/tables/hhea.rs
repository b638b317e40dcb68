use std::io::Cursor;

use super::FontTable;
use crate::utils::reader::CursorExt;
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};

/// This table contains information for horizontal layout.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/hhea
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hhea.html
#[derive(Debug, PartialEq, Clone)]
pub struct HheaTable {
    /// Distance from baseline of highest ascender.
    pub(crate) ascent: i16,
    /// Distance from baseline of lowest descender
    pub(crate) descent: i16,
    /// Typographic line gap.
    pub(crate) line_gap: i16,
    /// Number of hMetric entries in 'hmtx' table
    pub(crate) number_of_h_metrics: u16,
}

impl<'a> FontTable<'a> for HheaTable {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        // major_version, minor_version
        rd.skip(4)?;
        let ascent = rd.read_i16::<BigEndian>()?;
        let descent = rd.read_i16::<BigEndian>()?;
        let line_gap = rd.read_i16::<BigEndian>()?;
        // advance_width_max .. caret_offset, 4 times reserved, metric_data_format
        rd.skip(24)?;

        Ok(HheaTable {
            ascent,
            descent,
            line_gap,
            number_of_h_metrics: rd.read_u16::<BigEndian>()?,
        })
    }
}
