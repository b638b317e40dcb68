use std::convert::TryFrom;
use std::io::{Cursor, Read};

use crate::tables::FontTable;
use crate::utils::reader::CursorExt;
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};

/// Segment mapping to delta values, for code points of the Basic Multilingual Plane.
#[derive(Debug, PartialEq, Clone)]
pub struct Format4 {
    /// End characterCode for each segment, last=0xFFFF.
    pub(crate) end_code: Vec<u16>,
    /// Start character code for each segment.
    pub(crate) start_code: Vec<u16>,
    /// Delta for all character codes in segment.
    pub(crate) id_delta: Vec<i16>,
    /// Offsets into glyph_id_array or 0
    pub(crate) id_range_offset: Vec<u16>,
    /// Glyph index array (arbitrary length)
    pub(crate) glyph_id_array: Vec<u8>,
}

impl Format4 {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        // Return None for codepoints > `u16::MAX`
        let codepoint = u16::try_from(codepoint).ok()?;

        // The first segment (in storage order) whose end code is greater than or equal to the
        // character code decides; the code point is missing if it starts after it.
        let ix = self.end_code.iter().position(|end| codepoint <= *end)?;
        self.segment_glyph_id(ix, codepoint)
    }

    /// All code points of all segments that map to a glyph.
    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.start_code
            .iter()
            .zip(self.end_code.iter())
            .enumerate()
            .flat_map(move |(ix, (start, end))| {
                (*start..=*end)
                    .filter(move |c| self.segment_glyph_id(ix, *c).is_some())
                    .map(u32::from)
            })
    }

    fn segment_glyph_id(&self, ix: usize, codepoint: u16) -> Option<u32> {
        let start_code = *self.start_code.get(ix)?;
        if codepoint < start_code {
            return None;
        }

        let id_range_offset = *self.id_range_offset.get(ix)?;
        let glyph_id = if id_range_offset == 0 {
            let id_delta = *self.id_delta.get(ix)? as u16;
            codepoint.wrapping_add(id_delta)
        } else {
            // the glyph array entry is the glyph index, id_delta only applies to the direct path
            // id_range_offset is relative to its own position in the id_range_offset array, so
            // the index is relative to the start of the glyph_id_array:
            // id_range_offset / 2 + (codepoint - start_code) + ix - seg_count
            let offset = (id_range_offset / 2).wrapping_add(codepoint - start_code);
            let pos = i64::from(offset) + ix as i64 - self.id_range_offset.len() as i64;

            let val = if pos < 0 {
                // still pointing into the id_range_offset array
                let ix = usize::try_from(self.id_range_offset.len() as i64 + pos).ok()?;
                *self.id_range_offset.get(ix)?
            } else {
                let pos = usize::try_from(pos).ok()? * 2;
                let bytes = self.glyph_id_array.get(pos..pos + 2)?;
                u16::from_be_bytes([bytes[0], bytes[1]])
            };
            val
        };

        // 0 is the missing glyph
        Some(u32::from(glyph_id)).filter(|id| *id != 0)
    }
}

impl<'a> FontTable<'a> for Format4 {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        let _language = rd.read_u16::<BigEndian>()?;
        let seg_count_x2 = rd.read_u16::<BigEndian>()?;
        let seg_count = (seg_count_x2 / 2) as usize;
        // search_range, entry_selector, range_shift
        rd.skip(6)?;
        let mut end_code = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut end_code)?;
        let _reserved_pad = rd.read_u16::<BigEndian>()?;
        let mut start_code = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut start_code)?;
        let mut id_delta = vec![0; seg_count];
        rd.read_i16_into::<BigEndian>(&mut id_delta)?;
        let mut id_range_offset = vec![0; seg_count];
        rd.read_u16_into::<BigEndian>(&mut id_range_offset)?;

        let mut glyph_id_array = Vec::new();
        rd.read_to_end(&mut glyph_id_array)?;

        Ok(Format4 {
            end_code,
            start_code,
            id_delta,
            id_range_offset,
            glyph_id_array,
        })
    }
}
