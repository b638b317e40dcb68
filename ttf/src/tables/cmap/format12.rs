use std::io::Cursor;

use crate::tables::FontTable;
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};

const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Segmented coverage, for code points of the full Unicode range.
#[derive(Debug, PartialEq, Clone)]
pub struct Format12 {
    pub(crate) sequential_map_groups: Vec<SequentialMapGroup>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SequentialMapGroup {
    /// First character code in this group.
    pub start_char_code: u32,
    /// Last character code in this group.
    pub end_char_code: u32,
    /// Glyph index corresponding to the starting character code.
    pub start_glyph_id: u32,
}

impl SequentialMapGroup {
    fn glyph_id(&self, codepoint: u32) -> u32 {
        self.start_glyph_id
            .wrapping_add(codepoint - self.start_char_code)
    }
}

impl Format12 {
    pub fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        self.sequential_map_groups
            .iter()
            .find(|g| g.start_char_code <= codepoint && codepoint <= g.end_char_code)
            .map(|g| g.glyph_id(codepoint))
            .filter(|id| *id != 0)
    }

    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.sequential_map_groups.iter().flat_map(|g| {
            // don't let a bogus group enumerate the whole u32 range
            (g.start_char_code..=g.end_char_code.min(MAX_CODE_POINT))
                .filter(move |c| g.glyph_id(*c) != 0)
        })
    }
}

impl<'a> FontTable<'a> for Format12 {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        let _language = rd.read_u32::<BigEndian>()?;
        let num_groups = rd.read_u32::<BigEndian>()?;

        let mut groups = Vec::with_capacity((num_groups as usize).min(data.len() / 12));
        for _ in 0..num_groups {
            let group = SequentialMapGroup {
                start_char_code: rd.read_u32::<BigEndian>()?,
                end_char_code: rd.read_u32::<BigEndian>()?,
                start_glyph_id: rd.read_u32::<BigEndian>()?,
            };
            if group.end_char_code < group.start_char_code {
                return Err(Error::CorruptFont("cmap group ends before it starts"));
            }
            groups.push(group);
        }

        Ok(Format12 {
            sequential_map_groups: groups,
        })
    }
}
