use std::convert::TryFrom;
use std::io::Cursor;

use super::hhea::HheaTable;
use super::maxp::MaxpTable;
use super::FontTable;
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};

/// This table contains glyph metrics used for horizontal text layout.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hmtx.html
#[derive(Debug, PartialEq, Clone)]
pub struct HmtxTable {
    /// Paired advance width and left side bearing values for each glyph. Records are indexed by
    /// glyph ID.
    pub(crate) h_metrics: Vec<HorizontalMetrics>,
    /// Left side bearings for glyph IDs greater than or equal to numberOfHMetrics.
    pub(crate) left_side_bearings: Vec<i16>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct HorizontalMetrics {
    /// Advance width, in font design units.
    pub advance_width: u16,
    /// Glyph left side bearing, in font design units.
    pub left_side_bearing: i16,
}

impl HmtxTable {
    /// Glyphs past the last long metric share its advance width (monospaced tail).
    pub fn metrics(&self, glyph: u32) -> Option<HorizontalMetrics> {
        let glyph = usize::try_from(glyph).ok()?;
        if let Some(metrics) = self.h_metrics.get(glyph) {
            return Some(*metrics);
        }
        let last = self.h_metrics.last()?;
        let left_side_bearing = *self
            .left_side_bearings
            .get(glyph - self.h_metrics.len())?;
        Some(HorizontalMetrics {
            advance_width: last.advance_width,
            left_side_bearing,
        })
    }
}

impl<'a> FontTable<'a> for HmtxTable {
    type Dep = (&'a HheaTable, &'a MaxpTable);

    fn unpack(data: &'a [u8], (hhea, maxp): Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        let mut h_metrics = Vec::with_capacity(hhea.number_of_h_metrics as usize);
        for _ in 0..hhea.number_of_h_metrics {
            h_metrics.push(HorizontalMetrics {
                advance_width: rd.read_u16::<BigEndian>()?,
                left_side_bearing: rd.read_i16::<BigEndian>()?,
            });
        }

        let mut left_side_bearings =
            vec![0; maxp.num_glyphs().saturating_sub(hhea.number_of_h_metrics) as usize];
        rd.read_i16_into::<BigEndian>(&mut left_side_bearings)?;

        Ok(HmtxTable {
            h_metrics,
            left_side_bearings,
        })
    }
}
