mod format12;
mod format4;

use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::Arc;

use super::FontTable;
use crate::utils::reader::{cursor_at, slice};
use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};
pub use format12::Format12;
pub use format4::Format4;

/// A font's CMAP table, which defines the mapping of character codes to the glyph index values
/// used in the font. Accepted character encodings are:
/// | platform ID | encoding ID |                                          |
/// |-------------|-------------|------------------------------------------|
/// | 0           | any but 14  | Unicode                                  |
/// | 3           | 1           | Windows, Unicode BMP                     |
/// | 3           | 10          | Windows, full Unicode                    |
///
/// Supported subtable formats are: 4 and 12
///
/// The first accepted encoding record decides whether the font is usable at all: an error is
/// returned if there is none, or if its subtable is in an unsupported format. Later records with
/// unsupported formats are skipped.
///
/// See OpenType spec: https://docs.microsoft.com/en-us/typography/opentype/spec/cmap
#[derive(Debug, PartialEq, Clone)]
pub struct CmapTable {
    version: u16,
    /// All encoding records of the table, in storage order.
    encoding_records: Vec<EncodingRecord>,
    /// Decoded subtables of the accepted encoding records, in storage order.
    subtables: Vec<CmapSubtable>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Byte offset from beginning of table to the subtable for this encoding.
    pub offset: u32,
}

impl EncodingRecord {
    pub fn is_unicode(&self) -> bool {
        match self.platform_id {
            // 14 are unicode variation sequences, which do not map to glyphs on their own
            0 => self.encoding_id != 14,
            3 => matches!(self.encoding_id, 1 | 10),
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CmapSubtable {
    pub record: EncodingRecord,
    // records regularly share the same subtable (e.g. 0/3 and 3/1)
    pub subtable: Arc<Subtable>,
}

impl CmapTable {
    pub fn encoding_records(&self) -> &[EncodingRecord] {
        &self.encoding_records
    }

    /// Resolves `codepoint` with the first accepted subtable that maps it to a glyph other than
    /// the missing glyph.
    pub fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        self.subtables
            .iter()
            .find_map(|s| s.subtable.glyph_id(codepoint))
    }

    /// Every code point mapped by any of the accepted subtables, ascending and deduplicated.
    pub fn code_points(&self) -> BTreeSet<u32> {
        let mut code_points = BTreeSet::new();
        let mut visited: Vec<u32> = Vec::with_capacity(self.subtables.len());
        for s in &self.subtables {
            if visited.contains(&s.record.offset) {
                continue;
            }
            visited.push(s.record.offset);
            code_points.extend(s.subtable.code_points());
        }
        code_points
    }
}

impl<'a> FontTable<'a> for CmapTable {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data);
        let version = rd.read_u16::<BigEndian>()?;
        let num_tables = rd.read_u16::<BigEndian>()?;

        let mut encoding_records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            encoding_records.push(EncodingRecord {
                platform_id: rd.read_u16::<BigEndian>()?,
                encoding_id: rd.read_u16::<BigEndian>()?,
                offset: rd.read_u32::<BigEndian>()?,
            });
        }

        let mut subtables: Vec<CmapSubtable> = Vec::new();
        for (i, record) in encoding_records
            .iter()
            .filter(|r| r.is_unicode())
            .enumerate()
        {
            if let Some(shared) = subtables.iter().find(|s| s.record.offset == record.offset) {
                let subtable = shared.subtable.clone();
                subtables.push(CmapSubtable {
                    record: *record,
                    subtable,
                });
                continue;
            }

            match Subtable::unpack(data, record.offset as usize) {
                Ok(subtable) => {
                    log::debug!(
                        "using cmap subtable (platform {}, encoding {}) at offset {}",
                        record.platform_id,
                        record.encoding_id,
                        record.offset
                    );
                    subtables.push(CmapSubtable {
                        record: *record,
                        subtable: Arc::new(subtable),
                    });
                }
                // only the first accepted record has to be usable
                Err(Error::UnsupportedCmapFormat(format)) if i > 0 => {
                    log::warn!(
                        "skipping cmap subtable (platform {}, encoding {}) in format {}",
                        record.platform_id,
                        record.encoding_id,
                        format
                    );
                }
                Err(Error::CorruptFont(reason)) if i > 0 => {
                    log::warn!(
                        "skipping corrupt cmap subtable (platform {}, encoding {}): {}",
                        record.platform_id,
                        record.encoding_id,
                        reason
                    );
                }
                Err(err) => return Err(err),
            }
        }

        if subtables.is_empty() {
            return Err(Error::NoUsableCmap);
        }

        Ok(CmapTable {
            version,
            encoding_records,
            subtables,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Subtable {
    Format4(Format4),
    Format12(Format12),
}

impl Subtable {
    /// Reads the subtable at `offset`, relative to the start of the cmap table `data`.
    pub fn unpack(data: &[u8], offset: usize) -> Result<Self, Error> {
        let mut rd = cursor_at(data, offset)?;
        let format = rd.read_u16::<BigEndian>()?;

        match format {
            4 => {
                // length including format and length
                let length = rd.read_u16::<BigEndian>()? as usize;
                let body = subtable_body(data, offset + 4, offset + length)?;
                Ok(Subtable::Format4(Format4::unpack(body, ())?))
            }
            12 => {
                rd.read_u16::<BigEndian>()?; // reserved
                // length including format, reserved and length
                let length = rd.read_u32::<BigEndian>()? as usize;
                let body = subtable_body(data, offset + 8, offset.saturating_add(length))?;
                Ok(Subtable::Format12(Format12::unpack(body, ())?))
            }
            _ => Err(Error::UnsupportedCmapFormat(format)),
        }
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        match self {
            Subtable::Format4(subtable) => subtable.glyph_id(codepoint),
            Subtable::Format12(subtable) => subtable.glyph_id(codepoint),
        }
    }

    pub fn code_points(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Subtable::Format4(subtable) => Box::new(subtable.code_points()),
            Subtable::Format12(subtable) => Box::new(subtable.code_points()),
        }
    }
}

// Some fonts declare lengths reaching past the end of the cmap table, so the declared end is
// clamped to the table; the subtable decoders fail on their own if the data is really missing.
fn subtable_body(data: &[u8], start: usize, end: usize) -> Result<&[u8], Error> {
    let end = end.min(data.len());
    if end < start {
        return Err(Error::CorruptFont("cmap subtable length too small"));
    }
    slice(data, start, end - start)
}
