mod error;
mod geometry;
pub mod outline;
pub mod raster;
mod tables;
#[cfg(test)]
mod test_font;
mod utils;

use std::fmt;

use byteorder::{BigEndian, ReadBytesExt};
use tables::cmap::CmapTable;
use tables::glyf::GlyfTable;
use tables::head::HeadTable;
use tables::hhea::HheaTable;
use tables::hmtx::HmtxTable;
use tables::loca::LocaTable;
use tables::maxp::MaxpTable;
use tables::FontTable;
use utils::reader::CursorExt;

pub use error::Error;
pub use outline::{Contour, Glyph, Point};
pub use raster::{AspectMapping, RasterConfig, Rasterizer, Surface};
pub use tables::cmap::EncodingRecord;
pub use tables::glyf::{Component, CompositeGlyph, Outline, RawGlyphPoints, Transform};
pub use tables::hmtx::HorizontalMetrics;

/// Composite glyphs nested deeper than this are rejected unless configured otherwise.
pub const DEFAULT_MAX_COMPONENT_DEPTH: usize = 16;

/// A table tag, four bytes compared exactly (`"cvt "` includes its trailing space).
#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const HEAD: Tag = Tag(*b"head");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");
    pub const NAME: Tag = Tag(*b"name");
    pub const POST: Tag = Tag(*b"post");
    pub const CVT: Tag = Tag(*b"cvt ");
    pub const FPGM: Tag = Tag(*b"fpgm");
    pub const HDMX: Tag = Tag(*b"hdmx");
    pub const KERN: Tag = Tag(*b"kern");
    pub const OS2: Tag = Tag(*b"OS/2");
    pub const PREP: Tag = Tag(*b"prep");

    pub fn new(tag: &[u8; 4]) -> Self {
        Tag(*tag)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            if b.is_ascii_graphic() || *b == b' ' {
                write!(f, "{}", *b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(\"{}\")", self)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct BoundingBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Options {
    /// Maximum nesting of composite glyphs; also stops component cycles.
    pub max_component_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_component_depth: DEFAULT_MAX_COMPONENT_DEPTH,
        }
    }
}

/// A TrueType font, decoded from a borrowed buffer. Glyph outlines are decoded on demand.
#[derive(Debug, Clone)]
pub struct FontFile<'a> {
    data: &'a [u8],
    options: Options,
    offset_table: OffsetTable,
    optional_tables: OptionalTables,
    cmap_table: CmapTable,
    glyf_table: GlyfTable<'a>,
    head_table: HeadTable,
    hhea_table: HheaTable,
    hmtx_table: HmtxTable,
    loca_table: LocaTable<'a>,
    maxp_table: MaxpTable,
}

impl<'a> FontFile<'a> {
    pub fn from_slice(data: &'a [u8]) -> Result<Self, Error> {
        Self::from_slice_with_options(data, Options::default())
    }

    pub fn from_slice_with_options(data: &'a [u8], options: Options) -> Result<Self, Error> {
        let offset_table = OffsetTable::unpack(data, ())?;

        // name and post are required, but nothing is read from them
        offset_table.required_table(data, Tag::NAME)?;
        offset_table.required_table(data, Tag::POST)?;

        let head_table: HeadTable =
            offset_table.unpack_required_table(data, Tag::HEAD, ())?;
        let maxp_table: MaxpTable =
            offset_table.unpack_required_table(data, Tag::MAXP, ())?;
        let hhea_table: HheaTable =
            offset_table.unpack_required_table(data, Tag::HHEA, ())?;
        let hmtx_table =
            offset_table.unpack_required_table(data, Tag::HMTX, (&hhea_table, &maxp_table))?;
        let loca_table = LocaTable::unpack(
            offset_table.required_table(data, Tag::LOCA)?,
            head_table.index_to_loc_format,
        )?;
        let glyf_table = offset_table.unpack_required_table(data, Tag::GLYF, ())?;
        let cmap_table = offset_table.unpack_required_table(data, Tag::CMAP, ())?;
        let optional_tables = OptionalTables::locate(&offset_table, data)?;

        if let Some(depth) = maxp_table.max_component_depth() {
            if usize::from(depth) > options.max_component_depth {
                log::warn!(
                    "font nests composite glyphs {} levels deep, only {} are allowed",
                    depth,
                    options.max_component_depth
                );
            }
        }

        log::debug!(
            "loaded font with {} tables, {} glyphs, {} units per em",
            offset_table.tables.len(),
            maxp_table.num_glyphs(),
            head_table.units_per_em
        );

        Ok(FontFile {
            data,
            options,
            offset_table,
            optional_tables,
            cmap_table,
            glyf_table,
            head_table,
            hhea_table,
            hmtx_table,
            loca_table,
            maxp_table,
        })
    }

    /// The glyph mapped to `codepoint`, `None` if it is not mapped (or mapped to glyph 0).
    pub fn glyph_index(&self, codepoint: u32) -> Option<u32> {
        self.cmap_table.glyph_id(codepoint)
    }

    /// The normalized outline of the glyph mapped to `codepoint`.
    pub fn glyph(&self, codepoint: u32) -> Result<Glyph, Error> {
        let glyph = self
            .glyph_index(codepoint)
            .ok_or(Error::GlyphMissing(codepoint))?;
        self.glyph_by_index(glyph)
    }

    pub fn glyph_by_index(&self, glyph: u32) -> Result<Glyph, Error> {
        Ok(Glyph::from_points(&self.glyph_points(glyph)?))
    }

    /// The raw points of a glyph, with composite glyphs resolved.
    pub fn glyph_points(&self, glyph: u32) -> Result<RawGlyphPoints, Error> {
        self.check_glyph_index(glyph)?;
        self.glyf_table.extract_points(
            &self.loca_table,
            glyph,
            self.options.max_component_depth,
        )
    }

    /// The glyph description as stored, without resolving components.
    pub fn outline(&self, glyph: u32) -> Result<Outline, Error> {
        self.check_glyph_index(glyph)?;
        self.glyf_table.outline(&self.loca_table, glyph)
    }

    fn check_glyph_index(&self, glyph: u32) -> Result<(), Error> {
        if glyph >= u32::from(self.maxp_table.num_glyphs()) {
            return Err(Error::CorruptFont("glyph index out of range"));
        }
        Ok(())
    }

    /// Every mapped code point, ascending and without duplicates.
    pub fn char_codes(&self) -> Vec<u32> {
        self.cmap_table.code_points().into_iter().collect()
    }

    pub fn units_per_em(&self) -> u16 {
        self.head_table.units_per_em
    }

    /// Bounding box over all glyphs, in font units.
    pub fn bounding_box(&self) -> BoundingBox {
        self.head_table.bounding_box
    }

    pub fn lowest_rec_ppem(&self) -> u16 {
        self.head_table.lowest_rec_ppem
    }

    pub fn ascent(&self) -> i16 {
        self.hhea_table.ascent
    }

    pub fn descent(&self) -> i16 {
        self.hhea_table.descent
    }

    pub fn line_gap(&self) -> i16 {
        self.hhea_table.line_gap
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp_table.num_glyphs()
    }

    pub fn h_metrics(&self, glyph: u32) -> Option<HorizontalMetrics> {
        self.hmtx_table.metrics(glyph)
    }

    pub fn sfnt_version(&self) -> SfntVersion {
        self.offset_table.sfnt_version
    }

    /// The table directory, in storage order.
    pub fn table_records(&self) -> &[TableRecord] {
        &self.offset_table.tables
    }

    /// The directory entry used for `tag`; the last one if the tag is listed more than once.
    pub fn table_record(&self, tag: Tag) -> Option<&TableRecord> {
        self.offset_table.table_record(tag)
    }

    /// The data of any table in the directory.
    pub fn table_data(&self, tag: Tag) -> Option<Result<&'a [u8], Error>> {
        self.table_record(tag).map(|record| record.data(self.data))
    }

    pub fn optional_tables(&self) -> &OptionalTables {
        &self.optional_tables
    }

    /// All encoding records of the cmap table, including the ones that are not used.
    pub fn cmap_records(&self) -> &[EncodingRecord] {
        self.cmap_table.encoding_records()
    }
}

/// Tables the font may carry, which are inventoried but not interpreted.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct OptionalTables {
    pub cvt: Option<TableRecord>,
    pub fpgm: Option<TableRecord>,
    pub hdmx: Option<TableRecord>,
    pub kern: Option<TableRecord>,
    pub os2: Option<TableRecord>,
    pub prep: Option<TableRecord>,
}

impl OptionalTables {
    fn locate(offset_table: &OffsetTable, data: &[u8]) -> Result<Self, Error> {
        let find = |tag: Tag| -> Result<Option<TableRecord>, Error> {
            match offset_table.table_record(tag) {
                Some(record) => {
                    record.data(data)?;
                    Ok(Some(*record))
                }
                None => Ok(None),
            }
        };
        Ok(OptionalTables {
            cvt: find(Tag::CVT)?,
            fpgm: find(Tag::FPGM)?,
            hdmx: find(Tag::HDMX)?,
            kern: find(Tag::KERN)?,
            os2: find(Tag::OS2)?,
            prep: find(Tag::PREP)?,
        })
    }

    /// Tags of the present tables.
    pub fn tags(&self) -> Vec<Tag> {
        [
            &self.cvt, &self.fpgm, &self.hdmx, &self.kern, &self.os2, &self.prep,
        ]
        .iter()
        .filter_map(|r| r.map(|r| r.tag))
        .collect()
    }
}

/// This table contains a dictionary of all font tables included in the file.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/otff
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html
#[derive(Debug, PartialEq, Clone)]
struct OffsetTable {
    /// TrueType fonts use 0x00010000; fonts for Apple platforms may use 'true' instead.
    sfnt_version: SfntVersion,
    /// Table records of the font, in storage order (which is not required to be sorted).
    tables: Vec<TableRecord>,
}

impl OffsetTable {
    fn table_record(&self, tag: Tag) -> Option<&TableRecord> {
        // later records replace earlier ones with the same tag
        self.tables.iter().rev().find(|r| r.tag == tag)
    }

    fn required_table<'a>(&self, data: &'a [u8], tag: Tag) -> Result<&'a [u8], Error> {
        self.table_record(tag)
            .ok_or(Error::MissingTable(tag))?
            .data(data)
    }

    fn unpack_required_table<'a, T, D>(&self, data: &'a [u8], tag: Tag, dep: D) -> Result<T, Error>
    where
        T: FontTable<'a, Dep = D>,
    {
        let table_data = self.required_table(data, tag)?;
        log::debug!("decoding {} table ({} bytes)", tag, table_data.len());
        T::unpack(table_data, dep)
    }
}

impl<'a> FontTable<'a> for OffsetTable {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        let mut rd = std::io::Cursor::new(data);
        let sfnt_version = SfntVersion::from_scaler(rd.read_u32::<BigEndian>()?)?;
        let num_tables = rd.read_u16::<BigEndian>()?;
        // search_range, entry_selector, range_shift
        rd.skip(6)?;

        let mut tables: Vec<TableRecord> = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let record = TableRecord {
                tag: rd.read_tag()?,
                check_sum: rd.read_u32::<BigEndian>()?,
                offset: rd.read_u32::<BigEndian>()?,
                length: rd.read_u32::<BigEndian>()?,
            };
            if tables.iter().any(|r| r.tag == record.tag) {
                log::warn!("{} table listed more than once, using the last one", record.tag);
            }
            tables.push(record);
        }

        Ok(OffsetTable {
            sfnt_version,
            tables,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SfntVersion {
    /// 0x00010000
    TrueType,
    /// 'true'
    AppleTrue,
}

impl SfntVersion {
    fn from_scaler(scaler: u32) -> Result<Self, Error> {
        match scaler {
            0x00010000 => Ok(SfntVersion::TrueType),
            0x74727565 => Ok(SfntVersion::AppleTrue),
            v => Err(Error::UnsupportedScaler(v)),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TableRecord {
    pub tag: Tag,
    pub check_sum: u32,
    /// Offset from the beginning of the font data.
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    /// The table's bytes within the font `data`.
    pub fn data<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], Error> {
        utils::reader::slice(data, self.offset as usize, self.length as usize)
    }
}
