//! Assembles synthetic TrueType fonts for the unit tests, table by table.

use byteorder::{BigEndian, WriteBytesExt};

use crate::{BoundingBox, Tag};

pub const SCALER_TRUETYPE: u32 = 0x00010000;

/// Writes a font from raw tables, in the order they were added.
pub struct FontBuilder {
    scaler: u32,
    tables: Vec<(Tag, Vec<u8>)>,
}

impl FontBuilder {
    pub fn new() -> Self {
        FontBuilder {
            scaler: SCALER_TRUETYPE,
            tables: Vec::new(),
        }
    }

    pub fn scaler(mut self, scaler: u32) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn table(mut self, tag: Tag, data: Vec<u8>) -> Self {
        self.tables.push((tag, data));
        self
    }

    pub fn without(mut self, tag: Tag) -> Self {
        self.tables.retain(|(t, _)| *t != tag);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.tables.reverse();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let header_len = 12 + 16 * self.tables.len();

        let mut out = Vec::new();
        out.write_u32::<BigEndian>(self.scaler).unwrap();
        out.write_u16::<BigEndian>(num_tables).unwrap();
        // search_range, entry_selector, range_shift are not validated
        out.write_u16::<BigEndian>(0).unwrap();
        out.write_u16::<BigEndian>(0).unwrap();
        out.write_u16::<BigEndian>(0).unwrap();

        let mut body = Vec::new();
        for (tag, data) in &self.tables {
            out.extend_from_slice(tag.as_bytes());
            out.write_u32::<BigEndian>(0).unwrap(); // check_sum
            out.write_u32::<BigEndian>((header_len + body.len()) as u32)
                .unwrap();
            out.write_u32::<BigEndian>(data.len() as u32).unwrap();
            body.extend_from_slice(data);
            body.resize((body.len() + 3) & !3, 0);
        }
        out.extend(body);
        out
    }
}

/// A font with all required tables: glyph 0 is empty, `glyphs` follow from index 1 on, and the
/// cmap maps 'A'..='Z' to glyphs 1.. (as far as they exist).
pub fn font(glyphs: &[Vec<u8>]) -> FontBuilder {
    let mut all = vec![Vec::new()];
    all.extend_from_slice(glyphs);
    let num_glyphs = all.len() as u16;
    let (glyf, loca) = glyf_loca(&all, true);
    let bbox = BoundingBox {
        x_min: 0,
        y_min: 0,
        x_max: 100,
        y_max: 100,
    };
    let metrics = (0..num_glyphs)
        .map(|i| (500 + i * 10, i as i16))
        .collect::<Vec<_>>();
    let last = glyphs.len().min(26) as u16;

    FontBuilder::new()
        .table(
            Tag::CMAP,
            cmap(&[(
                3,
                1,
                format4(
                    &[
                        Segment::delta(0x41, 0x41 + last.saturating_sub(1), 1 - 0x41),
                        Segment::delta(0xFFFF, 0xFFFF, 1),
                    ],
                    &[],
                ),
            )]),
        )
        .table(Tag::GLYF, glyf)
        .table(Tag::HEAD, head(1000, bbox, true))
        .table(Tag::HHEA, hhea(800, -200, num_glyphs))
        .table(Tag::HMTX, hmtx(&metrics, &[]))
        .table(Tag::LOCA, loca)
        .table(Tag::MAXP, maxp(num_glyphs))
        .table(Tag::NAME, vec![0, 0, 0, 0, 0, 6])
        .table(Tag::POST, vec![0, 3, 0, 0])
}

pub fn head(units_per_em: u16, bbox: BoundingBox, long: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(1).unwrap(); // major_version
    out.write_u16::<BigEndian>(0).unwrap(); // minor_version
    out.write_u32::<BigEndian>(0x00010000).unwrap(); // font_revision
    out.write_u32::<BigEndian>(0).unwrap(); // check_sum_adjustment
    out.write_u32::<BigEndian>(0x5F0F3CF5).unwrap();
    out.write_u16::<BigEndian>(0).unwrap(); // flags
    out.write_u16::<BigEndian>(units_per_em).unwrap();
    out.write_i64::<BigEndian>(0).unwrap(); // created
    out.write_i64::<BigEndian>(0).unwrap(); // modified
    out.write_i16::<BigEndian>(bbox.x_min).unwrap();
    out.write_i16::<BigEndian>(bbox.y_min).unwrap();
    out.write_i16::<BigEndian>(bbox.x_max).unwrap();
    out.write_i16::<BigEndian>(bbox.y_max).unwrap();
    out.write_u16::<BigEndian>(0).unwrap(); // mac_style
    out.write_u16::<BigEndian>(8).unwrap(); // lowest_rec_ppem
    out.write_i16::<BigEndian>(2).unwrap(); // font_direction_hint
    out.write_i16::<BigEndian>(if long { 1 } else { 0 }).unwrap();
    out.write_i16::<BigEndian>(0).unwrap(); // glyph_data_format
    out
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(0x00010000).unwrap();
    out.write_u16::<BigEndian>(num_glyphs).unwrap();
    // max_points .. max_component_elements
    for _ in 0..12 {
        out.write_u16::<BigEndian>(0).unwrap();
    }
    out.write_u16::<BigEndian>(2).unwrap(); // max_component_depth
    out
}

pub fn hhea(ascent: i16, descent: i16, number_of_h_metrics: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(0x00010000).unwrap();
    out.write_i16::<BigEndian>(ascent).unwrap();
    out.write_i16::<BigEndian>(descent).unwrap();
    out.write_i16::<BigEndian>(90).unwrap(); // line_gap
    // advance_width_max .. caret_offset, 4 times reserved, metric_data_format
    out.extend_from_slice(&[0; 24]);
    out.write_u16::<BigEndian>(number_of_h_metrics).unwrap();
    out
}

pub fn hmtx(metrics: &[(u16, i16)], left_side_bearings: &[i16]) -> Vec<u8> {
    let mut out = Vec::new();
    for (advance_width, lsb) in metrics {
        out.write_u16::<BigEndian>(*advance_width).unwrap();
        out.write_i16::<BigEndian>(*lsb).unwrap();
    }
    for lsb in left_side_bearings {
        out.write_i16::<BigEndian>(*lsb).unwrap();
    }
    out
}

/// A cmap table from `(platform_id, encoding_id, subtable)` records; subtables are laid out
/// after the records, in record order.
pub fn cmap(records: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(0).unwrap(); // version
    out.write_u16::<BigEndian>(records.len() as u16).unwrap();

    let mut offset = 4 + 8 * records.len();
    for (platform_id, encoding_id, subtable) in records {
        out.write_u16::<BigEndian>(*platform_id).unwrap();
        out.write_u16::<BigEndian>(*encoding_id).unwrap();
        out.write_u32::<BigEndian>(offset as u32).unwrap();
        offset += subtable.len();
    }
    for (_, _, subtable) in records {
        out.extend_from_slice(subtable);
    }
    out
}

pub struct Segment {
    start: u16,
    end: u16,
    id_delta: i16,
    id_range_offset: u16,
}

impl Segment {
    pub fn delta(start: u16, end: u16, id_delta: i16) -> Self {
        Segment {
            start,
            end,
            id_delta,
            id_range_offset: 0,
        }
    }
}

pub fn format4(segments: &[Segment], glyph_id_array: &[u16]) -> Vec<u8> {
    let seg_count = segments.len() as u16;
    let mut body = Vec::new();
    body.write_u16::<BigEndian>(0).unwrap(); // language
    body.write_u16::<BigEndian>(seg_count * 2).unwrap();
    // search_range, entry_selector, range_shift
    body.extend_from_slice(&[0; 6]);
    for s in segments {
        body.write_u16::<BigEndian>(s.end).unwrap();
    }
    body.write_u16::<BigEndian>(0).unwrap(); // reserved_pad
    for s in segments {
        body.write_u16::<BigEndian>(s.start).unwrap();
    }
    for s in segments {
        body.write_i16::<BigEndian>(s.id_delta).unwrap();
    }
    for s in segments {
        body.write_u16::<BigEndian>(s.id_range_offset).unwrap();
    }
    for id in glyph_id_array {
        body.write_u16::<BigEndian>(*id).unwrap();
    }

    let mut out = Vec::new();
    out.write_u16::<BigEndian>(4).unwrap();
    out.write_u16::<BigEndian>(body.len() as u16 + 4).unwrap();
    out.extend(body);
    out
}

pub fn format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(12).unwrap();
    out.write_u16::<BigEndian>(0).unwrap(); // reserved
    out.write_u32::<BigEndian>(16 + 12 * groups.len() as u32)
        .unwrap();
    out.write_u32::<BigEndian>(0).unwrap(); // language
    out.write_u32::<BigEndian>(groups.len() as u32).unwrap();
    for (start, end, glyph) in groups {
        out.write_u32::<BigEndian>(*start).unwrap();
        out.write_u32::<BigEndian>(*end).unwrap();
        out.write_u32::<BigEndian>(*glyph).unwrap();
    }
    out
}

/// A simple glyph from contours of `(x, y, on_curve)` points. Flags are written one per point
/// and every coordinate as a 16-bit delta.
pub fn simple_glyph(contours: &[&[(i16, i16, bool)]]) -> Vec<u8> {
    let points = contours.iter().flat_map(|c| c.iter()).collect::<Vec<_>>();
    let bbox = points.iter().fold(None, |bbox: Option<BoundingBox>, (x, y, _)| {
        Some(match bbox {
            None => BoundingBox {
                x_min: *x,
                y_min: *y,
                x_max: *x,
                y_max: *y,
            },
            Some(b) => BoundingBox {
                x_min: b.x_min.min(*x),
                y_min: b.y_min.min(*y),
                x_max: b.x_max.max(*x),
                y_max: b.y_max.max(*y),
            },
        })
    });

    let mut out = Vec::new();
    out.write_i16::<BigEndian>(contours.len() as i16).unwrap();
    write_bbox(&mut out, bbox.unwrap_or_default());
    let mut end = 0;
    for contour in contours {
        end += contour.len();
        out.write_u16::<BigEndian>(end as u16 - 1).unwrap();
    }
    out.write_u16::<BigEndian>(0).unwrap(); // instruction_length
    for (_, _, on_curve) in &points {
        out.push(if *on_curve { 0x01 } else { 0x00 });
    }
    let mut prev = 0i16;
    for (x, _, _) in &points {
        out.write_i16::<BigEndian>(x.wrapping_sub(prev)).unwrap();
        prev = *x;
    }
    prev = 0;
    for (_, y, _) in &points {
        out.write_i16::<BigEndian>(y.wrapping_sub(prev)).unwrap();
        prev = *y;
    }
    out
}

/// The square (0, 0) - (100, 100), in clockwise order.
pub fn square_glyph() -> Vec<u8> {
    simple_glyph(&[&[
        (0, 0, true),
        (0, 100, true),
        (100, 100, true),
        (100, 0, true),
    ]])
}

pub enum Scale {
    None,
    Uniform(f32),
    XY(f32, f32),
    TwoByTwo(f32, f32, f32, f32),
}

pub struct ComponentRecord {
    pub glyph_index: u16,
    pub dx: i16,
    pub dy: i16,
    pub words: bool,
    pub point_matching: bool,
    pub scale: Scale,
}

impl ComponentRecord {
    pub fn offset(glyph_index: u16, dx: i16, dy: i16) -> Self {
        ComponentRecord {
            glyph_index,
            dx,
            dy,
            words: false,
            point_matching: false,
            scale: Scale::None,
        }
    }
}

pub fn composite_glyph(components: &[ComponentRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i16::<BigEndian>(-1).unwrap();
    write_bbox(&mut out, BoundingBox::default());

    for (i, c) in components.iter().enumerate() {
        let mut flags = 0u16;
        if c.words {
            flags |= 0x0001;
        }
        if !c.point_matching {
            flags |= 0x0002;
        }
        flags |= match c.scale {
            Scale::None => 0,
            Scale::Uniform(_) => 0x0008,
            Scale::XY(_, _) => 0x0040,
            Scale::TwoByTwo(_, _, _, _) => 0x0080,
        };
        if i + 1 < components.len() {
            flags |= 0x0020;
        }

        out.write_u16::<BigEndian>(flags).unwrap();
        out.write_u16::<BigEndian>(c.glyph_index).unwrap();
        if c.words {
            out.write_i16::<BigEndian>(c.dx).unwrap();
            out.write_i16::<BigEndian>(c.dy).unwrap();
        } else {
            out.write_i8(c.dx as i8).unwrap();
            out.write_i8(c.dy as i8).unwrap();
        }
        let scales = match c.scale {
            Scale::None => vec![],
            Scale::Uniform(s) => vec![s],
            Scale::XY(x, y) => vec![x, y],
            Scale::TwoByTwo(a, b, c, d) => vec![a, b, c, d],
        };
        for s in scales {
            out.write_i16::<BigEndian>((s * 16384.0) as i16).unwrap();
        }
    }
    out
}

/// Concatenates the glyphs into a glyf table and builds the matching loca table.
pub fn glyf_loca(glyphs: &[Vec<u8>], long: bool) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    let write_offset = |loca: &mut Vec<u8>, offset: usize| {
        if long {
            loca.write_u32::<BigEndian>(offset as u32).unwrap();
        } else {
            loca.write_u16::<BigEndian>((offset / 2) as u16).unwrap();
        }
    };
    for glyph in glyphs {
        write_offset(&mut loca, glyf.len());
        glyf.extend_from_slice(glyph);
        if !long && glyf.len() % 2 != 0 {
            glyf.push(0);
        }
    }
    write_offset(&mut loca, glyf.len());
    (glyf, loca)
}

fn write_bbox(out: &mut Vec<u8>, bbox: BoundingBox) {
    out.write_i16::<BigEndian>(bbox.x_min).unwrap();
    out.write_i16::<BigEndian>(bbox.y_min).unwrap();
    out.write_i16::<BigEndian>(bbox.x_max).unwrap();
    out.write_i16::<BigEndian>(bbox.y_max).unwrap();
}
