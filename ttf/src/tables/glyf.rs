use std::convert::TryFrom;
use std::io::Cursor;
use std::iter;
use std::ops::Range;

use super::loca::LocaTable;
use super::FontTable;
use crate::utils::reader::CursorExt;
use crate::{BoundingBox, Error};
use byteorder::{BigEndian, ReadBytesExt};

// simple glyph flags
pub(crate) const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: u8 = 0x20;

// composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// The 'glyf' table is comprised of a list of glyph data blocks, each of which provides the
/// description for a single glyph. Glyphs are referenced by identifiers (glyph IDs), which are
/// sequential integers beginning at zero.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/glyf
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6glyf.html
#[derive(Debug, PartialEq, Clone)]
pub struct GlyfTable<'a> {
    data: &'a [u8],
}

/// A glyph description, decided by the sign of its number of contours.
#[derive(Debug, PartialEq, Clone)]
pub enum Outline {
    Simple(RawGlyphPoints),
    Composite(CompositeGlyph),
}

/// The points of a glyph as stored in the font, with absolute coordinates.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct RawGlyphPoints {
    pub bounding_box: BoundingBox,
    /// Index of the last point of each contour, ascending.
    pub end_points: Vec<u16>,
    /// The point flags; bit 0 is set for points on the curve.
    pub flags: Vec<u8>,
    pub x: Vec<i16>,
    pub y: Vec<i16>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CompositeGlyph {
    pub bounding_box: BoundingBox,
    pub components: Vec<Component>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Component {
    pub flags: u16,
    pub glyph_index: u16,
    pub transform: Transform,
}

/// Affine component transformation: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Transform {
    /// Per axis scale normalization, `(sqrt(a² + b²), sqrt(c² + d²))`.
    pub fn scale_factors(&self) -> (f32, f32) {
        (
            (self.a * self.a + self.b * self.b).sqrt(),
            (self.c * self.c + self.d * self.d).sqrt(),
        )
    }

    /// A reflection reverses the direction of every contour.
    pub fn flips_winding(&self) -> bool {
        self.a * self.d - self.b * self.c < 0.0
    }

    pub fn apply(&self, x: i16, y: i16) -> (i16, i16) {
        // These are not the formulas documented by Apple, but the ones renderers actually
        // use (see http://pfaedit.sourceforge.net/Composites/index.html).
        let (m, n) = self.scale_factors();
        let (x, y) = (f32::from(x), f32::from(y));
        (
            (m * (self.a * x + self.c * y + self.e)) as i16,
            (n * (self.b * x + self.d * y + self.f)) as i16,
        )
    }
}

impl RawGlyphPoints {
    pub fn point_count(&self) -> usize {
        self.flags.len()
    }

    pub fn is_on_curve(&self, point: usize) -> bool {
        self.flags
            .get(point)
            .map(|f| f & ON_CURVE_POINT != 0)
            .unwrap_or(false)
    }

    /// The point index range of each contour.
    pub fn contours(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let begins = iter::once(0).chain(self.end_points.iter().map(|e| *e as usize + 1));
        begins
            .zip(self.end_points.iter())
            .map(|(begin, end)| begin..(*end as usize + 1))
    }

    /// Appends the transformed points of a component, reversing each of its contours if the
    /// transformation is a reflection.
    fn append(&mut self, component: &RawGlyphPoints, transform: &Transform) -> Result<(), Error> {
        let flip = transform.flips_winding();
        for range in component.contours() {
            let base = self.flags.len();
            let end_point = u16::try_from(base + range.len() - 1)
                .map_err(|_| Error::CorruptFont("too many points in composite glyph"))?;
            self.end_points.push(end_point);

            let mut push = |i: usize| {
                let (x, y) = transform.apply(component.x[i], component.y[i]);
                self.flags.push(component.flags[i]);
                self.x.push(x);
                self.y.push(y);
            };
            if flip {
                range.rev().for_each(&mut push);
            } else {
                range.for_each(&mut push);
            }
        }
        Ok(())
    }
}

impl<'a> GlyfTable<'a> {
    /// Decodes the description of `glyph`, without resolving composite components.
    pub fn outline(&self, loca: &LocaTable<'_>, glyph: u32) -> Result<Outline, Error> {
        let range = loca.glyph_range(glyph)?;
        if range.is_empty() {
            // glyph has no outline
            return Ok(Outline::Simple(RawGlyphPoints::default()));
        }
        let data = self
            .data
            .get(range)
            .ok_or(Error::CorruptFont("loca offset points outside of the glyf table"))?;

        let mut rd = Cursor::new(data);
        let number_of_contours = rd.read_i16::<BigEndian>()?;
        let bounding_box = BoundingBox {
            x_min: rd.read_i16::<BigEndian>()?,
            y_min: rd.read_i16::<BigEndian>()?,
            x_max: rd.read_i16::<BigEndian>()?,
            y_max: rd.read_i16::<BigEndian>()?,
        };

        if number_of_contours >= 0 {
            let points = unpack_simple(&mut rd, number_of_contours as usize, bounding_box)?;
            Ok(Outline::Simple(points))
        } else {
            let components = unpack_components(&mut rd, glyph)?;
            Ok(Outline::Composite(CompositeGlyph {
                bounding_box,
                components,
            }))
        }
    }

    /// Decodes `glyph` into its points, recursively resolving composite glyphs. Composites
    /// nested deeper than `max_depth` levels are rejected, which also catches component cycles.
    pub fn extract_points(
        &self,
        loca: &LocaTable<'_>,
        glyph: u32,
        max_depth: usize,
    ) -> Result<RawGlyphPoints, Error> {
        self.extract_points_at_depth(loca, glyph, 0, max_depth)
    }

    fn extract_points_at_depth(
        &self,
        loca: &LocaTable<'_>,
        glyph: u32,
        depth: usize,
        max_depth: usize,
    ) -> Result<RawGlyphPoints, Error> {
        let composite = match self.outline(loca, glyph)? {
            Outline::Simple(points) => return Ok(points),
            Outline::Composite(composite) => composite,
        };
        if depth >= max_depth {
            return Err(Error::ComponentDepthExceeded(max_depth));
        }

        let mut output = RawGlyphPoints {
            bounding_box: composite.bounding_box,
            ..RawGlyphPoints::default()
        };
        for component in &composite.components {
            log::trace!(
                "glyph {} (depth {}): component {} {:?}",
                glyph,
                depth,
                component.glyph_index,
                component.transform
            );
            let points = self.extract_points_at_depth(
                loca,
                u32::from(component.glyph_index),
                depth + 1,
                max_depth,
            )?;
            output.append(&points, &component.transform)?;
        }
        Ok(output)
    }
}

impl<'a> FontTable<'a> for GlyfTable<'a> {
    type Dep = ();

    fn unpack(data: &'a [u8], _: Self::Dep) -> Result<Self, Error> {
        Ok(GlyfTable { data })
    }
}

fn unpack_simple(
    rd: &mut Cursor<&[u8]>,
    number_of_contours: usize,
    bounding_box: BoundingBox,
) -> Result<RawGlyphPoints, Error> {
    let mut end_points = vec![0; number_of_contours];
    rd.read_u16_into::<BigEndian>(&mut end_points)?;
    if end_points.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::CorruptFont("contour end points are not ascending"));
    }
    let point_count = end_points.last().map(|e| *e as usize + 1).unwrap_or(0);

    let instruction_length = rd.read_u16::<BigEndian>()?;
    rd.skip(instruction_length as usize)?;

    let mut flags = Vec::with_capacity(point_count);
    while flags.len() < point_count {
        let flag = rd.read_u8()?;
        let repeat = if flag & REPEAT_FLAG != 0 {
            rd.read_u8()? as usize
        } else {
            0
        };
        if flags.len() + 1 + repeat > point_count {
            return Err(Error::CorruptFont("flag repeat count exceeds point count"));
        }
        flags.extend(iter::repeat(flag).take(1 + repeat));
    }

    let x = unpack_coordinates(
        rd,
        &flags,
        X_SHORT_VECTOR,
        X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
    )?;
    let y = unpack_coordinates(
        rd,
        &flags,
        Y_SHORT_VECTOR,
        Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
    )?;

    Ok(RawGlyphPoints {
        bounding_box,
        end_points,
        flags,
        x,
        y,
    })
}

/// Coordinates are stored as deltas to the previous point (the first one relative to 0).
fn unpack_coordinates(
    rd: &mut Cursor<&[u8]>,
    flags: &[u8],
    short_vector: u8,
    same_or_positive: u8,
) -> Result<Vec<i16>, Error> {
    let mut value = 0i16;
    let mut coordinates = Vec::with_capacity(flags.len());
    for flag in flags {
        let delta = if flag & short_vector != 0 {
            let magnitude = i16::from(rd.read_u8()?);
            if flag & same_or_positive != 0 {
                magnitude
            } else {
                -magnitude
            }
        } else if flag & same_or_positive != 0 {
            0
        } else {
            rd.read_i16::<BigEndian>()?
        };
        value = value.wrapping_add(delta);
        coordinates.push(value);
    }
    Ok(coordinates)
}

fn unpack_components(rd: &mut Cursor<&[u8]>, glyph: u32) -> Result<Vec<Component>, Error> {
    let mut components = Vec::new();
    loop {
        let flags = rd.read_u16::<BigEndian>()?;
        let glyph_index = rd.read_u16::<BigEndian>()?;

        let mut transform = Transform::default();
        match flags & (ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES) {
            ARGS_ARE_XY_VALUES => {
                transform.e = f32::from(rd.read_i8()?);
                transform.f = f32::from(rd.read_i8()?);
            }
            f if f == ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES => {
                transform.e = f32::from(rd.read_i16::<BigEndian>()?);
                transform.f = f32::from(rd.read_i16::<BigEndian>()?);
            }
            // anchoring components by matching points is not supported
            _ => return Err(Error::UnsupportedComponentAnchoring(glyph)),
        }

        if flags & WE_HAVE_A_SCALE != 0 {
            let scale = rd.read_f2dot14()?;
            transform.a = scale;
            transform.d = scale;
        }
        if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            transform.a = rd.read_f2dot14()?;
            transform.d = rd.read_f2dot14()?;
        }
        if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            transform.a = rd.read_f2dot14()?;
            transform.b = rd.read_f2dot14()?;
            transform.c = rd.read_f2dot14()?;
            transform.d = rd.read_f2dot14()?;
        }

        components.push(Component {
            flags,
            glyph_index,
            transform,
        });

        if flags & MORE_COMPONENTS == 0 {
            return Ok(components);
        }
    }
}
