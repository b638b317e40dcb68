//! Anti-aliased rendering of a glyph into a grayscale pixel buffer.

use crate::outline::Glyph;
use crate::BoundingBox;

/// Supersampling exponents above this are clamped; 8 already means 65536 samples per pixel.
pub const MAX_SUPERSAMPLE: u32 = 8;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct RasterConfig {
    /// Each pixel is sampled on a `2^supersample × 2^supersample` grid.
    pub supersample: u32,
}

/// Maps device pixels of a `width × height` cell onto a bounding box in font units, keeping the
/// aspect ratio of the box. The longer side of the box fills the cell.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct AspectMapping {
    bounding_box: BoundingBox,
    width: u32,
    height: u32,
    x_aspect: f32,
    y_aspect: f32,
}

impl AspectMapping {
    pub fn new(bounding_box: BoundingBox, width: u32, height: u32) -> Self {
        let (x_span, y_span) = spans(&bounding_box);
        let mut x_aspect = x_span / y_span;
        let mut y_aspect = 1.0;
        if x_aspect > 1.0 {
            y_aspect = 1.0 / x_aspect;
            x_aspect = 1.0;
        }
        AspectMapping {
            bounding_box,
            width: width.max(1),
            height: height.max(1),
            x_aspect,
            y_aspect,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The font unit position of device position `(x, y)`; `y` grows downwards.
    pub fn sample_point(&self, x: f32, y: f32) -> (i16, i16) {
        let (x_span, y_span) = spans(&self.bounding_box);
        let u = (x / self.width as f32) / self.x_aspect;
        let v = (1.0 - y / self.height as f32) / self.y_aspect;
        (
            (u * x_span + f32::from(self.bounding_box.x_min)).round() as i16,
            (v * y_span + f32::from(self.bounding_box.y_min)).round() as i16,
        )
    }

    /// Font units covered by one device pixel.
    pub fn pixel_size(&self) -> f32 {
        let (x_span, y_span) = spans(&self.bounding_box);
        let x = x_span / (self.width as f32 * self.x_aspect);
        let y = y_span / (self.height as f32 * self.y_aspect);
        x.max(y)
    }
}

fn spans(bbox: &BoundingBox) -> (f32, f32) {
    // degenerate boxes (e.g. of empty glyphs) map onto a single font unit
    let span = |min: i16, max: i16| (f32::from(max) - f32::from(min)).max(1.0);
    (span(bbox.x_min, bbox.x_max), span(bbox.y_min, bbox.y_max))
}

/// Coverage of a sample, from its winding number and its distance to the outline, relative to
/// the size of the sample. Samples closer than half their size to the outline are blended.
pub fn coverage(winding: i32, distance: f32, pixel_size: f32) -> f32 {
    let blend = (0.5 - distance.abs() / pixel_size).max(0.0);
    if winding > 0 {
        1.0 - blend
    } else if distance.abs() < pixel_size / 2.0 {
        blend
    } else {
        0.0
    }
}

/// Single channel, 8 bit pixel buffer, row by row from the top.
#[derive(Debug, PartialEq, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Surface {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.data[i])
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = value;
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Rasterizer {
    config: RasterConfig,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        if config.supersample > MAX_SUPERSAMPLE {
            log::warn!(
                "supersampling exponent {} clamped to {}",
                config.supersample,
                MAX_SUPERSAMPLE
            );
        }
        Rasterizer {
            config: RasterConfig {
                supersample: config.supersample.min(MAX_SUPERSAMPLE),
            },
        }
    }

    /// The gray value (0 to 255) of device pixel `(x, y)`, averaged over its sub-samples.
    pub fn pixel(&self, glyph: &Glyph, mapping: &AspectMapping, x: u32, y: u32) -> u8 {
        let n = 1u32 << self.config.supersample;
        let step = 1.0 / n as f32;
        let pixel_size = mapping.pixel_size() * step;

        let mut sum = 0.0;
        for j in 0..n {
            for i in 0..n {
                let (sx, sy) = mapping.sample_point(
                    x as f32 + i as f32 * step,
                    y as f32 + j as f32 * step,
                );
                let (winding, _) = glyph.winding_number(sx, sy, false);
                let distance = glyph.distance(sx, sy);
                sum += 255.0 * coverage(winding, distance, pixel_size);
            }
        }
        (sum / (n * n) as f32).round().max(0.0).min(255.0) as u8
    }

    /// Renders the glyph into a new surface of the mapping's size.
    pub fn render(&self, glyph: &Glyph, mapping: &AspectMapping) -> Surface {
        let mut surface = Surface::new(mapping.width(), mapping.height());
        self.render_into(glyph, mapping, &mut surface, 0, 0);
        surface
    }

    /// Renders the glyph into the cell of `surface` with its top left corner at
    /// `(x_offset, y_offset)`. Pixels outside of the surface are skipped.
    pub fn render_into(
        &self,
        glyph: &Glyph,
        mapping: &AspectMapping,
        surface: &mut Surface,
        x_offset: u32,
        y_offset: u32,
    ) {
        let columns = mapping
            .width()
            .min(surface.width().saturating_sub(x_offset));
        let rows = mapping
            .height()
            .min(surface.height().saturating_sub(y_offset));
        log::trace!(
            "rendering {}x{} pixels at ({}, {})",
            columns,
            rows,
            x_offset,
            y_offset
        );
        for y in 0..rows {
            for x in 0..columns {
                let value = self.pixel(glyph, mapping, x, y);
                surface.set(x_offset + x, y_offset + y, value);
            }
        }
    }
}
