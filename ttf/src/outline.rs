use crate::tables::glyf::RawGlyphPoints;
use crate::BoundingBox;

/// A control point in font units.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }

    /// The point a quarter of the way from `self` to `other`, truncated towards `self`.
    ///
    /// Used instead of the midpoint for synthesized points, so that a straight run never puts
    /// the control point exactly in the middle of its chord.
    pub fn quarter_towards(self, other: Point) -> Point {
        let step = |from: i16, to: i16| {
            let from = i32::from(from);
            // stays between `from` and `to`, so it fits
            (from + (i32::from(to) - from) / 4) as i16
        };
        Point {
            x: step(self.x, other.x),
            y: step(self.y, other.y),
        }
    }
}

/// A closed chain of quadratic Bézier segments. Points at even positions are on the curve, the
/// ones in between are control points; the last point repeats the first.
#[derive(Debug, PartialEq, Clone)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The `(start, control, end)` triples of the contour.
    pub fn segments(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.points
            .windows(3)
            .step_by(2)
            .map(|w| [w[0], w[1], w[2]])
    }

    /// Turns the raw points of one contour into segments, starting at an on-curve point.
    ///
    /// Whenever two consecutive points are both on or both off the curve, a point a quarter of
    /// the way between them is inserted to keep the on/off alternation.
    fn normalize(raw: &[(Point, bool)]) -> Option<Contour> {
        let first_on = raw.iter().position(|(_, on_curve)| *on_curve);
        let (start, rest): ((Point, bool), Vec<(Point, bool)>) = match first_on {
            Some(ix) => (
                raw[ix],
                raw[ix + 1..].iter().chain(&raw[..ix]).cloned().collect(),
            ),
            None => {
                // only control points, start on the curve in front of the first one
                let (first, _) = *raw.first()?;
                let (last, _) = *raw.last()?;
                ((last.quarter_towards(first), true), raw.to_vec())
            }
        };

        let mut points = Vec::with_capacity(raw.len() * 2 + 2);
        points.push(start.0);
        let mut prev = start;
        for &(point, on_curve) in &rest {
            if on_curve == prev.1 {
                points.push(prev.0.quarter_towards(point));
            }
            points.push(point);
            prev = (point, on_curve);
        }
        if prev.1 == start.1 {
            points.push(prev.0.quarter_towards(start.0));
        }
        points.push(start.0);

        Some(Contour { points })
    }
}

/// A glyph outline made of closed quadratic contours, in font units.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Glyph {
    pub bounding_box: BoundingBox,
    pub contours: Vec<Contour>,
}

impl Glyph {
    pub fn from_points(raw: &RawGlyphPoints) -> Self {
        let contours = raw
            .contours()
            .filter_map(|range| {
                let points = range
                    .filter(|i| *i < raw.x.len() && *i < raw.y.len())
                    .map(|i| (Point::new(raw.x[i], raw.y[i]), raw.is_on_curve(i)))
                    .collect::<Vec<_>>();
                Contour::normalize(&points)
            })
            .collect();

        Glyph {
            bounding_box: raw.bounding_box,
            contours,
        }
    }

    /// Segments of all contours.
    pub fn segments(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.contours.iter().flat_map(|c| c.segments())
    }

    /// Glyphs like the space have no outline.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}
