//! Point queries against a glyph outline: the nonzero winding number along a horizontal ray, and
//! the exact distance to the nearest curve.

use crate::outline::{Glyph, Point};

/// For each of the eight sign patterns of (y0 > 0, y1 > 0, y2 > 0), two bits telling which roots
/// of a quadratic segment cross the ray: bit 0 for the first root (crossing downwards), bit 1 for
/// the second (crossing upwards).
const CROSSING_CLASSES: u32 = 0x2E74;

/// Below this magnitude the quadratic coefficient is treated as 0 and the segment as a line.
const EPSILON: f32 = 1.0 / 65536.0;

impl Glyph {
    /// Winding number of the outline around `(x, y)`: each crossing of the ray towards positive x
    /// counts +1 going down and -1 going up, so clockwise contours (as TrueType defines filled
    /// areas) are positive inside. This sign convention is intended: counter-clockwise contours
    /// are holes and come out negative.
    ///
    /// With `want_coverage`, also returns the smallest offset from the sample to any crossing,
    /// horizontal or vertical, as a cheap estimate of the distance to the outline
    /// (`f32::INFINITY` if no segment crosses either axis).
    pub fn winding_number(&self, x: i16, y: i16, want_coverage: bool) -> (i32, Option<f32>) {
        let sample = (f32::from(x), f32::from(y));
        let mut winding = 0;
        let mut nearest = f32::INFINITY;

        for segment in self.segments() {
            let [p0, p1, p2] = relative_to(&segment, sample);

            let (w, offset) = crossings(p0, p1, p2);
            winding += w;
            if want_coverage {
                nearest = nearest.min(offset);
                // crossings of the vertical ray, with the axes swapped
                let swap = |(x, y): (f32, f32)| (y, x);
                let (_, offset) = crossings(swap(p0), swap(p1), swap(p2));
                nearest = nearest.min(offset);
            }
        }

        (winding, if want_coverage { Some(nearest) } else { None })
    }

    /// Euclidean distance from `(x, y)` to the closest point of the outline.
    /// `f32::INFINITY` for empty glyphs.
    pub fn distance(&self, x: i16, y: i16) -> f32 {
        let sample = (f64::from(x), f64::from(y));
        self.segments()
            .map(|segment| {
                let [a, b, c] = segment;
                segment_distance(to_f64(a), to_f64(b), to_f64(c), sample)
            })
            .fold(f64::INFINITY, f64::min) as f32
    }
}

fn relative_to(segment: &[Point; 3], (sx, sy): (f32, f32)) -> [(f32, f32); 3] {
    let rel = |p: Point| (f32::from(p.x) - sx, f32::from(p.y) - sy);
    [rel(segment[0]), rel(segment[1]), rel(segment[2])]
}

/// Crossings of one segment with the ray `y = 0, x >= 0`. Returns the winding contribution and
/// the smallest `|x|` of any crossing of the line `y = 0`.
fn crossings(p0: (f32, f32), p1: (f32, f32), p2: (f32, f32)) -> (i32, f32) {
    let key = (p0.1 > 0.0) as u32 | ((p1.1 > 0.0) as u32) << 1 | ((p2.1 > 0.0) as u32) << 2;
    let class = (CROSSING_CLASSES >> (2 * key)) & 3;
    if class == 0 {
        return (0, f32::INFINITY);
    }

    // y(t) = a·t² - 2b·t + c
    let a = p0.1 - 2.0 * p1.1 + p2.1;
    let b = p0.1 - p1.1;
    let c = p0.1;
    let (t1, t2) = if a.abs() < EPSILON {
        if b == 0.0 {
            return (0, f32::INFINITY);
        }
        let t = c / (2.0 * b);
        (t, t)
    } else {
        let d = (b * b - a * c).max(0.0).sqrt();
        ((b - d) / a, (b + d) / a)
    };

    let ax = p0.0 - 2.0 * p1.0 + p2.0;
    let bx = p0.0 - p1.0;
    let x_at = |t: f32| (ax * t - 2.0 * bx) * t + p0.0;

    let mut winding = 0;
    let mut nearest = f32::INFINITY;
    if class & 1 != 0 {
        let x = x_at(t1);
        if x >= 0.0 {
            winding += 1;
        }
        nearest = nearest.min(x.abs());
    }
    if class & 2 != 0 {
        let x = x_at(t2);
        if x >= 0.0 {
            winding -= 1;
        }
        nearest = nearest.min(x.abs());
    }
    (winding, nearest)
}

type Vec2 = (f64, f64);

fn to_f64(p: Point) -> Vec2 {
    (f64::from(p.x), f64::from(p.y))
}

fn add(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 + b.0, a.1 + b.1)
}

fn sub(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 - b.0, a.1 - b.1)
}

fn scale(a: Vec2, s: f64) -> Vec2 {
    (a.0 * s, a.1 * s)
}

fn dot(a: Vec2, b: Vec2) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

fn length(a: Vec2) -> f64 {
    dot(a, a).sqrt()
}

/// Distance from `pos` to the quadratic Bézier `p0, p1, p2`.
///
/// The closest point is a root of the derivative of the squared distance, a cubic in `t`, solved
/// in closed form (after Inigo Quilez' `sdBezier`): Cardano for one real root, the trigonometric
/// form for three.
fn segment_distance(p0: Vec2, p1: Vec2, p2: Vec2, pos: Vec2) -> f64 {
    let endpoints = length(sub(p0, pos)).min(length(sub(p2, pos)));

    let a = sub(p1, p0);
    let b = add(sub(p0, scale(p1, 2.0)), p2);
    let c = scale(a, 2.0);
    let d = sub(p0, pos);

    let bb = dot(b, b);
    if bb < 1e-9 {
        // the control point is the midpoint, the curve is a line
        return line_distance(p0, p2, pos).min(endpoints);
    }

    let point_at = |t: f64| add(d, scale(add(c, scale(b, t)), t));

    let kk = 1.0 / bb;
    let kx = kk * dot(a, b);
    let ky = kk * (2.0 * dot(a, a) + dot(d, b)) / 3.0;
    let kz = kk * dot(d, a);

    let p = ky - kx * kx;
    let q = kx * (2.0 * kx * kx - 3.0 * ky) + kz;
    let h = q * q + 4.0 * p * p * p;

    let distance = if h >= 0.0 {
        let h = h.sqrt();
        let u = ((h - q) / 2.0).cbrt();
        let v = ((-h - q) / 2.0).cbrt();
        let t = (u + v - kx).max(0.0).min(1.0);
        length(point_at(t))
    } else {
        let z = (-p).sqrt();
        let v = (q / (p * z * 2.0)).max(-1.0).min(1.0).acos() / 3.0;
        let m = v.cos();
        let n = v.sin() * 3f64.sqrt();
        let t1 = ((m + m) * z - kx).max(0.0).min(1.0);
        let t2 = ((-n - m) * z - kx).max(0.0).min(1.0);
        length(point_at(t1)).min(length(point_at(t2)))
    };

    distance.min(endpoints)
}

fn line_distance(from: Vec2, to: Vec2, pos: Vec2) -> f64 {
    let dir = sub(to, from);
    let len2 = dot(dir, dir);
    if len2 == 0.0 {
        return length(sub(pos, from));
    }
    let t = (dot(sub(pos, from), dir) / len2).max(0.0).min(1.0);
    length(sub(pos, add(from, scale(dir, t))))
}
