//! Built-in curves with closed-form queries

use std::f64::consts::{PI, TAU};

use super::{Pathable, polyline_length, wrap_t};
use crate::render::svg::PathData;
use crate::types::{BBox, Coord};

/// Straight segment, `point_at(t) = (1-t)·start + t·end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Coord,
    pub end: Coord,
}

impl Line {
    pub fn new(start: Coord, end: Coord) -> Self {
        Self { start, end }
    }

    pub fn path_data(&self) -> PathData {
        PathData::new()
            .m(self.start.x, self.start.y)
            .l(self.end.x, self.end.y)
    }
}

impl Pathable for Line {
    fn point_at(&self, t: f64) -> Coord {
        self.start.lerp(self.end, t)
    }

    fn angle_at(&self, _t: f64) -> f64 {
        let d = self.end - self.start;
        d.y.atan2(d.x).to_degrees()
    }

    fn arc_length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    fn to_svg_path_d(&self) -> String {
        self.path_data().to_string()
    }
}

/// Quadratic Bezier whose control point is derived from a scalar curvature.
///
/// The control point sits on the chord's perpendicular bisector at
/// `curvature · |chord| / 2` from the midpoint. Positive curvature bows to the
/// right of the travel direction on screen (clockwise side). Values beyond
/// about ±2 make the curve fold back on itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub start: Coord,
    pub end: Coord,
    pub curvature: f64,
}

impl Curve {
    pub fn new(start: Coord, end: Coord, curvature: f64) -> Self {
        Self { start, end, curvature }
    }

    /// The derived quadratic control point.
    pub fn control_point(&self) -> Coord {
        let chord = self.end - self.start;
        let len = chord.length();
        self.start.midpoint(self.end) + chord.perp().normalized() * (self.curvature * len / 2.0)
    }

    /// Bernstein weights of the three control points at `t`.
    pub fn weights(t: f64) -> [f64; 3] {
        let u = 1.0 - t;
        [u * u, 2.0 * u * t, t * t]
    }

    fn derivative(&self, t: f64) -> Coord {
        let c = self.control_point();
        (c - self.start) * (2.0 * (1.0 - t)) + (self.end - c) * (2.0 * t)
    }

    /// `M L` when flat, so a zero-curvature curve matches a [`Line`] exactly.
    pub fn path_data(&self) -> PathData {
        let path = PathData::new().m(self.start.x, self.start.y);
        if self.curvature == 0.0 {
            return path.l(self.end.x, self.end.y);
        }
        let c = self.control_point();
        path.q(c.x, c.y, self.end.x, self.end.y)
    }

    /// Tight bounds using the derivative roots on each axis.
    pub fn bounds(&self) -> BBox {
        let c = self.control_point();
        let mut bb = BBox::from_points([self.start, self.end]);
        for (p0, p1, p2) in [(self.start.x, c.x, self.end.x), (self.start.y, c.y, self.end.y)] {
            let denom = p0 - 2.0 * p1 + p2;
            if denom.abs() > f64::EPSILON {
                let t = (p0 - p1) / denom;
                if t > 0.0 && t < 1.0 {
                    bb.expand_point(self.point_at(t));
                }
            }
        }
        bb
    }
}

impl Pathable for Curve {
    fn point_at(&self, t: f64) -> Coord {
        let [w0, w1, w2] = Self::weights(t);
        let c = self.control_point();
        Coord::new(
            w0 * self.start.x + w1 * c.x + w2 * self.end.x,
            w0 * self.start.y + w1 * c.y + w2 * self.end.y,
        )
    }

    fn angle_at(&self, t: f64) -> f64 {
        let d = self.derivative(t).normalized();
        if d == Coord::ZERO {
            return 0.0;
        }
        d.y.atan2(d.x).to_degrees()
    }

    /// Closed-form quadratic Bezier length.
    fn arc_length(&self) -> f64 {
        let c = self.control_point();
        let a = self.start - c * 2.0 + self.end;
        let b = (c - self.start) * 2.0;
        let qa = 4.0 * a.dot(a);
        let qb = 4.0 * a.dot(b);
        let qc = b.dot(b);
        if qa < 1e-12 {
            return qc.sqrt();
        }
        let sabc = 2.0 * (qa + qb + qc).sqrt();
        let a2 = qa.sqrt();
        let a32 = 2.0 * qa * a2;
        let c2 = 2.0 * qc.sqrt();
        let ba = qb / a2;
        let denom = ba + c2;
        if denom <= 1e-12 {
            return polyline_length(self, 256);
        }
        (a32 * sabc + a2 * qb * (sabc - c2) + (4.0 * qc * qa - qb * qb) * ((2.0 * a2 + ba + sabc) / denom).ln())
            / (4.0 * a32)
    }

    fn to_svg_path_d(&self) -> String {
        self.path_data().to_string()
    }
}

/// Ellipse with an optional rotation (degrees, clockwise on screen).
///
/// `point_at(0)` is the local right point, `0.25` the top, `0.5` the left and
/// `0.75` the bottom. Parameter spacing is not arc-length uniform; use
/// [`Ellipse::point_at_angle`] for true angular positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Coord,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
}

impl Ellipse {
    pub fn new(center: Coord, rx: f64, ry: f64) -> Self {
        Self { center, rx, ry, rotation: 0.0 }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    fn place(&self, local: Coord) -> Coord {
        local.rotated_about_origin(self.rotation.to_radians()) + self.center
    }

    /// Boundary point along the ray at `degrees` (counter-clockwise on screen
    /// from the ellipse's own +x axis).
    pub fn point_at_angle(&self, degrees: f64) -> Coord {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let denom = ((self.ry * cos).powi(2) + (self.rx * sin).powi(2)).sqrt();
        if denom == 0.0 {
            return self.center;
        }
        let r = self.rx * self.ry / denom;
        self.place(Coord::new(r * cos, -r * sin))
    }

    /// Two half-ellipse arcs through the local left point.
    pub fn path_data(&self) -> PathData {
        let right = self.point_at(0.0);
        let left = self.point_at(0.5);
        PathData::new()
            .m(right.x, right.y)
            .a(self.rx, self.ry, self.rotation, false, false, left.x, left.y)
            .a(self.rx, self.ry, self.rotation, false, false, right.x, right.y)
            .z()
    }

    /// Axis-aligned bounds of the rotated ellipse.
    pub fn bounds(&self) -> BBox {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let hw = ((self.rx * cos).powi(2) + (self.ry * sin).powi(2)).sqrt();
        let hh = ((self.rx * sin).powi(2) + (self.ry * cos).powi(2)).sqrt();
        BBox::from_center_size(self.center, hw * 2.0, hh * 2.0)
    }
}

impl Pathable for Ellipse {
    fn point_at(&self, t: f64) -> Coord {
        let theta = wrap_t(t) * TAU;
        self.place(Coord::new(self.rx * theta.cos(), -self.ry * theta.sin()))
    }

    fn angle_at(&self, t: f64) -> f64 {
        let theta = wrap_t(t) * TAU;
        let d = Coord::new(-self.rx * theta.sin(), -self.ry * theta.cos())
            .rotated_about_origin(self.rotation.to_radians());
        if d.length() == 0.0 {
            return 0.0;
        }
        d.y.atan2(d.x).to_degrees()
    }

    /// Ramanujan's second approximation of the perimeter.
    fn arc_length(&self) -> f64 {
        let (a, b) = (self.rx.abs(), self.ry.abs());
        if a + b == 0.0 {
            return 0.0;
        }
        let h = ((a - b) / (a + b)).powi(2);
        PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn to_svg_path_d(&self) -> String {
        self.path_data().to_string()
    }
}

/// Open or closed polyline parametrised by arc length.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Coord>,
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Coord>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn path_data(&self) -> PathData {
        let Some(first) = self.points.first() else {
            return PathData::new();
        };
        let mut path = PathData::new().m(first.x, first.y);
        for p in &self.points[1..] {
            path = path.l(p.x, p.y);
        }
        if self.closed {
            path = path.z();
        }
        path
    }

    fn segments(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        let n = self.points.len();
        let count = if self.closed { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Segment containing parameter `t`, with the local fraction inside it.
    fn locate(&self, t: f64) -> Option<((Coord, Coord), f64)> {
        let total = self.arc_length();
        let last = self.segments().last()?;
        if total == 0.0 {
            return Some((last, 0.0));
        }
        let t = if self.closed { wrap_t(t) } else { t };
        let mut target = t * total;
        let mut segments = self.segments().peekable();
        while let Some(seg) = segments.next() {
            let len = seg.0.distance_to(seg.1);
            if target <= len || segments.peek().is_none() {
                // t below 0 lands here on the first segment and extrapolates
                let local = if len == 0.0 { 0.0 } else { target / len };
                return Some((seg, local));
            }
            target -= len;
        }
        None
    }
}

impl Pathable for Polyline {
    fn point_at(&self, t: f64) -> Coord {
        match self.locate(t) {
            Some(((a, b), local)) => a.lerp(b, local),
            None => self.points.first().copied().unwrap_or_default(),
        }
    }

    fn angle_at(&self, t: f64) -> f64 {
        match self.locate(t) {
            Some(((a, b), _)) => {
                let d = b - a;
                d.y.atan2(d.x).to_degrees()
            }
            None => 0.0,
        }
    }

    fn arc_length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance_to(b)).sum()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn to_svg_path_d(&self) -> String {
        self.path_data().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: Coord, expected: Coord) {
        const EPSILON: f64 = 1e-9;
        assert!(
            actual.approx_eq(expected, EPSILON),
            "point mismatch: {} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn line_midpoint_and_length() {
        let line = Line::new(Coord::new(0.0, 0.0), Coord::new(100.0, 100.0));
        assert_point_eq(line.point_at(0.5), Coord::new(50.0, 50.0));
        assert!((line.arc_length() - 100.0 * 2f64.sqrt()).abs() < 1e-9);
        assert!((line.angle_at(0.0) - 45.0).abs() < 1e-9);
        assert!((line.angle_at(0.9) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn line_extrapolates_beyond_range() {
        let line = Line::new(Coord::new(0.0, 0.0), Coord::new(10.0, 0.0));
        assert_point_eq(line.point_at(2.0), Coord::new(20.0, 0.0));
        assert_point_eq(line.point_at(-1.0), Coord::new(-10.0, 0.0));
    }

    #[test]
    fn curve_endpoints_and_control() {
        let curve = Curve::new(Coord::new(0.0, 0.0), Coord::new(100.0, 0.0), 0.5);
        assert_point_eq(curve.point_at(0.0), curve.start);
        assert_point_eq(curve.point_at(1.0), curve.end);
        // perpendicular of +x is +y (downwards on screen)
        assert_point_eq(curve.control_point(), Coord::new(50.0, 25.0));
        assert_point_eq(curve.point_at(0.5), Coord::new(50.0, 12.5));
    }

    #[test]
    fn flat_curve_matches_line() {
        let start = Coord::new(0.0, 0.0);
        let end = Coord::new(100.0, 100.0);
        let curve = Curve::new(start, end, 0.0);
        let line = Line::new(start, end);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_point_eq(curve.point_at(t), line.point_at(t));
        }
        assert!((curve.arc_length() - line.arc_length()).abs() < 1e-9);
        assert_eq!(curve.to_svg_path_d(), line.to_svg_path_d());
    }

    #[test]
    fn curve_length_matches_polyline() {
        let curve = Curve::new(Coord::new(0.0, 0.0), Coord::new(80.0, 20.0), 0.8);
        let sampled = polyline_length(&curve, 4096);
        assert!((curve.arc_length() - sampled).abs() < 1e-3);
    }

    #[test]
    fn curve_tangent_at_ends() {
        let curve = Curve::new(Coord::new(0.0, 0.0), Coord::new(100.0, 0.0), 1.0);
        // control point at (50, 50): leaves at +45 degrees, arrives at -45
        assert!((curve.angle_at(0.0) - 45.0).abs() < 1e-9);
        assert!((curve.angle_at(1.0) + 45.0).abs() < 1e-9);
    }

    #[test]
    fn curve_bounds_include_bulge() {
        let curve = Curve::new(Coord::new(0.0, 0.0), Coord::new(100.0, 0.0), 1.0);
        let bb = curve.bounds();
        assert!((bb.max.y - 25.0).abs() < 1e-9);
        assert_eq!(bb.min.y, 0.0);
    }

    #[test]
    fn ellipse_cardinal_points() {
        let e = Ellipse::new(Coord::new(0.0, 0.0), 10.0, 5.0);
        assert_point_eq(e.point_at(0.0), Coord::new(10.0, 0.0));
        assert_point_eq(e.point_at(0.25), Coord::new(0.0, -5.0));
        assert_point_eq(e.point_at(0.5), Coord::new(-10.0, 0.0));
        assert_point_eq(e.point_at(0.75), Coord::new(0.0, 5.0));
    }

    #[test]
    fn ellipse_wraps_parameter() {
        let e = Ellipse::new(Coord::new(3.0, 4.0), 10.0, 10.0);
        assert_point_eq(e.point_at(1.0), e.point_at(0.0));
        assert_point_eq(e.point_at(-0.25), e.point_at(0.75));
        assert!(e.is_closed());
    }

    #[test]
    fn rotated_ellipse_start_point() {
        let e = Ellipse::new(Coord::new(5.0, 5.0), 10.0, 4.0).with_rotation(90.0);
        assert_point_eq(e.point_at(0.0), Coord::new(5.0, 15.0));
        let bb = e.bounds();
        assert!((bb.width() - 8.0).abs() < 1e-9);
        assert!((bb.height() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ellipse_angle_query_differs_from_parameter() {
        let e = Ellipse::new(Coord::new(0.0, 0.0), 20.0, 10.0);
        let by_angle = e.point_at_angle(45.0);
        // true 45 degree ray has |x| == |y|
        assert!((by_angle.x.abs() - by_angle.y.abs()).abs() < 1e-9);
        let by_param = e.point_at(0.125);
        assert!((by_param.x.abs() - by_param.y.abs()).abs() > 1.0);
    }

    #[test]
    fn circle_perimeter() {
        let e = Ellipse::new(Coord::ZERO, 10.0, 10.0);
        assert!((e.arc_length() - TAU * 10.0).abs() < 1e-9);
    }

    #[test]
    fn polyline_by_arc_length() {
        let p = Polyline::new(
            vec![Coord::new(0.0, 0.0), Coord::new(10.0, 0.0), Coord::new(10.0, 30.0)],
            false,
        );
        assert_eq!(p.arc_length(), 40.0);
        assert_point_eq(p.point_at(0.25), Coord::new(10.0, 0.0));
        assert_point_eq(p.point_at(0.5), Coord::new(10.0, 10.0));
        assert!((p.angle_at(0.8) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn closed_polyline_wraps() {
        let square = Polyline::new(
            vec![
                Coord::new(0.0, 0.0),
                Coord::new(10.0, 0.0),
                Coord::new(10.0, 10.0),
                Coord::new(0.0, 10.0),
            ],
            true,
        );
        assert_eq!(square.arc_length(), 40.0);
        assert_point_eq(square.point_at(0.875), Coord::new(0.0, 5.0));
        assert_point_eq(square.point_at(1.125), Coord::new(5.0, 0.0));
        assert!(square.to_svg_path_d().ends_with('Z'));
    }
}
