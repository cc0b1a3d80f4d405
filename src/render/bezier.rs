//! Cubic-Bezier fitting of arbitrary parametric curves
//!
//! Any [`Pathable`] is emitted by sampling `point_at` evenly over a parameter
//! range and threading Catmull-Rom cubics through the samples. A sub-range
//! gives a true partial arc of the underlying curve.

use super::defaults;
use super::svg::PathData;
use crate::pathable::Pathable;
use crate::types::Coord;

/// Parameter interval and sampling density for a fitted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRange {
    pub start_t: f64,
    pub end_t: f64,
    pub segments: usize,
}

impl Default for SampleRange {
    fn default() -> Self {
        Self::full()
    }
}

impl SampleRange {
    /// The whole curve, `0..1`.
    pub fn full() -> Self {
        Self { start_t: 0.0, end_t: 1.0, segments: defaults::SEGMENTS }
    }

    pub fn new(start_t: f64, end_t: f64) -> Self {
        Self { start_t, end_t, segments: defaults::SEGMENTS }
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn is_full(&self) -> bool {
        self.start_t == 0.0 && self.end_t == 1.0
    }

    /// The `segments + 1` parameter values, endpoints included.
    pub fn params(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.segments.max(1);
        (0..=n).map(move |i| self.start_t + (self.end_t - self.start_t) * i as f64 / n as f64)
    }
}

/// Sample `path` at every parameter of `range`.
pub fn sample_points<P: Pathable + ?Sized>(path: &P, range: SampleRange) -> Vec<Coord> {
    range.params().map(|t| path.point_at(t)).collect()
}

/// One cubic segment: start, two control points, end.
pub type CubicSegment = (Coord, Coord, Coord, Coord);

/// Catmull-Rom spline through `points` as cubic-Bezier segments.
///
/// Open input duplicates its endpoints for the missing neighbours. With
/// `cyclic`, the last point joins back to the first and neighbours wrap.
pub fn catmull_rom_cubics(points: &[Coord], tension: f64, cyclic: bool) -> Vec<CubicSegment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let get = |i: isize| -> Coord {
        let n = n as isize;
        let idx = if cyclic { i.rem_euclid(n) } else { i.clamp(0, n - 1) };
        points[idx as usize]
    };

    let count = if cyclic { n } else { n - 1 };
    (0..count as isize)
        .map(|i| {
            let p0 = get(i - 1);
            let p1 = get(i);
            let p2 = get(i + 1);
            let p3 = get(i + 2);
            let cp1 = p1 + (p2 - p0) * (tension / 3.0);
            let cp2 = p2 - (p3 - p1) * (tension / 3.0);
            (p1, cp1, cp2, p2)
        })
        .collect()
}

/// Fit `path` over `range` as cubic path data.
///
/// When `closed` is set the path ends with `Z`. A closed curve sampled over
/// its full range is treated as cyclic so the seam stays smooth.
pub fn fit_cubic_path<P: Pathable + ?Sized>(path: &P, range: SampleRange, closed: bool) -> PathData {
    let mut points = sample_points(path, range);
    let cyclic = closed && path.is_closed() && range.is_full() && points.len() > 2;
    if cyclic {
        // last sample duplicates the first
        points.pop();
    }

    let Some(first) = points.first().copied() else {
        return PathData::new();
    };
    let mut data = PathData::new().m(first.x, first.y);
    for (_, c1, c2, to) in catmull_rom_cubics(&points, defaults::FIT_TENSION, cyclic) {
        data = data.c(c1, c2, to);
    }
    if closed {
        data = data.z();
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathable::{Ellipse, Line};
    use crate::render::svg::PathCommand;

    fn assert_point_eq(actual: Coord, expected: Coord) {
        const EPSILON: f64 = 1e-9;
        assert!(
            actual.approx_eq(expected, EPSILON),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn params_cover_the_range() {
        let params: Vec<f64> = SampleRange::new(0.25, 0.75).with_segments(2).params().collect();
        assert_eq!(params, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn straight_line_fits_collinear_controls() {
        let line = Line::new(Coord::new(0.0, 0.0), Coord::new(90.0, 0.0));
        let data = fit_cubic_path(&line, SampleRange::full().with_segments(3), false);
        assert_eq!(data.commands().len(), 4);
        for cmd in data.commands() {
            if let PathCommand::CubicTo(c1, c2, to) = cmd {
                assert_eq!(c1.y, 0.0);
                assert_eq!(c2.y, 0.0);
                assert_eq!(to.y, 0.0);
            }
        }
    }

    #[test]
    fn partial_range_is_a_true_arc() {
        let e = Ellipse::new(Coord::new(0.0, 0.0), 10.0, 10.0);
        let data = fit_cubic_path(&e, SampleRange::new(0.0, 0.25).with_segments(8), false);
        let cmds = data.commands();
        assert_eq!(cmds[0], PathCommand::MoveTo(e.point_at(0.0)));
        match cmds.last() {
            Some(PathCommand::CubicTo(_, _, end)) => assert_point_eq(*end, Coord::new(0.0, -10.0)),
            other => panic!("expected a cubic, got {other:?}"),
        }
    }

    #[test]
    fn closed_full_range_is_cyclic() {
        let e = Ellipse::new(Coord::new(0.0, 0.0), 10.0, 5.0);
        let data = fit_cubic_path(&e, SampleRange::full().with_segments(16), true);
        let cmds = data.commands();
        // M + 16 cubics + Z
        assert_eq!(cmds.len(), 18);
        assert_eq!(cmds.last(), Some(&PathCommand::Close));
        match cmds[16] {
            PathCommand::CubicTo(_, _, end) => assert_point_eq(end, e.point_at(0.0)),
            other => panic!("expected a cubic, got {other:?}"),
        }
    }

    #[test]
    fn catmull_rom_passes_through_samples() {
        let pts = [Coord::new(0.0, 0.0), Coord::new(10.0, 5.0), Coord::new(20.0, 0.0)];
        let segs = catmull_rom_cubics(&pts, 0.5, false);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].0, pts[0]);
        assert_eq!(segs[0].3, pts[1]);
        assert_eq!(segs[1].3, pts[2]);
        // tangent at the middle sample is parallel to the outer chord
        let out = segs[1].1 - pts[1];
        assert!((out.y).abs() < 1e-12);
    }
}
