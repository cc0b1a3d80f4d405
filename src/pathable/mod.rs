//! The Pathable protocol: "a position at fraction t along a curve".
//!
//! Only [`Pathable::point_at`] is required. The other queries are provided
//! with numeric fallbacks so any closure or custom type works wherever a
//! curve is accepted; built-in curves override them with closed forms.

mod curves;

use std::fmt;
use std::rc::Rc;

use glam::DAffine2;

use crate::render::bezier::{SampleRange, fit_cubic_path};
use crate::render::defaults;
use crate::types::Coord;

pub use curves::{Curve, Ellipse, Line, Polyline};

/// Anything with a position at each parameter value.
pub trait Pathable {
    /// Position at parameter `t`, nominally in [0,1].
    fn point_at(&self, t: f64) -> Coord;

    /// Tangent direction at `t`, in degrees (clockwise on screen from +x).
    ///
    /// Falls back to a central difference of `point_at`.
    fn angle_at(&self, t: f64) -> f64 {
        numeric_angle_at(self, t)
    }

    /// Total length. Falls back to summing a sampled polyline.
    fn arc_length(&self) -> f64 {
        polyline_length(self, defaults::ARC_LENGTH_SAMPLES)
    }

    /// Whether `t = 0` and `t = 1` coincide.
    fn is_closed(&self) -> bool {
        false
    }

    /// SVG path data for the whole curve.
    ///
    /// Falls back to cubic-Bezier fitting over sampled points.
    fn to_svg_path_d(&self) -> String {
        let range = SampleRange::full().with_segments(defaults::SEGMENTS);
        fit_cubic_path(self, range, self.is_closed()).to_string()
    }
}

/// Central-difference tangent angle in degrees.
pub fn numeric_angle_at<P: Pathable + ?Sized>(path: &P, t: f64) -> f64 {
    const H: f64 = 1e-4;
    let d = path.point_at(t + H) - path.point_at(t - H);
    if d.length() == 0.0 {
        return 0.0;
    }
    d.y.atan2(d.x).to_degrees()
}

/// Length of the polyline through `samples + 1` evenly spaced parameters.
pub fn polyline_length<P: Pathable + ?Sized>(path: &P, samples: usize) -> f64 {
    let samples = samples.max(1);
    let mut total = 0.0;
    let mut prev = path.point_at(0.0);
    for i in 1..=samples {
        let p = path.point_at(i as f64 / samples as f64);
        total += prev.distance_to(p);
        prev = p;
    }
    total
}

/// Wrap a parameter into [0,1) for closed curves.
pub(crate) fn wrap_t(t: f64) -> f64 {
    t.rem_euclid(1.0)
}

impl<P: Pathable + ?Sized> Pathable for &P {
    fn point_at(&self, t: f64) -> Coord {
        (**self).point_at(t)
    }
    fn angle_at(&self, t: f64) -> f64 {
        (**self).angle_at(t)
    }
    fn arc_length(&self) -> f64 {
        (**self).arc_length()
    }
    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
    fn to_svg_path_d(&self) -> String {
        (**self).to_svg_path_d()
    }
}

impl<P: Pathable + ?Sized> Pathable for Rc<P> {
    fn point_at(&self, t: f64) -> Coord {
        (**self).point_at(t)
    }
    fn angle_at(&self, t: f64) -> f64 {
        (**self).angle_at(t)
    }
    fn arc_length(&self) -> f64 {
        (**self).arc_length()
    }
    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
    fn to_svg_path_d(&self) -> String {
        (**self).to_svg_path_d()
    }
}

/// A curve defined by a closure, e.g. a spiral or Lissajous figure.
///
/// Closed parametric curves wrap `t` modulo 1; open ones pass it through.
#[derive(Clone)]
pub struct Parametric {
    f: Rc<dyn Fn(f64) -> Coord>,
    closed: bool,
}

impl Parametric {
    pub fn new(f: impl Fn(f64) -> Coord + 'static) -> Self {
        Self { f: Rc::new(f), closed: false }
    }

    /// Mark the curve as closed (`point_at(0) == point_at(1)`).
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Sine wave over the unit chord (0,0)→(1,0), a common connection template.
    pub fn wave(cycles: f64, amplitude: f64) -> Self {
        Self::new(move |t| {
            Coord::new(t, amplitude * (t * cycles * std::f64::consts::TAU).sin())
        })
    }
}

impl fmt::Debug for Parametric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parametric").field("closed", &self.closed).finish_non_exhaustive()
    }
}

impl Pathable for Parametric {
    fn point_at(&self, t: f64) -> Coord {
        let t = if self.closed { wrap_t(t) } else { t };
        (self.f)(t)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A curve seen through an affine map, optionally over a parameter sub-range.
///
/// `point_at(0)` and `point_at(1)` land on the mapped ends of the sub-range,
/// so a partial arc re-parametrises to [0,1].
#[derive(Clone)]
pub struct Mapped<P> {
    inner: P,
    map: DAffine2,
    start_t: f64,
    end_t: f64,
}

impl<P: Pathable> Mapped<P> {
    pub fn new(inner: P, map: DAffine2) -> Self {
        Self { inner, map, start_t: 0.0, end_t: 1.0 }
    }

    pub fn sub_range(mut self, start_t: f64, end_t: f64) -> Self {
        self.start_t = start_t;
        self.end_t = end_t;
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn map(&self) -> DAffine2 {
        self.map
    }

    /// Compose another map on the outside.
    pub fn then(mut self, outer: DAffine2) -> Self {
        self.map = outer * self.map;
        self
    }

    fn param(&self, t: f64) -> f64 {
        self.start_t + (self.end_t - self.start_t) * t
    }
}

impl<P> fmt::Debug for Mapped<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapped")
            .field("map", &self.map)
            .field("start_t", &self.start_t)
            .field("end_t", &self.end_t)
            .finish_non_exhaustive()
    }
}

impl<P: Pathable> Pathable for Mapped<P> {
    fn point_at(&self, t: f64) -> Coord {
        let p = self.inner.point_at(self.param(t));
        Coord::from_dvec2(self.map.transform_point2(p.to_dvec2()))
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed() && self.start_t == 0.0 && self.end_t == 1.0
    }
}
