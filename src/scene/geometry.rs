//! Resolved geometry: what a shape looks like once every relative attribute
//! has been turned into absolute coordinates.
//!
//! The same [`Geometry`] type serves for model space (straight out of the
//! resolver) and world space (after [`Geometry::transformed`]).

use std::rc::Rc;

use glam::DAffine2;

use super::transform::{Transform, apply};
use crate::pathable::{Curve, Ellipse, Line, Mapped, Pathable, Polyline};
use crate::render::bezier::{SampleRange, fit_cubic_path, sample_points};
use crate::render::svg::{ObjectStyle, PathData, circle_element, path_element};
use crate::types::{BBox, Coord, RelCoord};

/// A parallelogram spanned from `origin` by `u` (local +x) and `v` (local +y).
///
/// Relative anchors resolve here, so `(1, 0.5)` is a rotated rectangle's own
/// right edge rather than the right edge of its axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub origin: Coord,
    pub u: Coord,
    pub v: Coord,
}

impl LocalFrame {
    pub fn from_bbox(b: &BBox) -> Self {
        Self {
            origin: b.min,
            u: Coord::new(b.width(), 0.0),
            v: Coord::new(0.0, b.height()),
        }
    }

    pub fn resolve(&self, rel: RelCoord) -> Coord {
        self.origin + self.u * rel.x + self.v * rel.y
    }

    pub fn center(&self) -> Coord {
        self.resolve(RelCoord::new(0.5, 0.5))
    }

    pub fn width(&self) -> f64 {
        self.u.length()
    }

    pub fn height(&self) -> f64 {
        self.v.length()
    }

    /// Direction of the local +x axis in degrees.
    pub fn angle(&self) -> f64 {
        if self.u == Coord::ZERO {
            0.0
        } else {
            self.u.y.atan2(self.u.x).to_degrees()
        }
    }

    pub fn mapped(&self, m: &DAffine2) -> Self {
        Self {
            origin: apply(m, self.origin),
            u: Coord::from_dvec2(m.transform_vector2(self.u.to_dvec2())),
            v: Coord::from_dvec2(m.transform_vector2(self.v.to_dvec2())),
        }
    }
}

/// The drawable outline of a resolved shape.
#[derive(Debug, Clone)]
pub enum Outline {
    /// Corners in order top-left, top-right, bottom-right, bottom-left
    Rect([Coord; 4]),
    Ellipse(Ellipse),
    Dot { center: Coord, radius: f64 },
    Line(Line),
    Curve(Curve),
    /// `linked[i]` marks vertices read through another entity; transforms skip them
    Polygon { vertices: Vec<Coord>, linked: Vec<bool> },
    Path { path: Mapped<Rc<dyn Pathable>>, closed: bool, segments: usize },
}

/// Resolved outline plus the frame and pivot its queries need.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub kind: &'static str,
    pub outline: Outline,
    pub local: LocalFrame,
    /// The natural rotation pivot (centroid, chord midpoint, box center)
    pub pivot: Coord,
}

impl Geometry {
    /// Apply an entity's accumulated rotation and scale about its pivot.
    pub fn transformed(&self, transform: &Transform) -> Geometry {
        if transform.is_identity() {
            return self.clone();
        }
        let m = transform.affine(self.pivot);
        let map = |p: Coord| apply(&m, p);
        let outline = match &self.outline {
            Outline::Rect(corners) => Outline::Rect(corners.map(map)),
            Outline::Ellipse(e) => Outline::Ellipse(Ellipse {
                center: map(e.center),
                rx: e.rx * transform.scale,
                ry: e.ry * transform.scale,
                rotation: e.rotation + transform.rotation,
            }),
            Outline::Dot { center, radius } => Outline::Dot {
                center: map(*center),
                radius: radius * transform.scale,
            },
            Outline::Line(l) => Outline::Line(Line::new(map(l.start), map(l.end))),
            // a similarity map of a curvature curve is the curvature curve of the mapped chord
            Outline::Curve(c) => Outline::Curve(Curve::new(map(c.start), map(c.end), c.curvature)),
            Outline::Polygon { vertices, linked } => Outline::Polygon {
                vertices: vertices
                    .iter()
                    .zip(linked)
                    .map(|(p, linked)| if *linked { *p } else { map(*p) })
                    .collect(),
                linked: linked.clone(),
            },
            Outline::Path { path, closed, segments } => Outline::Path {
                path: path.clone().then(m),
                closed: *closed,
                segments: *segments,
            },
        };
        Geometry {
            kind: self.kind,
            outline,
            local: self.local.mapped(&m),
            pivot: self.pivot,
        }
    }

    /// Axis-aligned bounds of the outline.
    pub fn bounds(&self) -> BBox {
        match &self.outline {
            Outline::Rect(corners) => BBox::from_points(*corners),
            Outline::Ellipse(e) => e.bounds(),
            Outline::Dot { center, radius } => BBox::from_center_size(*center, radius * 2.0, radius * 2.0),
            Outline::Line(l) => BBox::from_points([l.start, l.end]),
            Outline::Curve(c) => c.bounds(),
            Outline::Polygon { vertices, .. } => BBox::from_points(vertices.iter().copied()),
            Outline::Path { path, segments, .. } => {
                BBox::from_points(sample_points(path, SampleRange::full().with_segments(*segments)))
            }
        }
    }

    /// The outline as a parametric curve, if it has one.
    pub fn path(&self) -> Option<EntityPath> {
        match &self.outline {
            Outline::Rect(_) | Outline::Dot { .. } => None,
            Outline::Ellipse(e) => Some(EntityPath::Ellipse(*e)),
            Outline::Line(l) => Some(EntityPath::Line(*l)),
            Outline::Curve(c) => Some(EntityPath::Curve(*c)),
            Outline::Polygon { vertices, .. } => {
                Some(EntityPath::Polyline(Polyline::new(vertices.clone(), true)))
            }
            Outline::Path { path, .. } => Some(EntityPath::Path(path.clone())),
        }
    }

    /// Path data for everything except dots, which render as circles.
    pub fn path_data(&self) -> Option<PathData> {
        let data = match &self.outline {
            Outline::Rect(c) => PathData::new()
                .m(c[0].x, c[0].y)
                .l(c[1].x, c[1].y)
                .l(c[2].x, c[2].y)
                .l(c[3].x, c[3].y)
                .z(),
            Outline::Ellipse(e) => e.path_data(),
            Outline::Dot { .. } => return None,
            Outline::Line(l) => l.path_data(),
            Outline::Curve(c) => c.path_data(),
            Outline::Polygon { vertices, .. } => Polyline::new(vertices.clone(), true).path_data(),
            Outline::Path { path, closed, segments } => {
                fit_cubic_path(path, SampleRange::full().with_segments(*segments), *closed)
            }
        };
        Some(data)
    }

    /// SVG markup for this outline; empty when the style is invisible.
    pub fn render(&self, style: &ObjectStyle, sig_figs: i32) -> String {
        if style.invisible {
            return String::new();
        }
        if let Outline::Dot { center, radius } = &self.outline {
            let mut dot_style = style.clone();
            if dot_style.fill == "none" {
                dot_style.fill = dot_style.stroke.clone();
            }
            return circle_element(*center, *radius, &dot_style, sig_figs);
        }
        match self.path_data() {
            Some(data) => path_element(&data.to_string_with(sig_figs), style, sig_figs),
            None => String::new(),
        }
    }
}

/// World-space curve of an entity, returned by the scene's path queries.
#[derive(Debug, Clone)]
pub enum EntityPath {
    Line(Line),
    Curve(Curve),
    Ellipse(Ellipse),
    Polyline(Polyline),
    Path(Mapped<Rc<dyn Pathable>>),
}

macro_rules! delegate {
    ($self:ident, $p:ident => $e:expr) => {
        match $self {
            EntityPath::Line($p) => $e,
            EntityPath::Curve($p) => $e,
            EntityPath::Ellipse($p) => $e,
            EntityPath::Polyline($p) => $e,
            EntityPath::Path($p) => $e,
        }
    };
}

impl Pathable for EntityPath {
    fn point_at(&self, t: f64) -> Coord {
        delegate!(self, p => p.point_at(t))
    }

    fn angle_at(&self, t: f64) -> f64 {
        delegate!(self, p => p.angle_at(t))
    }

    fn arc_length(&self) -> f64 {
        delegate!(self, p => p.arc_length())
    }

    fn is_closed(&self) -> bool {
        delegate!(self, p => p.is_closed())
    }

    fn to_svg_path_d(&self) -> String {
        delegate!(self, p => p.to_svg_path_d())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: Coord, expected: Coord) {
        const EPSILON: f64 = 1e-9;
        assert!(actual.approx_eq(expected, EPSILON), "expected {expected}, got {actual}");
    }

    fn square() -> Geometry {
        let b = BBox::from_origin_size(Coord::new(0.0, 0.0), 10.0, 10.0);
        Geometry {
            kind: "rect",
            outline: Outline::Rect([
                Coord::new(0.0, 0.0),
                Coord::new(10.0, 0.0),
                Coord::new(10.0, 10.0),
                Coord::new(0.0, 10.0),
            ]),
            local: LocalFrame::from_bbox(&b),
            pivot: b.center(),
        }
    }

    #[test]
    fn rotated_square_bounds_grow() {
        let world = square().transformed(&Transform { rotation: 45.0, scale: 1.0 });
        let bb = world.bounds();
        let diag = 10.0 * 2f64.sqrt();
        assert!((bb.width() - diag).abs() < 1e-9);
        assert_point_eq(bb.center(), Coord::new(5.0, 5.0));
    }

    #[test]
    fn local_frame_follows_rotation() {
        let world = square().transformed(&Transform { rotation: 90.0, scale: 1.0 });
        // the local right edge now faces down
        assert_point_eq(world.local.resolve(RelCoord::new(1.0, 0.5)), Coord::new(5.0, 10.0));
        assert!((world.local.angle() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn linked_polygon_vertices_ignore_transforms() {
        let geom = Geometry {
            kind: "polygon",
            outline: Outline::Polygon {
                vertices: vec![Coord::new(0.0, 0.0), Coord::new(10.0, 0.0), Coord::new(50.0, 50.0)],
                linked: vec![false, false, true],
            },
            local: LocalFrame::from_bbox(&BBox::from_origin_size(Coord::ZERO, 10.0, 0.0)),
            pivot: Coord::new(5.0, 0.0),
        };
        let world = geom.transformed(&Transform { rotation: 0.0, scale: 2.0 });
        let Outline::Polygon { vertices, .. } = &world.outline else {
            panic!("polygon expected");
        };
        assert_point_eq(vertices[0], Coord::new(-5.0, 0.0));
        assert_point_eq(vertices[1], Coord::new(15.0, 0.0));
        assert_eq!(vertices[2], Coord::new(50.0, 50.0));
    }

    #[test]
    fn rect_markup() {
        let out = square().render(&ObjectStyle::default(), 6);
        insta::assert_snapshot!(out, @r###"<path d="M0,0 L10,0 L10,10 L0,10 Z" fill="none" stroke="black" stroke-width="1"/>"###);
    }
}
