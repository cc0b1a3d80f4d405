//! Shape types stored in a scene
//!
//! Each shape is its own type that knows how to:
//! - Resolve its relative attributes against a frame into [`Geometry`]
//! - Freeze and shift its positional attributes when the entity is moved

use std::fmt;
use std::rc::Rc;

use enum_dispatch::enum_dispatch;
use glam::DAffine2;

use super::EntityId;
use super::anchor::{AnchorSpec, centroid};
use super::geometry::{Geometry, LocalFrame, Outline};
use super::resolve::{Extent, Placement, Resolver};
use crate::errors::Result;
use crate::pathable::{Curve, Ellipse, Line, Mapped, Pathable};
use crate::render::bezier::{SampleRange, sample_points};
use crate::render::defaults;
use crate::types::{BBox, Coord, RelCoord};

/// Common behavior for all shapes
#[enum_dispatch]
pub trait Shape {
    /// Short type name used in diagnostics
    fn kind(&self) -> &'static str;

    /// Model-space geometry with relative attributes resolved against `frame`.
    fn resolve(&self, frame: &BBox, cx: &mut Resolver<'_>) -> Result<Geometry>;

    /// Freeze positional attributes against `frame` and shift them by `delta`.
    ///
    /// Returns whether any relative position was frozen.
    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool;
}

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned rectangle in model space, positioned by its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub origin: Placement,
    pub width: Extent,
    pub height: Extent,
}

impl RectShape {
    pub fn new(origin: impl Into<Placement>, width: Extent, height: Extent) -> Self {
        Self { origin: origin.into(), width, height }
    }

    /// Corner and size both as fractions of the frame.
    pub fn relative(origin: RelCoord, size: RelCoord) -> Self {
        Self::new(origin, Extent::Relative(size.x), Extent::Relative(size.y))
    }

    pub fn absolute(origin: Coord, width: f64, height: f64) -> Self {
        Self::new(origin, Extent::Absolute(width), Extent::Absolute(height))
    }
}

impl Shape for RectShape {
    fn kind(&self) -> &'static str {
        "rect"
    }

    fn resolve(&self, frame: &BBox, _cx: &mut Resolver<'_>) -> Result<Geometry> {
        let b = BBox::from_origin_size(
            self.origin.resolve(frame),
            self.width.resolve(frame.width()),
            self.height.resolve(frame.height()),
        );
        Ok(Geometry {
            kind: self.kind(),
            outline: Outline::Rect([
                b.min,
                Coord::new(b.max.x, b.min.y),
                b.max,
                Coord::new(b.min.x, b.max.y),
            ]),
            local: LocalFrame::from_bbox(&b),
            pivot: b.center(),
        })
    }

    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool {
        self.origin.shift(delta, frame)
    }
}

// ============================================================================
// Ellipse
// ============================================================================

/// Ellipse by center and radii; relative radii are fractions of the frame's
/// width (`rx`) and height (`ry`).
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseShape {
    pub center: Placement,
    pub rx: Extent,
    pub ry: Extent,
}

impl EllipseShape {
    pub fn new(center: impl Into<Placement>, rx: Extent, ry: Extent) -> Self {
        Self { center: center.into(), rx, ry }
    }

    pub fn absolute(center: Coord, rx: f64, ry: f64) -> Self {
        Self::new(center, Extent::Absolute(rx), Extent::Absolute(ry))
    }

    pub fn circle(center: impl Into<Placement>, radius: f64) -> Self {
        Self::new(center, Extent::Absolute(radius), Extent::Absolute(radius))
    }
}

impl Shape for EllipseShape {
    fn kind(&self) -> &'static str {
        "ellipse"
    }

    fn resolve(&self, frame: &BBox, _cx: &mut Resolver<'_>) -> Result<Geometry> {
        let c = self.center.resolve(frame);
        let e = Ellipse::new(c, self.rx.resolve(frame.width()), self.ry.resolve(frame.height()));
        Ok(Geometry {
            kind: self.kind(),
            outline: Outline::Ellipse(e),
            local: LocalFrame::from_bbox(&BBox::from_center_size(c, e.rx * 2.0, e.ry * 2.0)),
            pivot: c,
        })
    }

    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool {
        self.center.shift(delta, frame)
    }
}

// ============================================================================
// Dot
// ============================================================================

/// A movable point, drawn as a small filled circle.
///
/// The usual target for reactive polygon vertices and connection endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct DotShape {
    pub center: Placement,
    /// Absolute radius
    pub radius: f64,
}

impl DotShape {
    pub fn new(center: impl Into<Placement>) -> Self {
        Self { center: center.into(), radius: defaults::DOT_RADIUS }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

impl Shape for DotShape {
    fn kind(&self) -> &'static str {
        "dot"
    }

    fn resolve(&self, frame: &BBox, _cx: &mut Resolver<'_>) -> Result<Geometry> {
        let c = self.center.resolve(frame);
        let d = self.radius * 2.0;
        Ok(Geometry {
            kind: self.kind(),
            outline: Outline::Dot { center: c, radius: self.radius },
            local: LocalFrame::from_bbox(&BBox::from_center_size(c, d, d)),
            pivot: c,
        })
    }

    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool {
        self.center.shift(delta, frame)
    }
}

// ============================================================================
// Line and curve
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub start: Placement,
    pub end: Placement,
}

impl LineShape {
    pub fn new(start: impl Into<Placement>, end: impl Into<Placement>) -> Self {
        Self { start: start.into(), end: end.into() }
    }
}

impl Shape for LineShape {
    fn kind(&self) -> &'static str {
        "line"
    }

    fn resolve(&self, frame: &BBox, _cx: &mut Resolver<'_>) -> Result<Geometry> {
        let l = Line::new(self.start.resolve(frame), self.end.resolve(frame));
        Ok(Geometry {
            kind: self.kind(),
            outline: Outline::Line(l),
            local: LocalFrame::from_bbox(&BBox::from_points([l.start, l.end])),
            pivot: l.start.midpoint(l.end),
        })
    }

    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool {
        let a = self.start.shift(delta, frame);
        let b = self.end.shift(delta, frame);
        a || b
    }
}

/// Quadratic curve controlled by a scalar curvature (see [`Curve`]).
#[derive(Debug, Clone, PartialEq)]
pub struct CurveShape {
    pub start: Placement,
    pub end: Placement,
    pub curvature: f64,
}

impl CurveShape {
    pub fn new(start: impl Into<Placement>, end: impl Into<Placement>, curvature: f64) -> Self {
        Self { start: start.into(), end: end.into(), curvature }
    }
}

impl Shape for CurveShape {
    fn kind(&self) -> &'static str {
        "curve"
    }

    fn resolve(&self, frame: &BBox, _cx: &mut Resolver<'_>) -> Result<Geometry> {
        let c = Curve::new(self.start.resolve(frame), self.end.resolve(frame), self.curvature);
        Ok(Geometry {
            kind: self.kind(),
            outline: Outline::Curve(c),
            local: LocalFrame::from_bbox(&c.bounds()),
            pivot: c.start.midpoint(c.end),
        })
    }

    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool {
        let a = self.start.shift(delta, frame);
        let b = self.end.shift(delta, frame);
        a || b
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// One polygon vertex: a stored position, or a live read through another
/// entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Vertex {
    At(Placement),
    /// The center of a point-like entity (usually a [`DotShape`])
    Point(EntityId),
    /// A named or relative anchor on another entity
    Anchored(EntityId, AnchorSpec),
}

impl From<Coord> for Vertex {
    fn from(p: Coord) -> Self {
        Vertex::At(p.into())
    }
}

impl From<RelCoord> for Vertex {
    fn from(rel: RelCoord) -> Self {
        Vertex::At(rel.into())
    }
}

impl From<EntityId> for Vertex {
    fn from(id: EntityId) -> Self {
        Vertex::Point(id)
    }
}

impl From<(EntityId, &str)> for Vertex {
    fn from((id, name): (EntityId, &str)) -> Self {
        Vertex::Anchored(id, name.into())
    }
}

/// Closed polygon mixing stored and reactive vertices.
///
/// Reactive vertices are re-read from their entities on every query, and
/// the polygon's own rotation and scale never move them.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub vertices: Vec<Vertex>,
}

impl PolygonShape {
    pub fn new<V: Into<Vertex>>(vertices: impl IntoIterator<Item = V>) -> Self {
        Self { vertices: vertices.into_iter().map(Into::into).collect() }
    }
}

impl Shape for PolygonShape {
    fn kind(&self) -> &'static str {
        "polygon"
    }

    fn resolve(&self, frame: &BBox, cx: &mut Resolver<'_>) -> Result<Geometry> {
        let mut vertices = Vec::with_capacity(self.vertices.len());
        let mut linked = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            let (p, is_linked) = match v {
                Vertex::At(p) => (p.resolve(frame), false),
                Vertex::Point(id) => (cx.linked_anchor(*id, &AnchorSpec::center())?, true),
                Vertex::Anchored(id, spec) => (cx.linked_anchor(*id, spec)?, true),
            };
            vertices.push(p);
            linked.push(is_linked);
        }

        let own: Vec<Coord> = vertices
            .iter()
            .zip(&linked)
            .filter(|(_, linked)| !**linked)
            .map(|(p, _)| *p)
            .collect();
        let pivot = centroid(&own)
            .or_else(|| centroid(&vertices))
            .unwrap_or_else(|| frame.center());

        Ok(Geometry {
            kind: self.kind(),
            local: LocalFrame::from_bbox(&BBox::from_points(vertices.iter().copied())),
            outline: Outline::Polygon { vertices, linked },
            pivot,
        })
    }

    fn translate(&mut self, delta: Coord, frame: &BBox) -> bool {
        let mut froze = false;
        for v in &mut self.vertices {
            if let Vertex::At(p) = v {
                froze |= p.shift(delta, frame);
            }
        }
        froze
    }
}

// ============================================================================
// Path
// ============================================================================

/// Any [`Pathable`] drawn over a parameter range as fitted cubics.
///
/// The source curve is in absolute coordinates; moving the entity adds an
/// offset rather than touching the curve.
#[derive(Clone)]
pub struct PathShape {
    pub path: Rc<dyn Pathable>,
    pub range: SampleRange,
    pub closed: bool,
    pub offset: Coord,
}

impl PathShape {
    pub fn new(path: impl Pathable + 'static) -> Self {
        Self::from_rc(Rc::new(path))
    }

    pub fn from_rc(path: Rc<dyn Pathable>) -> Self {
        let closed = path.is_closed();
        Self { path, range: SampleRange::full(), closed, offset: Coord::ZERO }
    }

    /// Draw only `start_t..end_t` of the source curve.
    pub fn with_range(mut self, start_t: f64, end_t: f64) -> Self {
        self.range = SampleRange { start_t, end_t, ..self.range };
        self
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.range.segments = segments.max(1);
        self
    }

    /// Join the last sample back to the first (and allow a fill).
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    fn mapped(&self) -> Mapped<Rc<dyn Pathable>> {
        Mapped::new(Rc::clone(&self.path), DAffine2::from_translation(self.offset.to_dvec2()))
            .sub_range(self.range.start_t, self.range.end_t)
    }
}

impl fmt::Debug for PathShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathShape")
            .field("range", &self.range)
            .field("closed", &self.closed)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl Shape for PathShape {
    fn kind(&self) -> &'static str {
        "path"
    }

    fn resolve(&self, _frame: &BBox, _cx: &mut Resolver<'_>) -> Result<Geometry> {
        let path = self.mapped();
        let segments = self.range.segments;
        let b = BBox::from_points(sample_points(&path, SampleRange::full().with_segments(segments)));
        Ok(Geometry {
            kind: self.kind(),
            outline: Outline::Path { path, closed: self.closed, segments },
            local: LocalFrame::from_bbox(&b),
            pivot: b.center(),
        })
    }

    fn translate(&mut self, delta: Coord, _frame: &BBox) -> bool {
        self.offset += delta;
        false
    }
}

// ============================================================================
// Shape Enum
// ============================================================================

/// A shape enum wrapping all shape types
///
/// This provides uniform storage in the entity arena while each variant
/// holds shape-specific attributes.
#[enum_dispatch(Shape)]
#[derive(Debug, Clone)]
pub enum ShapeEnum {
    RectShape,
    EllipseShape,
    DotShape,
    LineShape,
    CurveShape,
    PolygonShape,
    PathShape,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn resolve(shape: &ShapeEnum, frame: &BBox) -> Geometry {
        let scene = Scene::new(100.0, 100.0);
        let mut cx = scene.resolver();
        shape.resolve(frame, &mut cx).unwrap()
    }

    #[test]
    fn relative_rect_follows_frame() {
        let shape: ShapeEnum = RectShape::relative(RelCoord::new(0.1, 0.2), RelCoord::new(0.5, 0.5)).into();
        let small = resolve(&shape, &BBox::from_origin_size(Coord::ZERO, 100.0, 100.0));
        let large = resolve(&shape, &BBox::from_origin_size(Coord::ZERO, 200.0, 100.0));
        assert_eq!(small.bounds(), BBox::from_origin_size(Coord::new(10.0, 20.0), 50.0, 50.0));
        assert_eq!(large.bounds(), BBox::from_origin_size(Coord::new(20.0, 20.0), 100.0, 50.0));
    }

    #[test]
    fn translate_freezes_position_not_size() {
        let frame = BBox::from_origin_size(Coord::ZERO, 100.0, 100.0);
        let mut shape = RectShape::relative(RelCoord::new(0.5, 0.5), RelCoord::new(0.1, 0.1));
        assert!(shape.translate(Coord::new(5.0, 0.0), &frame));
        assert_eq!(shape.origin, Placement::Absolute(Coord::new(55.0, 50.0)));
        assert_eq!(shape.width, Extent::Relative(0.1));
    }

    #[test]
    fn polygon_pivot_is_centroid() {
        let shape: ShapeEnum = PolygonShape::new([
            Coord::new(0.0, 0.0),
            Coord::new(30.0, 0.0),
            Coord::new(0.0, 30.0),
        ])
        .into();
        let geom = resolve(&shape, &BBox::from_origin_size(Coord::ZERO, 100.0, 100.0));
        assert_eq!(geom.pivot, Coord::new(10.0, 10.0));
        assert_eq!(shape.kind(), "polygon");
    }

    #[test]
    fn path_shape_sub_range() {
        let e = Ellipse::new(Coord::new(50.0, 50.0), 10.0, 10.0);
        let shape: ShapeEnum = PathShape::new(e).with_range(0.0, 0.5).with_segments(8).into();
        let geom = resolve(&shape, &BBox::from_origin_size(Coord::ZERO, 100.0, 100.0));
        let b = geom.bounds();
        // upper half only
        assert!(b.max.y <= 50.0 + 1e-9);
        assert!((b.min.y - 40.0).abs() < 1e-9);
    }
}
