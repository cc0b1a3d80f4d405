//! Live connections between entities and surfaces
//!
//! A [`Connection`] stores endpoint references, never coordinates. Each query
//! re-resolves both anchors and builds a fresh [`ConnectionPath`], so moving
//! an endpoint entity is visible on the very next query.

use std::fmt;
use std::rc::Rc;

use glam::{DAffine2, dvec2};

use super::anchor::AnchorSpec;
use super::{ConnectionId, EntityId, Scene};
use crate::caps;
use crate::errors::{Result, SceneError};
use crate::log::{debug, warn};
use crate::pathable::{Curve, Line, Mapped, Pathable};
use crate::render::bezier::{SampleRange, fit_cubic_path};
use crate::render::defaults;
use crate::render::svg::{ObjectStyle, PathData, path_element, polygon_element};
use crate::types::{BBox, Coord};

/// Something a connection can attach to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Entity(EntityId),
    Canvas,
    /// A surface rectangle such as a grid cell
    Region(BBox),
}

impl Endpoint {
    /// Attach at a specific anchor instead of the center.
    pub fn at(self, anchor: impl Into<AnchorSpec>) -> EndpointRef {
        EndpointRef { target: self, anchor: anchor.into() }
    }
}

impl From<EntityId> for Endpoint {
    fn from(id: EntityId) -> Self {
        Endpoint::Entity(id)
    }
}

/// An endpoint plus the anchor taken on it.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRef {
    pub target: Endpoint,
    pub anchor: AnchorSpec,
}

impl EndpointRef {
    pub fn entity(&self) -> Option<EntityId> {
        match self.target {
            Endpoint::Entity(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Endpoint> for EndpointRef {
    fn from(target: Endpoint) -> Self {
        target.at(AnchorSpec::center())
    }
}

impl From<EntityId> for EndpointRef {
    fn from(id: EntityId) -> Self {
        Endpoint::Entity(id).into()
    }
}

impl<A: Into<AnchorSpec>> From<(EntityId, A)> for EndpointRef {
    fn from((id, anchor): (EntityId, A)) -> Self {
        Endpoint::Entity(id).at(anchor)
    }
}

/// Which end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Start,
    End,
}

/// Geometry of a connection between its two resolved endpoints.
#[derive(Clone, Default)]
pub enum ConnectionShape {
    #[default]
    Straight,
    /// Quadratic bow with the given curvature (see [`Curve`])
    Curved(f64),
    /// Any curve, mapped so its own start and end land on the endpoints
    Template {
        path: Rc<dyn Pathable>,
        /// Output units per template unit across the chord; `None` scales
        /// proportionally with the chord
        normal_scale: Option<f64>,
    },
}

impl fmt::Debug for ConnectionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionShape::Straight => f.write_str("Straight"),
            ConnectionShape::Curved(k) => f.debug_tuple("Curved").field(k).finish(),
            ConnectionShape::Template { normal_scale, .. } => f
                .debug_struct("Template")
                .field("normal_scale", normal_scale)
                .finish_non_exhaustive(),
        }
    }
}

/// Style and geometry mode of a connection.
#[derive(Debug, Clone)]
pub struct ConnectionStyle {
    /// Invisible connections emit no markup but still answer path queries
    pub visible: bool,
    pub shape: ConnectionShape,
    pub start_cap: Option<String>,
    pub end_cap: Option<String>,
    pub style: ObjectStyle,
    /// Cubic segments for template rendering
    pub segments: usize,
    pub z: i32,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            visible: true,
            shape: ConnectionShape::Straight,
            start_cap: None,
            end_cap: None,
            style: ObjectStyle::default(),
            segments: defaults::SEGMENTS,
            z: 0,
        }
    }
}

impl ConnectionStyle {
    pub fn curved(curvature: f64) -> Self {
        Self { shape: ConnectionShape::Curved(curvature), ..Default::default() }
    }

    pub fn template(path: impl Pathable + 'static) -> Self {
        Self {
            shape: ConnectionShape::Template { path: Rc::new(path), normal_scale: None },
            ..Default::default()
        }
    }

    pub fn invisible() -> Self {
        Self { visible: false, ..Default::default() }
    }

    pub fn with_start_cap(mut self, name: impl Into<String>) -> Self {
        self.start_cap = Some(name.into());
        self
    }

    pub fn with_end_cap(mut self, name: impl Into<String>) -> Self {
        self.end_cap = Some(name.into());
        self
    }

    /// Check everything that can be checked without endpoint positions.
    fn validate(&self) -> Result<()> {
        if let ConnectionShape::Template { path, .. } = &self.shape {
            template_chord(path.as_ref())?;
        }
        for name in self.start_cap.iter().chain(&self.end_cap) {
            caps::lookup_cap(name)?;
        }
        Ok(())
    }
}

/// A stored connection: two endpoint references and a style.
#[derive(Debug, Clone)]
pub struct Connection {
    pub(crate) from: EndpointRef,
    pub(crate) to: EndpointRef,
    pub(crate) style: ConnectionStyle,
    pub(crate) seq: u64,
}

impl Connection {
    pub fn from(&self) -> &EndpointRef {
        &self.from
    }

    pub fn to(&self) -> &EndpointRef {
        &self.to
    }

    pub fn style(&self) -> &ConnectionStyle {
        &self.style
    }

    /// Whether either end refers to `id`.
    pub fn touches(&self, id: EntityId) -> bool {
        self.from.entity() == Some(id) || self.to.entity() == Some(id)
    }
}

/// Start and end of a template's own chord; they must differ.
fn template_chord(path: &dyn Pathable) -> Result<(Coord, Coord)> {
    let t0 = path.point_at(0.0);
    let t1 = path.point_at(1.0);
    if t0.distance_to(t1) < 1e-12 {
        return Err(SceneError::DegenerateTemplate);
    }
    Ok((t0, t1))
}

/// Affine map taking the template chord `t0 → t1` onto `start → end`.
///
/// Along the chord the scale is `|end − start| / |t1 − t0|`; across it the
/// same unless `normal_scale` fixes it.
pub fn template_map(t0: Coord, t1: Coord, start: Coord, end: Coord, normal_scale: Option<f64>) -> DAffine2 {
    let tc = t1 - t0;
    let ac = end - start;
    let along = ac.length() / tc.length();
    let across = normal_scale.unwrap_or(along);
    DAffine2::from_translation(start.to_dvec2())
        * DAffine2::from_angle(ac.y.atan2(ac.x))
        * DAffine2::from_scale(dvec2(along, across))
        * DAffine2::from_angle(-tc.y.atan2(tc.x))
        * DAffine2::from_translation(-t0.to_dvec2())
}

#[derive(Debug, Clone)]
enum Route {
    Line(Line),
    Curve(Curve),
    Template(Mapped<Rc<dyn Pathable>>),
    /// Both endpoints coincide
    Point(Coord),
}

/// A connection's geometry evaluated at one moment.
#[derive(Debug, Clone)]
pub struct ConnectionPath {
    start: Coord,
    end: Coord,
    route: Route,
    segments: usize,
}

impl ConnectionPath {
    pub fn new(start: Coord, end: Coord, shape: &ConnectionShape, segments: usize) -> Result<Self> {
        let route = match shape {
            ConnectionShape::Straight => Route::Line(Line::new(start, end)),
            // the unit-chord curve mapped by a similarity is this same curve
            ConnectionShape::Curved(k) => Route::Curve(Curve::new(start, end, *k)),
            ConnectionShape::Template { path, normal_scale } => {
                let (t0, t1) = template_chord(path.as_ref())?;
                if start.distance_to(end) < 1e-12 {
                    warn!(?start, "connection endpoints coincide; template collapses to a point");
                    Route::Point(start)
                } else {
                    let map = template_map(t0, t1, start, end, *normal_scale);
                    Route::Template(Mapped::new(Rc::clone(path), map))
                }
            }
        };
        Ok(Self { start, end, route, segments })
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn end(&self) -> Coord {
        self.end
    }

    pub fn path_data(&self) -> PathData {
        match &self.route {
            Route::Line(l) => l.path_data(),
            Route::Curve(c) => c.path_data(),
            Route::Template(m) => fit_cubic_path(m, SampleRange::full().with_segments(self.segments), false),
            Route::Point(p) => PathData::new().m(p.x, p.y).l(p.x, p.y),
        }
    }
}

impl Pathable for ConnectionPath {
    fn point_at(&self, t: f64) -> Coord {
        // the ends are the resolved anchors by definition
        if t == 0.0 {
            return self.start;
        }
        if t == 1.0 {
            return self.end;
        }
        match &self.route {
            Route::Line(l) => l.point_at(t),
            Route::Curve(c) => c.point_at(t),
            Route::Template(m) => m.point_at(t),
            Route::Point(p) => *p,
        }
    }

    fn angle_at(&self, t: f64) -> f64 {
        match &self.route {
            Route::Line(l) => l.angle_at(t),
            Route::Curve(c) => c.angle_at(t),
            Route::Template(m) => m.angle_at(t),
            Route::Point(_) => 0.0,
        }
    }

    fn arc_length(&self) -> f64 {
        match &self.route {
            Route::Line(l) => l.arc_length(),
            Route::Curve(c) => c.arc_length(),
            Route::Template(m) => m.arc_length(),
            Route::Point(_) => 0.0,
        }
    }

    fn to_svg_path_d(&self) -> String {
        self.path_data().to_string()
    }
}

impl Scene {
    /// Link two endpoints. Anchors and caps are checked immediately.
    pub fn connect(
        &mut self,
        from: impl Into<EndpointRef>,
        to: impl Into<EndpointRef>,
        style: ConnectionStyle,
    ) -> Result<ConnectionId> {
        let from = from.into();
        let to = to.into();
        style.validate()?;
        {
            let mut cx = self.resolver();
            cx.endpoint(&from)?;
            cx.endpoint(&to)?;
        }
        let seq = self.next_seq();
        let id = self.connections.insert(Connection { from, to, style, seq });
        debug!(?id, "connected");
        Ok(id)
    }

    pub fn connection(&self, id: ConnectionId) -> Result<&Connection> {
        self.connections.get(id).ok_or(SceneError::UnknownConnection)
    }

    fn connection_mut(&mut self, id: ConnectionId) -> Result<&mut Connection> {
        self.connections.get_mut(id).ok_or(SceneError::UnknownConnection)
    }

    /// Move one end of a connection to a new endpoint.
    pub fn reconnect(&mut self, id: ConnectionId, end: End, endpoint: impl Into<EndpointRef>) -> Result<()> {
        let endpoint = endpoint.into();
        self.connection(id)?;
        self.resolver().endpoint(&endpoint)?;
        let conn = self.connection_mut(id)?;
        match end {
            End::Start => conn.from = endpoint,
            End::End => conn.to = endpoint,
        }
        Ok(())
    }

    pub fn set_connection_style(&mut self, id: ConnectionId, style: ConnectionStyle) -> Result<()> {
        style.validate()?;
        self.connection_mut(id)?.style = style;
        Ok(())
    }

    /// Remove a connection; its endpoint entities are untouched.
    pub fn disconnect(&mut self, id: ConnectionId) -> Result<Connection> {
        self.connections.remove(id).ok_or(SceneError::UnknownConnection)
    }

    /// Connections with an end on `id`.
    pub fn connections_of(&self, id: EntityId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, c)| c.touches(id))
            .map(|(cid, _)| cid)
            .collect()
    }

    /// Current geometry of a connection, from freshly resolved anchors.
    pub fn connection_path(&self, id: ConnectionId) -> Result<ConnectionPath> {
        let conn = self.connection(id)?;
        let mut cx = self.resolver();
        let start = cx.endpoint(&conn.from)?;
        let end = cx.endpoint(&conn.to)?;
        ConnectionPath::new(start, end, &conn.style.shape, conn.style.segments)
    }

    /// Markup for one connection, caps included. Empty when invisible.
    pub fn render_connection(&self, id: ConnectionId) -> Result<String> {
        self.render_connection_with(id, defaults::PRECISION)
    }

    pub(crate) fn render_connection_with(&self, id: ConnectionId, sig_figs: i32) -> Result<String> {
        let conn = self.connection(id)?;
        let style = &conn.style;
        if !style.visible || style.style.invisible {
            return Ok(String::new());
        }
        let path = self.connection_path(id)?;
        let mut out = path_element(&path.path_data().to_string_with(sig_figs), &style.style, sig_figs);
        let size = style.style.stroke_width * self.options.cap_size;
        let ends = [
            (End::Start, &style.start_cap, path.start(), path.angle_at(0.0)),
            (End::End, &style.end_cap, path.end(), path.angle_at(1.0)),
        ];
        for (end, name, at, angle) in ends {
            if let Some(name) = name {
                let cap = caps::lookup_cap(name)?;
                let points = cap.place(end, at, angle, size);
                out.push('\n');
                out.push_str(&polygon_element(&points, &style.style.stroke, sig_figs));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathable::Parametric;

    fn assert_point_eq(actual: Coord, expected: Coord) {
        const EPSILON: f64 = 1e-9;
        assert!(actual.approx_eq(expected, EPSILON), "expected {expected}, got {actual}");
    }

    #[test]
    fn template_map_hits_both_ends() {
        let t0 = Coord::new(0.0, 0.0);
        let t1 = Coord::new(1.0, 0.0);
        let m = template_map(t0, t1, Coord::new(10.0, 10.0), Coord::new(10.0, 50.0), None);
        let map = |p: Coord| Coord::from_dvec2(m.transform_point2(p.to_dvec2()));
        assert_point_eq(map(t0), Coord::new(10.0, 10.0));
        assert_point_eq(map(t1), Coord::new(10.0, 50.0));
        // +y of the template turns with the chord: heading down, it points left
        assert_point_eq(map(Coord::new(0.5, 0.25)), Coord::new(0.0, 30.0));
    }

    #[test]
    fn fixed_normal_scale_is_non_uniform() {
        let m = template_map(
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
            Some(4.0),
        );
        let p = Coord::from_dvec2(m.transform_point2(glam::dvec2(0.5, 1.0)));
        assert_point_eq(p, Coord::new(50.0, 4.0));
    }

    #[test]
    fn degenerate_template_is_rejected() {
        let stationary = Parametric::new(|_| Coord::new(1.0, 1.0));
        let style = ConnectionStyle::template(stationary);
        assert_eq!(style.validate(), Err(SceneError::DegenerateTemplate));
    }

    #[test]
    fn coincident_endpoints_collapse_template() {
        let shape = ConnectionStyle::template(Parametric::wave(1.0, 0.2)).shape;
        let p = Coord::new(7.0, 7.0);
        let path = ConnectionPath::new(p, p, &shape, 8).unwrap();
        assert_eq!(path.point_at(0.3), p);
        assert_eq!(path.arc_length(), 0.0);
        assert_eq!(path.to_svg_path_d(), "M7,7 L7,7");
    }

    #[test]
    fn endpoints_are_exact() {
        let shape = ConnectionShape::Template {
            path: Rc::new(Parametric::wave(3.0, 0.1)),
            normal_scale: None,
        };
        let a = Coord::new(0.1, 0.7);
        let b = Coord::new(123.456, -9.87);
        let path = ConnectionPath::new(a, b, &shape, 16).unwrap();
        assert_eq!(path.point_at(0.0), a);
        assert_eq!(path.point_at(1.0), b);
    }
}
