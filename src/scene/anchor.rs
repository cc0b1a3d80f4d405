//! Anchor system: named and relative reference points on entities and frames

use std::fmt;

use super::geometry::{Geometry, Outline};
use super::{EntityId, Scene};
use crate::errors::{Result, SceneError};
use crate::pathable::Pathable;
use crate::types::{BBox, Coord, RelCoord};

/// Where on an entity or surface a point is taken.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorSpec {
    /// Entity-specific name such as `center`, `top_left`, `start` or `v2`
    Named(String),
    /// Fractions of the entity's own (rotation-aware) local box
    Rel(RelCoord),
}

impl AnchorSpec {
    pub fn center() -> Self {
        AnchorSpec::Named("center".to_string())
    }
}

impl Default for AnchorSpec {
    fn default() -> Self {
        Self::center()
    }
}

impl fmt::Display for AnchorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSpec::Named(name) => f.write_str(name),
            AnchorSpec::Rel(rel) => write!(f, "{rel}"),
        }
    }
}

impl From<&str> for AnchorSpec {
    fn from(name: &str) -> Self {
        AnchorSpec::Named(name.to_string())
    }
}

impl From<String> for AnchorSpec {
    fn from(name: String) -> Self {
        AnchorSpec::Named(name)
    }
}

impl From<RelCoord> for AnchorSpec {
    fn from(rel: RelCoord) -> Self {
        AnchorSpec::Rel(rel)
    }
}

impl From<(f64, f64)> for AnchorSpec {
    fn from((x, y): (f64, f64)) -> Self {
        AnchorSpec::Rel(RelCoord::new(x, y))
    }
}

/// The rectangle vocabulary shared by rects, the canvas and regions.
pub const NINE_POINT: [(&str, f64, f64); 9] = [
    ("center", 0.5, 0.5),
    ("top_left", 0.0, 0.0),
    ("top", 0.5, 0.0),
    ("top_right", 1.0, 0.0),
    ("left", 0.0, 0.5),
    ("right", 1.0, 0.5),
    ("bottom_left", 0.0, 1.0),
    ("bottom", 0.5, 1.0),
    ("bottom_right", 1.0, 1.0),
];

/// Fractional position of a nine-point name.
pub fn nine_point(name: &str) -> Option<RelCoord> {
    NINE_POINT
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, x, y)| RelCoord::new(*x, *y))
}

fn nine_point_names() -> Vec<String> {
    NINE_POINT.iter().map(|(n, _, _)| n.to_string()).collect()
}

fn invalid(name: &str, kind: &'static str, valid: &[String]) -> SceneError {
    SceneError::InvalidAnchor {
        name: name.to_string(),
        kind,
        valid: valid.join(", "),
    }
}

/// Anchor on a plain rectangle (canvas, region, grid cell).
pub fn box_anchor(b: &BBox, spec: &AnchorSpec, kind: &'static str) -> Result<Coord> {
    match spec {
        AnchorSpec::Rel(rel) => Ok(b.resolve(*rel)),
        AnchorSpec::Named(name) => nine_point(name)
            .map(|rel| b.resolve(rel))
            .ok_or_else(|| invalid(name, kind, &nine_point_names())),
    }
}

/// Ellipse corner anchors sit on the boundary along the diagonals.
const ELLIPSE_DIAGONALS: [(&str, f64); 4] = [
    ("top_right", 45.0),
    ("top_left", 135.0),
    ("bottom_left", 225.0),
    ("bottom_right", 315.0),
];

impl Geometry {
    /// Every name [`Geometry::anchor`] accepts for this outline.
    pub fn anchor_names(&self) -> Vec<String> {
        let names: &[&str] = match &self.outline {
            Outline::Rect(_) | Outline::Ellipse(_) => return nine_point_names(),
            Outline::Dot { .. } => &["center"],
            Outline::Line(_) => &["start", "end", "center", "midpoint"],
            Outline::Curve(_) => &["start", "end", "center", "midpoint", "control"],
            Outline::Path { .. } => &["start", "end", "center", "midpoint"],
            Outline::Polygon { vertices, .. } => {
                let mut names: Vec<String> = (0..vertices.len()).map(|i| format!("v{i}")).collect();
                names.push("centroid".to_string());
                names.push("center".to_string());
                return names;
            }
        };
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Resolve an anchor in world space.
    ///
    /// Relative specs resolve against the local frame, so they turn with the
    /// entity.
    pub fn anchor(&self, spec: &AnchorSpec) -> Result<Coord> {
        let name = match spec {
            AnchorSpec::Rel(rel) => return Ok(self.local.resolve(*rel)),
            AnchorSpec::Named(name) => name.as_str(),
        };
        self.named_anchor(name)
            .ok_or_else(|| invalid(name, self.kind, &self.anchor_names()))
    }

    fn named_anchor(&self, name: &str) -> Option<Coord> {
        match &self.outline {
            Outline::Rect(_) => nine_point(name).map(|rel| self.local.resolve(rel)),
            Outline::Ellipse(e) => match name {
                "center" => Some(e.center),
                "right" => Some(e.point_at(0.0)),
                "top" => Some(e.point_at(0.25)),
                "left" => Some(e.point_at(0.5)),
                "bottom" => Some(e.point_at(0.75)),
                _ => ELLIPSE_DIAGONALS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, deg)| e.point_at_angle(*deg)),
            },
            Outline::Dot { center, .. } => (name == "center").then_some(*center),
            Outline::Line(l) => match name {
                "start" => Some(l.start),
                "end" => Some(l.end),
                "center" | "midpoint" => Some(l.start.midpoint(l.end)),
                _ => None,
            },
            Outline::Curve(c) => match name {
                "start" => Some(c.start),
                "end" => Some(c.end),
                "center" => Some(c.start.midpoint(c.end)),
                "midpoint" => Some(c.point_at(0.5)),
                "control" => Some(c.control_point()),
                _ => None,
            },
            Outline::Path { path, .. } => match name {
                "start" => Some(path.point_at(0.0)),
                "end" => Some(path.point_at(1.0)),
                "center" => Some(self.local.center()),
                "midpoint" => Some(path.point_at(0.5)),
                _ => None,
            },
            Outline::Polygon { vertices, .. } => match name {
                "centroid" => centroid(vertices),
                "center" => Some(BBox::from_points(vertices.iter().copied()).center()),
                _ => name
                    .strip_prefix('v')
                    .and_then(|i| i.parse::<usize>().ok())
                    .filter(|i| format!("v{i}") == name)
                    .and_then(|i| vertices.get(i).copied()),
            },
        }
    }
}

/// Vertex average.
pub(crate) fn centroid(points: &[Coord]) -> Option<Coord> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Coord::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

impl Scene {
    /// World position of an anchor on an entity.
    pub fn anchor(&self, id: EntityId, spec: impl Into<AnchorSpec>) -> Result<Coord> {
        self.geometry(id)?.anchor(&spec.into())
    }

    /// Anchor names the entity accepts.
    pub fn anchor_names(&self, id: EntityId) -> Result<Vec<String>> {
        Ok(self.geometry(id)?.anchor_names())
    }

    /// Anchor on the canvas surface.
    pub fn canvas_anchor(&self, spec: impl Into<AnchorSpec>) -> Result<Coord> {
        box_anchor(&self.canvas, &spec.into(), "canvas")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathable::{Ellipse, Line};
    use crate::scene::geometry::LocalFrame;

    fn line_geometry() -> Geometry {
        let l = Line::new(Coord::new(0.0, 0.0), Coord::new(10.0, 0.0));
        Geometry {
            kind: "line",
            outline: Outline::Line(l),
            local: LocalFrame::from_bbox(&BBox::from_points([l.start, l.end])),
            pivot: Coord::new(5.0, 0.0),
        }
    }

    #[test]
    fn nine_point_lookup() {
        assert_eq!(nine_point("bottom_right"), Some(RelCoord::new(1.0, 1.0)));
        assert_eq!(nine_point("north"), None);
    }

    #[test]
    fn unknown_name_lists_valid_ones() {
        let err = line_geometry().anchor(&"top_left".into()).unwrap_err();
        assert_eq!(
            err,
            SceneError::InvalidAnchor {
                name: "top_left".to_string(),
                kind: "line",
                valid: "start, end, center, midpoint".to_string(),
            }
        );
    }

    #[test]
    fn ellipse_diagonals_lie_on_boundary() {
        let e = Ellipse::new(Coord::ZERO, 20.0, 10.0);
        let geom = Geometry {
            kind: "ellipse",
            outline: Outline::Ellipse(e),
            local: LocalFrame::from_bbox(&e.bounds()),
            pivot: Coord::ZERO,
        };
        let p = geom.anchor(&"top_right".into()).unwrap();
        assert!(p.x > 0.0 && p.y < 0.0);
        let on_curve = (p.x / 20.0).powi(2) + (p.y / 10.0).powi(2);
        assert!((on_curve - 1.0).abs() < 1e-9);
    }

    #[test]
    fn box_anchor_accepts_tuples() {
        let b = BBox::from_origin_size(Coord::ZERO, 100.0, 50.0);
        assert_eq!(box_anchor(&b, &(0.5, 1.0).into(), "canvas").unwrap(), Coord::new(50.0, 50.0));
        assert!(matches!(
            box_anchor(&b, &"start".into(), "canvas"),
            Err(SceneError::InvalidAnchor { kind: "canvas", .. })
        ));
    }

    #[test]
    fn polygon_vertex_names() {
        let vertices = vec![Coord::new(0.0, 0.0), Coord::new(6.0, 0.0), Coord::new(0.0, 6.0)];
        let geom = Geometry {
            kind: "polygon",
            outline: Outline::Polygon { vertices: vertices.clone(), linked: vec![false; 3] },
            local: LocalFrame::from_bbox(&BBox::from_points(vertices.iter().copied())),
            pivot: Coord::new(2.0, 2.0),
        };
        assert_eq!(geom.anchor(&"v1".into()).unwrap(), Coord::new(6.0, 0.0));
        assert_eq!(geom.anchor(&"centroid".into()).unwrap(), Coord::new(2.0, 2.0));
        assert!(geom.anchor(&"v3".into()).is_err());
        for alias in ["v01", "v+1", "v 1"] {
            assert!(matches!(
                geom.anchor(&alias.into()),
                Err(SceneError::InvalidAnchor { .. })
            ));
        }
        assert_eq!(geom.anchor_names().len(), 5);
    }
}
