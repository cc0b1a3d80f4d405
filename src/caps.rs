//! Connection end caps (arrowheads, diamonds, bars)
//!
//! Caps are outlines in a 10×10 grid with a `tip` that lands on the stroke
//! endpoint. They are drawn pointing along local +x at the end of a
//! connection. Directional caps carry a second, mirrored outline for the
//! start; symmetric caps reuse one outline turned around.
//!
//! The registry is process-wide, seeded with `arrow`, `diamond` and `bar` on
//! first access, and extended only through [`register_cap`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::errors::{Result, SceneError};
use crate::log::debug;
use crate::render::defaults::CAP_GRID;
use crate::scene::End;
use crate::types::Coord;

/// Vertices in grid units plus the point that sits on the stroke end.
#[derive(Debug, Clone, PartialEq)]
pub struct CapOutline {
    pub vertices: Vec<Coord>,
    pub tip: Coord,
}

impl CapOutline {
    pub fn new(vertices: impl IntoIterator<Item = (f64, f64)>, tip: (f64, f64)) -> Self {
        Self {
            vertices: vertices.into_iter().map(Coord::from).collect(),
            tip: tip.into(),
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason| SceneError::InvalidCap { name: name.to_string(), reason };
        if self.vertices.len() < 3 {
            return Err(invalid("needs at least three vertices"));
        }
        let in_grid = |p: &Coord| p.is_finite() && (0.0..=CAP_GRID).contains(&p.x) && (0.0..=CAP_GRID).contains(&p.y);
        if !self.vertices.iter().all(in_grid) {
            return Err(invalid("vertices must lie in the 10x10 grid"));
        }
        if !in_grid(&self.tip) {
            return Err(invalid("tip must lie in the 10x10 grid"));
        }
        Ok(())
    }
}

/// A registered cap.
#[derive(Debug, Clone, PartialEq)]
pub enum CapShape {
    /// Looks the same from both ends
    Symmetric(CapOutline),
    /// Points somewhere; the start end needs its own mirrored outline
    Directional { end: CapOutline, start: CapOutline },
}

impl CapShape {
    pub fn validate(&self, name: &str) -> Result<()> {
        match self {
            CapShape::Symmetric(outline) => outline.validate(name),
            CapShape::Directional { end, start } => {
                end.validate(name)?;
                start.validate(name)
            }
        }
    }

    /// World polygon for this cap at one end of a stroke.
    ///
    /// `angle` is the path's forward tangent in degrees at that end and `size`
    /// the rendered width of the 10-unit grid.
    pub fn place(&self, at_end: End, at: Coord, angle: f64, size: f64) -> Vec<Coord> {
        let (outline, angle) = match (self, at_end) {
            (CapShape::Symmetric(o), End::End) => (o, angle),
            (CapShape::Symmetric(o), End::Start) => (o, angle + 180.0),
            (CapShape::Directional { end, .. }, End::End) => (end, angle),
            (CapShape::Directional { start, .. }, End::Start) => (start, angle),
        };
        let unit = size / CAP_GRID;
        let radians = angle.to_radians();
        outline
            .vertices
            .iter()
            .map(|q| at + ((*q - outline.tip) * unit).rotated_about_origin(radians))
            .collect()
    }
}

fn builtin_caps() -> HashMap<String, CapShape> {
    HashMap::from([
        (
            "arrow".to_string(),
            CapShape::Directional {
                end: CapOutline::new([(0.0, 0.0), (10.0, 5.0), (0.0, 10.0)], (10.0, 5.0)),
                start: CapOutline::new([(10.0, 0.0), (0.0, 5.0), (10.0, 10.0)], (0.0, 5.0)),
            },
        ),
        (
            "diamond".to_string(),
            CapShape::Symmetric(CapOutline::new(
                [(0.0, 5.0), (5.0, 0.0), (10.0, 5.0), (5.0, 10.0)],
                (10.0, 5.0),
            )),
        ),
        (
            "bar".to_string(),
            CapShape::Symmetric(CapOutline::new(
                [(4.0, 0.0), (6.0, 0.0), (6.0, 10.0), (4.0, 10.0)],
                (5.0, 5.0),
            )),
        ),
    ])
}

static REGISTRY: Lazy<RwLock<HashMap<String, CapShape>>> = Lazy::new(|| RwLock::new(builtin_caps()));

/// Add or replace a named cap.
pub fn register_cap(name: impl Into<String>, cap: CapShape) -> Result<()> {
    let name = name.into();
    cap.validate(&name)?;
    debug!(%name, "registered cap");
    REGISTRY.write().insert(name, cap);
    Ok(())
}

pub fn lookup_cap(name: &str) -> Result<CapShape> {
    REGISTRY
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| SceneError::UnknownCap { name: name.to_string() })
}

/// Registered names, sorted.
pub fn cap_names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.read().keys().cloned().collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: Coord, expected: Coord) {
        assert!(actual.approx_eq(expected, 1e-9), "expected {expected}, got {actual}");
    }

    #[test]
    fn builtins_are_seeded() {
        let names = cap_names();
        for builtin in ["arrow", "bar", "diamond"] {
            assert!(names.contains(&builtin.to_string()));
        }
    }

    #[test]
    fn arrow_tip_lands_on_endpoint() {
        let arrow = lookup_cap("arrow").unwrap();
        let at = Coord::new(100.0, 50.0);
        let pts = arrow.place(End::End, at, 0.0, 10.0);
        assert_point_eq(pts[1], at);
        // body trails behind the tip
        assert!(pts[0].x < at.x && pts[2].x < at.x);

        let start = arrow.place(End::Start, Coord::ZERO, 0.0, 10.0);
        assert_point_eq(start[1], Coord::ZERO);
        assert!(start[0].x > 0.0);
    }

    #[test]
    fn symmetric_cap_turns_around_at_start() {
        let diamond = lookup_cap("diamond").unwrap();
        let pts = diamond.place(End::Start, Coord::ZERO, 0.0, 10.0);
        // tip (10,5) on the endpoint, body extends forward along the path
        assert_point_eq(pts[2], Coord::ZERO);
        assert_point_eq(pts[0], Coord::new(10.0, 0.0));
    }

    #[test]
    fn registration_validates() {
        let bad = CapShape::Symmetric(CapOutline::new([(0.0, 0.0), (20.0, 0.0), (0.0, 5.0)], (0.0, 0.0)));
        assert!(matches!(register_cap("huge", bad), Err(SceneError::InvalidCap { .. })));
        assert!(matches!(lookup_cap("huge"), Err(SceneError::UnknownCap { .. })));

        let tee = CapShape::Symmetric(CapOutline::new([(8.0, 0.0), (10.0, 0.0), (10.0, 10.0), (8.0, 10.0)], (10.0, 5.0)));
        register_cap("tee", tee.clone()).unwrap();
        assert_eq!(lookup_cap("tee").unwrap(), tee);
    }
}
