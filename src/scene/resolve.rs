//! Geometry resolver: relative/absolute attributes and `within` frames
//!
//! Nothing here is cached. Every query walks from the entity's stored
//! attributes through its frame chain, so moving a frame entity changes its
//! dependents on their next query without any propagation step.

use super::anchor::AnchorSpec;
use super::connection::{Endpoint, EndpointRef};
use super::geometry::Geometry;
use super::shapes::Shape;
use super::transform::Transform;
use super::{EntityId, Scene};
use crate::errors::{Result, SceneError};
use crate::log::debug;
use crate::types::{BBox, Coord, RelCoord};

/// A position stored either as fractions of the frame or in absolute units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Relative(RelCoord),
    Absolute(Coord),
}

impl Placement {
    pub fn resolve(&self, frame: &BBox) -> Coord {
        match self {
            Placement::Relative(rel) => frame.resolve(*rel),
            Placement::Absolute(p) => *p,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Placement::Relative(_))
    }

    /// Freeze to absolute against `frame` and shift by `delta`.
    ///
    /// Returns whether a relative value was frozen.
    pub fn shift(&mut self, delta: Coord, frame: &BBox) -> bool {
        let was_relative = self.is_relative();
        *self = Placement::Absolute(self.resolve(frame) + delta);
        was_relative
    }
}

impl From<Coord> for Placement {
    fn from(p: Coord) -> Self {
        Placement::Absolute(p)
    }
}

impl From<RelCoord> for Placement {
    fn from(rel: RelCoord) -> Self {
        Placement::Relative(rel)
    }
}

/// A length stored as a fraction of a frame dimension or in absolute units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    Relative(f64),
    Absolute(f64),
}

impl Extent {
    /// Resolve against the matching frame dimension.
    pub fn resolve(&self, span: f64) -> f64 {
        match self {
            Extent::Relative(f) => f * span,
            Extent::Absolute(v) => *v,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Extent::Relative(_))
    }
}

/// What an entity's relative attributes are fractions of.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FrameRef {
    #[default]
    Canvas,
    /// A rectangle supplied by a layout collaborator (grid cell, margin box)
    Region(BBox),
    /// Another entity's current world bounds
    Within(EntityId),
}

/// Walks frame chains and entity references for one query.
///
/// Keeps the chain of entities being resolved so a reference cycle surfaces
/// as [`SceneError::WithinCycle`] instead of unbounded recursion.
pub struct Resolver<'s> {
    scene: &'s Scene,
    stack: Vec<EntityId>,
}

impl<'s> Resolver<'s> {
    pub(crate) fn new(scene: &'s Scene) -> Self {
        Self { scene, stack: Vec::new() }
    }

    pub(crate) fn frame_box(&mut self, frame: &FrameRef) -> Result<BBox> {
        match frame {
            FrameRef::Canvas => Ok(self.scene.canvas),
            FrameRef::Region(b) => Ok(*b),
            FrameRef::Within(parent) => {
                self.ensure_live(*parent)?;
                debug!(?parent, depth = self.stack.len(), "resolving within frame");
                Ok(self.world(*parent)?.bounds())
            }
        }
    }

    /// Model-space geometry: relative attributes resolved, no transform.
    pub(crate) fn model(&mut self, id: EntityId) -> Result<Geometry> {
        if let Some(pos) = self.stack.iter().position(|e| *e == id) {
            return Err(SceneError::WithinCycle { chain: self.stack.len() - pos });
        }
        let scene = self.scene;
        let entity = scene.entity(id)?;
        self.stack.push(id);
        let result = self
            .frame_box(&entity.frame)
            .and_then(|frame| entity.shape.resolve(&frame, self));
        self.stack.pop();
        result
    }

    /// World-space geometry with the entity's own transform.
    pub(crate) fn world(&mut self, id: EntityId) -> Result<Geometry> {
        let transform = self.scene.entity(id)?.transform;
        self.world_with(id, &transform)
    }

    pub(crate) fn world_with(&mut self, id: EntityId, transform: &Transform) -> Result<Geometry> {
        Ok(self.model(id)?.transformed(transform))
    }

    /// Anchor on an entity another entity refers to (reactive vertices).
    pub(crate) fn linked_anchor(&mut self, id: EntityId, spec: &AnchorSpec) -> Result<Coord> {
        self.ensure_live(id)?;
        self.world(id)?.anchor(spec)
    }

    /// Current position of a connection endpoint.
    pub(crate) fn endpoint(&mut self, ep: &EndpointRef) -> Result<Coord> {
        match &ep.target {
            Endpoint::Entity(id) => self.world(*id)?.anchor(&ep.anchor),
            Endpoint::Canvas => super::anchor::box_anchor(&self.scene.canvas, &ep.anchor, "canvas"),
            Endpoint::Region(b) => super::anchor::box_anchor(b, &ep.anchor, "region"),
        }
    }

    fn ensure_live(&self, id: EntityId) -> Result<()> {
        if self.scene.entities.contains_key(id) {
            Ok(())
        } else {
            Err(SceneError::DanglingReference)
        }
    }
}

impl Scene {
    pub(crate) fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Resolve a frame reference to its current rectangle.
    pub fn frame_box(&self, frame: &FrameRef) -> Result<BBox> {
        self.resolver().frame_box(frame)
    }

    /// Current rectangle of the frame `id` is placed in.
    pub fn entity_frame(&self, id: EntityId) -> Result<BBox> {
        let frame = self.entity(id)?.frame;
        self.frame_box(&frame)
    }

    /// Express an absolute point as fractions of `id`'s frame.
    pub fn to_relative(&self, id: EntityId, p: Coord) -> Result<RelCoord> {
        Ok(self.entity_frame(id)?.to_relative(p))
    }

    /// Resolve fractions of `id`'s frame to an absolute point.
    pub fn resolve_in(&self, id: EntityId, rel: RelCoord) -> Result<Coord> {
        Ok(self.entity_frame(id)?.resolve(rel))
    }

    /// World-space geometry of an entity, recomputed on every call.
    pub fn geometry(&self, id: EntityId) -> Result<Geometry> {
        self.resolver().world(id)
    }

    /// Model-space geometry, before rotation and scale.
    pub fn model_geometry(&self, id: EntityId) -> Result<Geometry> {
        self.resolver().model(id)
    }

    /// Axis-aligned world bounds.
    pub fn bounds(&self, id: EntityId) -> Result<BBox> {
        Ok(self.geometry(id)?.bounds())
    }

    pub(crate) fn bounds_with_transform(&self, id: EntityId, transform: &Transform) -> Result<BBox> {
        Ok(self.resolver().world_with(id, transform)?.bounds())
    }

    /// The pivot rotation and scale act about.
    pub fn rotation_center(&self, id: EntityId) -> Result<Coord> {
        Ok(self.model_geometry(id)?.pivot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_resolves_against_frame() {
        let frame = BBox::from_origin_size(Coord::new(100.0, 50.0), 200.0, 100.0);
        let rel = Placement::Relative(RelCoord::new(0.25, 0.5));
        assert_eq!(rel.resolve(&frame), Coord::new(150.0, 100.0));
        let abs = Placement::Absolute(Coord::new(1.0, 2.0));
        assert_eq!(abs.resolve(&frame), Coord::new(1.0, 2.0));
    }

    #[test]
    fn shift_freezes_relative() {
        let frame = BBox::from_origin_size(Coord::ZERO, 100.0, 100.0);
        let mut p = Placement::Relative(RelCoord::new(0.5, 0.5));
        assert!(p.shift(Coord::new(10.0, 0.0), &frame));
        assert_eq!(p, Placement::Absolute(Coord::new(60.0, 50.0)));
        assert!(!p.shift(Coord::ZERO, &frame));
    }

    #[test]
    fn extent_scales_with_span() {
        assert_eq!(Extent::Relative(0.25).resolve(80.0), 20.0);
        assert_eq!(Extent::Absolute(7.0).resolve(80.0), 7.0);
    }
}
