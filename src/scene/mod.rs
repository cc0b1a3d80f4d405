//! The scene: an arena of entities and the connections between them
//!
//! This module is organized into submodules:
//! - `resolve`: relative/absolute attributes, frames, the resolver
//! - `geometry`: resolved outlines and their local frames
//! - `transform`: rotation/scale accumulators, pivots, fit-to-region
//! - `anchor`: named and relative anchors
//! - `shapes`: the shape catalogue
//! - `connection`: live connections and their paths
//!
//! Entities and connections are addressed by generational handles. A handle
//! to a removed entity never aliases a newer one; queries through it fail
//! with [`SceneError::UnknownEntity`] or, when reached through another
//! entity, [`SceneError::DanglingReference`].

pub mod anchor;
pub mod connection;
pub mod geometry;
pub mod resolve;
pub mod shapes;
pub mod transform;

pub use anchor::AnchorSpec;
pub use connection::{
    Connection, ConnectionPath, ConnectionShape, ConnectionStyle, End, Endpoint, EndpointRef,
};
pub use geometry::{EntityPath, Geometry, LocalFrame, Outline};
pub use resolve::{Extent, FrameRef, Placement, Resolver};
pub use shapes::{
    CurveShape, DotShape, EllipseShape, LineShape, PathShape, PolygonShape, RectShape, Shape,
    ShapeEnum, Vertex,
};
pub use transform::{FitOptions, Transform};

use slotmap::{SlotMap, new_key_type};

use crate::errors::{Result, SceneError};
use crate::log::debug;
use crate::pathable::Pathable;
use crate::render::svg::ObjectStyle;
use crate::render::{self, RenderOptions, defaults};
use crate::types::{BBox, Coord, positive};

new_key_type! {
    /// Handle to an entity in a [`Scene`]
    pub struct EntityId;
    /// Handle to a connection in a [`Scene`]
    pub struct ConnectionId;
}

/// Scene-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    /// Canvas fill behind everything; `None` leaves it transparent
    pub background: Option<String>,
    /// Style given to entities added without one
    pub style: ObjectStyle,
    /// Cubic segments for connection templates
    pub segments: usize,
    /// Cap size as a multiple of the stroke width
    pub cap_size: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            background: None,
            style: ObjectStyle::default(),
            segments: defaults::SEGMENTS,
            cap_size: defaults::CAP_SIZE,
        }
    }
}

/// A shape placed in a scene with its frame, transform, style and z-order.
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) shape: ShapeEnum,
    pub(crate) transform: Transform,
    pub(crate) frame: FrameRef,
    pub(crate) style: ObjectStyle,
    pub(crate) z: i32,
    pub(crate) seq: u64,
}

impl Entity {
    pub fn shape(&self) -> &ShapeEnum {
        &self.shape
    }

    pub fn frame(&self) -> FrameRef {
        self.frame
    }

    pub fn style(&self) -> &ObjectStyle {
        &self.style
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn kind(&self) -> &'static str {
        self.shape.kind()
    }
}

/// A declarative 2D scene.
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) options: SceneOptions,
    pub(crate) canvas: BBox,
    pub(crate) entities: SlotMap<EntityId, Entity>,
    pub(crate) connections: SlotMap<ConnectionId, Connection>,
    seq: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(defaults::CANVAS_WIDTH, defaults::CANVAS_HEIGHT)
    }
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_options(width, height, SceneOptions::default())
    }

    pub fn with_options(width: f64, height: f64, options: SceneOptions) -> Self {
        Self {
            options,
            canvas: BBox::from_origin_size(Coord::ZERO, width, height),
            entities: SlotMap::with_key(),
            connections: SlotMap::with_key(),
            seq: 0,
        }
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    pub fn canvas(&self) -> BBox {
        self.canvas
    }

    /// Resize the canvas; relative entities follow on their next query.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<()> {
        let width = positive(width).map_err(SceneError::invalid("canvas width"))?;
        let height = positive(height).map_err(SceneError::invalid("canvas height"))?;
        self.canvas = BBox::from_origin_size(self.canvas.min, width, height);
        Ok(())
    }

    pub(crate) fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Connection style carrying this scene's defaults.
    pub fn connection_style(&self) -> ConnectionStyle {
        ConnectionStyle {
            style: self.options.style.clone(),
            segments: self.options.segments,
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Add a shape framed by the canvas.
    pub fn add(&mut self, shape: impl Into<ShapeEnum>) -> EntityId {
        self.insert(shape.into(), FrameRef::Canvas)
    }

    /// Add a shape whose relative attributes resolve against `frame`.
    pub fn add_in(&mut self, shape: impl Into<ShapeEnum>, frame: FrameRef) -> Result<EntityId> {
        self.check_frame(&frame)?;
        Ok(self.insert(shape.into(), frame))
    }

    /// Add a shape placed relative to another entity's bounds.
    pub fn add_within(&mut self, shape: impl Into<ShapeEnum>, parent: EntityId) -> Result<EntityId> {
        self.add_in(shape, FrameRef::Within(parent))
    }

    fn insert(&mut self, shape: ShapeEnum, frame: FrameRef) -> EntityId {
        let seq = self.next_seq();
        let style = self.options.style.clone();
        self.entities.insert(Entity {
            shape,
            transform: Transform::IDENTITY,
            frame,
            style,
            z: 0,
            seq,
        })
    }

    fn check_frame(&self, frame: &FrameRef) -> Result<()> {
        match frame {
            FrameRef::Within(parent) => self.entity(*parent).map(|_| ()),
            FrameRef::Region(b) if !(b.width() >= 0.0 && b.height() >= 0.0) => Err(SceneError::InvalidFitTarget),
            _ => Ok(()),
        }
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id).ok_or(SceneError::UnknownEntity)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(id).ok_or(SceneError::UnknownEntity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections.keys()
    }

    /// Remove an entity along with every connection touching it.
    ///
    /// Polygons that read vertices through it report
    /// [`SceneError::DanglingReference`] from then on.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity> {
        let entity = self.entities.remove(id).ok_or(SceneError::UnknownEntity)?;
        #[cfg(feature = "tracing")]
        let before = self.connections.len();
        self.connections.retain(|_, c| !c.touches(id));
        debug!(?id, dropped = before - self.connections.len(), "removed entity");
        Ok(entity)
    }

    pub fn shape(&self, id: EntityId) -> Result<&ShapeEnum> {
        Ok(&self.entity(id)?.shape)
    }

    /// Edit stored geometry directly; the next query sees the change.
    pub fn shape_mut(&mut self, id: EntityId) -> Result<&mut ShapeEnum> {
        Ok(&mut self.entity_mut(id)?.shape)
    }

    pub fn set_shape(&mut self, id: EntityId, shape: impl Into<ShapeEnum>) -> Result<()> {
        self.entity_mut(id)?.shape = shape.into();
        Ok(())
    }

    pub fn set_frame(&mut self, id: EntityId, frame: FrameRef) -> Result<()> {
        self.check_frame(&frame)?;
        self.entity_mut(id)?.frame = frame;
        Ok(())
    }

    pub fn style(&self, id: EntityId) -> Result<&ObjectStyle> {
        Ok(&self.entity(id)?.style)
    }

    pub fn set_style(&mut self, id: EntityId, style: ObjectStyle) -> Result<()> {
        self.entity_mut(id)?.style = style;
        Ok(())
    }

    pub fn set_z(&mut self, id: EntityId, z: i32) -> Result<()> {
        self.entity_mut(id)?.z = z;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Path queries
    // ------------------------------------------------------------------

    /// World-space curve of an entity.
    pub fn path(&self, id: EntityId) -> Result<EntityPath> {
        let geom = self.geometry(id)?;
        geom.path().ok_or(SceneError::NotPathable { kind: geom.kind })
    }

    pub fn point_at(&self, id: EntityId, t: f64) -> Result<Coord> {
        Ok(self.path(id)?.point_at(t))
    }

    pub fn angle_at(&self, id: EntityId, t: f64) -> Result<f64> {
        Ok(self.path(id)?.angle_at(t))
    }

    pub fn arc_length(&self, id: EntityId) -> Result<f64> {
        Ok(self.path(id)?.arc_length())
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Markup for one entity. Empty when its style is invisible.
    pub fn render_entity(&self, id: EntityId) -> Result<String> {
        self.render_entity_with(id, defaults::PRECISION)
    }

    fn render_entity_with(&self, id: EntityId, sig_figs: i32) -> Result<String> {
        let style = &self.entity(id)?.style;
        Ok(self.geometry(id)?.render(style, sig_figs))
    }

    /// Full SVG document with default options.
    pub fn render(&self) -> Result<String> {
        self.render_with(&RenderOptions::default())
    }

    /// Entities and connections in z order, ties in insertion order.
    pub fn render_with(&self, options: &RenderOptions) -> Result<String> {
        enum Item {
            Entity(EntityId),
            Connection(ConnectionId),
        }
        let mut items: Vec<(i32, u64, Item)> = self
            .entities
            .iter()
            .map(|(id, e)| (e.z, e.seq, Item::Entity(id)))
            .chain(
                self.connections
                    .iter()
                    .map(|(id, c)| (c.style.z, c.seq, Item::Connection(id))),
            )
            .collect();
        items.sort_by_key(|(z, seq, _)| (*z, *seq));

        let fragments = items
            .into_iter()
            .map(|(_, _, item)| match item {
                Item::Entity(id) => self.render_entity_with(id, options.precision),
                Item::Connection(id) => self.render_connection_with(id, options.precision),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(render::document(
            &self.canvas,
            self.options.background.as_deref(),
            fragments,
            options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelCoord;

    #[test]
    fn removed_handles_do_not_alias() {
        let mut scene = Scene::new(100.0, 100.0);
        let a = scene.add(DotShape::new(Coord::new(1.0, 1.0)));
        scene.remove(a).unwrap();
        let b = scene.add(DotShape::new(Coord::new(2.0, 2.0)));
        assert_ne!(a, b);
        assert_eq!(scene.anchor(a, "center"), Err(SceneError::UnknownEntity));
        assert_eq!(scene.anchor(b, "center"), Ok(Coord::new(2.0, 2.0)));
    }

    #[test]
    fn canvas_resize_moves_relative_entities() {
        let mut scene = Scene::new(100.0, 100.0);
        let id = scene.add(DotShape::new(RelCoord::new(0.5, 0.5)));
        assert_eq!(scene.anchor(id, "center").unwrap(), Coord::new(50.0, 50.0));
        scene.set_canvas_size(300.0, 100.0).unwrap();
        assert_eq!(scene.anchor(id, "center").unwrap(), Coord::new(150.0, 50.0));
    }

    #[test]
    fn rects_are_not_pathable() {
        let mut scene = Scene::new(100.0, 100.0);
        let id = scene.add(RectShape::absolute(Coord::ZERO, 10.0, 10.0));
        assert_eq!(scene.point_at(id, 0.5), Err(SceneError::NotPathable { kind: "rect" }));
    }

    #[test]
    fn z_order_then_insertion_order() {
        let mut scene = Scene::new(10.0, 10.0);
        let back = scene.add(DotShape::new(Coord::new(1.0, 1.0)));
        let front = scene.add(DotShape::new(Coord::new(2.0, 2.0)));
        scene.set_z(back, 5).unwrap();
        let out = scene
            .render_with(&RenderOptions { svg_wrapper: false, ..Default::default() })
            .unwrap();
        let first = out.find("cx=\"2\"").unwrap();
        let second = out.find("cx=\"1\"").unwrap();
        assert!(first < second);
        assert!(scene.contains(front));
    }
}
