//! Declarative 2D scene geometry rendered to SVG.
//!
//! A [`Scene`] holds entities (rects, ellipses, dots, lines, curves,
//! polygons, arbitrary paths) whose attributes are either fractions of a
//! frame or fixed pixel values. Nothing is cached: every query re-resolves
//! the entity from its stored state, so [`Connection`]s and reactive polygon
//! vertices always follow the entities they reference.
//!
//! ```
//! use vellum::{ConnectionStyle, Coord, DotShape, Scene};
//!
//! let mut scene = Scene::new(200.0, 100.0);
//! let a = scene.add(DotShape::new(Coord::new(20.0, 50.0)));
//! let b = scene.add(DotShape::new(Coord::new(180.0, 50.0)));
//! let link = scene.connect(a, b, ConnectionStyle::default().with_end_cap("arrow"))?;
//!
//! scene.move_by(b, Coord::new(0.0, 30.0))?;
//! let path = scene.connection_path(link)?;
//! assert_eq!(path.end(), Coord::new(180.0, 80.0));
//! # Ok::<(), vellum::SceneError>(())
//! ```

pub mod caps;
pub mod errors;
mod log;
pub mod pathable;
pub mod render;
pub mod scene;
pub mod types;

pub use caps::{CapOutline, CapShape, cap_names, lookup_cap, register_cap};
pub use errors::{Result, SceneError};
pub use pathable::{Curve, Ellipse, Line, Mapped, Parametric, Pathable, Polyline};
pub use render::{ObjectStyle, PathData, RenderOptions};
pub use scene::{
    AnchorSpec, Connection, ConnectionId, ConnectionPath, ConnectionShape, ConnectionStyle,
    CurveShape, DotShape, EllipseShape, End, Endpoint, EndpointRef, Entity, EntityId, Extent,
    FitOptions, FrameRef, LineShape, PathShape, Placement, PolygonShape, RectShape, Scene,
    SceneOptions, ShapeEnum, Transform, Vertex,
};
pub use types::{BBox, Coord, NumericError, RelCoord};
