//! Error types with diagnostics using miette
//!
//! Every fallible scene operation reports a [`SceneError`] synchronously at
//! the call site. There is no silent fallback (e.g. to an entity's center).

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

/// Errors raised while building, querying or rendering a scene
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("invalid anchor `{name}` for {kind}")]
    #[diagnostic(code(vellum::anchor::invalid), help("valid anchors: {valid}"))]
    InvalidAnchor {
        name: String,
        kind: &'static str,
        valid: String,
    },

    #[error("unknown entity")]
    #[diagnostic(
        code(vellum::scene::unknown_entity),
        help("the entity was removed or belongs to another scene")
    )]
    UnknownEntity,

    #[error("unknown connection")]
    #[diagnostic(code(vellum::scene::unknown_connection))]
    UnknownConnection,

    #[error("`within` reference cycle ({chain} entities)")]
    #[diagnostic(
        code(vellum::resolve::within_cycle),
        help("an entity cannot be placed relative to itself, directly or through other entities")
    )]
    WithinCycle { chain: usize },

    #[error("reference to a removed entity")]
    #[diagnostic(code(vellum::resolve::dangling_reference))]
    DanglingReference,

    #[error("{kind} has no parametric path")]
    #[diagnostic(
        code(vellum::path::not_pathable),
        help("point_at is available on lines, curves, ellipses, polygons, paths and connections")
    )]
    NotPathable { kind: &'static str },

    #[error("`rotate` and `match_aspect` cannot both be requested")]
    #[diagnostic(
        code(vellum::transform::conflicting_fit),
        help("pick one rotation goal: maximise fill, or match the target aspect ratio")
    )]
    ConflictingFit,

    #[error("fit target has no area")]
    #[diagnostic(code(vellum::transform::invalid_fit_target))]
    InvalidFitTarget,

    #[error("template path starts and ends at the same point")]
    #[diagnostic(
        code(vellum::connection::degenerate_template),
        help("a connection template needs distinct start and end points to map onto the chord")
    )]
    DegenerateTemplate,

    #[error("unknown cap `{name}`")]
    #[diagnostic(code(vellum::caps::unknown))]
    UnknownCap { name: String },

    #[error("invalid cap `{name}`: {reason}")]
    #[diagnostic(code(vellum::caps::invalid))]
    InvalidCap { name: String, reason: &'static str },

    #[error("invalid {what}: {source}")]
    #[diagnostic(code(vellum::invalid_value))]
    InvalidValue {
        what: &'static str,
        #[source]
        source: NumericError,
    },
}

impl SceneError {
    /// Wrap a numeric validation failure with the name of the offending input.
    pub fn invalid(what: &'static str) -> impl FnOnce(NumericError) -> SceneError {
        move |source| SceneError::InvalidValue { what, source }
    }
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;
