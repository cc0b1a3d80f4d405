//! Transform engine: accumulated rotation/scale, explicit-pivot transforms
//! and fit-to-region sizing.
//!
//! Rotation and scale live on the entity as accumulators and are applied to
//! model-space geometry at query time. Only operations that move an entity
//! (`move_by`, `rotate_about`, `scale_about`, recentering in `fit_within`)
//! touch stored geometry, and they freeze relative positions to absolute
//! first.

use glam::{DAffine2, DVec2};

use super::shapes::Shape;
use super::{EntityId, Scene};
use crate::errors::{Result, SceneError};
use crate::log::debug;
use crate::render::defaults;
use crate::types::{BBox, Coord, RelCoord, finite, positive};

/// Accumulated rotation (degrees, clockwise on screen) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { rotation: 0.0, scale: 1.0 };

    /// Validated constructor.
    pub fn try_new(rotation: f64, scale: f64) -> Result<Self> {
        Ok(Self {
            rotation: finite(rotation).map_err(SceneError::invalid("rotation"))?,
            scale: positive(scale).map_err(SceneError::invalid("scale"))?,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0 && self.scale == 1.0
    }

    /// Rotation then scale, both about `pivot`.
    pub fn affine(&self, pivot: Coord) -> DAffine2 {
        let c = pivot.to_dvec2();
        DAffine2::from_translation(c)
            * DAffine2::from_scale(DVec2::splat(self.scale))
            * DAffine2::from_angle(self.rotation.to_radians())
            * DAffine2::from_translation(-c)
    }
}

pub(crate) fn apply(m: &DAffine2, p: Coord) -> Coord {
    Coord::from_dvec2(m.transform_point2(p.to_dvec2()))
}

/// Options for [`Scene::fit_within`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Share of the target the entity should span along its tighter axis
    pub scale_fraction: f64,
    /// Center the result in the target
    pub recenter: bool,
    /// Place the entity's center at this point of the target instead,
    /// clamped so it stays inside
    pub at: Option<RelCoord>,
    /// Measure the stroked extent rather than the bare geometry
    pub visual: bool,
    /// Search for the rotation that fills the target best
    pub rotate: bool,
    /// Rotate so the bounds take on the target's aspect ratio
    pub match_aspect: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            scale_fraction: 1.0,
            recenter: true,
            at: None,
            visual: false,
            rotate: false,
            match_aspect: false,
        }
    }
}

/// Rotation in [0, 90] degrees at which a `w`×`h` box has bounds with aspect
/// `target_aspect`, or the closest reachable end of that range.
///
/// Bounds of the rotated box are `W = w·cos + h·sin`, `H = w·sin + h·cos`;
/// solving `W = a·H` gives `tan θ = (w − a·h) / (a·w − h)`. The bounds aspect
/// runs monotonically from `w/h` at 0° to `h/w` at 90°.
pub fn aspect_matching_rotation(w: f64, h: f64, target_aspect: f64) -> f64 {
    const EPS: f64 = 1e-12;
    if !(w > EPS && h > EPS && target_aspect > 0.0) || (w - h).abs() <= EPS * w.max(h) {
        return 0.0;
    }
    let at_zero = w / h;
    let at_quarter = h / w;
    if target_aspect <= at_zero.min(at_quarter) || target_aspect >= at_zero.max(at_quarter) {
        // unreachable or at an end: nearer end, compared as a ratio
        let to_zero = (target_aspect / at_zero).ln().abs();
        let to_quarter = (target_aspect / at_quarter).ln().abs();
        return if to_zero <= to_quarter { 0.0 } else { 90.0 };
    }
    let num = w - target_aspect * h;
    let den = target_aspect * w - h;
    if den.abs() < EPS {
        return 90.0;
    }
    (num / den).atan().to_degrees().clamp(0.0, 90.0)
}

/// Largest scale that fits a `w`×`h` box into `avail_w`×`avail_h`.
///
/// A zero-sized axis places no constraint; `None` when both are zero.
pub fn fill_scale(avail_w: f64, avail_h: f64, w: f64, h: f64) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let sx = (w > EPS).then(|| avail_w / w);
    let sy = (h > EPS).then(|| avail_h / h);
    match (sx, sy) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Coarse-to-fine scan of [0, 180) degrees for the angle maximising `score`.
///
/// Ties keep the smaller angle.
pub fn scan_rotation(mut score: impl FnMut(f64) -> Result<f64>) -> Result<f64> {
    let mut step = defaults::FIT_COARSE_STEP;
    let mut best = 0.0;
    let mut best_score = score(0.0)?;
    let coarse = (180.0 / step) as usize;
    for i in 1..coarse {
        let angle = i as f64 * step;
        let s = score(angle)?;
        if s > best_score {
            best = angle;
            best_score = s;
        }
    }
    for _ in 0..defaults::FIT_REFINE_PASSES {
        let center = best;
        step /= 10.0;
        for i in -10..=10 {
            let angle = center + i as f64 * step;
            let s = score(angle)?;
            if s > best_score {
                best = angle;
                best_score = s;
            }
        }
    }
    Ok(best.rem_euclid(180.0))
}

impl Scene {
    /// The entity's accumulated rotation and scale.
    pub fn transform(&self, id: EntityId) -> Result<Transform> {
        Ok(self.entity(id)?.transform)
    }

    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> Result<()> {
        let transform = Transform::try_new(transform.rotation, transform.scale)?;
        self.entity_mut(id)?.transform = transform;
        Ok(())
    }

    /// Add `degrees` of rotation about the entity's rotation center.
    pub fn rotate(&mut self, id: EntityId, degrees: f64) -> Result<()> {
        let degrees = finite(degrees).map_err(SceneError::invalid("rotation"))?;
        self.entity_mut(id)?.transform.rotation += degrees;
        Ok(())
    }

    /// Multiply the entity's scale about its rotation center.
    pub fn scale(&mut self, id: EntityId, factor: f64) -> Result<()> {
        let factor = positive(factor).map_err(SceneError::invalid("scale factor"))?;
        self.entity_mut(id)?.transform.scale *= factor;
        Ok(())
    }

    /// Translate the entity's stored geometry.
    ///
    /// Relative positions are frozen to absolute against the current frame;
    /// relative sizes keep following it.
    pub fn move_by(&mut self, id: EntityId, delta: Coord) -> Result<()> {
        finite(delta.x)
            .and(finite(delta.y))
            .map_err(SceneError::invalid("offset"))?;
        let frame = self.entity_frame(id)?;
        let entity = self.entity_mut(id)?;
        if entity.shape.translate(delta, &frame) {
            debug!(?id, "froze relative position to absolute");
        }
        Ok(())
    }

    /// Move the entity so its world bounds are centered on `center`.
    pub fn move_to(&mut self, id: EntityId, center: Coord) -> Result<()> {
        let current = self.bounds(id)?.center();
        self.move_by(id, center - current)
    }

    /// Rotate about an external pivot: the rotation center orbits `pivot`
    /// and the entity's own rotation accumulates.
    pub fn rotate_about(&mut self, id: EntityId, degrees: f64, pivot: Coord) -> Result<()> {
        let degrees = finite(degrees).map_err(SceneError::invalid("rotation"))?;
        let center = self.rotation_center(id)?;
        let orbit = center.rotated(degrees.to_radians(), pivot);
        self.move_by(id, orbit - center)?;
        self.entity_mut(id)?.transform.rotation += degrees;
        Ok(())
    }

    /// Scale about an external pivot.
    pub fn scale_about(&mut self, id: EntityId, factor: f64, pivot: Coord) -> Result<()> {
        let factor = positive(factor).map_err(SceneError::invalid("scale factor"))?;
        let center = self.rotation_center(id)?;
        let moved = pivot + (center - pivot) * factor;
        self.move_by(id, moved - center)?;
        self.entity_mut(id)?.transform.scale *= factor;
        Ok(())
    }

    /// Size (and optionally rotate and position) an entity to occupy
    /// `scale_fraction` of `target`.
    pub fn fit_within(&mut self, id: EntityId, target: BBox, options: FitOptions) -> Result<()> {
        if options.rotate && options.match_aspect {
            return Err(SceneError::ConflictingFit);
        }
        if !(target.width() > 0.0 && target.height() > 0.0) {
            return Err(SceneError::InvalidFitTarget);
        }
        let fraction = positive(options.scale_fraction).map_err(SceneError::invalid("scale fraction"))?;
        let pad = if options.visual {
            self.entity(id)?.style.stroke_width / 2.0
        } else {
            0.0
        };
        let base = self.transform(id)?;

        let rotation = if options.rotate {
            let best = scan_rotation(|extra| {
                let t = Transform { rotation: base.rotation + extra, ..base };
                let b = self.bounds_with_transform(id, &t)?;
                Ok(fill_scale(target.width(), target.height(), b.width(), b.height()).unwrap_or(0.0))
            })?;
            base.rotation + best
        } else if options.match_aspect {
            let local = self.geometry(id)?.local;
            let theta = aspect_matching_rotation(local.width(), local.height(), target.width() / target.height());
            base.rotation + theta - local.angle()
        } else {
            base.rotation
        };

        let rotated = Transform { rotation, ..base };
        let b = self.bounds_with_transform(id, &rotated)?;
        let avail_w = fraction * target.width() - 2.0 * pad;
        let avail_h = fraction * target.height() - 2.0 * pad;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return Err(SceneError::InvalidFitTarget);
        }
        let scale = match fill_scale(avail_w, avail_h, b.width(), b.height()) {
            Some(k) => rotated.scale * k,
            None => rotated.scale,
        };
        debug!(?id, rotation, scale, "fit_within");
        self.set_transform(id, Transform { rotation, scale })?;

        let placed = self.bounds(id)?.inflated(pad);
        let desired = match options.at {
            Some(rel) => Some(clamp_center(target.resolve(rel), &placed, &target)),
            None if options.recenter => Some(target.center()),
            None => None,
        };
        if let Some(center) = desired {
            self.move_by(id, center - placed.center())?;
        }
        Ok(())
    }
}

/// Keep a box of `extent`'s size inside `target` when centered at `p`.
fn clamp_center(p: Coord, extent: &BBox, target: &BBox) -> Coord {
    let axis = |p: f64, half: f64, lo: f64, hi: f64| {
        if lo + half > hi - half {
            (lo + hi) / 2.0
        } else {
            p.clamp(lo + half, hi - half)
        }
    };
    Coord::new(
        axis(p.x, extent.width() / 2.0, target.min.x, target.max.x),
        axis(p.y, extent.height() / 2.0, target.min.y, target.max.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_rotates_then_scales_about_pivot() {
        let t = Transform { rotation: 90.0, scale: 2.0 };
        let p = apply(&t.affine(Coord::new(1.0, 1.0)), Coord::new(2.0, 1.0));
        assert!(p.approx_eq(Coord::new(1.0, 3.0), 1e-12));
    }

    #[test]
    fn transform_rejects_bad_scale() {
        assert!(matches!(
            Transform::try_new(0.0, 0.0),
            Err(SceneError::InvalidValue { what: "scale", .. })
        ));
        assert!(Transform::try_new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn aspect_rotation_cases() {
        // already the right aspect
        assert!(aspect_matching_rotation(2.0, 1.0, 2.0).abs() < 1e-9);
        // square bounds need 45 degrees
        assert!((aspect_matching_rotation(2.0, 1.0, 1.0) - 45.0).abs() < 1e-9);
        // inverse aspect needs a quarter turn
        assert!((aspect_matching_rotation(2.0, 1.0, 0.5) - 90.0).abs() < 1e-9);
        // unreachable targets clamp
        assert_eq!(aspect_matching_rotation(2.0, 1.0, 3.0), 0.0);
        assert_eq!(aspect_matching_rotation(2.0, 1.0, 0.25), 90.0);
    }

    #[test]
    fn aspect_rotation_tall_boxes() {
        assert_eq!(aspect_matching_rotation(1.0, 2.0, 0.5), 0.0);
        assert!((aspect_matching_rotation(1.0, 2.0, 1.0) - 45.0).abs() < 1e-9);
        assert_eq!(aspect_matching_rotation(1.0, 2.0, 2.0), 90.0);
        assert_eq!(aspect_matching_rotation(1.0, 2.0, 0.1), 0.0);
        assert_eq!(aspect_matching_rotation(1.0, 2.0, 5.0), 90.0);

        // in-range targets are actually reached
        let theta = aspect_matching_rotation(1.0, 2.0, 1.5).to_radians();
        let (s, c) = theta.sin_cos();
        let aspect = (c + 2.0 * s) / (s + 2.0 * c);
        assert!((aspect - 1.5).abs() < 1e-9);
    }

    #[test]
    fn aspect_rotation_degenerate_boxes() {
        assert_eq!(aspect_matching_rotation(3.0, 3.0, 2.0), 0.0);
        assert_eq!(aspect_matching_rotation(0.0, 3.0, 2.0), 0.0);
    }

    #[test]
    fn fill_scale_ignores_flat_axes() {
        assert_eq!(fill_scale(100.0, 50.0, 10.0, 10.0), Some(5.0));
        assert_eq!(fill_scale(100.0, 50.0, 10.0, 0.0), Some(10.0));
        assert_eq!(fill_scale(100.0, 50.0, 0.0, 0.0), None);
    }

    #[test]
    fn scan_finds_peak() {
        let best = scan_rotation(|a| Ok(-(a - 33.3).powi(2))).unwrap();
        assert!((best - 33.3).abs() < 0.01);
    }

    #[test]
    fn clamp_keeps_box_inside() {
        let target = BBox::from_origin_size(Coord::ZERO, 100.0, 100.0);
        let extent = BBox::from_origin_size(Coord::ZERO, 20.0, 20.0);
        let c = clamp_center(Coord::new(100.0, 0.0), &extent, &target);
        assert_eq!(c, Coord::new(90.0, 10.0));
    }
}
