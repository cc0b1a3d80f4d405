//! Strongly-typed coordinate primitives.
//!
//! Two point flavours share one arithmetic surface but never mix:
//! - [`Coord`]: absolute output units (pixels), renderable
//! - [`RelCoord`]: fractions of a container's width/height, must be resolved
//!   against a [`BBox`] before it can be drawn

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
pub fn finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Reject NaN, infinities, zero and negatives.
pub fn positive(val: f64) -> Result<f64, NumericError> {
    let val = finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Shared arithmetic for both point flavours.
macro_rules! vec2_ops {
    ($ty:ident) => {
        impl $ty {
            pub const ZERO: $ty = $ty { x: 0.0, y: 0.0 };

            #[inline]
            pub const fn new(x: f64, y: f64) -> Self {
                $ty { x, y }
            }

            #[inline]
            pub fn to_dvec2(self) -> DVec2 {
                dvec2(self.x, self.y)
            }

            #[inline]
            pub fn from_dvec2(v: DVec2) -> Self {
                $ty { x: v.x, y: v.y }
            }

            /// Euclidean length of the vector from the origin
            pub fn length(self) -> f64 {
                self.to_dvec2().length()
            }

            pub fn distance_to(self, other: Self) -> f64 {
                self.to_dvec2().distance(other.to_dvec2())
            }

            pub fn midpoint(self, other: Self) -> Self {
                self.lerp(other, 0.5)
            }

            /// Linear interpolation. `t` is not clamped: values outside
            /// [0,1] extrapolate along the same line.
            pub fn lerp(self, other: Self, t: f64) -> Self {
                // weighted form keeps t = 0 and t = 1 exact
                $ty {
                    x: self.x * (1.0 - t) + other.x * t,
                    y: self.y * (1.0 - t) + other.y * t,
                }
            }

            /// Unit vector in the same direction, or zero for a zero vector.
            pub fn normalized(self) -> Self {
                Self::from_dvec2(self.to_dvec2().normalize_or_zero())
            }

            pub fn dot(self, other: Self) -> f64 {
                self.to_dvec2().dot(other.to_dvec2())
            }

            /// Rotate by `angle` radians about `origin` using the standard
            /// rotation matrix. In y-down screen space a positive angle turns
            /// clockwise.
            pub fn rotated(self, angle: f64, origin: Self) -> Self {
                let (sin, cos) = angle.sin_cos();
                let d = self - origin;
                $ty {
                    x: origin.x + d.x * cos - d.y * sin,
                    y: origin.y + d.x * sin + d.y * cos,
                }
            }

            /// Rotate about the origin of the coordinate system.
            pub fn rotated_about_origin(self, angle: f64) -> Self {
                self.rotated(angle, Self::ZERO)
            }

            /// Clamp each axis independently into `[min, max]`.
            pub fn clamped(self, min: Self, max: Self) -> Self {
                $ty {
                    x: self.x.max(min.x).min(max.x),
                    y: self.y.max(min.y).min(max.y),
                }
            }

            /// Round both components to `decimals` decimal places.
            pub fn rounded(self, decimals: u32) -> Self {
                let f = 10f64.powi(decimals as i32);
                $ty {
                    x: (self.x * f).round() / f,
                    y: (self.y * f).round() / f,
                }
            }

            /// Perpendicular vector (90 degrees clockwise on screen)
            pub fn perp(self) -> Self {
                $ty { x: -self.y, y: self.x }
            }

            pub fn is_finite(self) -> bool {
                self.x.is_finite() && self.y.is_finite()
            }

            /// Approximate equality within `eps` on both axes.
            pub fn approx_eq(self, other: Self, eps: f64) -> bool {
                (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
            }
        }

        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                $ty { x: self.x + rhs.x, y: self.y + rhs.y }
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                $ty { x: self.x - rhs.x, y: self.y - rhs.y }
            }
        }

        impl Mul<f64> for $ty {
            type Output = $ty;
            fn mul(self, rhs: f64) -> $ty {
                $ty { x: self.x * rhs, y: self.y * rhs }
            }
        }

        impl Div<f64> for $ty {
            type Output = $ty;
            fn div(self, rhs: f64) -> $ty {
                $ty { x: self.x / rhs, y: self.y / rhs }
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty { x: -self.x, y: -self.y }
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: $ty) {
                self.x += rhs.x;
                self.y += rhs.y;
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, rhs: $ty) {
                self.x -= rhs.x;
                self.y -= rhs.y;
            }
        }

        impl From<(f64, f64)> for $ty {
            fn from((x, y): (f64, f64)) -> Self {
                $ty { x, y }
            }
        }
    };
}

/// Absolute 2D point in output units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

/// Position as fractions of a container's width and height.
///
/// Conventionally in [0,1] but not range-checked. Never renderable directly;
/// resolve it against a [`BBox`] first.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct RelCoord {
    pub x: f64,
    pub y: f64,
}

vec2_ops!(Coord);
vec2_ops!(RelCoord);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for RelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel({}, {})", self.x, self.y)
    }
}

/// Axis-aligned bounding box in absolute space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Coord,
    pub max: Coord,
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn empty() -> Self {
        BBox {
            min: Coord::new(f64::MAX, f64::MAX),
            max: Coord::new(f64::MIN, f64::MIN),
        }
    }

    /// Box from its top-left corner and size
    pub fn from_origin_size(origin: Coord, width: f64, height: f64) -> Self {
        BBox { min: origin, max: Coord::new(origin.x + width, origin.y + height) }
    }

    /// Box from its center and size
    pub fn from_center_size(center: Coord, width: f64, height: f64) -> Self {
        let half = Coord::new(width / 2.0, height / 2.0);
        BBox { min: center - half, max: center + half }
    }

    /// Smallest box containing every point
    pub fn from_points(points: impl IntoIterator<Item = Coord>) -> Self {
        let mut bb = BBox::empty();
        for p in points {
            bb.expand_point(p);
        }
        bb
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Coord) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand to include another box
    pub fn expand_box(&mut self, other: &BBox) {
        if !other.is_empty() {
            self.expand_point(other.min);
            self.expand_point(other.max);
        }
    }

    /// Grow every side by `amount`
    pub fn inflated(&self, amount: f64) -> BBox {
        BBox {
            min: self.min - Coord::new(amount, amount),
            max: self.max + Coord::new(amount, amount),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Coord {
        self.min.midpoint(self.max)
    }

    /// Resolve a fractional position against this box.
    pub fn resolve(&self, rel: RelCoord) -> Coord {
        Coord::new(
            self.min.x + rel.x * self.width(),
            self.min.y + rel.y * self.height(),
        )
    }

    /// Express an absolute point as fractions of this box.
    ///
    /// A zero-sized axis maps to 0 rather than dividing by zero.
    pub fn to_relative(&self, p: Coord) -> RelCoord {
        let w = self.width();
        let h = self.height();
        RelCoord::new(
            if w == 0.0 { 0.0 } else { (p.x - self.min.x) / w },
            if h == 0.0 { 0.0 } else { (p.y - self.min.y) / h },
        )
    }

    pub fn contains(&self, p: Coord) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn translated(&self, by: Coord) -> BBox {
        BBox { min: self.min + by, max: self.max + by }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_coord_eq(actual: Coord, expected: Coord) {
        const EPSILON: f64 = 1e-10;
        assert!(
            actual.approx_eq(expected, EPSILON),
            "coord mismatch: {} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn finite_rejects_nan_and_infinity() {
        assert_eq!(finite(f64::NAN), Err(NumericError::NaN));
        assert_eq!(finite(f64::INFINITY), Err(NumericError::Infinite));
        assert_eq!(finite(-3.0), Ok(-3.0));
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert_eq!(positive(0.0), Err(NumericError::Zero));
        assert_eq!(positive(-1.0), Err(NumericError::Negative));
        assert_eq!(positive(2.5), Ok(2.5));
    }

    #[test]
    fn coord_arithmetic() {
        let a = Coord::new(3.0, 4.0);
        let b = Coord::new(1.0, 2.0);
        assert_eq!(a + b, Coord::new(4.0, 6.0));
        assert_eq!(a - b, Coord::new(2.0, 2.0));
        assert_eq!(a * 2.0, Coord::new(6.0, 8.0));
        assert_eq!(a / 2.0, Coord::new(1.5, 2.0));
        assert_eq!(-a, Coord::new(-3.0, -4.0));
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.dot(b), 11.0);
    }

    #[test]
    fn lerp_extrapolates() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(10.0, 0.0);
        assert_coord_eq(a.lerp(b, 1.5), Coord::new(15.0, 0.0));
        assert_coord_eq(a.lerp(b, -0.5), Coord::new(-5.0, 0.0));
    }

    #[test]
    fn normalized_zero_is_zero() {
        assert_eq!(Coord::ZERO.normalized(), Coord::ZERO);
        assert_coord_eq(Coord::new(3.0, 4.0).normalized(), Coord::new(0.6, 0.8));
    }

    #[test]
    fn rotated_about_origin_point() {
        let p = Coord::new(2.0, 1.0);
        let origin = Coord::new(1.0, 1.0);
        let r = p.rotated(std::f64::consts::FRAC_PI_2, origin);
        assert_coord_eq(r, Coord::new(1.0, 2.0));
    }

    #[test]
    fn clamped_and_rounded() {
        let p = Coord::new(-5.0, 50.0);
        let c = p.clamped(Coord::new(0.0, 0.0), Coord::new(10.0, 10.0));
        assert_eq!(c, Coord::new(0.0, 10.0));
        assert_eq!(Coord::new(1.23456, 9.87654).rounded(2), Coord::new(1.23, 9.88));
    }

    #[test]
    fn relcoord_shares_arithmetic() {
        let a = RelCoord::new(0.25, 0.5);
        assert_eq!(a * 2.0, RelCoord::new(0.5, 1.0));
        assert_eq!(a.midpoint(RelCoord::new(0.75, 0.5)), RelCoord::new(0.5, 0.5));
    }

    #[test]
    fn bbox_resolve_and_back() {
        let frame = BBox::from_origin_size(Coord::new(10.0, 20.0), 200.0, 100.0);
        let rel = RelCoord::new(0.25, 0.75);
        let abs = frame.resolve(rel);
        assert_coord_eq(abs, Coord::new(60.0, 95.0));
        let back = frame.to_relative(abs);
        assert!(back.approx_eq(rel, 1e-12));
    }

    #[test]
    fn bbox_zero_width_to_relative() {
        let frame = BBox::from_origin_size(Coord::new(5.0, 5.0), 0.0, 10.0);
        assert_eq!(frame.to_relative(Coord::new(5.0, 10.0)), RelCoord::new(0.0, 0.5));
    }

    #[test]
    fn bbox_expand_and_center() {
        let bb = BBox::from_points([Coord::new(0.0, 0.0), Coord::new(4.0, 6.0)]);
        assert!(!bb.is_empty());
        assert_eq!(bb.width(), 4.0);
        assert_eq!(bb.height(), 6.0);
        assert_eq!(bb.center(), Coord::new(2.0, 3.0));
        assert!(BBox::empty().is_empty());
    }
}
