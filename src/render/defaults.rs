//! Default sizes and settings (output units are pixels)

/// Significant figures for numbers in path data
pub const PRECISION: i32 = 6;

pub const STROKE: &str = "black";
pub const STROKE_WIDTH: f64 = 1.0;

/// Cubic segments used when fitting a curve with no closed-form path data
pub const SEGMENTS: usize = 64;

/// Samples for the polyline arc-length fallback
pub const ARC_LENGTH_SAMPLES: usize = 256;

/// Catmull-Rom tension for the cubic fit (0.5 gives the uniform spline)
pub const FIT_TENSION: f64 = 0.5;

/// Coarse rotation scan step for `fit_within(rotate)`, degrees
pub const FIT_COARSE_STEP: f64 = 5.0;
/// Refinement passes after the coarse scan, each narrowing the step tenfold
pub const FIT_REFINE_PASSES: usize = 3;

/// Caps are drawn in a 10x10 grid scaled to `stroke_width * CAP_SIZE / 10`
pub const CAP_GRID: f64 = 10.0;
pub const CAP_SIZE: f64 = 6.0;

pub const DOT_RADIUS: f64 = 3.0;

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
