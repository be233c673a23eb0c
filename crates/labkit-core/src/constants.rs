//! Geometric constants of the layout engine.
//!
//! All lengths are in meters. These are the defaults; the settings crate
//! exposes each of them as a tunable value.

/// Tolerance used for snapping, merging and coincidence tests (4 mm).
pub const TOLERANCE: f64 = 0.004;

/// Default grid step for snap-to-grid while dragging.
pub const GRID_STEP: f64 = 0.25;

/// Epsilon added past an obstacle when pushing a shape out of it.
pub const COLLISION_EPS: f64 = 0.001;

/// Pass budget of the collision resolver.
pub const COLLISION_PASSES: usize = 16;

/// Pass budget of the alignment pass.
pub const ALIGNMENT_PASSES: usize = 6;

/// Iteration budget when nudging a fixture towards a polygon interior.
pub const NUDGE_ITERATIONS: usize = 40;

/// Inward pad applied to fixture corners for containment tests.
pub const CONTAINMENT_PAD: f64 = 0.002;

/// Score multiplier favouring a fixture's current parent polygon.
pub const PARENT_BIAS: f64 = 1.1;

/// Geometric tolerance when matching opening edges (0.8 mm).
pub const EDGE_EPS: f64 = 0.0008;

/// Margin near polygon corners where openings may not be anchored.
pub const CORNER_GUARD: f64 = 0.04;

/// Minimum shared span for two areas to be neighbours through an opening.
pub const MIN_NEIGHBOUR_OVERLAP: f64 = 0.06;

/// Cost multiplier applied to an opening's previous edge.
pub const PREFERRED_EDGE_DISCOUNT: f64 = 0.4;

/// Minimum door/window length.
pub const MIN_OPENING_LEN: f64 = 0.4;

/// Default door/window length for newly created openings.
pub const DEFAULT_OPENING_LEN: f64 = 1.0;

/// Minimum width/height of an area polygon.
pub const MIN_AREA_SIZE: f64 = 0.1;

/// Minimum width/height of a fixture.
pub const MIN_FIXTURE_SIZE: f64 = 0.10;

/// Block size limits.
pub const MIN_BLOCK_SIZE: f64 = 0.1;
/// Upper block size limit.
pub const MAX_BLOCK_SIZE: f64 = 10.0;

/// Refinement steps when a join has to shrink the moving polygon.
pub const JOIN_REFINE_STEPS: usize = 24;

/// Upper bound for stored z-order values.
pub const MAX_Z_ORDER: i32 = 1_000_000;

/// Nominal drawing width in pixels; pixels per meter is this over canvas width.
pub const NOMINAL_SVG_PX: f64 = 1000.0;

/// Zoom limits and wheel/button step.
pub const MIN_ZOOM: f64 = 0.3;
/// Upper zoom limit.
pub const MAX_ZOOM: f64 = 6.0;
/// Zoom factor per step.
pub const ZOOM_STEP: f64 = 1.1;

/// Pointer travel in pixels before a background press counts as a pan.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;
