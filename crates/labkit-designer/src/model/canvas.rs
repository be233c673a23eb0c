use crate::geometry::Bounds;
use labkit_core::constants::{GRID_STEP, TOLERANCE};
use labkit_core::CanvasId;
use serde::{Deserialize, Serialize};

/// The drawing sheet a floor lives on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub id: CanvasId,
    /// Width in meters
    pub width_m: f64,
    /// Height in meters
    pub height_m: f64,
    /// Grid step for snap-to-grid
    #[serde(default = "default_grid_step")]
    pub grid_step_m: f64,
    /// Tolerance for snapping and merging
    #[serde(default = "default_tolerance")]
    pub tolerance_m: f64,
}

fn default_grid_step() -> f64 {
    GRID_STEP
}

fn default_tolerance() -> f64 {
    TOLERANCE
}

impl CanvasSpec {
    pub fn new(id: impl Into<CanvasId>, width_m: f64, height_m: f64) -> Self {
        Self {
            id: id.into(),
            width_m,
            height_m,
            grid_step_m: GRID_STEP,
            tolerance_m: TOLERANCE,
        }
    }

    /// The sheet as bounds with the origin at the top-left.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(0.0, 0.0, self.width_m, self.height_m)
    }
}
