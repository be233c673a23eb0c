//! LabKit user configuration.
//!
//! Stored as JSON or TOML, picked by file extension.
//!
//! Configuration is organized into logical sections:
//! - Editor behaviour (grid snap, containment strictness, deletion policy)
//! - Geometry tuning (tolerances, guards, iteration budgets)
//! - Viewport limits (zoom range, click-vs-drag threshold)

use crate::error::{SettingsError, SettingsResult};
use labkit_core::constants;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which polygons a dragged fixture may be rehomed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RehomeScope {
    /// Only polygons of the fixture's own area
    #[default]
    OwningArea,
    /// Any visible polygon; crossing into another area transfers ownership
    VisibleFloor,
}

/// What happens when the last polygon of a non-empty area is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Refuse the removal
    #[default]
    Reject,
    /// Remove the area's fixtures, blocks and owned openings as well
    Cascade,
}

/// Editor behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Grid step in meters
    pub grid_step_m: f64,
    /// Snap free drags to the grid (Shift disables it per event)
    pub snap_to_grid: bool,
    /// Reject placements that only fit their parent's bounding box
    pub strict_containment: bool,
    /// Rehoming scope for dragged fixtures
    pub rehome_scope: RehomeScope,
    /// Removal policy for an area's last polygon
    pub delete_policy: DeletePolicy,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_step_m: constants::GRID_STEP,
            snap_to_grid: true,
            strict_containment: false,
            rehome_scope: RehomeScope::OwningArea,
            delete_policy: DeletePolicy::Reject,
        }
    }
}

/// Geometric tuning of the layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    pub tolerance_m: f64,
    pub corner_guard_m: f64,
    pub edge_eps_m: f64,
    pub min_neighbour_overlap_m: f64,
    pub min_opening_len_m: f64,
    pub collision_eps_m: f64,
    pub containment_pad_m: f64,
    pub collision_passes: usize,
    pub alignment_passes: usize,
    pub nudge_iterations: usize,
    /// Score multiplier for a fixture's current parent
    pub parent_bias: f64,
    /// Cost multiplier for an opening's previous edge
    pub preferred_edge_discount: f64,
    pub min_area_size_m: f64,
    pub min_fixture_size_m: f64,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            tolerance_m: constants::TOLERANCE,
            corner_guard_m: constants::CORNER_GUARD,
            edge_eps_m: constants::EDGE_EPS,
            min_neighbour_overlap_m: constants::MIN_NEIGHBOUR_OVERLAP,
            min_opening_len_m: constants::MIN_OPENING_LEN,
            collision_eps_m: constants::COLLISION_EPS,
            containment_pad_m: constants::CONTAINMENT_PAD,
            collision_passes: constants::COLLISION_PASSES,
            alignment_passes: constants::ALIGNMENT_PASSES,
            nudge_iterations: constants::NUDGE_ITERATIONS,
            parent_bias: constants::PARENT_BIAS,
            preferred_edge_discount: constants::PREFERRED_EDGE_DISCOUNT,
            min_area_size_m: constants::MIN_AREA_SIZE,
            min_fixture_size_m: constants::MIN_FIXTURE_SIZE,
        }
    }
}

/// Viewport limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Nominal drawing width in pixels at zoom 1
    pub nominal_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom factor per wheel notch or button press
    pub zoom_step: f64,
    /// Pointer travel before a background press becomes a pan
    pub drag_threshold_px: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            nominal_px: constants::NOMINAL_SVG_PX,
            min_zoom: constants::MIN_ZOOM,
            max_zoom: constants::MAX_ZOOM,
            zoom_step: constants::ZOOM_STEP,
            drag_threshold_px: constants::DRAG_THRESHOLD_PX,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Editor behaviour
    pub editor: EditorSettings,
    /// Geometry tuning
    pub geometry: GeometrySettings,
    /// Viewport limits
    pub viewport: ViewportSettings,
}

impl Config {
    /// Read and validate a settings file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match file_format(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate, then write in the format the extension names.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match file_format(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the layout engine cannot work with.
    pub fn validate(&self) -> SettingsResult<()> {
        positive("editor.grid_step_m", self.editor.grid_step_m)?;

        let g = &self.geometry;
        positive("geometry.tolerance_m", g.tolerance_m)?;
        positive("geometry.edge_eps_m", g.edge_eps_m)?;
        positive("geometry.min_opening_len_m", g.min_opening_len_m)?;
        positive("geometry.collision_eps_m", g.collision_eps_m)?;
        positive("geometry.min_area_size_m", g.min_area_size_m)?;
        positive("geometry.min_fixture_size_m", g.min_fixture_size_m)?;
        non_negative("geometry.corner_guard_m", g.corner_guard_m)?;
        non_negative("geometry.min_neighbour_overlap_m", g.min_neighbour_overlap_m)?;
        non_negative("geometry.containment_pad_m", g.containment_pad_m)?;

        if g.collision_passes == 0 || g.alignment_passes == 0 || g.nudge_iterations == 0 {
            return Err(SettingsError::Invalid {
                key: "geometry".to_string(),
                reason: "iteration budgets must be > 0".to_string(),
            });
        }

        if g.parent_bias < 1.0 {
            return Err(SettingsError::OutOfRange {
                key: "geometry.parent_bias".to_string(),
                value: g.parent_bias,
            });
        }

        if !(0.0..=1.0).contains(&g.preferred_edge_discount) || g.preferred_edge_discount == 0.0 {
            return Err(SettingsError::OutOfRange {
                key: "geometry.preferred_edge_discount".to_string(),
                value: g.preferred_edge_discount,
            });
        }

        let v = &self.viewport;
        positive("viewport.nominal_px", v.nominal_px)?;
        positive("viewport.min_zoom", v.min_zoom)?;
        non_negative("viewport.drag_threshold_px", v.drag_threshold_px)?;

        if v.max_zoom < v.min_zoom {
            return Err(SettingsError::Invalid {
                key: "viewport.max_zoom".to_string(),
                reason: "must not be below min_zoom".to_string(),
            });
        }

        if v.zoom_step <= 1.0 {
            return Err(SettingsError::OutOfRange {
                key: "viewport.zoom_step".to_string(),
                value: v.zoom_step,
            });
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

fn file_format(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(SettingsError::UnknownFormat {
            path: path.display().to_string(),
        }),
    }
}

fn positive(key: &str, value: f64) -> SettingsResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            key: key.to_string(),
            reason: format!("must be > 0 (got {})", value),
        })
    }
}

fn non_negative(key: &str, value: f64) -> SettingsResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            key: key.to_string(),
            reason: format!("must be >= 0 (got {})", value),
        })
    }
}
