//! # LabKit Core
//!
//! Core types and utilities shared by the LabKit crates.
//! Provides identifier newtypes, unit and rounding helpers, the table of
//! geometric constants used by the layout engine, and the error types.

pub mod constants;
pub mod error;
pub mod ids;
pub mod units;

pub use error::{Error, LayoutError, Result, StoreError};

pub use ids::{
    AreaId, BenchId, BlockId, CanvasId, FixtureId, InstallationId, LevelId, MaterialId, OpeningId,
    PolygonId,
};

pub use units::{clamp_between, round_mm, round_to, snap_value};
