//! Floor entities.
//!
//! Every entity refers to others by identifier only; the [`crate::floor::Floor`]
//! arena resolves those references.

pub mod area;
pub mod canvas;
pub mod fixture;
pub mod opening;
pub mod polygon;

pub use area::Area;
pub use canvas::CanvasSpec;
pub use fixture::{Block, FixtureKind, InnerFixture, KindTag};
pub use opening::{EdgePreference, Opening, OpeningKind};
pub use polygon::{AreaPolygon, Corner};
