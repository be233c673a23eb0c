//! # LabKit
//!
//! Interactive layout engine for laboratory floor plans:
//! - Polygonal areas whose visible outline is the union of their polygons
//! - Benches and installations kept inside the real shape of their area
//! - Free blocks positioned from an area's center
//! - Doors and windows glued to area edges, aware of the room next door
//! - Pan/zoom viewport and a pointer-driven editing state machine
//!
//! ## Architecture
//!
//! LabKit is organized as a workspace with multiple crates:
//!
//! 1. **labkit-core** - Identifiers, units, geometric constants, errors
//! 2. **labkit-settings** - Editor, geometry and viewport configuration
//! 3. **labkit-designer** - Floor model, layout engine, interaction, persistence
//! 4. **labkit** - This crate: logging setup, re-exports and the CLI

pub use labkit_designer as designer;
pub use labkit_settings as settings;

pub use labkit_core::{
    AreaId, BlockId, Error, FixtureId, LayoutError, LevelId, OpeningId, PolygonId, Result,
    StoreError,
};

pub use labkit_designer::{
    align_all, join_vertices, AlignmentReport, Area, AreaPolygon, Block, Bounds, CanvasSpec,
    EditorSession, EntityRef, Floor, FloorStore, InnerFixture, InteractionOutcome, JsonFileStore,
    MemoryStore, Modifiers, Opening, Point, PointerTarget, Viewport,
};

pub use labkit_settings::{Config, DeletePolicy, RehomeScope, SettingsManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Installs a registry with an `EnvFilter` (`info` unless `RUST_LOG` says
/// otherwise) and a formatting layer on stderr. Calling it again once a
/// global subscriber is set is a no-op.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("logging already initialized");
    }

    Ok(())
}
