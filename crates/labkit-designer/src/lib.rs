//! # LabKit Designer
//!
//! Interactive layout engine for laboratory floor plans. A floor is a set of
//! polygonal areas holding nested fixtures (benches, installations), free
//! blocks, and doors and windows anchored to area edges. The engine keeps
//! that model penetration-free while it is dragged around.
//!
//! ## Core Components
//!
//! - **Geometry**: polygon area and centroid, point-in-polygon, segment
//!   intersection, bounds
//! - **Outline**: visible boundary of an area built from its polygons
//! - **Collision**: minimal-displacement separation of rectangles
//! - **Placement**: containment and rehoming of fixtures and blocks
//! - **Edge anchor**: doors and windows glued to area edges
//! - **Alignment**: batch cleanup of hairline gaps between areas
//! - **Viewport**: screen to world mapping, pan and zoom
//!
//! ## Architecture
//!
//! ```text
//! EditorSession (pointer state machine)
//!   ├── Viewport (screen <-> world)
//!   └── Floor (arena of areas, polygons, fixtures, blocks, openings)
//!         ├── Placement / Edge anchor / Collision
//!         └── Geometry / Outline
//!
//! FloorStore (load records, upsert/delete per entity)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labkit_designer::{CanvasSpec, EditorSession, Floor, Modifiers, PointerTarget};
//!
//! let mut floor = Floor::new(CanvasSpec::new("main", 20.0, 12.0));
//! let area = floor.add_area("Chemistry");
//! let poly = floor.new_area_polygon(&area)?;
//!
//! let mut session = EditorSession::new(floor);
//! session.pointer_down(PointerTarget::Area(poly), 100.0, 100.0, Modifiers::NONE)?;
//! session.pointer_move(180.0, 100.0, Modifiers::NONE)?;
//! let outcome = session.pointer_up(180.0, 100.0)?;
//! ```

pub mod alignment;
pub mod collision;
pub mod edge_anchor;
pub mod floor;
pub mod geometry;
pub mod interaction;
pub mod join;
pub mod model;
pub mod outline;
pub mod placement;
pub mod store;
pub mod viewport;

pub use alignment::{align_all, AlignmentReport};
pub use collision::{CollisionTuning, Resolution};
pub use edge_anchor::{EdgeHit, EdgeSide};
pub use floor::{AreaEdit, EntityRef, EntitySnapshot, Floor, Removal};
pub use geometry::{Axis, Bounds, Point};
pub use interaction::{EditorSession, Interaction, InteractionOutcome, Item, Modifiers, PointerTarget};
pub use join::{join_vertices, JoinMode, JoinOutcome};
pub use model::{
    Area, AreaPolygon, Block, CanvasSpec, Corner, EdgePreference, FixtureKind, InnerFixture,
    KindTag, Opening, OpeningKind,
};
pub use outline::Segment;
pub use placement::{ClampResult, PlacementOutcome};
pub use store::{
    EntityRecord, FloorFile, FloorRecords, FloorStore, JsonFileStore, MemoryStore, SaveReport,
};
pub use viewport::{ClickTracker, Viewport};
