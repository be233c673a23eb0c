//! Arena of floor entities.
//!
//! A [`Floor`] owns typed collections of every entity on one canvas, keyed by
//! their stable identifiers. Cross references (a fixture's parent polygon,
//! an opening's areas) are identifier lookups into these collections.

mod create;
mod edit;
mod hit;
mod remove;

pub use edit::AreaEdit;
pub use hit::DEFAULT_PICK_RADIUS;
pub use remove::Removal;

use crate::geometry::{Bounds, Point};
use crate::model::{Area, AreaPolygon, Block, CanvasSpec, InnerFixture, Opening};
use crate::outline::{self, Segment};
use labkit_core::{
    round_to, AreaId, BlockId, FixtureId, LayoutError, LevelId, OpeningId, PolygonId,
};
use labkit_settings::{Config, GeometrySettings};
use std::collections::BTreeMap;

/// Reference to any entity on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Area(AreaId),
    Polygon(PolygonId),
    Fixture(FixtureId),
    Block(BlockId),
    Opening(OpeningId),
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Area(id) => write!(f, "area {}", id),
            EntityRef::Polygon(id) => write!(f, "polygon {}", id),
            EntityRef::Fixture(id) => write!(f, "fixture {}", id),
            EntityRef::Block(id) => write!(f, "block {}", id),
            EntityRef::Opening(id) => write!(f, "opening {}", id),
        }
    }
}

/// A copy of one entity taken before an edit, used to revert it.
#[derive(Debug, Clone, PartialEq)]
pub enum EntitySnapshot {
    Area(Area),
    Polygon(AreaPolygon),
    Fixture(InnerFixture),
    Block(Block),
    Opening(Opening),
}

impl EntitySnapshot {
    pub fn entity(&self) -> EntityRef {
        match self {
            EntitySnapshot::Area(a) => EntityRef::Area(a.id.clone()),
            EntitySnapshot::Polygon(p) => EntityRef::Polygon(p.id.clone()),
            EntitySnapshot::Fixture(f) => EntityRef::Fixture(f.id.clone()),
            EntitySnapshot::Block(b) => EntityRef::Block(b.id.clone()),
            EntitySnapshot::Opening(o) => EntityRef::Opening(o.id.clone()),
        }
    }
}

/// The in-memory model of one floor.
#[derive(Debug, Clone)]
pub struct Floor {
    canvas: CanvasSpec,
    settings: Config,
    active_level: Option<LevelId>,
    areas: BTreeMap<AreaId, Area>,
    polygons: BTreeMap<PolygonId, AreaPolygon>,
    fixtures: BTreeMap<FixtureId, InnerFixture>,
    blocks: BTreeMap<BlockId, Block>,
    openings: BTreeMap<OpeningId, Opening>,
}

impl Floor {
    pub fn new(canvas: CanvasSpec) -> Self {
        Self::with_settings(canvas, Config::default())
    }

    pub fn with_settings(canvas: CanvasSpec, settings: Config) -> Self {
        Self {
            canvas,
            settings,
            active_level: None,
            areas: BTreeMap::new(),
            polygons: BTreeMap::new(),
            fixtures: BTreeMap::new(),
            blocks: BTreeMap::new(),
            openings: BTreeMap::new(),
        }
    }

    pub fn canvas(&self) -> &CanvasSpec {
        &self.canvas
    }

    pub fn settings(&self) -> &Config {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Config) {
        self.settings = settings;
    }

    pub fn geometry(&self) -> &GeometrySettings {
        &self.settings.geometry
    }

    /// Canvas limits every area must stay inside.
    pub fn limits(&self) -> Bounds {
        self.canvas.bounds()
    }

    /// Snap a length to the grid when enabled.
    pub fn snap(&self, value: f64, enabled: bool) -> f64 {
        if enabled && self.settings.editor.snap_to_grid {
            round_to(value, self.settings.editor.grid_step_m)
        } else {
            value
        }
    }

    pub fn active_level(&self) -> Option<&LevelId> {
        self.active_level.as_ref()
    }

    /// Restrict visibility to the areas of one level, or show all with `None`.
    pub fn set_active_level(&mut self, level: Option<LevelId>) {
        self.active_level = level;
    }

    // ---- areas ----

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn area(&self, id: &AreaId) -> Result<&Area, LayoutError> {
        self.areas
            .get(id)
            .ok_or_else(|| LayoutError::UnknownArea { id: id.to_string() })
    }

    pub fn area_mut(&mut self, id: &AreaId) -> Result<&mut Area, LayoutError> {
        self.areas
            .get_mut(id)
            .ok_or_else(|| LayoutError::UnknownArea { id: id.to_string() })
    }

    /// Insert or replace an area record.
    pub fn upsert_area(&mut self, area: Area) {
        self.areas.insert(area.id.clone(), area);
    }

    pub fn is_area_visible(&self, id: &AreaId) -> bool {
        match (&self.active_level, self.areas.get(id)) {
            (None, _) => true,
            (Some(level), Some(area)) => area.level.as_ref() == Some(level),
            (Some(_), None) => false,
        }
    }

    /// Bounding box of all polygons of an area.
    pub fn area_bounds(&self, id: &AreaId) -> Option<Bounds> {
        self.polygons_of(id)
            .iter()
            .map(|p| p.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Total surface of an area in m², rounded to 1e-3.
    pub fn area_total_m2(&self, id: &AreaId) -> f64 {
        let sum: f64 = self.polygons_of(id).iter().map(|p| p.area_m2()).sum();
        labkit_core::round_mm(sum)
    }

    /// Visible perimeter of an area.
    pub fn area_outline(&self, id: &AreaId) -> Vec<Segment> {
        outline::area_outline(self.polygons_of(id), self.geometry().tolerance_m)
    }

    // ---- polygons ----

    pub fn polygons(&self) -> impl Iterator<Item = &AreaPolygon> {
        self.polygons.values()
    }

    pub fn polygon(&self, id: &PolygonId) -> Result<&AreaPolygon, LayoutError> {
        self.polygons
            .get(id)
            .ok_or_else(|| LayoutError::UnknownPolygon { id: id.to_string() })
    }

    pub fn polygon_mut(&mut self, id: &PolygonId) -> Result<&mut AreaPolygon, LayoutError> {
        self.polygons
            .get_mut(id)
            .ok_or_else(|| LayoutError::UnknownPolygon { id: id.to_string() })
    }

    /// Insert or replace a polygon. Unknown areas are registered on the fly,
    /// named after their identifier.
    pub fn upsert_polygon(&mut self, polygon: AreaPolygon) {
        if !self.areas.contains_key(&polygon.area_id) {
            let id = polygon.area_id.clone();
            self.areas
                .insert(id.clone(), Area::new(id.clone(), id.to_string()));
        }
        self.polygons.insert(polygon.id.clone(), polygon);
    }

    /// Polygons of one area in paint order.
    pub fn polygons_of(&self, area: &AreaId) -> Vec<&AreaPolygon> {
        let mut out: Vec<&AreaPolygon> = self
            .polygons
            .values()
            .filter(|p| &p.area_id == area)
            .collect();
        out.sort_by(|a, b| a.z_order.cmp(&b.z_order).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Polygons of every visible area in paint order.
    pub fn visible_polygons(&self) -> Vec<&AreaPolygon> {
        let mut out: Vec<&AreaPolygon> = self
            .polygons
            .values()
            .filter(|p| self.is_area_visible(&p.area_id))
            .collect();
        out.sort_by(|a, b| a.z_order.cmp(&b.z_order).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Bounding boxes of the visible polygons other than `id`.
    pub fn sibling_bounds(&self, id: &PolygonId) -> Vec<Bounds> {
        self.visible_polygons()
            .into_iter()
            .filter(|p| &p.id != id)
            .map(|p| p.bounds())
            .collect()
    }

    // ---- fixtures ----

    pub fn fixtures(&self) -> impl Iterator<Item = &InnerFixture> {
        self.fixtures.values()
    }

    pub fn fixture(&self, id: &FixtureId) -> Result<&InnerFixture, LayoutError> {
        self.fixtures
            .get(id)
            .ok_or_else(|| LayoutError::UnknownFixture { id: id.to_string() })
    }

    pub fn fixture_mut(&mut self, id: &FixtureId) -> Result<&mut InnerFixture, LayoutError> {
        self.fixtures
            .get_mut(id)
            .ok_or_else(|| LayoutError::UnknownFixture { id: id.to_string() })
    }

    pub fn fixtures_of(&self, area: &AreaId) -> Vec<&InnerFixture> {
        self.fixtures
            .values()
            .filter(|f| &f.area_id == area)
            .collect()
    }

    /// Insert or replace a fixture. Its parent polygon must exist, and the
    /// fixture's area follows the parent.
    pub fn upsert_fixture(&mut self, mut fixture: InnerFixture) -> Result<(), LayoutError> {
        let parent = self.polygon(&fixture.parent)?;
        fixture.area_id = parent.area_id.clone();
        self.fixtures.insert(fixture.id.clone(), fixture);
        Ok(())
    }

    /// Absolute rectangle of a fixture.
    pub fn fixture_rect(&self, id: &FixtureId) -> Result<Bounds, LayoutError> {
        let fixture = self.fixture(id)?;
        let parent = self.polygon(&fixture.parent)?;
        Ok(fixture.rect_at(parent.origin()))
    }

    // ---- blocks ----

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn block(&self, id: &BlockId) -> Result<&Block, LayoutError> {
        self.blocks
            .get(id)
            .ok_or_else(|| LayoutError::UnknownBlock { id: id.to_string() })
    }

    pub fn block_mut(&mut self, id: &BlockId) -> Result<&mut Block, LayoutError> {
        self.blocks
            .get_mut(id)
            .ok_or_else(|| LayoutError::UnknownBlock { id: id.to_string() })
    }

    pub fn blocks_of(&self, area: &AreaId) -> Vec<&Block> {
        self.blocks.values().filter(|b| &b.area_id == area).collect()
    }

    /// Insert or replace a block. A material may back only one block.
    pub fn upsert_block(&mut self, block: Block) -> Result<(), LayoutError> {
        self.area(&block.area_id)?;
        if let Some(material) = &block.material_id {
            if let Some(holder) = self
                .blocks
                .values()
                .find(|b| b.id != block.id && b.material_id.as_ref() == Some(material))
            {
                return Err(LayoutError::MaterialInUse {
                    material: material.to_string(),
                    block: holder.id.to_string(),
                });
            }
        }
        self.blocks.insert(block.id.clone(), block);
        Ok(())
    }

    /// Center of the area's bounding box, the reference point of its blocks.
    pub fn block_anchor(&self, area: &AreaId) -> Result<Point, LayoutError> {
        self.area_bounds(area)
            .map(|b| b.center())
            .ok_or_else(|| LayoutError::EmptyArea {
                area: area.to_string(),
            })
    }

    /// Absolute rectangle of a block.
    pub fn block_rect(&self, id: &BlockId) -> Result<Bounds, LayoutError> {
        let block = self.block(id)?;
        Ok(block.rect_at(self.block_anchor(&block.area_id)?))
    }

    // ---- openings ----

    pub fn openings(&self) -> impl Iterator<Item = &Opening> {
        self.openings.values()
    }

    pub fn opening(&self, id: &OpeningId) -> Result<&Opening, LayoutError> {
        self.openings
            .get(id)
            .ok_or_else(|| LayoutError::UnknownOpening { id: id.to_string() })
    }

    pub fn opening_mut(&mut self, id: &OpeningId) -> Result<&mut Opening, LayoutError> {
        self.openings
            .get_mut(id)
            .ok_or_else(|| LayoutError::UnknownOpening { id: id.to_string() })
    }

    pub fn upsert_opening(&mut self, opening: Opening) -> Result<(), LayoutError> {
        self.area(&opening.area_a)?;
        self.openings.insert(opening.id.clone(), opening);
        Ok(())
    }

    /// Identifiers of all openings, for batch passes that mutate them.
    pub fn opening_ids(&self) -> Vec<OpeningId> {
        self.openings.keys().cloned().collect()
    }

    // ---- snapshots ----

    pub fn snapshot(&self, entity: &EntityRef) -> Result<EntitySnapshot, LayoutError> {
        Ok(match entity {
            EntityRef::Polygon(id) => EntitySnapshot::Polygon(self.polygon(id)?.clone()),
            EntityRef::Fixture(id) => EntitySnapshot::Fixture(self.fixture(id)?.clone()),
            EntityRef::Block(id) => EntitySnapshot::Block(self.block(id)?.clone()),
            EntityRef::Opening(id) => EntitySnapshot::Opening(self.opening(id)?.clone()),
            EntityRef::Area(id) => EntitySnapshot::Area(self.area(id)?.clone()),
        })
    }

    /// Snapshots of the fixtures hosted by `polygon` and of the blocks of
    /// its area, the entities an edit of that polygon may re-place.
    pub fn dependent_snapshots(&self, polygon: &PolygonId) -> Result<Vec<EntitySnapshot>, LayoutError> {
        let area = &self.polygon(polygon)?.area_id;
        let mut out: Vec<EntitySnapshot> = self
            .fixtures
            .values()
            .filter(|f| &f.parent == polygon)
            .cloned()
            .map(EntitySnapshot::Fixture)
            .collect();
        out.extend(self.blocks_of(area).into_iter().cloned().map(EntitySnapshot::Block));
        Ok(out)
    }

    /// Put a snapshot back in place, whatever happened to the entity since.
    pub fn restore(&mut self, snapshot: EntitySnapshot) {
        match snapshot {
            EntitySnapshot::Area(a) => {
                self.areas.insert(a.id.clone(), a);
            }
            EntitySnapshot::Polygon(p) => {
                self.polygons.insert(p.id.clone(), p);
            }
            EntitySnapshot::Fixture(f) => {
                self.fixtures.insert(f.id.clone(), f);
            }
            EntitySnapshot::Block(b) => {
                self.blocks.insert(b.id.clone(), b);
            }
            EntitySnapshot::Opening(o) => {
                self.openings.insert(o.id.clone(), o);
            }
        }
    }

    /// Every entity on the floor, areas first.
    pub fn entity_refs(&self) -> Vec<EntityRef> {
        let mut out: Vec<EntityRef> = self.areas.keys().cloned().map(EntityRef::Area).collect();
        out.extend(self.polygons.keys().cloned().map(EntityRef::Polygon));
        out.extend(self.fixtures.keys().cloned().map(EntityRef::Fixture));
        out.extend(self.blocks.keys().cloned().map(EntityRef::Block));
        out.extend(self.openings.keys().cloned().map(EntityRef::Opening));
        out
    }
}
