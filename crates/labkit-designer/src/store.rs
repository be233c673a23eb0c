//! Persistence contract.
//!
//! The engine reads and writes plain records. A [`FloorStore`] loads every
//! record of one floor and saves entity by entity (upsert by identifier,
//! explicit delete), reporting success or failure per entity. Two stores
//! ship with the crate: an in-memory one and a JSON document on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::edge_anchor::carrying_polygon;
use crate::floor::{EntityRef, Floor, Removal};
use crate::geometry::{Bounds, Point};
use crate::model::{Area, AreaPolygon, Block, CanvasSpec, InnerFixture, Opening, OpeningKind};
use labkit_core::{AreaId, LayoutError, OpeningId, PolygonId, StoreError};
use labkit_settings::Config;

/// Floor file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Stored form of an area polygon.
///
/// Older records only carry the rectangle fields; they are used whenever
/// fewer than three vertices are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRecord {
    pub id: PolygonId,
    pub area_id: AreaId,
    #[serde(default)]
    pub vertices: Vec<Point>,
    #[serde(default)]
    pub x_m: f64,
    #[serde(default)]
    pub y_m: f64,
    #[serde(default)]
    pub width_m: f64,
    #[serde(default)]
    pub height_m: f64,
    #[serde(default)]
    pub z_order: i32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl From<&AreaPolygon> for PolygonRecord {
    fn from(p: &AreaPolygon) -> Self {
        let b = p.bounds();
        Self {
            id: p.id.clone(),
            area_id: p.area_id.clone(),
            vertices: p.vertices.clone(),
            x_m: b.min_x,
            y_m: b.min_y,
            width_m: b.width(),
            height_m: b.height(),
            z_order: p.z_order,
            label: p.label.clone(),
            color: p.color.clone(),
        }
    }
}

impl PolygonRecord {
    pub fn into_polygon(self) -> AreaPolygon {
        let mut polygon = if self.vertices.len() >= 3 {
            AreaPolygon::new(self.id, self.area_id, self.vertices)
        } else {
            let rect = Bounds::from_rect(self.x_m, self.y_m, self.width_m, self.height_m);
            AreaPolygon::rectangle(self.id, self.area_id, rect)
        };
        polygon.z_order = self.z_order;
        polygon.label = self.label;
        polygon.color = self.color;
        polygon
    }
}

/// Stored form of a door or window: its two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningRecord {
    pub id: OpeningId,
    pub kind: OpeningKind,
    pub area_a: AreaId,
    #[serde(default)]
    pub area_b: Option<AreaId>,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl From<&Opening> for OpeningRecord {
    fn from(o: &Opening) -> Self {
        let end = o.end();
        Self {
            id: o.id.clone(),
            kind: o.kind,
            area_a: o.area_a.clone(),
            area_b: o.area_b.clone(),
            x1: o.anchor.x,
            y1: o.anchor.y,
            x2: end.x,
            y2: end.y,
        }
    }
}

impl OpeningRecord {
    pub fn into_opening(self, min_len: f64) -> Opening {
        let mut opening = Opening::from_endpoints(
            self.id,
            self.kind,
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y2),
            self.area_a,
            min_len,
        );
        opening.area_b = self.area_b;
        opening
    }
}

/// One record of any kind, as handed to [`FloorStore::upsert`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityRecord {
    Area(Area),
    Polygon(PolygonRecord),
    Fixture(InnerFixture),
    Block(Block),
    Opening(OpeningRecord),
}

impl EntityRecord {
    pub fn entity(&self) -> EntityRef {
        match self {
            EntityRecord::Area(a) => EntityRef::Area(a.id.clone()),
            EntityRecord::Polygon(p) => EntityRef::Polygon(p.id.clone()),
            EntityRecord::Fixture(f) => EntityRef::Fixture(f.id.clone()),
            EntityRecord::Block(b) => EntityRef::Block(b.id.clone()),
            EntityRecord::Opening(o) => EntityRef::Opening(o.id.clone()),
        }
    }
}

/// Every record of one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorRecords {
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub polygons: Vec<PolygonRecord>,
    #[serde(default)]
    pub fixtures: Vec<InnerFixture>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub openings: Vec<OpeningRecord>,
}

impl FloorRecords {
    pub fn new(canvas: CanvasSpec) -> Self {
        Self {
            canvas,
            areas: Vec::new(),
            polygons: Vec::new(),
            fixtures: Vec::new(),
            blocks: Vec::new(),
            openings: Vec::new(),
        }
    }

    fn upsert_in<T>(list: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
        match list.iter_mut().find(|x| same(x)) {
            Some(slot) => *slot = item,
            None => list.push(item),
        }
    }

    /// Replace the record with the same identifier, or add it.
    pub fn upsert(&mut self, record: EntityRecord) {
        match record {
            EntityRecord::Area(a) => {
                let id = a.id.clone();
                Self::upsert_in(&mut self.areas, a, |x| x.id == id)
            }
            EntityRecord::Polygon(p) => {
                let id = p.id.clone();
                Self::upsert_in(&mut self.polygons, p, |x| x.id == id)
            }
            EntityRecord::Fixture(f) => {
                let id = f.id.clone();
                Self::upsert_in(&mut self.fixtures, f, |x| x.id == id)
            }
            EntityRecord::Block(b) => {
                let id = b.id.clone();
                Self::upsert_in(&mut self.blocks, b, |x| x.id == id)
            }
            EntityRecord::Opening(o) => {
                let id = o.id.clone();
                Self::upsert_in(&mut self.openings, o, |x| x.id == id)
            }
        }
    }

    /// Remove a record; `false` when it was not there.
    pub fn delete(&mut self, entity: &EntityRef) -> bool {
        fn remove<T>(list: &mut Vec<T>, hit: impl Fn(&T) -> bool) -> bool {
            let before = list.len();
            list.retain(|x| !hit(x));
            list.len() != before
        }
        match entity {
            EntityRef::Area(id) => remove(&mut self.areas, |x| &x.id == id),
            EntityRef::Polygon(id) => remove(&mut self.polygons, |x| &x.id == id),
            EntityRef::Fixture(id) => remove(&mut self.fixtures, |x| &x.id == id),
            EntityRef::Block(id) => remove(&mut self.blocks, |x| &x.id == id),
            EntityRef::Opening(id) => remove(&mut self.openings, |x| &x.id == id),
        }
    }
}

impl Floor {
    /// Build the in-memory floor from stored records.
    ///
    /// The canvas grid step and tolerance override the geometry settings.
    /// A fixture whose parent polygon does not exist fails the load.
    pub fn from_records(records: FloorRecords, mut settings: Config) -> Result<Floor, LayoutError> {
        settings.editor.grid_step_m = records.canvas.grid_step_m;
        settings.geometry.tolerance_m = records.canvas.tolerance_m;
        let min_len = settings.geometry.min_opening_len_m;
        let mut floor = Floor::with_settings(records.canvas, settings);

        for area in records.areas {
            floor.upsert_area(area);
        }
        for p in records.polygons {
            floor.upsert_polygon(p.into_polygon());
        }
        for f in records.fixtures {
            floor.upsert_fixture(f)?;
        }
        for b in records.blocks {
            floor.upsert_block(b)?;
        }
        // The carrying polygon is not persisted
        for o in records.openings {
            let mut opening = o.into_opening(min_len);
            opening.host = carrying_polygon(&floor, &opening);
            floor.upsert_opening(opening)?;
        }

        tracing::info!(
            canvas = %floor.canvas().id,
            areas = floor.areas().count(),
            polygons = floor.polygons().count(),
            "floor loaded"
        );
        Ok(floor)
    }

    pub fn to_records(&self) -> FloorRecords {
        FloorRecords {
            canvas: self.canvas().clone(),
            areas: self.areas().cloned().collect(),
            polygons: self.polygons().map(PolygonRecord::from).collect(),
            fixtures: self.fixtures().cloned().collect(),
            blocks: self.blocks().cloned().collect(),
            openings: self.openings().map(OpeningRecord::from).collect(),
        }
    }

    /// Stored form of one entity.
    pub fn to_record(&self, entity: &EntityRef) -> Result<EntityRecord, LayoutError> {
        Ok(match entity {
            EntityRef::Area(id) => EntityRecord::Area(self.area(id)?.clone()),
            EntityRef::Polygon(id) => EntityRecord::Polygon(self.polygon(id)?.into()),
            EntityRef::Fixture(id) => EntityRecord::Fixture(self.fixture(id)?.clone()),
            EntityRef::Block(id) => EntityRecord::Block(self.block(id)?.clone()),
            EntityRef::Opening(id) => EntityRecord::Opening(self.opening(id)?.into()),
        })
    }
}

/// Storage collaborator for one floor.
pub trait FloorStore {
    fn load(&self) -> Result<FloorRecords, StoreError>;

    /// Create or replace a record by identifier.
    fn upsert(&mut self, record: EntityRecord) -> Result<(), StoreError>;

    fn delete(&mut self, entity: &EntityRef) -> Result<(), StoreError>;

    /// Make pending writes durable.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn not_found(entity: &EntityRef) -> StoreError {
    let (kind, id) = match entity {
        EntityRef::Area(id) => ("area", id.to_string()),
        EntityRef::Polygon(id) => ("polygon", id.to_string()),
        EntityRef::Fixture(id) => ("fixture", id.to_string()),
        EntityRef::Block(id) => ("block", id.to_string()),
        EntityRef::Opening(id) => ("opening", id.to_string()),
    };
    StoreError::NotFound {
        kind: kind.to_string(),
        id,
    }
}

/// Keeps records in memory. Individual identifiers can be made to fail,
/// which stands in for a flaky backend.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: FloorRecords,
    failing: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new(records: FloorRecords) -> Self {
        Self {
            records,
            failing: BTreeSet::new(),
        }
    }

    pub fn records(&self) -> &FloorRecords {
        &self.records
    }

    /// Make every write to `id` fail with `Rejected`.
    pub fn fail_on(&mut self, id: impl Into<String>) {
        self.failing.insert(id.into());
    }

    fn check(&self, entity: &EntityRef) -> Result<(), StoreError> {
        let (kind, id) = match entity {
            EntityRef::Area(id) => ("area", id.as_str()),
            EntityRef::Polygon(id) => ("polygon", id.as_str()),
            EntityRef::Fixture(id) => ("fixture", id.as_str()),
            EntityRef::Block(id) => ("block", id.as_str()),
            EntityRef::Opening(id) => ("opening", id.as_str()),
        };
        if self.failing.contains(id) {
            return Err(StoreError::Rejected {
                kind: kind.to_string(),
                id: id.to_string(),
                reason: "backend refused the write".to_string(),
            });
        }
        Ok(())
    }
}

impl FloorStore for MemoryStore {
    fn load(&self) -> Result<FloorRecords, StoreError> {
        Ok(self.records.clone())
    }

    fn upsert(&mut self, record: EntityRecord) -> Result<(), StoreError> {
        self.check(&record.entity())?;
        self.records.upsert(record);
        Ok(())
    }

    fn delete(&mut self, entity: &EntityRef) -> Result<(), StoreError> {
        self.check(entity)?;
        if self.records.delete(entity) {
            Ok(())
        } else {
            Err(not_found(entity))
        }
    }
}

/// Floor file metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Complete floor document as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorFile {
    pub version: String,
    pub metadata: FloorMetadata,
    #[serde(flatten)]
    pub records: FloorRecords,
}

impl FloorFile {
    pub fn new(name: impl Into<String>, records: FloorRecords) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: FloorMetadata {
                name: name.into(),
                created: now,
                modified: now,
            },
            records,
        }
    }

    /// Save floor to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize floor")?;
        std::fs::write(path.as_ref(), json).context("Failed to write floor file")?;
        Ok(())
    }

    /// Load floor from file
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).context("Failed to read floor file")?;
        let file: FloorFile = serde_json::from_str(&content).context("Failed to parse floor file")?;
        Ok(file)
    }
}

/// A floor document on disk. Writes are buffered until [`FloorStore::flush`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    file: FloorFile,
    dirty: bool,
}

impl JsonFileStore {
    /// Open an existing floor document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let file: FloorFile = serde_json::from_str(&content)?;
        Ok(Self {
            path,
            file,
            dirty: false,
        })
    }

    /// Start a new floor document; nothing is written until flushed.
    pub fn create(path: impl Into<PathBuf>, name: impl Into<String>, canvas: CanvasSpec) -> Self {
        Self {
            path: path.into(),
            file: FloorFile::new(name, FloorRecords::new(canvas)),
            dirty: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &FloorMetadata {
        &self.file.metadata
    }
}

impl FloorStore for JsonFileStore {
    fn load(&self) -> Result<FloorRecords, StoreError> {
        Ok(self.file.records.clone())
    }

    fn upsert(&mut self, record: EntityRecord) -> Result<(), StoreError> {
        self.file.records.upsert(record);
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, entity: &EntityRef) -> Result<(), StoreError> {
        if !self.file.records.delete(entity) {
            return Err(not_found(entity));
        }
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        self.file.metadata.modified = Utc::now();
        let json = serde_json::to_string_pretty(&self.file)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        self.dirty = false;
        tracing::info!(path = %self.path.display(), "floor saved");
        Ok(())
    }
}

/// Per-entity result of a save.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub results: Vec<(EntityRef, Result<(), StoreError>)>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&EntityRef, &StoreError)> {
        self.results
            .iter()
            .filter_map(|(e, r)| r.as_ref().err().map(|err| (e, err)))
    }

    pub fn saved(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }
}

/// Upsert the given entities, then flush.
///
/// Each entity gets its own result; an entity that no longer exists on the
/// floor is reported as not found. A failing flush is returned as an error
/// since nothing may have reached storage.
pub fn save_entities(
    store: &mut impl FloorStore,
    floor: &Floor,
    entities: &[EntityRef],
) -> Result<SaveReport, StoreError> {
    let mut report = SaveReport::default();
    for entity in entities {
        let result = match floor.to_record(entity) {
            Ok(record) => store.upsert(record),
            Err(_) => Err(not_found(entity)),
        };
        if let Err(err) = &result {
            tracing::warn!(%entity, error = %err, "entity not saved");
        }
        report.results.push((entity.clone(), result));
    }
    store.flush()?;
    Ok(report)
}

/// Save every entity of the floor.
pub fn save_floor(store: &mut impl FloorStore, floor: &Floor) -> Result<SaveReport, StoreError> {
    save_entities(store, floor, &floor.entity_refs())
}

/// Persist the outcome of a removal: deletes first, then side-effect updates.
pub fn save_removal(store: &mut impl FloorStore, floor: &Floor, removal: &Removal) -> Result<SaveReport, StoreError> {
    let mut report = SaveReport::default();
    for entity in &removal.removed {
        let result = store.delete(entity);
        report.results.push((entity.clone(), result));
    }
    let updates = save_entities(store, floor, &removal.updated)?;
    report.results.extend(updates.results);
    Ok(report)
}

/// Load a floor through a store.
pub fn load_floor(store: &impl FloorStore, settings: Config) -> labkit_core::Result<Floor> {
    let records = store.load()?;
    Ok(Floor::from_records(records, settings)?)
}
