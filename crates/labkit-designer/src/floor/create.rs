//! "New" commands with their default sizes and labels.

use super::Floor;
use crate::collision::resolve_overlaps;
use crate::edge_anchor::reanchor_opening;
use crate::geometry::{Axis, Bounds, Point};
use crate::model::{Area, AreaPolygon, Block, FixtureKind, InnerFixture, Opening, OpeningKind};
use crate::placement::{place_fixture, tuning};
use labkit_core::constants::{DEFAULT_OPENING_LEN, MAX_BLOCK_SIZE, MAX_Z_ORDER, MIN_BLOCK_SIZE};
use labkit_core::{
    clamp_between, AreaId, BenchId, BlockId, FixtureId, InstallationId, LayoutError, OpeningId,
    PolygonId,
};

const NEW_AREA_SIZE: f64 = 2.0;
const NEW_AREA_ORIGIN: f64 = 0.5;
const NEW_AREA_COLOR: &str = "#E6E6E6";
const NEW_BLOCK_COLOR: &str = "#2563eb";
const BENCH_LABEL: &str = "MESON";
const INSTALLATION_LABEL: &str = "INSTALACION";
const FIXTURE_DEPTH_M: f64 = 0.6;

impl Floor {
    /// Register a new, empty area.
    pub fn add_area(&mut self, name: impl Into<String>) -> AreaId {
        let id = AreaId::generate();
        self.upsert_area(Area::new(id.clone(), name));
        id
    }

    fn next_polygon_z(&self) -> i32 {
        let max = self.polygons().map(|p| p.z_order).max().unwrap_or(0);
        max.saturating_add(1).clamp(0, MAX_Z_ORDER)
    }

    /// Add a 2×2 m rectangle to `area`, pushed clear of the visible areas.
    pub fn new_area_polygon(&mut self, area: &AreaId) -> Result<PolygonId, LayoutError> {
        self.area(area)?;
        let id = PolygonId::generate();
        let origin = self.snap(NEW_AREA_ORIGIN, true);
        let limits = self.limits();
        let size_x = NEW_AREA_SIZE.min(limits.width());
        let size_y = NEW_AREA_SIZE.min(limits.height());
        let rect = Bounds::from_rect(origin, origin, size_x, size_y);

        let siblings: Vec<Bounds> = self.visible_polygons().iter().map(|p| p.bounds()).collect();
        let resolution = resolve_overlaps(rect, &siblings, &limits, None, &tuning(self.geometry()));
        if !resolution.converged {
            tracing::warn!(area = %area, "no free room for a new polygon");
            return Err(LayoutError::CollisionUnresolved { id: id.to_string() });
        }

        let mut polygon = AreaPolygon::rectangle(id.clone(), area.clone(), resolution.bounds);
        polygon.round_vertices();
        polygon.z_order = self.next_polygon_z();
        polygon.color = Some(NEW_AREA_COLOR.to_string());
        self.upsert_polygon(polygon);
        tracing::debug!(polygon = %id, area = %area, "created area polygon");
        Ok(id)
    }

    /// Add a door or window on the top edge of the area's first polygon.
    pub fn new_opening(&mut self, kind: OpeningKind, area: &AreaId) -> Result<OpeningId, LayoutError> {
        let host = self
            .polygons_of(area)
            .first()
            .map(|p| p.bounds())
            .ok_or_else(|| LayoutError::EmptyArea {
                area: area.to_string(),
            })?;
        let length = DEFAULT_OPENING_LEN
            .min(host.width())
            .max(self.geometry().min_opening_len_m);
        let anchor = Point::new(host.center().x - length / 2.0, host.min_y);

        let id = OpeningId::generate();
        self.upsert_opening(Opening::new(id.clone(), kind, anchor, length, Axis::X, area.clone()))?;
        reanchor_opening(self, &id)?;
        Ok(id)
    }

    /// Next free bench label in an area: "MESON", "MESON 02", "MESON 03", ...
    ///
    /// Comparison ignores case.
    pub fn unique_bench_name(&self, area: &AreaId) -> String {
        let taken: Vec<String> = self
            .fixtures_of(area)
            .iter()
            .filter_map(|f| f.label.as_ref())
            .map(|l| l.trim().to_uppercase())
            .collect();
        if !taken.iter().any(|l| l == BENCH_LABEL) {
            return BENCH_LABEL.to_string();
        }
        (2..)
            .map(|n| format!("{} {:02}", BENCH_LABEL, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| BENCH_LABEL.to_string())
    }

    fn new_fixture(
        &mut self,
        parent: &PolygonId,
        fraction: f64,
        max_w: f64,
        max_h: f64,
        kind: FixtureKind,
        label: String,
    ) -> Result<FixtureId, LayoutError> {
        let poly = self.polygon(parent)?.clone();
        let pb = poly.bounds();
        let w = max_w.min(fraction * pb.width());
        let h = max_h.min(fraction * pb.height());
        let rel = Bounds::from_rect((pb.width() - w) / 2.0, (pb.height() - h) / 2.0, w, h);

        let id = FixtureId::generate();
        let mut fixture = InnerFixture::new(id.clone(), poly.area_id.clone(), parent.clone(), rel)
            .with_kind(kind);
        fixture.label = Some(label);
        fixture.depth_m = Some(FIXTURE_DEPTH_M);
        self.upsert_fixture(fixture)?;

        let desired = rel.translate(pb.min_x, pb.min_y);
        place_fixture(self, &id, desired)?;
        Ok(id)
    }

    /// Add a bench centred in `parent`.
    pub fn new_bench(&mut self, parent: &PolygonId) -> Result<FixtureId, LayoutError> {
        let area = self.polygon(parent)?.area_id.clone();
        let label = self.unique_bench_name(&area);
        let kind = FixtureKind::Bench {
            bench_id: BenchId::generate(),
        };
        self.new_fixture(parent, 0.4, 1.2, 0.8, kind, label)
    }

    /// Add an installation centred in `parent`.
    pub fn new_installation(&mut self, parent: &PolygonId) -> Result<FixtureId, LayoutError> {
        let kind = FixtureKind::Installation {
            installation_id: InstallationId::generate(),
        };
        self.new_fixture(parent, 0.35, 1.0, 1.0, kind, INSTALLATION_LABEL.to_string())
    }

    /// Add a block centred on its area. Sizes are clamped to 0.1..10 m.
    pub fn new_block(&mut self, area: &AreaId, width: f64, height: f64) -> Result<BlockId, LayoutError> {
        for (field, value) in [("width", width), ("height", height)] {
            if !value.is_finite() {
                return Err(LayoutError::InvalidDimension {
                    field: field.to_string(),
                    value,
                });
            }
        }
        self.block_anchor(area)?;
        let width = clamp_between(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE, width);
        let height = clamp_between(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE, height);

        let id = BlockId::generate();
        let mut block = Block::new(id.clone(), area.clone(), width, height);
        block.offset_x = -width / 2.0;
        block.offset_y = -height / 2.0;
        block.z_order = self
            .blocks()
            .map(|b| b.z_order)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
            .clamp(0, MAX_Z_ORDER);
        block.color = Some(NEW_BLOCK_COLOR.to_string());
        self.upsert_block(block)?;

        let desired = self.block_rect(&id)?;
        crate::placement::place_block(self, &id, desired)?;
        Ok(id)
    }
}
