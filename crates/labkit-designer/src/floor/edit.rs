//! Editing commands on area polygons.

use super::{EntityRef, Floor};
use crate::collision::{clamp_bottom, clamp_into, clamp_left, clamp_right, clamp_top};
use crate::collision::{overlaps_any, resolve_overlaps, sweep_translate};
use crate::geometry::{bounds_of, is_simple_polygon, Bounds, Point};
use crate::model::{AreaPolygon, Block, Corner};
use crate::placement::{place_block, place_fixture, tuning};
use labkit_core::constants::MAX_Z_ORDER;
use labkit_core::{clamp_between, round_mm, AreaId, BlockId, FixtureId, LayoutError, PolygonId};

/// Result of moving or resizing an area polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaEdit {
    /// Bounds of the polygon after the edit (unchanged when not applied)
    pub bounds: Bounds,
    pub applied: bool,
    /// Whether overlap with the other areas was resolved
    pub converged: bool,
    /// Fixtures and blocks whose stored placement changed with the polygon
    pub updated: Vec<EntityRef>,
}

impl AreaEdit {
    fn rejected(bounds: Bounds, converged: bool) -> Self {
        Self {
            bounds,
            applied: false,
            converged,
            updated: Vec::new(),
        }
    }
}

/// Absolute rectangles of the entities measured from a polygon or from its
/// area's center, taken before an edit moves either reference.
#[derive(Debug, Clone, Default)]
pub(super) struct Dependents {
    fixtures: Vec<(FixtureId, Bounds)>,
    blocks: Vec<(BlockId, Bounds)>,
}

impl Dependents {
    /// Let the blocks whose center lies in `carrier` travel with it.
    fn carry_blocks(&mut self, carrier: &AreaPolygon, dx: f64, dy: f64) {
        for (_, rect) in &mut self.blocks {
            if carrier.contains(&rect.center()) {
                *rect = rect.translate(dx, dy);
            }
        }
    }
}

impl Floor {
    /// Blocks of `area` only, for edits that keep the polygon's shape.
    pub(super) fn block_dependents(&self, area: &AreaId) -> Dependents {
        let blocks = self
            .blocks_of(area)
            .iter()
            .filter_map(|b| self.block_rect(&b.id).ok().map(|r| (b.id.clone(), r)))
            .collect();
        Dependents {
            fixtures: Vec::new(),
            blocks,
        }
    }

    /// Fixtures hosted by `polygon` plus the blocks of its area.
    pub(super) fn dependents_of(&self, polygon: &AreaPolygon) -> Dependents {
        let mut deps = self.block_dependents(&polygon.area_id);
        deps.fixtures = self
            .fixtures
            .values()
            .filter(|f| f.parent == polygon.id)
            .filter_map(|f| self.fixture_rect(&f.id).ok().map(|r| (f.id.clone(), r)))
            .collect();
        deps
    }

    /// Put dependents back at their recorded rectangles after a polygon
    /// edit, then clamp each into what is left of its area.
    ///
    /// Blocks are first re-measured from the new area center so that the
    /// same-kind checks see their siblings where they really are. Returns the
    /// entities whose stored placement changed.
    pub(super) fn settle(&mut self, deps: Dependents) -> Result<Vec<EntityRef>, LayoutError> {
        let mut updated = Vec::new();

        for (id, rect) in deps.fixtures {
            let before = self.fixture(&id)?.clone();
            let outcome = place_fixture(self, &id, rect)?;
            if !outcome.is_clean() {
                tracing::warn!(fixture = %id, "fixture no longer fits its area after the edit");
            }
            if self.fixture(&id)? != &before {
                updated.push(EntityRef::Fixture(id));
            }
        }

        let before: Vec<Block> = deps
            .blocks
            .iter()
            .filter_map(|(id, _)| self.block(id).ok().cloned())
            .collect();
        for (id, rect) in &deps.blocks {
            let area = self.block(id)?.area_id.clone();
            let center = self.block_anchor(&area)?;
            let b = self.block_mut(id)?;
            b.offset_x = round_mm(rect.min_x - center.x);
            b.offset_y = round_mm(rect.min_y - center.y);
        }
        for (id, rect) in deps.blocks {
            place_block(self, &id, rect)?;
        }
        for b in before {
            if self.block(&b.id)? != &b {
                updated.push(EntityRef::Block(b.id));
            }
        }
        Ok(updated)
    }

    /// Clamp a polygon back into shape: size within [min, canvas], position
    /// inside the canvas, millimeter coordinates, bounded z-order.
    pub fn normalize_polygon(&mut self, id: &PolygonId) -> Result<(), LayoutError> {
        let limits = self.limits();
        let min = self.geometry().min_area_size_m;
        let poly = self.polygon_mut(id)?;

        let b = poly.bounds();
        let w = clamp_between(min, limits.width(), b.width());
        let h = clamp_between(min, limits.height(), b.height());
        let x = clamp_between(limits.min_x, limits.max_x - w, b.min_x);
        let y = clamp_between(limits.min_y, limits.max_y - h, b.min_y);
        let target = Bounds::from_rect(x, y, w, h);

        if (w - b.width()).abs() > f64::EPSILON || (h - b.height()).abs() > f64::EPSILON {
            poly.fit_to_bounds(&target);
        } else {
            poly.move_origin_to(x, y);
        }
        poly.round_vertices();
        poly.z_order = poly.z_order.clamp(0, MAX_Z_ORDER);
        Ok(())
    }

    /// Drag an area polygon by `(dx, dy)` from its `base` state.
    ///
    /// The move sweeps against the other visible areas so fast drags cannot
    /// tunnel through them, snaps to the grid when asked, then resolves any
    /// remaining overlap. Without convergence the polygon keeps its last
    /// valid position.
    pub fn move_area_polygon(
        &mut self,
        base: &AreaPolygon,
        dx: f64,
        dy: f64,
        snap: bool,
    ) -> Result<AreaEdit, LayoutError> {
        let id = &base.id;
        let limits = self.limits();
        let siblings = self.sibling_bounds(id);
        let eps = self.geometry().collision_eps_m;

        let swept = sweep_translate(&base.bounds(), dx, dy, &siblings, &limits, eps);
        let snapped = swept.with_origin(self.snap(swept.min_x, snap), self.snap(swept.min_y, snap));
        let candidate = clamp_into(&snapped, &limits);
        let resolution = resolve_overlaps(candidate, &siblings, &limits, None, &tuning(self.geometry()));

        if !resolution.converged {
            tracing::debug!(polygon = %id, "area move blocked, keeping last valid position");
            return Ok(AreaEdit::rejected(self.polygon(id)?.bounds(), false));
        }

        // Hosted fixtures ride on the polygon origin; blocks hang off the area center
        let previous = self.polygon(id)?.clone();
        let mut deps = self.block_dependents(&previous.area_id);

        let mut moved = base.clone();
        moved.move_origin_to(resolution.bounds.min_x, resolution.bounds.min_y);
        self.upsert_polygon(moved);
        self.normalize_polygon(id)?;

        let bounds = self.polygon(id)?.bounds();
        let from = previous.bounds();
        deps.carry_blocks(&previous, bounds.min_x - from.min_x, bounds.min_y - from.min_y);
        let updated = self.settle(deps)?;
        Ok(AreaEdit {
            bounds,
            applied: true,
            converged: true,
            updated,
        })
    }

    /// Drag one corner of a rectangular area polygon; the opposite corner
    /// stays fixed. True polygons are edited vertex by vertex instead and
    /// are left untouched here.
    pub fn resize_area_corner(
        &mut self,
        base: &AreaPolygon,
        corner: Corner,
        dx: f64,
        dy: f64,
        snap: bool,
    ) -> Result<AreaEdit, LayoutError> {
        let id = &base.id;
        let b = base.bounds();
        if !base.is_rectangle() {
            return Ok(AreaEdit::rejected(self.polygon(id)?.bounds(), true));
        }

        let limits = self.limits();
        let siblings = self.sibling_bounds(id);
        let eps = self.geometry().collision_eps_m;
        let min = self.geometry().min_area_size_m;

        let w = if corner.is_east() {
            clamp_right(b.min_x, (b.min_y, b.max_y), b.width() + dx, &siblings, &limits, eps, min)
        } else {
            clamp_left(b.max_x, (b.min_y, b.max_y), b.width() - dx, &siblings, &limits, eps, min)
        };
        let x_span = if corner.is_east() {
            (b.min_x, b.min_x + w)
        } else {
            (b.max_x - w, b.max_x)
        };
        let h = if corner.is_north() {
            clamp_top(b.max_y, x_span, b.height() - dy, &siblings, &limits, eps, min)
        } else {
            clamp_bottom(b.min_y, x_span, b.height() + dy, &siblings, &limits, eps, min)
        };
        let w = self.snap(w, snap).max(min);
        let h = self.snap(h, snap).max(min);

        let (x, y) = match corner {
            Corner::NE => (b.min_x, b.max_y - h),
            Corner::SE => (b.min_x, b.min_y),
            Corner::NW => (b.max_x - w, b.max_y - h),
            Corner::SW => (b.max_x - w, b.min_y),
        };
        let target = Bounds::from_rect(x, y, w, h);
        if overlaps_any(&target, &siblings) || !limits.contains_bounds(&target, 1e-9) {
            return Ok(AreaEdit::rejected(self.polygon(id)?.bounds(), false));
        }

        let deps = self.dependents_of(self.polygon(id)?);
        let mut resized = base.clone();
        resized.fit_to_bounds(&target);
        self.upsert_polygon(resized);
        self.normalize_polygon(id)?;
        let updated = self.settle(deps)?;
        Ok(AreaEdit {
            bounds: self.polygon(id)?.bounds(),
            applied: true,
            converged: true,
            updated,
        })
    }

    /// Move vertex `index` of a true polygon to `p`.
    ///
    /// Returns `false`, leaving the polygon as it was, when the result would
    /// overlap another visible area or when the polygon is a plain
    /// rectangle. A move that would fold the outline onto itself is refused
    /// with [`LayoutError::SelfIntersection`]. Hosted fixtures and the area's
    /// blocks keep their place and are clamped into the new shape.
    pub fn move_vertex(
        &mut self,
        base: &AreaPolygon,
        index: usize,
        p: Point,
        snap: bool,
    ) -> Result<AreaEdit, LayoutError> {
        let current = self.polygon(&base.id)?.bounds();
        if base.is_rectangle() {
            return Ok(AreaEdit::rejected(current, true));
        }
        if index >= base.vertices.len() {
            return Err(LayoutError::UnknownVertex {
                polygon: base.id.to_string(),
                index,
            });
        }

        let limits = self.limits();
        let x = self.snap(clamp_between(limits.min_x, limits.max_x, p.x), snap);
        let y = self.snap(clamp_between(limits.min_y, limits.max_y, p.y), snap);

        let mut vertices = base.vertices.clone();
        vertices[index] = Point::new(x, y);
        if !is_simple_polygon(&vertices) {
            return Err(LayoutError::SelfIntersection {
                id: base.id.to_string(),
            });
        }
        let Some(bounds) = bounds_of(&vertices) else {
            return Ok(AreaEdit::rejected(current, true));
        };
        if overlaps_any(&bounds, &self.sibling_bounds(&base.id)) {
            return Ok(AreaEdit::rejected(current, false));
        }

        let deps = self.dependents_of(self.polygon(&base.id)?);
        let poly = self.polygon_mut(&base.id)?;
        poly.vertices = vertices;
        poly.round_vertices();
        let bounds = poly.bounds();
        let updated = self.settle(deps)?;
        Ok(AreaEdit {
            bounds,
            applied: true,
            converged: true,
            updated,
        })
    }
}
