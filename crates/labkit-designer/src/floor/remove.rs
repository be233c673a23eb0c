use super::{EntityRef, Floor};
use crate::edge_anchor::reanchor_opening;
use labkit_core::{AreaId, BlockId, FixtureId, LayoutError, OpeningId, PolygonId};
use labkit_settings::DeletePolicy;

/// What a removal touched, so the caller can persist it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removal {
    /// Entities deleted, to be removed from storage
    pub removed: Vec<EntityRef>,
    /// Entities modified as a side effect, to be upserted
    pub updated: Vec<EntityRef>,
}

impl Floor {
    pub fn remove_fixture(&mut self, id: &FixtureId) -> Result<Removal, LayoutError> {
        self.fixtures
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownFixture { id: id.to_string() })?;
        Ok(Removal {
            removed: vec![EntityRef::Fixture(id.clone())],
            updated: Vec::new(),
        })
    }

    pub fn remove_block(&mut self, id: &BlockId) -> Result<Removal, LayoutError> {
        self.blocks
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownBlock { id: id.to_string() })?;
        Ok(Removal {
            removed: vec![EntityRef::Block(id.clone())],
            updated: Vec::new(),
        })
    }

    pub fn remove_opening(&mut self, id: &OpeningId) -> Result<Removal, LayoutError> {
        self.openings
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownOpening { id: id.to_string() })?;
        Ok(Removal {
            removed: vec![EntityRef::Opening(id.clone())],
            updated: Vec::new(),
        })
    }

    fn check_empty(&self, area: &AreaId, policy: DeletePolicy) -> Result<(), LayoutError> {
        let fixtures = self.fixtures_of(area).len();
        let blocks = self.blocks_of(area).len();
        let openings = self.openings.values().filter(|o| &o.area_a == area).count();
        if policy == DeletePolicy::Reject && fixtures + blocks + openings > 0 {
            return Err(LayoutError::AreaNotEmpty {
                area: area.to_string(),
                fixtures,
                blocks,
                openings,
            });
        }
        Ok(())
    }

    /// Drop everything the area owns and forget it as a neighbour.
    fn cascade_contents(&mut self, area: &AreaId, out: &mut Removal) {
        let fixtures: Vec<FixtureId> = self.fixtures_of(area).iter().map(|f| f.id.clone()).collect();
        for id in fixtures {
            self.fixtures.remove(&id);
            out.removed.push(EntityRef::Fixture(id));
        }
        let blocks: Vec<BlockId> = self.blocks_of(area).iter().map(|b| b.id.clone()).collect();
        for id in blocks {
            self.blocks.remove(&id);
            out.removed.push(EntityRef::Block(id));
        }
        let owned: Vec<OpeningId> = self
            .openings
            .values()
            .filter(|o| &o.area_a == area)
            .map(|o| o.id.clone())
            .collect();
        for id in owned {
            self.openings.remove(&id);
            out.removed.push(EntityRef::Opening(id));
        }
        for o in self.openings.values_mut() {
            if o.area_b.as_ref() == Some(area) {
                o.area_b = None;
                out.updated.push(EntityRef::Opening(o.id.clone()));
            }
        }
    }

    /// Remove one polygon.
    ///
    /// Fixtures hosted by it move to the best remaining polygon of the area,
    /// blocks keep their place inside what remains, and openings touching
    /// the area are re-anchored. When it is the last polygon, a non-empty
    /// area is rejected or cascaded depending on `policy`.
    pub fn remove_polygon(&mut self, id: &PolygonId, policy: DeletePolicy) -> Result<Removal, LayoutError> {
        let area = self.polygon(id)?.area_id.clone();
        let last = self.polygons_of(&area).len() == 1;
        let mut out = Removal::default();

        if last {
            self.check_empty(&area, policy)?;
            self.cascade_contents(&area, &mut out);
            self.polygons.remove(id);
            out.removed.push(EntityRef::Polygon(id.clone()));
            tracing::info!(polygon = %id, area = %area, "removed last polygon of area");
            return Ok(out);
        }

        let deps = self.dependents_of(self.polygon(id)?);
        self.polygons.remove(id);
        out.removed.push(EntityRef::Polygon(id.clone()));

        // Orphaned fixtures are rehomed; blocks follow the area center
        let updated = self.settle(deps)?;
        tracing::debug!(polygon = %id, updated = updated.len(), "contents replaced after polygon removal");
        out.updated.extend(updated);
        self.reanchor_touching(&area, &mut out)?;
        Ok(out)
    }

    fn reanchor_touching(&mut self, area: &AreaId, out: &mut Removal) -> Result<(), LayoutError> {
        let touching: Vec<OpeningId> = self
            .openings
            .values()
            .filter(|o| &o.area_a == area || o.area_b.as_ref() == Some(area))
            .map(|o| o.id.clone())
            .collect();
        for id in touching {
            reanchor_opening(self, &id)?;
            out.updated.push(EntityRef::Opening(id));
        }
        Ok(())
    }

    /// Remove an area with all of its polygons.
    ///
    /// Contents (fixtures, blocks, owned openings) follow `policy`.
    pub fn remove_area(&mut self, id: &AreaId, policy: DeletePolicy) -> Result<Removal, LayoutError> {
        self.area(id)?;
        self.check_empty(id, policy)?;

        let mut out = Removal::default();
        self.cascade_contents(id, &mut out);
        let polygons: Vec<PolygonId> = self.polygons_of(id).iter().map(|p| p.id.clone()).collect();
        for pid in polygons {
            self.polygons.remove(&pid);
            out.removed.push(EntityRef::Polygon(pid));
        }
        self.areas.remove(id);
        out.removed.push(EntityRef::Area(id.clone()));
        tracing::info!(area = %id, removed = out.removed.len(), "removed area");
        Ok(out)
    }
}
