//! Pointer-driven editing session.
//!
//! One [`Interaction`] value holds everything a drag needs: where it
//! started, what is being dragged and a copy of the entity from before the
//! drag. Pointer-up either commits the live result or puts the copy back.

use crate::edge_anchor::{move_opening_to, reanchor_opening, resize_opening_to};
use crate::floor::{EntityRef, EntitySnapshot, Floor, DEFAULT_PICK_RADIUS};
use crate::geometry::{Bounds, Point};
use crate::model::{AreaPolygon, Corner, InnerFixture, Opening};
use crate::placement::{place_block, place_fixture, resize_fixture};
use crate::viewport::{ClickTracker, Viewport};
use labkit_core::{AreaId, BlockId, FixtureId, LayoutError, OpeningId, PolygonId};
use std::fmt;

/// Advisory shown when an area drag ends in overlap.
pub const ADVISORY_OVERLAP: &str = "cannot overlap another area";
/// Advisory shown when strict containment rejects a fixture drop.
pub const ADVISORY_OUTSIDE: &str = "does not fit inside its area";
/// Advisory shown when a fixture drop cannot clear its same-kind siblings.
pub const ADVISORY_CROWDED: &str = "cannot overlap a fixture of the same kind";
pub const ADVISORY_CANCELLED: &str = "edit cancelled";

/// Keyboard state that travels with pointer events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Held Shift disables grid snap for the event
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    Background,
    Area(PolygonId),
    AreaCorner(PolygonId, Corner),
    Vertex(PolygonId, usize),
    Opening(OpeningId),
    /// The far end of an opening, for resizing
    OpeningEnd(OpeningId),
    Fixture(FixtureId),
    FixtureCorner(FixtureId, Corner),
    Block(BlockId),
}

/// A draggable item placed by the placement engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Fixture(FixtureId),
    Block(BlockId),
}

/// The editing state machine.
#[derive(Debug, Clone)]
pub enum Interaction {
    Idle,
    PanningView {
        before: Box<Viewport>,
        last: (f64, f64),
        clicks: ClickTracker,
    },
    MovingArea {
        before: AreaPolygon,
        /// Fixtures and blocks the edit may re-place
        dependents: Vec<EntitySnapshot>,
        start: Point,
        /// The last move could not clear the other areas
        blocked: bool,
    },
    ResizingAreaCorner {
        before: AreaPolygon,
        dependents: Vec<EntitySnapshot>,
        corner: Corner,
        start: Point,
    },
    MovingVertex {
        before: AreaPolygon,
        dependents: Vec<EntitySnapshot>,
        index: usize,
    },
    MovingOpening {
        before: Opening,
        /// Pointer position relative to the anchor when grabbed
        grab: (f64, f64),
    },
    ResizingOpening {
        before: Opening,
    },
    MovingFixture {
        item: Item,
        before: EntitySnapshot,
        base: Bounds,
        start: Point,
        contained: bool,
        /// Same-kind overlap was cleared by the last move
        converged: bool,
    },
    ResizingFixture {
        before: InnerFixture,
        base: Bounds,
        corner: Corner,
        start: Point,
    },
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "Idle",
            Interaction::PanningView { .. } => "PanningView",
            Interaction::MovingArea { .. } => "MovingArea",
            Interaction::ResizingAreaCorner { .. } => "ResizingAreaCorner",
            Interaction::MovingVertex { .. } => "MovingVertex",
            Interaction::MovingOpening { .. } => "MovingOpening",
            Interaction::ResizingOpening { .. } => "ResizingOpening",
            Interaction::MovingFixture { .. } => "MovingFixture",
            Interaction::ResizingFixture { .. } => "ResizingFixture",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a pointer-up (or cancel) ended.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Pointer-up without an active drag
    Nothing,
    /// Background press released without moving: selection cleared
    Click { world: Point },
    /// The view was panned
    Panned,
    /// Entities to persist
    Committed { changed: Vec<EntityRef> },
    /// The drag was undone
    Reverted {
        entity: EntityRef,
        advisory: String,
    },
}

/// A floor being edited through a viewport.
#[derive(Debug, Clone)]
pub struct EditorSession {
    floor: Floor,
    viewport: Viewport,
    selection: Option<EntityRef>,
    interaction: Interaction,
}

impl EditorSession {
    pub fn new(floor: Floor) -> Self {
        let viewport = Viewport::with_settings(
            floor.canvas().width_m,
            floor.canvas().height_m,
            floor.settings().viewport.clone(),
        );
        Self {
            floor,
            viewport,
            selection: None,
            interaction: Interaction::Idle,
        }
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Direct access to the floor, refused while a drag is in progress.
    pub fn floor_mut(&mut self) -> Result<&mut Floor, LayoutError> {
        if !self.interaction.is_idle() {
            return Err(LayoutError::InvalidTransition {
                current: self.interaction.name().to_string(),
                requested: "edit".to_string(),
            });
        }
        Ok(&mut self.floor)
    }

    pub fn into_floor(self) -> Floor {
        self.floor
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selection(&self) -> Option<&EntityRef> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, entity: Option<EntityRef>) {
        self.selection = entity;
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Body target of whatever lies under a screen position.
    pub fn target_at(&self, x: f64, y: f64) -> PointerTarget {
        let world = self.viewport.screen_to_world(x, y);
        match self.floor.hit_test(world, DEFAULT_PICK_RADIUS) {
            Some(EntityRef::Opening(id)) => PointerTarget::Opening(id),
            Some(EntityRef::Fixture(id)) => PointerTarget::Fixture(id),
            Some(EntityRef::Block(id)) => PointerTarget::Block(id),
            Some(EntityRef::Polygon(id)) => PointerTarget::Area(id),
            Some(EntityRef::Area(_)) | None => PointerTarget::Background,
        }
    }

    fn refuse(&self, requested: &str) -> LayoutError {
        LayoutError::InvalidTransition {
            current: self.interaction.name().to_string(),
            requested: requested.to_string(),
        }
    }

    /// Start a drag on `target` at screen position `(x, y)`.
    ///
    /// A drag still in progress is abandoned and reverted first.
    pub fn pointer_down(
        &mut self,
        target: PointerTarget,
        x: f64,
        y: f64,
        _modifiers: Modifiers,
    ) -> Result<(), LayoutError> {
        if !self.interaction.is_idle() {
            tracing::debug!(state = %self.interaction, "abandoning unfinished drag");
            self.revert(ADVISORY_CANCELLED);
        }

        let world = self.viewport.screen_to_world(x, y);
        let next = match target {
            PointerTarget::Background => {
                let mut clicks = ClickTracker::new(self.viewport.drag_threshold_px());
                clicks.press(x, y);
                Interaction::PanningView {
                    before: Box::new(self.viewport.clone()),
                    last: (x, y),
                    clicks,
                }
            }
            PointerTarget::Area(id) => {
                self.selection = Some(EntityRef::Polygon(id.clone()));
                Interaction::MovingArea {
                    before: self.floor.polygon(&id)?.clone(),
                    dependents: self.floor.dependent_snapshots(&id)?,
                    start: world,
                    blocked: false,
                }
            }
            PointerTarget::AreaCorner(id, corner) => {
                let before = self.floor.polygon(&id)?.clone();
                if !before.is_rectangle() {
                    return Err(self.refuse("ResizingAreaCorner"));
                }
                let dependents = self.floor.dependent_snapshots(&id)?;
                self.selection = Some(EntityRef::Polygon(id));
                Interaction::ResizingAreaCorner {
                    before,
                    dependents,
                    corner,
                    start: world,
                }
            }
            PointerTarget::Vertex(id, index) => {
                let before = self.floor.polygon(&id)?.clone();
                if before.is_rectangle() || index >= before.vertices.len() {
                    return Err(self.refuse("MovingVertex"));
                }
                let dependents = self.floor.dependent_snapshots(&id)?;
                self.selection = Some(EntityRef::Polygon(id));
                Interaction::MovingVertex {
                    before,
                    dependents,
                    index,
                }
            }
            PointerTarget::Opening(id) => {
                let before = self.floor.opening(&id)?.clone();
                self.selection = Some(EntityRef::Opening(id));
                Interaction::MovingOpening {
                    grab: (world.x - before.anchor.x, world.y - before.anchor.y),
                    before,
                }
            }
            PointerTarget::OpeningEnd(id) => {
                let before = self.floor.opening(&id)?.clone();
                self.selection = Some(EntityRef::Opening(id));
                Interaction::ResizingOpening { before }
            }
            PointerTarget::Fixture(id) => {
                let before = EntitySnapshot::Fixture(self.floor.fixture(&id)?.clone());
                let base = self.floor.fixture_rect(&id)?;
                self.selection = Some(EntityRef::Fixture(id.clone()));
                Interaction::MovingFixture {
                    item: Item::Fixture(id),
                    before,
                    base,
                    start: world,
                    contained: true,
                    converged: true,
                }
            }
            PointerTarget::Block(id) => {
                let before = EntitySnapshot::Block(self.floor.block(&id)?.clone());
                let base = self.floor.block_rect(&id)?;
                self.selection = Some(EntityRef::Block(id.clone()));
                Interaction::MovingFixture {
                    item: Item::Block(id),
                    before,
                    base,
                    start: world,
                    contained: true,
                    converged: true,
                }
            }
            PointerTarget::FixtureCorner(id, corner) => {
                let before = self.floor.fixture(&id)?.clone();
                let base = self.floor.fixture_rect(&id)?;
                self.selection = Some(EntityRef::Fixture(id));
                Interaction::ResizingFixture {
                    before,
                    base,
                    corner,
                    start: world,
                }
            }
        };

        tracing::debug!(state = %next, "pointer down");
        self.interaction = next;
        Ok(())
    }

    /// Apply the drag for a new pointer position.
    pub fn pointer_move(&mut self, x: f64, y: f64, modifiers: Modifiers) -> Result<(), LayoutError> {
        let world = self.viewport.screen_to_world(x, y);
        let snap = !modifiers.shift;

        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::PanningView { last, clicks, .. } => {
                if clicks.update(x, y) {
                    self.viewport.pan_by_pixels(x - last.0, y - last.1);
                    *last = (x, y);
                }
            }
            Interaction::MovingArea {
                before,
                start,
                blocked,
                ..
            } => {
                let edit = self
                    .floor
                    .move_area_polygon(before, world.x - start.x, world.y - start.y, snap)?;
                *blocked = !edit.converged;
            }
            Interaction::ResizingAreaCorner {
                before,
                corner,
                start,
                ..
            } => {
                self.floor.resize_area_corner(
                    before,
                    *corner,
                    world.x - start.x,
                    world.y - start.y,
                    snap,
                )?;
            }
            Interaction::MovingVertex { before, index, .. } => {
                match self.floor.move_vertex(before, *index, world, snap) {
                    Ok(edit) if !edit.applied => {
                        tracing::debug!(polygon = %before.id, "vertex move rejected");
                    }
                    Ok(_) => {}
                    // The outline keeps its last simple shape
                    Err(LayoutError::SelfIntersection { id }) => {
                        tracing::debug!(polygon = %id, index = *index, "vertex move would self-intersect");
                    }
                    Err(err) => return Err(err),
                }
            }
            Interaction::MovingOpening { before, grab } => {
                let target = Point::new(world.x - grab.0, world.y - grab.1);
                move_opening_to(&mut self.floor, &before.id, target)?;
            }
            Interaction::ResizingOpening { before } => {
                resize_opening_to(&mut self.floor, &before.id, world)?;
            }
            Interaction::MovingFixture {
                item,
                base,
                start,
                contained,
                converged,
                ..
            } => {
                let desired = base.translate(world.x - start.x, world.y - start.y);
                let outcome = match item {
                    Item::Fixture(id) => place_fixture(&mut self.floor, id, desired)?,
                    Item::Block(id) => place_block(&mut self.floor, id, desired)?,
                };
                *contained = outcome.contained;
                *converged = outcome.converged;
            }
            Interaction::ResizingFixture {
                before,
                base,
                corner,
                start,
            } => {
                resize_fixture(
                    &mut self.floor,
                    &before.id,
                    *base,
                    *corner,
                    world.x - start.x,
                    world.y - start.y,
                )?;
            }
        }
        Ok(())
    }

    /// Finish the drag: commit the live state or revert to the snapshot.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<InteractionOutcome, LayoutError> {
        let state = std::mem::replace(&mut self.interaction, Interaction::Idle);
        let strict = self.floor.settings().editor.strict_containment;

        let outcome = match state {
            Interaction::Idle => InteractionOutcome::Nothing,
            Interaction::PanningView { mut clicks, .. } => {
                if clicks.release() {
                    self.selection = None;
                    InteractionOutcome::Click {
                        world: self.viewport.screen_to_world(x, y),
                    }
                } else {
                    InteractionOutcome::Panned
                }
            }
            Interaction::MovingArea {
                before,
                dependents,
                blocked,
                ..
            } => {
                if blocked {
                    self.restore_polygon(before, dependents, ADVISORY_OVERLAP)
                } else {
                    self.commit_polygon(&before, &dependents)?
                }
            }
            Interaction::ResizingAreaCorner {
                before, dependents, ..
            }
            | Interaction::MovingVertex {
                before, dependents, ..
            } => self.commit_polygon(&before, &dependents)?,
            Interaction::MovingOpening { before, .. } | Interaction::ResizingOpening { before } => {
                InteractionOutcome::Committed {
                    changed: vec![EntityRef::Opening(before.id)],
                }
            }
            Interaction::MovingFixture {
                before,
                contained,
                converged,
                ..
            } => {
                if !converged {
                    self.restore(before, ADVISORY_CROWDED)
                } else if strict && !contained {
                    self.restore(before, ADVISORY_OUTSIDE)
                } else {
                    InteractionOutcome::Committed {
                        changed: vec![before.entity()],
                    }
                }
            }
            Interaction::ResizingFixture { before, .. } => InteractionOutcome::Committed {
                changed: vec![EntityRef::Fixture(before.id)],
            },
        };
        Ok(outcome)
    }

    /// Abort the current drag, restoring its snapshot.
    pub fn cancel(&mut self) -> Option<InteractionOutcome> {
        if self.interaction.is_idle() {
            return None;
        }
        Some(self.revert(ADVISORY_CANCELLED))
    }

    fn revert(&mut self, advisory: &str) -> InteractionOutcome {
        let state = std::mem::replace(&mut self.interaction, Interaction::Idle);
        match state {
            Interaction::Idle => InteractionOutcome::Nothing,
            Interaction::PanningView { before, .. } => {
                self.viewport = *before;
                InteractionOutcome::Nothing
            }
            Interaction::MovingArea {
                before, dependents, ..
            }
            | Interaction::ResizingAreaCorner {
                before, dependents, ..
            }
            | Interaction::MovingVertex {
                before, dependents, ..
            } => self.restore_polygon(before, dependents, advisory),
            Interaction::MovingOpening { before, .. } | Interaction::ResizingOpening { before } => {
                self.restore(EntitySnapshot::Opening(before), advisory)
            }
            Interaction::MovingFixture { before, .. } => self.restore(before, advisory),
            Interaction::ResizingFixture { before, .. } => {
                self.restore(EntitySnapshot::Fixture(before), advisory)
            }
        }
    }

    fn restore(&mut self, snapshot: EntitySnapshot, advisory: &str) -> InteractionOutcome {
        let entity = snapshot.entity();
        tracing::warn!(%entity, advisory, "edit reverted");
        self.floor.restore(snapshot);
        InteractionOutcome::Reverted {
            entity,
            advisory: advisory.to_string(),
        }
    }

    /// Put a polygon back together with the fixtures and blocks its edit
    /// re-placed.
    fn restore_polygon(
        &mut self,
        before: AreaPolygon,
        dependents: Vec<EntitySnapshot>,
        advisory: &str,
    ) -> InteractionOutcome {
        for snapshot in dependents {
            self.floor.restore(snapshot);
        }
        self.restore(EntitySnapshot::Polygon(before), advisory)
    }

    /// Commit a polygon edit: the polygon, whichever dependents it moved,
    /// and the openings of its area after re-anchoring.
    fn commit_polygon(
        &mut self,
        before: &AreaPolygon,
        dependents: &[EntitySnapshot],
    ) -> Result<InteractionOutcome, LayoutError> {
        let area: AreaId = before.area_id.clone();
        let mut changed = vec![EntityRef::Polygon(before.id.clone())];
        for snapshot in dependents {
            let entity = snapshot.entity();
            if self.floor.snapshot(&entity).ok().as_ref() != Some(snapshot) {
                changed.push(entity);
            }
        }
        let touching: Vec<OpeningId> = self
            .floor
            .openings()
            .filter(|o| o.area_a == area || o.area_b.as_ref() == Some(&area))
            .map(|o| o.id.clone())
            .collect();
        for id in touching {
            reanchor_opening(&mut self.floor, &id)?;
            changed.push(EntityRef::Opening(id));
        }
        Ok(InteractionOutcome::Committed { changed })
    }
}
