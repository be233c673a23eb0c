use crate::geometry::{Bounds, Point};
use labkit_core::{AreaId, BenchId, BlockId, FixtureId, InstallationId, MaterialId, PolygonId};
use serde::{Deserialize, Serialize};

/// What a fixture or block stands for. A bench and an installation are
/// mutually exclusive, so assigning one replaces the other.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixtureKind {
    #[default]
    None,
    Bench {
        bench_id: BenchId,
    },
    Installation {
        installation_id: InstallationId,
    },
}

/// Kind without the linked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    None,
    Bench,
    Installation,
}

impl FixtureKind {
    pub fn tag(&self) -> KindTag {
        match self {
            FixtureKind::None => KindTag::None,
            FixtureKind::Bench { .. } => KindTag::Bench,
            FixtureKind::Installation { .. } => KindTag::Installation,
        }
    }

    /// Only tagged items of the same kind block each other.
    pub fn collides_with(&self, other: &FixtureKind) -> bool {
        let tag = self.tag();
        tag != KindTag::None && tag == other.tag()
    }
}

/// A rectangle nested in one specific polygon of its area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnerFixture {
    pub id: FixtureId,
    pub area_id: AreaId,
    /// Polygon the relative offset is measured from
    pub parent: PolygonId,
    pub rel_x: f64,
    pub rel_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub kind: FixtureKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Physical depth, carried through untouched
    #[serde(default)]
    pub depth_m: Option<f64>,
    #[serde(default)]
    pub z_order: i32,
}

fn default_opacity() -> f64 {
    0.35
}

impl InnerFixture {
    pub fn new(
        id: impl Into<FixtureId>,
        area_id: impl Into<AreaId>,
        parent: impl Into<PolygonId>,
        rect: Bounds,
    ) -> Self {
        Self {
            id: id.into(),
            area_id: area_id.into(),
            parent: parent.into(),
            rel_x: rect.min_x,
            rel_y: rect.min_y,
            width: rect.width(),
            height: rect.height(),
            kind: FixtureKind::None,
            label: None,
            color: None,
            opacity: default_opacity(),
            depth_m: None,
            z_order: 50,
        }
    }

    pub fn with_kind(mut self, kind: FixtureKind) -> Self {
        self.kind = kind;
        self
    }

    /// Absolute rectangle given the parent's origin.
    pub fn rect_at(&self, parent_origin: Point) -> Bounds {
        Bounds::from_rect(
            parent_origin.x + self.rel_x,
            parent_origin.y + self.rel_y,
            self.width,
            self.height,
        )
    }
}

/// A free-floating rectangle positioned from its area's bounding-box center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub area_id: AreaId,
    /// Offset of the top-left corner from the area center
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub kind: FixtureKind,
    /// Physical height, carried through untouched
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub material_id: Option<MaterialId>,
    #[serde(default)]
    pub z_order: i32,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, area_id: impl Into<AreaId>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            area_id: area_id.into(),
            offset_x: 0.0,
            offset_y: 0.0,
            width,
            height,
            kind: FixtureKind::None,
            height_m: None,
            label: None,
            color: None,
            material_id: None,
            z_order: 0,
        }
    }

    /// Absolute rectangle given the area's bounding-box center.
    pub fn rect_at(&self, area_center: Point) -> Bounds {
        Bounds::from_rect(
            area_center.x + self.offset_x,
            area_center.y + self.offset_y,
            self.width,
            self.height,
        )
    }
}
