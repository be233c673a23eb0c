use crate::geometry::{Axis, Point};
use labkit_core::{AreaId, OpeningId, PolygonId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

/// The edge an opening was last anchored to, remembered to keep it from
/// flickering between equally close edges while dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePreference {
    pub area_id: AreaId,
    pub axis: Axis,
}

/// A door or window lying on an area edge.
///
/// The opening spans from `anchor` for `length` meters in the positive
/// direction of `axis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: OpeningId,
    pub kind: OpeningKind,
    pub anchor: Point,
    pub length: f64,
    pub axis: Axis,
    /// Owning area
    pub area_a: AreaId,
    /// Area on the other side of the wall, `None` for exterior openings
    #[serde(default)]
    pub area_b: Option<AreaId>,
    /// Polygon whose edge currently carries the opening
    #[serde(skip)]
    pub host: Option<PolygonId>,
    #[serde(skip)]
    pub preferred: Option<EdgePreference>,
}

impl Opening {
    pub fn new(
        id: impl Into<OpeningId>,
        kind: OpeningKind,
        anchor: Point,
        length: f64,
        axis: Axis,
        area_a: impl Into<AreaId>,
    ) -> Self {
        let area_a = area_a.into();
        Self {
            id: id.into(),
            kind,
            anchor,
            length,
            axis,
            preferred: Some(EdgePreference {
                area_id: area_a.clone(),
                axis,
            }),
            area_a,
            area_b: None,
            host: None,
        }
    }

    /// Rebuild an opening from its stored endpoints.
    ///
    /// The axis follows the dominant direction, the anchor is the smaller
    /// end and the length never drops below `min_len`.
    pub fn from_endpoints(
        id: impl Into<OpeningId>,
        kind: OpeningKind,
        p1: Point,
        p2: Point,
        area_a: impl Into<AreaId>,
        min_len: f64,
    ) -> Self {
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        let (axis, anchor, length) = if dx.abs() >= dy.abs() {
            let x = p1.x.min(p2.x);
            (Axis::X, Point::new(x, p1.y), dx.abs())
        } else {
            let y = p1.y.min(p2.y);
            (Axis::Y, Point::new(p1.x, y), dy.abs())
        };
        Self::new(id, kind, anchor, length.max(min_len), axis, area_a)
    }

    /// The far end of the opening.
    pub fn end(&self) -> Point {
        match self.axis {
            Axis::X => self.anchor.offset(self.length, 0.0),
            Axis::Y => self.anchor.offset(0.0, self.length),
        }
    }

    pub fn midpoint(&self) -> Point {
        let e = self.end();
        Point::new((self.anchor.x + e.x) / 2.0, (self.anchor.y + e.y) / 2.0)
    }

    /// Span along the opening's axis.
    pub fn span(&self) -> (f64, f64) {
        match self.axis {
            Axis::X => (self.anchor.x, self.anchor.x + self.length),
            Axis::Y => (self.anchor.y, self.anchor.y + self.length),
        }
    }
}
