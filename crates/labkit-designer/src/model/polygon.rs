use crate::geometry::{self, Bounds, Point};
use labkit_core::{AreaId, PolygonId};
use serde::{Deserialize, Serialize};

/// A corner handle of a bounding box. North is the top (minimum Y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NW,
    NE,
    SE,
    SW,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::NW, Corner::NE, Corner::SE, Corner::SW];

    /// Position of this corner on `b`.
    pub fn of(self, b: &Bounds) -> Point {
        match self {
            Corner::NW => Point::new(b.min_x, b.min_y),
            Corner::NE => Point::new(b.max_x, b.min_y),
            Corner::SE => Point::new(b.max_x, b.max_y),
            Corner::SW => Point::new(b.min_x, b.max_y),
        }
    }

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::NW => Corner::SE,
            Corner::NE => Corner::SW,
            Corner::SE => Corner::NW,
            Corner::SW => Corner::NE,
        }
    }

    pub fn is_east(self) -> bool {
        matches!(self, Corner::NE | Corner::SE)
    }

    pub fn is_north(self) -> bool {
        matches!(self, Corner::NW | Corner::NE)
    }
}

/// One polygon of an area.
///
/// The bounding box is always derived from the vertices; rectangles are
/// stored as their four corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaPolygon {
    pub id: PolygonId,
    pub area_id: AreaId,
    pub vertices: Vec<Point>,
    /// Paint and priority order
    #[serde(default)]
    pub z_order: i32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl AreaPolygon {
    pub fn new(id: impl Into<PolygonId>, area_id: impl Into<AreaId>, vertices: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            area_id: area_id.into(),
            vertices,
            z_order: 0,
            label: None,
            color: None,
        }
    }

    /// An axis-aligned rectangle polygon.
    pub fn rectangle(id: impl Into<PolygonId>, area_id: impl Into<AreaId>, rect: Bounds) -> Self {
        Self::new(id, area_id, rect.corners().to_vec())
    }

    pub fn bounds(&self) -> Bounds {
        geometry::bounds_of(&self.vertices).unwrap_or_default()
    }

    /// Top-left of the bounding box; fixtures are positioned relative to it.
    pub fn origin(&self) -> Point {
        self.bounds().origin()
    }

    /// Whether the polygon is its own bounding box.
    pub fn is_rectangle(&self) -> bool {
        if self.vertices.len() != 4 {
            return false;
        }
        let b = self.bounds();
        let tol = 1e-9;
        Corner::ALL.iter().all(|c| {
            let corner = c.of(&b);
            self.vertices
                .iter()
                .any(|v| (v.x - corner.x).abs() <= tol && (v.y - corner.y).abs() <= tol)
        })
    }

    pub fn area_m2(&self) -> f64 {
        geometry::polygon_area(&self.vertices)
    }

    pub fn centroid(&self) -> Point {
        geometry::polygon_centroid(&self.vertices)
    }

    pub fn contains(&self, p: &Point) -> bool {
        geometry::point_in_polygon(p, &self.vertices)
    }

    /// Whether all four corners of `rect`, pulled inward by `pad`, are inside.
    ///
    /// Rectangles only need the bounding-box test.
    pub fn contains_rect(&self, rect: &Bounds, pad: f64) -> bool {
        let b = self.bounds();
        if self.is_rectangle() || self.vertices.len() < 3 {
            return b.contains_bounds(rect, pad);
        }
        let pad = pad.min(rect.width() / 2.0).min(rect.height() / 2.0);
        rect.inflate(-pad)
            .corners()
            .iter()
            .all(|c| geometry::point_in_polygon(c, &self.vertices))
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for v in &mut self.vertices {
            v.x += dx;
            v.y += dy;
        }
    }

    /// Move so the bounding box's top-left lands on `(x, y)`.
    pub fn move_origin_to(&mut self, x: f64, y: f64) {
        let o = self.origin();
        self.translate(x - o.x, y - o.y);
    }

    /// Stretch the vertices so the bounding box becomes `target`.
    ///
    /// A rectangle simply gets the new corners.
    pub fn fit_to_bounds(&mut self, target: &Bounds) {
        let b = self.bounds();
        if self.is_rectangle() || b.width() <= 0.0 || b.height() <= 0.0 {
            self.vertices = target.corners().to_vec();
            return;
        }
        let sx = target.width() / b.width();
        let sy = target.height() / b.height();
        for v in &mut self.vertices {
            v.x = target.min_x + (v.x - b.min_x) * sx;
            v.y = target.min_y + (v.y - b.min_y) * sy;
        }
    }

    /// Round every vertex to the millimeter.
    pub fn round_vertices(&mut self) {
        for v in &mut self.vertices {
            v.x = labkit_core::round_mm(v.x);
            v.y = labkit_core::round_mm(v.y);
        }
    }
}
