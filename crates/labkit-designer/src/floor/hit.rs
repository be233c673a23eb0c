use super::{EntityRef, Floor};
use crate::geometry::{closest_point_on_segment, Point};

/// Pick distance for openings, in meters.
pub const DEFAULT_PICK_RADIUS: f64 = 0.08;

impl Floor {
    /// Topmost visible entity under `p`.
    ///
    /// Openings are thin, so they are picked within `radius` of their
    /// segment and win over everything else. Then fixtures, blocks and
    /// finally polygons, each by descending z-order.
    pub fn hit_test(&self, p: Point, radius: f64) -> Option<EntityRef> {
        let opening = self
            .openings()
            .filter(|o| self.is_area_visible(&o.area_a))
            .map(|o| {
                let c = closest_point_on_segment(&p, &o.anchor, &o.end());
                (o, c.distance_to(&p))
            })
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((o, _)) = opening {
            return Some(EntityRef::Opening(o.id.clone()));
        }

        let fixture = self
            .fixtures()
            .filter(|f| self.is_area_visible(&f.area_id))
            .filter(|f| {
                self.fixture_rect(&f.id)
                    .map(|r| r.contains_point(&p))
                    .unwrap_or(false)
            })
            .max_by_key(|f| f.z_order);
        if let Some(f) = fixture {
            return Some(EntityRef::Fixture(f.id.clone()));
        }

        let block = self
            .blocks()
            .filter(|b| self.is_area_visible(&b.area_id))
            .filter(|b| {
                self.block_rect(&b.id)
                    .map(|r| r.contains_point(&p))
                    .unwrap_or(false)
            })
            .max_by_key(|b| b.z_order);
        if let Some(b) = block {
            return Some(EntityRef::Block(b.id.clone()));
        }

        self.visible_polygons()
            .into_iter()
            .rev()
            .find(|poly| poly.contains(&p))
            .map(|poly| EntityRef::Polygon(poly.id.clone()))
    }
}
