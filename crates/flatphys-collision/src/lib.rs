use flatphys_core::types::Vec2;
use flatphys_core::{ColliderId, Scalar};
use flatphys_geom::{Polygon, AREA_EPSILON};

/// Exact overlap between two world-space polygons. Transient: lives for one
/// detection pass, never persisted between steps (no warm starting).
#[derive(Clone, Debug)]
pub struct Overlap {
    /// The clipped intersection region.
    pub region: Polygon,
    pub centroid: Vec2,
    pub area: Scalar,
}

/// Clips `a` against `b`. An empty (or sliver) intersection is no contact.
pub fn overlap(a: &Polygon, b: &Polygon) -> Option<Overlap> {
    let region = Polygon::clip(a, b);
    if region.is_empty() {
        return None;
    }
    let area = region.area();
    if area <= AREA_EPSILON {
        return None;
    }
    let centroid = region.centroid();
    Some(Overlap { region, centroid, area })
}

/// Canonical pair ordering used for deduplication: a broadphase candidate is
/// only processed when the query collider's id is the smaller of the pair,
/// so each true overlapping pair is clipped once per tick.
#[inline]
pub fn ordered_pair(a: ColliderId, b: ColliderId) -> (ColliderId, ColliderId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatphys_core::{iso, vec2};

    fn square_at(cx: f32, cy: f32) -> Polygon {
        Polygon::rect(0.5, 0.5).unwrap().transformed(&iso(vec2(cx, cy), 0.0))
    }

    #[test]
    fn offset_unit_squares_overlap() {
        let ov = overlap(&square_at(0.0, 0.0), &square_at(0.5, 0.5)).unwrap();
        assert!((ov.area - 0.25).abs() < 1e-6);
        assert!((ov.centroid.x - 0.25).abs() < 1e-5);
        assert!((ov.centroid.y - 0.25).abs() < 1e-5);
    }

    #[test]
    fn distant_unit_squares_do_not_overlap() {
        assert!(overlap(&square_at(0.0, 0.0), &square_at(10.0, 10.0)).is_none());
    }

    #[test]
    fn edge_touching_squares_report_no_contact() {
        // Shared edge clips to a zero-area sliver.
        assert!(overlap(&square_at(0.0, 0.0), &square_at(1.0, 0.0)).is_none());
    }

    #[test]
    fn overlap_is_symmetric_in_area() {
        let a = square_at(0.0, 0.0);
        let b = square_at(0.3, -0.2);
        let ab = overlap(&a, &b).unwrap();
        let ba = overlap(&b, &a).unwrap();
        assert!((ab.area - ba.area).abs() < 1e-6);
    }

    #[test]
    fn ordered_pair_is_stable() {
        let (x, y) = ordered_pair(ColliderId(5), ColliderId(2));
        assert_eq!((x.0, y.0), (2, 5));
        let (x, y) = ordered_pair(ColliderId(2), ColliderId(5));
        assert_eq!((x.0, y.0), (2, 5));
    }
}
