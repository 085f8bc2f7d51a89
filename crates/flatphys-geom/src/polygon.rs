use flatphys_core::types::{Isometry2, Vec2};
use flatphys_core::Scalar;
use thiserror::Error;

use crate::aabb::Aabb2;

/// Clipped results with less area than this are treated as no contact.
pub const AREA_EPSILON: Scalar = 1.0e-9;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum GeomError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon is degenerate (zero area)")]
    ZeroArea,
    #[error("polygon is not convex")]
    NotConvex,
}

/// Convex polygon, vertices in CCW order. `convex` is the validating
/// constructor; the unchecked internal paths only produce vertices that
/// came out of already-valid polygons.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    verts: Vec<Vec2>,
}

impl Polygon {
    /// Validating constructor. Normalizes winding to CCW, rejects degenerate
    /// and concave input.
    pub fn convex(mut verts: Vec<Vec2>) -> Result<Polygon, GeomError> {
        if verts.len() < 3 {
            return Err(GeomError::TooFewVertices(verts.len()));
        }
        if signed_area(&verts) < 0.0 {
            verts.reverse();
        }
        let poly = Polygon { verts };
        if poly.area() <= AREA_EPSILON {
            return Err(GeomError::ZeroArea);
        }
        if !poly.is_convex() {
            return Err(GeomError::NotConvex);
        }
        Ok(poly)
    }

    /// Axis-aligned box with half extents `(hx, hy)` centered at the origin.
    pub fn rect(hx: Scalar, hy: Scalar) -> Result<Polygon, GeomError> {
        Polygon::convex(vec![
            Vec2::new(-hx, -hy),
            Vec2::new(hx, -hy),
            Vec2::new(hx, hy),
            Vec2::new(-hx, hy),
        ])
    }

    #[inline] pub fn verts(&self) -> &[Vec2] { &self.verts }
    #[inline] pub fn len(&self) -> usize { self.verts.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.verts.is_empty() }

    pub fn area(&self) -> Scalar {
        signed_area(&self.verts).abs()
    }

    pub fn centroid(&self) -> Vec2 {
        // Area-weighted centroid; falls back to vertex mean for slivers.
        let a = signed_area(&self.verts);
        if a.abs() <= AREA_EPSILON {
            let sum: Vec2 = self.verts.iter().copied().sum();
            return sum / self.verts.len().max(1) as Scalar;
        }
        let mut c = Vec2::ZERO;
        let n = self.verts.len();
        for i in 0..n {
            let p = self.verts[i];
            let q = self.verts[(i + 1) % n];
            let cross = p.perp_dot(q);
            c += (p + q) * cross;
        }
        c / (6.0 * a)
    }

    pub fn aabb(&self) -> Aabb2 {
        let mut min = self.verts[0];
        let mut max = self.verts[0];
        for v in &self.verts[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }
        Aabb2::new(min, max)
    }

    /// Local-space polygon -> world-space polygon.
    pub fn transformed(&self, xf: &Isometry2) -> Polygon {
        Polygon { verts: self.verts.iter().map(|v| xf.apply(*v)).collect() }
    }

    fn is_convex(&self) -> bool {
        // CCW winding is established by the constructor; every turn must be
        // non-clockwise (collinear runs are tolerated, the area check already
        // rejected fully flat input).
        let n = self.verts.len();
        for i in 0..n {
            let a = self.verts[i];
            let b = self.verts[(i + 1) % n];
            let c = self.verts[(i + 2) % n];
            if (b - a).perp_dot(c - b) < -AREA_EPSILON {
                return false;
            }
        }
        true
    }

    /// Sutherland-Hodgman: clips `subject` against every edge of the convex
    /// CCW polygon `clip`. The result is the intersection region, possibly
    /// empty. Both inputs must be valid convex polygons.
    pub fn clip(subject: &Polygon, clip: &Polygon) -> Polygon {
        let mut out = subject.verts.clone();
        let n = clip.verts.len();
        for i in 0..n {
            if out.len() < 3 {
                break;
            }
            let e0 = clip.verts[i];
            let e1 = clip.verts[(i + 1) % n];
            out = clip_against_edge(&out, e0, e1);
        }
        if out.len() < 3 {
            out.clear();
        }
        Polygon { verts: out }
    }
}

fn signed_area(verts: &[Vec2]) -> Scalar {
    let n = verts.len();
    let mut acc = 0.0;
    for i in 0..n {
        acc += verts[i].perp_dot(verts[(i + 1) % n]);
    }
    acc * 0.5
}

/// Keeps the part of `input` on the left of the directed edge `e0 -> e1`,
/// inserting intersection points where edges cross the clip line.
fn clip_against_edge(input: &[Vec2], e0: Vec2, e1: Vec2) -> Vec<Vec2> {
    let edge = e1 - e0;
    let mut out = Vec::with_capacity(input.len() + 1);
    let n = input.len();
    for i in 0..n {
        let cur = input[i];
        let next = input[(i + 1) % n];
        let d_cur = edge.perp_dot(cur - e0);
        let d_next = edge.perp_dot(next - e0);
        if d_cur >= 0.0 {
            out.push(cur);
        }
        if (d_cur > 0.0 && d_next < 0.0) || (d_cur < 0.0 && d_next > 0.0) {
            let t = d_cur / (d_cur - d_next);
            out.push(cur + (next - cur) * t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatphys_core::{iso, vec2};

    fn unit_square() -> Polygon {
        Polygon::rect(0.5, 0.5).unwrap()
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(
            Polygon::convex(vec![vec2(0.0, 0.0), vec2(1.0, 0.0)]),
            Err(GeomError::TooFewVertices(2))
        );
        assert_eq!(
            Polygon::convex(vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(2.0, 0.0)]),
            Err(GeomError::ZeroArea)
        );
        let concave = vec![
            vec2(0.0, 0.0), vec2(2.0, 0.0), vec2(2.0, 2.0),
            vec2(1.0, 0.5), vec2(0.0, 2.0),
        ];
        assert_eq!(Polygon::convex(concave), Err(GeomError::NotConvex));
    }

    #[test]
    fn winding_is_normalized() {
        let cw = Polygon::convex(vec![
            vec2(-1.0, -1.0), vec2(-1.0, 1.0), vec2(1.0, 1.0), vec2(1.0, -1.0),
        ]).unwrap();
        assert!(signed_area(cw.verts()) > 0.0);
        assert!((cw.area() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn clip_of_offset_squares_is_quarter() {
        let a = unit_square();
        let b = unit_square().transformed(&iso(vec2(0.5, 0.5), 0.0));
        let clipped = Polygon::clip(&a, &b);
        assert!(!clipped.is_empty());
        assert!((clipped.area() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn clip_of_disjoint_squares_is_empty() {
        let a = unit_square();
        let b = unit_square().transformed(&iso(vec2(10.0, 10.0), 0.0));
        assert!(Polygon::clip(&a, &b).is_empty());
    }

    #[test]
    fn clip_contained_polygon_is_itself() {
        let outer = Polygon::rect(2.0, 2.0).unwrap();
        let inner = unit_square();
        let clipped = Polygon::clip(&inner, &outer);
        assert!((clipped.area() - inner.area()).abs() < 1e-6);
    }

    #[test]
    fn transform_rotates_about_origin() {
        let sq = unit_square();
        let rotated = sq.transformed(&iso(vec2(0.0, 0.0), core::f32::consts::FRAC_PI_4));
        // Area is rotation invariant; AABB grows to the diagonal.
        assert!((rotated.area() - 1.0).abs() < 1e-5);
        let bb = rotated.aabb();
        assert!((bb.max.x - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn centroid_of_square_is_center() {
        let sq = unit_square().transformed(&iso(vec2(3.0, -2.0), 0.0));
        let c = sq.centroid();
        assert!((c.x - 3.0).abs() < 1e-5 && (c.y + 2.0).abs() < 1e-5);
    }
}
