use flatphys_core::types::Vec2;
use flatphys_core::Scalar;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb2 { pub min: Vec2, pub max: Vec2 }

impl Aabb2 {
    #[inline] pub fn new(min: Vec2, max: Vec2) -> Self { Self { min, max } }
    #[inline] pub fn from_center_half_extents(c: Vec2, he: Vec2) -> Self {
        Self { min: c - he, max: c + he }
    }
    #[inline] pub fn overlaps(&self, other: &Aabb2) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x ||
            self.max.y < other.min.y || self.min.y > other.max.y)
    }
    #[inline] pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
    #[inline] pub fn center(&self) -> Vec2 { (self.min + self.max) * 0.5 }
    #[inline] pub fn expand_by(&mut self, r: Scalar) {
        let e = Vec2::splat(r);
        self.min -= e; self.max += e;
    }
}
