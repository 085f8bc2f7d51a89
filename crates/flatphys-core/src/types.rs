use crate::Scalar;

pub type Vec2 = glam::Vec2;

#[inline] pub fn vec2(x: Scalar, y: Scalar) -> Vec2 { Vec2::new(x, y) }
#[inline] pub fn iso(pos: Vec2, rot: Scalar) -> Isometry2 { Isometry2 { pos, rot } }

/// 2D pose: position plus rotation angle in radians (CCW).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Isometry2 { pub pos: Vec2, pub rot: Scalar }

impl Isometry2 {
    pub const IDENTITY: Isometry2 = Isometry2 { pos: Vec2::ZERO, rot: 0.0 };

    /// Local point -> world point.
    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        let (s, c) = self.rot.sin_cos();
        Vec2::new(c * p.x - s * p.y, s * p.x + c * p.y) + self.pos
    }
}

impl Default for Isometry2 {
    fn default() -> Self { Self::IDENTITY }
}
