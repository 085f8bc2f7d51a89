use flatphys_core::types::{Isometry2, Vec2};
use flatphys_core::{Scalar, TransformId};

/// The host's spatial-transform collaborator. The core never stores
/// transform data; every position/rotation read and every integration delta
/// goes through this seam.
pub trait TransformStore {
    fn position(&self, id: TransformId) -> Vec2;
    fn rotation(&self, id: TransformId) -> Scalar;
    fn translate_local(&mut self, id: TransformId, delta: Vec2);
    fn rotate(&mut self, id: TransformId, delta: Scalar);
}

/// Dense Vec-backed store for hosts without their own scene graph (and for
/// tests). Indexing with a foreign id is a contract violation.
#[derive(Default)]
pub struct BasicTransforms {
    xfs: Vec<Isometry2>,
}

impl BasicTransforms {
    pub fn new() -> Self { Self { xfs: Vec::new() } }

    pub fn add(&mut self, xf: Isometry2) -> TransformId {
        self.xfs.push(xf);
        TransformId((self.xfs.len() - 1) as u32)
    }

    pub fn get(&self, id: TransformId) -> Isometry2 {
        self.xfs[id.0 as usize]
    }
}

impl TransformStore for BasicTransforms {
    fn position(&self, id: TransformId) -> Vec2 { self.xfs[id.0 as usize].pos }
    fn rotation(&self, id: TransformId) -> Scalar { self.xfs[id.0 as usize].rot }
    fn translate_local(&mut self, id: TransformId, delta: Vec2) {
        self.xfs[id.0 as usize].pos += delta;
    }
    fn rotate(&mut self, id: TransformId, delta: Scalar) {
        self.xfs[id.0 as usize].rot += delta;
    }
}
