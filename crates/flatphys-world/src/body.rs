use flatphys_core::types::Vec2;
use flatphys_core::{BodyId, Scalar, TransformId};

use crate::arena::SlotArena;
use crate::error::BodyError;

/// Dynamic state of one rigid body. Positions and rotations live in the
/// host's transform store; the body only carries the handle.
pub struct RigidBody {
    pub(crate) mass: Scalar,
    pub(crate) inv_mass: Scalar,
    pub(crate) inertia: Scalar,
    pub(crate) inv_inertia: Scalar,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: Scalar,
    pub(crate) force: Vec2,
    pub(crate) torque: Scalar,
    pub(crate) transform: TransformId,
}

impl RigidBody {
    #[inline] pub fn mass(&self) -> Scalar { self.mass }
    #[inline] pub fn inertia(&self) -> Scalar { self.inertia }
    #[inline] pub fn linear_velocity(&self) -> Vec2 { self.linear_velocity }
    #[inline] pub fn angular_velocity(&self) -> Scalar { self.angular_velocity }
    #[inline] pub fn force(&self) -> Vec2 { self.force }
    #[inline] pub fn torque(&self) -> Scalar { self.torque }
    #[inline] pub fn transform(&self) -> TransformId { self.transform }
}

/// Everything needed to admit a body. Force and torque accumulators always
/// start at zero.
pub struct BodyDesc {
    pub mass: Scalar,
    pub inertia: Scalar,
    pub transform: TransformId,
    pub linear_velocity: Vec2,
    pub angular_velocity: Scalar,
}

impl BodyDesc {
    pub fn new(mass: Scalar, inertia: Scalar, transform: TransformId) -> Self {
        Self {
            mass,
            inertia,
            transform,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
        }
    }
}

/// Body storage. Mutation between ticks goes through the accessors here;
/// missing ids are answered with `None` or ignored rather than trusted.
#[derive(Default)]
pub struct Bodies {
    arena: SlotArena<RigidBody>,
}

impl Bodies {
    pub fn new() -> Self {
        Self { arena: SlotArena::new() }
    }

    #[inline] pub fn len(&self) -> usize { self.arena.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.arena.is_empty() }

    pub fn add(&mut self, desc: BodyDesc) -> Result<BodyId, BodyError> {
        if !(desc.mass > 0.0 && desc.mass.is_finite()) {
            return Err(BodyError::InvalidMass(desc.mass));
        }
        if !(desc.inertia > 0.0 && desc.inertia.is_finite()) {
            return Err(BodyError::InvalidInertia(desc.inertia));
        }
        let idx = self.arena.insert(RigidBody {
            mass: desc.mass,
            inv_mass: 1.0 / desc.mass,
            inertia: desc.inertia,
            inv_inertia: 1.0 / desc.inertia,
            linear_velocity: desc.linear_velocity,
            angular_velocity: desc.angular_velocity,
            force: Vec2::ZERO,
            torque: 0.0,
            transform: desc.transform,
        });
        Ok(BodyId(idx))
    }

    pub fn remove(&mut self, id: BodyId) -> bool {
        self.arena.remove(id.0).is_some()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.arena.get(id.0)
    }

    /// Accumulates a force for the next `advance`, where it acts on every
    /// tick of that drain. Accumulators are zeroed when `advance` returns,
    /// so a sustained push must be re-applied each frame.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(body) = self.arena.get_mut(id.0) {
            body.force += force;
        }
    }

    pub fn apply_torque(&mut self, id: BodyId, torque: Scalar) {
        if let Some(body) = self.arena.get_mut(id.0) {
            body.torque += torque;
        }
    }

    pub fn set_linear_velocity(&mut self, id: BodyId, v: Vec2) {
        if let Some(body) = self.arena.get_mut(id.0) {
            body.linear_velocity = v;
        }
    }

    pub fn set_angular_velocity(&mut self, id: BodyId, w: Scalar) {
        if let Some(body) = self.arena.get_mut(id.0) {
            body.angular_velocity = w;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.arena.iter().map(|(i, b)| (BodyId(i), b))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut RigidBody)> {
        self.arena.iter_mut().map(|(i, b)| (BodyId(i), b))
    }

    /// Zeroes every force/torque accumulator, returns how many bodies were
    /// touched.
    pub(crate) fn clear_accumulators(&mut self) -> u32 {
        let mut cleared = 0u32;
        for (_, body) in self.arena.iter_mut() {
            body.force = Vec2::ZERO;
            body.torque = 0.0;
            cleared += 1;
        }
        cleared
    }
}
