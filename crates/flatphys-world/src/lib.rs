//! Simulation context: fixed-step scheduler, body/collider lifecycle,
//! broadphase + exact narrow phase, response seam and semi-implicit Euler
//! integration. One `World` per simulation; nothing here is global.

pub mod arena;
pub mod body;
pub mod error;
pub mod observer;
pub mod transform;

pub use body::{Bodies, BodyDesc, RigidBody};
pub use error::{BodyError, ColliderError};
pub use observer::ContextObserver;
pub use transform::{BasicTransforms, TransformStore};

pub use flatphys_broadphase::GridIndex;
pub use flatphys_collision::Overlap;
pub use flatphys_core::types::{iso, vec2, Isometry2, Vec2};
pub use flatphys_core::{BodyId, ColliderId, ObserverId, Scalar, StepStats, TransformId};
pub use flatphys_geom::{Aabb2, GeomError, GroupMask, Polygon};
pub use flatphys_viz::{Color, DebugSettings, Ledger, LedgerEvent, RenderTarget};

use flatphys_collision::ordered_pair;
use flatphys_core::hash::{hash_scalar, hash_vec2, StepHasher};
use flatphys_core::StepStage;
use flatphys_viz::ScheduleRecorder;

use crate::arena::SlotArena;
use crate::observer::ObserverRegistry;

/* ---------- colliders ---------- */

/// Coarse material class; determines which bucket a collider lands in, not
/// how contacts resolve (that is the responder's job).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Material {
    Solid,
    Liquid,
}

pub struct ColliderDesc {
    pub polygon: Polygon,
    pub material: Material,
    pub mask: GroupMask,
    pub transform: TransformId,
    pub body: Option<BodyId>,
}

impl ColliderDesc {
    pub fn new(polygon: Polygon, transform: TransformId) -> Self {
        Self {
            polygon,
            material: Material::Solid,
            mask: GroupMask::ALL,
            transform,
            body: None,
        }
    }
}

/// Shape attached to a host transform. World-space vertices and the AABB are
/// caches, refreshed from the transform store at the top of every tick.
pub struct Collider {
    local: Polygon,
    world: Polygon,
    aabb: Aabb2,
    material: Material,
    mask: GroupMask,
    transform: TransformId,
    body: Option<BodyId>,
}

impl Collider {
    #[inline] pub fn polygon(&self) -> &Polygon { &self.local }
    #[inline] pub fn world_polygon(&self) -> &Polygon { &self.world }
    #[inline] pub fn aabb(&self) -> Aabb2 { self.aabb }
    #[inline] pub fn material(&self) -> Material { self.material }
    #[inline] pub fn mask(&self) -> GroupMask { self.mask }
    #[inline] pub fn transform(&self) -> TransformId { self.transform }
    #[inline] pub fn body(&self) -> Option<BodyId> { self.body }
}

/* ---------- response seam ---------- */

/// Hook invoked once per unique contact pair, after detection has fully
/// finished for the tick. Implementations may mutate body velocities and
/// accumulators; they never see the broadphase or the collider arena
/// mutably, so the pair set for the tick is fixed by the time this runs.
pub trait ContactResponder {
    fn respond(&mut self, bodies: &mut Bodies, a: &Collider, b: &Collider, overlap: &Overlap);
}

/// Default responder: detection only, no impulse resolution.
pub struct PassThroughResponse;

impl ContactResponder for PassThroughResponse {
    fn respond(&mut self, _: &mut Bodies, _: &Collider, _: &Collider, _: &Overlap) {}
}

/* ---------- world ---------- */

#[derive(Copy, Clone, Debug)]
pub struct WorldConfig {
    /// Fixed simulation step, seconds.
    pub time_step: Scalar,
    /// Screen-space convention: +y is down, so gravity points at +y.
    pub gravity: Vec2,
    /// Spiral-of-death guard: one `advance` never runs more ticks than this,
    /// excess accumulated time is dropped.
    pub max_steps_per_advance: u32,
    pub broadphase_cell: Scalar,
    pub ledger_cap: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            time_step: 0.010,
            gravity: vec2(0.0, 100.0),
            max_steps_per_advance: 8,
            broadphase_cell: 64.0,
            ledger_cap: 4096,
        }
    }
}

pub struct World {
    config: WorldConfig,
    accumulator: Scalar,
    tick: u64,
    bodies: Bodies,
    colliders: SlotArena<Collider>,
    solid: Vec<ColliderId>,
    liquid: Vec<ColliderId>,
    broadphase: GridIndex,
    observers: ObserverRegistry,
    responder: Box<dyn ContactResponder>,
    schedule: ScheduleRecorder,
    ledger: Ledger,
    debug: DebugSettings,
    draw_bodies: bool,
    draw_colliders: bool,
    stats: StepStats,
    scratch: Vec<ColliderId>,
    pairs: Vec<(ColliderId, ColliderId, Overlap)>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            accumulator: 0.0,
            tick: 0,
            bodies: Bodies::new(),
            colliders: SlotArena::new(),
            solid: Vec::new(),
            liquid: Vec::new(),
            broadphase: GridIndex::new(config.broadphase_cell),
            observers: ObserverRegistry::new(),
            responder: Box::new(PassThroughResponse),
            schedule: ScheduleRecorder::new(),
            ledger: Ledger::new(config.ledger_cap),
            debug: DebugSettings::default(),
            draw_bodies: false,
            draw_colliders: false,
            stats: StepStats::default(),
            scratch: Vec::new(),
            pairs: Vec::new(),
            config,
        }
    }

    /* ---------- accessors ---------- */

    #[inline] pub fn config(&self) -> &WorldConfig { &self.config }
    #[inline] pub fn accumulator(&self) -> Scalar { self.accumulator }
    #[inline] pub fn tick_index(&self) -> u64 { self.tick }
    #[inline] pub fn stats(&self) -> StepStats { self.stats }
    #[inline] pub fn bodies(&self) -> &Bodies { &self.bodies }
    #[inline] pub fn bodies_mut(&mut self) -> &mut Bodies { &mut self.bodies }
    #[inline] pub fn broadphase(&self) -> &GridIndex { &self.broadphase }
    #[inline] pub fn ledger(&self) -> &Ledger { &self.ledger }
    #[inline] pub fn solid_colliders(&self) -> &[ColliderId] { &self.solid }
    #[inline] pub fn liquid_colliders(&self) -> &[ColliderId] { &self.liquid }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id.0)
    }

    pub fn set_gravity(&mut self, g: Vec2) { self.config.gravity = g; }
    pub fn set_debug(&mut self, s: DebugSettings) { self.debug = s; }
    pub fn debug_toggle_rigid_body(&mut self) { self.draw_bodies = !self.draw_bodies; }
    pub fn debug_toggle_collider(&mut self) { self.draw_colliders = !self.draw_colliders; }

    pub fn set_responder(&mut self, responder: Box<dyn ContactResponder>) {
        self.responder = responder;
    }

    /* ---------- lifecycle ---------- */

    pub fn on_create_body(&mut self, desc: BodyDesc) -> Result<BodyId, BodyError> {
        self.bodies.add(desc)
    }

    /// Removes a body. Colliders that referenced it keep working; their
    /// back-reference just resolves to `None` from then on.
    pub fn on_destroy_body(&mut self, id: BodyId) -> bool {
        self.bodies.remove(id)
    }

    pub fn on_create_collider(
        &mut self,
        desc: ColliderDesc,
        transforms: &dyn TransformStore,
    ) -> Result<ColliderId, ColliderError> {
        if desc.mask.is_empty() {
            return Err(ColliderError::EmptyGroupMask);
        }
        if let Some(body) = desc.body {
            if !self.bodies.contains(body) {
                return Err(ColliderError::UnknownBody(body));
            }
        }
        let xf = iso(
            transforms.position(desc.transform),
            transforms.rotation(desc.transform),
        );
        let world = desc.polygon.transformed(&xf);
        let aabb = world.aabb();
        let idx = self.colliders.insert(Collider {
            local: desc.polygon,
            world,
            aabb,
            material: desc.material,
            mask: desc.mask,
            transform: desc.transform,
            body: desc.body,
        });
        let id = ColliderId(idx);
        match desc.material {
            Material::Solid => self.solid.push(id),
            Material::Liquid => self.liquid.push(id),
        }
        self.broadphase.insert(id, aabb, desc.mask);
        Ok(id)
    }

    /// Removes a collider from the broadphase, its material bucket and the
    /// arena. After this returns, `find` can never yield the id again.
    pub fn on_destroy_collider(&mut self, id: ColliderId) -> bool {
        let Some(col) = self.colliders.remove(id.0) else { return false };
        self.broadphase.remove(id);
        match col.material {
            Material::Solid => self.solid.retain(|&c| c != id),
            Material::Liquid => self.liquid.retain(|&c| c != id),
        }
        true
    }

    pub fn notify_register(&mut self, observer: Box<dyn ContextObserver>) -> ObserverId {
        self.observers.register(observer)
    }

    /// Deferred: the slot is dropped at the next tick boundary, never while
    /// observers are being walked.
    pub fn notify_unregister(&mut self, id: ObserverId) {
        self.observers.unregister(id);
    }

    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        self.bodies.apply_force(id, force);
    }

    pub fn apply_torque(&mut self, id: BodyId, torque: Scalar) {
        self.bodies.apply_torque(id, torque);
    }

    /* ---------- stepping ---------- */

    /// Drains the time accumulator in fixed steps. Each tick is bracketed by
    /// pre/post observer notifications; forces applied since the previous
    /// call act on every tick of this drain, and every accumulator is zeroed
    /// before this returns.
    pub fn advance(&mut self, elapsed: Scalar, transforms: &mut dyn TransformStore) -> StepStats {
        debug_assert!(elapsed >= 0.0, "elapsed must be non-negative, got {elapsed}");
        let elapsed = elapsed.max(0.0);
        let step = self.config.time_step;

        self.schedule.clear();
        self.ledger.clear();

        self.accumulator += elapsed;
        let budget = self.config.max_steps_per_advance as Scalar * step;
        if self.accumulator > budget {
            let dropped = self.accumulator - budget;
            self.accumulator = budget;
            self.ledger.push(LedgerEvent::TimeDropped { seconds: dropped });
        }

        let mut ticks = 0u32;
        let mut overlaps = 0u32;
        while self.accumulator >= step {
            self.observers.dispatch_pre(self.tick);
            self.accumulator -= step;
            self.tick += 1;
            ticks += 1;
            overlaps += self.tick_once(step, transforms);
            self.observers.dispatch_post(self.tick);
        }

        self.schedule.push(StepStage::Cleanup);
        let cleared = self.bodies.clear_accumulators();
        if ticks > 0 {
            self.ledger.push(LedgerEvent::ForcesCleared { bodies: cleared });
        }

        self.stats = StepStats { ticks, overlaps };

        if ticks > 0 {
            let every = self.debug.print_every as u64;
            if every != 0 && self.tick % every == 0 {
                self.print_debug_block(transforms);
            }
            let every = self.debug.json_every as u64;
            if every != 0 && self.tick % every == 0 {
                let _ = self.ledger.write_jsonl(&self.debug.json_dir, self.tick);
            }
        }

        self.stats
    }

    fn tick_once(&mut self, dt: Scalar, transforms: &mut dyn TransformStore) -> u32 {
        // Refresh world-space caches from the host transforms, then re-key
        // the broadphase.
        self.schedule.push(StepStage::UpdateAabbs);
        for (idx, col) in self.colliders.iter_mut() {
            let xf = iso(
                transforms.position(col.transform),
                transforms.rotation(col.transform),
            );
            col.world = col.local.transformed(&xf);
            col.aabb = col.world.aabb();
            self.broadphase.update(ColliderId(idx), col.aabb);
        }

        // Detection completes for the whole tick before any response runs.
        self.schedule.push(StepStage::Detection);
        self.pairs.clear();
        for (ia, a) in self.colliders.iter() {
            let a_id = ColliderId(ia);
            self.broadphase.find(&a.aabb, a.mask, &mut self.scratch);
            for &b_id in &self.scratch {
                // The lower id owns the pair; the mirrored candidate and the
                // self-hit are skipped, so each pair clips exactly once.
                if b_id == a_id || ordered_pair(a_id, b_id) != (a_id, b_id) {
                    continue;
                }
                let Some(b) = self.colliders.get(b_id.0) else { continue };
                if let Some(ov) = flatphys_collision::overlap(&a.world, &b.world) {
                    self.ledger.push(LedgerEvent::Overlap {
                        a: a_id.0,
                        b: b_id.0,
                        area: ov.area,
                    });
                    self.pairs.push((a_id, b_id, ov));
                }
            }
        }
        let overlaps = self.pairs.len() as u32;

        self.schedule.push(StepStage::Response);
        let pairs = std::mem::take(&mut self.pairs);
        for (a_id, b_id, ov) in &pairs {
            let (Some(a), Some(b)) = (self.colliders.get(a_id.0), self.colliders.get(b_id.0))
            else {
                continue;
            };
            self.responder.respond(&mut self.bodies, a, b, ov);
        }
        self.pairs = pairs;

        // Semi-implicit Euler: velocity first, then position from the new
        // velocity plus the second-order term. Deltas go back through the
        // transform seam.
        self.schedule.push(StepStage::Integrate);
        let gravity = self.config.gravity;
        for (id, b) in self.bodies.iter_mut() {
            let accel = b.force * b.inv_mass + gravity;
            b.linear_velocity += accel * dt;
            transforms.translate_local(
                b.transform,
                b.linear_velocity * dt + accel * (0.5 * dt * dt),
            );

            let ang_accel = b.torque * b.inv_inertia;
            b.angular_velocity += ang_accel * dt;
            transforms.rotate(
                b.transform,
                b.angular_velocity * dt + 0.5 * ang_accel * dt * dt,
            );

            self.ledger.push(LedgerEvent::Integrate {
                body: id.0,
                accel: [accel.x, accel.y],
                dv: [accel.x * dt, accel.y * dt],
            });
        }

        overlaps
    }

    /* ---------- observability ---------- */

    /// Digest of the stage order recorded during the last `advance`.
    pub fn schedule_digest(&self) -> [u8; 32] {
        self.schedule.digest()
    }

    /// Order-stable hash of the dynamic state: tick index, stage order and
    /// every body's pose and velocities. Equal inputs stepped equally give
    /// equal hashes.
    pub fn step_hash(&self, transforms: &dyn TransformStore) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.update_bytes(&self.tick.to_le_bytes());
        h.update_bytes(&self.schedule.digest());
        for (id, b) in self.bodies.iter() {
            h.update_bytes(&id.0.to_le_bytes());
            hash_vec2(&mut h, &transforms.position(b.transform));
            hash_scalar(&mut h, transforms.rotation(b.transform));
            hash_vec2(&mut h, &b.linear_velocity);
            hash_scalar(&mut h, b.angular_velocity);
        }
        h.finalize()
    }

    /// Draws whatever the toggles enable into the host's sink, then resets
    /// the sink's world transform so later host draws start clean.
    pub fn debug_render(&self, transforms: &dyn TransformStore, target: &mut dyn RenderTarget) {
        if self.draw_bodies {
            for (_, b) in self.bodies.iter() {
                let pos = transforms.position(b.transform);
                target.arrow(pos, pos + b.linear_velocity, Color::RED);
            }
        }
        if self.draw_colliders {
            for (_, col) in self.colliders.iter() {
                let verts = col.world.verts();
                let n = verts.len();
                for i in 0..n {
                    target.line(verts[i], verts[(i + 1) % n], Color::GREEN);
                }
            }
        }
        target.set_world(Isometry2::IDENTITY);
    }

    fn print_debug_block(&self, transforms: &dyn TransformStore) {
        println!(
            "[flatphys] tick {} ticks {} overlaps {} bodies {} colliders {}",
            self.tick,
            self.stats.ticks,
            self.stats.overlaps,
            self.bodies.len(),
            self.colliders.len()
        );
        if self.debug.show_bodies {
            for (id, b) in self.bodies.iter().take(self.debug.max_lines) {
                let p = transforms.position(b.transform);
                println!(
                    "  body {} pos ({:.3},{:.3}) vel ({:.3},{:.3}) w {:.3}",
                    id.0, p.x, p.y, b.linear_velocity.x, b.linear_velocity.y, b.angular_velocity
                );
            }
        }
        if self.debug.show_overlaps {
            let mut lines = 0usize;
            for e in self.ledger.iter() {
                if let LedgerEvent::Overlap { a, b, area } = e {
                    println!("  overlap {a}x{b} area {area:.6}");
                    lines += 1;
                    if lines >= self.debug.max_lines {
                        break;
                    }
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(h: Scalar) -> Polygon {
        Polygon::rect(h, h).unwrap()
    }

    #[test]
    fn collider_with_empty_mask_is_rejected() {
        let mut world = World::default();
        let mut xfs = BasicTransforms::new();
        let t = xfs.add(Isometry2::IDENTITY);
        let mut desc = ColliderDesc::new(square(0.5), t);
        desc.mask = GroupMask::NONE;
        assert_eq!(
            world.on_create_collider(desc, &xfs).unwrap_err(),
            ColliderError::EmptyGroupMask
        );
    }

    #[test]
    fn collider_with_unknown_body_is_rejected() {
        let mut world = World::default();
        let mut xfs = BasicTransforms::new();
        let t = xfs.add(Isometry2::IDENTITY);
        let mut desc = ColliderDesc::new(square(0.5), t);
        desc.body = Some(BodyId(9));
        assert_eq!(
            world.on_create_collider(desc, &xfs).unwrap_err(),
            ColliderError::UnknownBody(BodyId(9))
        );
    }

    #[test]
    fn colliders_land_in_their_material_bucket() {
        let mut world = World::default();
        let mut xfs = BasicTransforms::new();
        let t = xfs.add(Isometry2::IDENTITY);

        let s = world
            .on_create_collider(ColliderDesc::new(square(0.5), t), &xfs)
            .unwrap();
        let mut liquid = ColliderDesc::new(square(0.5), t);
        liquid.material = Material::Liquid;
        let l = world.on_create_collider(liquid, &xfs).unwrap();

        assert_eq!(world.solid_colliders(), &[s]);
        assert_eq!(world.liquid_colliders(), &[l]);

        assert!(world.on_destroy_collider(s));
        assert!(world.solid_colliders().is_empty());
        assert!(!world.on_destroy_collider(s));
    }

    #[test]
    fn destroying_a_body_leaves_collider_backref_dangling_but_harmless() {
        let mut world = World::default();
        let mut xfs = BasicTransforms::new();
        let t = xfs.add(Isometry2::IDENTITY);
        let b = world.on_create_body(BodyDesc::new(1.0, 1.0, t)).unwrap();
        let mut desc = ColliderDesc::new(square(0.5), t);
        desc.body = Some(b);
        let c = world.on_create_collider(desc, &xfs).unwrap();

        assert!(world.on_destroy_body(b));
        let col = world.collider(c).unwrap();
        assert_eq!(col.body(), Some(b));
        assert!(world.bodies().get(b).is_none());

        // Ticking with the dangling back-reference must be safe.
        world.advance(world.config().time_step, &mut xfs);
    }

    #[test]
    fn observer_unregister_during_dispatch_takes_effect_next_boundary() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct CountTicks(Rc<RefCell<u32>>);
        impl ContextObserver for CountTicks {
            fn on_pre_tick(&mut self, _t: u64) { *self.0.borrow_mut() += 1; }
            fn on_post_tick(&mut self, _t: u64) {}
        }

        let mut world = World::default();
        let mut xfs = BasicTransforms::new();
        let count = Rc::new(RefCell::new(0));
        let id = world.notify_register(Box::new(CountTicks(count.clone())));

        let step = world.config().time_step;
        world.advance(step, &mut xfs);
        assert_eq!(*count.borrow(), 1);

        world.notify_unregister(id);
        world.advance(step, &mut xfs);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn responder_sees_each_pair_once() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct CountPairs(Rc<RefCell<Vec<(u32, u32)>>>);
        impl ContactResponder for CountPairs {
            fn respond(&mut self, _: &mut Bodies, a: &Collider, b: &Collider, _: &Overlap) {
                // Collider getters are enough to identify the pair by mask.
                let _ = (a.material(), b.material());
                self.0.borrow_mut().push((a.mask().0, b.mask().0));
            }
        }

        let mut world = World::default();
        let mut xfs = BasicTransforms::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        world.set_responder(Box::new(CountPairs(seen.clone())));

        let ta = xfs.add(Isometry2::IDENTITY);
        let tb = xfs.add(iso(vec2(0.5, 0.0), 0.0));
        let mut a = ColliderDesc::new(square(0.5), ta);
        a.mask = GroupMask(0b01);
        let mut b = ColliderDesc::new(square(0.5), tb);
        b.mask = GroupMask(0b11);
        world.on_create_collider(a, &xfs).unwrap();
        world.on_create_collider(b, &xfs).unwrap();

        let stats = world.advance(world.config().time_step, &mut xfs);
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.overlaps, 1);
        assert_eq!(seen.borrow().as_slice(), &[(0b01, 0b11)]);
    }
}
