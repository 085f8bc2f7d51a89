use std::collections::BTreeMap;

use flatphys_core::{ColliderId, Scalar};
use flatphys_geom::{Aabb2, GroupMask};

/// Uniform-grid spatial index over collider AABBs.
///
/// Holds non-owning ids only. `find` over-approximates (results still carry
/// the exact-AABB filter, but a fatter true region than the AABB is fine
/// since everything feeds an exact narrow phase); it must never
/// under-approximate: every registered collider whose AABB intersects the
/// query box and whose mask is compatible is returned. BTreeMap cells keep
/// iteration deterministic.
pub struct GridIndex {
    cell_size: Scalar,
    cells: BTreeMap<(i32, i32), Vec<ColliderId>>,
    entries: BTreeMap<ColliderId, Entry>,
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    aabb: Aabb2,
    mask: GroupMask,
}

impl GridIndex {
    pub fn new(cell_size: Scalar) -> Self {
        debug_assert!(cell_size > 0.0);
        Self { cell_size, cells: BTreeMap::new(), entries: BTreeMap::new() }
    }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn insert(&mut self, id: ColliderId, aabb: Aabb2, mask: GroupMask) {
        if self.entries.contains_key(&id) {
            self.remove(id);
        }
        for key in cell_range(self.cell_size, &aabb) {
            self.cells.entry(key).or_default().push(id);
        }
        self.entries.insert(id, Entry { aabb, mask });
    }

    pub fn remove(&mut self, id: ColliderId) {
        let Some(entry) = self.entries.remove(&id) else { return };
        for key in cell_range(self.cell_size, &entry.aabb) {
            if let Some(bucket) = self.cells.get_mut(&key) {
                bucket.retain(|&c| c != id);
                if bucket.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// Re-keys a moved collider. Keeps its mask.
    pub fn update(&mut self, id: ColliderId, aabb: Aabb2) {
        let Some(entry) = self.entries.get(&id) else { return };
        let mask = entry.mask;
        self.remove(id);
        self.insert(id, aabb, mask);
    }

    /// Collects every registered collider whose AABB intersects `aabb` and
    /// whose mask is compatible with `mask`, in ascending id order. `out` is
    /// cleared first so callers can reuse a scratch vector.
    pub fn find(&self, aabb: &Aabb2, mask: GroupMask, out: &mut Vec<ColliderId>) {
        out.clear();
        for key in cell_range(self.cell_size, aabb) {
            if let Some(bucket) = self.cells.get(&key) {
                out.extend_from_slice(bucket);
            }
        }
        out.sort_unstable();
        out.dedup();
        out.retain(|id| {
            let e = &self.entries[id];
            e.mask.compatible(mask) && e.aabb.overlaps(aabb)
        });
    }

}

fn cell_range(cell_size: Scalar, aabb: &Aabb2) -> impl Iterator<Item = (i32, i32)> {
    let inv = 1.0 / cell_size;
    let x0 = (aabb.min.x * inv).floor() as i32;
    let y0 = (aabb.min.y * inv).floor() as i32;
    let x1 = (aabb.max.x * inv).floor() as i32;
    let y1 = (aabb.max.y * inv).floor() as i32;
    (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| (x, y)))
}
