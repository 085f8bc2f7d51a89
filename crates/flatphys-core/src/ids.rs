use core::fmt;

/// Stable slot-arena handle to a rigid body.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BodyId(pub u32);
impl fmt::Display for BodyId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "BodyId({})", self.0) } }

/// Stable slot-arena handle to a collider.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ColliderId(pub u32);
impl fmt::Display for ColliderId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ColliderId({})", self.0) } }

/// Handle to a registered simulation observer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObserverId(pub u32);
impl fmt::Display for ObserverId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ObserverId({})", self.0) } }

/// Opaque handle into the host's transform storage. The physics core never
/// stores transform data itself; it only routes reads/deltas through this id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransformId(pub u32);
impl fmt::Display for TransformId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "TransformId({})", self.0) } }
