pub mod aabb;
pub mod polygon;
pub mod mask;

pub use aabb::Aabb2;
pub use polygon::{Polygon, GeomError, AREA_EPSILON};
pub use mask::GroupMask;
