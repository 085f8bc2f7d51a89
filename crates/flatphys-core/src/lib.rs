pub mod scalar;
pub mod ids;
pub mod types;
pub mod hash;
pub mod time;
pub mod schedule;

pub use scalar::Scalar;
pub use ids::{BodyId, ColliderId, ObserverId, TransformId};
pub use types::{Vec2, Isometry2, vec2, iso};
pub use hash::{StepHasher, hash_vec2, hash_scalar};
pub use time::StepStats;
pub use schedule::{StepStage, schedule_digest};
