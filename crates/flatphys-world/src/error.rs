use flatphys_core::BodyId;
use thiserror::Error;

/// Construction-time rejection of invalid body parameters. Invalid state is
/// never admitted into the simulation.
#[derive(Debug, Error, PartialEq)]
pub enum BodyError {
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("moment of inertia must be positive and finite, got {0}")]
    InvalidInertia(f32),
}

/// Construction-time rejection of invalid collider parameters. Degenerate
/// geometry is rejected earlier, by `Polygon::convex`.
#[derive(Debug, Error, PartialEq)]
pub enum ColliderError {
    #[error("group mask must have at least one bit set")]
    EmptyGroupMask,
    #[error("collider references unknown body {0}")]
    UnknownBody(BodyId),
}
