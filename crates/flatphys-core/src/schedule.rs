use crate::StepHasher;

/// Stages of one fixed step, in execution order. Recorded so a frame's
/// schedule can be digested and compared across runs.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepStage {
    UpdateAabbs = 1,
    Detection = 2,
    Response = 3,
    Integrate = 4,
    Cleanup = 5,
}

pub fn schedule_digest(stages: &[StepStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages { h.update_bytes(&[*s as u8]); }
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_order_sensitive() {
        let a = schedule_digest(&[StepStage::Detection, StepStage::Integrate]);
        let b = schedule_digest(&[StepStage::Integrate, StepStage::Detection]);
        assert_ne!(a, b);
        let c = schedule_digest(&[StepStage::Detection, StepStage::Integrate]);
        assert_eq!(a, c);
    }
}
