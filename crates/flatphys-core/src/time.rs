/// Per-frame instrumentation counters. Never used for control flow.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StepStats {
    /// Fixed steps executed by the last `advance`.
    pub ticks: u32,
    /// Unique overlapping pairs detected across those steps.
    pub overlaps: u32,
}
