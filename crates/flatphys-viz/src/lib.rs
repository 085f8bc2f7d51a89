use std::fs;
use std::io::Write as _;
use std::path::Path;

use flatphys_core::types::{Isometry2, Vec2};
use flatphys_core::{schedule_digest, StepStage};
use serde::Serialize;

/// Records the stage order of a frame so it can be digested and compared
/// across runs.
#[derive(Default)]
pub struct ScheduleRecorder { stages: Vec<StepStage> }

impl ScheduleRecorder {
    pub fn new() -> Self { Self { stages: Vec::new() } }
    pub fn push(&mut self, s: StepStage) { self.stages.push(s); }
    pub fn clear(&mut self) { self.stages.clear(); }
    pub fn digest(&self) -> [u8; 32] { schedule_digest(&self.stages) }
}

/// Debug output knobs. `print_every`/`json_every` of 0 disable that channel;
/// ledger dumps land in `json_dir`.
#[derive(Clone, Debug)]
pub struct DebugSettings {
    pub print_every: u32,
    pub json_every: u32,
    pub json_dir: String,
    pub show_bodies: bool,
    pub show_overlaps: bool,
    pub max_lines: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            print_every: 0,
            json_every: 0,
            json_dir: "out".to_string(),
            show_bodies: false,
            show_overlaps: false,
            max_lines: 16,
        }
    }
}

/// Per-frame event record. Vectors are stored as arrays so the on-disk JSONL
/// stays engine-agnostic.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    Overlap { a: u32, b: u32, area: f32 },
    Integrate { body: u32, accel: [f32; 2], dv: [f32; 2] },
    TimeDropped { seconds: f32 },
    ForcesCleared { bodies: u32 },
}

/// Bounded per-frame event buffer, dumped as one JSON object per line.
pub struct Ledger {
    events: Vec<LedgerEvent>,
    cap: usize,
}

impl Ledger {
    pub fn new(cap: usize) -> Self {
        Self { events: Vec::new(), cap }
    }

    pub fn push(&mut self, e: LedgerEvent) {
        if self.events.len() < self.cap {
            self.events.push(e);
        }
    }

    pub fn clear(&mut self) { self.events.clear(); }
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> { self.events.iter() }
    pub fn len(&self) -> usize { self.events.len() }
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    pub fn write_jsonl(&self, dir: &str, tick: u64) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let path = Path::new(dir).join(format!("tick_{tick:08}.jsonl"));
        let mut f = fs::File::create(path)?;
        for e in &self.events {
            let line = serde_json::to_string(e)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Color { pub r: u8, pub g: u8, pub b: u8, pub a: u8 }

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
}

/// Abstract debug-draw sink. Physics logic has no dependency on any of these
/// calls doing anything; a no-op implementation is valid.
pub trait RenderTarget {
    fn arrow(&mut self, from: Vec2, to: Vec2, color: Color);
    fn line(&mut self, a: Vec2, b: Vec2, color: Color);
    fn set_world(&mut self, xf: Isometry2);
}
