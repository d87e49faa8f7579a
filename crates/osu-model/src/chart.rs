use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::target::{Target, TargetKind};

/// A gap in the chart during which no targets appear and health does not
/// drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSection {
    pub start_time: i64,
    pub end_time: i64,
}

impl PauseSection {
    pub fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }

    pub fn contains(&self, time: i64) -> bool {
        time >= self.start_time && time < self.end_time
    }
}

/// An ordered, geometry-resolved chart. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub targets: Vec<Target>,
    pub pauses: Vec<PauseSection>,
    pub difficulty: Difficulty,
}

impl Chart {
    pub fn new(targets: Vec<Target>, difficulty: Difficulty) -> Self {
        Self {
            targets,
            pauses: Vec::new(),
            difficulty,
        }
    }

    pub fn with_pauses(mut self, pauses: Vec<PauseSection>) -> Self {
        self.pauses = pauses;
        self
    }

    /// Check the preconditions the engine assumes: ascending start times,
    /// ids matching positions, positive held durations, and at least one
    /// scoring point per held target.
    pub fn validate(&self) -> Result<()> {
        let mut prev_start = i64::MIN;
        for (i, target) in self.targets.iter().enumerate() {
            if target.id != i {
                bail!("target {} carries id {}", i, target.id);
            }
            if target.start_time < prev_start {
                bail!("target {} starts before its predecessor", i);
            }
            prev_start = target.start_time;

            if target.end_time < target.start_time {
                bail!("target {} ends before it starts", i);
            }

            match &target.kind {
                TargetKind::Slider { score_points, span_count, path } => {
                    if score_points.is_empty() {
                        bail!("held target {} has no scoring points", i);
                    }
                    if *span_count == 0 {
                        bail!("held target {} has zero spans", i);
                    }
                    if path.len() < 2 {
                        bail!("held target {} has a degenerate path", i);
                    }
                }
                TargetKind::Spinner => {
                    if target.duration() == 0 {
                        bail!("duration target {} has zero length", i);
                    }
                }
                TargetKind::Circle => {}
            }
        }
        Ok(())
    }

    /// Play time in ms between the first target's start and the last
    /// target's end, with pauses removed. Zero for an empty chart.
    pub fn drain_duration(&self) -> i64 {
        let (Some(first), Some(last)) = (self.targets.first(), self.targets.last()) else {
            return 0;
        };
        let pauses: i64 = self.pauses.iter().map(|p| p.duration()).sum();
        (last.end_time - first.start_time - pauses).max(0)
    }

    /// Whether health drains at this time (not inside a pause).
    pub fn is_drain_time(&self, time: i64) -> bool {
        !self.pauses.iter().any(|p| p.contains(time))
    }
}
