//! Per-target judge state machines.
//!
//! One judge wraps one chart target and keeps per-cursor judgment state.
//! All three kinds share the same per-frame contract: a click entry point,
//! a continuous (position) entry point, a per-cursor finalization entry
//! point, and a global done check used for retirement. Kinds are a flat
//! tagged variant; there is no deeper hierarchy.

mod circle;
mod slider;
mod spinner;

pub use circle::CircleJudge;
pub use slider::SliderJudge;
pub use spinner::SpinnerJudge;

use osu_model::{Target, TargetKind};

use crate::player::PlayerContext;
use crate::ruleset::{ObjectFlags, OsuRuleset};

#[derive(Debug, Clone)]
pub enum TargetJudge {
    Circle(CircleJudge),
    Slider(SliderJudge),
    Spinner(SpinnerJudge),
}

impl TargetJudge {
    pub fn new(target: &Target, players: &[PlayerContext]) -> Self {
        let fade_time = fade_time(target, players);
        match &target.kind {
            TargetKind::Circle => TargetJudge::Circle(CircleJudge::new(target, fade_time)),
            TargetKind::Slider { .. } => {
                TargetJudge::Slider(SliderJudge::new(target, players.len(), fade_time))
            }
            TargetKind::Spinner => {
                TargetJudge::Spinner(SpinnerJudge::new(target, players.len(), fade_time))
            }
        }
    }

    pub fn number(&self) -> usize {
        match self {
            TargetJudge::Circle(j) => j.number,
            TargetJudge::Slider(j) => j.number,
            TargetJudge::Spinner(j) => j.number,
        }
    }

    /// Time at which this target enters the active set.
    pub fn fade_time(&self) -> i64 {
        match self {
            TargetJudge::Circle(j) => j.fade_time,
            TargetJudge::Slider(j) => j.fade_time,
            TargetJudge::Spinner(j) => j.fade_time,
        }
    }

    pub fn is_slider(&self) -> bool {
        matches!(self, TargetJudge::Slider(_))
    }

    /// Click pass entry point.
    pub fn update_click_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        match self {
            TargetJudge::Circle(j) => j.update_click_for(set, cursor, time),
            TargetJudge::Slider(j) => j.update_click_for(set, cursor, time),
            TargetJudge::Spinner(_) => {}
        }
    }

    /// Continuous (position) pass entry point.
    pub fn update_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        match self {
            TargetJudge::Circle(_) => {}
            TargetJudge::Slider(j) => j.update_for(set, cursor, time),
            TargetJudge::Spinner(j) => j.update_for(set, cursor, time),
        }
    }

    /// Per-cursor finalization entry point.
    pub fn update_post_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        match self {
            TargetJudge::Circle(j) => j.update_post_for(set, cursor, time),
            TargetJudge::Slider(j) => j.update_post_for(set, cursor, time),
            TargetJudge::Spinner(j) => j.update_post_for(set, cursor, time),
        }
    }

    /// Global done check: the target leaves the active set once every
    /// cursor has reached terminal state for it.
    pub fn is_done(&self, flags: &ObjectFlags) -> bool {
        match self {
            TargetJudge::Circle(_) | TargetJudge::Spinner(_) => flags.all_hit(),
            TargetJudge::Slider(_) => flags.all_hit() && flags.all_start_hit(),
        }
    }
}

fn fade_time(target: &Target, players: &[PlayerContext]) -> i64 {
    let preempt = players
        .iter()
        .map(|p| p.diff.preempt())
        .min()
        .unwrap_or(0);
    target.start_time - preempt
}
