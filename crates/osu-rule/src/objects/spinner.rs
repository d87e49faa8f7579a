use osu_model::{Mods, Target};

use crate::hit_result::{ComboResult, HitResult};
use crate::ruleset::OsuRuleset;

/// Fraction of the duration that must be held for the full terminal tier.
const REQUIRED_FRACTION: f64 = 0.65;

/// Interval between periodic progress results while held.
const SPIN_TICK_MS: i64 = 500;

#[derive(Debug, Clone)]
struct SpinnerState {
    /// Total ms held so far within the duration.
    accumulated: i64,
    last_time: i64,
    spin_ticks: i64,
    bonus_ticks: i64,
}

/// Held-duration-only target judge. No position requirement; any held
/// button accumulates progress, and the terminal tier is a ratio of held
/// time over the requirement.
#[derive(Debug, Clone)]
pub struct SpinnerJudge {
    pub(crate) number: usize,
    pub(crate) fade_time: i64,
    start_time: i64,
    end_time: i64,
    required_ms: i64,
    states: Vec<SpinnerState>,
}

impl SpinnerJudge {
    pub fn new(target: &Target, cursors: usize, fade_time: i64) -> Self {
        let required_ms = ((target.duration() as f64 * REQUIRED_FRACTION) as i64).max(1);
        Self {
            number: target.id,
            fade_time,
            start_time: target.start_time,
            end_time: target.end_time,
            required_ms,
            states: vec![
                SpinnerState {
                    accumulated: 0,
                    last_time: target.start_time,
                    spin_ticks: 0,
                    bonus_ticks: 0,
                };
                cursors
            ],
        }
    }

    pub fn update_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        if time < self.start_time || set.is_hit(self.number, cursor) {
            return;
        }

        let player = &set.players[cursor];
        let auto_spin = player
            .diff
            .mods()
            .intersects(Mods::RELAX | Mods::SPUN_OUT);
        let held = auto_spin || player.input().left || player.input().right;
        let position = set.chart.targets[self.number].start_position;

        let clamped = time.min(self.end_time);
        let state = &mut self.states[cursor];
        let dt = (clamped - state.last_time).max(0);
        state.last_time = clamped;

        if !held || dt == 0 {
            return;
        }
        state.accumulated += dt;

        // Progress results toward the requirement, then bonus beyond it.
        let due_spins = state.accumulated.min(self.required_ms) / SPIN_TICK_MS;
        let mut new_spins = due_spins - state.spin_ticks;
        state.spin_ticks = due_spins;

        let due_bonus = (state.accumulated - self.required_ms).max(0) / SPIN_TICK_MS;
        let mut new_bonus = due_bonus - state.bonus_ticks;
        state.bonus_ticks = due_bonus;

        while new_spins > 0 {
            set.submit_result(
                cursor,
                time,
                self.number,
                position,
                HitResult::SpinnerSpin,
                true,
                ComboResult::Hold,
            );
            new_spins -= 1;
        }
        while new_bonus > 0 {
            set.submit_result(
                cursor,
                time,
                self.number,
                position,
                HitResult::SpinnerBonus,
                true,
                ComboResult::Hold,
            );
            new_bonus -= 1;
        }
    }

    pub fn update_post_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        if time < self.end_time || set.is_hit(self.number, cursor) {
            return;
        }

        let ratio = self.states[cursor].accumulated as f64 / self.required_ms as f64;
        let result = if ratio >= 1.0 {
            HitResult::Hit300
        } else if ratio >= 0.5 {
            HitResult::Hit100
        } else if ratio >= 0.25 {
            HitResult::Hit50
        } else {
            HitResult::Miss
        };
        let combo = if result == HitResult::Miss {
            ComboResult::Reset
        } else {
            ComboResult::Increase
        };

        let position = set.chart.targets[self.number].start_position;
        set.mark_hit(self.number, cursor);
        set.mark_start_hit(self.number, cursor);
        set.submit_result(cursor, time, self.number, position, result, false, combo);
    }
}
