use cgmath::MetricSpace;
use osu_model::Mods;

use crate::hit_result::{ClickAction, ComboResult, HitResult};
use crate::ruleset::OsuRuleset;

/// Tap-target judge. Pending until a click resolves it or finalization
/// forces a miss; terminal state lives on the ruleset's flag board.
#[derive(Debug, Clone)]
pub struct CircleJudge {
    pub(crate) number: usize,
    pub(crate) fade_time: i64,
    start_time: i64,
}

impl CircleJudge {
    pub fn new(target: &osu_model::Target, fade_time: i64) -> Self {
        Self {
            number: target.id,
            fade_time,
            start_time: target.start_time,
        }
    }

    pub fn update_click_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        if set.is_hit(self.number, cursor) {
            return;
        }

        let player = &set.players[cursor];
        let mut radius = player.diff.circle_radius();
        if player.diff.mods().contains(Mods::AUTOPILOT) {
            radius = 100.0;
        }

        let position = set.chart.targets[self.number].stacked_start_position(radius);
        let clicked = player.clicked();
        let in_range = player.position().distance(position) <= radius;

        let hit300 = player.diff.hit300();
        let hit100 = player.diff.hit100();
        let hit50 = player.diff.hit50();

        if clicked && in_range {
            match set.click_eligibility(time, self.number, cursor) {
                ClickAction::Click => {
                    set.players[cursor].consume_click();

                    let relative = (time - self.start_time).abs();
                    let result = if relative < hit300 {
                        HitResult::Hit300
                    } else if relative < hit100 {
                        HitResult::Hit100
                    } else if relative < hit50 {
                        HitResult::Hit50
                    } else {
                        HitResult::Miss
                    };
                    let combo = if result == HitResult::Miss {
                        ComboResult::Reset
                    } else {
                        ComboResult::Increase
                    };

                    set.mark_hit(self.number, cursor);
                    set.mark_start_hit(self.number, cursor);
                    set.submit_result(cursor, time, self.number, position, result, false, combo);
                }
                ClickAction::Shake => set.notify_shake(cursor, time, self.number),
                ClickAction::Ignored => {}
            }
        }
    }

    pub fn update_post_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        if set.is_hit(self.number, cursor) {
            return;
        }

        let hit50 = set.players[cursor].diff.hit50();
        if time > self.start_time + hit50 {
            let radius = set.players[cursor].diff.circle_radius();
            let position = set.chart.targets[self.number].stacked_start_position(radius);
            set.mark_hit(self.number, cursor);
            set.mark_start_hit(self.number, cursor);
            set.submit_result(
                cursor,
                time,
                self.number,
                position,
                HitResult::Miss,
                false,
                ComboResult::Reset,
            );
        }
    }
}
