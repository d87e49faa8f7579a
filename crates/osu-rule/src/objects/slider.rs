use cgmath::MetricSpace;
use osu_model::{Mods, Target, TargetKind, Vec2};

use crate::END_POINT_LENIENCY;
use crate::hit_result::{ClickAction, ComboResult, HitResult};
use crate::player::Buttons;
use crate::ruleset::OsuRuleset;

/// Tracking radius multiplier once a hold is in progress, to tolerate
/// drift.
const FOLLOW_RADIUS_SCALE: f32 = 2.4;

/// Per-cursor judgment state of a held target.
#[derive(Debug, Clone)]
struct SliderState {
    /// Button owning the current hold.
    down_button: Buttons,
    /// Start judged as a genuine hit (feeds the terminal ratio).
    start_scored: bool,
    /// Scoring points resolved as scored so far.
    scored: usize,
    /// Scoring points resolved as missed so far.
    missed: usize,
    /// Time the current hold began.
    slide_start: i64,
    /// A hold is currently in progress.
    sliding: bool,
}

impl SliderState {
    fn new() -> Self {
        Self {
            down_button: Buttons::NONE,
            start_scored: false,
            scored: 0,
            missed: 0,
            slide_start: 0,
            sliding: false,
        }
    }
}

/// Held multi-segment target judge.
///
/// The start is judged on click; interior scoring points resolve one by one
/// as simulated time passes them, scored while the hold is unbroken and
/// missed otherwise; the terminal judgment is a ratio over points plus the
/// start.
#[derive(Debug, Clone)]
pub struct SliderJudge {
    pub(crate) number: usize,
    pub(crate) fade_time: i64,
    start_time: i64,
    end_time: i64,
    /// Scoring point timestamps, ascending. The final point is pulled
    /// forward for scoring leniency.
    points: Vec<i64>,
    points_per_span: usize,
    states: Vec<SliderState>,
    /// Body position cache for the last queried (time, radius).
    last_query: Option<(i64, u32)>,
    cached_position: Vec2,
}

impl SliderJudge {
    pub fn new(target: &Target, cursors: usize, fade_time: i64) -> Self {
        let TargetKind::Slider {
            score_points,
            span_count,
            ..
        } = &target.kind
        else {
            unreachable!("slider judge built for a non-slider target");
        };

        let mut points: Vec<i64> = score_points.iter().map(|p| p.time).collect();
        if let Some(last) = points.last_mut() {
            let halfway = target.start_time + target.duration() / 2;
            *last = halfway.max(target.end_time - END_POINT_LENIENCY);
        }

        let points_per_span = (points.len() / (*span_count).max(1)).max(1);

        Self {
            number: target.id,
            fade_time,
            start_time: target.start_time,
            end_time: target.end_time,
            points,
            points_per_span,
            states: vec![SliderState::new(); cursors],
            last_query: None,
            cached_position: Vec2::new(0.0, 0.0),
        }
    }

    pub fn update_click_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        if set.is_start_hit(self.number, cursor) || set.is_hit(self.number, cursor) {
            return;
        }

        let player = &set.players[cursor];
        let mut radius = player.diff.circle_radius();
        if player.diff.mods().contains(Mods::AUTOPILOT) {
            radius = 100.0;
        }
        let hit50 = player.diff.hit50();

        let position = set.chart.targets[self.number].stacked_start_position(radius);
        let clicked = player.clicked();
        let in_radius = player.position().distance(position) <= radius;

        if !(clicked && in_radius) {
            return;
        }

        if set.click_eligibility(time, self.number, cursor) == ClickAction::Click {
            let player = &mut set.players[cursor];
            player.consume_click();
            self.states[cursor].down_button = player.pressed_button();

            let relative = (time - self.start_time).abs();
            let (result, combo) = if relative < hit50 {
                self.states[cursor].start_scored = true;
                (HitResult::SliderStart, ComboResult::Increase)
            } else {
                // Start blown: no points, locks further start attempts.
                (HitResult::SliderMiss, ComboResult::Reset)
            };

            set.mark_start_hit(self.number, cursor);
            set.submit_result(cursor, time, self.number, position, result, true, combo);
        } else {
            set.players[cursor].cancel_click();
        }
    }

    pub fn update_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        if time < self.start_time || set.is_hit(self.number, cursor) {
            return;
        }

        let player = &set.players[cursor];
        let radius = player.diff.circle_radius();
        let relax = player.diff.mods().contains(Mods::RELAX);

        let game_down = player.game_down_state;
        let mouse_down = player.mouse_down_button;
        let last_button = player.last_button;
        let last_button2 = player.last_button2;
        let pressed = player.pressed_button();
        let cursor_position = player.position();

        let body_position = self.body_position(set, time, radius);

        // A release-and-repress within the same frame keeps the hold alive,
        // unless both buttons were down at the moment of swap.
        let acceptable_swap =
            game_down && !(last_button == Buttons::BOTH && last_button2 == mouse_down);

        let state = &mut self.states[cursor];

        let mut mouse_down_acceptable = false;
        if game_down {
            if state.down_button.is_empty()
                || (mouse_down != Buttons::BOTH && acceptable_swap)
            {
                state.down_button = pressed;
                mouse_down_acceptable = true;
            } else if mouse_down.intersects(state.down_button) {
                mouse_down_acceptable = true;
            }
        } else {
            state.down_button = Buttons::NONE;
        }

        mouse_down_acceptable = mouse_down_acceptable || acceptable_swap || relax;

        let mut radius_needed = radius;
        if state.sliding {
            radius_needed *= FOLLOW_RADIUS_SCALE;
        }

        let allowable =
            mouse_down_acceptable && cursor_position.distance(body_position) <= radius_needed;

        if allowable && !state.sliding {
            state.sliding = true;
            state.slide_start = time;
        }

        let points_passed = self.points.iter().take_while(|&&t| t <= time).count();

        if state.scored + state.missed < points_passed {
            let index = state.scored + state.missed;
            let point_time = self.points[index];

            if allowable && state.slide_start <= point_time {
                state.scored += 1;

                let result = if points_passed == self.points.len() {
                    HitResult::SliderEnd
                } else if points_passed % self.points_per_span == 0 {
                    HitResult::SliderRepeat
                } else {
                    HitResult::SliderPoint
                };

                set.submit_result(
                    cursor,
                    time,
                    self.number,
                    body_position,
                    result,
                    true,
                    ComboResult::Increase,
                );
            } else {
                state.missed += 1;

                // The very last point holds combo: the terminal ratio can
                // still salvage a scoring judgment.
                let combo = if state.scored + state.missed == self.points.len() {
                    ComboResult::Hold
                } else {
                    ComboResult::Reset
                };

                set.submit_result(
                    cursor,
                    time,
                    self.number,
                    body_position,
                    HitResult::SliderMiss,
                    true,
                    combo,
                );
            }
        }

        let state = &mut self.states[cursor];
        if !allowable && state.sliding && state.scored + state.missed < self.points.len() {
            state.sliding = false;
        }
    }

    pub fn update_post_for(&mut self, set: &mut OsuRuleset, cursor: usize, time: i64) {
        let hit50 = set.players[cursor].diff.hit50();
        let radius = set.players[cursor].diff.circle_radius();

        if time > self.start_time + hit50 && !set.is_start_hit(self.number, cursor) {
            let position = set.chart.targets[self.number].stacked_start_position(radius);
            set.mark_start_hit(self.number, cursor);
            set.submit_result(
                cursor,
                time,
                self.number,
                position,
                HitResult::SliderMiss,
                true,
                ComboResult::Reset,
            );
            self.states[cursor].down_button = set.players[cursor].pressed_button();
        }

        if time >= self.end_time && !set.is_hit(self.number, cursor) {
            let state = &mut self.states[cursor];
            if state.start_scored {
                state.scored += 1;
            }

            let rate = state.scored as f64 / (self.points.len() + 1) as f64;

            let result = if rate == 1.0 {
                HitResult::Hit300
            } else if rate >= 0.5 {
                HitResult::Hit100
            } else if rate > 0.0 {
                HitResult::Hit50
            } else {
                HitResult::Miss
            };
            let combo = if result == HitResult::Miss {
                ComboResult::Reset
            } else {
                ComboResult::Hold
            };

            let position = set.chart.targets[self.number].end_position;
            set.mark_hit(self.number, cursor);
            set.submit_result(cursor, time, self.number, position, result, false, combo);
        }
    }

    /// Time-interpolated body position, cached per (time, radius) since all
    /// cursors with the same radius query the same frame time.
    fn body_position(&mut self, set: &OsuRuleset, time: i64, radius: f32) -> Vec2 {
        let key = (time, radius.to_bits());
        if self.last_query != Some(key) {
            self.cached_position = set.chart.targets[self.number].position_at(time, radius);
            self.last_query = Some(key);
        }
        self.cached_position
    }
}
