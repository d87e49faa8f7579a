use osu_model::{Difficulty, Vec2};
use serde::{Deserialize, Serialize};

/// Button combination bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buttons(pub u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const LEFT: Buttons = Buttons(1);
    pub const RIGHT: Buttons = Buttons(2);
    pub const BOTH: Buttons = Buttons(3);

    pub fn intersects(self, other: Buttons) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Buttons) {
        self.0 |= rhs.0;
    }
}

/// One per-frame input sample for a cursor: raw position and raw button
/// levels. May come from a live device or a decoded replay stream; the
/// engine does not care.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    pub position: Vec2,
    pub left: bool,
    pub right: bool,
}

impl InputSample {
    pub fn new(position: Vec2, left: bool, right: bool) -> Self {
        Self {
            position,
            left,
            right,
        }
    }

    pub fn idle(position: Vec2) -> Self {
        Self::new(position, false, false)
    }

    pub fn buttons(&self) -> Buttons {
        let mut buttons = Buttons::NONE;
        if self.left {
            buttons |= Buttons::LEFT;
        }
        if self.right {
            buttons |= Buttons::RIGHT;
        }
        buttons
    }
}

/// Per-cursor transient input state.
///
/// Judgment depends on press/release *edges*, not raw levels, so each click
/// pass re-derives edges against the previous frame's levels and keeps
/// enough press history (last and previous-to-last pressed combination) for
/// the held-target button-swap rule.
#[derive(Debug, Clone)]
pub struct PlayerContext {
    pub diff: Difficulty,
    input: InputSample,

    prev_left: bool,
    prev_right: bool,

    /// Any button was down at the last level transition.
    pub game_down_state: bool,
    /// Button combination at the last level transition.
    pub mouse_down_button: Buttons,
    /// Combination before the current one.
    pub last_button: Buttons,
    /// Combination before `last_button`.
    pub last_button2: Buttons,

    /// Fresh press edge this frame (left / right).
    pub left_cond: bool,
    pub right_cond: bool,
    /// Consumable copy of the edges; targets clear these as they take the
    /// press.
    pub left_cond_e: bool,
    pub right_cond_e: bool,

    /// Both buttons went down in the same frame; the press counts once.
    pub double_click: bool,
    /// A target already took this frame's press.
    pub already_stolen: bool,
}

impl PlayerContext {
    pub fn new(diff: Difficulty) -> Self {
        Self {
            diff,
            input: InputSample::idle(Vec2::new(0.0, 0.0)),
            prev_left: false,
            prev_right: false,
            game_down_state: false,
            mouse_down_button: Buttons::NONE,
            last_button: Buttons::NONE,
            last_button2: Buttons::NONE,
            left_cond: false,
            right_cond: false,
            left_cond_e: false,
            right_cond_e: false,
            double_click: false,
            already_stolen: false,
        }
    }

    /// Latest raw input sample.
    pub fn input(&self) -> &InputSample {
        &self.input
    }

    pub fn position(&self) -> Vec2 {
        self.input.position
    }

    pub fn feed(&mut self, sample: InputSample) {
        self.input = sample;
    }

    /// Recompute press edges from the raw levels against the previous
    /// frame's baseline. Runs once at the start of every click pass.
    pub fn begin_click_pass(&mut self) {
        self.already_stolen = false;

        self.left_cond = !self.prev_left && self.input.left;
        self.right_cond = !self.prev_right && self.input.right;
        self.left_cond_e = self.left_cond;
        self.right_cond_e = self.right_cond;
        self.double_click = self.left_cond && self.right_cond;

        if self.prev_left != self.input.left || self.prev_right != self.input.right {
            self.game_down_state = self.input.left || self.input.right;
            self.last_button2 = self.last_button;
            self.last_button = self.mouse_down_button;
            self.mouse_down_button = self.input.buttons();
        }
    }

    /// Restore the raw levels as the next frame's edge baseline. Runs once
    /// at the end of every click pass.
    pub fn end_click_pass(&mut self) {
        self.prev_left = self.input.left;
        self.prev_right = self.input.right;
    }

    /// A consumable press edge is available this frame.
    pub fn clicked(&self) -> bool {
        self.left_cond_e || self.right_cond_e
    }

    /// Take this frame's press. Consumes one edge (left before right); a
    /// simultaneous both-button press is consumed whole.
    pub fn consume_click(&mut self) {
        if self.double_click {
            self.left_cond_e = false;
            self.right_cond_e = false;
        } else if self.left_cond_e {
            self.left_cond_e = false;
        } else if self.right_cond_e {
            self.right_cond_e = false;
        }
        self.already_stolen = true;
    }

    /// Drop the remaining edges without scoring (rejected click on a held
    /// target).
    pub fn cancel_click(&mut self) {
        self.left_cond_e = false;
        self.right_cond_e = false;
    }

    /// Button considered responsible for the press being handled.
    pub fn pressed_button(&self) -> Buttons {
        if self.left_cond {
            Buttons::LEFT
        } else if self.right_cond {
            Buttons::RIGHT
        } else {
            self.mouse_down_button
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osu_model::Mods;

    fn player() -> PlayerContext {
        PlayerContext::new(Difficulty::new(5.0, 4.0, 5.0, 9.0))
    }

    fn sample(left: bool, right: bool) -> InputSample {
        InputSample::new(Vec2::new(0.0, 0.0), left, right)
    }

    #[test]
    fn press_edge_fires_once() {
        let mut p = player();

        p.feed(sample(true, false));
        p.begin_click_pass();
        assert!(p.left_cond && p.left_cond_e);
        assert!(!p.right_cond);
        p.end_click_pass();

        // Held next frame: no new edge.
        p.begin_click_pass();
        assert!(!p.left_cond);
        assert!(!p.clicked());
    }

    #[test]
    fn release_produces_no_edge() {
        let mut p = player();
        p.feed(sample(true, false));
        p.begin_click_pass();
        p.end_click_pass();

        p.feed(sample(false, false));
        p.begin_click_pass();
        assert!(!p.clicked());
        assert!(!p.game_down_state);
    }

    #[test]
    fn consume_takes_left_before_right() {
        let mut p = player();
        p.feed(sample(true, true));
        p.begin_click_pass();
        // Simultaneous both-button press counts as one click.
        assert!(p.double_click);
        p.consume_click();
        assert!(!p.clicked());
        assert!(p.already_stolen);
    }

    #[test]
    fn separate_presses_consume_independently() {
        let mut p = player();
        p.feed(sample(true, false));
        p.begin_click_pass();
        p.end_click_pass();

        // Right pressed while left still held: one new edge.
        p.feed(sample(true, true));
        p.begin_click_pass();
        assert!(!p.double_click);
        assert!(p.right_cond_e && !p.left_cond_e);
        p.consume_click();
        assert!(!p.clicked());
    }

    #[test]
    fn press_history_shifts() {
        let mut p = player();
        p.feed(sample(true, false));
        p.begin_click_pass();
        p.end_click_pass();
        assert_eq!(p.mouse_down_button, Buttons::LEFT);

        p.feed(sample(true, true));
        p.begin_click_pass();
        p.end_click_pass();
        assert_eq!(p.mouse_down_button, Buttons::BOTH);
        assert_eq!(p.last_button, Buttons::LEFT);

        p.feed(sample(false, true));
        p.begin_click_pass();
        assert_eq!(p.mouse_down_button, Buttons::RIGHT);
        assert_eq!(p.last_button, Buttons::BOTH);
        assert_eq!(p.last_button2, Buttons::LEFT);
    }

    #[test]
    fn pressed_button_falls_back_to_down_combination() {
        let mut p = player();
        p.feed(sample(true, false));
        p.begin_click_pass();
        assert_eq!(p.pressed_button(), Buttons::LEFT);
        p.end_click_pass();

        // No fresh edge: report the held combination.
        p.begin_click_pass();
        assert_eq!(p.pressed_button(), Buttons::LEFT);
    }

    #[test]
    fn relax_mods_reach_player() {
        let p = PlayerContext::new(Difficulty::with_mods(5.0, 4.0, 5.0, 9.0, Mods::RELAX));
        assert!(p.diff.mods().contains(Mods::RELAX));
    }
}
