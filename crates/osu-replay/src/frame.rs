use osu_model::Vec2;
use osu_rule::{Buttons, InputSample};
use serde::{Deserialize, Serialize};

/// One decoded input frame: time, raw cursor position and raw button
/// levels. Levels persist until the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub time: i64,
    pub x: f32,
    pub y: f32,
    pub buttons: Buttons,
}

impl ReplayFrame {
    pub fn new(time: i64, position: Vec2, buttons: Buttons) -> Self {
        Self {
            time,
            x: position.x,
            y: position.y,
            buttons,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn sample(&self) -> InputSample {
        InputSample::new(
            self.position(),
            self.buttons.intersects(Buttons::LEFT),
            self.buttons.intersects(Buttons::RIGHT),
        )
    }

    /// Coordinates are finite and the time is non-negative.
    pub fn validate(&self) -> bool {
        self.time >= 0 && self.x.is_finite() && self.y.is_finite()
    }
}
