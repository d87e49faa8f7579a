use osu_model::Vec2;
use osu_rule::{InputSample, OsuRuleset};

use crate::frame::ReplayFrame;

/// Steps a decoded frame stream and produces per-tick input samples.
///
/// Button levels persist from the most recent frame at or before the
/// queried time; the position is interpolated between the surrounding
/// frames.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    frames: Vec<ReplayFrame>,
    index: usize,
}

impl ReplayCursor {
    pub fn new(mut frames: Vec<ReplayFrame>) -> Self {
        frames.sort_by_key(|f| f.time);
        Self { frames, index: 0 }
    }

    /// Restart from the beginning of the stream.
    pub fn rewind(&mut self) {
        self.index = 0;
    }

    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// Sample the stream at `time`. Times must be queried in ascending
    /// order between rewinds.
    pub fn sample_at(&mut self, time: i64) -> InputSample {
        let Some(first) = self.frames.first() else {
            return InputSample::idle(Vec2::new(0.0, 0.0));
        };
        if time < first.time {
            return InputSample::idle(first.position());
        }

        while self.index + 1 < self.frames.len() && self.frames[self.index + 1].time <= time {
            self.index += 1;
        }

        let current = &self.frames[self.index];
        let mut sample = current.sample();

        if let Some(next) = self.frames.get(self.index + 1) {
            let span = next.time - current.time;
            if span > 0 {
                let t = ((time - current.time) as f32 / span as f32).clamp(0.0, 1.0);
                sample.position =
                    current.position() + (next.position() - current.position()) * t;
            }
        }

        sample
    }
}

/// Drive a ruleset with one replay cursor per attached cursor at a fixed
/// tick, until the run completes. The cursors are rewound first, so the
/// same streams can be scored repeatedly.
pub fn drive(set: &mut OsuRuleset, cursors: &mut [ReplayCursor], tick_ms: i64) {
    assert_eq!(set.cursor_count(), cursors.len());
    let tick = tick_ms.max(1);

    for cursor in cursors.iter_mut() {
        cursor.rewind();
    }

    let last_end = set
        .chart()
        .targets
        .last()
        .map(|t| t.end_time)
        .unwrap_or(0);
    // Generous horizon past the last target; the run normally ends well
    // before it.
    let horizon = last_end + 30_000;

    let mut time = 0;
    while !set.is_ended() && time <= horizon {
        for (i, cursor) in cursors.iter_mut().enumerate() {
            set.feed_input(i, cursor.sample_at(time));
        }
        set.step(time);
        time += tick;
    }
}
