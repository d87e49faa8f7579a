//! Perfect-play frame generation. Produces a decoded frame stream that
//! presses every target dead on time; used as a reference input for
//! end-to-end scoring tests.

use osu_model::{Chart, TargetKind};
use osu_rule::Buttons;

use crate::frame::ReplayFrame;

/// How long a tap press is held when the gap to the next target allows it.
const TAP_HOLD_MS: i64 = 60;

/// Sampling interval for path-following frames during holds.
const FOLLOW_STEP_MS: i64 = 16;

/// Generate a perfect frame stream for a chart. Assumes targets do not
/// overlap in time beyond the usual tap spacing; simultaneous holds are not
/// representable in one stream of absolute button levels.
pub fn generate(chart: &Chart) -> Vec<ReplayFrame> {
    let radius = chart.difficulty.circle_radius();
    let mut frames: Vec<ReplayFrame> = Vec::new();
    let mut use_left = true;
    // Time up to which the previous target still owns the button levels.
    let mut busy_until = i64::MIN;

    if let Some(first) = chart.targets.first() {
        frames.push(ReplayFrame::new(
            0,
            first.stacked_start_position(radius),
            Buttons::NONE,
        ));
    }

    for (i, target) in chart.targets.iter().enumerate() {
        let button = if use_left { Buttons::LEFT } else { Buttons::RIGHT };
        use_left = !use_left;

        let start_pos = target.stacked_start_position(radius);
        let next_start = chart
            .targets
            .get(i + 1)
            .map(|t| t.start_time)
            .unwrap_or(i64::MAX);

        // Move onto the target slightly before pressing, unless the
        // previous target's hold still runs.
        let approach = target.start_time - 40;
        if approach > busy_until {
            frames.push(ReplayFrame::new(approach, start_pos, Buttons::NONE));
        }

        match &target.kind {
            TargetKind::Circle => {
                frames.push(ReplayFrame::new(target.start_time, start_pos, button));
                let release = (target.start_time + TAP_HOLD_MS)
                    .min(next_start.saturating_sub(10))
                    .max(target.start_time + 10);
                frames.push(ReplayFrame::new(release, start_pos, Buttons::NONE));
                busy_until = release;
            }
            TargetKind::Slider { .. } => {
                frames.push(ReplayFrame::new(target.start_time, start_pos, button));
                let mut t = target.start_time + FOLLOW_STEP_MS;
                while t < target.end_time {
                    frames.push(ReplayFrame::new(t, target.position_at(t, radius), button));
                    t += FOLLOW_STEP_MS;
                }
                frames.push(ReplayFrame::new(
                    target.end_time,
                    target.position_at(target.end_time, radius),
                    button,
                ));
                let release = target.end_time + 10;
                frames.push(ReplayFrame::new(release, target.end_position, Buttons::NONE));
                busy_until = release;
            }
            TargetKind::Spinner => {
                frames.push(ReplayFrame::new(target.start_time, start_pos, button));
                let mut t = target.start_time + FOLLOW_STEP_MS;
                while t < target.end_time {
                    frames.push(ReplayFrame::new(t, start_pos, button));
                    t += FOLLOW_STEP_MS;
                }
                let release = target.end_time + 10;
                frames.push(ReplayFrame::new(release, start_pos, Buttons::NONE));
                busy_until = release;
            }
        }
    }

    frames.sort_by_key(|f| f.time);
    frames
}
