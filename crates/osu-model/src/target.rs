use serde::{Deserialize, Serialize};

use crate::Vec2;

/// One interior scoring point of a held target, already placed in time by the
/// geometry resolver. `is_reverse` marks repeat-edge points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub time: i64,
    pub is_reverse: bool,
}

/// One keyframe of a resolved held-target path. The engine never computes
/// geometry itself; it interpolates between these samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub time: i64,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TargetKind {
    /// Instantaneous tap target.
    Circle,
    /// Held multi-segment target with interior scoring points.
    Slider {
        score_points: Vec<ScorePoint>,
        /// Number of traversals of the body (1 = no repeats).
        span_count: usize,
        path: Vec<PathPoint>,
    },
    /// Held-duration-only target.
    Spinner,
}

/// One timed hittable element of the chart. Immutable to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Sequence number within the chart, 0-based.
    pub id: usize,
    /// Nominal start time in ms.
    pub start_time: i64,
    /// Nominal end time in ms. Equals `start_time` for tap targets.
    pub end_time: i64,
    pub start_position: Vec2,
    pub end_position: Vec2,
    /// This target opens a new combo segment.
    pub new_combo: bool,
    /// Stacking depth resolved by the chart source; 0 = not stacked.
    pub stack_index: i32,
    pub kind: TargetKind,
}

impl Target {
    pub fn circle(id: usize, time: i64, position: Vec2) -> Self {
        Self {
            id,
            start_time: time,
            end_time: time,
            start_position: position,
            end_position: position,
            new_combo: false,
            stack_index: 0,
            kind: TargetKind::Circle,
        }
    }

    pub fn slider(
        id: usize,
        start_time: i64,
        end_time: i64,
        path: Vec<PathPoint>,
        score_points: Vec<ScorePoint>,
        span_count: usize,
    ) -> Self {
        let start_position = path.first().map(|p| p.position).unwrap_or(Vec2::new(0.0, 0.0));
        let end_position = path.last().map(|p| p.position).unwrap_or(start_position);
        Self {
            id,
            start_time,
            end_time,
            start_position,
            end_position,
            new_combo: false,
            stack_index: 0,
            kind: TargetKind::Slider {
                score_points,
                span_count,
                path,
            },
        }
    }

    pub fn spinner(id: usize, start_time: i64, end_time: i64, position: Vec2) -> Self {
        Self {
            id,
            start_time,
            end_time,
            start_position: position,
            end_position: position,
            new_combo: false,
            stack_index: 0,
            kind: TargetKind::Spinner,
        }
    }

    pub fn with_new_combo(mut self) -> Self {
        self.new_combo = true;
        self
    }

    pub fn with_stack_index(mut self, stack_index: i32) -> Self {
        self.stack_index = stack_index;
        self
    }

    pub fn is_circle(&self) -> bool {
        matches!(self.kind, TargetKind::Circle)
    }

    pub fn is_slider(&self) -> bool {
        matches!(self.kind, TargetKind::Slider { .. })
    }

    pub fn is_spinner(&self) -> bool {
        matches!(self.kind, TargetKind::Spinner)
    }

    pub fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }

    /// Stacking displacement for a given hit radius. Stacked targets shift
    /// diagonally by a tenth of the radius per stack level.
    pub fn stack_offset(&self, radius: f32) -> Vec2 {
        let shift = -(self.stack_index as f32) * radius * 0.1;
        Vec2::new(shift, shift)
    }

    /// Start position with the stacking displacement applied.
    pub fn stacked_start_position(&self, radius: f32) -> Vec2 {
        self.start_position + self.stack_offset(radius)
    }

    /// Body position at a point in time, interpolated between resolved path
    /// keyframes. Clamps to the ends outside the path's time span. For
    /// non-held targets this is the (stacked) start position.
    pub fn position_at(&self, time: i64, radius: f32) -> Vec2 {
        let TargetKind::Slider { path, .. } = &self.kind else {
            return self.stacked_start_position(radius);
        };

        let offset = self.stack_offset(radius);

        let Some(first) = path.first() else {
            return self.stacked_start_position(radius);
        };
        if time <= first.time {
            return first.position + offset;
        }
        let last = path.last().unwrap();
        if time >= last.time {
            return last.position + offset;
        }

        let upper = path.partition_point(|p| p.time <= time);
        let a = &path[upper - 1];
        let b = &path[upper];
        if b.time == a.time {
            return b.position + offset;
        }
        let t = (time - a.time) as f32 / (b.time - a.time) as f32;
        a.position + (b.position - a.position) * t + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_slider() -> Target {
        Target::slider(
            0,
            1000,
            2000,
            vec![
                PathPoint {
                    time: 1000,
                    position: Vec2::new(0.0, 0.0),
                },
                PathPoint {
                    time: 2000,
                    position: Vec2::new(100.0, 0.0),
                },
            ],
            vec![
                ScorePoint {
                    time: 1500,
                    is_reverse: false,
                },
                ScorePoint {
                    time: 2000,
                    is_reverse: false,
                },
            ],
            1,
        )
    }

    #[test]
    fn circle_has_zero_duration() {
        let c = Target::circle(0, 500, Vec2::new(10.0, 20.0));
        assert_eq!(c.duration(), 0);
        assert!(c.is_circle());
    }

    #[test]
    fn slider_position_interpolates() {
        let s = line_slider();
        let mid = s.position_at(1500, 30.0);
        assert!((mid.x - 50.0).abs() < 1e-4);
        assert!((mid.y - 0.0).abs() < 1e-4);
    }

    #[test]
    fn slider_position_clamps() {
        let s = line_slider();
        assert_eq!(s.position_at(0, 30.0), Vec2::new(0.0, 0.0));
        assert_eq!(s.position_at(99999, 30.0), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn stack_offset_scales_with_index() {
        let c = Target::circle(0, 0, Vec2::new(0.0, 0.0)).with_stack_index(2);
        let off = c.stack_offset(30.0);
        assert!((off.x - -6.0).abs() < 1e-4);
        assert!((off.y - -6.0).abs() < 1e-4);
        let stacked = c.stacked_start_position(30.0);
        assert!((stacked.x - -6.0).abs() < 1e-4);
    }

    #[test]
    fn unstacked_target_has_no_offset() {
        let c = Target::circle(0, 0, Vec2::new(5.0, 5.0));
        assert_eq!(c.stacked_start_position(30.0), Vec2::new(5.0, 5.0));
    }
}
