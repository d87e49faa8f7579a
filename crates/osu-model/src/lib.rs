// Chart data model: targets, resolved slider geometry, difficulty constants, modifiers

mod chart;
mod difficulty;
mod mods;
mod target;

pub use chart::{Chart, PauseSection};
pub use difficulty::{Difficulty, HITTABLE_RANGE_MS};
pub use mods::Mods;
pub use target::{PathPoint, ScorePoint, Target, TargetKind};

/// 2D position type used throughout the chart model.
pub type Vec2 = cgmath::Vector2<f32>;
