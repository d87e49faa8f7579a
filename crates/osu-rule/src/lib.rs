// Judgment engine: per-target judge state machines, frame orchestration,
// score/grade/health/rating aggregation

mod health;
mod hit_result;
mod objects;
mod player;
mod rating;
mod ruleset;
mod score;

pub use health::{HealthProcessor, MAX_HP, REVIVE_HP};
pub use hit_result::{ClickAction, ComboAddition, ComboResult, Grade, HitResult};
pub use player::{Buttons, InputSample, PlayerContext};
pub use rating::{ObjectRating, Performance, RatingTable};
pub use ruleset::{
    CursorSpec, HitEvent, MapStats, OsuRuleset, RankingEntry, RulesetListener,
};
pub use score::{HitCounts, ScoreSet, accuracy_from, decode_ghost, grade_from};

/// Base point value of the best judgment tier; accuracy is normalized
/// against it.
pub const MAX_RESULT_VALUE: i64 = 300;

/// Grace interval (ms) allowed between an earlier target's end and a later
/// target's start before a click on the later one is rejected while the
/// earlier is still outstanding.
pub const NOTELOCK_TOLERANCE: i64 = 3;

/// A held target's final scoring point is pulled this many ms before the
/// nominal end (no earlier than the midpoint).
pub const END_POINT_LENIENCY: i64 = 36;
