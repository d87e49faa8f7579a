use std::collections::BTreeMap;

use osu_model::Mods;
use serde::{Deserialize, Serialize};

use crate::score::HitCounts;

/// Precomputed difficulty components for one chart object, produced by an
/// external difficulty analysis and consumed read-only here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRating {
    pub aim: f64,
    pub speed: f64,
}

/// Per-object rating components keyed by the difficulty-adjusting modifier
/// subset. Built once at construction, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    tables: BTreeMap<u32, Vec<ObjectRating>>,
}

impl RatingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mods: Mods, ratings: Vec<ObjectRating>) {
        self.tables.insert(mods.difficulty_adjust().0, ratings);
    }

    pub fn for_mods(&self, mods: Mods) -> Option<&[ObjectRating]> {
        self.tables
            .get(&mods.difficulty_adjust().0)
            .map(Vec::as_slice)
    }

    pub fn rating_at(&self, mods: Mods, index: usize) -> ObjectRating {
        self.for_mods(mods)
            .and_then(|t| t.get(index))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Running composite performance rating for one cursor.
///
/// This is a compact stand-in with the conventional shape (skill curves,
/// length bonus, combo scaling, miss penalty, power-mean combination); the
/// real difficulty analysis stays external and only feeds the per-object
/// components in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub aim: f64,
    pub speed: f64,
    pub acc: f64,
    pub total: f64,
}

impl Performance {
    /// Recompute from the current counters and the rating components of the
    /// most recently counted object.
    pub fn update(
        &mut self,
        rating: ObjectRating,
        map_max_combo: i64,
        counts: &HitCounts,
        max_combo: i64,
        mods: Mods,
    ) {
        let total_hits = counts.total();
        if total_hits == 0 {
            *self = Performance::default();
            return;
        }

        let acc = (counts.n300 * 300 + counts.n100 * 100 + counts.n50 * 50) as f64
            / (total_hits * 300) as f64;

        let length_bonus = 0.95 + 0.4 * (total_hits as f64 / 2000.0).min(1.0);
        let combo_scale = if map_max_combo > 0 {
            ((max_combo as f64).powf(0.8) / (map_max_combo as f64).powf(0.8)).min(1.0)
        } else {
            1.0
        };
        let miss_penalty = 0.97f64.powi(counts.miss as i32);

        self.aim = skill_value(rating.aim) * length_bonus * combo_scale * miss_penalty
            * (0.5 + acc / 2.0);
        self.speed =
            skill_value(rating.speed) * length_bonus * combo_scale * miss_penalty * acc;
        self.acc = (acc * 100.0 - 60.0).max(0.0).powf(1.3) * 0.2;

        let mut multiplier = 1.12;
        if mods.contains(Mods::HIDDEN) {
            multiplier *= 1.08;
        }
        if mods.contains(Mods::FLASHLIGHT) {
            multiplier *= 1.15;
        }
        if mods.contains(Mods::NO_FAIL) {
            multiplier *= 0.9;
        }

        self.total = (self.aim.powf(1.1) + self.speed.powf(1.1) + self.acc.powf(1.1))
            .powf(1.0 / 1.1)
            * multiplier;
    }
}

fn skill_value(stars: f64) -> f64 {
    (5.0 * (stars / 0.0675).max(1.0) - 4.0).powi(3) / 100_000.0
}
