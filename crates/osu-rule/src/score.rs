use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use osu_model::Mods;
use serde::{Deserialize, Serialize};

use crate::MAX_RESULT_VALUE;
use crate::health::HealthProcessor;
use crate::hit_result::{Grade, HitResult};
use crate::rating::Performance;

/// Per-quality base judgment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCounts {
    pub n300: i64,
    pub n100: i64,
    pub n50: i64,
    pub miss: i64,
}

impl HitCounts {
    pub fn total(&self) -> i64 {
        self.n300 + self.n100 + self.n50 + self.miss
    }
}

/// Accumulated scoring state for one cursor.
///
/// Every field is mutated exclusively through the ruleset's single
/// result-submission entry point, which keeps combo, score and accuracy
/// coupled consistently.
#[derive(Debug, Clone)]
pub struct ScoreSet {
    pub(crate) raw_score: i64,
    pub(crate) accuracy: f64,
    pub(crate) score: i64,
    pub(crate) combo: i64,
    pub(crate) max_combo: i64,
    pub(crate) mod_multiplier: f64,
    pub(crate) num_objects: i64,
    pub(crate) grade: Grade,
    pub(crate) counts: HitCounts,
    pub(crate) current_katu: i64,
    pub(crate) current_bad: i64,
    pub(crate) geki_count: i64,
    pub(crate) katu_count: i64,
    /// Remaining zero-health revives, nonzero only under the leniency
    /// modifier.
    pub(crate) recoveries: i32,
    pub(crate) hp: HealthProcessor,
    pub(crate) performance: Performance,
    ghost: Vec<u8>,
}

impl ScoreSet {
    pub(crate) fn new(mods: Mods, hp: HealthProcessor) -> Self {
        let recoveries = if mods.contains(Mods::EASY) { 2 } else { 0 };
        Self {
            raw_score: 0,
            accuracy: 100.0,
            score: 0,
            combo: 0,
            max_combo: 0,
            mod_multiplier: mods.score_multiplier(),
            num_objects: 0,
            grade: Grade::None,
            counts: HitCounts::default(),
            current_katu: 0,
            current_bad: 0,
            geki_count: 0,
            katu_count: 0,
            recoveries,
            hp,
            performance: Performance::default(),
            ghost: Vec::new(),
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn combo(&self) -> i64 {
        self.combo
    }

    pub fn max_combo(&self) -> i64 {
        self.max_combo
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn counts(&self) -> HitCounts {
        self.counts
    }

    pub fn geki_count(&self) -> i64 {
        self.geki_count
    }

    pub fn katu_count(&self) -> i64 {
        self.katu_count
    }

    pub fn recoveries(&self) -> i32 {
        self.recoveries
    }

    pub fn health(&self) -> &HealthProcessor {
        &self.hp
    }

    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    /// Per-object judgment trace, one byte per counted object:
    /// 0 = best, 1 = mid, 2 = low, 3 = miss.
    pub fn ghost(&self) -> &[u8] {
        &self.ghost
    }

    pub(crate) fn count_base(&mut self, result: HitResult) {
        let byte = match result {
            HitResult::Hit300 => {
                self.counts.n300 += 1;
                0
            }
            HitResult::Hit100 => {
                self.counts.n100 += 1;
                1
            }
            HitResult::Hit50 => {
                self.counts.n50 += 1;
                2
            }
            HitResult::Miss => {
                self.counts.miss += 1;
                3
            }
            _ => return,
        };
        self.num_objects += 1;
        self.raw_score += result.score_value();
        self.ghost.push(byte);
    }

    pub(crate) fn recompute_accuracy(&mut self) {
        self.accuracy = accuracy_from(self.raw_score, self.num_objects);
    }

    pub(crate) fn recompute_grade(&mut self, mods: Mods) {
        self.grade = grade_from(
            &self.counts,
            self.num_objects,
            mods.intersects(Mods::HIDDEN | Mods::FLASHLIGHT),
        );
    }

    /// Gzip + URL-safe-base64 encoding of the ghost trace.
    pub fn encode_ghost(&self) -> String {
        if self.ghost.is_empty() {
            return String::new();
        }
        let mut gzip_buf = Vec::new();
        let mut encoder = GzEncoder::new(&mut gzip_buf, Compression::default());
        encoder.write_all(&self.ghost).unwrap();
        encoder.finish().unwrap();
        URL_SAFE.encode(&gzip_buf)
    }
}

/// Decode a ghost trace produced by [`ScoreSet::encode_ghost`].
pub fn decode_ghost(encoded: &str) -> Option<Vec<u8>> {
    if encoded.is_empty() {
        return Some(Vec::new());
    }
    let gzip_data = URL_SAFE.decode(encoded).ok()?;
    let mut decoder = GzDecoder::new(&gzip_data[..]);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).ok()?;
    Some(raw)
}

/// Accuracy percentage over the raw-score baseline. 100 by definition with
/// zero counted objects.
pub fn accuracy_from(raw_score: i64, num_objects: i64) -> f64 {
    if num_objects == 0 {
        100.0
    } else {
        100.0 * raw_score as f64 / (num_objects * MAX_RESULT_VALUE) as f64
    }
}

/// Grade from the per-quality counters. `reduced_visibility` tightens the
/// top two grades to their H variants.
pub fn grade_from(counts: &HitCounts, num_objects: i64, reduced_visibility: bool) -> Grade {
    let objects = num_objects as f64;
    let ratio = counts.n300 as f64 / objects;

    if counts.n300 == num_objects {
        if reduced_visibility { Grade::SSH } else { Grade::SS }
    } else if ratio > 0.9 && (counts.n50 as f64) / objects < 0.01 && counts.miss == 0 {
        if reduced_visibility { Grade::SH } else { Grade::S }
    } else if ratio > 0.8 && counts.miss == 0 || ratio > 0.9 {
        Grade::A
    } else if ratio > 0.7 && counts.miss == 0 || ratio > 0.8 {
        Grade::B
    } else if ratio > 0.6 {
        Grade::C
    } else {
        Grade::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_result::ComboResult;
    use proptest::prelude::*;

    fn counts(n300: i64, n100: i64, n50: i64, miss: i64) -> HitCounts {
        HitCounts {
            n300,
            n100,
            n50,
            miss,
        }
    }

    #[test]
    fn accuracy_empty_is_hundred() {
        assert_eq!(accuracy_from(0, 0), 100.0);
    }

    #[test]
    fn accuracy_all_best() {
        assert_eq!(accuracy_from(10 * 300, 10), 100.0);
    }

    #[test]
    fn accuracy_mixed() {
        // 1x300 + 1x100 over 2 objects
        let acc = accuracy_from(400, 2);
        assert!((acc - 66.666).abs() < 0.01);
    }

    #[test]
    fn grade_all_best_is_ss() {
        assert_eq!(grade_from(&counts(10, 0, 0, 0), 10, false), Grade::SS);
        assert_eq!(grade_from(&counts(10, 0, 0, 0), 10, true), Grade::SSH);
    }

    #[test]
    fn grade_s_requires_no_miss_and_few_lows() {
        // 95 / 100 best, no 50s, no miss
        assert_eq!(grade_from(&counts(95, 5, 0, 0), 100, false), Grade::S);
        assert_eq!(grade_from(&counts(95, 5, 0, 0), 100, true), Grade::SH);
        // Same ratio but a miss drops to A
        assert_eq!(grade_from(&counts(95, 4, 0, 1), 100, false), Grade::A);
        // 2% 50s breaks the S condition
        assert_eq!(grade_from(&counts(95, 3, 2, 0), 100, false), Grade::A);
    }

    #[test]
    fn grade_a_b_c_d_thresholds() {
        // ratio 0.85, no miss -> A
        assert_eq!(grade_from(&counts(85, 15, 0, 0), 100, false), Grade::A);
        // ratio 0.92 with misses -> still A through the 0.9 alternative
        assert_eq!(grade_from(&counts(92, 0, 0, 8), 100, false), Grade::A);
        // ratio 0.75, no miss -> B
        assert_eq!(grade_from(&counts(75, 25, 0, 0), 100, false), Grade::B);
        // ratio 0.85 with misses -> B through the 0.8 alternative
        assert_eq!(grade_from(&counts(85, 5, 0, 10), 100, false), Grade::B);
        // ratio 0.65 -> C regardless of misses
        assert_eq!(grade_from(&counts(65, 15, 10, 10), 100, false), Grade::C);
        // ratio 0.5 -> D
        assert_eq!(grade_from(&counts(50, 25, 15, 10), 100, false), Grade::D);
    }

    #[test]
    fn ghost_round_trip() {
        let mut set = ScoreSet::new(Mods::NONE, HealthProcessor::disabled());
        set.count_base(HitResult::Hit300);
        set.count_base(HitResult::Hit100);
        set.count_base(HitResult::Miss);
        set.count_base(HitResult::Hit50);

        assert_eq!(set.ghost(), &[0, 1, 3, 2]);
        let encoded = set.encode_ghost();
        assert_eq!(decode_ghost(&encoded).unwrap(), vec![0, 1, 3, 2]);
    }

    #[test]
    fn ghost_empty_encodes_empty() {
        let set = ScoreSet::new(Mods::NONE, HealthProcessor::disabled());
        assert_eq!(set.encode_ghost(), "");
        assert_eq!(decode_ghost("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn structural_results_do_not_count() {
        let mut set = ScoreSet::new(Mods::NONE, HealthProcessor::disabled());
        set.count_base(HitResult::SliderPoint);
        set.count_base(HitResult::SliderMiss);
        assert_eq!(set.num_objects, 0);
        assert_eq!(set.counts.total(), 0);
        assert!(set.ghost().is_empty());
    }

    #[test]
    fn easy_grants_recoveries() {
        let set = ScoreSet::new(Mods::EASY, HealthProcessor::disabled());
        assert_eq!(set.recoveries(), 2);
        let set = ScoreSet::new(Mods::NONE, HealthProcessor::disabled());
        assert_eq!(set.recoveries(), 0);
    }

    proptest! {
        #[test]
        fn accuracy_always_in_range(
            n300 in 0i64..5000,
            n100 in 0i64..5000,
            n50 in 0i64..5000,
            miss in 0i64..5000,
        ) {
            let raw = n300 * 300 + n100 * 100 + n50 * 50;
            let num = n300 + n100 + n50 + miss;
            let acc = accuracy_from(raw, num);
            prop_assert!((0.0..=100.0).contains(&acc));
        }

        #[test]
        fn combo_fold_matches_effect_sequence(effects in prop::collection::vec(0u8..3, 0..200)) {
            let effects: Vec<ComboResult> = effects
                .into_iter()
                .map(|e| match e {
                    0 => ComboResult::Reset,
                    1 => ComboResult::Hold,
                    _ => ComboResult::Increase,
                })
                .collect();

            let mut combo = 0i64;
            for effect in &effects {
                let next = effect.apply(combo);
                // Combo moves by +1, resets to 0, or holds -- never anything else.
                prop_assert!(next == combo + 1 || next == 0 || next == combo);
                combo = next;
            }
        }
    }
}
