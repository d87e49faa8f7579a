use std::collections::VecDeque;

use osu_model::{Chart, HITTABLE_RANGE_MS, Mods, Vec2};

use crate::NOTELOCK_TOLERANCE;
use crate::health::HealthProcessor;
use crate::hit_result::{ClickAction, ComboAddition, ComboResult, Grade, HitResult};
use crate::objects::TargetJudge;
use crate::player::{InputSample, PlayerContext};
use crate::rating::RatingTable;
use crate::score::ScoreSet;

/// Cumulative per-object counters, indexed by object sequence number.
/// `max_combo` is the theoretical maximum combo achievable up to and
/// including that object. Built once at construction, read-only after.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapStats {
    pub ncircles: i64,
    pub nsliders: i64,
    pub nobjects: i64,
    pub max_combo: i64,
}

/// One row of the frozen end-of-run ranking, ordered by score.
#[derive(Debug, Clone)]
pub struct RankingEntry {
    pub cursor: usize,
    pub name: String,
    pub score: i64,
    pub accuracy: f64,
    pub grade: Grade,
    pub max_combo: i64,
    pub mods: Mods,
    pub rating: f64,
}

/// One submitted judgment, as delivered to the listener.
#[derive(Debug, Clone)]
pub struct HitEvent {
    pub cursor: usize,
    pub time: i64,
    pub number: usize,
    pub position: Vec2,
    pub result: HitResult,
    pub addition: Option<ComboAddition>,
    pub combo_result: ComboResult,
    pub rating: f64,
    pub score: i64,
}

/// External observer of the run. All methods default to no-ops.
pub trait RulesetListener {
    fn on_judgment(&mut self, _event: &HitEvent) {}

    /// A click was rejected as mistimed or misplaced.
    fn on_shake(&mut self, _cursor: usize, _time: i64, _number: usize) {}

    /// A target finished for every cursor and left the active set.
    fn on_object_end(&mut self, _time: i64, _number: usize) {}

    /// Backlog and active set both emptied; fires exactly once.
    fn on_complete(&mut self, _time: i64, _ranking: &[RankingEntry]) {}
}

/// One cursor attached to the simulation.
#[derive(Debug, Clone)]
pub struct CursorSpec {
    pub name: String,
    pub mods: Mods,
}

impl CursorSpec {
    pub fn new(name: impl Into<String>, mods: Mods) -> Self {
        Self {
            name: name.into(),
            mods,
        }
    }
}

/// Per-target terminal flags, one slot per cursor. Judges read and set
/// these through the ruleset so eligibility scans never alias judge state.
#[derive(Debug, Clone)]
pub struct ObjectFlags {
    hit: Vec<bool>,
    start_hit: Vec<bool>,
}

impl ObjectFlags {
    fn new(cursors: usize) -> Self {
        Self {
            hit: vec![false; cursors],
            start_hit: vec![false; cursors],
        }
    }

    pub fn all_hit(&self) -> bool {
        self.hit.iter().all(|&h| h)
    }

    pub fn all_start_hit(&self) -> bool {
        self.start_hit.iter().all(|&h| h)
    }
}

/// The judgment queue orchestrator.
///
/// Owns the time-ordered backlog and the active set, one player context
/// and one score subset per cursor, and the construction-time cumulative
/// tables. Driven once per simulated time step in a fixed pass order:
/// click pass per cursor, position pass per cursor, finalization pass per
/// cursor, then [`OsuRuleset::update`].
pub struct OsuRuleset {
    pub(crate) chart: Chart,
    pub(crate) players: Vec<PlayerContext>,
    cursor_names: Vec<String>,
    subsets: Vec<ScoreSet>,
    flags: Vec<ObjectFlags>,
    judges: Vec<TargetJudge>,
    backlog: VecDeque<usize>,
    active: Vec<usize>,
    map_stats: Vec<MapStats>,
    ratings: RatingTable,
    score_multiplier: f64,
    ended: bool,
    final_ranking: Vec<RankingEntry>,
    listener: Option<Box<dyn RulesetListener>>,
}

impl OsuRuleset {
    pub fn new(chart: Chart, cursors: &[CursorSpec], ratings: RatingTable) -> Self {
        log::info!("creating ruleset: {} cursors", cursors.len());

        let map_stats = build_map_stats(&chart);
        let score_multiplier = score_multiplier(&chart);

        let mut players = Vec::with_capacity(cursors.len());
        let mut subsets = Vec::with_capacity(cursors.len());
        let mut cursor_names = Vec::with_capacity(cursors.len());

        for spec in cursors {
            let diff = osu_model::Difficulty::with_mods(
                chart.difficulty.hp(),
                chart.difficulty.cs(),
                chart.difficulty.od(),
                chart.difficulty.ar(),
                spec.mods,
            );

            log::info!("calibrating health drain for \"{}\"", spec.name);
            let mut hp = HealthProcessor::new(&chart, &diff);
            hp.calculate_rate(&chart);
            hp.reset();

            players.push(PlayerContext::new(diff));
            subsets.push(ScoreSet::new(spec.mods, hp));
            cursor_names.push(spec.name.clone());
        }

        let mut order: Vec<usize> = (0..chart.targets.len()).collect();
        let judges: Vec<TargetJudge> = chart
            .targets
            .iter()
            .map(|t| TargetJudge::new(t, &players))
            .collect();
        order.sort_by_key(|&n| judges[n].fade_time());

        let flags = vec![ObjectFlags::new(cursors.len()); chart.targets.len()];

        Self {
            players,
            cursor_names,
            subsets,
            flags,
            backlog: order.into(),
            active: Vec::new(),
            judges,
            map_stats,
            ratings,
            score_multiplier,
            ended: false,
            final_ranking: Vec::new(),
            chart,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn RulesetListener>) {
        self.listener = Some(listener);
    }

    /// Feed the latest raw input sample for a cursor. Must happen before
    /// this frame's click pass.
    pub fn feed_input(&mut self, cursor: usize, sample: InputSample) {
        self.players[cursor].feed(sample);
    }

    /// Orchestrator step: retire finished targets, promote newly due ones,
    /// advance every cursor's health, and freeze the final ranking once
    /// everything is judged.
    pub fn update(&mut self, time: i64) {
        let mut i = 0;
        while i < self.active.len() {
            let number = self.active[i];
            let done = self.judges[number].is_done(&self.flags[number]);
            if done {
                self.active.remove(i);
                self.with_listener(|l| l.on_object_end(time, number));
            } else {
                i += 1;
            }
        }

        while let Some(&front) = self.backlog.front() {
            if self.judges[front].fade_time() > time {
                break;
            }
            self.active.push(front);
            self.backlog.pop_front();
        }

        for subset in &mut self.subsets {
            subset.hp.update(time);
        }

        if self.backlog.is_empty() && self.active.is_empty() && !self.ended {
            self.freeze_ranking(time);
        }
    }

    /// Input/click pass for one cursor: recompute press edges, offer the
    /// press to every active target in order, then commit the new edge
    /// baseline.
    pub fn update_click_for(&mut self, cursor: usize, time: i64) {
        self.players[cursor].begin_click_pass();

        let order: Vec<usize> = self.active.clone();
        let mut judges = std::mem::take(&mut self.judges);
        for number in order {
            judges[number].update_click_for(self, cursor, time);
        }
        self.judges = judges;

        self.players[cursor].end_click_pass();
    }

    /// Continuous/position pass for one cursor. A held target later in the
    /// active order is skipped while an earlier one is still unresolved, so
    /// one cursor cannot progress two overlapping holds at once.
    pub fn update_normal_for(&mut self, cursor: usize, time: i64) {
        let order: Vec<(usize, bool)> = self
            .active
            .iter()
            .map(|&n| (n, self.judges[n].is_slider()))
            .collect();

        let mut judges = std::mem::take(&mut self.judges);
        let mut was_slider_already = false;
        for (number, is_slider) in order {
            if is_slider {
                if was_slider_already {
                    continue;
                }
                if !self.flags[number].hit[cursor] {
                    was_slider_already = true;
                }
            }
            judges[number].update_for(self, cursor, time);
        }
        self.judges = judges;
    }

    /// Finalization pass for one cursor.
    pub fn update_post_for(&mut self, cursor: usize, time: i64) {
        let order: Vec<usize> = self.active.clone();
        let mut judges = std::mem::take(&mut self.judges);
        for number in order {
            judges[number].update_post_for(self, cursor, time);
        }
        self.judges = judges;
    }

    /// Run one full frame in the contractual pass order.
    pub fn step(&mut self, time: i64) {
        for cursor in 0..self.players.len() {
            self.update_click_for(cursor, time);
        }
        for cursor in 0..self.players.len() {
            self.update_normal_for(cursor, time);
        }
        for cursor in 0..self.players.len() {
            self.update_post_for(cursor, time);
        }
        self.update(time);
    }

    /// Central click tie-break.
    ///
    /// In order: stacked unresolved predecessor suppresses the click
    /// entirely; an earlier outstanding target whose end precedes this
    /// start by more than the grace interval rejects it as a shake; a click
    /// outside the hittable range (reduced under the relaxed-input
    /// modifier) is a shake; otherwise accept.
    pub(crate) fn click_eligibility(
        &self,
        time: i64,
        number: usize,
        cursor: usize,
    ) -> ClickAction {
        if self.chart.targets[number].is_circle()
            && let Some(index) = self.active.iter().position(|&n| n == number)
            && index > 0
        {
            let prev = self.active[index - 1];
            if self.chart.targets[prev].stack_index > 0 && !self.flags[prev].hit[cursor] {
                // Don't shake the stacks.
                return ClickAction::Ignored;
            }
        }

        for &n in &self.active {
            if !self.flags[n].hit[cursor] {
                if n != number {
                    if self.chart.targets[n].end_time + NOTELOCK_TOLERANCE
                        < self.chart.targets[number].start_time
                    {
                        return ClickAction::Shake;
                    }
                } else {
                    break;
                }
            }
        }

        let mut hit_range = HITTABLE_RANGE_MS;
        if self.players[cursor].diff.mods().contains(Mods::AUTOPILOT) {
            hit_range -= 200;
        }

        if (time - self.chart.targets[number].start_time).abs() >= hit_range {
            return ClickAction::Shake;
        }

        ClickAction::Click
    }

    /// The single score-state mutation point. Effects are strictly ordered:
    /// score delta, base counters, combo effect, accuracy, grade, rating,
    /// combo-segment bonus, health (with finite revive), listener.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn submit_result(
        &mut self,
        cursor: usize,
        time: i64,
        number: usize,
        position: Vec2,
        result: HitResult,
        raw: bool,
        combo_result: ComboResult,
    ) {
        if result == HitResult::Ignore {
            return;
        }

        let mods = self.players[cursor].diff.mods();

        let subset = &mut self.subsets[cursor];
        let combo = (subset.combo - 1).max(0);

        if result != HitResult::SliderMiss {
            let increase = result.score_value();
            if raw {
                subset.score += increase;
            } else {
                subset.score += increase
                    + (increase as f64
                        * combo as f64
                        * self.score_multiplier
                        * subset.mod_multiplier
                        / 25.0) as i64;
            }
        }

        if result.is_base() {
            subset.count_base(result);
        }

        if combo_result == ComboResult::Reset || result == HitResult::Miss {
            subset.combo = 0;
        } else if combo_result == ComboResult::Increase {
            subset.combo += 1;
        }
        subset.max_combo = subset.max_combo.max(subset.combo);

        subset.recompute_accuracy();
        subset.recompute_grade(mods);

        let index = (subset.num_objects - 1).max(0) as usize;
        if let Some(stats) = self.map_stats.get(index) {
            let rating = self.ratings.rating_at(mods, index);
            let counts = subset.counts;
            let max_combo = subset.max_combo;
            subset
                .performance
                .update(rating, stats.max_combo, &counts, max_combo, mods);
        }

        match result {
            HitResult::Hit100 => subset.current_katu += 1,
            HitResult::Hit50 | HitResult::Miss => subset.current_bad += 1,
            _ => {}
        }

        let mut addition = None;
        let closes_segment = result.is_base()
            && (number + 1 == self.chart.targets.len()
                || self
                    .chart
                    .targets
                    .get(number + 1)
                    .is_some_and(|t| t.new_combo));

        if closes_segment {
            // No segment bonus unless every target in the combo segment was
            // eventually resolved as hit.
            let mut all_clicked = true;
            for i in (0..number).rev() {
                if !self.flags[i].hit[cursor] {
                    all_clicked = false;
                    break;
                }
                if self.chart.targets[i].new_combo {
                    break;
                }
            }

            let subset = &mut self.subsets[cursor];
            if subset.current_katu == 0 && subset.current_bad == 0 && all_clicked {
                addition = Some(ComboAddition::Geki);
                subset.geki_count += 1;
            } else if subset.current_bad == 0 && all_clicked {
                addition = Some(ComboAddition::Katu);
                subset.katu_count += 1;
            } else {
                addition = Some(ComboAddition::Mu);
            }

            subset.current_bad = 0;
            subset.current_katu = 0;
        }

        let subset = &mut self.subsets[cursor];
        subset.hp.add_result(result);
        if subset.hp.is_failed() && subset.recoveries > 0 {
            subset.hp.revive();
            subset.recoveries -= 1;
        }

        let event = HitEvent {
            cursor,
            time,
            number,
            position,
            result,
            addition,
            combo_result,
            rating: subset.performance.total,
            score: subset.score,
        };

        if self.players.len() == 1 {
            let subset = &self.subsets[cursor];
            log::debug!(
                "got: {:3}, combo: {:4}, max combo: {:4}, score: {:9}, acc: {:6.2}%, from: {}, at: {}, rating: {:.2}",
                result.score_value(),
                subset.combo,
                subset.max_combo,
                subset.score,
                subset.accuracy,
                number,
                time,
                subset.performance.total,
            );
        }

        self.with_listener(|l| l.on_judgment(&event));
    }

    pub(crate) fn notify_shake(&mut self, cursor: usize, time: i64, number: usize) {
        self.with_listener(|l| l.on_shake(cursor, time, number));
    }

    pub(crate) fn is_hit(&self, number: usize, cursor: usize) -> bool {
        self.flags[number].hit[cursor]
    }

    pub(crate) fn is_start_hit(&self, number: usize, cursor: usize) -> bool {
        self.flags[number].start_hit[cursor]
    }

    pub(crate) fn mark_hit(&mut self, number: usize, cursor: usize) {
        self.flags[number].hit[cursor] = true;
    }

    pub(crate) fn mark_start_hit(&mut self, number: usize, cursor: usize) {
        self.flags[number].start_hit[cursor] = true;
    }

    fn with_listener(&mut self, f: impl FnOnce(&mut dyn RulesetListener)) {
        if let Some(mut listener) = self.listener.take() {
            f(listener.as_mut());
            self.listener = Some(listener);
        }
    }

    fn freeze_ranking(&mut self, time: i64) {
        let mut ranking: Vec<RankingEntry> = (0..self.subsets.len())
            .map(|cursor| {
                let subset = &self.subsets[cursor];
                RankingEntry {
                    cursor,
                    name: self.cursor_names[cursor].clone(),
                    score: subset.score(),
                    accuracy: subset.accuracy(),
                    grade: subset.grade(),
                    max_combo: subset.max_combo(),
                    mods: self.players[cursor].diff.mods(),
                    rating: subset.performance().total,
                }
            })
            .collect();
        ranking.sort_by(|a, b| b.score.cmp(&a.score));

        for (place, entry) in ranking.iter().enumerate() {
            log::info!(
                "#{} {} score: {} acc: {:.2}% grade: {} combo: {} mods: {} rating: {:.2}",
                place + 1,
                entry.name,
                entry.score,
                entry.accuracy,
                entry.grade,
                entry.max_combo,
                entry.mods,
                entry.rating,
            );
        }

        self.final_ranking = ranking;
        self.ended = true;
        let ranking = std::mem::take(&mut self.final_ranking);
        self.with_listener(|l| l.on_complete(time, &ranking));
        self.final_ranking = ranking;
    }

    // --- Read-only accessors ---

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn cursor_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, cursor: usize) -> &PlayerContext {
        &self.players[cursor]
    }

    pub fn score_set(&self, cursor: usize) -> &ScoreSet {
        &self.subsets[cursor]
    }

    /// Health as a fraction of the maximum, in [0, 1].
    pub fn health_fraction(&self, cursor: usize) -> f64 {
        self.subsets[cursor].hp.fraction()
    }

    pub fn rating(&self, cursor: usize) -> f64 {
        self.subsets[cursor].performance().total
    }

    /// Whether this (target, cursor) pair has been terminally judged. Used
    /// for input-stealing prevention across targets.
    pub fn is_target_hit(&self, number: usize, cursor: usize) -> bool {
        self.flags[number].hit[cursor]
    }

    /// Max combo equals the theoretical maximum over everything counted so
    /// far.
    pub fn is_perfect_combo(&self, cursor: usize) -> bool {
        let subset = &self.subsets[cursor];
        let index = (subset.num_objects - 1).max(0) as usize;
        self.map_stats
            .get(index)
            .is_some_and(|stats| subset.max_combo() == stats.max_combo)
    }

    pub fn score_multiplier(&self) -> f64 {
        self.score_multiplier
    }

    pub fn map_stats(&self) -> &[MapStats] {
        &self.map_stats
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Frozen end-of-run ranking, ordered by score. Empty until the run
    /// completes.
    pub fn final_ranking(&self) -> &[RankingEntry] {
        &self.final_ranking
    }

    /// Targets not yet retired (backlog plus active set).
    pub fn remaining_targets(&self) -> usize {
        self.backlog.len() + self.active.len()
    }
}

fn build_map_stats(chart: &Chart) -> Vec<MapStats> {
    let mut stats = Vec::with_capacity(chart.targets.len());
    let mut acc = MapStats::default();

    for target in &chart.targets {
        match &target.kind {
            osu_model::TargetKind::Circle => acc.ncircles += 1,
            osu_model::TargetKind::Slider { score_points, .. } => {
                acc.nsliders += 1;
                acc.max_combo += score_points.len() as i64;
            }
            osu_model::TargetKind::Spinner => {}
        }
        acc.max_combo += 1;
        acc.nobjects += 1;
        stats.push(acc);
    }

    stats
}

fn score_multiplier(chart: &Chart) -> f64 {
    let drain_seconds = chart.drain_duration() as f64 / 1000.0;
    if drain_seconds <= 0.0 {
        return 0.0;
    }

    let diff = &chart.difficulty;
    let density = (chart.targets.len() as f64 / drain_seconds * 8.0).clamp(0.0, 16.0);

    // The trailing epsilon keeps .5 sums rounding the way historical score
    // tables expect.
    ((diff.hp() + diff.od() + diff.cs() + density) / 38.0 * 5.0 - 0.0000001).round()
}
