use osu_model::{Chart, Difficulty, PauseSection};

use crate::hit_result::HitResult;

/// Upper bound of the health value.
pub const MAX_HP: f64 = 200.0;

/// Health granted by one revive.
pub const REVIVE_HP: f64 = 160.0;

/// Health floor (fraction of max) the calibration pass targets for a
/// perfect run.
const CALIBRATION_FLOOR: f64 = 0.4;

/// Health accumulator for one cursor.
///
/// Consumes discrete judgment results and discrete time advances; drains
/// passively between the chart's first and last target, except inside
/// pauses. The drain rate is calibrated once before simulation starts so
/// that a perfect run never dips below a fixed floor.
///
/// The engine treats this as a black box: only the judgment feed, the time
/// feed, the revive entry point and the health value are contractual.
#[derive(Debug, Clone)]
pub struct HealthProcessor {
    health: f64,
    drain_rate: f64,
    hp_drain: f64,
    drain_start: i64,
    drain_end: i64,
    pauses: Vec<PauseSection>,
    last_time: i64,
    /// Latched when health reaches zero; cleared only by a revive.
    failed: bool,
}

impl HealthProcessor {
    pub fn new(chart: &Chart, diff: &Difficulty) -> Self {
        let drain_start = chart.targets.first().map(|t| t.start_time).unwrap_or(0);
        let drain_end = chart.targets.last().map(|t| t.end_time).unwrap_or(0);
        Self {
            health: MAX_HP,
            drain_rate: 0.001 * (1.0 + diff.hp()),
            hp_drain: diff.hp(),
            drain_start,
            drain_end,
            pauses: chart.pauses.clone(),
            last_time: drain_start,
            failed: false,
        }
    }

    /// A processor that never drains and never fails. Test scaffolding.
    pub fn disabled() -> Self {
        Self {
            health: MAX_HP,
            drain_rate: 0.0,
            hp_drain: 0.0,
            drain_start: 0,
            drain_end: 0,
            pauses: Vec::new(),
            last_time: 0,
            failed: false,
        }
    }

    /// Calibration pass: lower the passive drain until a perfect run of the
    /// chart keeps health above the floor. Runs once before simulation.
    pub fn calculate_rate(&mut self, chart: &Chart) {
        for _ in 0..32 {
            let mut health = MAX_HP;
            let mut lowest = MAX_HP;
            let mut prev = self.drain_start;

            for target in &chart.targets {
                let drained = self.drainable_ms(prev, target.start_time) as f64 * self.drain_rate;
                health = (health - drained).max(0.0);
                lowest = lowest.min(health);
                health = (health + self.result_delta(HitResult::Hit300)).clamp(0.0, MAX_HP);
                prev = target.start_time.max(prev);
            }

            if lowest >= CALIBRATION_FLOOR * MAX_HP {
                return;
            }
            self.drain_rate *= 0.8;
        }
    }

    /// Reset to full health at the start of the drain period.
    pub fn reset(&mut self) {
        self.health = MAX_HP;
        self.last_time = self.drain_start;
        self.failed = false;
    }

    /// Advance the passive drain to `time`.
    pub fn update(&mut self, time: i64) {
        if time <= self.last_time {
            return;
        }
        let drained = self.drainable_ms(self.last_time, time) as f64 * self.drain_rate;
        self.last_time = time;
        self.set_health(self.health - drained);
    }

    /// Apply a judgment result.
    pub fn add_result(&mut self, result: HitResult) {
        self.set_health(self.health + self.result_delta(result));
    }

    /// Raise health without clearing the failure latch.
    pub fn increase(&mut self, amount: f64) {
        self.health = (self.health + amount).clamp(0.0, MAX_HP);
    }

    /// Revive after a zero-health event: grants [`REVIVE_HP`] and clears the
    /// failure latch. Only the ruleset's finite revive credit calls this.
    pub fn revive(&mut self) {
        self.health = (self.health + REVIVE_HP).clamp(0.0, MAX_HP);
        self.failed = false;
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    /// Health as a fraction of the maximum, in [0, 1].
    pub fn fraction(&self) -> f64 {
        self.health / MAX_HP
    }

    /// Health reached zero and no revive has covered it.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn set_health(&mut self, value: f64) {
        self.health = value.clamp(0.0, MAX_HP);
        if self.health == 0.0 {
            self.failed = true;
        }
    }

    /// Milliseconds of [from, to) that drain: inside the chart's span and
    /// outside pauses.
    fn drainable_ms(&self, from: i64, to: i64) -> i64 {
        let from = from.max(self.drain_start);
        let to = to.min(self.drain_end);
        if to <= from {
            return 0;
        }
        let mut span = to - from;
        for pause in &self.pauses {
            let overlap = pause.end_time.min(to) - pause.start_time.max(from);
            if overlap > 0 {
                span -= overlap;
            }
        }
        span.max(0)
    }

    fn result_delta(&self, result: HitResult) -> f64 {
        let drain = self.hp_drain;
        match result {
            HitResult::Hit300 => 10.2 - drain,
            HitResult::Hit100 => 8.0 - drain,
            HitResult::Hit50 => 4.0 - drain,
            HitResult::Miss => -(2.0 * drain + 5.0),
            HitResult::SliderMiss => -(drain + 2.0),
            HitResult::SliderStart | HitResult::SliderRepeat | HitResult::SliderEnd => {
                4.0 - drain * 0.25
            }
            HitResult::SliderPoint => 3.0 - drain * 0.25,
            HitResult::SpinnerSpin => 1.7,
            HitResult::SpinnerBonus => 2.0,
            HitResult::Ignore => 0.0,
        }
    }
}
