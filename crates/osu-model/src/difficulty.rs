use serde::{Deserialize, Serialize};

use crate::mods::Mods;

/// Absolute time distance (ms) from a target's start inside which a click is
/// evaluated at all. Clicks beyond it are rejected as a shake.
pub const HITTABLE_RANGE_MS: i64 = 400;

/// Difficulty settings for one cursor, with modifier scaling already applied.
///
/// Holds the raw chart values plus the derived constants the judges consume:
/// hit windows, circle radius and preempt duration. Derived values are
/// computed once at construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    hp: f64,
    cs: f64,
    od: f64,
    ar: f64,
    mods: Mods,

    hit300: i64,
    hit100: i64,
    hit50: i64,
    preempt: i64,
    circle_radius: f32,
}

impl Difficulty {
    pub fn new(hp: f64, cs: f64, od: f64, ar: f64) -> Self {
        Self::with_mods(hp, cs, od, ar, Mods::NONE)
    }

    pub fn with_mods(hp: f64, cs: f64, od: f64, ar: f64, mods: Mods) -> Self {
        let (hp, cs, od, ar) = apply_mods(hp, cs, od, ar, mods);

        Self {
            hp,
            cs,
            od,
            ar,
            mods,
            hit300: (80.0 - 6.0 * od) as i64,
            hit100: (140.0 - 8.0 * od) as i64,
            hit50: (200.0 - 10.0 * od) as i64,
            preempt: preempt_ms(ar),
            circle_radius: (32.0 * (1.0 - 0.7 * (cs - 5.0) / 5.0)) as f32,
        }
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn cs(&self) -> f64 {
        self.cs
    }

    pub fn od(&self) -> f64 {
        self.od
    }

    pub fn ar(&self) -> f64 {
        self.ar
    }

    pub fn mods(&self) -> Mods {
        self.mods
    }

    /// Best-tier window radius in ms.
    pub fn hit300(&self) -> i64 {
        self.hit300
    }

    /// Mid-tier window radius in ms.
    pub fn hit100(&self) -> i64 {
        self.hit100
    }

    /// Widest scoring window radius in ms.
    pub fn hit50(&self) -> i64 {
        self.hit50
    }

    /// Time between a target becoming visible and its nominal start, in ms.
    pub fn preempt(&self) -> i64 {
        self.preempt
    }

    /// Hit radius in playfield units.
    pub fn circle_radius(&self) -> f32 {
        self.circle_radius
    }
}

fn apply_mods(hp: f64, cs: f64, od: f64, ar: f64, mods: Mods) -> (f64, f64, f64, f64) {
    if mods.contains(Mods::HARD_ROCK) {
        (
            (hp * 1.4).min(10.0),
            (cs * 1.3).min(10.0),
            (od * 1.4).min(10.0),
            (ar * 1.4).min(10.0),
        )
    } else if mods.contains(Mods::EASY) {
        (hp * 0.5, cs * 0.5, od * 0.5, ar * 0.5)
    } else {
        (hp, cs, od, ar)
    }
}

fn preempt_ms(ar: f64) -> i64 {
    let preempt = if ar < 5.0 {
        1200.0 + 600.0 * (5.0 - ar) / 5.0
    } else {
        1200.0 - 750.0 * (ar - 5.0) / 5.0
    };
    preempt as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_at_od5() {
        let diff = Difficulty::new(5.0, 4.0, 5.0, 9.0);
        assert_eq!(diff.hit300(), 50);
        assert_eq!(diff.hit100(), 100);
        assert_eq!(diff.hit50(), 150);
    }

    #[test]
    fn windows_nest() {
        for od in 0..=10 {
            let diff = Difficulty::new(5.0, 4.0, od as f64, 9.0);
            assert!(diff.hit300() < diff.hit100());
            assert!(diff.hit100() < diff.hit50());
            assert!(diff.hit50() < HITTABLE_RANGE_MS);
        }
    }

    #[test]
    fn preempt_at_reference_points() {
        assert_eq!(Difficulty::new(5.0, 4.0, 5.0, 5.0).preempt(), 1200);
        assert_eq!(Difficulty::new(5.0, 4.0, 5.0, 0.0).preempt(), 1800);
        assert_eq!(Difficulty::new(5.0, 4.0, 5.0, 10.0).preempt(), 450);
    }

    #[test]
    fn radius_shrinks_with_cs() {
        let big = Difficulty::new(5.0, 2.0, 5.0, 9.0);
        let small = Difficulty::new(5.0, 7.0, 5.0, 9.0);
        assert!(big.circle_radius() > small.circle_radius());
    }

    #[test]
    fn hard_rock_tightens_and_caps() {
        let base = Difficulty::new(5.0, 4.0, 8.0, 9.0);
        let hr = Difficulty::with_mods(5.0, 4.0, 8.0, 9.0, Mods::HARD_ROCK);
        assert!(hr.hit300() < base.hit300());
        assert!((hr.od() - 10.0).abs() < 1e-9); // 8 * 1.4 capped at 10
        assert!(hr.circle_radius() < base.circle_radius());
    }

    #[test]
    fn easy_halves() {
        let ez = Difficulty::with_mods(6.0, 4.0, 6.0, 8.0, Mods::EASY);
        assert!((ez.od() - 3.0).abs() < 1e-9);
        assert!((ez.ar() - 4.0).abs() < 1e-9);
    }
}
