use serde::{Deserialize, Serialize};

/// Gameplay modifier set, stored as a bit mask.
///
/// The numeric bit values follow the historical score-flag layout so that
/// encoded scores and replays stay comparable across tools.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Mods(pub u32);

impl Mods {
    pub const NONE: Mods = Mods(0);
    pub const NO_FAIL: Mods = Mods(1);
    pub const EASY: Mods = Mods(1 << 1);
    pub const HIDDEN: Mods = Mods(1 << 3);
    pub const HARD_ROCK: Mods = Mods(1 << 4);
    pub const SUDDEN_DEATH: Mods = Mods(1 << 5);
    pub const DOUBLE_TIME: Mods = Mods(1 << 6);
    pub const RELAX: Mods = Mods(1 << 7);
    pub const HALF_TIME: Mods = Mods(1 << 8);
    pub const NIGHTCORE: Mods = Mods(1 << 9);
    pub const FLASHLIGHT: Mods = Mods(1 << 10);
    pub const SPUN_OUT: Mods = Mods(1 << 12);
    pub const AUTOPILOT: Mods = Mods(1 << 13);

    /// Mods that change effective difficulty values or playback rate.
    /// Rating component tables are keyed by this subset.
    pub const DIFFICULTY_ADJUST_MASK: Mods = Mods(
        Self::EASY.0 | Self::HARD_ROCK.0 | Self::DOUBLE_TIME.0 | Self::HALF_TIME.0
            | Self::NIGHTCORE.0,
    );

    pub fn contains(self, other: Mods) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Mods) -> bool {
        self.0 & other.0 != 0
    }

    pub fn difficulty_adjust(self) -> Mods {
        Mods(self.0 & Self::DIFFICULTY_ADJUST_MASK.0)
    }

    /// Score multiplier applied on top of the chart score multiplier.
    pub fn score_multiplier(self) -> f64 {
        let mut multiplier = 1.0;
        if self.contains(Self::NO_FAIL) {
            multiplier *= 0.5;
        }
        if self.contains(Self::EASY) {
            multiplier *= 0.5;
        }
        if self.contains(Self::HALF_TIME) {
            multiplier *= 0.3;
        }
        if self.contains(Self::HIDDEN) {
            multiplier *= 1.06;
        }
        if self.contains(Self::HARD_ROCK) {
            multiplier *= 1.06;
        }
        if self.contains(Self::DOUBLE_TIME) || self.contains(Self::NIGHTCORE) {
            multiplier *= 1.12;
        }
        if self.contains(Self::FLASHLIGHT) {
            multiplier *= 1.12;
        }
        if self.contains(Self::SPUN_OUT) {
            multiplier *= 0.9;
        }
        if self.contains(Self::RELAX) || self.contains(Self::AUTOPILOT) {
            multiplier *= 0.0;
        }
        multiplier
    }
}

impl std::ops::BitOr for Mods {
    type Output = Mods;

    fn bitor(self, rhs: Mods) -> Mods {
        Mods(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Mods {
    fn bitor_assign(&mut self, rhs: Mods) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for Mods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(Mods, &str); 12] = [
            (Mods::NO_FAIL, "NF"),
            (Mods::EASY, "EZ"),
            (Mods::HIDDEN, "HD"),
            (Mods::HARD_ROCK, "HR"),
            (Mods::SUDDEN_DEATH, "SD"),
            (Mods::DOUBLE_TIME, "DT"),
            (Mods::RELAX, "RX"),
            (Mods::HALF_TIME, "HT"),
            (Mods::NIGHTCORE, "NC"),
            (Mods::FLASHLIGHT, "FL"),
            (Mods::SPUN_OUT, "SO"),
            (Mods::AUTOPILOT, "AP"),
        ];

        if self.0 == 0 {
            return write!(f, "NM");
        }

        let mut written = false;
        for (bit, name) in NAMES {
            if self.contains(bit) {
                if written {
                    write!(f, ",")?;
                }
                write!(f, "{name}")?;
                written = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_and_union() {
        let mods = Mods::HIDDEN | Mods::HARD_ROCK;
        assert!(mods.contains(Mods::HIDDEN));
        assert!(mods.contains(Mods::HARD_ROCK));
        assert!(!mods.contains(Mods::EASY));
        assert!(mods.intersects(Mods::HIDDEN | Mods::FLASHLIGHT));
    }

    #[test]
    fn difficulty_adjust_strips_visual_mods() {
        let mods = Mods::HIDDEN | Mods::HARD_ROCK | Mods::DOUBLE_TIME;
        assert_eq!(
            mods.difficulty_adjust(),
            Mods::HARD_ROCK | Mods::DOUBLE_TIME
        );
    }

    #[test]
    fn score_multiplier_no_mod() {
        assert!((Mods::NONE.score_multiplier() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn score_multiplier_stacks() {
        let mods = Mods::HIDDEN | Mods::HARD_ROCK;
        assert!((mods.score_multiplier() - 1.06 * 1.06).abs() < 1e-9);
    }

    #[test]
    fn score_multiplier_relax_zeroes() {
        assert_eq!((Mods::RELAX | Mods::HIDDEN).score_multiplier(), 0.0);
        assert_eq!(Mods::AUTOPILOT.score_multiplier(), 0.0);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mods::NONE.to_string(), "NM");
        assert_eq!((Mods::HIDDEN | Mods::DOUBLE_TIME).to_string(), "HD,DT");
    }

    #[test]
    fn serde_round_trip() {
        let mods = Mods::EASY | Mods::FLASHLIGHT;
        let json = serde_json::to_string(&mods).unwrap();
        let back: Mods = serde_json::from_str(&json).unwrap();
        assert_eq!(mods, back);
    }
}
