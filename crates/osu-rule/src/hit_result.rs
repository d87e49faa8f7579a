use serde::{Deserialize, Serialize};

/// Discrete outcome of evaluating input against a target.
///
/// The base tiers (`Hit300` / `Hit100` / `Hit50` / `Miss`) count toward
/// accuracy and the per-quality counters; the structural results are
/// intermediate held-target and duration-target sub-events that only carry
/// score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitResult {
    /// No judgment; submitting this is a no-op.
    Ignore,
    Miss,
    Hit50,
    Hit100,
    Hit300,
    /// Held-target start or tick missed. Worth no points, never breaks the
    /// raw-score baseline.
    SliderMiss,
    SliderStart,
    SliderPoint,
    SliderRepeat,
    SliderEnd,
    /// Periodic duration-target progress while held.
    SpinnerSpin,
    /// Duration held beyond the requirement.
    SpinnerBonus,
}

impl HitResult {
    /// Point value added to the score when this result is submitted.
    pub fn score_value(self) -> i64 {
        match self {
            HitResult::Hit300 => 300,
            HitResult::Hit100 => 100,
            HitResult::Hit50 => 50,
            HitResult::SliderStart | HitResult::SliderRepeat | HitResult::SliderEnd => 30,
            HitResult::SliderPoint | HitResult::SpinnerSpin => 10,
            HitResult::SpinnerBonus => 1000,
            HitResult::Ignore | HitResult::Miss | HitResult::SliderMiss => 0,
        }
    }

    /// Whether this result is a base judgment: it increments the per-quality
    /// counter, the counted-object total and the raw-score baseline.
    pub fn is_base(self) -> bool {
        matches!(
            self,
            HitResult::Hit300 | HitResult::Hit100 | HitResult::Hit50 | HitResult::Miss
        )
    }
}

/// Combo-segment bonus attached to the closing judgment of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboAddition {
    /// Segment closed with mid/low-tier results present.
    Mu,
    /// Segment fully resolved with no low-tier results or misses.
    Katu,
    /// Segment fully resolved with best-tier results only.
    Geki,
}

/// How a judgment affects the running combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboResult {
    Reset,
    Hold,
    Increase,
}

impl ComboResult {
    /// Fold one combo effect into a running combo value.
    pub fn apply(self, combo: i64) -> i64 {
        match self {
            ComboResult::Reset => 0,
            ComboResult::Hold => combo,
            ComboResult::Increase => combo + 1,
        }
    }
}

/// Verdict of the click timing/stacking tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickAction {
    /// Suppressed due to stacking ambiguity; no feedback.
    Ignored,
    /// Rejected as mistimed or misplaced; non-scoring UI feedback.
    Shake,
    /// Accepted for evaluation.
    Click,
}

/// Letter grade computed from the per-quality counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    D,
    C,
    B,
    A,
    S,
    SH,
    SS,
    SSH,
    None,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::D => "D",
            Grade::C => "C",
            Grade::B => "B",
            Grade::A => "A",
            Grade::S => "S",
            Grade::SH => "SH",
            Grade::SS => "SS",
            Grade::SSH => "SSH",
            Grade::None => "None",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_values() {
        assert_eq!(HitResult::Hit300.score_value(), 300);
        assert_eq!(HitResult::Hit100.score_value(), 100);
        assert_eq!(HitResult::Hit50.score_value(), 50);
        assert_eq!(HitResult::Miss.score_value(), 0);
        assert_eq!(HitResult::SliderMiss.score_value(), 0);
        assert_eq!(HitResult::SliderStart.score_value(), 30);
        assert_eq!(HitResult::SliderPoint.score_value(), 10);
        assert_eq!(HitResult::SliderEnd.score_value(), 30);
        assert_eq!(HitResult::SpinnerBonus.score_value(), 1000);
    }

    #[test]
    fn base_results() {
        assert!(HitResult::Hit300.is_base());
        assert!(HitResult::Miss.is_base());
        assert!(!HitResult::SliderMiss.is_base());
        assert!(!HitResult::SliderPoint.is_base());
        assert!(!HitResult::Ignore.is_base());
    }

    #[test]
    fn combo_fold() {
        assert_eq!(ComboResult::Increase.apply(4), 5);
        assert_eq!(ComboResult::Hold.apply(4), 4);
        assert_eq!(ComboResult::Reset.apply(4), 0);
    }

    #[test]
    fn grade_display() {
        assert_eq!(Grade::SSH.to_string(), "SSH");
        assert_eq!(Grade::D.to_string(), "D");
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&HitResult::SliderRepeat).unwrap();
        let back: HitResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HitResult::SliderRepeat);
    }
}
