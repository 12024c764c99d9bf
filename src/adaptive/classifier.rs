//! Deviation classification against percentile bands.

use serde::{Deserialize, Serialize};

use crate::simulation::percentiles::{MetricBands, WeekPercentiles};

/// Direction of a metric's deviation from its expected band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Above the upper bands.
    High,
    /// Below the lower bands.
    Low,
    /// Inside the P35-P65 corridor.
    Normal,
}

/// How far outside the expected band a metric sits.
///
/// Ordered so `max` picks the more extreme of two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationTier {
    /// Within the normal corridor.
    None,
    /// Past P35/P65.
    Mild,
    /// Past P25/P75.
    Moderate,
    /// Past P15/P85.
    Extreme,
}

impl DeviationTier {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            DeviationTier::None => "None",
            DeviationTier::Mild => "Mild",
            DeviationTier::Moderate => "Moderate",
            DeviationTier::Extreme => "Extreme",
        }
    }
}

impl std::fmt::Display for DeviationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One metric's classified deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deviation {
    /// Deviation direction.
    pub direction: Direction,
    /// Deviation tier.
    pub tier: DeviationTier,
    /// The percentile threshold that triggered the classification, when any.
    pub threshold: Option<u8>,
}

impl Deviation {
    /// A metric inside its expected band.
    pub fn normal() -> Self {
        Self {
            direction: Direction::Normal,
            tier: DeviationTier::None,
            threshold: None,
        }
    }
}

/// Combined adaptive state of the athlete relative to plan expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveState {
    /// High fatigue and low readiness. Back off hard.
    Critical,
    /// High fatigue, readiness still normal.
    Stressed,
    /// Normal fatigue but low readiness.
    Tired,
    /// Low fatigue and high readiness. Room to push.
    Primed,
    /// Normal fatigue with high readiness.
    Fresh,
    /// Everything within expectations.
    Baseline,
}

impl AdaptiveState {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            AdaptiveState::Critical => "Critical",
            AdaptiveState::Stressed => "Stressed",
            AdaptiveState::Tired => "Tired",
            AdaptiveState::Primed => "Primed",
            AdaptiveState::Fresh => "Fresh",
            AdaptiveState::Baseline => "Baseline",
        }
    }
}

impl std::fmt::Display for AdaptiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Full classification of a live reading against one week's bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateClassification {
    /// Combined adaptive state.
    pub state: AdaptiveState,
    /// The more extreme of the two metric tiers.
    pub tier: DeviationTier,
    /// Fatigue-side deviation.
    pub fatigue: Deviation,
    /// Readiness-side deviation.
    pub readiness: Deviation,
}

/// Classifier for live fatigue/readiness readings.
pub struct DeviationClassifier;

impl DeviationClassifier {
    /// Classify one metric against its bands.
    ///
    /// Directions are literal: above the band is `High`, below is `Low`.
    /// Checks run extreme to mild with inclusive comparisons, so a value
    /// satisfying several thresholds lands on its most extreme tier. `invert`
    /// swaps which side is checked first: for fatigue (`invert = false`) the
    /// high side is the bad one, for readiness (`invert = true`) the low side
    /// is.
    pub fn classify_deviation(value: u8, bands: &MetricBands, invert: bool) -> Deviation {
        let above = Self::check_side(value, bands, false);
        let below = Self::check_side(value, bands, true);

        let ordered = if invert {
            [below, above]
        } else {
            [above, below]
        };
        ordered
            .into_iter()
            .flatten()
            .next()
            .unwrap_or_else(Deviation::normal)
    }

    /// Check one side of the band, extreme to mild.
    fn check_side(value: u8, bands: &MetricBands, low_side: bool) -> Option<Deviation> {
        let (direction, tiers): (Direction, [(bool, u8, DeviationTier); 3]) = if low_side {
            (
                Direction::Low,
                [
                    (value <= bands.p15, bands.p15, DeviationTier::Extreme),
                    (value <= bands.p25, bands.p25, DeviationTier::Moderate),
                    (value <= bands.p35, bands.p35, DeviationTier::Mild),
                ],
            )
        } else {
            (
                Direction::High,
                [
                    (value >= bands.p85, bands.p85, DeviationTier::Extreme),
                    (value >= bands.p75, bands.p75, DeviationTier::Moderate),
                    (value >= bands.p65, bands.p65, DeviationTier::Mild),
                ],
            )
        };

        tiers
            .into_iter()
            .find_map(|(matched, threshold, tier)| {
                matched.then_some(Deviation {
                    direction,
                    tier,
                    threshold: Some(threshold),
                })
            })
    }

    /// Combine the two metric directions into one named state.
    pub fn classify_state(fatigue: Direction, readiness: Direction) -> AdaptiveState {
        match (fatigue, readiness) {
            (Direction::High, Direction::Low) => AdaptiveState::Critical,
            (Direction::High, Direction::Normal) => AdaptiveState::Stressed,
            (Direction::Normal, Direction::Low) => AdaptiveState::Tired,
            (Direction::Low, Direction::High) => AdaptiveState::Primed,
            (Direction::Normal, Direction::High) => AdaptiveState::Fresh,
            _ => AdaptiveState::Baseline,
        }
    }

    /// Classify a live reading against one week's percentile table.
    pub fn classify(
        fatigue_score: u8,
        readiness_score: u8,
        week: &WeekPercentiles,
    ) -> StateClassification {
        let fatigue =
            Self::classify_deviation(fatigue_score, &week.fatigue_bands(), false);
        let readiness =
            Self::classify_deviation(readiness_score, &week.readiness_bands(), true);

        StateClassification {
            state: Self::classify_state(fatigue.direction, readiness.direction),
            tier: fatigue.tier.max(readiness.tier),
            fatigue,
            readiness,
        }
    }
}
