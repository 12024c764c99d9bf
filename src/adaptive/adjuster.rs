//! Auto-adaptive adjustment computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::classifier::{
    AdaptiveState, Deviation, DeviationClassifier, DeviationTier, Direction, StateClassification,
};
use crate::load::model::FatigueReadinessScore;
use crate::plan::types::{BlockRole, PlanSession, SessionBlock, SessionStyle};
use crate::simulation::percentiles::WeekPercentiles;

/// Power threshold below which a first block reads as a warmup.
const WARMUP_POWER_THRESHOLD: f64 = 0.75;
/// Power threshold below which a last block reads as a cooldown.
const COOLDOWN_POWER_THRESHOLD: f64 = 0.7;
/// Blocks at most this long, flanked by two main blocks, read as transitions.
const TRANSITION_MAX_MINUTES: f64 = 5.0;

/// Multipliers for one state x tier cell of the adjustment table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AdjustmentCell {
    power_multiplier: f64,
    rpe_adjust: f64,
    rest_multiplier: f64,
    duration_multiplier: f64,
}

impl AdjustmentCell {
    const NOOP: Self = Self {
        power_multiplier: 1.0,
        rpe_adjust: 0.0,
        rest_multiplier: 1.0,
        duration_multiplier: 1.0,
    };
}

/// Per-block adjustment for a custom session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAdjustment {
    /// Index of the block within the session.
    pub block_index: usize,
    /// Inferred role of the block.
    pub role: BlockRole,
    /// The block's original style.
    pub original_style: SessionStyle,
    /// Power multiplier applied to the block (1.0 for protected roles).
    pub power_multiplier: f64,
    /// Rest multiplier for interval blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_multiplier: Option<f64>,
    /// Duration multiplier for steady blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_multiplier: Option<f64>,
}

/// The automatically computed adjustment for one session.
///
/// Ephemeral; recomputed per call and applied only when no coach rule matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAdaptiveAdjustment {
    /// False for the baseline state; nothing should be applied.
    pub is_active: bool,
    /// Combined adaptive state.
    pub state: AdaptiveState,
    /// The more extreme of the two metric tiers.
    pub tier: DeviationTier,
    /// Fatigue-side deviation.
    pub fatigue_deviation: Deviation,
    /// Readiness-side deviation.
    pub readiness_deviation: Deviation,
    /// Session-level power multiplier. For custom sessions, the mean over
    /// main blocks (1.0 if there are none).
    pub power_multiplier: f64,
    /// Added to target RPE, clamped to 1-10 at application time.
    pub rpe_adjust: f64,
    /// Rest scaling for interval sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_multiplier: Option<f64>,
    /// Duration scaling for steady-state sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_multiplier: Option<f64>,
    /// Per-block adjustments for custom sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_adjustments: Option<Vec<BlockAdjustment>>,
    /// Human-readable explanation, auditable against the simulated bands.
    pub message: String,
    /// When this adjustment was computed.
    pub generated_at: DateTime<Utc>,
}

impl AutoAdaptiveAdjustment {
    /// An inactive adjustment for the given classification.
    fn inactive(classification: StateClassification) -> Self {
        Self {
            is_active: false,
            state: classification.state,
            tier: classification.tier,
            fatigue_deviation: classification.fatigue,
            readiness_deviation: classification.readiness,
            power_multiplier: 1.0,
            rpe_adjust: 0.0,
            rest_multiplier: None,
            duration_multiplier: None,
            block_adjustments: None,
            message: "Fatigue and readiness within expected range".to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// Computes state-driven adjustments from a live reading and a week's bands.
pub struct AutoAdaptiveAdjuster;

impl AutoAdaptiveAdjuster {
    /// Evaluate the adjustment for one session.
    pub fn evaluate(
        scores: FatigueReadinessScore,
        week: &WeekPercentiles,
        session: &PlanSession,
    ) -> AutoAdaptiveAdjustment {
        let classification = DeviationClassifier::classify(scores.fatigue, scores.readiness, week);
        Self::for_classification(classification, scores, session)
    }

    /// Build the adjustment for an already-computed classification.
    pub fn for_classification(
        classification: StateClassification,
        scores: FatigueReadinessScore,
        session: &PlanSession,
    ) -> AutoAdaptiveAdjustment {
        if classification.state == AdaptiveState::Baseline {
            return AutoAdaptiveAdjustment::inactive(classification);
        }

        let cell = adjustment_cell(classification.state, classification.tier);
        let message = build_message(&classification, scores);

        let (rest_multiplier, duration_multiplier) = match session.style {
            SessionStyle::Intervals => (Some(cell.rest_multiplier), None),
            SessionStyle::SteadyState => (None, Some(cell.duration_multiplier)),
            SessionStyle::Custom => (Some(cell.rest_multiplier), Some(cell.duration_multiplier)),
        };

        let (power_multiplier, block_adjustments) = if session.style == SessionStyle::Custom {
            let blocks = block_adjustments(&session.blocks, &cell);
            let main: Vec<f64> = blocks
                .iter()
                .filter(|b| b.role == BlockRole::Main)
                .map(|b| b.power_multiplier)
                .collect();
            let mean = if main.is_empty() {
                1.0
            } else {
                main.iter().sum::<f64>() / main.len() as f64
            };
            (mean, Some(blocks))
        } else {
            (cell.power_multiplier, None)
        };

        tracing::debug!(
            state = %classification.state,
            tier = %classification.tier,
            power_multiplier,
            "auto-adaptive adjustment computed"
        );

        AutoAdaptiveAdjustment {
            is_active: true,
            state: classification.state,
            tier: classification.tier,
            fatigue_deviation: classification.fatigue,
            readiness_deviation: classification.readiness,
            power_multiplier,
            rpe_adjust: cell.rpe_adjust,
            rest_multiplier,
            duration_multiplier,
            block_adjustments,
            message,
            generated_at: Utc::now(),
        }
    }

    /// Infer block roles for a custom session.
    ///
    /// First block below 75% power is a warmup; last block below 70% power is
    /// a cooldown; a short block flanked by two main blocks is a transition;
    /// everything else is main. A single-block session is always main.
    pub fn infer_roles(blocks: &[SessionBlock]) -> Vec<BlockRole> {
        let count = blocks.len();
        let mut roles = vec![BlockRole::Main; count];
        if count < 2 {
            return roles;
        }

        if blocks[0].power_multiplier < WARMUP_POWER_THRESHOLD {
            roles[0] = BlockRole::Warmup;
        }
        if blocks[count - 1].power_multiplier < COOLDOWN_POWER_THRESHOLD {
            roles[count - 1] = BlockRole::Cooldown;
        }
        for index in 1..count - 1 {
            if blocks[index].duration_minutes <= TRANSITION_MAX_MINUTES
                && roles[index - 1] == BlockRole::Main
                && roles[index + 1] == BlockRole::Main
            {
                roles[index] = BlockRole::Transition;
            }
        }
        roles
    }
}

/// Per-block adjustments: only main blocks receive the state-driven cell;
/// warmup, cooldown, and transition blocks pass through unmodified so
/// ramp-up/ramp-down stays safe regardless of fatigue state.
fn block_adjustments(blocks: &[SessionBlock], cell: &AdjustmentCell) -> Vec<BlockAdjustment> {
    let roles = AutoAdaptiveAdjuster::infer_roles(blocks);
    blocks
        .iter()
        .zip(roles)
        .enumerate()
        .map(|(block_index, (block, role))| {
            let adjusted = role == BlockRole::Main;
            let power_multiplier = if adjusted { cell.power_multiplier } else { 1.0 };
            let rest_multiplier = (adjusted && block.style == SessionStyle::Intervals)
                .then_some(cell.rest_multiplier);
            let duration_multiplier = (adjusted && block.style == SessionStyle::SteadyState)
                .then_some(cell.duration_multiplier);

            BlockAdjustment {
                block_index,
                role,
                original_style: block.style,
                power_multiplier,
                rest_multiplier,
                duration_multiplier,
            }
        })
        .collect()
}

/// The fixed state x tier lookup table.
///
/// Extreme amplifies moderate, moderate amplifies mild. Values below 1.0
/// reduce intensity; values above extend recovery.
fn adjustment_cell(state: AdaptiveState, tier: DeviationTier) -> AdjustmentCell {
    use AdaptiveState::*;
    use DeviationTier::*;

    let (power, rpe, rest, duration) = match (state, tier) {
        (Critical, Extreme) => (0.85, -2.0, 1.5, 0.75),
        (Critical, Moderate) => (0.90, -1.0, 1.3, 0.85),
        (Critical, _) => (0.95, -1.0, 1.2, 0.90),

        (Stressed, Extreme) => (0.90, -1.0, 1.3, 0.85),
        (Stressed, Moderate) => (0.95, -1.0, 1.2, 0.90),
        (Stressed, _) => (0.97, 0.0, 1.1, 0.95),

        (Tired, Extreme) => (0.92, -1.0, 1.25, 0.85),
        (Tired, Moderate) => (0.95, -1.0, 1.15, 0.90),
        (Tired, _) => (0.97, 0.0, 1.1, 0.95),

        (Primed, Extreme) => (1.08, 1.0, 0.85, 1.15),
        (Primed, Moderate) => (1.05, 1.0, 0.90, 1.10),
        (Primed, _) => (1.02, 0.0, 0.95, 1.05),

        (Fresh, Extreme) => (1.05, 1.0, 0.90, 1.10),
        (Fresh, Moderate) => (1.03, 0.0, 0.95, 1.05),
        (Fresh, _) => (1.01, 0.0, 1.0, 1.0),

        (Baseline, _) => return AdjustmentCell::NOOP,
    };

    AdjustmentCell {
        power_multiplier: power,
        rpe_adjust: rpe,
        rest_multiplier: rest,
        duration_multiplier: duration,
    }
}

/// Build the audit message: the exact live values against the thresholds that
/// triggered them, e.g. "fatigue 82% vs expected <75%".
fn build_message(classification: &StateClassification, scores: FatigueReadinessScore) -> String {
    let mut parts = Vec::new();

    // A High deviation overran an upper threshold, so the expectation reads
    // "<"; a Low deviation underran a lower threshold, so ">".
    let bound = |direction: Direction| match direction {
        Direction::High => "<",
        _ => ">",
    };

    if let Some(threshold) = classification.fatigue.threshold {
        parts.push(format!(
            "fatigue {}% vs expected {}{threshold}%",
            scores.fatigue,
            bound(classification.fatigue.direction)
        ));
    }
    if let Some(threshold) = classification.readiness.threshold {
        parts.push(format!(
            "readiness {}% vs expected {}{threshold}%",
            scores.readiness,
            bound(classification.readiness.direction)
        ));
    }

    let action = match classification.state {
        AdaptiveState::Critical => "reducing intensity and extending recovery",
        AdaptiveState::Stressed => "reducing intensity",
        AdaptiveState::Tired => "easing the session",
        AdaptiveState::Primed => "raising intensity",
        AdaptiveState::Fresh => "nudging intensity up",
        AdaptiveState::Baseline => "no change",
    };

    format!(
        "{} ({} deviation): {}",
        classification.state.label(),
        classification.tier.label().to_lowercase(),
        if parts.is_empty() {
            action.to_string()
        } else {
            format!("{}; {action}", parts.join(", "))
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::percentiles::MetricBands;

    fn week() -> WeekPercentiles {
        let bands = MetricBands {
            p15: 20,
            p25: 30,
            p35: 40,
            p65: 60,
            p75: 70,
            p85: 80,
        };
        WeekPercentiles::from_bands(bands, bands)
    }

    fn scores(fatigue: u8, readiness: u8) -> FatigueReadinessScore {
        FatigueReadinessScore { fatigue, readiness }
    }

    #[test]
    fn test_baseline_is_noop() {
        let session = PlanSession::steady_state(200, 6.0, 30.0);
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(50, 50), &week(), &session);

        assert!(!adjustment.is_active);
        assert_eq!(adjustment.state, AdaptiveState::Baseline);
        assert_eq!(adjustment.power_multiplier, 1.0);
        assert_eq!(adjustment.rpe_adjust, 0.0);
    }

    #[test]
    fn test_interval_sessions_get_rest_multiplier() {
        let session = PlanSession::intervals(250, 8.0, 10, 60, 30);
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(85, 15), &week(), &session);

        assert!(adjustment.is_active);
        assert_eq!(adjustment.state, AdaptiveState::Critical);
        assert_eq!(adjustment.tier, DeviationTier::Extreme);
        assert_eq!(adjustment.rest_multiplier, Some(1.5));
        assert!(adjustment.duration_multiplier.is_none());
        assert!(adjustment.power_multiplier < 1.0);
    }

    #[test]
    fn test_steady_sessions_get_duration_multiplier() {
        let session = PlanSession::steady_state(200, 6.0, 40.0);
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(85, 15), &week(), &session);

        assert!(adjustment.rest_multiplier.is_none());
        assert_eq!(adjustment.duration_multiplier, Some(0.75));
    }

    #[test]
    fn test_extreme_amplifies_moderate() {
        let session = PlanSession::intervals(250, 8.0, 10, 60, 30);
        let extreme = AutoAdaptiveAdjuster::evaluate(scores(85, 15), &week(), &session);
        let moderate = AutoAdaptiveAdjuster::evaluate(scores(72, 28), &week(), &session);

        assert!(extreme.power_multiplier < moderate.power_multiplier);
        assert!(extreme.rest_multiplier.unwrap() > moderate.rest_multiplier.unwrap());
    }

    #[test]
    fn test_primed_state_raises_intensity() {
        let session = PlanSession::intervals(250, 8.0, 10, 60, 30);
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(15, 90), &week(), &session);

        assert_eq!(adjustment.state, AdaptiveState::Primed);
        assert!(adjustment.power_multiplier > 1.0);
        assert!(adjustment.rest_multiplier.unwrap() < 1.0);
    }

    #[test]
    fn test_role_inference() {
        let blocks = vec![
            SessionBlock::steady(0.6, 10.0),
            SessionBlock::intervals(1.1, 8, 45, 45),
            SessionBlock::steady(0.9, 3.0),
            SessionBlock::intervals(1.15, 6, 60, 60),
            SessionBlock::steady(0.65, 5.0),
        ];
        let roles = AutoAdaptiveAdjuster::infer_roles(&blocks);
        assert_eq!(
            roles,
            vec![
                BlockRole::Warmup,
                BlockRole::Main,
                BlockRole::Transition,
                BlockRole::Main,
                BlockRole::Cooldown,
            ]
        );
    }

    #[test]
    fn test_single_block_is_main() {
        let blocks = vec![SessionBlock::steady(0.5, 20.0)];
        assert_eq!(
            AutoAdaptiveAdjuster::infer_roles(&blocks),
            vec![BlockRole::Main]
        );
    }

    #[test]
    fn test_high_power_first_block_is_main() {
        let blocks = vec![
            SessionBlock::steady(0.9, 10.0),
            SessionBlock::steady(0.6, 10.0),
        ];
        let roles = AutoAdaptiveAdjuster::infer_roles(&blocks);
        assert_eq!(roles[0], BlockRole::Main);
        assert_eq!(roles[1], BlockRole::Cooldown);
    }

    #[test]
    fn test_custom_session_protects_warmup_and_cooldown() {
        let session = PlanSession::custom(
            200,
            7.0,
            vec![
                SessionBlock::steady(0.6, 10.0),
                SessionBlock::intervals(1.1, 8, 45, 45),
                SessionBlock::steady(0.65, 5.0),
            ],
        );
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(85, 15), &week(), &session);

        let blocks = adjustment.block_adjustments.as_ref().unwrap();
        assert_eq!(blocks[0].power_multiplier, 1.0);
        assert_eq!(blocks[2].power_multiplier, 1.0);
        assert!(blocks[1].power_multiplier < 1.0);
        assert!(blocks[1].rest_multiplier.is_some());

        // Session-level multiplier is the mean over main blocks.
        assert_eq!(adjustment.power_multiplier, blocks[1].power_multiplier);
    }

    #[test]
    fn test_all_protected_blocks_yield_unit_multiplier() {
        let session = PlanSession::custom(
            200,
            7.0,
            vec![
                SessionBlock::steady(0.6, 10.0),
                SessionBlock::steady(0.65, 5.0),
            ],
        );
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(85, 15), &week(), &session);
        assert_eq!(adjustment.power_multiplier, 1.0);
    }

    #[test]
    fn test_message_names_value_and_threshold() {
        let session = PlanSession::steady_state(200, 6.0, 30.0);
        let adjustment = AutoAdaptiveAdjuster::evaluate(scores(82, 50), &week(), &session);

        assert!(adjustment.message.contains("fatigue 82% vs expected <80%"));
    }
}
