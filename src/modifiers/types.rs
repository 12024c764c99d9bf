//! Coach modifier record shapes.

use serde::{Deserialize, Serialize};

use crate::plan::types::SessionStyle;

/// How the fields of a flexible condition combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionLogic {
    /// All defined fields must hold.
    #[default]
    And,
    /// Any defined field may hold.
    Or,
}

/// Legacy threshold presets from early coach rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPreset {
    /// Fatigue at or above 70.
    HighFatigue,
    /// Fatigue at or above 85.
    VeryHighFatigue,
    /// Readiness at or below 40.
    LowReadiness,
    /// Readiness at or below 25.
    VeryLowReadiness,
    /// Training Stress Balance below zero.
    NegativeTsb,
}

/// A flexible condition with per-field comparator strings like `">50"`.
///
/// Strings are compiled once at modifier load; an invalid string makes its
/// field never match rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleCondition {
    /// Comparator string against the fatigue score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatigue: Option<String>,
    /// Comparator string against the readiness score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<String>,
    /// Field combination logic.
    #[serde(default)]
    pub logic: ConditionLogic,
}

/// Condition of a coach modifier: legacy preset or flexible expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierCondition {
    /// Simple legacy preset.
    Preset(ThresholdPreset),
    /// Flexible per-field expression.
    Flexible(FlexibleCondition),
}

/// Adjustments a winning modifier applies to a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierAdjustments {
    /// Multiplies planned power (rounded to whole watts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_multiplier: Option<f64>,
    /// Added to target RPE, clamped to 1-10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe_adjust: Option<f64>,
    /// Scales rest seconds on interval sessions and blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_multiplier: Option<f64>,
    /// Scales steady-state duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_multiplier: Option<f64>,
    /// Scales interval cycle count (rounded) or steady duration (unrounded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_multiplier: Option<f64>,
    /// Message surfaced to the athlete when this modifier wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A coach-authored modifier rule.
///
/// All matching fields are optional; an undefined field is a wildcard. At most
/// one modifier per mutex group may win a resolution, and at most one
/// modifier without a mutex group may win globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueModifier {
    /// Condition against the live fatigue context.
    pub condition: ModifierCondition,
    /// Phase identifier filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Phase name filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    /// Week position filter expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_position: Option<String>,
    /// Session style filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionStyle>,
    /// Lower numbers win among non-mutex candidates and within a group.
    #[serde(default)]
    pub priority: i32,
    /// Mutual-exclusion group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutex_group: Option<String>,
    /// Rank within and across mutex groups; higher ranks sort first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutex_rank: Option<i32>,
    /// Adjustments applied when this modifier wins.
    #[serde(default)]
    pub adjustments: ModifierAdjustments,
}
