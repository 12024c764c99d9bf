//! Session, week, and context types.

use serde::{Deserialize, Serialize};

/// Default interval cycle count when a session omits it.
pub const DEFAULT_CYCLES: u32 = 10;
/// Default interval rest duration in seconds when a session omits it.
pub const DEFAULT_REST_SECONDS: u32 = 30;
/// Default session duration in minutes for sparse week definitions.
pub const DEFAULT_SESSION_DURATION_MINUTES: f64 = 15.0;

/// Style of a planned session or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStyle {
    /// Repeating work/rest cycles.
    Intervals,
    /// Constant effort for a fixed duration.
    SteadyState,
    /// Multi-block session with per-block targets.
    Custom,
}

impl std::fmt::Display for SessionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStyle::Intervals => write!(f, "Intervals"),
            SessionStyle::SteadyState => write!(f, "Steady State"),
            SessionStyle::Custom => write!(f, "Custom"),
        }
    }
}

/// Inferred role of a block within a custom session.
///
/// Roles are inferred from position and power, never configured. Warmup,
/// cooldown, and transition blocks are passed through unmodified by adaptive
/// adjustments so ramp-up/ramp-down stays intact regardless of fatigue state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    /// First block at reduced power.
    Warmup,
    /// Core training block; the only role that receives adjustments.
    Main,
    /// Last block at reduced power.
    Cooldown,
    /// Short bridge between two main blocks.
    Transition,
}

impl std::fmt::Display for BlockRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockRole::Warmup => write!(f, "Warmup"),
            BlockRole::Main => write!(f, "Main"),
            BlockRole::Cooldown => write!(f, "Cooldown"),
            BlockRole::Transition => write!(f, "Transition"),
        }
    }
}

/// A single block within a custom session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBlock {
    /// Block style (intervals or steady effort).
    pub style: SessionStyle,
    /// Power target relative to the session's planned power.
    pub power_multiplier: f64,
    /// Block duration in minutes.
    pub duration_minutes: f64,
    /// Interval cycle count (interval blocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    /// Work duration per cycle in seconds (interval blocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_duration_seconds: Option<u32>,
    /// Rest duration per cycle in seconds (interval blocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_duration_seconds: Option<u32>,
}

impl SessionBlock {
    /// Create a steady block at the given relative power and duration.
    pub fn steady(power_multiplier: f64, duration_minutes: f64) -> Self {
        Self {
            style: SessionStyle::SteadyState,
            power_multiplier,
            duration_minutes,
            cycles: None,
            work_duration_seconds: None,
            rest_duration_seconds: None,
        }
    }

    /// Create an interval block.
    pub fn intervals(
        power_multiplier: f64,
        cycles: u32,
        work_seconds: u32,
        rest_seconds: u32,
    ) -> Self {
        Self {
            style: SessionStyle::Intervals,
            power_multiplier,
            duration_minutes: f64::from(cycles * (work_seconds + rest_seconds)) / 60.0,
            cycles: Some(cycles),
            work_duration_seconds: Some(work_seconds),
            rest_duration_seconds: Some(rest_seconds),
        }
    }
}

/// A planned session the resolver can adjust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSession {
    /// Session style.
    pub style: SessionStyle,
    /// Planned power in watts.
    pub planned_power: u16,
    /// Target RPE, 1-10.
    pub target_rpe: f64,
    /// Total duration in minutes.
    pub duration_minutes: f64,
    /// Interval cycle count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    /// Work duration per cycle in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_duration_seconds: Option<u32>,
    /// Rest duration per cycle in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_duration_seconds: Option<u32>,
    /// Blocks for custom sessions; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<SessionBlock>,
}

impl PlanSession {
    /// Create a steady-state session.
    pub fn steady_state(planned_power: u16, target_rpe: f64, duration_minutes: f64) -> Self {
        Self {
            style: SessionStyle::SteadyState,
            planned_power,
            target_rpe,
            duration_minutes,
            cycles: None,
            work_duration_seconds: None,
            rest_duration_seconds: None,
            blocks: Vec::new(),
        }
    }

    /// Create an interval session.
    pub fn intervals(
        planned_power: u16,
        target_rpe: f64,
        cycles: u32,
        work_seconds: u32,
        rest_seconds: u32,
    ) -> Self {
        Self {
            style: SessionStyle::Intervals,
            planned_power,
            target_rpe,
            duration_minutes: f64::from(cycles * (work_seconds + rest_seconds)) / 60.0,
            cycles: Some(cycles),
            work_duration_seconds: Some(work_seconds),
            rest_duration_seconds: Some(rest_seconds),
            blocks: Vec::new(),
        }
    }

    /// Create a custom multi-block session.
    pub fn custom(planned_power: u16, target_rpe: f64, blocks: Vec<SessionBlock>) -> Self {
        let duration_minutes = blocks.iter().map(|b| b.duration_minutes).sum();
        Self {
            style: SessionStyle::Custom,
            planned_power,
            target_rpe,
            duration_minutes,
            cycles: None,
            work_duration_seconds: None,
            rest_duration_seconds: None,
            blocks,
        }
    }

    /// Interval cycle count, defaulted when absent.
    pub fn cycles_or_default(&self) -> u32 {
        self.cycles.unwrap_or(DEFAULT_CYCLES)
    }

    /// Interval rest seconds, defaulted when absent.
    pub fn rest_seconds_or_default(&self) -> u32 {
        self.rest_duration_seconds.unwrap_or(DEFAULT_REST_SECONDS)
    }

    /// Recompute total duration from blocks. Call after any block mutation.
    pub fn recompute_duration_from_blocks(&mut self) {
        if !self.blocks.is_empty() {
            self.duration_minutes = self.blocks.iter().map(|b| b.duration_minutes).sum();
        }
    }
}

/// One week of a program plan, as the simulator consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDefinition {
    /// Power target relative to base power.
    pub power_multiplier: f64,
    /// Target RPE for the week's sessions.
    pub target_rpe: f64,
    /// Session duration in minutes.
    pub duration_minutes: f64,
    /// Phase name (e.g. "Base", "Build", "Taper").
    pub phase_name: String,
}

impl WeekDefinition {
    /// Create a week definition with the default session duration.
    pub fn new(power_multiplier: f64, target_rpe: f64, phase_name: impl Into<String>) -> Self {
        Self {
            power_multiplier,
            target_rpe,
            duration_minutes: DEFAULT_SESSION_DURATION_MINUTES,
            phase_name: phase_name.into(),
        }
    }
}

/// Live athlete reading supplied per adjustment call.
///
/// Produced by the live tracking/questionnaire layer; consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueContext {
    /// Current fatigue score, 0-100.
    pub fatigue_score: u8,
    /// Current readiness score, 0-100.
    pub readiness_score: u8,
    /// Current Training Stress Balance.
    pub tsb_value: f64,
    /// 1-based week number within the program.
    pub week_number: u32,
    /// Total weeks in the program. Must be at least 1.
    pub total_weeks: u32,
    /// Phase identifier, if the program tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Human-readable phase name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
}

impl FatigueContext {
    /// Progress through the program, 0.0 at week 1 and 1.0 at the last week.
    ///
    /// Panics if `total_weeks` is 0; that is a caller bug, not athlete data.
    pub fn progress(&self) -> f64 {
        assert!(self.total_weeks >= 1, "total_weeks must be at least 1");
        if self.total_weeks == 1 {
            return 0.0;
        }
        f64::from(self.week_number - 1) / f64::from(self.total_weeks - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_session_duration() {
        let session = PlanSession::intervals(250, 8.0, 10, 60, 30);
        assert!((session.duration_minutes - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_session_duration_is_block_sum() {
        let session = PlanSession::custom(
            200,
            7.0,
            vec![
                SessionBlock::steady(0.6, 10.0),
                SessionBlock::intervals(1.1, 8, 45, 45),
                SessionBlock::steady(0.65, 5.0),
            ],
        );
        assert!((session.duration_minutes - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_defaults_for_missing_interval_fields() {
        let session = PlanSession::steady_state(200, 6.0, 30.0);
        assert_eq!(session.cycles_or_default(), DEFAULT_CYCLES);
        assert_eq!(session.rest_seconds_or_default(), DEFAULT_REST_SECONDS);
    }

    #[test]
    fn test_context_progress() {
        let mut ctx = FatigueContext {
            fatigue_score: 50,
            readiness_score: 50,
            tsb_value: 0.0,
            week_number: 1,
            total_weeks: 9,
            phase: None,
            phase_name: None,
        };
        assert_eq!(ctx.progress(), 0.0);

        ctx.week_number = 9;
        assert_eq!(ctx.progress(), 1.0);

        ctx.week_number = 5;
        assert!((ctx.progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_week_program_progress() {
        let ctx = FatigueContext {
            fatigue_score: 50,
            readiness_score: 50,
            tsb_value: 0.0,
            week_number: 1,
            total_weeks: 1,
            phase: None,
            phase_name: None,
        };
        assert_eq!(ctx.progress(), 0.0);
    }

    #[test]
    #[should_panic(expected = "total_weeks")]
    fn test_zero_total_weeks_panics() {
        let ctx = FatigueContext {
            fatigue_score: 50,
            readiness_score: 50,
            tsb_value: 0.0,
            week_number: 1,
            total_weeks: 0,
            phase: None,
            phase_name: None,
        };
        let _ = ctx.progress();
    }

    #[test]
    fn test_session_deserializes_camel_case() {
        let json = r#"{
            "style": "intervals",
            "plannedPower": 250,
            "targetRpe": 8,
            "durationMinutes": 15,
            "cycles": 10,
            "workDurationSeconds": 60,
            "restDurationSeconds": 30
        }"#;
        let session: PlanSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.style, SessionStyle::Intervals);
        assert_eq!(session.planned_power, 250);
        assert!(session.blocks.is_empty());
    }
}
