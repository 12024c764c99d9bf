//! Stepped interpolation of sparse week definitions.
//!
//! Program templates author only the weeks where something changes, addressed
//! by absolute index or by anchor (`"first"`, `"last"`, `"50%"`). The dense
//! per-week plan the simulator needs is produced by carrying the most recent
//! authored definition forward.

use serde::{Deserialize, Serialize};

use super::types::{WeekDefinition, DEFAULT_SESSION_DURATION_MINUTES};

/// Position of an authored week within a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthoredPosition {
    /// Absolute 1-based week index.
    Week(u32),
    /// Anchor string: "first", "last", or a percentage like "50%".
    Anchor(String),
}

/// A sparse, authored week definition from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredWeek {
    /// Where this definition takes effect.
    pub position: AuthoredPosition,
    /// Phase name; defaults to "Week N" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    /// Power multiplier; defaults to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_multiplier: Option<f64>,
    /// Target RPE; defaults to 6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rpe: Option<f64>,
    /// Session duration in minutes; defaults to the template default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

/// Week-count configuration of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum WeekCount {
    /// Fixed program length.
    Fixed { weeks: u32 },
    /// User-selectable length; resolves to the midpoint.
    Variable { min: u32, max: u32 },
}

impl WeekCount {
    /// Resolve to a concrete week count.
    pub fn resolve(&self) -> u32 {
        match *self {
            WeekCount::Fixed { weeks } => weeks.max(1),
            WeekCount::Variable { min, max } => ((min + max) / 2).max(1),
        }
    }
}

/// Resolve an authored position to a concrete 1-based week number.
///
/// Unrecognized anchors resolve to week 1 rather than erroring.
pub fn resolve_week_position(position: &AuthoredPosition, total_weeks: u32) -> u32 {
    match position {
        AuthoredPosition::Week(week) => (*week).clamp(1, total_weeks.max(1)),
        AuthoredPosition::Anchor(anchor) => match anchor.as_str() {
            "first" => 1,
            "last" => total_weeks.max(1),
            other => {
                if let Some(stripped) = other.strip_suffix('%') {
                    if let Ok(percent) = stripped.trim().parse::<f64>() {
                        let fraction = percent / 100.0;
                        if fraction == 0.0 {
                            return 1;
                        }
                        let week = (fraction * f64::from(total_weeks)).round() as u32 + 1;
                        return week.clamp(1, total_weeks.max(1));
                    }
                }
                1
            }
        },
    }
}

/// Expand sparse authored weeks into a dense per-week plan.
///
/// Each week takes the latest authored definition at or before it; weeks
/// before the first authored position fall back to the first definition. An
/// empty author list produces a flat default plan.
pub fn interpolate_weeks(
    authored: &[AuthoredWeek],
    total_weeks: u32,
    default_duration_minutes: f64,
) -> Vec<WeekDefinition> {
    if authored.is_empty() {
        return (1..=total_weeks)
            .map(|week| WeekDefinition {
                power_multiplier: 1.0,
                target_rpe: 6.0,
                duration_minutes: default_duration_minutes,
                phase_name: format!("Week {week}"),
            })
            .collect();
    }

    let mut resolved: Vec<(u32, &AuthoredWeek)> = authored
        .iter()
        .map(|week| (resolve_week_position(&week.position, total_weeks), week))
        .collect();
    resolved.sort_by_key(|(position, _)| *position);

    (1..=total_weeks)
        .map(|week_number| {
            let current = resolved
                .iter()
                .take_while(|(position, _)| *position <= week_number)
                .last()
                .map(|(_, definition)| *definition)
                .unwrap_or(resolved[0].1);

            WeekDefinition {
                power_multiplier: current.power_multiplier.unwrap_or(1.0),
                target_rpe: current.target_rpe.unwrap_or(6.0),
                duration_minutes: current.duration_minutes.unwrap_or(default_duration_minutes),
                phase_name: current
                    .phase_name
                    .clone()
                    .unwrap_or_else(|| format!("Week {week_number}")),
            }
        })
        .collect()
}

/// Expand with the standard default session duration.
pub fn interpolate_weeks_default(authored: &[AuthoredWeek], total_weeks: u32) -> Vec<WeekDefinition> {
    interpolate_weeks(authored, total_weeks, DEFAULT_SESSION_DURATION_MINUTES)
}
