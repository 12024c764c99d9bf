//! Compiled modifier condition expressions.
//!
//! Coach rules carry comparator and week-position strings (`">50"`,
//! `"33.3%"`, `"late"`). They are parsed once into typed forms at modifier
//! load; re-parsing per evaluation would be wasted work and would scatter the
//! "invalid means non-matching" rule across call sites.

use serde::{Deserialize, Serialize};

/// Half of a week on either side counts as hitting an exact percent position.
const PERCENT_WEEK_TOLERANCE: f64 = 0.5;
/// Upper bound of the "early" program phase.
const EARLY_PROGRESS_MAX: f64 = 0.33;
/// Upper bound of the "mid" program phase.
const MID_PROGRESS_MAX: f64 = 0.66;

/// Comparison operator parsed from an expression string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparator {
    /// Apply the comparison.
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            Comparator::Gt => left > right,
            Comparator::Gte => left >= right,
            Comparator::Lt => left < right,
            Comparator::Lte => left <= right,
        }
    }
}

/// A compiled scalar threshold like `">50"` or `"<=35"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Comparison operator.
    pub comparator: Comparator,
    /// Right-hand value.
    pub value: f64,
}

impl Threshold {
    /// Parse a threshold expression. Returns None for anything malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (comparator, rest) = if let Some(rest) = raw.strip_prefix(">=") {
            (Comparator::Gte, rest)
        } else if let Some(rest) = raw.strip_prefix("<=") {
            (Comparator::Lte, rest)
        } else if let Some(rest) = raw.strip_prefix('>') {
            (Comparator::Gt, rest)
        } else if let Some(rest) = raw.strip_prefix('<') {
            (Comparator::Lt, rest)
        } else {
            return None;
        };

        let value = rest.trim().parse::<f64>().ok()?;
        Some(Self { comparator, value })
    }

    /// Evaluate against a live value.
    pub fn matches(&self, value: f64) -> bool {
        self.comparator.compare(value, self.value)
    }
}

/// Target of a week-position comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekTarget {
    /// Compared against the 1-based week number.
    WeekIndex(f64),
    /// Compared against program progress as a percentage.
    Percent(f64),
}

/// A compiled week-position expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPosition {
    /// Only week 1, regardless of program length.
    First,
    /// Only the final week.
    Last,
    /// Progress at most 0.33.
    Early,
    /// Progress above 0.33 and at most 0.66.
    Mid,
    /// Progress above 0.66.
    Late,
    /// An exact percent position, with half a week of tolerance.
    AtPercent(f64),
    /// A comparison form like `">5"` or `"<33.33%"`.
    Compare(Comparator, WeekTarget),
    /// Unparseable expression; never matches.
    Invalid,
}

impl WeekPosition {
    /// Parse a week-position expression. Malformed input compiles to
    /// `Invalid`, which never matches.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "first" => return WeekPosition::First,
            "last" => return WeekPosition::Last,
            "early" => return WeekPosition::Early,
            "mid" => return WeekPosition::Mid,
            "late" => return WeekPosition::Late,
            _ => {}
        }

        if raw.starts_with('>') || raw.starts_with('<') {
            let percent = raw.ends_with('%');
            let trimmed = raw.strip_suffix('%').unwrap_or(raw);
            if let Some(threshold) = Threshold::parse(trimmed) {
                let target = if percent {
                    WeekTarget::Percent(threshold.value)
                } else {
                    WeekTarget::WeekIndex(threshold.value)
                };
                return WeekPosition::Compare(threshold.comparator, target);
            }
            return WeekPosition::Invalid;
        }

        if let Some(stripped) = raw.strip_suffix('%') {
            if let Ok(percent) = stripped.trim().parse::<f64>() {
                return WeekPosition::AtPercent(percent);
            }
        }

        WeekPosition::Invalid
    }

    /// Evaluate against a week within a program.
    ///
    /// `total_weeks` must be at least 1; progress for a one-week program is 0.
    pub fn matches(&self, week_number: u32, total_weeks: u32) -> bool {
        assert!(total_weeks >= 1, "total_weeks must be at least 1");
        let progress = if total_weeks == 1 {
            0.0
        } else {
            f64::from(week_number - 1) / f64::from(total_weeks - 1)
        };

        match *self {
            WeekPosition::First => week_number == 1,
            WeekPosition::Last => week_number == total_weeks,
            WeekPosition::Early => progress <= EARLY_PROGRESS_MAX,
            WeekPosition::Mid => progress > EARLY_PROGRESS_MAX && progress <= MID_PROGRESS_MAX,
            WeekPosition::Late => progress > MID_PROGRESS_MAX,
            WeekPosition::AtPercent(percent) => {
                let target_week = 1.0 + (percent / 100.0) * f64::from(total_weeks - 1);
                (f64::from(week_number) - target_week).abs() <= PERCENT_WEEK_TOLERANCE
            }
            WeekPosition::Compare(comparator, WeekTarget::WeekIndex(value)) => {
                comparator.compare(f64::from(week_number), value)
            }
            WeekPosition::Compare(comparator, WeekTarget::Percent(value)) => {
                comparator.compare(progress * 100.0, value)
            }
            WeekPosition::Invalid => false,
        }
    }
}
