//! Session load formula and EMA load integration.

use serde::{Deserialize, Serialize};

/// ATL window in days.
pub const ATL_DAYS: f64 = 7.0;
/// CTL window in days.
pub const CTL_DAYS: f64 = 42.0;
/// ATL smoothing factor, 2 / (N + 1).
pub const ATL_ALPHA: f64 = 2.0 / (ATL_DAYS + 1.0);
/// CTL smoothing factor, 2 / (N + 1).
pub const CTL_ALPHA: f64 = 2.0 / (CTL_DAYS + 1.0);

/// ACWR value at which the fatigue logistic curve crosses 50.
pub const FATIGUE_MIDPOINT: f64 = 1.15;
/// Steepness of the fatigue logistic curve.
pub const FATIGUE_STEEPNESS: f64 = 4.5;
/// TSB value at which readiness peaks.
pub const READINESS_OPTIMAL_TSB: f64 = 20.0;
/// Width of the readiness Gaussian.
pub const READINESS_WIDTH: f64 = 1250.0;

/// Overall scale applied to the session load product.
const LOAD_SCALE: f64 = 0.3;
/// Power ratio clamp range.
const POWER_RATIO_MIN: f64 = 0.25;
const POWER_RATIO_MAX: f64 = 4.0;

/// Seed values for a fresh athlete state. Small positive values so derived
/// ratios are defined from day one.
const SEED_ATL: f64 = 9.0;
const SEED_CTL: f64 = 10.0;

/// Calculate the scalar load of a single session.
///
/// `Load = RPE^1.5 × Duration^0.75 × PowerRatio^0.5 × 0.3`
///
/// High RPE and long duration are rewarded super-linearly while extreme power
/// ratios are damped, reflecting perceived training stress rather than raw
/// work. The caller guarantees `duration_minutes >= 0` and `rpe` in 1..=10.
pub fn session_load(power: f64, base_power: f64, duration_minutes: f64, rpe: f64) -> f64 {
    let ratio = (power / base_power).clamp(POWER_RATIO_MIN, POWER_RATIO_MAX);
    rpe.powf(1.5) * duration_minutes.powf(0.75) * ratio.sqrt() * LOAD_SCALE
}

/// Fatigue and readiness scores derived from an athlete load state.
///
/// Always recomputed at read time, never mutated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueReadinessScore {
    /// Fatigue score, 0-100. Higher is worse.
    pub fatigue: u8,
    /// Readiness score, 0-100. Higher is better.
    pub readiness: u8,
}

/// Accumulated acute and chronic training load for one athlete.
///
/// An explicit value threaded through calls; each simulated trajectory or live
/// tracking session owns its own instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AthleteLoadState {
    /// Acute Training Load (7-day EWMA).
    pub atl: f64,
    /// Chronic Training Load (42-day EWMA).
    pub ctl: f64,
}

impl Default for AthleteLoadState {
    fn default() -> Self {
        Self::seeded()
    }
}

impl AthleteLoadState {
    /// Create a state with the standard seed values (atl=9, ctl=10).
    pub fn seeded() -> Self {
        Self {
            atl: SEED_ATL,
            ctl: SEED_CTL,
        }
    }

    /// Create a state with explicit values.
    pub fn new(atl: f64, ctl: f64) -> Self {
        Self { atl, ctl }
    }

    /// Integrate one day's total load into both EMAs.
    ///
    /// Call exactly once per day; pass 0.0 for rest days.
    pub fn apply_daily_load(&mut self, load: f64) {
        self.atl = self.atl * (1.0 - ATL_ALPHA) + load * ATL_ALPHA;
        self.ctl = self.ctl * (1.0 - CTL_ALPHA) + load * CTL_ALPHA;
    }

    /// Acute:Chronic Workload Ratio.
    pub fn acwr(&self) -> f64 {
        self.atl / self.ctl.max(0.001)
    }

    /// Training Stress Balance.
    pub fn tsb(&self) -> f64 {
        self.ctl - self.atl
    }

    /// Derive the current fatigue/readiness scores.
    pub fn scores(&self) -> FatigueReadinessScore {
        FatigueReadinessScore {
            fatigue: self.fatigue_score(),
            readiness: readiness_score(self.tsb()),
        }
    }

    /// Fatigue score: logistic curve on ACWR centered at 1.15.
    ///
    /// With no chronic base yet, falls back to scaled ATL so early sessions
    /// still register.
    fn fatigue_score(&self) -> u8 {
        if self.ctl <= 0.001 {
            return ((self.atl * 2.0).round() as u32).min(100) as u8;
        }
        let score = 100.0 / (1.0 + (-FATIGUE_STEEPNESS * (self.acwr() - FATIGUE_MIDPOINT)).exp());
        score.round().clamp(0.0, 100.0) as u8
    }
}

/// Readiness score: Gaussian on TSB centered at +20 (the classically "fresh"
/// zone), falling off symmetrically for over-fatigued and over-tapered states.
pub fn readiness_score(tsb: f64) -> u8 {
    let exponent = -(tsb - READINESS_OPTIMAL_TSB).powi(2) / READINESS_WIDTH;
    let score = 100.0 * exponent.exp();
    score.round().clamp(0.0, 100.0) as u8
}
