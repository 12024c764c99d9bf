//! Physiological training load model.
//!
//! Implements the Performance Management Chart (PMC) model with derived
//! fatigue/readiness scores:
//! - ATL (Acute Training Load): 7-day exponentially weighted moving average
//! - CTL (Chronic Training Load): 42-day exponentially weighted moving average
//! - ACWR (Acute:Chronic Workload Ratio): ATL / CTL, drives fatigue
//! - TSB (Training Stress Balance): CTL - ATL, drives readiness

pub mod model;

pub use model::{session_load, AthleteLoadState, FatigueReadinessScore};
