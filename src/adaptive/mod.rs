//! Live deviation classification and auto-adaptive adjustment.
//!
//! Compares a live fatigue/readiness reading against a week's simulated
//! percentile bands, names the resulting adaptive state, and computes the
//! automatic adjustment applied when no coach rule matches.

pub mod adjuster;
pub mod classifier;

pub use adjuster::{AutoAdaptiveAdjuster, AutoAdaptiveAdjustment, BlockAdjustment};
pub use classifier::{
    AdaptiveState, Deviation, DeviationClassifier, DeviationTier, Direction, StateClassification,
};
