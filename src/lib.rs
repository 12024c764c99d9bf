//! Trainwise - Adaptive Training Load Engine
//!
//! Models an athlete's accumulating training stress and decides, session by
//! session, how much to adjust a prescribed workout. Provides:
//! - an EMA-based load/fatigue/readiness model (ATL/CTL/ACWR/TSB),
//! - a Monte Carlo simulator producing per-week percentile bands of expected
//!   fatigue and readiness for a multi-week program,
//! - a deviation classifier comparing a live athlete state against those bands,
//! - a two-tier modifier resolution engine: coach-authored rules first, with an
//!   automatically computed adjustment as fallback.

pub mod adaptive;
pub mod config;
pub mod error;
pub mod load;
pub mod modifiers;
pub mod plan;
pub mod simulation;

// Re-export commonly used types
pub use adaptive::adjuster::{AutoAdaptiveAdjuster, AutoAdaptiveAdjustment};
pub use adaptive::classifier::{AdaptiveState, DeviationClassifier, DeviationTier};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use load::model::{AthleteLoadState, FatigueReadinessScore};
pub use modifiers::resolver::{ModifierResolver, ResolvedSession};
pub use modifiers::types::FatigueModifier;
pub use plan::types::{FatigueContext, PlanSession, SessionStyle, WeekDefinition};
pub use simulation::percentiles::WeekPercentiles;
pub use simulation::simulator::{PercentileSimulator, SimulationControl, SimulationOutcome};
