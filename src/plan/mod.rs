//! Program plan and session boundary types.
//!
//! These are the record shapes the engine consumes from external collaborators
//! (template storage, authoring UI, questionnaire layer) and mutates when a
//! modifier wins. No wire format is owned here.

pub mod interpolate;
pub mod types;

pub use interpolate::{
    interpolate_weeks, interpolate_weeks_default, resolve_week_position, AuthoredPosition,
    AuthoredWeek, WeekCount,
};
pub use types::{
    BlockRole, FatigueContext, PlanSession, SessionBlock, SessionStyle, WeekDefinition,
};
