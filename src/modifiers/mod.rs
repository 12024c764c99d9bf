//! Coach-authored modifier rules and their resolution.
//!
//! Coach modifiers are authored externally (and persisted as JSON), matched
//! against a live fatigue context, deconflicted via priority and mutex
//! groups, and applied to the planned session. The auto-adaptive adjustment
//! is used only when no coach rule matches.

pub mod conditions;
pub mod resolver;
pub mod types;

pub use conditions::{Comparator, Threshold, WeekPosition};
pub use resolver::{ModifierResolver, ResolvedSession};
pub use types::{
    ConditionLogic, FatigueModifier, FlexibleCondition, ModifierAdjustments, ModifierCondition,
    ThresholdPreset,
};
