//! Coach modifier matching, conflict resolution, and application.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::adaptive::adjuster::AutoAdaptiveAdjustment;
use crate::modifiers::conditions::{Threshold, WeekPosition};
use crate::modifiers::types::{
    ConditionLogic, FatigueModifier, FlexibleCondition, ModifierAdjustments, ModifierCondition,
    ThresholdPreset,
};
use crate::plan::types::{BlockRole, FatigueContext, PlanSession, SessionBlock, SessionStyle};

/// A resolved session: the adjusted plan plus the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSession {
    /// The session after all winning adjustments.
    pub session: PlanSession,
    /// Messages from each winner, in application order.
    pub messages: Vec<String>,
    /// True when the auto-adaptive fallback produced the adjustment.
    pub is_auto_adaptive: bool,
}

/// One flexible-condition field, compiled.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldTest {
    /// Field not authored; does not constrain the match.
    Absent,
    /// Field authored but unparseable; never matches.
    Invalid,
    /// Compiled threshold.
    Compiled(Threshold),
}

impl FieldTest {
    fn compile(raw: Option<&str>) -> Self {
        match raw {
            None => FieldTest::Absent,
            Some(raw) => Threshold::parse(raw)
                .map(FieldTest::Compiled)
                .unwrap_or(FieldTest::Invalid),
        }
    }

    fn is_defined(&self) -> bool {
        !matches!(self, FieldTest::Absent)
    }

    fn matches(&self, value: f64) -> bool {
        match self {
            FieldTest::Absent => false,
            FieldTest::Invalid => false,
            FieldTest::Compiled(threshold) => threshold.matches(value),
        }
    }
}

/// A modifier condition, compiled.
#[derive(Debug, Clone, PartialEq)]
enum CompiledCondition {
    Preset(ThresholdPreset),
    Flexible {
        fatigue: FieldTest,
        readiness: FieldTest,
        logic: ConditionLogic,
    },
}

impl CompiledCondition {
    fn compile(condition: &ModifierCondition) -> Self {
        match condition {
            ModifierCondition::Preset(preset) => CompiledCondition::Preset(*preset),
            ModifierCondition::Flexible(FlexibleCondition {
                fatigue,
                readiness,
                logic,
            }) => CompiledCondition::Flexible {
                fatigue: FieldTest::compile(fatigue.as_deref()),
                readiness: FieldTest::compile(readiness.as_deref()),
                logic: *logic,
            },
        }
    }

    fn matches(&self, context: &FatigueContext) -> bool {
        match self {
            CompiledCondition::Preset(preset) => match preset {
                ThresholdPreset::HighFatigue => context.fatigue_score >= 70,
                ThresholdPreset::VeryHighFatigue => context.fatigue_score >= 85,
                ThresholdPreset::LowReadiness => context.readiness_score <= 40,
                ThresholdPreset::VeryLowReadiness => context.readiness_score <= 25,
                ThresholdPreset::NegativeTsb => context.tsb_value < 0.0,
            },
            CompiledCondition::Flexible {
                fatigue,
                readiness,
                logic,
            } => {
                // A condition with no authored fields never matches; an
                // always-on rule must be expressed deliberately.
                if !fatigue.is_defined() && !readiness.is_defined() {
                    return false;
                }
                let fatigue_match = fatigue.matches(f64::from(context.fatigue_score));
                let readiness_match = readiness.matches(f64::from(context.readiness_score));
                match logic {
                    ConditionLogic::Or => fatigue_match || readiness_match,
                    ConditionLogic::And => {
                        (!fatigue.is_defined() || fatigue_match)
                            && (!readiness.is_defined() || readiness_match)
                    }
                }
            }
        }
    }
}

/// A coach modifier compiled for repeated evaluation.
#[derive(Debug, Clone)]
struct CompiledModifier {
    priority: i32,
    mutex_group: Option<String>,
    mutex_rank: i32,
    condition: CompiledCondition,
    phase: Option<String>,
    phase_name: Option<String>,
    week_position: Option<WeekPosition>,
    session_type: Option<SessionStyle>,
    adjustments: ModifierAdjustments,
}

impl CompiledModifier {
    fn compile(modifier: &FatigueModifier) -> Self {
        Self {
            priority: modifier.priority,
            mutex_group: modifier.mutex_group.clone(),
            mutex_rank: modifier.mutex_rank.unwrap_or(0),
            condition: CompiledCondition::compile(&modifier.condition),
            phase: modifier.phase.clone(),
            phase_name: modifier.phase_name.clone(),
            week_position: modifier.week_position.as_deref().map(WeekPosition::parse),
            session_type: modifier.session_type,
            adjustments: modifier.adjustments.clone(),
        }
    }

    /// A modifier is a candidate only if every authored filter holds.
    fn is_candidate(&self, session: &PlanSession, context: &FatigueContext) -> bool {
        if !self.condition.matches(context) {
            return false;
        }
        if let Some(phase) = &self.phase {
            match &context.phase {
                Some(live) if live.eq_ignore_ascii_case(phase) => {}
                _ => return false,
            }
        }
        if let Some(phase_name) = &self.phase_name {
            match &context.phase_name {
                Some(live) if live.eq_ignore_ascii_case(phase_name) => {}
                _ => return false,
            }
        }
        if let Some(position) = &self.week_position {
            if !position.matches(context.week_number, context.total_weeks) {
                return false;
            }
        }
        if let Some(session_type) = self.session_type {
            if session_type != session.style {
                return false;
            }
        }
        true
    }
}

/// Resolves coach modifiers against live context and applies the winners.
///
/// Pure and synchronous; safe to call concurrently per session.
pub struct ModifierResolver {
    compiled: Vec<CompiledModifier>,
}

impl ModifierResolver {
    /// Compile a coach rule set. Expression strings are parsed once here.
    pub fn new(modifiers: &[FatigueModifier]) -> Self {
        Self {
            compiled: modifiers.iter().map(CompiledModifier::compile).collect(),
        }
    }

    /// Resolve one session against the live context.
    ///
    /// Coach rules always take precedence: the auto-adaptive fallback is
    /// applied only when zero coach modifiers matched at all.
    pub fn resolve(
        &self,
        session: &PlanSession,
        context: &FatigueContext,
        fallback: Option<&AutoAdaptiveAdjustment>,
    ) -> ResolvedSession {
        let candidates: Vec<&CompiledModifier> = self
            .compiled
            .iter()
            .filter(|modifier| modifier.is_candidate(session, context))
            .collect();

        let mut adjusted = session.clone();

        if candidates.is_empty() {
            if let Some(auto) = fallback.filter(|auto| auto.is_active) {
                apply_auto_adjustment(&mut adjusted, auto);
                tracing::debug!(state = %auto.state, "auto-adaptive fallback applied");
                return ResolvedSession {
                    session: adjusted,
                    messages: vec![auto.message.clone()],
                    is_auto_adaptive: true,
                };
            }
            return ResolvedSession {
                session: adjusted,
                messages: Vec::new(),
                is_auto_adaptive: false,
            };
        }

        let winners = select_winners(candidates);
        tracing::debug!(winners = winners.len(), "coach modifiers resolved");

        let mut messages = Vec::new();
        for winner in winners {
            apply_adjustments(&mut adjusted, &winner.adjustments);
            if let Some(message) = &winner.adjustments.message {
                messages.push(message.clone());
            }
        }

        ResolvedSession {
            session: adjusted,
            messages,
            is_auto_adaptive: false,
        }
    }
}

/// Two-phase winner selection over matched candidates.
///
/// Candidates are sorted by `(mutex_rank desc, priority asc)` and walked in
/// order: the first candidate seen for each mutex group claims that group, and
/// the first candidate without a group becomes the single global winner.
/// The returned order is the application order.
fn select_winners(mut candidates: Vec<&CompiledModifier>) -> Vec<&CompiledModifier> {
    candidates.sort_by(|a, b| {
        b.mutex_rank
            .cmp(&a.mutex_rank)
            .then(a.priority.cmp(&b.priority))
    });

    let mut claimed_groups: HashSet<&str> = HashSet::new();
    let mut global_taken = false;
    let mut winners = Vec::new();

    for candidate in candidates {
        match &candidate.mutex_group {
            Some(group) => {
                if claimed_groups.insert(group.as_str()) {
                    winners.push(candidate);
                }
            }
            None => {
                if !global_taken {
                    global_taken = true;
                    winners.push(candidate);
                }
            }
        }
    }

    winners
}

/// Apply one winner's adjustments to the session, cumulatively.
fn apply_adjustments(session: &mut PlanSession, adjustments: &ModifierAdjustments) {
    if let Some(multiplier) = adjustments.power_multiplier {
        session.planned_power = scale_power(session.planned_power, multiplier);
    }
    if let Some(delta) = adjustments.rpe_adjust {
        session.target_rpe = (session.target_rpe + delta).clamp(1.0, 10.0);
    }
    if let Some(multiplier) = adjustments.rest_multiplier {
        scale_rest(session, multiplier);
    }
    if let Some(multiplier) = adjustments.duration_multiplier {
        scale_duration(session, multiplier);
    }
    if let Some(multiplier) = adjustments.volume_multiplier {
        scale_volume(session, multiplier);
    }
    session.recompute_duration_from_blocks();
}

/// Apply the auto-adaptive fallback with the same field semantics as coach
/// adjustments, except warmup and cooldown blocks are skipped.
fn apply_auto_adjustment(session: &mut PlanSession, auto: &AutoAdaptiveAdjustment) {
    session.target_rpe = (session.target_rpe + auto.rpe_adjust).clamp(1.0, 10.0);

    if session.style == SessionStyle::Custom {
        if let Some(block_adjustments) = &auto.block_adjustments {
            for adjustment in block_adjustments {
                if matches!(adjustment.role, BlockRole::Warmup | BlockRole::Cooldown) {
                    continue;
                }
                let Some(block) = session.blocks.get_mut(adjustment.block_index) else {
                    continue;
                };
                block.power_multiplier *= adjustment.power_multiplier;
                if let Some(multiplier) = adjustment.rest_multiplier {
                    scale_block_rest(block, multiplier);
                }
                if let Some(multiplier) = adjustment.duration_multiplier {
                    block.duration_minutes *= multiplier;
                }
            }
        }
        session.recompute_duration_from_blocks();
        return;
    }

    session.planned_power = scale_power(session.planned_power, auto.power_multiplier);
    if let Some(multiplier) = auto.rest_multiplier {
        scale_rest(session, multiplier);
    }
    if let Some(multiplier) = auto.duration_multiplier {
        scale_duration(session, multiplier);
    }
}

fn scale_power(power: u16, multiplier: f64) -> u16 {
    (f64::from(power) * multiplier).round() as u16
}

/// Scale rest seconds on interval sessions and interval blocks.
fn scale_rest(session: &mut PlanSession, multiplier: f64) {
    match session.style {
        SessionStyle::Intervals => {
            let rest = session.rest_seconds_or_default();
            session.rest_duration_seconds =
                Some((f64::from(rest) * multiplier).round() as u32);
            recompute_interval_duration(session);
        }
        SessionStyle::Custom => {
            for block in &mut session.blocks {
                if block.style == SessionStyle::Intervals {
                    scale_block_rest(block, multiplier);
                }
            }
        }
        SessionStyle::SteadyState => {}
    }
}

fn scale_block_rest(block: &mut SessionBlock, multiplier: f64) {
    let rest = block
        .rest_duration_seconds
        .unwrap_or(crate::plan::types::DEFAULT_REST_SECONDS);
    let scaled = (f64::from(rest) * multiplier).round() as u32;
    block.rest_duration_seconds = Some(scaled);
    recompute_block_duration(block);
}

/// Scale steady-state duration on the session or its steady blocks.
fn scale_duration(session: &mut PlanSession, multiplier: f64) {
    match session.style {
        SessionStyle::SteadyState => session.duration_minutes *= multiplier,
        SessionStyle::Custom => {
            for block in &mut session.blocks {
                if block.style == SessionStyle::SteadyState {
                    block.duration_minutes *= multiplier;
                }
            }
        }
        SessionStyle::Intervals => {}
    }
}

/// Scale volume: interval cycle count (rounded, duration recomputed from
/// cycles) or steady duration (unrounded).
fn scale_volume(session: &mut PlanSession, multiplier: f64) {
    match session.style {
        SessionStyle::Intervals => {
            let cycles = session.cycles_or_default();
            let scaled = (f64::from(cycles) * multiplier).round().max(1.0) as u32;
            session.cycles = Some(scaled);
            recompute_interval_duration(session);
        }
        SessionStyle::SteadyState => session.duration_minutes *= multiplier,
        SessionStyle::Custom => {
            for block in &mut session.blocks {
                match block.style {
                    SessionStyle::Intervals => {
                        let cycles = block.cycles.unwrap_or(crate::plan::types::DEFAULT_CYCLES);
                        let scaled = (f64::from(cycles) * multiplier).round().max(1.0) as u32;
                        block.cycles = Some(scaled);
                        recompute_block_duration(block);
                    }
                    SessionStyle::SteadyState => block.duration_minutes *= multiplier,
                    SessionStyle::Custom => {}
                }
            }
        }
    }
}

/// Recompute an interval session's duration from its cycle structure, when
/// the work duration is known.
fn recompute_interval_duration(session: &mut PlanSession) {
    if let Some(work) = session.work_duration_seconds {
        let cycles = session.cycles_or_default();
        let rest = session.rest_seconds_or_default();
        session.duration_minutes = f64::from(cycles * (work + rest)) / 60.0;
    }
}

fn recompute_block_duration(block: &mut SessionBlock) {
    if let Some(work) = block.work_duration_seconds {
        let cycles = block.cycles.unwrap_or(crate::plan::types::DEFAULT_CYCLES);
        let rest = block
            .rest_duration_seconds
            .unwrap_or(crate::plan::types::DEFAULT_REST_SECONDS);
        block.duration_minutes = f64::from(cycles * (work + rest)) / 60.0;
    }
}
