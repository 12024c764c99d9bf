//! Integration tests for coach modifier resolution.
//!
//! Coach rules arrive as JSON from the authoring layer. These tests exercise
//! the full path: deserialize a rule set, compile it once, resolve sessions
//! against live contexts, and check precedence over the auto-adaptive
//! fallback.

use trainwise::modifiers::{FatigueModifier, ModifierResolver};
use trainwise::plan::types::{FatigueContext, PlanSession, SessionBlock, SessionStyle};
use trainwise::simulation::percentiles::{MetricBands, WeekPercentiles};
use trainwise::{AutoAdaptiveAdjuster, FatigueReadinessScore};

fn coach_rules() -> Vec<FatigueModifier> {
    serde_json::from_str(
        r#"[
            {
                "condition": { "fatigue": ">=85" },
                "priority": 1,
                "mutexGroup": "intensity",
                "adjustments": {
                    "powerMultiplier": 0.8,
                    "rpeAdjust": -2,
                    "message": "Very high fatigue: major back-off"
                }
            },
            {
                "condition": { "fatigue": ">=70" },
                "priority": 5,
                "mutexGroup": "intensity",
                "adjustments": {
                    "powerMultiplier": 0.9,
                    "message": "High fatigue: ease intensity"
                }
            },
            {
                "condition": { "readiness": "<30" },
                "priority": 2,
                "mutexGroup": "volume",
                "adjustments": {
                    "volumeMultiplier": 0.75,
                    "message": "Low readiness: trim volume"
                }
            },
            {
                "condition": "negative_tsb",
                "weekPosition": "late",
                "priority": 3,
                "adjustments": {
                    "restMultiplier": 1.2,
                    "message": "Late-program hole: more rest"
                }
            }
        ]"#,
    )
    .expect("rule set should deserialize")
}

fn context(fatigue: u8, readiness: u8, tsb: f64, week: u32, total: u32) -> FatigueContext {
    FatigueContext {
        fatigue_score: fatigue,
        readiness_score: readiness,
        tsb_value: tsb,
        week_number: week,
        total_weeks: total,
        phase: None,
        phase_name: None,
    }
}

fn bands() -> WeekPercentiles {
    let b = MetricBands {
        p15: 20,
        p25: 30,
        p35: 40,
        p65: 60,
        p75: 70,
        p85: 80,
    };
    WeekPercentiles::from_bands(b, b)
}

#[test]
fn test_one_winner_per_mutex_group_plus_global() {
    let resolver = ModifierResolver::new(&coach_rules());
    let session = PlanSession::intervals(250, 8.0, 10, 60, 30);

    // Fatigue 88 matches both intensity rules; priority 1 wins the group.
    // Readiness 25 wins the volume group; negative TSB late wins globally.
    let ctx = context(88, 25, -5.0, 8, 8);
    let resolved = resolver.resolve(&session, &ctx, None);

    assert_eq!(resolved.messages.len(), 3);
    assert!(resolved
        .messages
        .contains(&"Very high fatigue: major back-off".to_string()));
    assert!(!resolved
        .messages
        .contains(&"High fatigue: ease intensity".to_string()));
    assert!(resolved
        .messages
        .contains(&"Low readiness: trim volume".to_string()));
    assert!(resolved
        .messages
        .contains(&"Late-program hole: more rest".to_string()));
    assert!(!resolved.is_auto_adaptive);

    // All three winners applied: power 250 * 0.8 = 200, rpe 8 - 2 = 6,
    // cycles 10 * 0.75 = 8 (rounded), rest 30 * 1.2 = 36.
    assert_eq!(resolved.session.planned_power, 200);
    assert_eq!(resolved.session.target_rpe, 6.0);
    assert_eq!(resolved.session.cycles, Some(8));
    assert_eq!(resolved.session.rest_duration_seconds, Some(36));
}

#[test]
fn test_week_position_gates_the_global_rule() {
    let resolver = ModifierResolver::new(&coach_rules());
    let session = PlanSession::intervals(250, 8.0, 10, 60, 30);

    // Same hole, but early in the program: the "late" rule stays out.
    let ctx = context(40, 60, -5.0, 2, 8);
    let resolved = resolver.resolve(&session, &ctx, None);
    assert!(resolved.messages.is_empty());

    let late = context(40, 60, -5.0, 7, 8);
    let resolved = resolver.resolve(&session, &late, None);
    assert_eq!(
        resolved.messages,
        vec!["Late-program hole: more rest".to_string()]
    );
}

#[test]
fn test_coach_rule_preempts_auto_adjustment() {
    let resolver = ModifierResolver::new(&coach_rules());
    let session = PlanSession::intervals(250, 8.0, 10, 60, 30);
    let scores = FatigueReadinessScore {
        fatigue: 88,
        readiness: 15,
    };
    let auto = AutoAdaptiveAdjuster::evaluate(scores, &bands(), &session);
    assert!(auto.is_active);

    let ctx = context(88, 15, -20.0, 3, 8);
    let resolved = resolver.resolve(&session, &ctx, Some(&auto));

    // The coach's 0.8 multiplier applies, not the auto table's value, and the
    // low-readiness volume rule fires alongside it.
    assert!(!resolved.is_auto_adaptive);
    assert_eq!(resolved.session.planned_power, 200);
    assert_eq!(resolved.session.cycles, Some(8));
}

#[test]
fn test_auto_fallback_when_no_rule_matches() {
    let resolver = ModifierResolver::new(&coach_rules());
    let session = PlanSession::steady_state(220, 6.0, 40.0);

    // Readiness is low against the bands, but no coach rule covers it:
    // fatigue is under 70, readiness over 30, TSB positive.
    let scores = FatigueReadinessScore {
        fatigue: 50,
        readiness: 35,
    };
    let auto = AutoAdaptiveAdjuster::evaluate(scores, &bands(), &session);
    assert!(auto.is_active); // Tired state

    let ctx = context(50, 35, 2.0, 3, 8);
    let resolved = resolver.resolve(&session, &ctx, Some(&auto));

    assert!(resolved.is_auto_adaptive);
    assert!(resolved.session.planned_power < 220);
    assert!(resolved.session.duration_minutes < 40.0);
    assert_eq!(resolved.messages, vec![auto.message]);
}

#[test]
fn test_auto_fallback_protects_warmup_and_cooldown_blocks() {
    let resolver = ModifierResolver::new(&[]);
    let session = PlanSession::custom(
        220,
        7.0,
        vec![
            SessionBlock::steady(0.6, 10.0),
            SessionBlock::intervals(1.1, 8, 45, 45),
            SessionBlock::steady(0.65, 5.0),
        ],
    );
    let scores = FatigueReadinessScore {
        fatigue: 90,
        readiness: 10,
    };
    let auto = AutoAdaptiveAdjuster::evaluate(scores, &bands(), &session);

    let ctx = context(90, 10, -25.0, 4, 8);
    let resolved = resolver.resolve(&session, &ctx, Some(&auto));

    assert!(resolved.is_auto_adaptive);
    let blocks = &resolved.session.blocks;
    // Warmup and cooldown untouched; the main interval block scaled down and
    // its rest extended.
    assert_eq!(blocks[0].power_multiplier, 0.6);
    assert_eq!(blocks[2].power_multiplier, 0.65);
    assert!(blocks[1].power_multiplier < 1.1);
    assert!(blocks[1].rest_duration_seconds.unwrap() > 45);
    // Longer rests grow the session.
    assert!(resolved.session.duration_minutes > session.duration_minutes);
}

#[test]
fn test_session_type_scoped_rule() {
    let rules: Vec<FatigueModifier> = serde_json::from_str(
        r#"[{
            "condition": { "fatigue": ">60" },
            "sessionType": "steady_state",
            "priority": 1,
            "adjustments": { "durationMultiplier": 0.9, "message": "Shorter steady ride" }
        }]"#,
    )
    .unwrap();
    let resolver = ModifierResolver::new(&rules);
    let ctx = context(70, 50, 0.0, 3, 8);

    let steady = PlanSession::steady_state(220, 6.0, 40.0);
    let resolved = resolver.resolve(&steady, &ctx, None);
    assert!((resolved.session.duration_minutes - 36.0).abs() < 1e-9);

    let intervals = PlanSession::intervals(250, 8.0, 10, 60, 30);
    let resolved = resolver.resolve(&intervals, &ctx, None);
    assert_eq!(resolved.session, intervals);
    assert!(resolved.messages.is_empty());
}

#[test]
fn test_invalid_expressions_disable_the_rule_not_the_engine() {
    let rules: Vec<FatigueModifier> = serde_json::from_str(
        r#"[
            {
                "condition": { "fatigue": "way too much" },
                "priority": 1,
                "adjustments": { "powerMultiplier": 0.5, "message": "never fires" }
            },
            {
                "condition": { "fatigue": ">60" },
                "weekPosition": "whenever",
                "priority": 2,
                "adjustments": { "powerMultiplier": 0.5, "message": "never fires either" }
            },
            {
                "condition": { "fatigue": ">60" },
                "priority": 3,
                "adjustments": { "powerMultiplier": 0.9, "message": "fires" }
            }
        ]"#,
    )
    .unwrap();
    let resolver = ModifierResolver::new(&rules);
    let session = PlanSession::steady_state(220, 6.0, 40.0);

    let resolved = resolver.resolve(&session, &context(70, 50, 0.0, 3, 8), None);
    assert_eq!(resolved.messages, vec!["fires".to_string()]);
    assert_eq!(resolved.session.planned_power, 198);
}
