//! Integration tests for the complete adaptive pipeline.
//!
//! Tests the end-to-end flow:
//! 1. Expand a sparse authored template into a dense week plan
//! 2. Simulate the plan into per-week percentile bands
//! 3. Cache the bands by (template, week count)
//! 4. Classify a live reading against the simulated expectations
//! 5. Compute the auto-adaptive adjustment
//! 6. Resolve the session with the adjustment as fallback

use trainwise::config::SimulationSettings;
use trainwise::load::model::AthleteLoadState;
use trainwise::modifiers::ModifierResolver;
use trainwise::plan::interpolate::{interpolate_weeks_default, AuthoredPosition, AuthoredWeek};
use trainwise::plan::types::{FatigueContext, PlanSession};
use trainwise::simulation::cache::{PercentileCache, PercentileKey};
use trainwise::{
    AdaptiveState, AutoAdaptiveAdjuster, DeviationClassifier, FatigueReadinessScore,
    PercentileSimulator, SimulationControl, SimulationOutcome, WeekPercentiles,
};
use uuid::Uuid;

/// Wire up log output for `RUST_LOG=debug cargo test`.
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// A classic 8-week progression: base, build, taper.
fn authored_template() -> Vec<AuthoredWeek> {
    let week = |position, power, rpe, phase: &str| AuthoredWeek {
        position,
        phase_name: Some(phase.to_string()),
        power_multiplier: Some(power),
        target_rpe: Some(rpe),
        duration_minutes: Some(40.0),
    };
    vec![
        week(AuthoredPosition::Anchor("first".into()), 0.8, 5.0, "Base"),
        week(AuthoredPosition::Week(4), 1.0, 7.0, "Build"),
        week(AuthoredPosition::Anchor("last".into()), 0.7, 4.0, "Taper"),
    ]
}

fn simulate(weeks: u32) -> Vec<WeekPercentiles> {
    init_tracing();
    let plan = interpolate_weeks_default(&authored_template(), weeks);
    let simulator = PercentileSimulator::new(SimulationSettings {
        trajectories: 400,
        base_seed: 2024,
        workers: None,
    });
    let outcome = simulator
        .run(220.0, &plan, &SimulationControl::new())
        .expect("simulation should run");
    match outcome {
        SimulationOutcome::Completed(weeks) => weeks,
        SimulationOutcome::Cancelled => panic!("run was not cancelled"),
    }
}

#[test]
fn test_template_simulates_into_one_band_row_per_week() {
    let bands = simulate(8);
    assert_eq!(bands.len(), 8);
    for week in &bands {
        assert!(week.fatigue_bands().is_monotonic());
        assert!(week.readiness_bands().is_monotonic());
    }
}

#[test]
fn test_build_weeks_expect_more_fatigue_than_taper() {
    let bands = simulate(8);
    // Week 6 sits mid-build at full power; week 8 is the taper.
    assert!(
        bands[5].fatigue_p65 > bands[7].fatigue_p65,
        "build {} vs taper {}",
        bands[5].fatigue_p65,
        bands[7].fatigue_p65
    );
}

#[test]
fn test_cached_bands_survive_resimulation() {
    let template = Uuid::new_v4();
    let mut cache = PercentileCache::new();

    let key = PercentileKey::new(template, 8);
    cache.insert(key, simulate(8));
    let held = cache.get(&key).expect("cached");

    // A replacement table does not disturb the held reference.
    cache.insert(key, simulate(8));
    assert_eq!(held.len(), 8);
    assert!(cache.contains(&key));
}

#[test]
fn test_overreached_athlete_is_detected_and_backed_off() {
    let bands = simulate(8);
    let week = &bands[4];

    // An acute one-week spike on a cold base: ACWR well past 2, which no
    // planned trajectory produces.
    let mut state = AthleteLoadState::seeded();
    for _ in 0..7 {
        state.apply_daily_load(100.0);
    }
    let scores = state.scores();
    assert!(scores.fatigue >= week.fatigue_p85);

    let classification = DeviationClassifier::classify(scores.fatigue, scores.readiness, week);
    assert!(matches!(
        classification.state,
        AdaptiveState::Critical | AdaptiveState::Stressed
    ));

    let session = PlanSession::intervals(240, 8.0, 10, 60, 30);
    let adjustment = AutoAdaptiveAdjuster::evaluate(scores, week, &session);
    assert!(adjustment.is_active);
    assert!(adjustment.power_multiplier < 1.0);
    assert!(adjustment.rest_multiplier.expect("interval session") > 1.0);
}

#[test]
fn test_fallback_adjustment_lands_on_resolved_session() {
    let bands = simulate(8);
    let week = &bands[4];
    let session = PlanSession::intervals(240, 8.0, 10, 60, 30);

    // Deep in the hole, with no coach rules authored at all.
    let scores = FatigueReadinessScore {
        fatigue: (week.fatigue_p85).saturating_add(10).min(100),
        readiness: week.readiness_p15.saturating_sub(10),
    };
    let adjustment = AutoAdaptiveAdjuster::evaluate(scores, week, &session);
    assert!(adjustment.is_active);

    let context = FatigueContext {
        fatigue_score: scores.fatigue,
        readiness_score: scores.readiness,
        tsb_value: -15.0,
        week_number: 5,
        total_weeks: 8,
        phase: None,
        phase_name: Some("Build".to_string()),
    };
    let resolver = ModifierResolver::new(&[]);
    let resolved = resolver.resolve(&session, &context, Some(&adjustment));

    assert!(resolved.is_auto_adaptive);
    assert!(resolved.session.planned_power < session.planned_power);
    assert!(resolved.session.target_rpe < session.target_rpe);
    assert_eq!(resolved.messages, vec![adjustment.message.clone()]);
}

#[test]
fn test_on_track_athlete_is_left_alone() {
    let bands = simulate(8);
    let week = &bands[4];
    let session = PlanSession::steady_state(220, 6.0, 40.0);

    // A reading inside the normal corridor on both metrics.
    let scores = FatigueReadinessScore {
        fatigue: (week.fatigue_p35 + week.fatigue_p65) / 2,
        readiness: (week.readiness_p35 + week.readiness_p65) / 2,
    };
    let adjustment = AutoAdaptiveAdjuster::evaluate(scores, week, &session);
    assert!(!adjustment.is_active);

    let context = FatigueContext {
        fatigue_score: scores.fatigue,
        readiness_score: scores.readiness,
        tsb_value: 5.0,
        week_number: 5,
        total_weeks: 8,
        phase: None,
        phase_name: Some("Build".to_string()),
    };
    let resolved = ModifierResolver::new(&[]).resolve(&session, &context, Some(&adjustment));

    assert!(!resolved.is_auto_adaptive);
    assert_eq!(resolved.session, session);
    assert!(resolved.messages.is_empty());
}
