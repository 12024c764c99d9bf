//! Trajectory simulation and percentile extraction.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::Sender;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::SimulationSettings;
use crate::error::{EngineError, EngineResult};
use crate::load::model::{session_load, AthleteLoadState};
use crate::plan::types::WeekDefinition;
use crate::simulation::percentiles::WeekPercentiles;

/// Sessions per simulated week, inclusive.
const SESSIONS_PER_WEEK_MIN: u32 = 2;
const SESSIONS_PER_WEEK_MAX: u32 = 4;
/// Per-session power noise, ±5%.
const POWER_NOISE: f64 = 0.05;

/// Cancellation flag and optional progress channel for a simulation run.
///
/// Progress is reported as whole percent ticks; cancellation may be triggered
/// from any thread and takes effect at trajectory granularity.
#[derive(Debug, Clone, Default)]
pub struct SimulationControl {
    cancel: Arc<AtomicBool>,
    progress: Option<Sender<u8>>,
}

impl SimulationControl {
    /// Create a control with no progress reporting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a control that reports percent ticks on the given channel.
    pub fn with_progress(progress: Sender<u8>) -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            progress: Some(progress),
        }
    }

    /// Request cancellation of the run.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Result of a simulation run.
///
/// A cancelled run yields no percentiles at all; partial percentiles from an
/// incomplete trajectory count would silently bias the distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// All trajectories completed; one percentile record per plan week.
    Completed(Vec<WeekPercentiles>),
    /// The run was cancelled before completion.
    Cancelled,
}

impl SimulationOutcome {
    /// The percentiles of a completed run.
    pub fn percentiles(&self) -> Option<&[WeekPercentiles]> {
        match self {
            SimulationOutcome::Completed(weeks) => Some(weeks),
            SimulationOutcome::Cancelled => None,
        }
    }
}

/// Monte Carlo percentile simulator.
///
/// For a fixed `(base_power, plan, base_seed, trajectories)` the output is
/// byte-identical across runs and worker counts: every trajectory derives its
/// own RNG stream from the base seed and its index, and samples are sorted
/// before extraction so completion order is irrelevant.
pub struct PercentileSimulator {
    settings: SimulationSettings,
}

impl PercentileSimulator {
    /// Create a simulator with the given settings.
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    /// Create a simulator with default settings.
    pub fn with_defaults() -> Self {
        Self::new(SimulationSettings::default())
    }

    /// Run the simulation for a plan.
    ///
    /// This is the most expensive operation in the engine,
    /// O(trajectories × weeks × 7) load updates.
    pub fn run(
        &self,
        base_power: f64,
        plan: &[WeekDefinition],
        control: &SimulationControl,
    ) -> EngineResult<SimulationOutcome> {
        self.settings.validate()?;
        if plan.is_empty() {
            return Err(EngineError::InvalidInput("plan has no weeks".to_string()));
        }
        if base_power <= 0.0 {
            return Err(EngineError::InvalidInput(
                "base power must be positive".to_string(),
            ));
        }

        let trajectories = self.settings.trajectories;
        let base_seed = self.settings.base_seed;
        let started = Instant::now();
        tracing::info!(trajectories, weeks = plan.len(), "starting percentile simulation");

        let completed = AtomicUsize::new(0);
        let last_percent = AtomicUsize::new(0);

        let simulate_all = || -> Vec<Option<Vec<(u8, u8)>>> {
            (0..trajectories)
                .into_par_iter()
                .map(|index| {
                    if control.is_cancelled() {
                        return None;
                    }
                    let samples = run_trajectory(base_seed, index as u64, base_power, plan);
                    self.report_progress(control, &completed, &last_percent, trajectories);
                    Some(samples)
                })
                .collect()
        };

        let per_trajectory = match self.settings.workers {
            Some(workers) => rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| EngineError::Simulation(e.to_string()))?
                .install(simulate_all),
            None => simulate_all(),
        };

        if control.is_cancelled() || per_trajectory.iter().any(Option::is_none) {
            tracing::info!("percentile simulation cancelled");
            return Ok(SimulationOutcome::Cancelled);
        }

        // Reduce into per-week sample vectors and extract thresholds.
        let weeks = plan.len();
        let mut percentiles = Vec::with_capacity(weeks);
        for week in 0..weeks {
            let mut fatigue = Vec::with_capacity(trajectories);
            let mut readiness = Vec::with_capacity(trajectories);
            for trajectory in per_trajectory.iter().flatten() {
                let (f, r) = trajectory[week];
                fatigue.push(f);
                readiness.push(r);
            }
            percentiles.push(WeekPercentiles::from_samples(&mut fatigue, &mut readiness));
        }

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "percentile simulation complete"
        );
        Ok(SimulationOutcome::Completed(percentiles))
    }

    fn report_progress(
        &self,
        control: &SimulationControl,
        completed: &AtomicUsize,
        last_percent: &AtomicUsize,
        total: usize,
    ) {
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(sender) = &control.progress {
            let percent = (done * 100 / total).min(100);
            let previous = last_percent.fetch_max(percent, Ordering::Relaxed);
            if percent > previous {
                // Receiver may be gone; progress is best-effort.
                let _ = sender.send(percent as u8);
            }
        }
    }
}

/// Run one trajectory and return the end-of-week (fatigue, readiness) pair for
/// every plan week.
///
/// Weekly randomness: 2-4 sessions on randomly chosen distinct weekdays, ±5%
/// power noise and ±1 RPE step per session. Training days are walked in
/// chronological order so the draw sequence is fixed for a given seed.
fn run_trajectory(
    base_seed: u64,
    index: u64,
    base_power: f64,
    plan: &[WeekDefinition],
) -> Vec<(u8, u8)> {
    let mut rng = trajectory_rng(base_seed, index);
    let mut state = AthleteLoadState::seeded();
    let mut week_scores = Vec::with_capacity(plan.len());

    for week in plan {
        let sessions = rng.gen_range(SESSIONS_PER_WEEK_MIN..=SESSIONS_PER_WEEK_MAX) as usize;
        let mut weekdays = [0usize, 1, 2, 3, 4, 5, 6];
        weekdays.shuffle(&mut rng);

        let mut trains = [false; 7];
        for &day in &weekdays[..sessions] {
            trains[day] = true;
        }

        for trains_today in trains {
            let load = if trains_today {
                let planned_power = base_power * week.power_multiplier;
                let actual_power = planned_power * (1.0 + rng.gen_range(-POWER_NOISE..=POWER_NOISE));
                let rpe_step = f64::from(rng.gen_range(-1i32..=1));
                let actual_rpe = (week.target_rpe + rpe_step).clamp(1.0, 10.0);
                session_load(actual_power, base_power, week.duration_minutes, actual_rpe)
            } else {
                0.0
            };
            state.apply_daily_load(load);
        }

        let scores = state.scores();
        week_scores.push((scores.fatigue, scores.readiness));
    }

    week_scores
}

/// Derive the private RNG stream for one trajectory.
fn trajectory_rng(base_seed: u64, index: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(base_seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
