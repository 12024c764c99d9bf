//! Monte Carlo percentile simulation.
//!
//! Runs many independent randomized trajectories of a weekly plan through the
//! load model to build an empirical distribution of week-end fatigue and
//! readiness, then extracts per-week percentile thresholds. Trajectories are
//! embarrassingly parallel: each owns its load state and its seeded RNG
//! stream, so worker count and completion order never change the output.

pub mod cache;
pub mod percentiles;
pub mod simulator;

pub use cache::{PercentileCache, PercentileKey};
pub use percentiles::{MetricBands, WeekPercentiles};
pub use simulator::{PercentileSimulator, SimulationControl, SimulationOutcome};
