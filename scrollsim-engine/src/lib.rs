//! Scroll Enhancement Simulation Engine
//!
//! Estimates, by repeated sampling, how items fare when a fixed plan of
//! enhancement scrolls is applied to their slots: how many are destroyed,
//! how ability is distributed among survivors, and how many clear a threshold.
//! This crate holds the sampling core without any CLI or rendering concerns.

pub mod attempt;
pub mod collector;
pub mod config;
pub mod numbers;
pub mod rng;
pub mod run;
pub mod scroll;
pub mod summary;

// Re-export commonly used types
pub use attempt::{AttemptOutcome, DESTROY_ON_FAILURE_CHANCE, DrawPolicy, simulate_attempt};
pub use collector::AggregationCollector;
pub use config::{ConfigError, ScrollUsage, SimulationConfig, SimulationConfigBuilder};
pub use rng::{RandomSource, ScriptedSource, StreamSource};
pub use run::{
    CancelToken, DEFAULT_BATCH_SIZE, Execution, RunError, RunOptions, collect, run_trials,
    simulate,
};
pub use scroll::{ScrollCatalog, ScrollDefinition};
pub use summary::{AbilityPoint, ResultSummary, SuccessBucket};
