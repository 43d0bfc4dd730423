//! Trial loop drivers.
//!
//! Seeded runs are cut into fixed-size batches. Each batch owns a private
//! collector and a private substream, so the result for a given seed does not
//! depend on whether batches run one after another or on the rayon pool.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use thiserror::Error;

use crate::attempt::simulate_attempt;
use crate::collector::AggregationCollector;
use crate::config::SimulationConfig;
use crate::rng::{RandomSource, StreamSource};
use crate::summary::ResultSummary;

/// Trials per batch when [`RunOptions::batch_size`] is left at zero.
pub const DEFAULT_BATCH_SIZE: u64 = 4096;

/// Errors raised while driving the trial loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("run cancelled after {completed} of {requested} trials")]
    Cancelled { completed: u64, requested: u64 },
}

/// How batches are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Execution {
    #[default]
    Sequential,
    /// Batches run on the rayon pool; falls back to sequential without the `parallel` feature.
    Parallel,
}

/// Cooperative cancellation flag, checked between trials.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub execution: Execution,
    pub batch_size: u64,
    pub cancel: Option<CancelToken>,
}

impl RunOptions {
    #[must_use]
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    const fn effective_batch_size(&self) -> u64 {
        if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Run every trial of `config` against a single caller-supplied source.
pub fn run_trials<R>(config: &SimulationConfig, source: &mut R) -> AggregationCollector
where
    R: RandomSource + ?Sized,
{
    let mut collector = AggregationCollector::new(config.slot_count());
    for _ in 0..config.trial_count() {
        collector.record(simulate_attempt(config, source));
    }
    collector
}

/// Run a seeded simulation and summarize it.
///
/// # Errors
///
/// Returns [`RunError::Cancelled`] if the cancel token fires before every trial ran.
pub fn simulate(
    config: &SimulationConfig,
    seed: u64,
    options: &RunOptions,
) -> Result<ResultSummary, RunError> {
    let collector = collect(config, seed, options)?;
    Ok(ResultSummary::from_run(&collector, config))
}

/// Run a seeded simulation and return the merged collector.
///
/// # Errors
///
/// Returns [`RunError::Cancelled`] if the cancel token fires before every trial ran.
pub fn collect(
    config: &SimulationConfig,
    seed: u64,
    options: &RunOptions,
) -> Result<AggregationCollector, RunError> {
    let requested = config.trial_count();
    let plan = plan_batches(requested, options.effective_batch_size());
    info!(
        "simulating {requested} trials in {} batches ({:?}, seed {seed})",
        plan.len(),
        options.execution
    );

    let results = match options.execution {
        Execution::Sequential => run_sequential(config, seed, &plan, options),
        Execution::Parallel => run_parallel(config, seed, &plan, options),
    };

    let mut collector = AggregationCollector::new(config.slot_count());
    let mut completed: u64 = 0;
    for result in results {
        completed = completed.saturating_add(result.completed);
        collector.merge(result.collector);
    }

    if completed < requested {
        info!("run cancelled after {completed} of {requested} trials");
        return Err(RunError::Cancelled {
            completed,
            requested,
        });
    }
    info!(
        "run finished: {} destroyed of {requested}",
        collector.destroyed_count()
    );
    Ok(collector)
}

#[derive(Debug, Clone, Copy)]
struct Batch {
    index: u64,
    trials: u64,
}

struct BatchResult {
    collector: AggregationCollector,
    completed: u64,
}

fn plan_batches(trials: u64, batch_size: u64) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while start < trials {
        let len = batch_size.min(trials - start);
        batches.push(Batch { index, trials: len });
        start += len;
        index += 1;
    }
    batches
}

fn run_batch(
    config: &SimulationConfig,
    seed: u64,
    batch: Batch,
    options: &RunOptions,
) -> BatchResult {
    let mut source = StreamSource::substream(seed, batch.index);
    let mut collector = AggregationCollector::new(config.slot_count());
    let mut completed = 0;
    for _ in 0..batch.trials {
        if options.cancelled() {
            break;
        }
        collector.record(simulate_attempt(config, &mut source));
        completed += 1;
    }
    debug!(
        "batch {} finished {completed}/{} trials ({} draws)",
        batch.index,
        batch.trials,
        source.draws()
    );
    BatchResult {
        collector,
        completed,
    }
}

fn run_sequential(
    config: &SimulationConfig,
    seed: u64,
    plan: &[Batch],
    options: &RunOptions,
) -> Vec<BatchResult> {
    plan.iter()
        .map(|batch| run_batch(config, seed, *batch, options))
        .collect()
}

#[cfg(feature = "parallel")]
fn run_parallel(
    config: &SimulationConfig,
    seed: u64,
    plan: &[Batch],
    options: &RunOptions,
) -> Vec<BatchResult> {
    use rayon::prelude::*;

    plan.par_iter()
        .map(|batch| run_batch(config, seed, *batch, options))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    config: &SimulationConfig,
    seed: u64,
    plan: &[Batch],
    options: &RunOptions,
) -> Vec<BatchResult> {
    log::warn!("parallel execution requested without the `parallel` feature; running sequentially");
    run_sequential(config, seed, plan, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use crate::scroll::ScrollDefinition;

    fn risky_plan(trials: u64) -> SimulationConfig {
        SimulationConfig::builder(3, trials)
            .scroll(ScrollDefinition::new("60%", 0.6, false, 2), 1)
            .scroll(ScrollDefinition::new("30%", 0.3, true, 5), 2)
            .build()
            .unwrap()
    }

    #[test]
    fn plan_covers_every_trial_once() {
        let plan = plan_batches(10, 4);
        let sizes: Vec<u64> = plan.iter().map(|batch| batch.trials).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert!(plan_batches(0, 4).is_empty());
    }

    #[test]
    fn run_trials_uses_the_supplied_source() {
        let config = risky_plan(3);
        // every trial: 60% succeeds, 30% fails twice and survives both destruction rolls
        let mut source = ScriptedSource::new(vec![0.1, 0.9, 0.9, 0.9, 0.9]);
        let collector = run_trials(&config, &mut source);
        assert_eq!(collector.destroyed_count(), 0);
        assert_eq!(collector.success_count_histogram(), &[0, 3, 0, 0]);
        assert_eq!(collector.ability_histogram().get(&2), Some(&3));
        assert_eq!(source.consumed(), 15);
    }

    #[test]
    fn same_seed_same_summary() {
        let config = risky_plan(5000);
        let options = RunOptions::default().with_batch_size(512);
        let first = simulate(&config, 99, &options).unwrap();
        let second = simulate(&config, 99, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.trial_count, 5000);
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let config = risky_plan(20_000);
        let sequential = simulate(
            &config,
            2024,
            &RunOptions::default().with_execution(Execution::Sequential),
        )
        .unwrap();
        let parallel = simulate(
            &config,
            2024,
            &RunOptions::default().with_execution(Execution::Parallel),
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn cancelled_token_stops_before_first_trial() {
        let token = CancelToken::new();
        token.cancel();
        let options = RunOptions::default().with_cancel(token);
        let err = collect(&risky_plan(100), 1, &options).unwrap_err();
        assert_eq!(
            err,
            RunError::Cancelled {
                completed: 0,
                requested: 100
            }
        );
        assert!(err.to_string().contains("0 of 100"));
    }

    #[test]
    fn conservation_holds_for_seeded_runs() {
        let config = risky_plan(10_000);
        let collector = collect(&config, 7, &RunOptions::default()).unwrap();
        let survivors: u64 = collector.success_count_histogram().iter().sum();
        let ability_total: u64 = collector.ability_histogram().values().sum();
        assert_eq!(collector.destroyed_count() + survivors, 10_000);
        assert_eq!(ability_total, 10_000 - collector.destroyed_count());
    }
}
