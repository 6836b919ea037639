use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::matcher::{self, CompiledPattern};
use super::pool::WorkerPool;
use crate::config::BenchConfig;
use crate::errors::{BenchError, BenchResult};
use crate::fixture::Fixture;
use crate::metrics::StrategyMetrics;

/// The traversal disciplines under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Plain loop, stops at the first match
    Sequential,
    /// Lazy single-threaded filter, collects every match
    Stream,
    /// Rayon filter on the global pool, collects every match
    ParallelStream,
    /// One task per pattern on a fresh pool, results polled in submission order
    ExecutorSubmit,
    /// Every task submitted as one batch on a fresh pool, results read in order
    ExecutorInvokeAll,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::Stream,
        Strategy::ParallelStream,
        Strategy::ExecutorSubmit,
        Strategy::ExecutorInvokeAll,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Stream => "stream",
            Strategy::ParallelStream => "parallel-stream",
            Strategy::ExecutorSubmit => "executor-submit",
            Strategy::ExecutorInvokeAll => "executor-invoke-all",
        }
    }

    /// Whether the strategy can stop before examining every pattern
    pub fn exits_early(&self) -> bool {
        matches!(
            self,
            Strategy::Sequential | Strategy::ExecutorSubmit | Strategy::ExecutorInvokeAll
        )
    }

    /// Scans the fixture and reports whether any pattern matches `config.target`
    pub fn run(&self, fixture: &Fixture, config: &BenchConfig) -> BenchResult<bool> {
        self.run_with_metrics(fixture, config, &StrategyMetrics::new())
    }

    /// Like [`Strategy::run`], recording the work performed into `metrics`
    pub fn run_with_metrics(
        &self,
        fixture: &Fixture,
        config: &BenchConfig,
        metrics: &StrategyMetrics,
    ) -> BenchResult<bool> {
        let target = config.target.as_str();
        let matched = match self {
            Strategy::Sequential => sequential(fixture, target, metrics),
            Strategy::Stream => Ok(stream(fixture, target, metrics)),
            Strategy::ParallelStream => Ok(parallel_stream(fixture, target, metrics)),
            Strategy::ExecutorSubmit => executor_submit(fixture, config, metrics),
            Strategy::ExecutorInvokeAll => executor_invoke_all(fixture, config, metrics),
        }?;

        debug!("{} finished, matched: {}", self, matched);
        Ok(matched)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BenchError::unknown_strategy(s))
    }
}

fn evaluate(pattern: &CompiledPattern, target: &str, metrics: &StrategyMetrics) -> bool {
    metrics.record_evaluation();
    matcher::matches(pattern, target)
}

fn sequential(fixture: &Fixture, target: &str, metrics: &StrategyMetrics) -> BenchResult<bool> {
    for pattern in fixture.patterns() {
        if evaluate(pattern, target, metrics) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn stream(fixture: &Fixture, target: &str, metrics: &StrategyMetrics) -> bool {
    let found: Vec<&CompiledPattern> = fixture
        .patterns()
        .iter()
        .filter(|pattern| evaluate(pattern, target, metrics))
        .collect();

    debug!("Stream collected {} matching patterns", found.len());
    !found.is_empty()
}

fn parallel_stream(fixture: &Fixture, target: &str, metrics: &StrategyMetrics) -> bool {
    let found: Vec<&CompiledPattern> = fixture
        .patterns()
        .par_iter()
        .filter(|pattern| evaluate(pattern, target, metrics))
        .collect();

    debug!("Parallel stream collected {} matching patterns", found.len());
    !found.is_empty()
}

/// Builds the task that matches one pattern on a worker thread
fn match_task(
    pattern: &CompiledPattern,
    target: &Arc<str>,
    metrics: &StrategyMetrics,
) -> impl FnOnce() -> bool + Send + 'static {
    let pattern = pattern.clone();
    let target = Arc::clone(target);
    let metrics = metrics.clone();
    move || evaluate(&pattern, &target, &metrics)
}

/// Consumes results in order and stops at the first `true`.
///
/// The first failure ends polling and is returned to the caller.
fn first_match<I>(results: I, metrics: &StrategyMetrics) -> BenchResult<bool>
where
    I: IntoIterator<Item = BenchResult<bool>>,
{
    for result in results {
        metrics.record_poll();
        match result {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) => {
                warn!("Task result unavailable: {}", e);
                return Err(e);
            }
        }
    }
    Ok(false)
}

fn executor_submit(
    fixture: &Fixture,
    config: &BenchConfig,
    metrics: &StrategyMetrics,
) -> BenchResult<bool> {
    let mut pool = WorkerPool::new(config.pool_size, metrics.clone())?;
    let target: Arc<str> = Arc::from(config.target.as_str());

    let mut handles = Vec::with_capacity(fixture.len());
    for pattern in fixture.patterns() {
        handles.push(pool.submit(match_task(pattern, &target, metrics))?);
    }

    let matched = first_match(handles.iter().map(|handle| handle.get()), metrics);
    pool.shutdown_now();
    matched
}

fn executor_invoke_all(
    fixture: &Fixture,
    config: &BenchConfig,
    metrics: &StrategyMetrics,
) -> BenchResult<bool> {
    let mut pool = WorkerPool::new(config.pool_size, metrics.clone())?;
    let target: Arc<str> = Arc::from(config.target.as_str());

    let tasks: Vec<_> = fixture
        .patterns()
        .iter()
        .map(|pattern| match_task(pattern, &target, metrics))
        .collect();

    let results = pool.invoke_all(tasks)?;
    let matched = first_match(results, metrics);
    pool.shutdown_now();
    matched
}
