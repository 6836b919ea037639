use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::BenchConfig;
use crate::errors::BenchResult;
use crate::metrics::StrategyMetrics;
use crate::results::{BenchReport, Measurement};
use crate::search::Strategy;
use crate::state::BenchState;

/// Runs `config.warmup_iterations` unmeasured calls, then times
/// `config.measurement_iterations` calls of `strategy` against the state's fixture.
///
/// A call that errors is logged and recorded as a failed sample; the loop carries on.
pub fn measure(
    strategy: Strategy,
    state: &BenchState,
    config: &BenchConfig,
) -> BenchResult<Measurement> {
    let fixture = state.fixture();
    let metrics = StrategyMetrics::new();

    let measurement = sample(
        strategy,
        config.warmup_iterations,
        config.measurement_iterations,
        || strategy.run_with_metrics(fixture, config, &metrics),
    );

    metrics.log_stats();
    info!("{}", measurement);
    Ok(measurement)
}

fn sample<F>(strategy: Strategy, warmup: usize, iterations: usize, mut run: F) -> Measurement
where
    F: FnMut() -> BenchResult<bool>,
{
    debug!("Warming up {} for {} iterations", strategy, warmup);
    for iteration in 0..warmup {
        if let Err(e) = run() {
            warn!("{} failed on warmup iteration {}: {}", strategy, iteration, e);
        }
    }

    let mut measurement = Measurement::new(strategy);
    for iteration in 0..iterations {
        let start = Instant::now();
        let outcome = run();
        let elapsed = start.elapsed();

        match outcome {
            Ok(true) => measurement.record(elapsed, true),
            Ok(false) => {
                warn!("{} reported no match on iteration {}", strategy, iteration);
                measurement.record(elapsed, false);
            }
            Err(e) => {
                warn!("{} failed on iteration {}: {}", strategy, iteration, e);
                measurement.record_failure(elapsed);
            }
        }
    }
    measurement
}

/// Measures each strategy in turn against one shared state
pub fn run_benchmark(
    strategies: &[Strategy],
    state: &BenchState,
    config: &BenchConfig,
) -> BenchResult<BenchReport> {
    let mut report = BenchReport::new();
    for &strategy in strategies {
        report.add_measurement(measure(strategy, state, config)?);
    }
    Ok(report)
}
