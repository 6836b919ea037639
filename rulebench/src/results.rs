use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::config::BenchConfig;
use crate::errors::BenchResult;
use crate::search::Strategy;

/// Timed samples for one strategy
#[derive(Debug, Clone)]
pub struct Measurement {
    /// The strategy that was measured
    pub strategy: Strategy,
    /// Elapsed time of each measured invocation
    pub samples: Vec<Duration>,
    /// Whether every measured invocation reported a match
    pub matched: bool,
    /// Measured invocations that returned an error instead of an answer
    pub failures: usize,
}

impl Measurement {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            samples: Vec::new(),
            matched: true,
            failures: 0,
        }
    }

    /// Adds one sample and folds its outcome into `matched`
    pub fn record(&mut self, elapsed: Duration, matched: bool) {
        self.samples.push(elapsed);
        self.matched &= matched;
    }

    /// Adds a sample for an invocation that errored; it counts as no match
    pub fn record_failure(&mut self, elapsed: Duration) {
        self.record(elapsed, false);
        self.failures += 1;
    }

    pub fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().min().copied().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().max().copied().unwrap_or_default()
    }

    pub fn summary(&self) -> MeasurementSummary {
        MeasurementSummary {
            strategy: self.strategy,
            iterations: self.samples.len(),
            mean_ms: as_millis(self.mean()),
            min_ms: as_millis(self.min()),
            max_ms: as_millis(self.max()),
            matched: self.matched,
            failures: self.failures,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<22} {:>10.3} ms/op  (min {}, max {}, n = {})",
            self.strategy.name(),
            as_millis(self.mean()),
            humantime::format_duration(self.min()),
            humantime::format_duration(self.max()),
            self.samples.len()
        )?;
        if self.failures > 0 {
            write!(f, " [{} failed]", self.failures)?;
        }
        Ok(())
    }
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

/// Serializable view of a [`Measurement`], times in milliseconds
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementSummary {
    pub strategy: Strategy,
    pub iterations: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub matched: bool,
    pub failures: usize,
}

/// All measurements from one trial
#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    /// Measurements in the order the strategies ran
    pub measurements: Vec<Measurement>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    config: &'a BenchConfig,
    results: Vec<MeasurementSummary>,
}

impl BenchReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_measurement(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// Whether every strategy reported a match on every sample
    pub fn all_matched(&self) -> bool {
        self.measurements.iter().all(|m| m.matched)
    }

    /// Measurement with the lowest mean time
    pub fn fastest(&self) -> Option<&Measurement> {
        self.measurements.iter().min_by_key(|m| m.mean())
    }

    /// Renders the report, together with the config that produced it, as JSON
    pub fn to_json(&self, config: &BenchConfig) -> BenchResult<String> {
        let document = ReportDocument {
            config,
            results: self.measurements.iter().map(Measurement::summary).collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
