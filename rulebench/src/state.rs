use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::config::BenchConfig;
use crate::errors::{BenchError, BenchResult};
use crate::fixture::Fixture;

/// Per-trial benchmark state: the fixture plus a long-lived worker pool.
///
/// The shared pool is created with the state and lives as long as it does. No strategy
/// schedules work on it; executor strategies build their own pool on every call so that
/// pool construction is part of what they measure.
pub struct BenchState {
    fixture: Fixture,
    shared_pool: ThreadPool,
}

impl BenchState {
    /// Builds a fresh fixture and the shared pool
    pub fn setup(config: &BenchConfig) -> BenchResult<Self> {
        config.validate()?;
        let fixture = Fixture::build(config)?;
        let shared_pool = ThreadPoolBuilder::new()
            .num_threads(config.shared_pool_size.get())
            .thread_name(|i| format!("rulebench-shared-{i}"))
            .build()
            .map_err(|e| BenchError::pool_build(e.to_string()))?;

        info!(
            "Benchmark state ready: {} patterns, shared pool of {} threads",
            fixture.len(),
            shared_pool.current_num_threads()
        );
        Ok(Self {
            fixture,
            shared_pool,
        })
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    pub fn shared_pool(&self) -> &ThreadPool {
        &self.shared_pool
    }
}
