/// Error types for rulebench.
///
/// Every failure a strategy can hit is surfaced as a [`BenchError`] value and returned to
/// the caller. Worker panics, handles that lose their task to a pool shutdown, and pool
/// construction failures all travel the same path:
///
/// ```rust,ignore
/// match Strategy::ExecutorSubmit.run(&fixture, &config) {
///     Ok(matched) => // record the sample,
///     Err(BenchError::TaskFailed(reason)) => // a worker panicked,
///     Err(BenchError::Interrupted) => // the result never arrived,
///     Err(e) => // anything else
/// }
/// ```
use thiserror::Error;

/// Result type for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while building fixtures or running strategies
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Interrupted while waiting for task result")]
    Interrupted,
    #[error("Task failed: {0}")]
    TaskFailed(String),
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BenchError {
    pub fn task_failed(reason: impl Into<String>) -> Self {
        Self::TaskFailed(reason.into())
    }

    pub fn pool_build(reason: impl Into<String>) -> Self {
        Self::PoolBuild(reason.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn unknown_strategy(name: impl Into<String>) -> Self {
        Self::UnknownStrategy(name.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<config::ConfigError> for BenchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
