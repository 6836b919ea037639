pub mod config;
pub mod errors;
pub mod fixture;
pub mod metrics;
pub mod results;
pub mod runner;
pub mod search;
pub mod state;

pub use config::{BenchConfig, ConfigOverrides};
pub use errors::{BenchError, BenchResult};
pub use fixture::Fixture;
pub use metrics::StrategyMetrics;
pub use results::{BenchReport, Measurement};
pub use search::Strategy;
pub use state::BenchState;
