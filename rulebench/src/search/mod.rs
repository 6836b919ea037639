/// Matching and the strategies that drive it.
///
/// Each [`Strategy`] answers one question, "does any pattern in the fixture match the
/// target?", using a different traversal:
///
/// | Strategy | Traversal | Stops early |
/// |---|---|---|
/// | `sequential` | plain loop | yes |
/// | `stream` | lazy filter, collected | no |
/// | `parallel-stream` | rayon `par_iter` filter, collected | no |
/// | `executor-submit` | one task per pattern on a fresh [`WorkerPool`] | yes, polling in submission order |
/// | `executor-invoke-all` | one batch on a fresh [`WorkerPool`] | yes, reading results in order |
///
/// The executor strategies create their pool on every call and force it down before
/// returning:
/// ```rust,ignore
/// let config = BenchConfig::default();
/// let fixture = Fixture::build(&config)?;
/// assert!(Strategy::ExecutorSubmit.run(&fixture, &config)?);
/// ```
///
/// Compiled patterns are shared read-only by every worker, so no locking is involved.
pub mod matcher;
pub mod pool;
pub mod strategy;

pub use matcher::{matches, CompiledPattern};
pub use pool::{TaskHandle, WorkerPool};
pub use strategy::Strategy;
