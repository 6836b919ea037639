use crossbeam::channel::{self, Receiver, Sender};
use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

use crate::errors::{BenchError, BenchResult};
use crate::metrics::StrategyMetrics;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size pool of worker threads fed from a shared job queue.
///
/// Each submitted task gets its own [`TaskHandle`]. [`WorkerPool::shutdown_now`] discards
/// every task still queued and joins the workers; dropping the pool does the same.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    queue: Receiver<Job>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    metrics: StrategyMetrics,
}

/// Blocking handle to the result of one submitted task
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T, String>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has run.
    ///
    /// A task discarded by shutdown before it ran yields [`BenchError::Interrupted`]; a
    /// task that panicked yields [`BenchError::TaskFailed`].
    pub fn get(&self) -> BenchResult<T> {
        match self.receiver.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(reason)) => Err(BenchError::task_failed(reason)),
            Err(_) => Err(BenchError::Interrupted),
        }
    }
}

impl WorkerPool {
    /// Spawns `size` worker threads
    pub fn new(size: NonZeroUsize, metrics: StrategyMetrics) -> BenchResult<Self> {
        let (sender, queue) = channel::unbounded::<Job>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(size.get());

        for index in 0..size.get() {
            let queue = queue.clone();
            let shutdown = Arc::clone(&shutdown);
            let worker_metrics = metrics.clone();
            let worker = thread::Builder::new()
                .name(format!("rulebench-worker-{index}"))
                .spawn(move || worker_loop(queue, shutdown, worker_metrics))
                .map_err(|e| BenchError::pool_build(e.to_string()))?;
            workers.push(worker);
        }

        debug!("Started worker pool with {} threads", size);
        Ok(Self {
            sender: Some(sender),
            queue,
            workers,
            shutdown,
            metrics,
        })
    }

    /// Number of worker threads still attached to the pool
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues a task and returns a handle to its result
    pub fn submit<T, F>(&self, task: F) -> BenchResult<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| BenchError::task_failed("pool is shut down"))?;

        let (result_tx, result_rx) = channel::bounded(1);
        let metrics = self.metrics.clone();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(panic_message);
            metrics.record_completion();
            // The caller may have stopped polling; a closed handle is fine.
            let _ = result_tx.send(outcome);
        });

        sender
            .send(job)
            .map_err(|_| BenchError::task_failed("pool is shut down"))?;
        self.metrics.record_submission();

        Ok(TaskHandle {
            receiver: result_rx,
        })
    }

    /// Submits every task, then blocks until all of them have finished.
    ///
    /// Results come back in submission order.
    pub fn invoke_all<T, F>(&self, tasks: Vec<F>) -> BenchResult<Vec<BenchResult<T>>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let handles = tasks
            .into_iter()
            .map(|task| self.submit(task))
            .collect::<BenchResult<Vec<_>>>()?;

        trace!("Waiting on {} batched tasks", handles.len());
        Ok(handles.iter().map(TaskHandle::get).collect())
    }

    /// Stops accepting work, discards queued tasks and joins the workers.
    ///
    /// Returns the number of queued tasks that were discarded. Calling it again is a no-op.
    pub fn shutdown_now(&mut self) -> u64 {
        if self.sender.is_none() {
            return 0;
        }

        self.shutdown.store(true, Ordering::Release);
        self.sender = None;

        let cancelled = self.queue.try_iter().count() as u64;
        if cancelled > 0 {
            self.metrics.record_cancellations(cancelled);
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("Worker thread exited abnormally");
            }
        }

        debug!("Worker pool shut down, {} queued tasks discarded", cancelled);
        cancelled
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}

fn worker_loop(queue: Receiver<Job>, shutdown: Arc<AtomicBool>, metrics: StrategyMetrics) {
    while let Ok(job) = queue.recv() {
        if shutdown.load(Ordering::Acquire) {
            drop(job);
            metrics.record_cancellations(1);
            break;
        }
        job();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn pool(size: usize) -> (WorkerPool, StrategyMetrics) {
        let metrics = StrategyMetrics::new();
        let pool = WorkerPool::new(NonZeroUsize::new(size).unwrap(), metrics.clone()).unwrap();
        (pool, metrics)
    }

    #[test]
    fn test_pool_spawns_requested_workers() {
        let (pool, _) = pool(3);
        assert_eq!(pool.size(), 3);

        let name = pool
            .submit(|| thread::current().name().map(str::to_owned))
            .unwrap()
            .get()
            .unwrap()
            .unwrap();
        assert!(name.starts_with("rulebench-worker-"));
    }

    #[test]
    fn test_submit_and_get() {
        let (pool, metrics) = pool(2);
        let handle = pool.submit(|| 21 * 2).unwrap();
        assert_eq!(handle.get().unwrap(), 42);
        assert_eq!(metrics.tasks_submitted(), 1);
    }

    #[test]
    fn test_results_follow_submission_order() {
        let (pool, _) = pool(4);
        let handles: Vec<_> = (0..100)
            .map(|i| pool.submit(move || i).unwrap())
            .collect();
        let results: Vec<i32> = handles.iter().map(|h| h.get().unwrap()).collect();
        assert_eq!(results, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_invoke_all_waits_for_every_task() {
        let (pool, metrics) = pool(3);
        let counter = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let counter = Arc::clone(&counter);
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    i % 7 == 0
                }
            })
            .collect();

        let results = pool.invoke_all(tasks).unwrap();
        assert_eq!(results.len(), 50);
        assert_eq!(counter.load(Ordering::SeqCst), 50);
        assert_eq!(metrics.tasks_completed(), 50);
        assert!(*results[0].as_ref().unwrap());
        assert!(!*results[1].as_ref().unwrap());
    }

    #[test]
    fn test_panicking_task_reports_failure() {
        let (pool, _) = pool(1);
        let handle = pool.submit(|| -> bool { panic!("boom") }).unwrap();
        match handle.get() {
            Err(BenchError::TaskFailed(reason)) => assert_eq!(reason, "boom"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        // The worker survives the panic
        let handle = pool.submit(|| true).unwrap();
        assert!(handle.get().unwrap());
    }

    #[test]
    fn test_shutdown_discards_queued_tasks() {
        let (mut pool, metrics) = pool(1);
        let (release_tx, release_rx) = channel::bounded::<()>(0);
        let (started_tx, started_rx) = channel::bounded::<()>(1);

        // Occupy the only worker until released
        let blocker = pool
            .submit(move || {
                let _ = started_tx.send(());
                let _ = release_rx.recv_timeout(Duration::from_secs(5));
            })
            .unwrap();
        started_rx.recv().unwrap();
        let queued: Vec<_> = (0..10).map(|i| pool.submit(move || i).unwrap()).collect();

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            let _ = release_tx.send(());
        });

        let cancelled = pool.shutdown_now();
        releaser.join().unwrap();

        assert!(blocker.get().is_ok());
        assert_eq!(cancelled, 10);
        assert_eq!(metrics.tasks_cancelled(), 10);
        for handle in &queued {
            assert!(matches!(handle.get(), Err(BenchError::Interrupted)));
        }
        assert_eq!(pool.size(), 0);
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let (mut pool, _) = pool(2);
        pool.shutdown_now();
        assert!(matches!(
            pool.submit(|| true),
            Err(BenchError::TaskFailed(_))
        ));
        assert_eq!(pool.shutdown_now(), 0);
    }
}
