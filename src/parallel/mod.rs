//! Worker pool executor: fans the task sequence out across OS threads

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};
use tracing::{debug, info, warn};

use crate::error::{BatchmarkError, Result};
use crate::processing::TransformPipeline;
use crate::tasks::Task;

pub mod partition;

pub use partition::{contiguous_chunks, PartitionStrategy};

/// A recorded per-task failure. Never aborts the batch; surfaces in the
/// final tally with the offending path.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub source: PathBuf,
    pub message: String,
}

/// What one worker did with its share of the batch.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub worker_id: usize,
    /// Tasks this worker consumed, successful or not
    pub task_count: usize,
    pub elapsed: Duration,
    /// Failures in the order the worker hit them
    pub errors: Vec<TaskFailure>,
}

impl WorkerResult {
    pub fn completed(&self) -> usize {
        self.task_count - self.errors.len()
    }
}

/// Aggregate of one executor invocation.
#[derive(Debug)]
pub struct BatchOutcome {
    pub worker_results: Vec<WorkerResult>,
    /// Wall-clock time of the parallel dispatch, fan-out to last join
    pub elapsed: Duration,
}

impl BatchOutcome {
    pub fn completed(&self) -> usize {
        self.worker_results.iter().map(WorkerResult::completed).sum()
    }

    pub fn failed(&self) -> usize {
        self.worker_results.iter().map(|r| r.errors.len()).sum()
    }

    pub fn task_count(&self) -> usize {
        self.worker_results.iter().map(|r| r.task_count).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskFailure> {
        self.worker_results.iter().flat_map(|r| r.errors.iter())
    }
}

/// Executes a task sequence across a fixed number of independent workers.
///
/// A single-worker pool goes through exactly the same machinery, so timings
/// are directly comparable across worker counts.
pub struct WorkerPool {
    worker_count: usize,
    strategy: PartitionStrategy,
}

impl WorkerPool {
    pub fn new(worker_count: usize, strategy: PartitionStrategy) -> Self {
        Self {
            worker_count: worker_count.max(1),
            strategy,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn strategy(&self) -> PartitionStrategy {
        self.strategy
    }

    /// Run every task through the pipeline and block until all workers join.
    pub fn execute(&self, tasks: &[Task], pipeline: &TransformPipeline) -> Result<BatchOutcome> {
        self.execute_with_progress(tasks, pipeline, |_| {})
    }

    /// Like [`execute`](Self::execute), invoking `on_task_done(success)` from
    /// worker threads after every task so callers can drive a progress bar.
    pub fn execute_with_progress<F>(
        &self,
        tasks: &[Task],
        pipeline: &TransformPipeline,
        on_task_done: F,
    ) -> Result<BatchOutcome>
    where
        F: Fn(bool) + Sync,
    {
        info!(
            "Dispatching {} tasks to {} worker(s) ({})",
            tasks.len(),
            self.worker_count,
            self.strategy.label()
        );

        let start = Instant::now();
        let worker_results = match self.strategy {
            PartitionStrategy::DynamicQueue => self.run_dynamic(tasks, pipeline, &on_task_done)?,
            PartitionStrategy::StaticContiguous => self.run_static(tasks, pipeline, &on_task_done)?,
        };
        let elapsed = start.elapsed();

        let outcome = BatchOutcome {
            worker_results,
            elapsed,
        };

        info!(
            "Batch done in {:.2}s: {} ok, {} failed",
            elapsed.as_secs_f64(),
            outcome.completed(),
            outcome.failed()
        );

        Ok(outcome)
    }

    fn run_dynamic<F>(
        &self,
        tasks: &[Task],
        pipeline: &TransformPipeline,
        on_task_done: &F,
    ) -> Result<Vec<WorkerResult>>
    where
        F: Fn(bool) + Sync,
    {
        let (sender, receiver) = channel::unbounded::<&Task>();
        for task in tasks {
            // unbounded channel, send cannot block
            sender.send(task).expect("task queue disconnected");
        }
        drop(sender);

        crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.worker_count)
                .map(|worker_id| {
                    let queue = receiver.clone();
                    scope.spawn(move |_| drain_queue(worker_id, queue, pipeline, on_task_done))
                })
                .collect();

            join_workers(handles)
        })
        .map_err(|_| BatchmarkError::pool("worker pool scope panicked"))?
    }

    fn run_static<F>(
        &self,
        tasks: &[Task],
        pipeline: &TransformPipeline,
        on_task_done: &F,
    ) -> Result<Vec<WorkerResult>>
    where
        F: Fn(bool) + Sync,
    {
        let chunks = contiguous_chunks(tasks, self.worker_count);

        crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .enumerate()
                .map(|(worker_id, chunk)| {
                    scope.spawn(move |_| run_slice(worker_id, chunk, pipeline, on_task_done))
                })
                .collect();

            join_workers(handles)
        })
        .map_err(|_| BatchmarkError::pool("worker pool scope panicked"))?
    }
}

fn join_workers(
    handles: Vec<crossbeam::thread::ScopedJoinHandle<'_, WorkerResult>>,
) -> Result<Vec<WorkerResult>> {
    handles
        .into_iter()
        .map(|handle| {
            handle
                .join()
                .map_err(|_| BatchmarkError::pool("worker thread panicked"))
        })
        .collect()
}

/// Dynamic-queue worker body: pull until the queue drains.
fn drain_queue<F>(
    worker_id: usize,
    queue: Receiver<&Task>,
    pipeline: &TransformPipeline,
    on_task_done: &F,
) -> WorkerResult
where
    F: Fn(bool) + Sync,
{
    let started = Instant::now();
    let mut task_count = 0;
    let mut errors = Vec::new();

    for task in queue.iter() {
        task_count += 1;
        run_task(task, pipeline, &mut errors, on_task_done);
    }

    let result = WorkerResult {
        worker_id,
        task_count,
        elapsed: started.elapsed(),
        errors,
    };
    debug!(
        "Worker {} drained {} task(s) in {:.2}s",
        worker_id,
        result.task_count,
        result.elapsed.as_secs_f64()
    );
    result
}

/// Static-chunk worker body: the slice is owned outright, no coordination.
fn run_slice<F>(
    worker_id: usize,
    chunk: &[Task],
    pipeline: &TransformPipeline,
    on_task_done: &F,
) -> WorkerResult
where
    F: Fn(bool) + Sync,
{
    let started = Instant::now();
    let mut errors = Vec::new();

    for task in chunk {
        run_task(task, pipeline, &mut errors, on_task_done);
    }

    WorkerResult {
        worker_id,
        task_count: chunk.len(),
        elapsed: started.elapsed(),
        errors,
    }
}

fn run_task<F>(
    task: &Task,
    pipeline: &TransformPipeline,
    errors: &mut Vec<TaskFailure>,
    on_task_done: &F,
) where
    F: Fn(bool) + Sync,
{
    match pipeline.process_task(task) {
        Ok(()) => on_task_done(true),
        Err(e) => {
            warn!("Failed to process {:?}: {}", task.source, e);
            errors.push(TaskFailure {
                source: task.source.clone(),
                message: e.to_string(),
            });
            on_task_done(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::OutputFormat;
    use crate::tasks::TaskEnumerator;
    use image::{ImageBuffer, Rgb};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write_png(path: &std::path::Path, seed: u8) {
        let img = ImageBuffer::from_fn(32, 32, |x, y| {
            Rgb([seed, (x % 256) as u8, (y % 256) as u8])
        });
        img.save(path).unwrap();
    }

    fn seeded_batch(count: usize) -> (TempDir, TempDir, Vec<Task>) {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for i in 0..count {
            write_png(&input.path().join(format!("img_{i:02}.png")), i as u8);
        }
        let tasks = TaskEnumerator::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            OutputFormat::Jpeg,
        )
        .enumerate()
        .unwrap();
        (input, output, tasks)
    }

    fn pipeline() -> TransformPipeline {
        TransformPipeline::from_config(&Config::default())
    }

    #[test]
    fn test_dynamic_pool_processes_everything() {
        let (_input, _output, tasks) = seeded_batch(6);
        let pool = WorkerPool::new(3, PartitionStrategy::DynamicQueue);

        let outcome = pool.execute(&tasks, &pipeline()).unwrap();

        assert_eq!(outcome.task_count(), 6);
        assert_eq!(outcome.completed(), 6);
        assert_eq!(outcome.failed(), 0);
        assert_eq!(outcome.worker_results.len(), 3);
        for task in &tasks {
            assert!(task.destination.exists());
        }
    }

    #[test]
    fn test_static_pool_processes_everything() {
        let (_input, _output, tasks) = seeded_batch(5);
        let pool = WorkerPool::new(2, PartitionStrategy::StaticContiguous);

        let outcome = pool.execute(&tasks, &pipeline()).unwrap();

        assert_eq!(outcome.completed(), 5);
        // near-even contiguous split: 3 + 2
        let mut counts: Vec<usize> =
            outcome.worker_results.iter().map(|r| r.task_count).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![2, 3]);
    }

    #[test]
    fn test_single_worker_uses_same_machinery() {
        let (_input, _output, tasks) = seeded_batch(3);
        let pool = WorkerPool::new(1, PartitionStrategy::DynamicQueue);

        let outcome = pool.execute(&tasks, &pipeline()).unwrap();

        assert_eq!(outcome.worker_results.len(), 1);
        assert_eq!(outcome.worker_results[0].worker_id, 0);
        assert_eq!(outcome.worker_results[0].task_count, 3);
    }

    #[test]
    fn test_corrupt_task_does_not_abort_siblings() {
        let (input, _output, mut tasks) = seeded_batch(4);
        let corrupt = input.path().join("corrupt.jpg");
        std::fs::write(&corrupt, b"not an image").unwrap();
        tasks.push(Task {
            source: corrupt.clone(),
            destination: tasks[0].destination.with_file_name("corrupt.jpg"),
        });

        let pool = WorkerPool::new(2, PartitionStrategy::DynamicQueue);
        let outcome = pool.execute(&tasks, &pipeline()).unwrap();

        assert_eq!(outcome.completed(), 4);
        assert_eq!(outcome.failed(), 1);
        let failure = outcome.failures().next().unwrap();
        assert_eq!(failure.source, corrupt);
        assert!(!failure.message.is_empty());
    }

    #[test]
    fn test_progress_callback_fires_per_task() {
        let (_input, _output, tasks) = seeded_batch(4);
        let pool = WorkerPool::new(2, PartitionStrategy::DynamicQueue);
        let ticks = AtomicUsize::new(0);

        pool.execute_with_progress(&tasks, &pipeline(), |_| {
            ticks.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(ticks.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_zero_worker_request_is_clamped() {
        let pool = WorkerPool::new(0, PartitionStrategy::DynamicQueue);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_empty_task_list() {
        let pool = WorkerPool::new(2, PartitionStrategy::DynamicQueue);
        let outcome = pool.execute(&[], &pipeline()).unwrap();
        assert_eq!(outcome.task_count(), 0);
        assert_eq!(outcome.failed(), 0);
    }
}
