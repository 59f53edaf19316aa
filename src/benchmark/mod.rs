//! Benchmark driver: runs the pool across a worker-count matrix and derives
//! speedup/efficiency from a measured single-worker baseline

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{BatchmarkError, Result};
use crate::parallel::{PartitionStrategy, WorkerPool};
use crate::processing::TransformPipeline;
use crate::tasks::TaskEnumerator;

pub mod report;

pub use report::{BenchmarkReport, BenchmarkRun};

/// Worker count for the legacy static split configuration
const SPLIT_WORKERS: usize = 2;

/// Build the configuration matrix: clamp to the parallelism ceiling,
/// deduplicate, sort ascending, and force-include the single-worker baseline
/// and the ceiling itself.
pub fn worker_matrix(requested: &[usize], ceiling: usize) -> Vec<usize> {
    let ceiling = ceiling.max(1);

    let mut counts: BTreeSet<usize> = requested
        .iter()
        .map(|&w| w.clamp(1, ceiling))
        .collect();
    counts.insert(1);
    counts.insert(ceiling);

    counts.into_iter().collect()
}

/// Runs the whole benchmark: enumerate, execute per configuration, aggregate.
///
/// The driver moves through enumeration, per-configuration runs and
/// aggregation in strict order; any fatal error aborts the remaining
/// configurations, since a partial speedup table compares nothing.
pub struct BenchmarkDriver {
    config: Config,
}

impl BenchmarkDriver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<BenchmarkReport> {
        self.run_with_observer(|_| {})
    }

    /// Run the matrix, invoking `observer` after each completed
    /// configuration so callers can stream results as they land.
    pub fn run_with_observer<F>(&self, mut observer: F) -> Result<BenchmarkReport>
    where
        F: FnMut(&BenchmarkRun),
    {
        let cpu_cores = num_cpus::get();
        let counts = worker_matrix(&self.config.benchmark.worker_counts, cpu_cores);

        info!(
            "Benchmarking worker counts {:?} (detected {} CPU cores)",
            counts, cpu_cores
        );

        let pipeline = TransformPipeline::from_config(&self.config);

        // The matrix is ascending and always contains 1, so the first run is
        // the measured baseline every later ratio divides by.
        let mut baseline_seconds = None;
        let mut task_count = 0;
        let mut runs = Vec::new();

        for &workers in &counts {
            let run = self.run_configuration(
                workers,
                PartitionStrategy::DynamicQueue,
                &pipeline,
                &mut baseline_seconds,
                &mut task_count,
            )?;
            observer(&run);
            runs.push(run);
        }

        if self.config.benchmark.split_run {
            let run = self.run_configuration(
                SPLIT_WORKERS,
                PartitionStrategy::StaticContiguous,
                &pipeline,
                &mut baseline_seconds,
                &mut task_count,
            )?;
            observer(&run);
            runs.push(run);
        }

        let baseline_seconds =
            baseline_seconds.expect("matrix always contains the single-worker baseline");

        Ok(BenchmarkReport {
            cpu_cores,
            task_count,
            baseline_seconds,
            runs,
        })
    }

    fn run_configuration(
        &self,
        workers: usize,
        strategy: PartitionStrategy,
        pipeline: &TransformPipeline,
        baseline_seconds: &mut Option<f64>,
        task_count: &mut usize,
    ) -> Result<BenchmarkRun> {
        // Destinations differ per configuration, so enumeration happens per
        // configuration; only the dispatch below is timed, uniformly for
        // every row.
        let output_root = self
            .config
            .output_dir
            .join(subdir_name(workers, strategy));
        let enumerator = TaskEnumerator::new(
            self.config.input_dir.clone(),
            output_root,
            self.config.output_format,
        );
        let tasks = enumerator.enumerate()?;

        if tasks.is_empty() {
            return Err(BatchmarkError::NoEligibleFiles {
                path: self.config.input_dir.clone(),
            });
        }
        *task_count = tasks.len();

        debug!(
            "Running configuration: {} worker(s), {} strategy",
            workers,
            strategy.label()
        );

        let pool = WorkerPool::new(workers, strategy);
        let outcome = pool.execute(&tasks, pipeline)?;

        let elapsed_seconds = outcome.elapsed.as_secs_f64().max(f64::EPSILON);
        let baseline = *baseline_seconds.get_or_insert(elapsed_seconds);
        let speedup = baseline / elapsed_seconds;

        Ok(BenchmarkRun {
            worker_count: workers,
            strategy,
            elapsed_seconds,
            speedup,
            efficiency: speedup / workers as f64,
            completed: outcome.completed(),
            failed: outcome.failed(),
        })
    }
}

fn subdir_name(workers: usize, strategy: PartitionStrategy) -> String {
    match strategy {
        PartitionStrategy::DynamicQueue => format!("{workers}_workers"),
        PartitionStrategy::StaticContiguous => format!("split_{workers}_workers"),
    }
}
