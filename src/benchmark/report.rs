//! Benchmark result types and the human-readable summary table

use serde::Serialize;

use crate::parallel::PartitionStrategy;

/// One benchmark configuration's measurements. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRun {
    pub worker_count: usize,
    pub strategy: PartitionStrategy,
    pub elapsed_seconds: f64,
    /// baseline elapsed / this elapsed
    pub speedup: f64,
    /// speedup / worker_count; 1.0 is ideal scaling
    pub efficiency: f64,
    pub completed: usize,
    pub failed: usize,
}

/// The full benchmark outcome, ordered as the configurations ran.
#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub cpu_cores: usize,
    /// Eligible files per configuration
    pub task_count: usize,
    /// Measured single-worker wall-clock, the denominator of every speedup
    pub baseline_seconds: f64,
    pub runs: Vec<BenchmarkRun>,
}

impl BenchmarkReport {
    pub fn total_failed(&self) -> usize {
        self.runs.iter().map(|r| r.failed).sum()
    }

    /// Render the speedup table for standard output.
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        out.push_str("Workers | Strategy | Time (s) | Speedup | Efficiency | Completed | Failed\n");
        out.push_str("------- | -------- | -------- | ------- | ---------- | --------- | ------\n");

        for run in &self.runs {
            let speedup = format!("{:.2}x", run.speedup);
            out.push_str(&format!(
                "{:<7} | {:<8} | {:<8.2} | {:<7} | {:<10.2} | {:<9} | {}\n",
                run.worker_count,
                run.strategy.label(),
                run.elapsed_seconds,
                speedup,
                run.efficiency,
                run.completed,
                run.failed,
            ));
        }

        out.push_str(&format!(
            "\nBaseline (1 worker): {:.2}s over {} task(s), {} CPU cores detected\n",
            self.baseline_seconds, self.task_count, self.cpu_cores,
        ));

        out
    }
}
