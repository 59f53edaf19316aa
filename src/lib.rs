//! Batchmark - Parallel Batch Image Watermarking Benchmark
//!
//! Processes a directory tree of images (force-resize to a fixed target,
//! semi-transparent bottom-right text watermark, re-encode to a normalized
//! format) while measuring throughput across worker-pool sizes. Reports
//! speedup and efficiency against a measured single-worker baseline.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batchmark::{BenchmarkDriver, Config};
//!
//! let mut config = Config::default();
//! config.input_dir = "photos".into();
//! config.output_dir = "processed".into();
//!
//! let report = BenchmarkDriver::new(config).run()?;
//! println!("{}", report.render_table());
//! # Ok::<(), batchmark::BatchmarkError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod benchmark;
pub mod config;
pub mod error;
pub mod parallel;
pub mod processing;
pub mod tasks;

// Re-export commonly used types
pub use benchmark::{worker_matrix, BenchmarkDriver, BenchmarkReport, BenchmarkRun};
pub use config::{Config, OutputFormat, TargetSize, WatermarkConfig};
pub use error::{BatchmarkError, Result};
pub use parallel::{BatchOutcome, PartitionStrategy, WorkerPool, WorkerResult};
pub use processing::TransformPipeline;
pub use tasks::{Task, TaskEnumerator};

use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the environment filter (`RUST_LOG`).
///
/// Logs go to stderr so stdout stays clean for the report output.
/// Safe to call more than once; only the first subscriber wins.
pub fn init() {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_ok()
    {
        info!("batchmark v{} initialized", VERSION);
    }
}

/// Initialize logging with an explicit filter directive (e.g. `"debug"`).
pub fn init_with_filter(filter: &str) {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_ok()
    {
        info!("batchmark v{} initialized", VERSION);
    }
}
