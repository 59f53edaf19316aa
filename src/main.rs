//! Batchmark CLI - Parallel Batch Image Watermarking Benchmark
//!
//! Runs the watermarking pipeline over an input tree under a matrix of
//! worker-pool sizes and prints the resulting speedup table.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use batchmark::{worker_matrix, BenchmarkDriver, BenchmarkReport, Config, OutputFormat};

/// Batchmark - Parallel Batch Image Watermarking Benchmark
#[derive(Parser)]
#[command(
    name = "batchmark",
    version,
    about = "Batch-resize and watermark an image tree while benchmarking worker scaling",
    long_about = "Batchmark walks a directory tree of images, force-resizes each one to a fixed \
                  target, composites a semi-transparent text watermark and re-encodes it, running \
                  the batch under several worker-pool sizes. Every configuration is timed and \
                  compared against a measured single-worker baseline.",
    arg_required_else_help = false
)]
struct Cli {
    /// Input directory of images
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output root directory
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Target size (width x height), e.g. "128x128"
    #[arg(short, long, value_name = "WxH", value_parser = parse_dimensions)]
    size: Option<(u32, u32)>,

    /// Watermark text
    #[arg(short, long, value_name = "TEXT")]
    text: Option<String>,

    /// Watermark opacity (0-255)
    #[arg(long, value_name = "ALPHA")]
    opacity: Option<u8>,

    /// Watermark margin from the bottom-right corner, in pixels
    #[arg(long, value_name = "PIXELS")]
    margin: Option<u32>,

    /// TrueType font for the watermark text
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Output quality (1-100)
    #[arg(short, long, value_name = "QUALITY")]
    quality: Option<u8>,

    /// Output format
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    format: Option<CliOutputFormat>,

    /// Worker counts to benchmark (clamped to the detected core count)
    #[arg(short, long, value_name = "COUNTS", value_delimiter = ',')]
    workers: Option<Vec<usize>>,

    /// Skip the legacy static two-way split configuration
    #[arg(long)]
    no_split: bool,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// CLI-compatible output format enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliOutputFormat {
    Jpeg,
    Png,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Png => OutputFormat::Png,
        }
    }
}

/// Parse dimension string (e.g., "128x128")
fn parse_dimensions(s: &str) -> std::result::Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err("Dimensions must be in format 'WIDTHxHEIGHT' (e.g., '128x128')".to_string());
    }

    let width = parts[0]
        .parse::<u32>()
        .map_err(|_| "Invalid width value".to_string())?;
    let height = parts[1]
        .parse::<u32>()
        .map_err(|_| "Invalid height value".to_string())?;

    if width == 0 || height == 0 {
        return Err("Width and height must be greater than 0".to_string());
    }

    Ok((width, height))
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    std::env::set_var("RUST_LOG", log_level);
    batchmark::init();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    let matrix = worker_matrix(&config.benchmark.worker_counts, num_cpus::get());
    let total_runs = matrix.len() + usize::from(config.benchmark.split_run);

    let progress = if cli.json || cli.quiet {
        None
    } else {
        println!(
            "{} (detected {} CPU cores)",
            style("Starting parallel processing benchmark").bold(),
            num_cpus::get()
        );
        Some(run_progress_bar(total_runs as u64))
    };

    let driver = BenchmarkDriver::new(config);
    let result = driver.run_with_observer(|run| {
        if let Some(pb) = &progress {
            pb.println(format!(
                "  {} worker(s) [{}]: {:.2}s ({} ok, {} failed)",
                run.worker_count,
                run.strategy.label(),
                run.elapsed_seconds,
                run.completed,
                run.failed
            ));
            pb.inc(1);
        }
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let Some(pb) = &progress {
                pb.abandon();
            }
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{}: {}", style("Error").red().bold(), e);
                process::exit(1);
            }
        }
    } else {
        print_summary(&report);
    }
}

/// Merge precedence: built-in defaults, then the config file, then CLI flags.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(input) = &cli.input {
        config.input_dir = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some((width, height)) = cli.size {
        config.target.width = width;
        config.target.height = height;
    }
    if let Some(text) = &cli.text {
        config.watermark.text = text.clone();
    }
    if let Some(opacity) = cli.opacity {
        config.watermark.opacity = opacity;
    }
    if let Some(margin) = cli.margin {
        config.watermark.margin = margin;
    }
    if let Some(font) = &cli.font {
        config.watermark.font = Some(font.clone());
    }
    if let Some(quality) = cli.quality {
        config.quality = quality;
    }
    if let Some(format) = cli.format {
        config.output_format = format.into();
    }
    if let Some(workers) = &cli.workers {
        config.benchmark.worker_counts = workers.clone();
    }
    if cli.no_split {
        config.benchmark.split_run = false;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run_progress_bar(total_runs: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_runs);
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} runs")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(bar_style);
    pb
}

/// Print the speedup table and the failure tally
fn print_summary(report: &BenchmarkReport) {
    println!();
    println!("{}", style("Parallel Speedup Table").bold());
    print!("{}", report.render_table());

    let failed = report.total_failed();
    if failed > 0 {
        println!(
            "{}: {} task failure(s) across all runs, see log for offending paths",
            style("Warning").yellow().bold(),
            failed
        );
    }
}
