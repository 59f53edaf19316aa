//! Configuration management for batchmark

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BatchmarkError, Result};

/// Main configuration structure.
///
/// Every field has a documented default, so a bare `Config::default()` (or an
/// empty config file) describes a complete run: process `data_set/` into
/// `output/`, 128x128 JPEG at quality 90, watermarked bottom-right.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory scanned for input images
    pub input_dir: PathBuf,

    /// Root directory for mirrored output trees (one subtree per benchmark
    /// configuration)
    pub output_dir: PathBuf,

    /// Fixed output resolution; images are force-resized without preserving
    /// aspect ratio
    pub target: TargetSize,

    /// Normalized output format
    pub output_format: OutputFormat,

    /// Encoder quality for the lossy output format (1-100)
    pub quality: u8,

    /// Watermark overlay settings
    pub watermark: WatermarkConfig,

    /// Benchmark matrix settings
    pub benchmark: BenchmarkConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data_set"),
            output_dir: PathBuf::from("output"),
            target: TargetSize::default(),
            output_format: OutputFormat::Jpeg,
            quality: 90,
            watermark: WatermarkConfig::default(),
            benchmark: BenchmarkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Fixed output dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TargetSize {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
        }
    }
}

/// Watermark overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Text rendered onto the overlay
    pub text: String,

    /// Overlay opacity, 0 (invisible) to 255 (opaque)
    pub opacity: u8,

    /// Inset of the text bounding box from the bottom-right corner, in pixels
    pub margin: u32,

    /// TrueType font to render with; when absent or unloadable, well-known
    /// system fonts are tried before falling back to the built-in glyph set
    pub font: Option<PathBuf>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "batchmark".to_string(),
            opacity: 120,
            margin: 6,
            font: None,
        }
    }
}

/// Benchmark matrix settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Requested worker counts; deduplicated and clamped to the detected
    /// core count at run time, with 1 and the ceiling always included
    pub worker_counts: Vec<usize>,

    /// Also run the legacy static two-way split variant after the dynamic
    /// matrix
    pub split_run: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            worker_counts: vec![1, 2, 4, 8],
            split_run: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Normalized output formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl From<OutputFormat> for image::ImageFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl Config {
    /// Load configuration from a TOML or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            BatchmarkError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(BatchmarkError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.target.width == 0 || self.target.height == 0 {
            return Err(BatchmarkError::config(
                "Target dimensions must be greater than 0",
            ));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(BatchmarkError::config("Quality must be between 1 and 100"));
        }

        if self.benchmark.worker_counts.is_empty() {
            return Err(BatchmarkError::config(
                "Benchmark worker counts must not be empty",
            ));
        }

        if self.benchmark.worker_counts.contains(&0) {
            return Err(BatchmarkError::config(
                "Benchmark worker counts must be greater than 0",
            ));
        }

        Ok(())
    }
}
