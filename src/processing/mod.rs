//! Core image transformation: normalize, resize, watermark, encode

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{imageops, DynamicImage, RgbImage};
use tracing::debug;

use crate::config::{Config, OutputFormat, TargetSize, WatermarkConfig};
use crate::error::Result;
use crate::tasks::Task;

pub mod formats;
pub mod watermark;

pub use watermark::FontRenderer;

/// The per-task transformation, shared read-only across all workers.
///
/// Holds everything a worker needs so that processing a task touches no
/// state outside the task's own input and output files.
pub struct TransformPipeline {
    target: TargetSize,
    watermark: WatermarkConfig,
    quality: u8,
    format: OutputFormat,
    font: FontRenderer,
}

impl TransformPipeline {
    /// Build the pipeline from a validated configuration. Loads the watermark
    /// font once; workers share the handle.
    pub fn from_config(config: &Config) -> Self {
        let font = FontRenderer::load(config.watermark.font.as_deref());
        Self {
            target: config.target,
            watermark: config.watermark.clone(),
            quality: config.quality,
            format: config.output_format,
            font,
        }
    }

    /// Process one task end to end: decode the source, transform, encode to
    /// the destination. Any error here is a per-task error; callers record it
    /// and move on.
    pub fn process_task(&self, task: &Task) -> Result<()> {
        debug!("Processing {:?} -> {:?}", task.source, task.destination);

        let decoded = image::open(&task.source)?;
        let transformed = self.apply(&decoded);
        self.encode(&transformed, &task.destination)
    }

    /// The pure transformation: 3-channel normalize, exact resize, watermark
    /// composite, 3-channel flatten. No I/O.
    pub fn apply(&self, image: &DynamicImage) -> RgbImage {
        // Normalize to RGB8 before resampling so every input, whatever its
        // color mode, takes the same path.
        let base = imageops::resize(
            &image.to_rgb8(),
            self.target.width,
            self.target.height,
            FilterType::Lanczos3,
        );

        // Each image is resized exactly once, so Lanczos3 buys quality at a
        // cost paid a single time.
        let mut canvas = DynamicImage::ImageRgb8(base).to_rgba8();
        let overlay = watermark::render_overlay(
            self.target.width,
            self.target.height,
            &self.watermark,
            &self.font,
        );
        imageops::overlay(&mut canvas, &overlay, 0, 0);

        DynamicImage::ImageRgba8(canvas).to_rgb8()
    }

    fn encode(&self, image: &RgbImage, destination: &Path) -> Result<()> {
        match self.format {
            OutputFormat::Jpeg => {
                let mut writer = BufWriter::new(File::create(destination)?);
                let encoder = JpegEncoder::new_with_quality(&mut writer, self.quality);
                image.write_with_encoder(encoder)?;
            }
            OutputFormat::Png => {
                image.save_with_format(destination, image::ImageFormat::Png)?;
            }
        }
        Ok(())
    }
}
