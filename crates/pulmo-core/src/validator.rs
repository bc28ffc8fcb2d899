//! Upload validation ahead of any expensive work.

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::ValidationError;

/// Outcome of a successful validation. Warnings are advisory only and never
/// block classification.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    #[serde(rename = "avisos")]
    pub warnings: Vec<String>,
}

pub struct ImageValidator {
    max_size_bytes: usize,
    max_size_mb: usize,
    allowed_extensions: Vec<String>,
    min_dimension: u32,
    max_dimension: u32,
}

impl ImageValidator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_size_bytes: config.max_image_size_bytes(),
            max_size_mb: config.max_image_size_mb,
            allowed_extensions: config.allowed_extensions.clone(),
            min_dimension: config.min_dimension,
            max_dimension: config.max_dimension,
        }
    }

    /// Fail-fast checks, in order: byte size, filename extension, decode as
    /// a well-formed JPEG/PNG, dimension bounds. The radiograph heuristic
    /// runs last and only attaches warnings.
    pub fn validate(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> Result<ValidationReport, ValidationError> {
        self.check_size(bytes)?;
        if let Some(name) = filename {
            self.check_extension(name)?;
        }
        let img = self.check_format(bytes)?;
        self.check_dimensions(&img)?;

        let mut report = ValidationReport::default();
        self.radiograph_heuristics(&img, &mut report);
        debug!("Image validated ({} warnings)", report.warnings.len());
        Ok(report)
    }

    fn check_size(&self, bytes: &[u8]) -> Result<(), ValidationError> {
        if bytes.len() > self.max_size_bytes {
            return Err(ValidationError::TooLarge {
                size_mb: bytes.len() as f64 / (1024.0 * 1024.0),
                max_mb: self.max_size_mb,
            });
        }
        Ok(())
    }

    fn check_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = filename
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(ValidationError::UnsupportedFormat {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }
        Ok(())
    }

    fn check_format(&self, bytes: &[u8]) -> Result<DynamicImage, ValidationError> {
        let format =
            image::guess_format(bytes).map_err(|err| ValidationError::Corrupt(err.to_string()))?;
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(ValidationError::Corrupt(format!(
                "formato de imagem não suportado: {format:?}"
            )));
        }
        image::load_from_memory_with_format(bytes, format)
            .map_err(|err| ValidationError::Corrupt(err.to_string()))
    }

    fn check_dimensions(&self, img: &DynamicImage) -> Result<(), ValidationError> {
        let (width, height) = img.dimensions();
        let in_range = |v: u32| (self.min_dimension..=self.max_dimension).contains(&v);
        if !in_range(width) || !in_range(height) {
            return Err(ValidationError::DimensionOutOfRange {
                width,
                height,
                min: self.min_dimension,
                max: self.max_dimension,
            });
        }
        Ok(())
    }

    /// Heuristic check that the upload looks like a chest radiograph:
    /// mid-range grayscale mean with enough contrast, and a plausible
    /// aspect ratio. Failures warn, never reject.
    fn radiograph_heuristics(&self, img: &DynamicImage, report: &mut ValidationReport) {
        let (width, height) = img.dimensions();
        let aspect = width as f64 / height as f64;
        if !(0.5..=2.0).contains(&aspect) {
            report.warnings.push(format!(
                "Proporção incomum ({aspect:.2}). A imagem pode não ser uma radiografia de tórax."
            ));
        }

        let gray = img.to_luma8();
        let pixels = gray.as_raw();
        if pixels.is_empty() {
            return;
        }
        let count = pixels.len() as f64;
        let mean = pixels.iter().map(|&p| p as f64).sum::<f64>() / count;
        let variance = pixels
            .iter()
            .map(|&p| {
                let d = p as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / count;
        let std = variance.sqrt();

        if !(50.0..=180.0).contains(&mean) || std <= 40.0 {
            report.warnings.push(format!(
                "Intensidade atípica (média {mean:.1}, desvio {std:.1}). \
                 A imagem pode não ser uma radiografia de tórax."
            ));
        }
    }
}
