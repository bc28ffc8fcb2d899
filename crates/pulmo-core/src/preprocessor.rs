//! Deterministic image preprocessing.

use image::imageops::FilterType;

use crate::config::PipelineConfig;
use crate::error::ValidationError;

/// A `(1, H, W, 3)` f32 tensor with values in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedTensor {
    data: Vec<f32>,
    height: u32,
    width: u32,
}

impl PreprocessedTensor {
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn shape(&self) -> (usize, u32, u32, usize) {
        (1, self.height, self.width, 3)
    }

    /// All-zero tensor of the given dimensions; used for model warm-up.
    pub fn zeros(height: u32, width: u32) -> Self {
        Self {
            data: vec![0.0; (height * width * 3) as usize],
            height,
            width,
        }
    }
}

/// Pure transform from raw bytes to the model input tensor. Identical bytes
/// always produce bit-identical output; no caching, no randomness, no model
/// dependency.
pub struct Preprocessor {
    image_size: u32,
}

impl Preprocessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            image_size: config.image_size,
        }
    }

    /// Decode, convert to RGB, bilinear-resize to the configured square,
    /// normalize each channel with `v / 127.5 - 1.0`, add the batch dim.
    pub fn preprocess(&self, bytes: &[u8]) -> Result<PreprocessedTensor, ValidationError> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| ValidationError::Corrupt(err.to_string()))?;

        let rgb = img.to_rgb8();
        let resized =
            image::imageops::resize(&rgb, self.image_size, self.image_size, FilterType::Triangle);

        let data = resized
            .as_raw()
            .iter()
            .map(|&v| v as f32 / 127.5 - 1.0)
            .collect();

        Ok(PreprocessedTensor {
            data,
            height: self.image_size,
            width: self.image_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use image::ImageFormat;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(&PipelineConfig::default())
    }

    #[test]
    fn test_output_shape_and_range() {
        let bytes = testutil::encoded_image(300, 180, ImageFormat::Jpeg);
        let tensor = preprocessor().preprocess(&bytes).unwrap();

        assert_eq!(tensor.shape(), (1, 224, 224, 3));
        assert_eq!(tensor.data().len(), 224 * 224 * 3);
        assert!(tensor.data().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_identical_bytes_produce_bit_identical_tensors() {
        let bytes = testutil::encoded_image(640, 480, ImageFormat::Png);
        let a = preprocessor().preprocess(&bytes).unwrap();
        let b = preprocessor().preprocess(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalization_endpoints() {
        // A uniform image survives resizing unchanged, so the exact
        // per-channel normalization is observable.
        let img = image::RgbImage::from_pixel(64, 64, image::Rgb([255, 0, 127]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();

        let tensor = preprocessor().preprocess(&buf.into_inner()).unwrap();
        let px = &tensor.data()[..3];
        assert_eq!(px[0], 255.0 / 127.5 - 1.0);
        assert_eq!(px[1], -1.0);
        assert_eq!(px[2], 127.0 / 127.5 - 1.0);
    }

    #[test]
    fn test_grayscale_input_expands_to_rgb() {
        let img = image::GrayImage::from_pixel(120, 120, image::Luma([200]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();

        let tensor = preprocessor().preprocess(&buf.into_inner()).unwrap();
        assert_eq!(tensor.shape(), (1, 224, 224, 3));
        let px = &tensor.data()[..3];
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let err = preprocessor().preprocess(b"not an image").unwrap_err();
        assert!(matches!(err, ValidationError::Corrupt(_)));
    }

    #[test]
    fn test_configured_size_is_respected() {
        let config = PipelineConfig {
            image_size: 96,
            ..Default::default()
        };
        let bytes = testutil::encoded_image(200, 200, ImageFormat::Png);
        let tensor = Preprocessor::new(&config).preprocess(&bytes).unwrap();
        assert_eq!(tensor.shape(), (1, 96, 96, 3));
    }
}
