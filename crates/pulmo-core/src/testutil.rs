//! Shared test fixtures: loadable model artifacts and encoded test images.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::model::artifact::{CONFIG_FILE, METADATA_FILE, WEIGHTS_FILE};
use crate::model::metadata::ModelConfig;
use crate::model::network::ClassifierNetwork;

/// Small network configuration that keeps test artifacts fast to load.
pub fn small_model_config() -> ModelConfig {
    ModelConfig {
        classes: vec![
            "normal".to_string(),
            "pneumonia".to_string(),
            "tuberculose".to_string(),
        ],
        img_height: 32,
        img_width: 32,
        stem_channels: 4,
        block_channels: vec![8, 8],
    }
}

/// Write a complete, loadable model artifact directory under `root`.
pub fn write_artifact(root: &Path, name: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();

    let config = small_model_config();
    std::fs::write(
        dir.join(CONFIG_FILE),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.join(METADATA_FILE),
        r#"{"nome": "PulmoVision", "versao": "1.0.0", "arquitetura": "SeparableCNN"}"#,
    )
    .unwrap();

    // Materialize correctly-shaped weights by building the network once.
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    ClassifierNetwork::load(&config, vb).unwrap();
    varmap.save(dir.join(WEIGHTS_FILE)).unwrap();
}

/// Encode a gradient RGB image; decodes as a well-formed JPEG or PNG.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 7 + y * 13) % 256) as u8;
        image::Rgb([v, v / 2, 255 - v])
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Encode a grayscale-looking image with radiograph-like statistics
/// (mid intensity mean, high contrast).
pub fn encoded_xray_like(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        let v = if (x / 8) % 2 == 0 { 40u8 } else { 190u8 };
        image::Rgb([v, v, v])
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Encode a flat bright image that fails the radiograph heuristic.
pub fn encoded_flat_image(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([230, 230, 230]));
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
