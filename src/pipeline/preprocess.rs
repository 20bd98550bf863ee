//! Slide image preprocessing for classifier input.
//!
//! The classifier was trained on 128x128 RGB crops scaled to [0, 1], so this
//! module does exactly that and nothing else: decode, stretch-resize to the
//! training resolution (aspect ratio is deliberately not preserved), scale
//! each channel by 1/255. No padding, no normalization constants, no
//! channel reordering — the tensor layout is NHWC to match the model's
//! channels-last export.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;
use tracing::debug;

use super::ClassifierError;

/// Input edge length the classifier was trained on.
pub const CLASSIFIER_INPUT_SIZE: u32 = 128;

/// RGB channels.
pub const CLASSIFIER_INPUT_CHANNELS: usize = 3;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// A slide ready for inference.
#[derive(Debug, Clone)]
pub struct SlideTensor {
    /// Pixel data, shape `[1, 128, 128, 3]`, values in [0, 1].
    pub pixels: Array4<f32>,
    /// Dimensions before the stretch-resize, for logging and reports.
    pub original_width: u32,
    pub original_height: u32,
}

/// Load a slide image from disk and prepare it for the classifier.
pub fn preprocess_slide(path: &Path) -> Result<SlideTensor, ClassifierError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ClassifierError::ImageLoad(format!("Cannot read {}: {e}", path.display())))?;
    preprocess_slide_bytes(&bytes)
}

/// Prepare raw image bytes (PNG, JPEG, TIFF) for the classifier.
pub fn preprocess_slide_bytes(bytes: &[u8]) -> Result<SlideTensor, ClassifierError> {
    validate_image_bytes(bytes)?;

    let img = image::load_from_memory(bytes)
        .map_err(|e| ClassifierError::ImageLoad(format!("Failed to decode image: {e}")))?;

    Ok(tensor_from_image(&img))
}

/// Validate image bytes before decoding.
/// Returns early error for clearly invalid input — saves decode time.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ClassifierError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ClassifierError::ImageLoad(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ClassifierError::ImageLoad(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

fn tensor_from_image(img: &DynamicImage) -> SlideTensor {
    let (orig_w, orig_h) = img.dimensions();

    let rgb: RgbImage = img.to_rgb8();
    let resized = image::imageops::resize(
        &rgb,
        CLASSIFIER_INPUT_SIZE,
        CLASSIFIER_INPUT_SIZE,
        FilterType::Triangle,
    );

    let size = CLASSIFIER_INPUT_SIZE as usize;
    let mut pixels = Array4::<f32>::zeros((1, size, size, CLASSIFIER_INPUT_CHANNELS));
    for (x, y, p) in resized.enumerate_pixels() {
        for c in 0..CLASSIFIER_INPUT_CHANNELS {
            pixels[[0, y as usize, x as usize, c]] = f32::from(p.0[c]) / 255.0;
        }
    }

    debug!(
        original = format!("{orig_w}x{orig_h}"),
        output = format!("{size}x{size}"),
        "Slide image preprocessed for classifier"
    );

    SlideTensor {
        pixels,
        original_width: orig_w,
        original_height: orig_h,
    }
}
