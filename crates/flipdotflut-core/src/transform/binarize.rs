use image::GrayImage;
use image::imageops::{self, BiLevel};
use serde::{Deserialize, Serialize};

/// Midpoint threshold: luma strictly above it is lit.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Reduction of 8-bit luma to two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binarization {
    /// Floyd–Steinberg error diffusion.
    #[default]
    Dither,
    /// Hard threshold; luma strictly above the value is lit.
    Threshold(u8),
}

/// Binarize in place; every output pixel is either 0 or 255.
pub fn binarize(mut image: GrayImage, mode: Binarization) -> GrayImage {
    match mode {
        Binarization::Dither => imageops::dither(&mut image, &BiLevel),
        Binarization::Threshold(threshold) => {
            for pixel in image.pixels_mut() {
                pixel.0[0] = if pixel.0[0] > threshold { u8::MAX } else { 0 };
            }
        }
    }
    image
}
