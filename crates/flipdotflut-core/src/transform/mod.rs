//! Image -> Frame transform pipeline.
//!
//! Steps, in order:
//! 1. convert to 8-bit luma
//! 2. scale according to [`ScaleMode`]
//! 3. center crop anything larger than WIDTH×HEIGHT
//! 4. binarize (Floyd–Steinberg dithering or a hard threshold)
//! 5. optional inversion
//! 6. center pad with unlit cells up to exactly WIDTH×HEIGHT
//!
//! Padding happens after inversion, so a border introduced by `fit` (or by a
//! small `crop` source) is always dark. Every path yields a full-size
//! [`Frame`].

mod binarize;
mod scale;

pub use binarize::{Binarization, DEFAULT_THRESHOLD, binarize};
pub use scale::{
    MAX_INTERMEDIATE_PIXELS, ScaleMode, ScaleModeParseError, center_crop, fill_source_window, scale,
    target_size,
};

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

use crate::{Frame, HEIGHT, WIDTH};

/// Immutable transform settings shared by the image-backed sources.
///
/// # Examples
/// ```
/// use flipdotflut_core::transform::{Binarization, ScaleMode, TransformConfig};
///
/// let config = TransformConfig::still_image().with_scale(ScaleMode::Fit);
/// assert_eq!(config.scale, ScaleMode::Fit);
/// assert_eq!(config.binarization, Binarization::Dither);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    pub scale: ScaleMode,
    pub binarization: Binarization,
    pub invert: bool,
    pub filter: FilterType,
}

impl TransformConfig {
    /// Defaults for still images: fill, dithered, cubic resampling.
    pub fn still_image() -> Self {
        Self {
            scale: ScaleMode::Fill,
            binarization: Binarization::Dither,
            invert: false,
            filter: FilterType::CatmullRom,
        }
    }

    /// Defaults for video frames: fill, hard threshold, area-like resampling.
    pub fn video() -> Self {
        Self {
            scale: ScaleMode::Fill,
            binarization: Binarization::Threshold(DEFAULT_THRESHOLD),
            invert: false,
            filter: FilterType::Triangle,
        }
    }

    pub fn with_scale(mut self, scale: ScaleMode) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_binarization(mut self, binarization: Binarization) -> Self {
        self.binarization = binarization;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::still_image()
    }
}

/// Run the full pipeline on a decoded image of any size or color type.
pub fn to_frame(image: &DynamicImage, config: &TransformConfig) -> Frame {
    luma_to_frame(&image.to_luma8(), config)
}

/// Run the pipeline on an 8-bit luma image.
///
/// Inversion is applied to the binarized image before it is padded, so the
/// letterbox border of `fit` (or a small `crop`) stays dark even with
/// `invert` set.
pub fn luma_to_frame(image: &GrayImage, config: &TransformConfig) -> Frame {
    let scaled = scale(image, config.scale, config.filter);
    let cropped = center_crop(scaled);
    let binary = binarize(cropped, config.binarization);
    pad_to_frame(&binary, config.invert)
}

/// Place a binarized image (lit = nonzero) centered on a blank frame.
///
/// Pixels outside the frame are dropped; cells not covered stay unlit
/// regardless of `invert`.
pub fn pad_to_frame(binary: &GrayImage, invert: bool) -> Frame {
    let (width, height) = binary.dimensions();
    let left = (WIDTH as u32).saturating_sub(width) / 2;
    let top = (HEIGHT as u32).saturating_sub(height) / 2;

    let mut frame = Frame::blank();
    for (x, y, pixel) in binary.enumerate_pixels() {
        let lit = (pixel.0[0] != 0) != invert;
        frame.set((left + x) as usize, (top + y) as usize, lit);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn solid(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    fn threshold_config(scale: ScaleMode) -> TransformConfig {
        TransformConfig::still_image()
            .with_scale(scale)
            .with_binarization(Binarization::Threshold(DEFAULT_THRESHOLD))
    }

    #[test]
    fn fit_border_stays_dark_when_inverted() {
        // 224x16 fits as 112x8, letterboxed into rows 4..12.
        let config = threshold_config(ScaleMode::Fit).with_invert(true);
        let frame = luma_to_frame(&solid(224, 16, 0), &config);
        for y in 0..HEIGHT {
            let expected = (4..12).contains(&y);
            assert!((0..WIDTH).all(|x| frame.get(x, y) == expected), "row {y}");
        }
    }

    #[test]
    fn exact_size_input_passes_through() {
        let image = GrayImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
            if (x + y) % 3 == 0 { Luma([255]) } else { Luma([0]) }
        });
        for mode in [ScaleMode::Stretch, ScaleMode::Fill, ScaleMode::Fit, ScaleMode::Crop] {
            let frame = luma_to_frame(&image, &threshold_config(mode));
            let expected = Frame::from_fn(|column, row| (column + row) % 3 == 0);
            assert_eq!(frame, expected, "mode {mode}");
        }
    }

    #[test]
    fn fit_pads_with_dark_border_even_when_inverted() {
        // 224x16 is twice as wide as the display: fit scales to 112x8.
        let image = solid(224, 16, 255);
        let frame = luma_to_frame(&image, &threshold_config(ScaleMode::Fit));
        for row in 0..HEIGHT {
            let lit = frame.row(row).unwrap().iter().all(|&c| c);
            assert_eq!(lit, (4..12).contains(&row), "row {row}");
        }

        let dark = solid(224, 16, 0);
        let inverted = luma_to_frame(&dark, &threshold_config(ScaleMode::Fit).with_invert(true));
        assert_eq!(inverted, frame);
    }

    #[test]
    fn invert_flips_every_cell_without_padding() {
        let image = GrayImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, _| Luma([(x * 2) as u8]));
        let config = threshold_config(ScaleMode::Stretch);
        let plain = luma_to_frame(&image, &config);
        let inverted = luma_to_frame(&image, &config.with_invert(true));
        assert_eq!(plain.inverted(), inverted);
    }

    #[test]
    fn dithering_midgray_lights_about_half() {
        let image = solid(WIDTH as u32, HEIGHT as u32, 128);
        let frame = luma_to_frame(&image, &TransformConfig::still_image());
        let lit = frame.lit_count();
        let total = WIDTH * HEIGHT;
        assert!(lit > total * 2 / 5 && lit < total * 3 / 5, "lit = {lit}");

        let thresholded = luma_to_frame(&image, &threshold_config(ScaleMode::Fill));
        assert_eq!(thresholded.lit_count(), total);
    }

    #[test]
    fn pad_centers_small_bitmaps() {
        let binary = solid(2, 2, 255);
        let frame = pad_to_frame(&binary, false);
        assert_eq!(frame.lit_count(), 4);
        assert!(frame.get(55, 7) && frame.get(56, 8));
        let inverted = pad_to_frame(&binary, true);
        assert_eq!(inverted.lit_count(), 0);
    }
}
