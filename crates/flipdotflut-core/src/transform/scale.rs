use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{HEIGHT, WIDTH};

/// How a source of arbitrary aspect ratio maps onto the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Resize to exactly WIDTH×HEIGHT, ignoring aspect ratio.
    Stretch,
    /// Cover the display, cropping overflow.
    #[default]
    Fill,
    /// Fit inside the display, leaving a dark border.
    Fit,
    /// No resize; center crop/pad the source as-is.
    Crop,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 4] = [
        ScaleMode::Stretch,
        ScaleMode::Fill,
        ScaleMode::Fit,
        ScaleMode::Crop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMode::Stretch => "stretch",
            ScaleMode::Fill => "fill",
            ScaleMode::Fit => "fit",
            ScaleMode::Crop => "crop",
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scale mode '{0}' (expected stretch, fill, fit or crop)")]
pub struct ScaleModeParseError(pub String);

impl FromStr for ScaleMode {
    type Err = ScaleModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ScaleMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ScaleModeParseError(value.to_string()))
    }
}

/// Resize target for a `width`×`height` source, or `None` when the mode
/// keeps the source size.
///
/// `fill` resizes height-first when the source is wider than the display,
/// `fit` when it is narrower; the other axis follows the source aspect ratio
/// (floored, at least 1).
///
/// # Examples
/// ```
/// use flipdotflut_core::transform::{ScaleMode, target_size};
///
/// assert_eq!(target_size(ScaleMode::Stretch, 640, 480), Some((112, 16)));
/// assert_eq!(target_size(ScaleMode::Fill, 640, 480), Some((112, 84)));
/// assert_eq!(target_size(ScaleMode::Fit, 640, 480), Some((21, 16)));
/// assert_eq!(target_size(ScaleMode::Crop, 640, 480), None);
/// ```
pub fn target_size(mode: ScaleMode, width: u32, height: u32) -> Option<(u32, u32)> {
    let (display_w, display_h) = (WIDTH as u64, HEIGHT as u64);
    let (src_w, src_h) = (u64::from(width), u64::from(height));
    let height_first = match mode {
        ScaleMode::Stretch => return Some((WIDTH as u32, HEIGHT as u32)),
        ScaleMode::Crop => return None,
        ScaleMode::Fill | ScaleMode::Fit if src_w == 0 || src_h == 0 => return None,
        ScaleMode::Fill => src_w * display_h > display_w * src_h,
        ScaleMode::Fit => src_w * display_h < display_w * src_h,
    };

    let (target_w, target_h) = if height_first {
        (display_h * src_w / src_h, display_h)
    } else {
        (display_w, display_w * src_h / src_w)
    };
    Some((clamp_dimension(target_w), clamp_dimension(target_h)))
}

fn clamp_dimension(value: u64) -> u32 {
    value.clamp(1, u64::from(u32::MAX)) as u32
}

/// Largest intermediate `fill` resize; beyond it only the region that
/// survives the center crop is resized.
pub const MAX_INTERMEDIATE_PIXELS: u64 = 1 << 20;

/// Source rectangle `(x, y, width, height)` that `fill` keeps after its
/// center crop, or `None` for an empty source.
///
/// # Examples
/// ```
/// use flipdotflut_core::transform::fill_source_window;
///
/// // 1×100000 fills as 112×11200000; only one source row survives.
/// assert_eq!(fill_source_window(1, 100_000), Some((0, 49_999, 1, 1)));
/// assert_eq!(fill_source_window(224, 32), Some((0, 0, 224, 32)));
/// ```
pub fn fill_source_window(width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let (target_w, target_h) = target_size(ScaleMode::Fill, width, height)?;
    let (x, span_w) = source_span(width, target_w, WIDTH as u32);
    let (y, span_h) = source_span(height, target_h, HEIGHT as u32);
    Some((x, y, span_w, span_h))
}

/// Map the centered `display`-wide crop of a `target`-wide resize back onto
/// a `source`-wide axis.
fn source_span(source: u32, target: u32, display: u32) -> (u32, u32) {
    let (source, target) = (u64::from(source), u64::from(target));
    let keep = u64::from(display).min(target);
    let start = (target - keep) / 2 * source / target;
    let span = (keep * source).div_ceil(target).clamp(1, source - start);
    (start as u32, span as u32)
}

/// Resize `image` per `mode`. Sources already at the target size are
/// returned unchanged.
pub fn scale(image: &GrayImage, mode: ScaleMode, filter: FilterType) -> GrayImage {
    let (width, height) = image.dimensions();
    match target_size(mode, width, height) {
        Some(target) if target != (width, height) && width > 0 && height > 0 => {
            let pixels = u64::from(target.0) * u64::from(target.1);
            if mode == ScaleMode::Fill && pixels > MAX_INTERMEDIATE_PIXELS {
                return fill_window(image, target, filter);
            }
            imageops::resize(image, target.0, target.1, filter)
        }
        _ => image.clone(),
    }
}

/// `fill` for extreme aspect ratios: crop in source coordinates, then resize
/// straight to the cropped size.
fn fill_window(image: &GrayImage, target: (u32, u32), filter: FilterType) -> GrayImage {
    let (width, height) = image.dimensions();
    let Some((x, y, span_w, span_h)) = fill_source_window(width, height) else {
        return image.clone();
    };
    let window = imageops::crop_imm(image, x, y, span_w, span_h).to_image();
    let out_w = target.0.min(WIDTH as u32);
    let out_h = target.1.min(HEIGHT as u32);
    imageops::resize(&window, out_w, out_h, filter)
}

/// Crop symmetrically down to at most WIDTH×HEIGHT; `(src - target) / 2`
/// (floored) is removed from the leading edge.
pub fn center_crop(image: GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let crop_w = width.min(WIDTH as u32);
    let crop_h = height.min(HEIGHT as u32);
    if (crop_w, crop_h) == (width, height) {
        return image;
    }
    let left = (width - crop_w) / 2;
    let top = (height - crop_h) / 2;
    imageops::crop_imm(&image, left, top, crop_w, crop_h).to_image()
}
