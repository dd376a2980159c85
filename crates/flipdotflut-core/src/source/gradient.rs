use std::fmt;
use std::str::FromStr;

use image::imageops;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{FrameSource, SourceError};
use crate::transform::{Binarization, binarize, pad_to_frame};
use crate::{Frame, HEIGHT, WIDTH};

/// Edge length of the radial gradient tile.
pub const TILE_SIZE: u32 = 256;

/// 256×256 radial gradient: black at the centre, white from radius 127.5 out.
///
/// # Examples
/// ```
/// use flipdotflut_core::source::radial_gradient;
///
/// let tile = radial_gradient();
/// assert_eq!(tile.get_pixel(128, 128).0[0], 0);
/// assert_eq!(tile.get_pixel(0, 0).0[0], 255);
/// ```
pub fn radial_gradient() -> GrayImage {
    let center = f64::from(TILE_SIZE / 2);
    GrayImage::from_fn(TILE_SIZE, TILE_SIZE, |x, y| {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        let distance = (dx * dx + dy * dy).sqrt() * 2.0;
        Luma([distance.min(255.0) as u8])
    })
}

/// Source of wall-clock time, in seconds.
pub trait Clock {
    fn now_seconds(&self) -> f64;
}

/// Real time since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 * 1e-9
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now_seconds(&self) -> f64 {
        self.0
    }
}

impl<F: Fn() -> f64> Clock for F {
    fn now_seconds(&self) -> f64 {
        self()
    }
}

/// How the gradient tile moves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionProfile {
    /// Sweeps a white-centred tile so it always covers the whole display.
    #[default]
    Drift,
    /// Swings the tile around the origin; uncovered cells keep older content.
    Orbit,
}

impl MotionProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionProfile::Drift => "drift",
            MotionProfile::Orbit => "orbit",
        }
    }
}

impl fmt::Display for MotionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionProfile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "drift" => Ok(MotionProfile::Drift),
            "orbit" => Ok(MotionProfile::Orbit),
            other => Err(format!("unknown motion profile '{other}'")),
        }
    }
}

/// Top-left canvas position of the tile at time `t` (seconds).
///
/// # Examples
/// ```
/// use flipdotflut_core::source::{MotionProfile, gradient_offset};
///
/// assert_eq!(gradient_offset(MotionProfile::Drift, 0.0), (-72, -240));
/// assert_eq!(gradient_offset(MotionProfile::Orbit, 0.0), (0, 0));
/// ```
pub fn gradient_offset(profile: MotionProfile, t: f64) -> (i64, i64) {
    let tile = f64::from(TILE_SIZE);
    let (x, y) = match profile {
        MotionProfile::Drift => (
            (WIDTH as f64 - tile) / 2.0 * (1.0 + t.sin()),
            (HEIGHT as f64 - tile) / 2.0 * (1.0 + (t / 2.3245).cos()),
        ),
        MotionProfile::Orbit => (128.0 * (t * 2.3245).sin(), 128.0 * (t / 2.345).sin()),
    };
    (x.floor() as i64, y.floor() as i64)
}

fn blank_canvas() -> GrayImage {
    GrayImage::new(WIDTH as u32, HEIGHT as u32)
}

fn centered_offset() -> (i64, i64) {
    let tile = i64::from(TILE_SIZE);
    ((WIDTH as i64 - tile) / 2, (HEIGHT as i64 - tile) / 2)
}

/// The gradient tile centred on the display, rendered once.
pub struct StaticGradient {
    frame: Frame,
}

impl StaticGradient {
    pub fn new(binarization: Binarization, invert: bool) -> Self {
        let mut canvas = blank_canvas();
        let (x, y) = centered_offset();
        imageops::replace(&mut canvas, &radial_gradient(), x, y);
        let frame = pad_to_frame(&binarize(canvas, binarization), invert);
        Self { frame }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for StaticGradient {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        Ok(Some(self.frame.clone()))
    }

    fn is_finite(&self) -> bool {
        false
    }
}

/// Gradient tile sliding over a persistent canvas, driven by a clock.
pub struct AnimatedGradient {
    tile: GrayImage,
    canvas: GrayImage,
    profile: MotionProfile,
    binarization: Binarization,
    invert: bool,
    clock: Box<dyn Clock>,
}

impl AnimatedGradient {
    /// `drift` pastes a white-centred tile unless `invert` is set, and
    /// `invert` then restores the plain tile; the canvas it slides over
    /// stays dark either way. `orbit` uses the plain tile and inverts the
    /// output.
    pub fn new(profile: MotionProfile, binarization: Binarization, invert: bool) -> Self {
        let mut tile = radial_gradient();
        let invert_output = match profile {
            MotionProfile::Drift => {
                if !invert {
                    imageops::invert(&mut tile);
                }
                false
            }
            MotionProfile::Orbit => invert,
        };
        Self {
            tile,
            canvas: blank_canvas(),
            profile,
            binarization,
            invert: invert_output,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn profile(&self) -> MotionProfile {
        self.profile
    }

    /// Paste the tile at its position for time `t` and binarize the canvas.
    pub fn frame_at(&mut self, t: f64) -> Frame {
        let (x, y) = gradient_offset(self.profile, t);
        imageops::replace(&mut self.canvas, &self.tile, x, y);
        let binary = binarize(self.canvas.clone(), self.binarization);
        pad_to_frame(&binary, self.invert)
    }
}

impl FrameSource for AnimatedGradient {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let t = self.clock.now_seconds();
        Ok(Some(self.frame_at(t)))
    }

    fn is_finite(&self) -> bool {
        false
    }
}
