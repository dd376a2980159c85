use std::num::NonZeroU32;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::SourceKind;

/// Sleep inserted after every row and after every frame.
/// `Duration::ZERO` disables the corresponding pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pacing {
    pub per_row: Duration,
    pub per_frame: Duration,
}

impl Pacing {
    pub const fn none() -> Self {
        Self {
            per_row: Duration::ZERO,
            per_frame: Duration::ZERO,
        }
    }

    pub const fn per_row(delay: Duration) -> Self {
        Self {
            per_row: delay,
            per_frame: Duration::ZERO,
        }
    }

    pub const fn per_frame(delay: Duration) -> Self {
        Self {
            per_row: Duration::ZERO,
            per_frame: delay,
        }
    }

    pub fn is_none(&self) -> bool {
        self.per_row.is_zero() && self.per_frame.is_zero()
    }
}

/// How many frames a session streams before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Iterations {
    Count(NonZeroU32),
    /// Until the source runs dry or the process is terminated.
    Forever,
}

impl Iterations {
    pub const ONCE: Iterations = Iterations::Count(NonZeroU32::MIN);

    /// Whether `frames` already satisfies the iteration limit.
    pub fn is_done(&self, frames: u64) -> bool {
        match self {
            Iterations::Count(count) => frames >= u64::from(count.get()),
            Iterations::Forever => false,
        }
    }
}

/// Per-session streaming settings, immutable once the session starts.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use flipdotflut_core::source::SourceKind;
/// use flipdotflut_core::stream::{Iterations, StreamConfig};
///
/// let config = StreamConfig::for_source(SourceKind::StaticImage);
/// assert_eq!(config.iterations, Iterations::ONCE);
/// assert_eq!(config.pacing.per_row, Duration::from_millis(1));
///
/// let video = StreamConfig::for_source(SourceKind::Video).without_pacing();
/// assert_eq!(video.iterations, Iterations::Forever);
/// assert!(video.pacing.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub pacing: Pacing,
    pub iterations: Iterations,
    /// Render every streamed row to the debug renderer.
    pub debug: bool,
}

impl StreamConfig {
    /// Defaults for each kind of source.
    pub fn for_source(kind: SourceKind) -> Self {
        let (pacing, iterations) = match kind {
            SourceKind::StaticImage => (
                Pacing::per_row(Duration::from_millis(1)),
                Iterations::ONCE,
            ),
            SourceKind::Pattern => (Pacing::none(), Iterations::ONCE),
            SourceKind::StaticGradient | SourceKind::AnimatedGradient => (
                Pacing::per_frame(Duration::from_millis(10)),
                Iterations::Forever,
            ),
            SourceKind::Video => (
                Pacing::per_frame(Duration::from_millis(25)),
                Iterations::Forever,
            ),
        };
        Self {
            pacing,
            iterations,
            debug: false,
        }
    }

    pub fn without_pacing(mut self) -> Self {
        self.pacing = Pacing::none();
        self
    }

    pub fn with_iterations(mut self, iterations: Iterations) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
