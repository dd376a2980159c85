//! Frame sources.
//!
//! Every source implements [`FrameSource`]: one `next_frame` call per
//! streaming iteration. Infinite sources never return `Ok(None)`; finite
//! ones (video) return it once exhausted and are not restartable. The
//! [`Source`] enum is the tagged union the CLI builds once per session.
//!
//! All media I/O (image files, the video decoder subprocess) is confined to
//! this module; the rest of the pipeline only sees [`Frame`]s.

mod ffmpeg;
mod gradient;
mod pattern;
mod still;
mod video;

pub use ffmpeg::FfmpegDecoder;
pub use gradient::{
    AnimatedGradient, Clock, FixedClock, MotionProfile, StaticGradient, SystemClock, TILE_SIZE,
    gradient_offset, radial_gradient,
};
pub use pattern::{PatternKind, ProceduralPattern};
pub use still::StaticImage;
pub use video::{VideoDecoder, VideoFrames};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Frame;

/// Producer of successive frames.
pub trait FrameSource {
    /// Next frame, or `Ok(None)` once a finite source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;

    /// Whether the source can run out of frames on its own.
    fn is_finite(&self) -> bool;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).next_frame()
    }

    fn is_finite(&self) -> bool {
        (**self).is_finite()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode failed ({path}): {message}")]
    Image { path: String, message: String },
    #[error("video open failed ({path}): {message}")]
    VideoOpen { path: String, message: String },
    #[error("video decode failed: {0}")]
    VideoDecode(String),
}

/// Source variant tag, used for per-variant defaults and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StaticGradient,
    AnimatedGradient,
    StaticImage,
    Pattern,
    Video,
}

/// The frame source selected for a session.
pub enum Source {
    StaticGradient(StaticGradient),
    AnimatedGradient(AnimatedGradient),
    StaticImage(StaticImage),
    Pattern(ProceduralPattern),
    Video(VideoFrames),
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::StaticGradient(_) => SourceKind::StaticGradient,
            Source::AnimatedGradient(_) => SourceKind::AnimatedGradient,
            Source::StaticImage(_) => SourceKind::StaticImage,
            Source::Pattern(_) => SourceKind::Pattern,
            Source::Video(_) => SourceKind::Video,
        }
    }
}

impl FrameSource for Source {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        match self {
            Source::StaticGradient(source) => source.next_frame(),
            Source::AnimatedGradient(source) => source.next_frame(),
            Source::StaticImage(source) => source.next_frame(),
            Source::Pattern(source) => source.next_frame(),
            Source::Video(source) => source.next_frame(),
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Source::StaticGradient(source) => source.is_finite(),
            Source::AnimatedGradient(source) => source.is_finite(),
            Source::StaticImage(source) => source.is_finite(),
            Source::Pattern(source) => source.is_finite(),
            Source::Video(source) => source.is_finite(),
        }
    }
}

impl From<StaticGradient> for Source {
    fn from(source: StaticGradient) -> Self {
        Source::StaticGradient(source)
    }
}

impl From<AnimatedGradient> for Source {
    fn from(source: AnimatedGradient) -> Self {
        Source::AnimatedGradient(source)
    }
}

impl From<StaticImage> for Source {
    fn from(source: StaticImage) -> Self {
        Source::StaticImage(source)
    }
}

impl From<ProceduralPattern> for Source {
    fn from(source: ProceduralPattern) -> Self {
        Source::Pattern(source)
    }
}

impl From<VideoFrames> for Source {
    fn from(source: VideoFrames) -> Self {
        Source::Video(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn only_video_is_finite() {
        let pattern: Source = ProceduralPattern::new(PatternKind::Fill).into();
        assert_eq!(pattern.kind(), SourceKind::Pattern);
        assert!(!pattern.is_finite());

        let gradient: Source = StaticGradient::new(Default::default(), false).into();
        assert!(!gradient.is_finite());

        let video: Source =
            VideoFrames::new(VecDeque::<image::DynamicImage>::new(), Default::default()).into();
        assert_eq!(video.kind(), SourceKind::Video);
        assert!(video.is_finite());
    }

    #[test]
    fn dispatches_to_variant() {
        let mut source: Source = ProceduralPattern::new(PatternKind::Fill).into();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame, Frame::filled());
    }
}
