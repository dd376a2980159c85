use std::collections::VecDeque;
use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use super::ffmpeg::FfmpegDecoder;
use super::{FrameSource, SourceError};
use crate::Frame;
use crate::transform::{Binarization, DEFAULT_THRESHOLD, TransformConfig, to_frame};

/// Supplier of decoded video frames, in presentation order.
pub trait VideoDecoder {
    /// Next decoded frame, or `Ok(None)` at end of stream.
    fn next_image(&mut self) -> Result<Option<DynamicImage>, SourceError>;
}

impl VideoDecoder for VecDeque<DynamicImage> {
    fn next_image(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        Ok(self.pop_front())
    }
}

/// Decoded video, transformed frame by frame with a hard threshold.
///
/// Once the decoder reports end of stream the source stays exhausted.
pub struct VideoFrames {
    decoder: Box<dyn VideoDecoder>,
    config: TransformConfig,
    decoded: u64,
    exhausted: bool,
}

impl VideoFrames {
    /// Wrap a decoder. Dithering in `config` is replaced by the midpoint
    /// threshold; video frames are never dithered.
    pub fn new(decoder: impl VideoDecoder + 'static, config: TransformConfig) -> Self {
        let config = match config.binarization {
            Binarization::Threshold(_) => config,
            Binarization::Dither => {
                config.with_binarization(Binarization::Threshold(DEFAULT_THRESHOLD))
            }
        };
        Self {
            decoder: Box::new(decoder),
            config,
            decoded: 0,
            exhausted: false,
        }
    }

    /// Open a video file through the system `ffmpeg`.
    pub fn open(path: &Path, config: TransformConfig) -> Result<Self, SourceError> {
        let decoder = FfmpegDecoder::open(path)?;
        Ok(Self::new(decoder, config))
    }

    pub fn frames_decoded(&self) -> u64 {
        self.decoded
    }
}

impl FrameSource for VideoFrames {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.exhausted {
            return Ok(None);
        }
        match self.decoder.next_image()? {
            Some(image) => {
                self.decoded += 1;
                Ok(Some(to_frame(&image, &self.config)))
            }
            None => {
                debug!(frames = self.decoded, "video stream ended");
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gray(value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(320, 240, Luma([value])))
    }

    #[test]
    fn empty_stream_is_exhausted_immediately() {
        let mut video = VideoFrames::new(VecDeque::new(), TransformConfig::video());
        assert!(video.next_frame().unwrap().is_none());
        assert!(video.next_frame().unwrap().is_none());
        assert_eq!(video.frames_decoded(), 0);
    }

    #[test]
    fn frames_are_thresholded_not_dithered() {
        let clip: VecDeque<_> = [gray(200), gray(100)].into_iter().collect();
        let config = TransformConfig::still_image().with_scale(crate::transform::ScaleMode::Fill);
        let mut video = VideoFrames::new(clip, config);

        assert_eq!(video.next_frame().unwrap().unwrap(), Frame::filled());
        assert_eq!(video.next_frame().unwrap().unwrap(), Frame::blank());
        assert!(video.next_frame().unwrap().is_none());
        assert_eq!(video.frames_decoded(), 2);
    }

    struct FailingDecoder;

    impl VideoDecoder for FailingDecoder {
        fn next_image(&mut self) -> Result<Option<DynamicImage>, SourceError> {
            Err(SourceError::VideoDecode("corrupt packet".to_string()))
        }
    }

    #[test]
    fn decoder_errors_propagate() {
        let mut video = VideoFrames::new(FailingDecoder, TransformConfig::video());
        let err = video.next_frame().unwrap_err();
        assert!(err.to_string().contains("corrupt packet"));
    }
}
