use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use super::{FrameSource, SourceError};
use crate::Frame;
use crate::transform::{TransformConfig, to_frame};

/// One decoded image, transformed once and replayed every iteration.
#[derive(Debug, Clone)]
pub struct StaticImage {
    frame: Frame,
}

impl StaticImage {
    pub fn open(path: &Path, config: &TransformConfig) -> Result<Self, SourceError> {
        let image = image::open(path).map_err(|err| SourceError::Image {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            scale = %config.scale,
            "decoded still image"
        );
        Ok(Self::from_image(&image, config))
    }

    pub fn from_image(image: &DynamicImage, config: &TransformConfig) -> Self {
        Self {
            frame: to_frame(image, config),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for StaticImage {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        Ok(Some(self.frame.clone()))
    }

    fn is_finite(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn open_missing_file_is_an_image_error() {
        let path = std::env::temp_dir().join("flipdotflut_missing_image.png");
        let err = match StaticImage::open(&path, &TransformConfig::still_image()) {
            Ok(_) => panic!("expected missing image to be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, SourceError::Image { .. }));
    }

    #[test]
    fn color_images_are_transformed_once() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([255, 255, 255])));
        let mut source = StaticImage::from_image(&image, &TransformConfig::still_image());
        assert_eq!(source.frame(), &Frame::filled());
        assert_eq!(source.next_frame().unwrap().unwrap(), Frame::filled());
        assert_eq!(source.next_frame().unwrap().unwrap(), Frame::filled());
    }
}
