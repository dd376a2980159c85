use flipdotflut_core::transform::{
    Binarization, DEFAULT_THRESHOLD, ScaleMode, TransformConfig, luma_to_frame,
};
use flipdotflut_core::{Frame, HEIGHT, WIDTH};
use image::{GrayImage, Luma};

fn threshold(scale: ScaleMode) -> TransformConfig {
    TransformConfig::still_image()
        .with_scale(scale)
        .with_binarization(Binarization::Threshold(DEFAULT_THRESHOLD))
}

fn white(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

#[test]
fn every_input_size_yields_a_full_frame() {
    for (width, height) in [(1, 1), (112, 16), (4000, 3000), (1, 1000)] {
        let image = white(width, height);

        let stretch = luma_to_frame(&image, &threshold(ScaleMode::Stretch));
        assert_eq!(stretch, Frame::filled(), "stretch {width}x{height}");

        let fill = luma_to_frame(&image, &threshold(ScaleMode::Fill));
        assert_eq!(fill, Frame::filled(), "fill leaves no padding {width}x{height}");

        let fit = luma_to_frame(&image, &threshold(ScaleMode::Fit));
        assert!(fit.lit_count() > 0, "fit {width}x{height}");
        assert_eq!(fit.rows().count(), HEIGHT);

        let crop = luma_to_frame(&image, &threshold(ScaleMode::Crop));
        let expected = (width.min(WIDTH as u32) * height.min(HEIGHT as u32)) as usize;
        assert_eq!(crop.lit_count(), expected, "crop {width}x{height}");
    }
}

#[test]
fn fit_keeps_the_whole_image() {
    let frame = luma_to_frame(&white(4000, 3000), &threshold(ScaleMode::Fit));
    // 4000x3000 fits as 21x16, centered horizontally.
    assert_eq!(frame.lit_count(), 21 * HEIGHT);
    let left = (WIDTH - 21) / 2;
    for row in 0..HEIGHT {
        assert!(!frame.get(left - 1, row));
        assert!(frame.get(left, row));
        assert!(frame.get(left + 20, row));
        assert!(!frame.get(left + 21, row));
    }

    let tall = luma_to_frame(&white(1, 1000), &threshold(ScaleMode::Fit));
    assert_eq!(tall.lit_count(), HEIGHT);
    assert!((0..HEIGHT).all(|row| tall.get((WIDTH - 1) / 2, row)));
}

#[test]
fn stretch_halves_a_double_size_source_exactly() {
    // Vertical stripes two source pixels wide collapse to one-dot columns.
    let image = GrayImage::from_fn(224, 32, |x, _| {
        if (x / 2) % 2 == 0 { Luma([255]) } else { Luma([0]) }
    });
    let frame = luma_to_frame(&image, &threshold(ScaleMode::Stretch));
    let expected = Frame::from_fn(|column, _| column % 2 == 0);
    assert_eq!(frame, expected);
}

#[test]
fn crop_centers_without_scaling() {
    let image = GrayImage::from_fn(224, 32, |x, y| {
        if x == 56 && y == 8 { Luma([255]) } else { Luma([0]) }
    });
    let cropped = luma_to_frame(&image, &threshold(ScaleMode::Crop));
    assert_eq!(cropped.lit_count(), 1);
    assert!(cropped.get(0, 0));

    let stretched = luma_to_frame(&image, &threshold(ScaleMode::Stretch));
    assert_ne!(stretched, cropped);
}

#[test]
fn small_crop_source_is_padded_dark_even_when_inverted() {
    let config = threshold(ScaleMode::Crop).with_invert(true);
    let frame = luma_to_frame(&GrayImage::from_pixel(2, 2, Luma([0])), &config);
    assert_eq!(frame.lit_count(), 4);
    assert!(frame.get(55, 7) && frame.get(56, 8));
}

#[test]
fn dithered_mid_gray_is_mixed() {
    let image = GrayImage::from_pixel(WIDTH as u32, HEIGHT as u32, Luma([128]));
    let frame = luma_to_frame(&image, &TransformConfig::still_image());
    let lit = frame.lit_count();
    assert!(lit > 0 && lit < WIDTH * HEIGHT);
}
