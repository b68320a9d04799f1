use crate::error::LabError;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Cut used when Otsu's method has nothing to separate.
///
/// OpenCV ignores its seed under `THRESH_OTSU` and lands on level 0 for a
/// single-intensity image, turning any non-black uniform page white. Here a
/// uniform page darker than this seed binarizes to black instead.
pub const SEED_THRESHOLD: u8 = 150;

/// Apply a global Otsu threshold with inverted classification.
///
/// Pixels brighter than the cut become 0 and the rest 255, so text ends up
/// white on black until the invert step restores the original polarity.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, LabError> {
    let gray = image.to_luma8();
    let level = select_level(&gray);
    tracing::debug!("Otsu threshold level: {}", level);
    Ok(DynamicImage::ImageLuma8(threshold(
        &gray,
        level,
        ThresholdType::BinaryInverted,
    )))
}

/// Otsu level, falling back to the seed for single-intensity images
pub fn select_level(gray: &GrayImage) -> u8 {
    let mut pixels = gray.pixels();
    let uniform = match pixels.next() {
        Some(first) => pixels.all(|p| p == first),
        None => true,
    };

    if uniform {
        SEED_THRESHOLD
    } else {
        otsu_level(gray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn text_on_paper() -> GrayImage {
        let mut img = GrayImage::from_pixel(40, 20, Luma([230]));
        for x in 5..35 {
            for y in 8..12 {
                img.put_pixel(x, y, Luma([25]));
            }
        }
        img
    }

    #[test]
    fn test_threshold_output_is_binary() {
        let img = GrayImage::from_fn(64, 8, |x, _| Luma([(x * 4) as u8]));
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();
        assert!(result.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_threshold_inverts_classification() {
        let result = apply(DynamicImage::ImageLuma8(text_on_paper()))
            .unwrap()
            .to_luma8();

        // Dark ink becomes white, bright paper becomes black
        assert_eq!(result.get_pixel(20, 10).0[0], 255);
        assert_eq!(result.get_pixel(20, 2).0[0], 0);
    }

    #[test]
    fn test_level_separates_ink_from_paper() {
        let level = select_level(&text_on_paper());
        assert!((25..230).contains(&level), "level {} out of band", level);
    }

    #[test]
    fn test_uniform_image_uses_seed() {
        let bright = GrayImage::from_pixel(10, 10, Luma([200]));
        assert_eq!(select_level(&bright), SEED_THRESHOLD);

        let result = apply(DynamicImage::ImageLuma8(bright)).unwrap().to_luma8();
        assert!(result.pixels().all(|p| p.0[0] == 0));

        let dark = GrayImage::from_pixel(10, 10, Luma([100]));
        let result = apply(DynamicImage::ImageLuma8(dark)).unwrap().to_luma8();
        assert!(result.pixels().all(|p| p.0[0] == 255));
    }
}
