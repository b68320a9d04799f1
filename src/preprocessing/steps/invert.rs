use crate::error::LabError;
use image::{imageops, DynamicImage};

/// Subtract every pixel from the maximum intensity
pub fn apply(image: DynamicImage) -> Result<DynamicImage, LabError> {
    let mut gray = image.to_luma8();
    imageops::invert(&mut gray);
    Ok(DynamicImage::ImageLuma8(gray))
}
