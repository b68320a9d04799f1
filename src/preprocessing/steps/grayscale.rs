use crate::error::LabError;
use image::DynamicImage;

/// Collapse the decoded color image to a single luma channel
pub fn apply(image: DynamicImage) -> Result<DynamicImage, LabError> {
    Ok(DynamicImage::ImageLuma8(image.to_luma8()))
}
