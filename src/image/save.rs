//! Mask saving utilities.

use std::path::Path;

use image::{GrayImage, Luma};
use ndarray::ArrayView2;

use crate::error::{Error, Result};

/// Save a segmentation mask as an 8-bit grayscale image.
///
/// Labels are stretched so the largest one maps to 255; an all-zero mask is
/// written black. The format is inferred from the extension of `path`.
///
/// # Errors
///
/// Returns an error if the image cannot be encoded or written.
pub fn save_mask<P: AsRef<Path>>(mask: ArrayView2<'_, f32>, path: P) -> Result<()> {
    let path = path.as_ref();

    let img = mask_to_image(mask);

    img.save(path).map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote mask to {}", path.display());
    Ok(())
}

/// Convert a label mask to a grayscale image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mask_to_image(mask: ArrayView2<'_, f32>) -> GrayImage {
    let (height, width) = mask.dim();
    let max = mask.iter().copied().fold(0.0_f32, f32::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };

    // Safe: mask dimensions originate from a u32-sized image
    let mut img = GrayImage::new(width as u32, height as u32);
    for ((y, x), &value) in mask.indexed_iter() {
        let level = (value * scale).round().clamp(0.0, 255.0) as u8;
        img.put_pixel(x as u32, y as u32, Luma([level]));
    }

    img
}
