//! Image loading utilities.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, ImageReader};
use ndarray::Array3;

use crate::error::{Error, Result};

use super::{RgbArray, RGB_CHANNELS};

/// Something that can turn a path into a square RGB array.
pub trait ImageSource {
    /// Decode the file at `path` and resize it to `size` x `size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    fn decode_and_resize(&self, path: &Path, size: u32) -> Result<RgbArray>;
}

/// Decodes images from disk with the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct FileDecoder {
    filter: FilterType,
}

impl FileDecoder {
    /// Create a decoder using the given resampling filter.
    #[must_use]
    pub const fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for FileDecoder {
    fn default() -> Self {
        // Bilinear, matching the usual resize default of imaging libraries.
        Self::new(FilterType::Triangle)
    }
}

impl ImageSource for FileDecoder {
    fn decode_and_resize(&self, path: &Path, size: u32) -> Result<RgbArray> {
        // Sniff the format from the file header; the suffix only gates dispatch.
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|source| Error::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );

        Ok(image_to_array(&img, size, self.filter))
    }
}

/// Resize a `DynamicImage` and copy it into an HWC array.
fn image_to_array(img: &DynamicImage, size: u32, filter: FilterType) -> RgbArray {
    let rgb = img.resize_exact(size, size, filter).to_rgb8();
    let side = size as usize;

    Array3::from_shape_fn((side, side, RGB_CHANNELS), |(y, x, c)| {
        // Safe: x and y are bounded by size which fits in u32
        #[allow(clippy::cast_possible_truncation)]
        let pixel = rgb.get_pixel(x as u32, y as u32);
        pixel[c]
    })
}
