//! Threshold-based segmentation on top of `imageproc`.

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::{Array2, ArrayView3};

use crate::error::{Error, Result};
use crate::image::{LabelMask, RGB_CHANNELS};

use super::{SegmentationMode, Segmenter};

const FOREGROUND: u8 = 255;

/// Segments by Otsu thresholding the luminance channel.
///
/// [`SegmentationMode::V1`] yields a 0/1 foreground mask.
/// [`SegmentationMode::V2`] additionally labels each 8-connected foreground
/// region, keeping 0 for background.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSegmenter;

impl Segmenter for BuiltinSegmenter {
    // Safe: array dimensions come from a u32-sized image
    #[allow(clippy::cast_possible_truncation)]
    fn segment(&self, image: ArrayView3<'_, u8>, mode: SegmentationMode) -> Result<LabelMask> {
        let (height, width, channels) = image.dim();
        if channels != RGB_CHANNELS {
            return Err(Error::Segmentation {
                mode: mode.to_string(),
                reason: format!("expected {RGB_CHANNELS} channels, got {channels}"),
            });
        }
        if height == 0 || width == 0 {
            return Err(Error::Segmentation {
                mode: mode.to_string(),
                reason: "image is empty".to_string(),
            });
        }

        let binary = foreground(&to_luma(image));

        let mask = match mode {
            SegmentationMode::V1 => Array2::from_shape_fn((height, width), |(y, x)| {
                u32::from(binary.get_pixel(x as u32, y as u32)[0] == FOREGROUND)
            }),
            SegmentationMode::V2 => {
                let labels = connected_components(&binary, Connectivity::Eight, Luma([0u8]));
                Array2::from_shape_fn((height, width), |(y, x)| {
                    labels.get_pixel(x as u32, y as u32)[0]
                })
            }
        };

        tracing::debug!(
            "Segmented {width}x{height} image ({mode}), max label {}",
            mask.iter().copied().max().unwrap_or(0)
        );

        Ok(mask)
    }
}

/// Convert an HWC RGB array to a grayscale image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_luma(image: ArrayView3<'_, u8>) -> GrayImage {
    let (height, width, _) = image.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let r = f32::from(image[[y, x, 0]]);
        let g = f32::from(image[[y, x, 1]]);
        let b = f32::from(image[[y, x, 2]]);

        // Standard luminosity formula: 0.299*R + 0.587*G + 0.114*B
        // Safe: clamped to [0, 255] before casting
        let luma = 0.299_f32.mul_add(r, 0.587_f32.mul_add(g, 0.114 * b));
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Binary foreground mask: pixels brighter than the Otsu level become 255.
fn foreground(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] > level { FOREGROUND } else { 0 };
    }
    out
}
