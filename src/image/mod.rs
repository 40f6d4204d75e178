//! Image arrays, format dispatch, loading and saving.

mod format;
mod load;
mod save;

pub use format::{classify, MediaKind, SuffixSet, SUFFIX_WIDTH};
pub use load::{FileDecoder, ImageSource};
pub use save::save_mask;

use ndarray::{Array2, Array3, ArrayView3};

/// Raw decoded image in HWC layout with 8-bit channels.
pub type RgbArray = Array3<u8>;

/// Image in HWC layout with channel values in [0, 1].
pub type NormalizedArray = Array3<f32>;

/// Per-pixel label mask as produced by a segmenter.
pub type LabelMask = Array2<u32>;

/// Default square edge length for loaded images.
pub const DEFAULT_IMAGE_SIZE: u32 = 400;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// An image held by the loader, either as decoded or after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// 8-bit pixels straight from the decoder.
    Raw(RgbArray),
    /// `f32` pixels rescaled to [0, 1].
    Normalized(NormalizedArray),
}

impl ImageData {
    /// Shape as `[height, width, channels]`.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Raw(a) => a.shape(),
            Self::Normalized(a) => a.shape(),
        }
    }

    /// Whether the normalization pass has been applied.
    #[must_use]
    pub const fn is_normalized(&self) -> bool {
        matches!(self, Self::Normalized(_))
    }

    /// The raw pixels, if not yet normalized.
    #[must_use]
    pub const fn as_raw(&self) -> Option<&RgbArray> {
        match self {
            Self::Raw(a) => Some(a),
            Self::Normalized(_) => None,
        }
    }

    /// The normalized pixels, if normalization has been applied.
    #[must_use]
    pub const fn as_normalized(&self) -> Option<&NormalizedArray> {
        match self {
            Self::Normalized(a) => Some(a),
            Self::Raw(_) => None,
        }
    }

    /// Divide by 255 and convert to `f32`. Already normalized data is returned unchanged.
    #[must_use]
    pub fn normalize(self) -> Self {
        match self {
            Self::Raw(a) => Self::Normalized(a.mapv(|v| f32::from(v) / 255.0)),
            normalized @ Self::Normalized(_) => normalized,
        }
    }

    /// An 8-bit view of the pixels, re-quantizing normalized data when needed.
    #[must_use]
    pub fn to_bytes(&self) -> RgbArray {
        match self {
            Self::Raw(a) => a.clone(),
            Self::Normalized(a) => a.mapv(denormalize),
        }
    }

    /// Borrowed 8-bit view when the data is still raw.
    #[must_use]
    pub fn raw_view(&self) -> Option<ArrayView3<'_, u8>> {
        self.as_raw().map(RgbArray::view)
    }
}

/// A segmentation mask held by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskData {
    /// Integer labels from the segmenter.
    Labels(LabelMask),
    /// The same labels as `f32`, not rescaled.
    Normalized(Array2<f32>),
}

impl MaskData {
    /// Shape as `[height, width]`.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Labels(a) => a.shape(),
            Self::Normalized(a) => a.shape(),
        }
    }

    /// The integer labels, if not yet converted.
    #[must_use]
    pub const fn as_labels(&self) -> Option<&LabelMask> {
        match self {
            Self::Labels(a) => Some(a),
            Self::Normalized(_) => None,
        }
    }

    /// The `f32` mask, if converted.
    #[must_use]
    pub const fn as_normalized(&self) -> Option<&Array2<f32>> {
        match self {
            Self::Normalized(a) => Some(a),
            Self::Labels(_) => None,
        }
    }

    /// Cast labels to `f32` without rescaling.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalize(self) -> Self {
        match self {
            Self::Labels(a) => Self::Normalized(a.mapv(|v| v as f32)),
            normalized @ Self::Normalized(_) => normalized,
        }
    }
}

/// Map a value from [0, 1] back to [0, 255] with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn denormalize(value: f32) -> u8 {
    // Safe: clamped to [0, 255] range before casting
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_range() {
        let raw = RgbArray::from_shape_fn((4, 4, 3), |(y, x, c)| ((y * 64 + x * 16 + c) % 256) as u8);
        let raw = ImageData::Raw(raw);
        assert!(!raw.is_normalized());
        let data = raw.normalize();
        assert!(data.is_normalized());

        let arr = data.as_normalized().expect("normalized");
        assert!(arr.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(data.as_raw().is_none());
    }

    #[test]
    fn test_normalize_extremes() {
        let mut raw = RgbArray::zeros((2, 2, 3));
        raw[[1, 1, 2]] = 255;
        let data = ImageData::Raw(raw).normalize();
        let arr = data.as_normalized().unwrap();

        assert!((arr[[0, 0, 0]]).abs() < f32::EPSILON);
        assert!((arr[[1, 1, 2]] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = RgbArray::from_elem((2, 2, 3), 128);
        let once = ImageData::Raw(raw).normalize();
        let twice = once.clone().normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_to_bytes_round_trips_raw_values() {
        let raw = RgbArray::from_shape_fn((3, 3, 3), |(y, x, c)| (y * 80 + x * 20 + c) as u8);
        let normalized = ImageData::Raw(raw.clone()).normalize();
        assert_eq!(normalized.to_bytes(), raw);
    }

    #[test]
    fn test_mask_normalize_keeps_labels() {
        let labels = LabelMask::from_shape_vec((1, 3), vec![0, 1, 7]).unwrap();
        let mask = MaskData::Labels(labels).normalize();
        let arr = mask.as_normalized().unwrap();
        assert_eq!(arr.as_slice().unwrap(), &[0.0, 1.0, 7.0]);
        assert_eq!(mask.shape(), &[1, 3]);
    }

    #[test]
    fn test_denormalize_clamp() {
        assert_eq!(denormalize(-0.5), 0);
        assert_eq!(denormalize(0.0), 0);
        assert_eq!(denormalize(1.0), 255);
        assert_eq!(denormalize(2.0), 255);
    }
}
