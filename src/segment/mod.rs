//! Segmentation of the content image.

mod builtin;

pub use builtin::BuiltinSegmenter;

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView3;

use crate::error::{Error, Result};
use crate::image::LabelMask;

/// Which segmentation algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentationMode {
    /// Binary foreground/background split.
    #[default]
    V1,
    /// Connected foreground regions, each with its own label.
    V2,
}

impl fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

impl FromStr for SegmentationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            _ => Err(Error::InvalidParameter {
                name: "segmentation_mode".to_string(),
                reason: format!("unknown mode {s:?}, expected v1 or v2"),
            }),
        }
    }
}

/// Produces a per-pixel label mask for an HWC RGB image.
pub trait Segmenter {
    /// Segment `image`, returning a mask of shape `[height, width]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be segmented.
    fn segment(&self, image: ArrayView3<'_, u8>, mode: SegmentationMode) -> Result<LabelMask>;
}
