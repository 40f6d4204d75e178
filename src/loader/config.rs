//! Loader configuration.

use crate::error::{Error, Result};
use crate::image::{SuffixSet, DEFAULT_IMAGE_SIZE};

/// Configuration for a [`DataLoader`](super::DataLoader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Edge length of the square arrays produced by the loader.
    pub target_size: u32,

    /// Suffixes decoded as still images.
    pub image_suffixes: SuffixSet,

    /// Suffixes recognized as video and skipped for content.
    pub video_suffixes: SuffixSet,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_IMAGE_SIZE,
            image_suffixes: SuffixSet::images(),
            video_suffixes: SuffixSet::videos(),
        }
    }
}

impl LoaderConfig {
    /// Default configuration with a different target size.
    #[must_use]
    pub fn with_size(target_size: u32) -> Self {
        Self {
            target_size,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(Error::InvalidParameter {
                name: "target_size".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.image_suffixes.is_empty() {
            return Err(Error::InvalidParameter {
                name: "image_suffixes".to_string(),
                reason: "must contain at least one suffix".to_string(),
            });
        }

        Ok(())
    }
}
