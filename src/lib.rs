//! # styleprep
//!
//! Data preparation for neural style transfer.
//!
//! A [`DataLoader`] reads a content image and a style image, resizes both to a
//! fixed square resolution, segments the content image and finally rescales
//! everything to `f32` arrays ready to hand to a model.
//!
//! ## Example
//!
//! ```no_run
//! use styleprep::{DataLoader, SegmentationMode};
//!
//! # fn main() -> styleprep::Result<()> {
//! let mut loader = DataLoader::new(400)?;
//!
//! loader.prepare_data("cat.jpg", "mosaic.png", SegmentationMode::V1)?;
//!
//! let content = loader.content().and_then(|c| c.as_normalized());
//! assert_eq!(content.map(|c| c.dim()), Some((400, 400, 3)));
//!
//! loader.reset_loader();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod loader;
pub mod segment;

pub use error::{Error, Result};
pub use loader::{DataLoader, LoaderConfig};
pub use segment::{SegmentationMode, Segmenter};
