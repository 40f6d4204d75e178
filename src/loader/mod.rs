//! Content/style loading and preparation for style transfer.

mod config;

pub use config::LoaderConfig;

use std::path::Path;

use crate::error::{Error, Result};
use crate::image::{
    classify, FileDecoder, ImageData, ImageSource, MaskData, MediaKind, RgbArray, RGB_CHANNELS,
};
use crate::segment::{BuiltinSegmenter, SegmentationMode, Segmenter};

/// Loads a content and a style image, segments the content and normalizes
/// all three arrays for a downstream model.
///
/// The loader owns its arrays; callers get read access through
/// [`content`](Self::content), [`style`](Self::style) and
/// [`seg_mask`](Self::seg_mask). A failed step leaves earlier results in
/// place, so call [`reset_loader`](Self::reset_loader) to start clean.
#[derive(Debug)]
pub struct DataLoader<D = FileDecoder, S = BuiltinSegmenter> {
    config: LoaderConfig,
    source: D,
    segmenter: S,
    content: Option<ImageData>,
    style: Option<ImageData>,
    seg_mask: Option<MaskData>,
}

impl DataLoader {
    /// Create a loader producing `target_size` x `target_size` images.
    ///
    /// # Errors
    ///
    /// Returns an error if `target_size` is 0.
    pub fn new(target_size: u32) -> Result<Self> {
        Self::with_config(LoaderConfig::with_size(target_size))
    }

    /// Create a loader from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(config: LoaderConfig) -> Result<Self> {
        Self::with_parts(config, FileDecoder::default(), BuiltinSegmenter)
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self {
            config: LoaderConfig::default(),
            source: FileDecoder::default(),
            segmenter: BuiltinSegmenter,
            content: None,
            style: None,
            seg_mask: None,
        }
    }
}

impl<D: ImageSource, S: Segmenter> DataLoader<D, S> {
    /// Create a loader with custom decoding and segmentation backends.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_parts(config: LoaderConfig, source: D, segmenter: S) -> Result<Self> {
        config.validate()?;

        tracing::debug!("Initializing data loader with config: {config:?}");

        Ok(Self {
            config,
            source,
            segmenter,
            content: None,
            style: None,
            seg_mask: None,
        })
    }

    /// Edge length of the square arrays this loader produces.
    #[must_use]
    pub const fn target_size(&self) -> u32 {
        self.config.target_size
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The content image, if loaded.
    #[must_use]
    pub const fn content(&self) -> Option<&ImageData> {
        self.content.as_ref()
    }

    /// The style image, if loaded.
    #[must_use]
    pub const fn style(&self) -> Option<&ImageData> {
        self.style.as_ref()
    }

    /// The segmentation mask of the content image, if computed.
    #[must_use]
    pub const fn seg_mask(&self) -> Option<&MaskData> {
        self.seg_mask.as_ref()
    }

    /// Load the content image at `path`.
    ///
    /// Paths with a video suffix are accepted but skipped: video content is
    /// not supported yet and `content` is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is not recognized or decoding fails.
    pub fn load_content<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        match classify(
            path,
            &self.config.image_suffixes,
            &self.config.video_suffixes,
        ) {
            Some(MediaKind::Image) => {
                tracing::info!("Loading content image: {}", path.display());
                let pixels = self.decode(path)?;
                self.content = Some(ImageData::Raw(pixels));
            }
            Some(MediaKind::Video) => {
                tracing::warn!(
                    "Video content is not supported yet, skipping {}",
                    path.display()
                );
            }
            None => {
                tracing::debug!(
                    "{} matches none of {:?} or {:?}",
                    path.display(),
                    self.config.image_suffixes.suffixes(),
                    self.config.video_suffixes.suffixes()
                );
                return Err(Error::UnsupportedFormat {
                    path: path.to_path_buf(),
                    operation: "load_content",
                });
            }
        }

        Ok(())
    }

    /// Load the style image at `path`. Only still images are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is not an image suffix or decoding fails.
    pub fn load_style<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        if !self.config.image_suffixes.matches(path) {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                operation: "load_style",
            });
        }

        tracing::info!("Loading style image: {}", path.display());
        let pixels = self.decode(path)?;
        self.style = Some(ImageData::Raw(pixels));

        Ok(())
    }

    /// Segment the loaded content image and store the mask.
    ///
    /// # Errors
    ///
    /// Returns an error if no content is loaded or segmentation fails.
    pub fn segment_content(&mut self, mode: SegmentationMode) -> Result<()> {
        let content = self.content.as_ref().ok_or_else(|| Error::InvalidState {
            operation: "segment content",
            reason: "no content image has been loaded".to_string(),
        })?;

        tracing::info!("Segmenting content ({mode})...");
        if content.is_normalized() {
            tracing::debug!("Content already normalized, re-quantizing to 8 bits");
        }

        let mask = match content.raw_view() {
            Some(view) => self.segmenter.segment(view, mode)?,
            None => self.segmenter.segment(content.to_bytes().view(), mode)?,
        };

        let expected = &content.shape()[..2];
        if mask.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected:?}"),
                actual: format!("{:?}", mask.shape()),
            });
        }

        self.seg_mask = Some(MaskData::Labels(mask));
        Ok(())
    }

    /// Load content and style, segment the content, then normalize.
    ///
    /// Content and style are divided by 255 and converted to `f32`; the mask
    /// is converted to `f32` without rescaling.
    ///
    /// # Errors
    ///
    /// Returns the first error from loading or segmentation. State reached
    /// before the failing step is kept.
    pub fn prepare_data<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        content_path: P,
        style_path: Q,
        mode: SegmentationMode,
    ) -> Result<()> {
        self.load_content(content_path)?;
        self.load_style(style_path)?;
        self.segment_content(mode)?;
        self.normalize();

        tracing::info!("Data prepared");
        Ok(())
    }

    /// Drop all held arrays.
    pub fn reset_loader(&mut self) {
        self.content = None;
        self.style = None;
        self.seg_mask = None;
    }

    fn normalize(&mut self) {
        self.content = self.content.take().map(ImageData::normalize);
        self.style = self.style.take().map(ImageData::normalize);
        self.seg_mask = self.seg_mask.take().map(MaskData::normalize);
    }

    /// Decode through the image source and check the resulting shape.
    fn decode(&self, path: &Path) -> Result<RgbArray> {
        let size = self.config.target_size;
        let pixels = self.source.decode_and_resize(path, size)?;

        let side = size as usize;
        if pixels.dim() != (side, side, RGB_CHANNELS) {
            return Err(Error::ShapeMismatch {
                expected: format!("[{side}, {side}, {RGB_CHANNELS}]"),
                actual: format!("{:?}", pixels.shape()),
            });
        }

        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    use image::{Rgb, RgbImage};
    use ndarray::{Array2, Array3, ArrayView3};

    use crate::image::LabelMask;

    /// Writes fixture images into a temporary directory.
    struct Fixtures {
        dir: tempfile::TempDir,
    }

    impl Fixtures {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn image(&self, name: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            let img = RgbImage::from_fn(64, 48, |x, y| {
                if x < 32 {
                    Rgb([20, 30, 40])
                } else {
                    Rgb([230, 200, (y * 4) as u8])
                }
            });
            img.save(&path).unwrap();
            path
        }

        /// PNG bytes under an arbitrary name, whatever its suffix says.
        fn png_named(&self, name: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]))
                .save_with_format(&path, image::ImageFormat::Png)
                .unwrap();
            path
        }
    }

    /// Image source returning a constant array of a fixed shape.
    struct FixedSource {
        shape: (usize, usize, usize),
        calls: Cell<usize>,
    }

    impl ImageSource for FixedSource {
        fn decode_and_resize(&self, _path: &Path, _size: u32) -> Result<RgbArray> {
            self.calls.set(self.calls.get() + 1);
            Ok(Array3::from_elem(self.shape, 255))
        }
    }

    fn fixed(side: usize) -> FixedSource {
        FixedSource {
            shape: (side, side, 3),
            calls: Cell::new(0),
        }
    }

    /// Segmenter returning a mask of a fixed shape.
    struct FixedSegmenter(Option<(usize, usize)>);

    impl Segmenter for FixedSegmenter {
        fn segment(&self, image: ArrayView3<'_, u8>, _mode: SegmentationMode) -> Result<LabelMask> {
            let (h, w, _) = image.dim();
            Ok(Array2::from_elem(self.0.unwrap_or((h, w)), 3))
        }
    }

    #[test]
    fn test_new_rejects_zero_size() {
        let err = DataLoader::new(0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_new_starts_empty() {
        let loader = DataLoader::default();
        assert_eq!(loader.target_size(), 400);
        assert!(loader.content().is_none());
        assert!(loader.style().is_none());
        assert!(loader.seg_mask().is_none());
    }

    #[test]
    fn test_full_scenario() {
        let fx = Fixtures::new();
        let cat = fx.image("cat.jpg");
        let mosaic = fx.image("mosaic.png");

        let mut loader = DataLoader::new(400).unwrap();
        loader.load_content(&cat).unwrap();
        assert_eq!(loader.content().unwrap().shape(), &[400, 400, 3]);

        loader.load_style(&mosaic).unwrap();
        assert_eq!(loader.style().unwrap().shape(), &[400, 400, 3]);

        loader.segment_content(SegmentationMode::V1).unwrap();
        assert_eq!(&loader.seg_mask().unwrap().shape()[..2], &[400, 400]);

        loader
            .prepare_data(&cat, &mosaic, SegmentationMode::V1)
            .unwrap();
        let content = loader.content().unwrap().as_normalized().unwrap();
        let max = content.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(max <= 1.0);
        assert!(loader.seg_mask().unwrap().as_normalized().is_some());
    }

    #[test]
    fn test_prepare_data_normalizes_range() {
        let fx = Fixtures::new();
        let content = fx.image("scan.tif");
        let style = fx.image("style.jpeg");

        let mut loader = DataLoader::new(32).unwrap();
        loader
            .prepare_data(&content, &style, SegmentationMode::V2)
            .unwrap();

        for data in [loader.content().unwrap(), loader.style().unwrap()] {
            let arr = data.as_normalized().expect("normalized");
            assert_eq!(arr.shape(), &[32, 32, 3]);
            assert!(arr.iter().all(|v| (0.0..=1.0).contains(v)));
        }

        let mask = loader.seg_mask().unwrap().as_normalized().unwrap();
        assert_eq!(mask.dim(), (32, 32));
        assert!(mask.iter().any(|&v| v >= 1.0));
    }

    #[test]
    fn test_video_content_is_skipped() {
        let mut loader = DataLoader::default();
        loader.load_content("clip.mp4").unwrap();
        assert!(loader.content().is_none());
    }

    #[test]
    fn test_video_keeps_previous_content() {
        let source = fixed(8);
        let mut loader =
            DataLoader::with_parts(LoaderConfig::with_size(8), source, BuiltinSegmenter).unwrap();

        loader.load_content("a.png").unwrap();
        let before = loader.content().cloned();
        loader.load_content("b.mkv").unwrap();

        assert_eq!(loader.content().cloned(), before);
        assert_eq!(loader.source.calls.get(), 1);
    }

    #[test]
    fn test_unsupported_format() {
        let mut loader = DataLoader::default();

        let err = loader.load_content("image.bmp").unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedFormat {
                operation: "load_content",
                ..
            }
        ));

        let err = loader.load_style("image.bmp").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_style_rejects_video() {
        let mut loader = DataLoader::default();
        let err = loader.load_style("clip.avi").unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedFormat {
                operation: "load_style",
                ..
            }
        ));
        assert!(loader.style().is_none());
    }

    #[test]
    fn test_decode_failure_propagates() {
        let fx = Fixtures::new();
        let mut loader = DataLoader::new(16).unwrap();
        let err = loader
            .load_content(fx.dir.path().join("missing.png"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(loader.content().is_none());

        let err = loader
            .load_style(fx.dir.path().join("missing.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_content_format_sniffed_from_bytes() {
        let fx = Fixtures::new();
        let mut loader = DataLoader::new(4).unwrap();

        loader.load_content(fx.png_named("notajpeg")).unwrap();
        assert_eq!(loader.content().unwrap().shape(), &[4, 4, 3]);

        loader.reset_loader();
        loader.load_content(fx.png_named("x.jpg")).unwrap();
        let content = loader.content().unwrap().as_raw().unwrap();
        assert!(content.iter().all(|&v| v == 255));

        loader.load_style(fx.png_named("style.tif")).unwrap();
        assert_eq!(loader.style().unwrap().shape(), &[4, 4, 3]);
    }

    #[test]
    fn test_corrupt_bytes_fail_to_decode() {
        let fx = Fixtures::new();
        let path = fx.dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image at all").unwrap();

        let mut loader = DataLoader::new(4).unwrap();
        let err = loader.load_content(&path).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }

    #[test]
    fn test_segment_requires_content() {
        let mut loader = DataLoader::default();
        let err = loader.segment_content(SegmentationMode::V1).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
        assert!(loader.seg_mask().is_none());
    }

    #[test]
    fn test_segment_after_normalize() {
        let fx = Fixtures::new();
        let mut loader = DataLoader::new(16).unwrap();
        loader
            .prepare_data(fx.image("a.png"), fx.image("b.png"), SegmentationMode::V1)
            .unwrap();

        loader.segment_content(SegmentationMode::V2).unwrap();
        let mask = loader.seg_mask().unwrap();
        assert!(mask.as_labels().is_some());
        assert_eq!(mask.shape(), &[16, 16]);
    }

    #[test]
    fn test_prepare_with_video_content_fails_at_segmentation() {
        let source = fixed(8);
        let mut loader =
            DataLoader::with_parts(LoaderConfig::with_size(8), source, BuiltinSegmenter).unwrap();

        let err = loader
            .prepare_data("clip.wmv", "style.png", SegmentationMode::V1)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidState { .. }));
        // Style was loaded before the failure and is left raw.
        assert!(loader.style().unwrap().as_raw().is_some());

        loader.reset_loader();
        assert!(loader.style().is_none());
    }

    #[test]
    fn test_source_shape_checked() {
        let source = fixed(5);
        let mut loader =
            DataLoader::with_parts(LoaderConfig::with_size(8), source, BuiltinSegmenter).unwrap();

        let err = loader.load_style("style.png").unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(loader.style().is_none());
    }

    #[test]
    fn test_mask_shape_checked() {
        let mut loader = DataLoader::with_parts(
            LoaderConfig::with_size(8),
            fixed(8),
            FixedSegmenter(Some((4, 4))),
        )
        .unwrap();

        loader.load_content("a.png").unwrap();
        let err = loader.segment_content(SegmentationMode::V1).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(loader.seg_mask().is_none());
    }

    #[test]
    fn test_mask_cast_without_rescale() {
        let mut loader =
            DataLoader::with_parts(LoaderConfig::with_size(4), fixed(4), FixedSegmenter(None))
                .unwrap();

        loader
            .prepare_data("a.png", "b.png", SegmentationMode::V1)
            .unwrap();

        let mask = loader.seg_mask().unwrap().as_normalized().unwrap();
        assert!(mask.iter().all(|&v| (v - 3.0).abs() < f32::EPSILON));
        let content = loader.content().unwrap().as_normalized().unwrap();
        assert!(content.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut loader =
            DataLoader::with_parts(LoaderConfig::with_size(4), fixed(4), FixedSegmenter(None))
                .unwrap();
        loader
            .prepare_data("a.png", "b.png", SegmentationMode::V2)
            .unwrap();

        loader.reset_loader();
        assert!(loader.content().is_none());
        assert!(loader.style().is_none());
        assert!(loader.seg_mask().is_none());

        loader.reset_loader();
        assert!(loader.content().is_none());
        assert!(loader.style().is_none());
        assert!(loader.seg_mask().is_none());
    }

    #[test]
    fn test_custom_suffixes() {
        let config = LoaderConfig {
            image_suffixes: crate::image::SuffixSet::new([".bmp"]),
            ..LoaderConfig::with_size(4)
        };
        let mut loader = DataLoader::with_parts(config, fixed(4), FixedSegmenter(None)).unwrap();

        loader.load_content("image.bmp").unwrap();
        assert!(loader.content().is_some());
        assert!(loader.load_style("image.png").is_err());
    }
}
